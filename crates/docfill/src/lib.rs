//! Placeholder repair, substitution and highlighting for OOXML templates
//!
//! `docfill` is the text engine behind document templating: it takes the raw
//! XML parts of a Word-compatible template (main body, headers, footers),
//! repairs `{{variable}}` placeholders that the authoring tool split across
//! text runs, substitutes resolved values, and later re-identifies those
//! values inside externally rendered HTML for on-screen highlighting.
//!
//! # Pipeline
//!
//! ```text
//! raw XML part
//!      │  reassemble()      merge split runs, one placeholder per run
//!      ▼
//! clean XML part
//!      │  substitute()      {{key}} -> OPEN(key) + escaped value + CLOSE(key)
//!      ▼
//! marked XML part ──▶ [external DOCX→HTML renderer] ──▶ HTML
//!                                                        │  highlight()
//!                                                        ▼
//!                                              annotated HTML with
//!                                              <span class="highlighted">
//! ```
//!
//! The archive reader/writer, the renderer, and the variable resolver that
//! produces the dictionaries are external collaborators; this crate is a pure
//! string-to-string library with no I/O.
//!
//! # Guarantees
//!
//! - No operation fails on malformed input: unterminated placeholders,
//!   unbalanced braces and unresolved keys all degrade to "leave the affected
//!   span unchanged". A placeholder that stays visible in the output is the
//!   intended debugging signal, never silent data loss.
//! - [`reassemble`] is idempotent on input whose placeholders are already
//!   single-run-contained, byte-for-byte.
//! - Operations are pure and synchronous; distinct parts can be processed in
//!   parallel with no coordination.
//!
//! # Usage
//!
//! ```
//! use std::collections::HashMap;
//!
//! let part = "<w:r><w:t>{{</w:t></w:r><w:r><w:t>deal_cpf}}</w:t></w:r>";
//! let dict = HashMap::from([("deal_cpf".to_string(), "123.456.789-00".to_string())]);
//!
//! let prepared = docfill::prepare(part, &dict);
//! assert!(prepared.contains("123.456.789-00"));
//! assert!(!prepared.contains("{{"));
//! ```

pub mod highlight;
pub mod marker;
pub mod placeholder;
pub mod reassemble;
pub mod run;
pub mod scan;
pub mod substitute;

pub use highlight::{
    highlight, HighlightEntry, DATA_VARIABLE_ATTR, HIGHLIGHT_CLASS, HIGHLIGHT_MISSING_CLASS,
};
pub use marker::{close_marker, open_marker};
pub use placeholder::{brace_balance, split_pieces, Piece};
pub use reassemble::reassemble;
pub use run::{clone_with_text, extract_text};
pub use scan::{scan, Segment, SegmentKind};
pub use substitute::substitute;

use std::collections::HashMap;

/// Repair and substitute one document part in a single call
///
/// Equivalent to `substitute(&reassemble(xml_part), dict)` — the call shape
/// used per part (body, each header, each footer) when filling a template.
#[must_use = "returns the prepared part, the input is not modified"]
pub fn prepare(xml_part: &str, dict: &HashMap<String, String>) -> String {
    substitute(&reassemble(xml_part), dict)
}
