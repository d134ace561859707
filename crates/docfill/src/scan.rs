//! Run/segment scanner for OOXML part strings
//!
//! A document part (`word/document.xml`, a header, a footer) is split into an
//! ordered list of segments: each `<w:r>` run element becomes a [`SegmentKind::Run`]
//! segment, and every gap before, between or after runs becomes a
//! [`SegmentKind::Other`] segment. Concatenating the segments in order always
//! reproduces the input byte-for-byte; the scanner never fails, any string is
//! valid input.

use regex::Regex;
use std::sync::LazyLock;

// Sequential, non-overlapping run matching. `<w:r` must be followed by
// whitespace or `>` so that `<w:rPr>` never matches. Self-closing `<w:r/>`
// carries no text and is left inside an Other gap.
static RE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<w:r(?:\s[^>]*)?>.*?</w:r>").expect("valid run regex"));

/// Classification of a scanned segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    /// A complete `<w:r>...</w:r>` run element
    Run,
    /// Markup between runs (paragraph tags, proofing marks, bookmarks, ...)
    Other,
}

/// One contiguous slice of a document part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Whether this slice is a run element or surrounding markup
    pub kind: SegmentKind,
    /// The slice's full markup, exactly as it appears in the part
    pub text: String,
}

impl Segment {
    pub(crate) fn run(text: &str) -> Self {
        Self {
            kind: SegmentKind::Run,
            text: text.to_string(),
        }
    }

    pub(crate) fn other(text: &str) -> Self {
        Self {
            kind: SegmentKind::Other,
            text: text.to_string(),
        }
    }

    /// Whether this segment is a run element
    #[inline]
    #[must_use]
    pub fn is_run(&self) -> bool {
        self.kind == SegmentKind::Run
    }
}

/// Split a document part into ordered run/other segments
///
/// Invariant: concatenating the returned segments' text reproduces `part`
/// exactly. Inputs without any run produce a single `Other` segment (or no
/// segments for the empty string).
#[must_use = "returns the segmented part, the input is not modified"]
pub fn scan(part: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut cursor = 0;
    for m in RE_RUN.find_iter(part) {
        if m.start() > cursor {
            segments.push(Segment::other(&part[cursor..m.start()]));
        }
        segments.push(Segment::run(m.as_str()));
        cursor = m.end();
    }
    if cursor < part.len() {
        segments.push(Segment::other(&part[cursor..]));
    }
    segments
}
