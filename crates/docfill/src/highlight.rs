//! Highlighting of substituted values in rendered HTML
//!
//! After the external renderer turns the marked XML into HTML, this pass
//! re-identifies each substituted value and wraps it in a semantic span the
//! UI can style. Two strategies, in order:
//!
//! 1. **Marker pass** — sentinel pairs that survived rendering are rewritten
//!    into highlight spans (or silently stripped when the key carries no
//!    highlight entry; sentinels must never reach the screen).
//! 2. **Fallback pass** — for entries the marker pass did not satisfy: a
//!    literal `{{key}}` left in the HTML is replaced outright, otherwise the
//!    first text-node occurrence of the value is wrapped. Text nodes are
//!    walked through a minimal visitor ([`for_each_text_node`]) backed by a
//!    tag-aware scanner, so a full HTML parser could back it instead.
//!
//! A value that cannot be located is left alone; the pass never deletes
//! surrounding content.

use crate::marker::{decode_key, marker_pairs};
use log::debug;
use quick_xml::escape::escape;
use regex::{Captures, NoExpand, Regex};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

/// Class attached to a highlight span holding a real value
pub const HIGHLIGHT_CLASS: &str = "highlighted";
/// Class attached to a highlight span holding "not provided" placeholder text
pub const HIGHLIGHT_MISSING_CLASS: &str = "highlighted-missing";
/// Attribute carrying the originating placeholder key
pub const DATA_VARIABLE_ATTR: &str = "data-variable";

static RE_CLASS_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)\bclass\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid class attr regex")
});
static RE_SCRIPT_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</script\s*>").expect("valid script end regex"));
static RE_STYLE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</style\s*>").expect("valid style end regex"));

/// One resolved variable, as produced by the external resolver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightEntry {
    /// The already-formatted display value substituted into the document
    pub value: String,
    /// Whether the value is "not provided" placeholder text instead of data
    #[serde(default, alias = "isMissing")]
    pub is_missing: bool,
}

/// Wrap every substituted value found in `html` in a highlight span
///
/// Keys satisfied by the marker pass are never reprocessed by the fallback,
/// so nothing gets wrapped twice. Unlocatable values leave the HTML
/// unchanged for that key.
#[must_use = "returns the annotated HTML, the input is not modified"]
pub fn highlight(html: &str, entries: &HashMap<String, HighlightEntry>) -> String {
    let mut satisfied = HashSet::new();
    let mut out = apply_markers(html, entries, &mut satisfied);

    // Sorted order keeps the fallback deterministic across runs.
    let mut pending: Vec<&String> = entries
        .keys()
        .filter(|key| !satisfied.contains(key.as_str()))
        .collect();
    pending.sort();

    for key in pending {
        let entry = &entries[key];
        if entry.value.is_empty() {
            continue;
        }
        out = fallback_highlight(&out, key, entry);
    }
    out
}

fn span_open(key: &str, is_missing: bool) -> String {
    let class = if is_missing {
        HIGHLIGHT_MISSING_CLASS
    } else {
        HIGHLIGHT_CLASS
    };
    format!(
        r#"<span class="{class}" {DATA_VARIABLE_ATTR}="{}">"#,
        escape(key)
    )
}

/// Rewrite surviving marker pairs into highlight spans
///
/// Only pairs whose decoded open and close keys agree are accepted; a
/// mismatched or undecodable pair is left untouched. Pairs without a
/// highlight entry lose their sentinels but keep the rendered value.
fn apply_markers(
    html: &str,
    entries: &HashMap<String, HighlightEntry>,
    satisfied: &mut HashSet<String>,
) -> String {
    marker_pairs()
        .replace_all(html, |caps: &Captures| {
            if caps[1] != caps[3] {
                return caps[0].to_string();
            }
            let Some(key) = decode_key(&caps[1]) else {
                return caps[0].to_string();
            };
            let inner = &caps[2];
            match entries.get(&key) {
                Some(entry) => {
                    let open = span_open(&key, entry.is_missing);
                    satisfied.insert(key);
                    format!("{open}{inner}</span>")
                }
                None => inner.to_string(),
            }
        })
        .into_owned()
}

fn fallback_highlight(html: &str, key: &str, entry: &HighlightEntry) -> String {
    // (a) the marker never reached the renderer but the literal token did
    let token_re = Regex::new(&format!(r"\{{\{{\s*{}\s*\}}\}}", regex::escape(key)))
        .expect("escaped key yields a valid regex");
    if token_re.is_match(html) {
        let wrapped = format!(
            "{}{}</span>",
            span_open(key, entry.is_missing),
            escape(&entry.value)
        );
        return token_re.replacen(html, 1, NoExpand(&wrapped)).into_owned();
    }

    // (b) first text-node occurrence of the value. Rendered HTML keeps
    // entities encoded, so the escaped form of the value is tried as well.
    let escaped = escape(&entry.value);
    let mut needles = vec![entry.value.as_str()];
    if escaped.as_ref() != entry.value.as_str() {
        needles.push(escaped.as_ref());
    }
    for needle in needles {
        let mut hit = None;
        for_each_text_node(html, |offset, text| {
            if let Some(i) = text.find(needle) {
                hit = Some((offset + i, offset + i + needle.len()));
                return true;
            }
            false
        });
        if let Some((start, end)) = hit {
            return format!(
                "{}{}{}</span>{}",
                &html[..start],
                span_open(key, entry.is_missing),
                &html[start..end],
                &html[end..]
            );
        }
    }
    debug!("value for '{key}' not found in rendered HTML; leaving unchanged");
    html.to_string()
}

/// Visit every text node of serialized HTML, in document order
///
/// The visitor receives the node's byte offset and content and returns
/// `true` to stop the walk. Comments, `script`/`style` raw text, and any
/// text inside an existing highlight span are skipped. This is the minimal
/// text-node interface the fallback needs; the scanning backend could be
/// swapped for a real HTML parser without touching callers.
fn for_each_text_node<F>(html: &str, mut visit: F)
where
    F: FnMut(usize, &str) -> bool,
{
    let mut cursor = 0;
    // Depth of open <span> elements counted from the enclosing highlight
    // span; zero means text is visible to the visitor.
    let mut hl_depth = 0usize;

    while cursor < html.len() {
        let Some(rel) = html[cursor..].find('<') else {
            if hl_depth == 0 {
                visit(cursor, &html[cursor..]);
            }
            return;
        };
        let tag_start = cursor + rel;
        if tag_start > cursor && hl_depth == 0 && visit(cursor, &html[cursor..tag_start]) {
            return;
        }

        if html[tag_start..].starts_with("<!--") {
            match html[tag_start + 4..].find("-->") {
                Some(i) => {
                    cursor = tag_start + 4 + i + 3;
                    continue;
                }
                None => return,
            }
        }

        let Some(gt_rel) = html[tag_start..].find('>') else {
            return;
        };
        let tag_end = tag_start + gt_rel + 1;
        let tag = &html[tag_start..tag_end];
        let (closing, name) = tag_name(tag);
        let self_closing = tag.ends_with("/>");

        if !closing && !self_closing && (name == "script" || name == "style") {
            let end_re = if name == "script" {
                &*RE_SCRIPT_END
            } else {
                &*RE_STYLE_END
            };
            match end_re.find_at(html, tag_end) {
                Some(m) => {
                    cursor = m.end();
                    continue;
                }
                None => return,
            }
        }

        if name == "span" {
            if closing {
                hl_depth = hl_depth.saturating_sub(1);
            } else if !self_closing {
                if hl_depth > 0 {
                    hl_depth += 1;
                } else if is_highlight_span(tag) {
                    hl_depth = 1;
                }
            }
        }
        cursor = tag_end;
    }
}

fn tag_name(tag: &str) -> (bool, String) {
    let inner = tag.trim_start_matches('<');
    let (closing, rest) = match inner.strip_prefix('/') {
        Some(rest) => (true, rest),
        None => (false, inner),
    };
    let name = rest
        .chars()
        .take_while(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_ascii_lowercase();
    (closing, name)
}

fn is_highlight_span(tag: &str) -> bool {
    RE_CLASS_ATTR.captures(tag).is_some_and(|caps| {
        let classes = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
        classes
            .split_whitespace()
            .any(|c| c == HIGHLIGHT_CLASS || c == HIGHLIGHT_MISSING_CLASS)
    })
}
