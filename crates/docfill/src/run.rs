//! Text extraction from and cloning of `<w:r>` run elements
//!
//! The run is the only unit whose text is ever read or rewritten. Inner text
//! is handled raw: entity references like `&amp;` pass through untouched, so
//! an extract/clone round trip never re-encodes anything.

use regex::Regex;
use std::sync::LazyLock;

// Matches both <w:t>...</w:t> and the empty <w:t/>; group 1 only exists for
// the non-empty form.
static RE_TEXT_NODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<w:t(?:\s[^>]*)?(?:/>|>(.*?)</w:t>)").expect("valid text node regex")
});

static RE_RUN_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<w:r(?:\s[^>]*)?>").expect("valid run open tag regex"));

static RE_RUN_PROPS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<w:rPr(?:\s[^>]*)?>.*?</w:rPr>|<w:rPr\s*/>").expect("valid run props regex")
});

/// Concatenate the raw inner text of every `<w:t>` node in a run
///
/// Text nodes are read in document order; a run without text nodes yields
/// `""`. Entity references are not unescaped.
#[must_use = "returns the run's displayed text"]
pub fn extract_text(run: &str) -> String {
    let mut text = String::new();
    for caps in RE_TEXT_NODE.captures_iter(run) {
        if let Some(inner) = caps.get(1) {
            text.push_str(inner.as_str());
        }
    }
    text
}

/// Build a new run from a template run's formatting shell and fresh text
///
/// The clone reuses the template's opening tag and its `<w:rPr>` block (when
/// present) and contains exactly one `<w:t>` node holding `text`. The node
/// carries `xml:space="preserve"` only when `text` starts or ends with
/// whitespace; a template with no text node gets one synthesized before the
/// closing tag. The template's own text nodes never survive into the clone.
#[must_use = "returns the cloned run, the template is not modified"]
pub fn clone_with_text(template_run: &str, text: &str) -> String {
    let open = RE_RUN_OPEN
        .find(template_run)
        .map_or("<w:r>", |m| m.as_str());
    let props = RE_RUN_PROPS
        .find(template_run)
        .map_or("", |m| m.as_str());

    let preserve =
        text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace);

    let mut run = String::with_capacity(open.len() + props.len() + text.len() + 48);
    run.push_str(open);
    run.push_str(props);
    if preserve {
        run.push_str(r#"<w:t xml:space="preserve">"#);
    } else {
        run.push_str("<w:t>");
    }
    run.push_str(text);
    run.push_str("</w:t></w:r>");
    run
}
