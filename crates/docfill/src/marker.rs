//! Sentinel markers around substituted values
//!
//! A substituted value is wrapped as `[[__OPEN__<key>__]]value[[__CLOSE__<key>__]]`
//! inline in the XML text, where `<key>` is the percent-encoded placeholder
//! key. The markers survive the external DOCX-to-HTML rendering as plain
//! text, so the highlight pass can re-identify each value and which variable
//! produced it. Percent-encoding keeps the key alphanumeric-plus-`%` and
//! immune to whatever escaping the renderer applies; the bracket/underscore
//! shape never collides with `$` back-reference syntax in replacement
//! strings.

use log::warn;
use percent_encoding::{percent_decode_str, utf8_percent_encode, NON_ALPHANUMERIC};
use regex::Regex;
use std::sync::LazyLock;

// Encoded keys only ever contain alphanumerics and `%`; the inner content is
// matched lazily so adjacent pairs pair up correctly.
static RE_MARKER_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\[\[__OPEN__([A-Za-z0-9%]+)__\]\](.*?)\[\[__CLOSE__([A-Za-z0-9%]+)__\]\]")
        .expect("valid marker pair regex")
});

/// The compiled `OPEN(k) ... CLOSE(k)` pair pattern
///
/// Group 1 is the encoded open key, group 2 the wrapped content, group 3 the
/// encoded close key.
#[inline]
pub(crate) fn marker_pairs() -> &'static Regex {
    &RE_MARKER_PAIR
}

fn encode_key(key: &str) -> String {
    utf8_percent_encode(key, NON_ALPHANUMERIC).to_string()
}

/// Decode a percent-encoded marker key; `None` when the encoding is broken
pub(crate) fn decode_key(encoded: &str) -> Option<String> {
    match percent_decode_str(encoded).decode_utf8() {
        Ok(key) => Some(key.into_owned()),
        Err(_) => {
            warn!("marker key '{encoded}' does not decode to UTF-8; skipping");
            None
        }
    }
}

/// Opening sentinel for a substituted value
#[must_use]
pub fn open_marker(key: &str) -> String {
    format!("[[__OPEN__{}__]]", encode_key(key))
}

/// Closing sentinel for a substituted value
#[must_use]
pub fn close_marker(key: &str) -> String {
    format!("[[__CLOSE__{}__]]", encode_key(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers_encode_non_alphanumerics() {
        assert_eq!(open_marker("deal_cpf"), "[[__OPEN__deal%5Fcpf__]]");
        assert_eq!(close_marker("deal_cpf"), "[[__CLOSE__deal%5Fcpf__]]");
    }

    #[test]
    fn test_dotted_key_round_trip() {
        let open = open_marker("deal.deal_cpf");
        let encoded = open
            .strip_prefix("[[__OPEN__")
            .and_then(|s| s.strip_suffix("__]]"))
            .unwrap();
        assert_eq!(decode_key(encoded).as_deref(), Some("deal.deal_cpf"));
    }

    #[test]
    fn test_pair_pattern_matches_wrapped_value() {
        let text = format!("{}R$ 1.500,00{}", open_marker("deal_value"), close_marker("deal_value"));
        let caps = marker_pairs().captures(&text).unwrap();
        assert_eq!(&caps[1], &caps[3]);
        assert_eq!(&caps[2], "R$ 1.500,00");
    }

    #[test]
    fn test_adjacent_pairs_do_not_bleed() {
        let text = format!(
            "{}a{}{}b{}",
            open_marker("x"),
            close_marker("x"),
            open_marker("y"),
            close_marker("y"),
        );
        let contents: Vec<&str> = marker_pairs()
            .captures_iter(&text)
            .map(|c| c.get(2).unwrap().as_str())
            .collect();
        assert_eq!(contents, vec!["a", "b"]);
    }
}
