//! Placeholder substitution into repaired XML
//!
//! Runs after [`reassemble`](crate::reassemble::reassemble), when every
//! placeholder sits inside a single run, so one regex pass over the whole
//! part string catches them all. Values are XML-escaped and wrapped in
//! sentinel markers; keys missing from the dictionary stay literally visible
//! in the document, which is the intended debugging signal for resolution
//! gaps.

use crate::marker::{close_marker, open_marker};
use crate::placeholder::token_pattern;
use log::{debug, warn};
use quick_xml::escape::escape;
use regex::Captures;
use std::collections::HashMap;

/// Replace every resolvable `{{ key }}` with its marker-wrapped value
///
/// Key matching is case-sensitive against the normalized (trimmed) key.
/// Values are treated as opaque, already-formatted strings: the only
/// transformation applied here is XML escaping of `& < > " '`. Unknown keys
/// are left untouched as literal text.
#[must_use = "returns the substituted part, the input is not modified"]
pub fn substitute(xml_part: &str, dict: &HashMap<String, String>) -> String {
    token_pattern()
        .replace_all(xml_part, |caps: &Captures| {
            let key = caps[1].trim();
            match dict.get(key) {
                Some(value) => {
                    debug!("substituting '{key}'");
                    format!(
                        "{}{}{}",
                        open_marker(key),
                        escape(value),
                        close_marker(key)
                    )
                }
                None => {
                    warn!("placeholder '{key}' has no resolved value; leaving literal");
                    caps[0].to_string()
                }
            }
        })
        .into_owned()
}
