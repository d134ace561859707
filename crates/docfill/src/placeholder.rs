//! Placeholder token model
//!
//! A placeholder is a flat `{{ key }}` token: two opening braces, optional
//! whitespace, a key without braces (dots allowed for namespacing, e.g.
//! `deal.deal_cpf`), optional whitespace, two closing braces. The normalized
//! key is the trimmed capture. Nesting and expressions are not recognized.

use regex::Regex;
use std::sync::LazyLock;

static RE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([^{}]*?)\s*\}\}").expect("valid placeholder regex"));

/// The compiled `{{ key }}` token pattern
#[inline]
pub(crate) fn token_pattern() -> &'static Regex {
    &RE_TOKEN
}

/// Running `count('{') - count('}')` over a text span
///
/// A positive balance after a run's text means a placeholder was opened but
/// not yet closed, which drives the reassembly collection window.
#[inline]
#[must_use]
pub fn brace_balance(text: &str) -> i32 {
    text.chars().fold(0, |acc, c| match c {
        '{' => acc + 1,
        '}' => acc - 1,
        _ => acc,
    })
}

/// One piece of a literal/token split
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Piece {
    /// Text outside any placeholder token
    Literal(String),
    /// A complete `{{ key }}` token
    Token {
        /// The token exactly as matched, braces and inner whitespace included
        raw: String,
        /// The trimmed key inside the braces
        key: String,
    },
}

impl Piece {
    /// The piece's text as it appears in the source string
    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Literal(text) => text,
            Self::Token { raw, .. } => raw,
        }
    }

    /// Whether this piece is a complete token
    #[inline]
    #[must_use]
    pub fn is_token(&self) -> bool {
        matches!(self, Self::Token { .. })
    }
}

/// Split text into alternating literal/token pieces
///
/// The pieces cover the whole string with no gaps or overlaps; empty literals
/// are omitted. Text without any token yields a single literal piece.
#[must_use = "returns the literal/token split of the text"]
pub fn split_pieces(text: &str) -> Vec<Piece> {
    let mut pieces = Vec::new();
    let mut cursor = 0;
    for caps in RE_TOKEN.captures_iter(text) {
        let m = caps.get(0).expect("match group 0 always present");
        if m.start() > cursor {
            pieces.push(Piece::Literal(text[cursor..m.start()].to_string()));
        }
        pieces.push(Piece::Token {
            raw: m.as_str().to_string(),
            key: caps[1].trim().to_string(),
        });
        cursor = m.end();
    }
    if cursor < text.len() {
        pieces.push(Piece::Literal(text[cursor..].to_string()));
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    fn concat(pieces: &[Piece]) -> String {
        pieces.iter().map(Piece::text).collect()
    }

    #[test]
    fn test_balance() {
        assert_eq!(brace_balance(""), 0);
        assert_eq!(brace_balance("{{deal_rg"), 2);
        assert_eq!(brace_balance("{{deal_rg}"), 1);
        assert_eq!(brace_balance("{{deal_rg}}"), 0);
        assert_eq!(brace_balance("}} tail"), -2);
    }

    #[test]
    fn test_split_token_only() {
        let pieces = split_pieces("{{deal_email}}");
        assert_eq!(
            pieces,
            vec![Piece::Token {
                raw: "{{deal_email}}".to_string(),
                key: "deal_email".to_string(),
            }]
        );
    }

    #[test]
    fn test_split_mixed() {
        let text = "Eu, {{deal_full_name}}, RG {{deal_rg}}, declaro";
        let pieces = split_pieces(text);
        assert_eq!(pieces.len(), 5);
        assert!(pieces[1].is_token());
        assert!(pieces[3].is_token());
        assert_eq!(concat(&pieces), text);
    }

    #[test]
    fn test_split_trims_inner_whitespace_in_key_only() {
        let pieces = split_pieces("{{ deal.deal_cpf }}");
        match &pieces[0] {
            Piece::Token { raw, key } => {
                assert_eq!(raw, "{{ deal.deal_cpf }}");
                assert_eq!(key, "deal.deal_cpf");
            }
            Piece::Literal(_) => panic!("expected token piece"),
        }
    }

    #[test]
    fn test_split_no_token() {
        let pieces = split_pieces("nothing here { } {x}");
        assert_eq!(pieces, vec![Piece::Literal("nothing here { } {x}".to_string())]);
    }

    #[test]
    fn test_split_unterminated_is_literal() {
        let pieces = split_pieces("{{deal_rg");
        assert!(pieces.iter().all(|p| !p.is_token()));
        assert_eq!(concat(&pieces), "{{deal_rg");
    }

    #[test]
    fn test_split_covers_adjacent_tokens() {
        let text = "{{a}}{{b}}";
        let pieces = split_pieces(text);
        assert_eq!(pieces.len(), 2);
        assert_eq!(concat(&pieces), text);
    }
}
