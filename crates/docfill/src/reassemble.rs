//! Placeholder reassembly across split runs
//!
//! Word-style authoring tools routinely break a `{{placeholder}}` across
//! several runs, interleaved with proofing marks or bookmark elements. This
//! pass guarantees every placeholder ends up fully contained in a single run
//! so the substitution engine can match it with one regex pass.
//!
//! The loop is an explicit index-driven state machine: skip, open a
//! collection window on a run with an unbalanced `{{`, accumulate displayed
//! text until the brace balance closes, split the combined text into
//! literal/token pieces, and emit one cloned run per piece. Anything that
//! cannot be closed is re-emitted verbatim; the worst case is a byte-for-byte
//! pass-through of the input.

use crate::placeholder::{brace_balance, split_pieces, Piece};
use crate::run::{clone_with_text, extract_text};
use crate::scan::scan;
use log::{debug, warn};

/// Merge runs so every placeholder is contained in exactly one run
///
/// Idempotent on clean input: a part whose placeholders are already
/// single-run-contained is returned unchanged, byte-for-byte. Never panics;
/// displayed text is never dropped or duplicated.
#[must_use = "returns the repaired part, the input is not modified"]
pub fn reassemble(xml_part: &str) -> String {
    let segments = scan(xml_part);
    let mut out = String::with_capacity(xml_part.len());

    let mut i = 0;
    while i < segments.len() {
        let seg = &segments[i];
        if !seg.is_run() {
            out.push_str(&seg.text);
            i += 1;
            continue;
        }

        let text = extract_text(&seg.text);
        if !text.contains("{{") {
            out.push_str(&seg.text);
            i += 1;
            continue;
        }
        // Already well-formed within this single run: leave untouched.
        if text.contains("}}") && brace_balance(&text) <= 0 {
            out.push_str(&seg.text);
            i += 1;
            continue;
        }

        // Collection window: accumulate displayed text from following runs
        // until the brace balance closes. Non-run segments join the window
        // but contribute no text.
        let mut combined = text;
        let mut balance = brace_balance(&combined);
        let mut end = i + 1;
        while balance > 0 && end < segments.len() {
            let next = &segments[end];
            if next.is_run() {
                let t = extract_text(&next.text);
                balance += brace_balance(&t);
                combined.push_str(&t);
            }
            end += 1;
        }

        let closed = balance <= 0 && combined.contains("}}");
        let pieces = if closed { split_pieces(&combined) } else { Vec::new() };

        if closed && pieces.iter().any(Piece::is_token) {
            debug!(
                "merged {} segment(s) into {} run(s) for '{combined}'",
                end - i,
                pieces.len()
            );
            // The window's Other segments were split markers between the
            // merged runs and are dropped; the first run donates the
            // formatting shell for every emitted piece.
            let template = &segments[i].text;
            for piece in &pieces {
                if !piece.text().is_empty() {
                    out.push_str(&clone_with_text(template, piece.text()));
                }
            }
        } else {
            // Unterminated placeholder, or braces that balanced out without
            // ever forming a token: nothing to repair, never guess.
            if !closed {
                warn!("unterminated placeholder in '{combined}'; leaving window untouched");
            }
            for seg in &segments[i..end] {
                out.push_str(&seg.text);
            }
        }
        i = end;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn part_of(run_texts: &[&str]) -> String {
        run_texts
            .iter()
            .map(|t| format!("<w:r><w:t>{t}</w:t></w:r>"))
            .collect()
    }

    fn all_text(part: &str) -> String {
        scan(part)
            .iter()
            .filter(|s| s.is_run())
            .map(|s| extract_text(&s.text))
            .collect()
    }

    #[test]
    fn test_idempotent_on_clean_input() {
        let part = format!(
            "<w:p>{}</w:p>",
            part_of(&["Eu, ", "{{deal_full_name}}", ", declaro"])
        );
        assert_eq!(reassemble(&part), part);
    }

    #[test]
    fn test_merges_three_way_split() {
        let part = part_of(&["{{", "deal_full_name", "}}"]);
        let merged = reassemble(&part);
        assert_eq!(merged, "<w:r><w:t>{{deal_full_name}}</w:t></w:r>");
    }

    #[test]
    fn test_split_markers_between_runs_are_dropped() {
        let part = "<w:r><w:t>{{</w:t></w:r><w:proofErr w:type=\"spellStart\"/>\
                    <w:r><w:t>deal_cpf</w:t></w:r><w:proofErr w:type=\"spellEnd\"/>\
                    <w:r><w:t>}}</w:t></w:r>";
        let merged = reassemble(part);
        assert_eq!(merged, "<w:r><w:t>{{deal_cpf}}</w:t></w:r>");
    }

    #[test]
    fn test_first_run_donates_formatting() {
        let part = "<w:r><w:rPr><w:b/></w:rPr><w:t>{{</w:t></w:r>\
                    <w:r><w:rPr><w:i/></w:rPr><w:t>deal_rg}}</w:t></w:r>";
        let merged = reassemble(part);
        assert_eq!(
            merged,
            "<w:r><w:rPr><w:b/></w:rPr><w:t>{{deal_rg}}</w:t></w:r>"
        );
    }

    #[test]
    fn test_literal_tail_kept_with_preserve_flag() {
        // Balance closes inside the second run; the tail keeps its leading
        // space in a dedicated run flagged to preserve whitespace.
        let part = part_of(&["{{deal_rg", "}} residente"]);
        let merged = reassemble(&part);
        assert_eq!(
            merged,
            "<w:r><w:t>{{deal_rg}}</w:t></w:r>\
             <w:r><w:t xml:space=\"preserve\"> residente</w:t></w:r>"
        );
    }

    #[test]
    fn test_stray_close_after_token_stays_literal() {
        let part = part_of(&["{{deal_rg}", "}} residente"]);
        let merged = reassemble(&part);
        assert_eq!(
            merged,
            "<w:r><w:t>{{deal_rg}}</w:t></w:r>\
             <w:r><w:t>} residente</w:t></w:r>"
        );
    }

    #[test]
    fn test_near_miss_braces_pass_through_verbatim() {
        // `{` + ` }` never forms a token; the window is re-emitted untouched,
        // preserve flags and all.
        let part = "<w:r><w:t>{{deal_rg}</w:t></w:r>\
                    <w:r><w:t xml:space=\"preserve\"> }, residente</w:t></w:r>";
        assert_eq!(reassemble(part), part);
    }

    #[test]
    fn test_unterminated_placeholder_passes_through() {
        let part = part_of(&["antes ", "{{deal_rg", " depois"]);
        assert_eq!(reassemble(&part), part);
    }

    #[test]
    fn test_whitespace_inside_split_token_survives() {
        let part = part_of(&["{{ deal.deal_cpf", " }}, CPF"]);
        let merged = reassemble(&part);
        assert_eq!(
            merged,
            "<w:r><w:t>{{ deal.deal_cpf }}</w:t></w:r>\
             <w:r><w:t>, CPF</w:t></w:r>"
        );
    }

    #[test]
    fn test_no_runs_is_identity() {
        let part = "<w:p><w:pPr><w:jc w:val=\"both\"/></w:pPr></w:p>";
        assert_eq!(reassemble(part), part);
    }

    proptest! {
        #[test]
        fn prop_displayed_text_never_lost(
            texts in proptest::collection::vec("[a-z{} ]{0,10}", 1..6),
        ) {
            let part = part_of(&texts.iter().map(String::as_str).collect::<Vec<_>>());
            let merged = reassemble(&part);
            prop_assert_eq!(all_text(&merged), all_text(&part));
        }

        #[test]
        fn prop_identity_when_tokens_are_single_run(
            texts in proptest::collection::vec(
                r"[a-z ]{0,6}(\{\{[a-z_.]{1,8}\}\})?[a-z ]{0,4}",
                1..6,
            ),
        ) {
            // Every placeholder already sits inside one run, so the pass
            // must return the part unchanged, byte-for-byte.
            let part = part_of(&texts.iter().map(String::as_str).collect::<Vec<_>>());
            prop_assert_eq!(reassemble(&part), part);
        }
    }
}
