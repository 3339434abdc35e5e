mod common;

use fieldmark_core::config::LocatorConfig;
use fieldmark_core::matcher::{fold_case, normalize_whitespace};
use fieldmark_core::{locate, MatchLocator, MatchSource, MatchStrategy, SearchText};
use pretty_assertions::assert_eq;

use common::POLICY_TEXT;

fn span_of(text: &str, snippet: &str, value: &str) -> Option<(usize, usize, MatchStrategy)> {
    locate(text, snippet, value).map(|s| (s.start, s.end, s.strategy))
}

#[test]
fn test_exact_match_is_deterministic() {
    let first = locate(POLICY_TEXT, "PN-1029", "PN-1029");
    for _ in 0..5 {
        assert_eq!(locate(POLICY_TEXT, "PN-1029", "PN-1029"), first);
    }
    let span = first.unwrap();
    assert_eq!((span.start, span.end), (11, 18));
    assert_eq!(span.strategy, MatchStrategy::Exact);
    assert_eq!(span.source, MatchSource::Snippet);
}

#[test]
fn test_leftmost_occurrence_wins() {
    let text = format!("{}abc{}abc", "-".repeat(5), "-".repeat(32));
    assert_eq!(text.find("abc"), Some(5));
    assert_eq!(text.rfind("abc"), Some(40));

    assert_eq!(span_of(&text, "abc", "abc"), Some((5, 8, MatchStrategy::Exact)));
}

#[test]
fn test_exact_match_short_circuits_looser_strategies() {
    let text = "due: 100 then Due: 100";
    let searchable = SearchText::new(text);
    let locator = MatchLocator::new(&searchable, LocatorConfig::default());

    // The case-insensitive and fuzzy strategies alone would land on offset 0
    assert_eq!(
        locator.find_with(MatchStrategy::CaseInsensitive, "Due: 100"),
        Some((0, 8))
    );
    assert_eq!(
        locator.find_with(MatchStrategy::LongestSubstring, "Due: 100"),
        Some((0, 8))
    );

    let span = locator.locate("Due: 100", "").unwrap();
    assert_eq!((span.start, span.end), (14, 22));
    assert_eq!(span.strategy, MatchStrategy::Exact);
}

#[test]
fn test_case_insensitive_match() {
    assert_eq!(
        span_of(POLICY_TEXT, "insured: JANE doe", ""),
        Some((19, 36, MatchStrategy::CaseInsensitive))
    );
}

#[test]
fn test_whitespace_normalized_match_maps_back_to_original_offsets() {
    let text = "Insured:\n  Jane   Doe";
    let span = locate(text, "jane doe", "").unwrap();

    assert_eq!(span.strategy, MatchStrategy::WhitespaceNormalized);
    assert_eq!(span.start, 11);
    // End is start plus the candidate's own length
    assert_eq!(span.end, 19);
}

#[test]
fn test_whitespace_normalized_end_is_clamped_to_text() {
    let text = "Total\n\n\n\n:  5";
    let span = locate(text, "total : 5", "").unwrap();
    assert_eq!(span.strategy, MatchStrategy::WhitespaceNormalized);
    assert_eq!((span.start, span.end), (0, 9));

    // Candidate is longer than what is left of the text after its start
    let tail = "zz x y";
    let span = locate(tail, "x   y", "").unwrap();
    assert_eq!(span.strategy, MatchStrategy::WhitespaceNormalized);
    assert_eq!((span.start, span.end), (3, 6));
}

#[test]
fn test_fuzzy_match_for_paraphrased_snippet() {
    let span = locate(POLICY_TEXT, "PN 1029", "").unwrap();

    assert_eq!(span.strategy, MatchStrategy::LongestSubstring);
    assert_eq!((span.start, span.end), (14, 18));
    assert_eq!(&POLICY_TEXT[14..18], "1029");
}

#[test]
fn test_fuzzy_match_respects_half_length_minimum() {
    // Longest shared piece is five chars, exactly half of the snippet
    let text = "xx defgh qq";
    let span = locate(text, "abcdefghij", "").unwrap();
    assert_eq!(span.strategy, MatchStrategy::LongestSubstring);
    assert_eq!((span.start, span.end), (3, 8));
    assert!(span.len() >= 5);

    // A four char overlap is below the minimum
    assert_eq!(locate("zz defg zz", "abcdefghij", ""), None);
    assert_eq!(locate("the quick brown fox", "abcdefghij", ""), None);
}

#[test]
fn test_fuzzy_match_prefers_longest_then_leftmost_piece() {
    let text = "cde ... abcd";
    // "abcd" is found at length four before any shorter piece like "cde" is tried
    assert_eq!(
        span_of(text, "abcdeXYZ", ""),
        Some((8, 12, MatchStrategy::LongestSubstring))
    );
}

#[test]
fn test_short_candidates_are_skipped() {
    assert_eq!(locate(POLICY_TEXT, "P", ""), None);
    assert_eq!(locate(POLICY_TEXT, "", ""), None);
    assert_eq!(locate(POLICY_TEXT, "   ", "  "), None);

    // Two chars are enough for the substring strategies
    assert_eq!(span_of(POLICY_TEXT, "No", ""), Some((7, 9, MatchStrategy::Exact)));
    // but fuzzy needs three
    assert_eq!(locate(POLICY_TEXT, "Qz", ""), None);
}

#[test]
fn test_value_is_tried_when_snippet_fails() {
    let span = locate(POLICY_TEXT, "zzzz qqqq", "PN-1029").unwrap();
    assert_eq!(span.source, MatchSource::Value);
    assert_eq!(span.strategy, MatchStrategy::Exact);
    assert_eq!((span.start, span.end), (11, 18));
}

#[test]
fn test_each_strategy_tries_value_before_looser_snippet_match() {
    // "policy no" only matches case-insensitively; the value matches exactly
    let span = locate(POLICY_TEXT, "policy no", "PN-1029").unwrap();
    assert_eq!(span.source, MatchSource::Value);
    assert_eq!(span.strategy, MatchStrategy::Exact);
    assert_eq!(span.start, 11);
}

#[test]
fn test_missing_text_yields_no_match() {
    assert_eq!(locate(POLICY_TEXT, "Total: $9999", ""), None);
    assert_eq!(locate("", "PN-1029", "PN-1029"), None);
}

#[test]
fn test_offsets_count_chars_not_bytes() {
    let text = "Número: Ünïcode ID-42";
    let span = locate(text, "ID-42", "").unwrap();
    assert_eq!((span.start, span.end), (16, 21));

    let span = locate(text, "ünïcode", "").unwrap();
    assert_eq!(span.strategy, MatchStrategy::CaseInsensitive);
    assert_eq!((span.start, span.end), (8, 15));
}

#[test]
fn test_fuzzy_cap_skips_long_candidates() {
    let searchable = SearchText::new(POLICY_TEXT);
    let capped = MatchLocator::new(
        &searchable,
        LocatorConfig {
            fuzzy_candidate_cap: Some(5),
        },
    );
    assert_eq!(capped.locate("PN 1029", ""), None);

    let uncapped = MatchLocator::new(&searchable, LocatorConfig::default());
    assert!(uncapped.locate("PN 1029", "").is_some());
}

#[test]
fn test_text_folding_keeps_char_count() {
    let text = "İSTANBUL Straße";
    assert_eq!(fold_case(text).chars().count(), text.chars().count());

    let (normalized, origins) = normalize_whitespace("A \t B\n\nc");
    assert_eq!(normalized, "a b c");
    assert_eq!(origins, vec![0, 1, 4, 5, 7]);
}
