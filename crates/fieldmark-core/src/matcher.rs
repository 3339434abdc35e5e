use serde::Serialize;
use strsim::normalized_levenshtein;
use tracing::{event, Level};

use crate::config::LocatorConfig;
use crate::logging::MATCH_LOCATOR;

/// Shortest candidate the substring strategies will search for.
pub const MIN_SUBSTRING_LEN: usize = 2;
/// Shortest candidate (and shortest piece of it) the fuzzy strategy accepts.
pub const MIN_FUZZY_LEN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    Exact,
    CaseInsensitive,
    WhitespaceNormalized,
    LongestSubstring,
}

impl MatchStrategy {
    /// Strategies in the order they are tried.
    pub const CASCADE: [MatchStrategy; 4] = [
        MatchStrategy::Exact,
        MatchStrategy::CaseInsensitive,
        MatchStrategy::WhitespaceNormalized,
        MatchStrategy::LongestSubstring,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            MatchStrategy::Exact => "exact",
            MatchStrategy::CaseInsensitive => "case_insensitive",
            MatchStrategy::WhitespaceNormalized => "whitespace_normalized",
            MatchStrategy::LongestSubstring => "longest_substring",
        }
    }
}

/// Which of the field's strings produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchSource {
    Snippet,
    Value,
}

/// Half-open `[start, end)` span of codepoint offsets into the full text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchSpan {
    pub start: usize,
    pub end: usize,
    pub strategy: MatchStrategy,
    pub source: MatchSource,
}

impl MatchSpan {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Maps a char to a single lowercase char so folded text keeps its offsets.
pub fn fold_char(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

pub fn fold_case(text: &str) -> String {
    text.chars().map(fold_char).collect()
}

/// Folds case and collapses every whitespace run into one space.
///
/// The second value holds, for each char of the normalized string, the
/// offset of the original char it came from (the first char of a run).
pub fn normalize_whitespace(text: &str) -> (String, Vec<usize>) {
    let mut normalized = String::with_capacity(text.len());
    let mut origins = Vec::with_capacity(text.len());
    let mut in_space = false;

    for (offset, c) in text.chars().enumerate() {
        if c.is_whitespace() {
            if !in_space {
                normalized.push(' ');
                origins.push(offset);
            }
            in_space = true;
        } else {
            normalized.push(fold_char(c));
            origins.push(offset);
            in_space = false;
        }
    }

    (normalized, origins)
}

fn char_offset(text: &str, byte_offset: usize) -> usize {
    text[..byte_offset].chars().count()
}

/// The full document text prepared once for every search strategy.
#[derive(Debug, Clone)]
pub struct SearchText {
    original: String,
    folded: String,
    normalized: String,
    origins: Vec<usize>,
    char_len: usize,
}

impl SearchText {
    pub fn new(text: &str) -> Self {
        let (normalized, origins) = normalize_whitespace(text);
        Self {
            original: text.to_string(),
            folded: fold_case(text),
            normalized,
            origins,
            char_len: text.chars().count(),
        }
    }

    /// Chars `[start, end)` of the original text.
    pub fn slice(&self, start: usize, end: usize) -> String {
        self.original
            .chars()
            .skip(start)
            .take(end.saturating_sub(start))
            .collect()
    }
}

/// Finds where a field's snippet or value sits inside the document text.
pub struct MatchLocator<'a> {
    text: &'a SearchText,
    config: LocatorConfig,
}

impl<'a> MatchLocator<'a> {
    pub fn new(text: &'a SearchText, config: LocatorConfig) -> Self {
        Self { text, config }
    }

    /// Runs the cascade and returns the leftmost span of the first strategy
    /// that matches. Each strategy is tried on the snippet, then on the value
    /// when it differs from the snippet.
    pub fn locate(&self, snippet: &str, value: &str) -> Option<MatchSpan> {
        let snippet = snippet.trim();
        let value = value.trim();

        let mut candidates = vec![(MatchSource::Snippet, snippet)];
        if !value.is_empty() && value != snippet {
            candidates.push((MatchSource::Value, value));
        }

        for strategy in MatchStrategy::CASCADE {
            for &(source, candidate) in &candidates {
                if let Some((start, end)) = self.find_with(strategy, candidate) {
                    let span = MatchSpan {
                        start,
                        end,
                        strategy,
                        source,
                    };
                    self.log_match(candidate, &span);
                    return Some(span);
                }
            }
        }

        event!(
            target: MATCH_LOCATOR,
            Level::DEBUG,
            snippet = %snippet,
            value = %value,
            "No strategy located field"
        );
        None
    }

    /// Leftmost `(start, end)` of `candidate` under a single strategy.
    pub fn find_with(&self, strategy: MatchStrategy, candidate: &str) -> Option<(usize, usize)> {
        match strategy {
            MatchStrategy::Exact => self.find_exact(candidate),
            MatchStrategy::CaseInsensitive => self.find_case_insensitive(candidate),
            MatchStrategy::WhitespaceNormalized => self.find_normalized(candidate),
            MatchStrategy::LongestSubstring => self.find_longest_substring(candidate),
        }
    }

    fn find_exact(&self, candidate: &str) -> Option<(usize, usize)> {
        let len = candidate.chars().count();
        if len < MIN_SUBSTRING_LEN {
            return None;
        }
        let byte = self.text.original.find(candidate)?;
        let start = char_offset(&self.text.original, byte);
        Some((start, start + len))
    }

    fn find_case_insensitive(&self, candidate: &str) -> Option<(usize, usize)> {
        let len = candidate.chars().count();
        if len < MIN_SUBSTRING_LEN {
            return None;
        }
        let needle = fold_case(candidate);
        let byte = self.text.folded.find(&needle)?;
        let start = char_offset(&self.text.folded, byte);
        Some((start, start + len))
    }

    fn find_normalized(&self, candidate: &str) -> Option<(usize, usize)> {
        let len = candidate.chars().count();
        if len < MIN_SUBSTRING_LEN {
            return None;
        }
        let (needle, _) = normalize_whitespace(candidate);
        let byte = self.text.normalized.find(&needle)?;
        let position = char_offset(&self.text.normalized, byte);
        let start = *self.text.origins.get(position)?;
        // Original-length end; normalization may have shortened the text.
        let end = (start + len).min(self.text.char_len);
        Some((start, end))
    }

    /// Longest piece of the candidate present anywhere in the text.
    ///
    /// Lengths are tried from the full candidate down to
    /// `max(3, len / 2)`, start positions left to right, so the first hit is
    /// the longest possible match. Worst case is quadratic in the candidate
    /// length times one substring search each; `fuzzy_candidate_cap` bounds it.
    fn find_longest_substring(&self, candidate: &str) -> Option<(usize, usize)> {
        let folded: Vec<char> = candidate.chars().map(fold_char).collect();
        let len = folded.len();
        if len < MIN_FUZZY_LEN {
            return None;
        }
        if let Some(cap) = self.config.fuzzy_candidate_cap {
            if len > cap {
                event!(
                    target: MATCH_LOCATOR,
                    Level::DEBUG,
                    len,
                    cap,
                    "Candidate over fuzzy cap, skipping longest substring"
                );
                return None;
            }
        }

        let min_len = MIN_FUZZY_LEN.max(len / 2);
        for window in (min_len..=len).rev() {
            for from in 0..=(len - window) {
                let piece: String = folded[from..from + window].iter().collect();
                if let Some(byte) = self.text.folded.find(&piece) {
                    let start = char_offset(&self.text.folded, byte);
                    return Some((start, start + window));
                }
            }
        }
        None
    }

    fn log_match(&self, candidate: &str, span: &MatchSpan) {
        if !tracing::enabled!(target: MATCH_LOCATOR, Level::DEBUG) {
            return;
        }
        let matched = self.text.slice(span.start, span.end);
        let similarity = normalized_levenshtein(&fold_case(candidate), &fold_case(&matched));
        event!(
            target: MATCH_LOCATOR,
            Level::DEBUG,
            strategy = span.strategy.name(),
            source = ?span.source,
            start = span.start,
            end = span.end,
            similarity,
            "Located {:?} as {:?}",
            candidate,
            matched
        );
    }
}

/// One-shot locate for callers holding a plain string.
pub fn locate(full_text: &str, snippet: &str, value: &str) -> Option<MatchSpan> {
    let text = SearchText::new(full_text);
    MatchLocator::new(&text, LocatorConfig::default()).locate(snippet, value)
}
