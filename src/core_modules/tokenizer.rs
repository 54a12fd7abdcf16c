// THEORY:
// The `tokenizer` is the entry gate of the whole engine: it turns a raw document
// into the ordered token sequence every later stage consumes. Order matters —
// token adjacency in this sequence becomes cell adjacency on the canvas, so the
// tokenizer must produce the same sequence no matter how the work is scheduled.
//
// Key architectural principles:
// 1.  **Mode as a Closed Enum**: The splitting strategy is parsed once from its
//     string tag into `TokenizeMode` and dispatched as an enum, never re-parsed
//     per call. Unknown tags behave as whitespace splitting.
// 2.  **Forgiving Custom Separators**: A custom separator is interpreted as a
//     regex; if it fails to compile, the tokenizer silently falls back to a
//     literal split on the raw separator (or "," when empty). A bad pattern is
//     user input, not an error.
// 3.  **Order-Preserving Parallelism**: Above a size threshold the document is
//     split on line boundaries into one balanced chunk per worker, each chunk is
//     tokenized independently under the same mode, and the results are
//     concatenated in chunk order. This is the only place where merge order
//     matters, since reordering would change token adjacency. Any failure in the
//     parallel path degrades to single-threaded tokenization of the whole text.

use crate::worker_pool;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Inputs below this many characters always tokenize single-threaded.
const PARALLEL_TOKENIZE_MIN_CHARS: usize = 500_000;
/// Ceiling on tokenization workers regardless of available cores.
const MAX_TOKENIZE_WORKERS: usize = 32;

pub type Token = String;

/// The splitting strategy applied to the raw document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenizeMode {
    /// Split on runs of whitespace; empty pieces dropped.
    Words,
    /// One token per character, keeping spaces but dropping other whitespace.
    Chars,
    /// Split on runs of line breaks; empty pieces dropped.
    Lines,
    /// Split on a user-supplied separator pattern; pieces trimmed.
    Custom,
}

impl TokenizeMode {
    /// Unknown tags behave as `Words`.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "chars" => TokenizeMode::Chars,
            "lines" => TokenizeMode::Lines,
            "custom" => TokenizeMode::Custom,
            _ => TokenizeMode::Words,
        }
    }
}

/// Splits `text` into an ordered token sequence. Empty input yields an empty
/// sequence. Large inputs are tokenized by parallel workers chunked on line
/// boundaries; the result is identical to the single-threaded path.
pub fn tokenize(text: &str, mode: TokenizeMode, custom_sep: &str) -> Vec<Token> {
    let raw = text.trim();
    if raw.is_empty() {
        return Vec::new();
    }

    let workers = num_cpus::get().clamp(1, MAX_TOKENIZE_WORKERS);
    if raw.len() >= PARALLEL_TOKENIZE_MIN_CHARS && workers > 1 {
        if let Some(tokens) = tokenize_parallel(raw, mode, custom_sep, workers) {
            return tokens;
        }
        log::warn!("parallel tokenization unavailable; tokenizing single-threaded");
    }
    tokenize_single(raw, mode, custom_sep)
}

fn tokenize_single(raw: &str, mode: TokenizeMode, custom_sep: &str) -> Vec<Token> {
    match mode {
        TokenizeMode::Words => raw.split_whitespace().map(str::to_string).collect(),
        TokenizeMode::Chars => raw
            .chars()
            .filter(|&c| !c.is_whitespace() || c == ' ')
            .map(|c| c.to_string())
            .collect(),
        TokenizeMode::Lines => raw
            .split(['\r', '\n'])
            .filter(|piece| !piece.is_empty())
            .map(str::to_string)
            .collect(),
        TokenizeMode::Custom => {
            let sep = if custom_sep.is_empty() { "," } else { custom_sep };
            match Regex::new(sep) {
                Ok(re) => re
                    .split(raw)
                    .map(str::trim)
                    .filter(|piece| !piece.is_empty())
                    .map(str::to_string)
                    .collect(),
                // Not a valid pattern: treat the separator literally.
                Err(_) => raw
                    .split(sep)
                    .map(str::trim)
                    .filter(|piece| !piece.is_empty())
                    .map(str::to_string)
                    .collect(),
            }
        }
    }
}

/// Chunks the document on line boundaries, one balanced chunk per worker, and
/// tokenizes the chunks concurrently. Returns `None` whenever the parallel path
/// cannot run, leaving the caller to tokenize sequentially.
fn tokenize_parallel(
    raw: &str,
    mode: TokenizeMode,
    custom_sep: &str,
    workers: usize,
) -> Option<Vec<Token>> {
    let lines: Vec<&str> = raw
        .split(['\r', '\n'])
        .filter(|line| !line.is_empty())
        .collect();
    if lines.is_empty() {
        return None;
    }

    let chunk_count = workers.min(lines.len()).max(1);
    let chunk_len = lines.len().div_ceil(chunk_count);
    let chunks: Vec<String> = lines.chunks(chunk_len).map(|seg| seg.join("\n")).collect();
    if chunks.is_empty() {
        return None;
    }

    let sep: String = if custom_sep.is_empty() { "," } else { custom_sep }.to_string();
    let results = worker_pool::dispatch_ordered(chunk_count, chunks, move |chunk: &String| {
        tokenize_single(chunk, mode, &sep)
    })?;
    Some(results.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_splits_on_whitespace_runs() {
        assert_eq!(
            tokenize("the  quick\n\tbrown fox", TokenizeMode::Words, ","),
            vec!["the", "quick", "brown", "fox"]
        );
    }

    #[test]
    fn chars_keeps_spaces_but_drops_other_whitespace() {
        assert_eq!(
            tokenize("a b\tc\nd", TokenizeMode::Chars, ","),
            vec!["a", " ", "b", "c", "d"]
        );
    }

    #[test]
    fn lines_drops_blank_lines() {
        assert_eq!(
            tokenize("line1\nline2\n\nline3", TokenizeMode::Lines, ","),
            vec!["line1", "line2", "line3"]
        );
    }

    #[test]
    fn custom_trims_each_piece() {
        assert_eq!(
            tokenize("a, b ,c", TokenizeMode::Custom, ","),
            vec!["a", "b", "c"]
        );
    }

    #[test]
    fn custom_separator_may_be_a_pattern() {
        assert_eq!(
            tokenize("a1b22c333d", TokenizeMode::Custom, r"\d+"),
            vec!["a", "b", "c", "d"]
        );
    }

    #[test]
    fn invalid_pattern_falls_back_to_literal_split() {
        // "[" does not compile as a regex, so it splits literally.
        assert_eq!(
            tokenize("a[b[c", TokenizeMode::Custom, "["),
            vec!["a", "b", "c"]
        );
    }

    #[test]
    fn empty_custom_separator_splits_on_commas() {
        assert_eq!(
            tokenize("a,b,c", TokenizeMode::Custom, ""),
            vec!["a", "b", "c"]
        );
    }

    #[test]
    fn empty_input_yields_no_tokens() {
        assert!(tokenize("", TokenizeMode::Words, ",").is_empty());
        assert!(tokenize("   \n\t ", TokenizeMode::Words, ",").is_empty());
    }

    #[test]
    fn unknown_mode_tag_behaves_as_words() {
        assert_eq!(TokenizeMode::from_tag("sentences"), TokenizeMode::Words);
    }

    #[test]
    fn parallel_path_matches_single_threaded_output() {
        // Build a document comfortably above the parallel threshold.
        let line = "alpha beta gamma delta epsilon zeta";
        let count = PARALLEL_TOKENIZE_MIN_CHARS / line.len() + 64;
        let text = vec![line; count].join("\n");
        assert!(text.len() >= PARALLEL_TOKENIZE_MIN_CHARS);

        let parallel = tokenize(&text, TokenizeMode::Words, ",");
        let sequential = tokenize_single(text.trim(), TokenizeMode::Words, ",");
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn parallel_lines_mode_preserves_chunk_order() {
        let mut text = String::new();
        let total = PARALLEL_TOKENIZE_MIN_CHARS / 8;
        for i in 0..total {
            text.push_str(&format!("line{i}\n"));
        }
        let tokens = tokenize(&text, TokenizeMode::Lines, ",");
        assert_eq!(tokens.len(), total);
        assert_eq!(tokens[0], "line0");
        assert_eq!(tokens[total - 1], format!("line{}", total - 1));
    }
}
