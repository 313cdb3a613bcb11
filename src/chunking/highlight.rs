//! Highlight extraction: picking the most quotable sentence of a chunk.

use crate::text::split_into_sentences;

/// Conversational filler tokens that make a weak opening for a quote.
/// Matched case-insensitively against the start of the sentence.
const FILLER_OPENERS: &[&str] = &["um", "uh", "like", "yeah", "so", "and", "but", "i mean"];

/// Strategy interface for highlight extraction, so scoring can be swapped
/// without touching the chunker.
pub trait Highlighter: Send + Sync {
    /// Extract a short human-readable excerpt from chunk text, at most
    /// `max_length` characters (ellipsis included).
    fn extract(&self, chunk_text: &str, max_length: usize) -> String;
}

/// Stateless heuristic scorer over sentence candidates.
///
/// Scoring: +10 for a 50-150 char sentence (else +5 for 30-200), +3 when the
/// sentence does not open with a filler token, +2 when it ends with a period.
/// Ties go to the earliest sentence.
pub struct HeuristicHighlighter;

impl HeuristicHighlighter {
    pub fn new() -> Self {
        Self
    }

    fn score(sentence: &str) -> i32 {
        let mut score = 0;
        let length = sentence.chars().count();

        if (50..=150).contains(&length) {
            score += 10;
        } else if (30..=200).contains(&length) {
            score += 5;
        }

        let lower = sentence.to_lowercase();
        if !FILLER_OPENERS.iter().any(|f| lower.starts_with(f)) {
            score += 3;
        }

        if sentence.ends_with('.') {
            score += 2;
        }

        score
    }
}

impl Default for HeuristicHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl Highlighter for HeuristicHighlighter {
    fn extract(&self, chunk_text: &str, max_length: usize) -> String {
        let sentences = split_into_sentences(chunk_text);
        if sentences.is_empty() {
            return truncate(chunk_text, max_length);
        }

        // Strict `>` keeps the first maximal sentence on ties.
        let mut best = &sentences[0];
        let mut best_score = Self::score(best);
        for sentence in &sentences[1..] {
            let score = Self::score(sentence);
            if score > best_score {
                best = sentence;
                best_score = score;
            }
        }

        truncate(best, max_length)
    }
}

/// Truncate to `max_length` characters, replacing the tail with `...`.
fn truncate(text: &str, max_length: usize) -> String {
    if text.chars().count() <= max_length {
        return text.to_string();
    }
    let keep = max_length.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}
