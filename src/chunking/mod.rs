//! Token-bounded transcript chunking.
//!
//! Sentences are greedily packed into chunks of at most `chunk_size` tokens,
//! with a trailing sentence suffix of at most `chunk_overlap` tokens carried
//! into the next chunk so context survives the boundary. A single sentence
//! larger than the budget is force-split into raw token windows; those
//! windows may cut through words, which is accepted for pathological input.

mod highlight;

pub use highlight::{HeuristicHighlighter, Highlighter};

use crate::error::{QuotientError, Result};
use crate::text::split_into_sentences;
use crate::tokenizer::Tokenizer;
use crate::transcript::Transcript;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// A contiguous span of transcript text with a known token count.
#[derive(Debug, Clone)]
pub struct ChunkSpan {
    /// Space-joined sentence text (or a decoded token window for forced
    /// splits).
    pub text: String,
    /// Token count of the span. For sentence-packed spans this is the sum of
    /// the constituent sentence counts.
    pub token_count: usize,
}

/// The chunk interchange record written to JSONL files and carried as vector
/// store metadata. Must round-trip losslessly through serde_json.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChunkRecord {
    pub chunk_id: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight: Option<String>,
    pub episode_number: i64,
    pub episode_title: String,
    pub guest: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub youtube_id: Option<String>,
    pub chunk_index: usize,
    pub total_chunks: usize,
    pub token_count: usize,
}

/// Deterministic chunk id: source identity plus zero-padded sequence index,
/// so reprocessing an unchanged transcript overwrites the same vectors.
///
/// The first six characters of the video id disambiguate episodes that were
/// published as multiple videos.
pub fn chunk_id(prefix: &str, episode_number: i64, youtube_id: Option<&str>, index: usize) -> String {
    match youtube_id {
        Some(yt) if !yt.is_empty() => {
            let short: String = yt.chars().take(6).collect();
            format!("{}-{}-{}-{:04}", prefix, episode_number, short, index)
        }
        _ => format!("{}-{}-chunk-{:04}", prefix, episode_number, index),
    }
}

/// Greedy sentence-aligned chunker with token-bounded overlap.
pub struct TokenChunker {
    chunk_size: usize,
    overlap: usize,
    tokenizer: Arc<dyn Tokenizer>,
}

impl TokenChunker {
    /// Create a chunker. `overlap` must be strictly smaller than
    /// `chunk_size` so forced splitting always advances.
    pub fn new(chunk_size: usize, overlap: usize, tokenizer: Arc<dyn Tokenizer>) -> Result<Self> {
        if chunk_size == 0 {
            return Err(QuotientError::InvalidInput(
                "chunk_size must be positive".to_string(),
            ));
        }
        if overlap >= chunk_size {
            return Err(QuotientError::InvalidInput(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                overlap, chunk_size
            )));
        }
        Ok(Self {
            chunk_size,
            overlap,
            tokenizer,
        })
    }

    /// Segment text into sentences and chunk them.
    pub fn chunk_text(&self, text: &str) -> Result<Vec<ChunkSpan>> {
        self.chunk_sentences(&split_into_sentences(text))
    }

    /// Pack an ordered sentence sequence into chunks.
    ///
    /// An empty sequence yields an empty result, not an error.
    ///
    /// A chunk seeded with carried overlap can exceed `chunk_size` by up to
    /// `overlap` tokens; the budget is strict only when the overlap plus the
    /// longest sentence fits within it.
    pub fn chunk_sentences(&self, sentences: &[String]) -> Result<Vec<ChunkSpan>> {
        let mut chunks: Vec<ChunkSpan> = Vec::new();
        let mut current: Vec<(String, usize)> = Vec::new();
        let mut current_tokens = 0usize;

        for sentence in sentences {
            let sentence_tokens = self.tokenizer.count(sentence);

            // A sentence that cannot fit in any chunk gets its own forced
            // token-window splits.
            if sentence_tokens > self.chunk_size {
                if !current.is_empty() {
                    chunks.push(Self::flush(&mut current, &mut current_tokens));
                }
                self.force_split(sentence, &mut chunks)?;
                continue;
            }

            // Strict `>`: a sentence that exactly fills the budget stays in.
            if current_tokens + sentence_tokens > self.chunk_size {
                if !current.is_empty() {
                    let flushed = Self::flush_keep(&current);
                    chunks.push(flushed);
                }

                // Seed the next chunk with the longest whole-sentence suffix
                // of the flushed chunk that fits the overlap budget.
                let mut overlap_sentences: Vec<(String, usize)> = Vec::new();
                let mut overlap_tokens = 0usize;
                for (sent, count) in current.iter().rev() {
                    if overlap_tokens + count <= self.overlap {
                        overlap_sentences.insert(0, (sent.clone(), *count));
                        overlap_tokens += count;
                    } else {
                        break;
                    }
                }

                current = overlap_sentences;
                current.push((sentence.clone(), sentence_tokens));
                current_tokens = overlap_tokens + sentence_tokens;
            } else {
                current.push((sentence.clone(), sentence_tokens));
                current_tokens += sentence_tokens;
            }
        }

        if !current.is_empty() {
            chunks.push(Self::flush(&mut current, &mut current_tokens));
        }

        debug!("Packed {} sentences into {} chunks", sentences.len(), chunks.len());
        Ok(chunks)
    }

    /// Chunk a transcript and attach ids, highlights, and episode metadata.
    pub fn chunk_transcript(
        &self,
        transcript: &Transcript,
        highlighter: &dyn Highlighter,
        id_prefix: &str,
        highlight_max_length: usize,
    ) -> Result<Vec<ChunkRecord>> {
        let spans = self.chunk_text(&transcript.text)?;
        let total = spans.len();

        Ok(spans
            .into_iter()
            .enumerate()
            .map(|(i, span)| ChunkRecord {
                chunk_id: chunk_id(
                    id_prefix,
                    transcript.episode_number,
                    transcript.youtube_id.as_deref(),
                    i,
                ),
                highlight: Some(highlighter.extract(&span.text, highlight_max_length)),
                text: span.text,
                episode_number: transcript.episode_number,
                episode_title: transcript.title.clone(),
                guest: transcript.guest.clone(),
                youtube_id: transcript.youtube_id.clone(),
                chunk_index: i,
                total_chunks: total,
                token_count: span.token_count,
            })
            .collect())
    }

    /// Split an oversized sentence into raw token windows of `chunk_size`,
    /// stepping by `chunk_size - overlap`.
    fn force_split(&self, sentence: &str, chunks: &mut Vec<ChunkSpan>) -> Result<()> {
        let tokens = self.tokenizer.encode(sentence);
        let step = self.chunk_size - self.overlap;

        let mut start = 0;
        while start < tokens.len() {
            let end = (start + self.chunk_size).min(tokens.len());
            let window = &tokens[start..end];
            chunks.push(ChunkSpan {
                text: self.tokenizer.decode(window)?,
                token_count: window.len(),
            });
            start += step;
        }
        Ok(())
    }

    fn flush(current: &mut Vec<(String, usize)>, current_tokens: &mut usize) -> ChunkSpan {
        let span = Self::flush_keep(current);
        current.clear();
        *current_tokens = 0;
        span
    }

    fn flush_keep(current: &[(String, usize)]) -> ChunkSpan {
        let text = current
            .iter()
            .map(|(s, _)| s.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let token_count = current.iter().map(|(_, c)| c).sum();
        ChunkSpan { text, token_count }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::Cl100kTokenizer;

    /// One token per character; decode is the identity. Gives tests exact
    /// control over token counts.
    struct CharTokenizer;

    impl Tokenizer for CharTokenizer {
        fn encode(&self, text: &str) -> Vec<u32> {
            text.chars().map(|c| c as u32).collect()
        }

        fn decode(&self, tokens: &[u32]) -> Result<String> {
            Ok(tokens
                .iter()
                .filter_map(|&t| char::from_u32(t))
                .collect())
        }
    }

    fn chunker(size: usize, overlap: usize) -> TokenChunker {
        TokenChunker::new(size, overlap, Arc::new(CharTokenizer)).unwrap()
    }

    fn sentences(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_input_yields_no_chunks() {
        let spans = chunker(100, 10).chunk_sentences(&[]).unwrap();
        assert!(spans.is_empty());
    }

    #[test]
    fn test_single_chunk_when_everything_fits() {
        // Three sentences, budget big enough for all of them, no overlap
        let tokenizer = Arc::new(Cl100kTokenizer::new().unwrap());
        let chunker = TokenChunker::new(512, 0, tokenizer.clone()).unwrap();

        let input = sentences(&[
            "Short.",
            "This is a medium length sentence about consciousness.",
            "Another one here about the brain.",
        ]);
        let spans = chunker.chunk_sentences(&input).unwrap();

        assert_eq!(spans.len(), 1);
        assert_eq!(
            spans[0].text,
            "Short. This is a medium length sentence about consciousness. Another one here about the brain."
        );
        let expected: usize = input.iter().map(|s| tokenizer.count(s)).sum();
        assert_eq!(spans[0].token_count, expected);
    }

    #[test]
    fn test_token_bound_respected() {
        let input = sentences(&[
            "aaaaaaaaaa", // 10 tokens each
            "bbbbbbbbbb",
            "cccccccccc",
            "dddddddddd",
            "eeeeeeeeee",
        ]);
        let spans = chunker(25, 0).chunk_sentences(&input).unwrap();

        for span in &spans {
            assert!(span.token_count <= 25, "chunk exceeded budget: {:?}", span);
        }
        assert_eq!(spans.len(), 3);
        assert_eq!(spans[0].text, "aaaaaaaaaa bbbbbbbbbb");
    }

    #[test]
    fn test_exact_fit_is_included_not_deferred() {
        // 10 + 10 = 20 == budget: second sentence stays in the first chunk
        let input = sentences(&["aaaaaaaaaa", "bbbbbbbbbb"]);
        let spans = chunker(20, 0).chunk_sentences(&input).unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].token_count, 20);
    }

    #[test]
    fn test_overlap_carries_sentence_suffix() {
        let input = sentences(&["aaaaaaaaaa", "bbbbbbbbbb", "cccccccccc"]);
        // budget 20 fits two sentences; overlap 10 fits exactly one
        let spans = chunker(20, 10).chunk_sentences(&input).unwrap();

        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].text, "aaaaaaaaaa bbbbbbbbbb");
        // second chunk starts with the overlapped suffix of the first
        assert_eq!(spans[1].text, "bbbbbbbbbb cccccccccc");
        assert!(spans[1].token_count <= 20);
    }

    #[test]
    fn test_overlap_suffix_bounded() {
        let input = sentences(&["aaaaaaaaaa", "bbbbbbbbbb", "cccccccccc", "dddddddddd"]);
        let overlap = 15;
        let spans = chunker(20, overlap).chunk_sentences(&input).unwrap();

        // Shared suffix between consecutive chunks never exceeds the overlap
        // budget: with 10-token sentences, at most one sentence carries over.
        for pair in spans.windows(2) {
            let first: Vec<&str> = pair[0].text.split(' ').collect();
            let second: Vec<&str> = pair[1].text.split(' ').collect();
            let shared: usize = first
                .iter()
                .rev()
                .zip(second.iter())
                .take_while(|(a, b)| a == b)
                .count();
            assert!(shared * 10 <= overlap);
        }
    }

    #[test]
    fn test_coverage_no_sentence_dropped_or_reordered() {
        let input = sentences(&[
            "aaaaaaaaaa",
            "bbbbbbbbbb",
            "cccccccccc",
            "dddddddddd",
            "eeeeeeeeee",
            "ffffffffff",
        ]);
        let spans = chunker(25, 10).chunk_sentences(&input).unwrap();

        // Every sentence appears, in input order, ignoring overlap repeats.
        let mut flattened: Vec<String> = Vec::new();
        for span in &spans {
            for word in span.text.split(' ') {
                if flattened.last().map(|w: &String| w.as_str()) != Some(word) {
                    flattened.push(word.to_string());
                }
            }
        }
        assert_eq!(flattened, input);
    }

    #[test]
    fn test_oversized_sentence_force_split() {
        let long = "x".repeat(50);
        let input = sentences(&["aaaaaaaaaa", &long, "bbbbbbbbbb"]);
        let spans = chunker(20, 5).chunk_sentences(&input).unwrap();

        // accumulator flushed first, then token windows, then the tail
        assert_eq!(spans[0].text, "aaaaaaaaaa");
        // windows of 20 stepping 15 over 50 tokens: [0..20], [15..35], [30..50], [45..50]
        assert_eq!(spans[1].token_count, 20);
        assert_eq!(spans[2].token_count, 20);
        assert_eq!(spans[3].token_count, 20);
        assert_eq!(spans[4].token_count, 5);
        assert_eq!(spans.last().unwrap().text, "bbbbbbbbbb");
    }

    #[test]
    fn test_overlap_seed_can_exceed_budget() {
        // 12-token sentences with budget 20 and overlap 15: each flush
        // carries one sentence, so seeded chunks hold 24 tokens. The budget
        // holds strictly only when overlap + longest sentence <= size.
        let input = sentences(&["aaaaaaaaaaaa", "bbbbbbbbbbbb", "cccccccccccc"]);
        let spans = chunker(20, 15).chunk_sentences(&input).unwrap();

        assert_eq!(spans.len(), 3);
        assert_eq!(spans[0].token_count, 12);
        assert_eq!(spans[1].text, "aaaaaaaaaaaa bbbbbbbbbbbb");
        assert_eq!(spans[1].token_count, 24);
        assert_eq!(spans[2].token_count, 24);
    }

    #[test]
    fn test_overlap_must_be_smaller_than_size() {
        let result = TokenChunker::new(100, 100, Arc::new(CharTokenizer));
        assert!(result.is_err());
    }

    #[test]
    fn test_chunk_ids_deterministic_and_idempotent() {
        assert_eq!(chunk_id("pod", 1169, Some("dC0ZGDz90pQ"), 7), "pod-1169-dC0ZGD-0007");
        assert_eq!(
            chunk_id("pod", 1169, Some("dC0ZGDz90pQ"), 7),
            chunk_id("pod", 1169, Some("dC0ZGDz90pQ"), 7)
        );
        assert_eq!(chunk_id("pod", 42, None, 0), "pod-42-chunk-0000");
    }

    #[test]
    fn test_chunk_transcript_records() {
        let tokenizer = Arc::new(CharTokenizer);
        let chunker = TokenChunker::new(80, 0, tokenizer).unwrap();
        let highlighter = HeuristicHighlighter::new();

        let transcript = Transcript {
            episode_number: 1169,
            title: "Elon Musk".to_string(),
            guest: "Elon Musk".to_string(),
            youtube_id: Some("ycPr5-27vSI".to_string()),
            source: "ycPr5-27vSI.vtt".to_string(),
            text: "The first sentence talks about rockets and engineering constraints. \
                   The second sentence talks about batteries and production lines."
                .to_string(),
        };

        let records = chunker
            .chunk_transcript(&transcript, &highlighter, "pod", 200)
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].chunk_id, "pod-1169-ycPr5--0000");
        assert_eq!(records[0].chunk_index, 0);
        assert_eq!(records[0].total_chunks, 2);
        assert_eq!(records[1].chunk_index, 1);
        assert!(records.iter().all(|r| r.guest == "Elon Musk"));
        assert!(records.iter().all(|r| r.highlight.is_some()));

        // Reprocessing yields identical ids and text (idempotency).
        let again = chunker
            .chunk_transcript(&transcript, &highlighter, "pod", 200)
            .unwrap();
        assert_eq!(records, again);
    }

    #[test]
    fn test_record_jsonl_round_trip() {
        let record = ChunkRecord {
            chunk_id: "pod-1169-ycPr5--0003".to_string(),
            text: "Some chunk text here.".to_string(),
            highlight: Some("Some chunk text here.".to_string()),
            episode_number: 1169,
            episode_title: "Elon Musk".to_string(),
            guest: "Elon Musk".to_string(),
            youtube_id: Some("ycPr5-27vSI".to_string()),
            chunk_index: 3,
            total_chunks: 10,
            token_count: 6,
        };

        let line = serde_json::to_string(&record).unwrap();
        let parsed: ChunkRecord = serde_json::from_str(&line).unwrap();
        assert_eq!(record, parsed);
    }
}
