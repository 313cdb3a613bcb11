//! Token counting and encoding.
//!
//! Chunk budgets are expressed in tokens of the `cl100k_base` encoding, the
//! same vocabulary the embedding providers bill against, so chunk sizes line
//! up with model context limits.

use crate::error::{QuotientError, Result};
use std::sync::Arc;
use tiktoken_rs::{cl100k_base, CoreBPE};

/// Token-level view of text, used by the chunker.
pub trait Tokenizer: Send + Sync {
    /// Encode text into token ids.
    fn encode(&self, text: &str) -> Vec<u32>;

    /// Decode token ids back into text.
    fn decode(&self, tokens: &[u32]) -> Result<String>;

    /// Count tokens in text.
    fn count(&self, text: &str) -> usize {
        self.encode(text).len()
    }
}

/// `cl100k_base` tokenizer (GPT-4 / embedding-model compatible).
pub struct Cl100kTokenizer {
    bpe: CoreBPE,
}

impl Cl100kTokenizer {
    pub fn new() -> Result<Self> {
        let bpe = cl100k_base().map_err(|e| QuotientError::Tokenizer(e.to_string()))?;
        Ok(Self { bpe })
    }

    /// Convenience constructor returning a shareable handle.
    pub fn shared() -> Result<Arc<dyn Tokenizer>> {
        Ok(Arc::new(Self::new()?))
    }
}

impl Tokenizer for Cl100kTokenizer {
    fn encode(&self, text: &str) -> Vec<u32> {
        self.bpe.encode_ordinary(text)
    }

    fn decode(&self, tokens: &[u32]) -> Result<String> {
        self.bpe
            .decode(tokens.to_vec())
            .map_err(|e| QuotientError::Tokenizer(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_matches_encode_len() {
        let tokenizer = Cl100kTokenizer::new().unwrap();
        let text = "This is a medium length sentence about consciousness.";
        assert_eq!(tokenizer.count(text), tokenizer.encode(text).len());
        assert!(tokenizer.count(text) > 0);
    }

    #[test]
    fn test_encode_decode_round_trip() {
        let tokenizer = Cl100kTokenizer::new().unwrap();
        let text = "Another one here about the brain.";
        let tokens = tokenizer.encode(text);
        assert_eq!(tokenizer.decode(&tokens).unwrap(), text);
    }

    #[test]
    fn test_empty_text() {
        let tokenizer = Cl100kTokenizer::new().unwrap();
        assert_eq!(tokenizer.count(""), 0);
    }
}
