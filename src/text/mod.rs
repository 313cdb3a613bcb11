//! Transcript text processing.
//!
//! Turns raw transcript files (plain text or subtitle formats) into clean
//! prose and splits that prose into sentence units for chunking.

mod normalize;
mod sentences;

pub use normalize::{TextNormalizer, TranscriptFormat};
pub use sentences::split_into_sentences;
