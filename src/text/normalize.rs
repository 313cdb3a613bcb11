//! Subtitle stripping and whitespace normalization.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Source format of a raw transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptFormat {
    /// Plain prose, possibly with speaker labels and stray timestamps.
    Plain,
    /// SubRip subtitles (cue index, timestamp range, text lines).
    Srt,
    /// WebVTT subtitles (WEBVTT header, cue timestamps, text lines).
    Vtt,
}

impl TranscriptFormat {
    /// Infer the format from a file name, defaulting to plain text.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("srt") => TranscriptFormat::Srt,
            Some(ext) if ext.eq_ignore_ascii_case("vtt") => TranscriptFormat::Vtt,
            _ => TranscriptFormat::Plain,
        }
    }
}

impl std::str::FromStr for TranscriptFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "plain" | "txt" | "text" => Ok(TranscriptFormat::Plain),
            "srt" => Ok(TranscriptFormat::Srt),
            "vtt" | "webvtt" => Ok(TranscriptFormat::Vtt),
            _ => Err(format!("Unknown transcript format: {}", s)),
        }
    }
}

/// Strips subtitle formatting from raw transcript text.
///
/// Malformed input degrades gracefully: whatever text lines survive the
/// filters are kept, and the worst case is an empty string.
pub struct TextNormalizer {
    timestamp_line: Regex,
    timestamp_inline: Regex,
    markup_tag: Regex,
    speaker_label: Regex,
    whitespace: Regex,
    cue_index: Regex,
}

impl TextNormalizer {
    pub fn new() -> Self {
        Self {
            // Lines that begin with an HH:MM:SS cue timestamp
            timestamp_line: Regex::new(r"^\d{2}:\d{2}").unwrap(),
            timestamp_inline: Regex::new(r"\d{2}:\d{2}:\d{2}").unwrap(),
            markup_tag: Regex::new(r"<[^>]+>").unwrap(),
            speaker_label: Regex::new(r"Speaker\s*\d+:\s*").unwrap(),
            whitespace: Regex::new(r"\s+").unwrap(),
            cue_index: Regex::new(r"^\d+$").unwrap(),
        }
    }

    /// Normalize raw transcript text to plain prose.
    pub fn normalize(&self, raw: &str, format: TranscriptFormat) -> String {
        match format {
            TranscriptFormat::Plain => self.clean_text(raw),
            TranscriptFormat::Srt => self.parse_srt(raw),
            TranscriptFormat::Vtt => self.parse_vtt(raw),
        }
    }

    /// Clean already-plain transcript text: drop speaker labels and stray
    /// timestamps, collapse whitespace.
    fn clean_text(&self, text: &str) -> String {
        let text = self.speaker_label.replace_all(text, "");
        let text = self.timestamp_inline.replace_all(&text, "");
        self.whitespace.replace_all(&text, " ").trim().to_string()
    }

    /// Extract plain text from SRT subtitles.
    fn parse_srt(&self, content: &str) -> String {
        let mut lines = Vec::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || self.cue_index.is_match(line) {
                continue;
            }
            if self.timestamp_line.is_match(line) {
                continue;
            }
            let line = self.markup_tag.replace_all(line, "");
            let line = line.trim();
            if !line.is_empty() {
                lines.push(line.to_string());
            }
        }
        self.clean_text(&lines.join(" "))
    }

    /// Extract plain text from VTT subtitles.
    fn parse_vtt(&self, content: &str) -> String {
        let mut lines = Vec::new();
        let mut in_cue = false;

        for line in content.lines() {
            let line = line.trim();
            if line == "WEBVTT" || line.starts_with("Kind:") || line.starts_with("Language:") {
                continue;
            }
            if line.contains("-->") {
                in_cue = true;
                continue;
            }
            if line.is_empty() {
                in_cue = false;
                continue;
            }
            if self.cue_index.is_match(line) {
                continue;
            }
            if in_cue || !self.timestamp_line.is_match(line) {
                let line = self.markup_tag.replace_all(line, "");
                let line = line.trim();
                if !line.is_empty() {
                    lines.push(line.to_string());
                }
            }
        }

        self.clean_text(&lines.join(" "))
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}
