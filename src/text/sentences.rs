//! Sentence segmentation over normalized prose.

/// Fragments at or below this many characters are discarded as noise
/// (interjections, broken cue remnants).
const MIN_SENTENCE_CHARS: usize = 10;

/// Split normalized text into sentences.
///
/// A sentence boundary is whitespace immediately following `.`, `!`, or `?`.
/// Order is preserved; empty or whitespace-only input yields an empty vec.
pub fn split_into_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut prev_terminal = false;

    for (i, ch) in text.char_indices() {
        if prev_terminal && ch.is_whitespace() {
            push_sentence(&text[start..i], &mut sentences);
            start = i + ch.len_utf8();
            prev_terminal = false;
        } else {
            prev_terminal = matches!(ch, '.' | '!' | '?');
        }
    }
    push_sentence(&text[start..], &mut sentences);

    sentences
}

fn push_sentence(raw: &str, sentences: &mut Vec<String>) {
    let trimmed = raw.trim();
    if trimmed.chars().count() > MIN_SENTENCE_CHARS {
        sentences.push(trimmed.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_on_terminal_punctuation() {
        let text = "This is the first sentence. And here is another one! Is this a third? Yes indeed it is.";
        let sentences = split_into_sentences(text);
        assert_eq!(
            sentences,
            vec![
                "This is the first sentence.",
                "And here is another one!",
                "Is this a third?",
                "Yes indeed it is.",
            ]
        );
    }

    #[test]
    fn test_drops_short_fragments() {
        let text = "Yeah. This sentence is long enough to keep. Ok.";
        let sentences = split_into_sentences(text);
        assert_eq!(sentences, vec!["This sentence is long enough to keep."]);
    }

    #[test]
    fn test_empty_input() {
        assert!(split_into_sentences("").is_empty());
        assert!(split_into_sentences("   \n\t ").is_empty());
    }

    #[test]
    fn test_order_preserved() {
        let text = "Alpha sentence comes first here. Beta sentence comes second here. Gamma sentence comes third here.";
        let sentences = split_into_sentences(text);
        assert_eq!(sentences.len(), 3);
        assert!(sentences[0].starts_with("Alpha"));
        assert!(sentences[1].starts_with("Beta"));
        assert!(sentences[2].starts_with("Gamma"));
    }
}
