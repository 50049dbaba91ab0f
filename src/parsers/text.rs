//! Plain-text helpers shared by the extractors.
//!
//! Lengths are measured in characters, not bytes.

/// Collapses every run of whitespace into a single space and trims the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Number of characters in `text`
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Number of words, counted the way the title heuristics expect: one more
/// than the number of individual whitespace characters.
pub fn count_words(text: &str) -> usize {
    text.split(char::is_whitespace).count()
}

/// Cuts `text` to at most `max` characters, marking the cut with `…`
pub fn truncate(text: &str, max: usize) -> String {
    if char_len(text) <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Shortens `input` to whole sentences.
///
/// Sentences (split on `.`) are appended until the text reaches `min`
/// characters, then for as long as each one still fits within `max`. Text
/// still longer than `max` after that is truncated.
pub fn limit_sentences(input: &str, min: usize, max: usize) -> String {
    let sentences: Vec<&str> = input.split('.').collect();
    let mut text = sentences[0].to_string();
    let mut index = 1;

    while char_len(&text) < min && index < sentences.len() {
        text.push('.');
        text.push_str(sentences[index]);
        index += 1;
    }

    while char_len(&text) < max && index < sentences.len() {
        let sentence = sentences[index];
        if char_len(&text) + char_len(sentence) + 1 > max {
            return text;
        }
        text.push('.');
        text.push_str(sentence);
        index += 1;
    }

    truncate(&text, max)
}
