//! Turning display text into speakable text.
//!
//! Display messages may carry markup, links and emoji. Speech engines read
//! those literally, so anything headed for synthesis goes through
//! [`to_speakable`] first.

use regex::Regex;
use std::sync::OnceLock;

/// Default cap for vocalized text, in characters.
pub const DEFAULT_SPEECH_LIMIT: usize = 600;

fn url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"https?://\S+").expect("Invalid regex pattern"))
}

fn markup_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[*_`#>\[\]|]+").expect("Invalid regex pattern"))
}

fn whitespace_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[ \t]+").expect("Invalid regex pattern"))
}

/// Splits slide text into non-empty, trimmed paragraphs.
pub fn split_paragraphs(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Strips links, markdown markup and pictographs, and collapses spaces.
pub fn to_speakable(text: &str) -> String {
    let without_urls = url_regex().replace_all(text, "");
    let without_markup = markup_regex().replace_all(&without_urls, "");
    let without_symbols: String = without_markup
        .chars()
        .filter(|c| !is_pictograph(*c))
        .collect();

    without_symbols
        .lines()
        .map(|line| whitespace_regex().replace_all(line.trim(), " ").into_owned())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Truncates at a sentence or word boundary to at most `max_chars`.
pub fn truncate_for_speech(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let cut: String = text.chars().take(max_chars).collect();
    let sentence_end = cut.rfind(['.', '!', '?']).map(|i| i + 1);
    let boundary = sentence_end
        .filter(|i| *i > cut.len() / 2)
        .or_else(|| cut.rfind(char::is_whitespace))
        .unwrap_or(cut.len());

    let mut out = cut[..boundary].trim_end().to_string();
    if sentence_end != Some(boundary) {
        out.push('…');
    }
    out
}

fn is_pictograph(c: char) -> bool {
    matches!(c as u32,
        0x1F000..=0x1FAFF   // emoji blocks
        | 0x2600..=0x27BF   // misc symbols, dingbats
        | 0xFE0F            // variation selector
        | 0x200D)           // zero-width joiner
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_paragraphs_skips_blank_lines() {
        let text = "Заголовок\n\n  Первый пункт  \nВторой пункт\n";
        assert_eq!(
            split_paragraphs(text),
            vec!["Заголовок", "Первый пункт", "Второй пункт"]
        );
    }

    #[test]
    fn test_to_speakable_strips_markup_links_and_emoji() {
        let text = "📊 **Резюме**: см. https://example.org/x   подробнее";
        assert_eq!(to_speakable(text), "Резюме: см. подробнее");
    }

    #[test]
    fn test_truncate_prefers_sentence_boundary() {
        let text = "Первое предложение. Второе предложение довольно длинное.";
        assert_eq!(truncate_for_speech(text, 30), "Первое предложение.");
    }

    #[test]
    fn test_truncate_falls_back_to_word_boundary() {
        let text = "слово слово слово слово";
        assert_eq!(truncate_for_speech(text, 14), "слово слово…");
    }

    #[test]
    fn test_truncate_keeps_short_text() {
        assert_eq!(truncate_for_speech("коротко", 100), "коротко");
    }
}
