//! Parameter extraction.
//!
//! Runs on the trimmed original text (case preserved) so that titles keep
//! their capitalisation. Every sub-pattern is case-insensitive.

use regex::{Captures, Regex};
use std::sync::OnceLock;

use podium_models::action::{
    PARAM_COUNT, PARAM_QUERY, PARAM_QUESTION, PARAM_RATE, PARAM_SLIDE_NUMBER, PARAM_SLIDE_TITLE,
};
use podium_models::{ActionName, ActionParams};

/// Rate multiplier for "slower".
pub const SLOWER_RATE: f64 = 0.8;

/// Rate multiplier for "faster".
pub const FASTER_RATE: f64 = 1.2;

fn regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("Invalid regex pattern"))
}

/// Extracts the parameters `action` understands from `text`.
pub fn extract_params(text: &str, action: ActionName) -> ActionParams {
    let text = text.trim().replace('ё', "е").replace('Ё', "Е");
    let mut params = ActionParams::new();

    match action {
        ActionName::GotoSlide => extract_goto(&text, &mut params),
        ActionName::SearchWeb => {
            params.insert(PARAM_QUERY, extract_query(&text));
        }
        ActionName::HandleQuestion => {
            params.insert(PARAM_QUESTION, extract_question(&text));
        }
        ActionName::SpeakNextBlock | ActionName::RepeatLastBlock => {
            if let Some(rate) = extract_rate(&text) {
                params.insert(PARAM_RATE, rate);
            }
        }
        ActionName::NextSlide | ActionName::PreviousSlide => {
            if let Some(count) = extract_count(&text) {
                params.insert(PARAM_COUNT, count);
            }
        }
        _ => {}
    }

    params
}

/// Slide number first, then "about ..." fragment, then a numbered section
/// heading. The first sub-pattern that matches wins.
fn extract_goto(text: &str, params: &mut ActionParams) {
    static NUMBER: OnceLock<Regex> = OnceLock::new();
    static BARE_NUMBER: OnceLock<Regex> = OnceLock::new();
    static ABOUT: OnceLock<Regex> = OnceLock::new();
    static SECTION: OnceLock<Regex> = OnceLock::new();

    let number = regex(
        &NUMBER,
        r"(?i)\b(?:слайд\w*|slide)\s*(?:номер\s+|№\s*|number\s+|#\s*)?(\d+)\b",
    );
    let bare_number = regex(
        &BARE_NUMBER,
        r"(?i)\b(?:перейди|переходи|покажи|открой|go\s+to|jump\s+to)\s+(?:на\s+|к\s+)?(\d+)\b",
    );
    let about = regex(
        &ABOUT,
        r"(?i)\b(?:перейди|покажи|открой|найди|go\s+to|show|open|find|слайд|slide)\s+(?:на\s+|к\s+)?(?:слайд\w*\s+|slide\s+)?(?:про|об|о|about)\s+(.+)$",
    );
    let section = regex(&SECTION, r"(?i)(\d{1,3})[.)\s-]+(\p{L}[\p{L}-]*)");

    let slide_number = number
        .captures(text)
        .or_else(|| bare_number.captures(text))
        .and_then(|caps| caps[1].parse::<i64>().ok());
    if let Some(n) = slide_number {
        params.insert(PARAM_SLIDE_NUMBER, n);
        return;
    }

    if let Some(fragment) = about.captures(text).map(|caps| clean_tail(&caps[1])) {
        if !fragment.is_empty() {
            params.insert(PARAM_SLIDE_TITLE, fragment);
            return;
        }
    }

    if let Some(caps) = section.captures(text) {
        params.insert(PARAM_SLIDE_TITLE, format!("{}. {}", &caps[1], capitalize(&caps[2])));
    }
}

/// The search query: whatever follows the search verb and its filler words.
fn extract_query(text: &str) -> String {
    static VERB: OnceLock<Regex> = OnceLock::new();
    static FILLER: OnceLock<Regex> = OnceLock::new();

    let verb = regex(
        &VERB,
        r"(?i)\b(?:найди|поищи|погугли|загугли|search(?:\s+for)?|look\s+up|google)\b",
    );
    let filler = regex(
        &FILLER,
        r"(?i)^(?:в\s+интернете|в\s+сети|в\s+гугле|online|on\s+the\s+web|the\s+web|информацию|info|о|об|про|about|for|[:,\-])(?:\s+|$)",
    );

    let Some(found) = verb.find(text) else {
        return clean_tail(text);
    };

    let mut rest = text[found.end()..].trim_start();
    while let Some(m) = filler.find(rest) {
        rest = rest[m.end()..].trim_start();
    }

    let query = clean_tail(rest);
    if query.is_empty() {
        clean_tail(text)
    } else {
        query
    }
}

/// The question body with leading command phrasing stripped.
fn extract_question(text: &str) -> String {
    static PREFIXES: OnceLock<Vec<Regex>> = OnceLock::new();
    let prefixes = PREFIXES.get_or_init(|| {
        [
            r"(?i)вопрос\s+из\s+(?:зала|аудитории)\s*[:,\-]?\s*(.+)$",
            r"(?i)\b(?:ответь|ответить|отвечай|answer)\s+(?:на\s+)?(?:the\s+|a\s+)?(?:вопрос|запрос|question)\s*[:,\-]?\s*(.+)$",
            r"(?i)^(?:вопрос|question)\s*[:,\-]\s*(.+)$",
            r"(?i)\b(?:ответь|ответить|обработай|answer)\s*[:,\-]?\s*(.+)$",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("Invalid regex pattern"))
        .collect()
    });

    prefixes
        .iter()
        .filter_map(|re| re.captures(text))
        .map(|caps: Captures<'_>| caps[1].trim().to_string())
        .find(|body| !body.is_empty())
        .unwrap_or_else(|| text.to_string())
}

fn extract_rate(text: &str) -> Option<f64> {
    static SLOWER: OnceLock<Regex> = OnceLock::new();
    static FASTER: OnceLock<Regex> = OnceLock::new();

    if regex(&SLOWER, r"(?i)\b(?:медленнее|помедленнее|slower|slowly)\b").is_match(text) {
        Some(SLOWER_RATE)
    } else if regex(&FASTER, r"(?i)\b(?:быстрее|побыстрее|faster|quicker)\b").is_match(text) {
        Some(FASTER_RATE)
    } else {
        None
    }
}

fn extract_count(text: &str) -> Option<i64> {
    static COUNT: OnceLock<Regex> = OnceLock::new();
    let count = regex(
        &COUNT,
        r"(?i)\b(\d{1,2}|один|одна|два|две|три|четыре|пять|шесть|семь|восемь|девять|десять|one|two|three|four|five|six|seven|eight|nine|ten)\s+(?:слайд\w*|slides?)\b",
    );

    let caps = count.captures(text)?;
    let word = caps[1].to_lowercase();
    let n = word.parse::<i64>().ok().or_else(|| number_word(&word))?;
    (n > 0).then_some(n)
}

fn number_word(word: &str) -> Option<i64> {
    let n = match word {
        "один" | "одна" | "one" => 1,
        "два" | "две" | "two" => 2,
        "три" | "three" => 3,
        "четыре" | "four" => 4,
        "пять" | "five" => 5,
        "шесть" | "six" => 6,
        "семь" | "seven" => 7,
        "восемь" | "eight" => 8,
        "девять" | "nine" => 9,
        "десять" | "ten" => 10,
        _ => return None,
    };
    Some(n)
}

fn clean_tail(text: &str) -> String {
    text.trim()
        .trim_end_matches(['.', '!', '?', ',', ';'])
        .trim()
        .to_string()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goto_number_takes_precedence_over_title() {
        let params = extract_params("слайд 4 про здоровье", ActionName::GotoSlide);
        assert_eq!(params.get_i64(PARAM_SLIDE_NUMBER), Some(4));
        assert!(!params.contains(PARAM_SLIDE_TITLE));
    }

    #[test]
    fn test_goto_numbered_section_title() {
        let params = extract_params("4. здоровье", ActionName::GotoSlide);
        assert_eq!(params.get_text(PARAM_SLIDE_TITLE), Some("4. Здоровье"));
        assert!(!params.contains(PARAM_SLIDE_NUMBER));
    }

    #[test]
    fn test_goto_about_fragment() {
        let params = extract_params("Покажи слайд про здоровое питание.", ActionName::GotoSlide);
        assert_eq!(params.get_text(PARAM_SLIDE_TITLE), Some("здоровое питание"));
    }

    #[test]
    fn test_goto_variants_of_number() {
        for text in ["перейди к слайду 7", "go to slide 7", "слайд номер 7", "перейди на 7"] {
            let params = extract_params(text, ActionName::GotoSlide);
            assert_eq!(params.get_i64(PARAM_SLIDE_NUMBER), Some(7), "{}", text);
        }
    }

    #[test]
    fn test_goto_large_number_is_kept_for_range_check() {
        let params = extract_params("слайд 1000", ActionName::GotoSlide);
        assert_eq!(params.get_i64(PARAM_SLIDE_NUMBER), Some(1000));

        let params = extract_params("перейди на 2500", ActionName::GotoSlide);
        assert_eq!(params.get_i64(PARAM_SLIDE_NUMBER), Some(2500));
    }

    #[test]
    fn test_search_query_strips_filler() {
        let params = extract_params("Найди в интернете информацию о норме сна?", ActionName::SearchWeb);
        assert_eq!(params.get_text(PARAM_QUERY), Some("норме сна"));

        let params = extract_params("search for rust tokio", ActionName::SearchWeb);
        assert_eq!(params.get_text(PARAM_QUERY), Some("rust tokio"));
    }

    #[test]
    fn test_search_without_verb_uses_whole_text() {
        let params = extract_params("курс доллара", ActionName::SearchWeb);
        assert_eq!(params.get_text(PARAM_QUERY), Some("курс доллара"));
    }

    #[test]
    fn test_question_body() {
        let params = extract_params(
            "Ответь на вопрос: сколько часов нужно спать?",
            ActionName::HandleQuestion,
        );
        assert_eq!(params.get_text(PARAM_QUESTION), Some("сколько часов нужно спать?"));

        let params = extract_params("Вопрос из зала: зачем пить воду", ActionName::HandleQuestion);
        assert_eq!(params.get_text(PARAM_QUESTION), Some("зачем пить воду"));
    }

    #[test]
    fn test_rate_modifiers() {
        let params = extract_params("озвучь помедленнее", ActionName::SpeakNextBlock);
        assert_eq!(params.get_f64(PARAM_RATE), Some(SLOWER_RATE));

        let params = extract_params("повтори быстрее", ActionName::RepeatLastBlock);
        assert_eq!(params.get_f64(PARAM_RATE), Some(FASTER_RATE));

        assert!(extract_params("озвучь", ActionName::SpeakNextBlock).is_empty());
    }

    #[test]
    fn test_skip_count() {
        let params = extract_params("вперед на три слайда", ActionName::NextSlide);
        assert_eq!(params.get_i64(PARAM_COUNT), Some(3));

        let params = extract_params("back 2 slides", ActionName::PreviousSlide);
        assert_eq!(params.get_i64(PARAM_COUNT), Some(2));

        assert!(extract_params("следующий слайд", ActionName::NextSlide).is_empty());
    }

    #[test]
    fn test_actions_without_params() {
        assert!(extract_params("пауза на 5 минут", ActionName::Pause).is_empty());
    }
}
