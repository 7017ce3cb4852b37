//! Command pattern table.
//!
//! Each action owns a list of regexes with a fixed confidence. Multi-word
//! phrasings carry higher confidence than single keywords. Patterns run
//! against [`normalize`]d text.

use regex::Regex;
use std::sync::OnceLock;

use podium_models::ActionName;

/// A compiled pattern for matching commands.
#[derive(Debug)]
pub struct Pattern {
    /// Human-readable name for this pattern.
    pub name: &'static str,
    /// The regex pattern.
    regex: Regex,
    /// Confidence level when this pattern matches (0.0 - 1.0).
    pub confidence: f32,
}

impl Pattern {
    /// Creates a new pattern.
    pub fn new(name: &'static str, pattern: &str, confidence: f32) -> Self {
        Self {
            name,
            regex: Regex::new(pattern).expect("Invalid regex pattern"),
            confidence,
        }
    }

    /// Checks if the pattern matches the given text.
    pub fn matches(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// All patterns for one action.
#[derive(Debug)]
pub struct ActionPatterns {
    pub action: ActionName,
    pub patterns: Vec<Pattern>,
}

impl ActionPatterns {
    fn new(action: ActionName, patterns: Vec<Pattern>) -> Self {
        Self { action, patterns }
    }
}

/// The best pattern hit for a piece of text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatternMatch {
    pub action: ActionName,
    pub confidence: f32,
    pub pattern: &'static str,
}

/// Lower-cases, trims and folds `ё` into `е`.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase().replace('ё', "е")
}

/// Returns the command table.
///
/// Order matters only for ties: an earlier action keeps the match unless a
/// later one is strictly more confident.
pub fn command_table() -> &'static [ActionPatterns] {
    static TABLE: OnceLock<Vec<ActionPatterns>> = OnceLock::new();
    TABLE.get_or_init(|| {
        vec![
            ActionPatterns::new(
                ActionName::GotoSlide,
                vec![
                    Pattern::new(
                        "goto_number",
                        r"\b(?:перейди|переходи|покажи|открой|вернись|верни|go\s+to|jump\s+to|show|open)\s+(?:на\s+|к\s+)?(?:слайд\w*|slide)\s*(?:номер\s+|№\s*|number\s+|#\s*)?\d+",
                        0.95,
                    ),
                    Pattern::new(
                        "goto_about",
                        r"\b(?:перейди|покажи|открой|найди|go\s+to|show|open|find)\s+(?:на\s+|к\s+)?(?:слайд\w*\s+|slide\s+)?(?:про|об|о|about)\s+\S+",
                        0.9,
                    ),
                    Pattern::new(
                        "slide_number",
                        r"\b(?:слайд\w*|slide)\s*(?:номер\s+|№\s*|number\s+|#\s*)?\d+\b",
                        0.85,
                    ),
                    Pattern::new("slide_about", r"\b(?:слайд|slide)\s+(?:про|об|о|about)\s+\S+", 0.85),
                    Pattern::new("numbered_section", r"(?:^|\s)\d{1,3}[.)]\s*\p{L}{3,}", 0.5),
                ],
            ),
            ActionPatterns::new(
                ActionName::HandleQuestion,
                vec![
                    Pattern::new(
                        "answer_question",
                        r"\b(?:ответь|ответить|отвечай)\s+(?:на\s+)?(?:вопрос|запрос)\b",
                        0.95,
                    ),
                    Pattern::new("audience_question", r"\bвопрос\s+из\s+(?:зала|аудитории)\b", 0.95),
                    Pattern::new("answer_question_en", r"\banswer\s+(?:the\s+|a\s+)?question\b", 0.95),
                    Pattern::new("question_prefix", r"^(?:вопрос|question)\s*:", 0.9),
                ],
            ),
            ActionPatterns::new(
                ActionName::SearchWeb,
                vec![
                    Pattern::new(
                        "search_internet",
                        r"\b(?:найди|поищи|погугли|загугли)\s+(?:в\s+)?(?:интернете|сети|гугле)\b",
                        0.95,
                    ),
                    Pattern::new(
                        "search_web_en",
                        r"\b(?:search\s+(?:the\s+)?(?:web|internet|online)|look\s+up|google)\b",
                        0.9,
                    ),
                    Pattern::new("search_keyword", r"\b(?:найди|поищи|погугли|search)\b", 0.8),
                ],
            ),
            ActionPatterns::new(
                ActionName::GenerateSummary,
                vec![
                    Pattern::new("sum_up", r"\b(?:подведи|подвести|подводим)\s+итоги?\b", 0.95),
                    Pattern::new(
                        "make_summary",
                        r"\b(?:сделай|дай|составь)\s+(?:краткое\s+)?резюме\b",
                        0.95,
                    ),
                    Pattern::new(
                        "summary_keyword",
                        r"\b(?:резюме|резюмируй|summary|summarize|итоги)\b",
                        0.85,
                    ),
                ],
            ),
            ActionPatterns::new(
                ActionName::Status,
                vec![
                    Pattern::new(
                        "which_slide",
                        r"\b(?:какой|который|на\s+каком)\s+(?:сейчас\s+)?слайде?\b",
                        0.9,
                    ),
                    Pattern::new("status_keyword", r"\b(?:status|статус|состояние)\b", 0.9),
                    Pattern::new("which_slide_en", r"\b(?:which\s+slide|where\s+are\s+we)\b", 0.85),
                ],
            ),
            ActionPatterns::new(
                ActionName::Start,
                vec![
                    Pattern::new(
                        "start_presentation",
                        r"\b(?:start|begin|launch|начать|начни|начинай|запусти|запустить|старт)\s+(?:the\s+)?(?:presentation|slideshow|show|презентацию|показ|семинар|слайд-?шоу)\b",
                        0.95,
                    ),
                    Pattern::new(
                        "start_keyword",
                        r"\b(?:start|begin|начать|начни|начинай|запусти|старт|поехали)\b",
                        0.8,
                    ),
                ],
            ),
            ActionPatterns::new(
                ActionName::EndPresentation,
                vec![
                    Pattern::new(
                        "end_presentation",
                        r"\b(?:end|finish|stop|close|закончить|закончи|заканчивай|завершить|заверши|остановить|останови)\s+(?:the\s+)?(?:presentation|slideshow|show|презентацию|показ|семинар)\b",
                        0.95,
                    ),
                    Pattern::new(
                        "end_keyword",
                        r"\b(?:end|finish|exit|quit|выход|выйти|закончить|закончи|завершить|заверши)\b",
                        0.8,
                    ),
                ],
            ),
            ActionPatterns::new(
                ActionName::Pause,
                vec![Pattern::new(
                    "pause_keyword",
                    r"\b(?:pause|stop|пауза|паузу|стоп|остановись|остановить|останови|приостанови|приостановить)\b",
                    0.9,
                )],
            ),
            ActionPatterns::new(
                ActionName::Resume,
                vec![Pattern::new(
                    "resume_keyword",
                    r"\b(?:continue|resume|продолжить|продолжи|продолжай|продолжим|возобнови|возобновить)\b",
                    0.9,
                )],
            ),
            ActionPatterns::new(
                ActionName::NextSlide,
                vec![
                    Pattern::new(
                        "next_slide",
                        r"\b(?:next|forward|следующий|вперед|далее|дальше)\s+(?:slide|слайд)\b",
                        0.95,
                    ),
                    Pattern::new("next_slide_short", r"\bслед(?:ующий)?\s+слайд\b", 0.95),
                    Pattern::new(
                        "next_keyword",
                        r"\b(?:next|forward|следующий|вперед|далее|дальше|листай)\b",
                        0.85,
                    ),
                ],
            ),
            ActionPatterns::new(
                ActionName::PreviousSlide,
                vec![
                    Pattern::new(
                        "previous_slide",
                        r"\b(?:previous|prev|back|предыдущий|назад)\s+(?:slide|слайд)\b",
                        0.95,
                    ),
                    Pattern::new("previous_slide_short", r"\bпред(?:ыдущий)?\s+слайд\b", 0.95),
                    Pattern::new("slide_back", r"\bслайд\s+назад\b", 0.95),
                    Pattern::new(
                        "previous_keyword",
                        r"\b(?:previous|back|назад|предыдущий|вернись)\b",
                        0.85,
                    ),
                ],
            ),
            ActionPatterns::new(
                ActionName::SpeakNextBlock,
                vec![
                    Pattern::new(
                        "speak_keyword",
                        r"\b(?:говори|читай|прочитай|прочти|озвучь|озвучивай|скажи|расскажи|read|speak)\b",
                        0.9,
                    ),
                    Pattern::new(
                        "rate_only",
                        r"\b(?:медленнее|помедленнее|быстрее|побыстрее|slower|faster)\b",
                        0.75,
                    ),
                ],
            ),
            ActionPatterns::new(
                ActionName::RepeatLastBlock,
                vec![
                    Pattern::new("repeat_keyword", r"\b(?:повтори|повторить|повтор|repeat)\b", 0.9),
                    Pattern::new("once_more", r"\b(?:еще\s+раз|again)\b", 0.9),
                ],
            ),
        ]
    })
}

/// Finds the highest-confidence match across the whole table.
///
/// `text` must already be [`normalize`]d.
pub fn best_match(text: &str) -> Option<PatternMatch> {
    let mut best: Option<PatternMatch> = None;
    for entry in command_table() {
        for pattern in &entry.patterns {
            if !pattern.matches(text) {
                continue;
            }
            if best.map_or(true, |b| pattern.confidence > b.confidence) {
                best = Some(PatternMatch {
                    action: entry.action,
                    confidence: pattern.confidence,
                    pattern: pattern.name,
                });
            }
        }
    }
    best
}
