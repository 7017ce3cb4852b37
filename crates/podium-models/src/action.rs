//! The closed action vocabulary.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Parameter key: number of slides to skip for relative navigation.
pub const PARAM_COUNT: &str = "count";
/// Parameter key: 1-based slide number for `goto_slide`.
pub const PARAM_SLIDE_NUMBER: &str = "slide_number";
/// Parameter key: title or body fragment for `goto_slide`.
pub const PARAM_SLIDE_TITLE: &str = "slide_title";
/// Parameter key: web search query.
pub const PARAM_QUERY: &str = "query";
/// Parameter key: audience question body.
pub const PARAM_QUESTION: &str = "question";
/// Parameter key: speech rate multiplier.
pub const PARAM_RATE: &str = "rate";

/// Every action the bot can recognise.
///
/// `NeedClarification` and `Unknown` are classifier outcomes only; they
/// never reach a capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionName {
    NextSlide,
    PreviousSlide,
    Pause,
    Resume,
    Start,
    EndPresentation,
    Status,
    SpeakNextBlock,
    RepeatLastBlock,
    HandleQuestion,
    SearchWeb,
    GenerateSummary,
    GotoSlide,
    NeedClarification,
    Unknown,
}

impl ActionName {
    /// All actions, in declaration order.
    pub const ALL: [ActionName; 15] = [
        ActionName::NextSlide,
        ActionName::PreviousSlide,
        ActionName::Pause,
        ActionName::Resume,
        ActionName::Start,
        ActionName::EndPresentation,
        ActionName::Status,
        ActionName::SpeakNextBlock,
        ActionName::RepeatLastBlock,
        ActionName::HandleQuestion,
        ActionName::SearchWeb,
        ActionName::GenerateSummary,
        ActionName::GotoSlide,
        ActionName::NeedClarification,
        ActionName::Unknown,
    ];

    /// Returns the wire name of the action.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionName::NextSlide => "next_slide",
            ActionName::PreviousSlide => "previous_slide",
            ActionName::Pause => "pause",
            ActionName::Resume => "resume",
            ActionName::Start => "start",
            ActionName::EndPresentation => "end_presentation",
            ActionName::Status => "status",
            ActionName::SpeakNextBlock => "speak_next_block",
            ActionName::RepeatLastBlock => "repeat_last_block",
            ActionName::HandleQuestion => "handle_question",
            ActionName::SearchWeb => "search_web",
            ActionName::GenerateSummary => "generate_summary",
            ActionName::GotoSlide => "goto_slide",
            ActionName::NeedClarification => "need_clarification",
            ActionName::Unknown => "unknown",
        }
    }

    /// Short human label used in clarification questions.
    pub fn label(&self) -> &'static str {
        match self {
            ActionName::NextSlide => "следующий слайд",
            ActionName::PreviousSlide => "предыдущий слайд",
            ActionName::Pause => "пауза",
            ActionName::Resume => "продолжить показ",
            ActionName::Start => "начать презентацию",
            ActionName::EndPresentation => "завершить презентацию",
            ActionName::Status => "статус презентации",
            ActionName::SpeakNextBlock => "озвучить следующий блок",
            ActionName::RepeatLastBlock => "повторить последний блок",
            ActionName::HandleQuestion => "ответить на вопрос",
            ActionName::SearchWeb => "поиск в интернете",
            ActionName::GenerateSummary => "резюме презентации",
            ActionName::GotoSlide => "перейти к слайду",
            ActionName::NeedClarification => "уточнение",
            ActionName::Unknown => "неизвестная команда",
        }
    }

    /// Returns true for actions that map to a capability.
    pub fn is_executable(&self) -> bool {
        !matches!(self, ActionName::NeedClarification | ActionName::Unknown)
    }

    /// Actions that round-trip through the knowledge services.
    pub fn is_knowledge(&self) -> bool {
        matches!(
            self,
            ActionName::HandleQuestion | ActionName::SearchWeb | ActionName::GenerateSummary
        )
    }

    /// Parameter keys this action may carry.
    ///
    /// Capabilities declare the subset they accept; registration rejects
    /// any key not listed here.
    pub fn param_schema(&self) -> &'static [&'static str] {
        match self {
            ActionName::NextSlide | ActionName::PreviousSlide => &[PARAM_COUNT],
            ActionName::GotoSlide => &[PARAM_SLIDE_NUMBER, PARAM_SLIDE_TITLE],
            ActionName::SpeakNextBlock | ActionName::RepeatLastBlock => &[PARAM_RATE],
            ActionName::HandleQuestion => &[PARAM_QUESTION],
            ActionName::SearchWeb => &[PARAM_QUERY],
            _ => &[],
        }
    }

    /// Iterator over the actions a capability can implement.
    pub fn executable() -> impl Iterator<Item = ActionName> {
        Self::ALL.into_iter().filter(ActionName::is_executable)
    }
}

impl fmt::Display for ActionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a known action name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseActionError(pub String);

impl fmt::Display for ParseActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown action name '{}'", self.0)
    }
}

impl std::error::Error for ParseActionError {}

impl FromStr for ActionName {
    type Err = ParseActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == normalized)
            .ok_or(ParseActionError(normalized))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_accepts_wire_names() {
        for action in ActionName::ALL {
            assert_eq!(action.as_str().parse::<ActionName>(), Ok(action));
        }
        assert_eq!(" Next_Slide ".parse::<ActionName>(), Ok(ActionName::NextSlide));
        assert!("jump".parse::<ActionName>().is_err());
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&ActionName::EndPresentation).unwrap();
        assert_eq!(json, "\"end_presentation\"");
    }

    #[test]
    fn test_executable_excludes_classifier_outcomes() {
        let executable: Vec<_> = ActionName::executable().collect();
        assert_eq!(executable.len(), 13);
        assert!(!executable.contains(&ActionName::Unknown));
        assert!(!executable.contains(&ActionName::NeedClarification));
    }

    #[test]
    fn test_param_schema() {
        assert_eq!(
            ActionName::GotoSlide.param_schema(),
            &[PARAM_SLIDE_NUMBER, PARAM_SLIDE_TITLE]
        );
        assert!(ActionName::Pause.param_schema().is_empty());
    }
}
