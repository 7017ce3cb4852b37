//! State-dependent action legality.

use podium_models::{ActionName, PresentationSnapshot, PresentationState};

use ActionName::*;

const NO_HOST: &[ActionName] = &[Start];

const NO_DOCUMENT: &[ActionName] = &[Status, SearchWeb, HandleQuestion];

const READY: &[ActionName] = &[
    Start,
    Status,
    NextSlide,
    PreviousSlide,
    GotoSlide,
    SearchWeb,
    HandleQuestion,
    GenerateSummary,
];

const PLAYING: &[ActionName] = &[
    NextSlide,
    PreviousSlide,
    Pause,
    EndPresentation,
    Status,
    GotoSlide,
    SpeakNextBlock,
    RepeatLastBlock,
    HandleQuestion,
    SearchWeb,
    GenerateSummary,
];

const PAUSED: &[ActionName] = &[
    Resume,
    NextSlide,
    PreviousSlide,
    EndPresentation,
    Status,
    GotoSlide,
    HandleQuestion,
    SearchWeb,
    GenerateSummary,
];

/// Outcome of a legality check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub valid: bool,
    /// Explanation for the user when invalid.
    pub message: Option<String>,
}

impl Validation {
    fn allowed() -> Self {
        Self {
            valid: true,
            message: None,
        }
    }

    fn rejected(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: Some(message.into()),
        }
    }
}

/// Table-driven check of which actions make sense in which state.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActionValidator;

impl ActionValidator {
    pub fn new() -> Self {
        Self
    }

    /// Actions permitted in `state`.
    pub fn legal_actions(state: PresentationState) -> &'static [ActionName] {
        match state {
            PresentationState::NoHost => NO_HOST,
            PresentationState::NoDocument => NO_DOCUMENT,
            PresentationState::Ready => READY,
            PresentationState::Playing => PLAYING,
            PresentationState::Paused => PAUSED,
        }
    }

    pub fn is_legal(action: ActionName, state: PresentationState) -> bool {
        Self::legal_actions(state).contains(&action)
    }

    /// Checks `action` against the snapshot's state.
    pub fn validate(&self, action: ActionName, snapshot: &PresentationSnapshot) -> Validation {
        if !action.is_executable() {
            return Validation::rejected("Команда не распознана.");
        }
        if Self::is_legal(action, snapshot.state) {
            return Validation::allowed();
        }
        Validation::rejected(rejection_message(action, snapshot))
    }
}

fn rejection_message(action: ActionName, snapshot: &PresentationSnapshot) -> String {
    match (snapshot.state, action) {
        (PresentationState::NoHost, _) => {
            "Keynote не запущен. Скажите «запустить презентацию», чтобы начать.".to_string()
        }
        (PresentationState::NoDocument, _) => {
            "Презентация не открыта. Откройте файл в Keynote.".to_string()
        }
        (PresentationState::Ready, SpeakNextBlock | RepeatLastBlock) => {
            "Сначала запустите показ, потом я смогу читать слайды.".to_string()
        }
        (PresentationState::Ready, Pause | Resume | EndPresentation) => {
            format!("Показ «{}» ещё не запущен.", snapshot.display_name())
        }
        (PresentationState::Playing, Start) => {
            "Презентация уже запущена и идёт показ.".to_string()
        }
        (PresentationState::Playing, Resume) => "Показ и так идёт.".to_string(),
        (PresentationState::Paused, Start) => {
            "Презентация уже запущена и стоит на паузе. Скажите «продолжить».".to_string()
        }
        (PresentationState::Paused, Pause) => "Показ уже на паузе.".to_string(),
        (PresentationState::Paused, SpeakNextBlock | RepeatLastBlock) => {
            "Показ на паузе. Скажите «продолжить», чтобы я снова читал слайды.".to_string()
        }
        (state, action) => format!(
            "Команда «{}» сейчас недоступна ({}).",
            action.label(),
            state_label(state)
        ),
    }
}

fn state_label(state: PresentationState) -> &'static str {
    match state {
        PresentationState::NoHost => "Keynote не запущен",
        PresentationState::NoDocument => "нет открытой презентации",
        PresentationState::Ready => "показ не запущен",
        PresentationState::Playing => "идёт показ",
        PresentationState::Paused => "показ на паузе",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATES: [PresentationState; 5] = [
        PresentationState::NoHost,
        PresentationState::NoDocument,
        PresentationState::Ready,
        PresentationState::Playing,
        PresentationState::Paused,
    ];

    #[test]
    fn test_no_host_permits_only_start() {
        let validator = ActionValidator::new();
        let snapshot = PresentationSnapshot::bare(PresentationState::NoHost);

        for action in ActionName::executable() {
            let validation = validator.validate(action, &snapshot);
            assert_eq!(validation.valid, action == Start, "{action}");
        }
    }

    #[test]
    fn test_illegal_pairs_carry_a_message() {
        let validator = ActionValidator::new();
        for state in STATES {
            let snapshot = PresentationSnapshot::bare(state);
            for action in ActionName::ALL {
                let validation = validator.validate(action, &snapshot);
                if validation.valid {
                    assert!(ActionValidator::is_legal(action, state));
                    assert!(validation.message.is_none());
                } else {
                    let message = validation.message.unwrap_or_default();
                    assert!(!message.is_empty(), "{state}/{action}");
                }
            }
        }
    }

    #[test]
    fn test_classifier_outcomes_never_valid() {
        let validator = ActionValidator::new();
        for state in STATES {
            let snapshot = PresentationSnapshot::bare(state);
            assert!(!validator.validate(Unknown, &snapshot).valid);
            assert!(!validator.validate(NeedClarification, &snapshot).valid);
        }
    }

    #[test]
    fn test_start_while_playing_says_already_running() {
        let validation = ActionValidator::new().validate(
            Start,
            &PresentationSnapshot::bare(PresentationState::Playing),
        );
        assert!(!validation.valid);
        assert!(validation.message.unwrap().contains("уже запущена"));
    }

    #[test]
    fn test_speech_only_while_playing() {
        for state in STATES {
            assert_eq!(
                ActionValidator::is_legal(SpeakNextBlock, state),
                state == PresentationState::Playing
            );
        }
    }
}
