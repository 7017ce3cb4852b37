//! Layered intent classification.

use regex::Regex;
use std::sync::OnceLock;

use tracing::debug;

use podium_models::action::{PARAM_SLIDE_NUMBER, PARAM_SLIDE_TITLE};
use podium_models::{ActionIntent, ActionName, PresentationState};

use crate::fallback::LlmFallback;
use crate::params::extract_params;
use crate::patterns::{best_match, normalize};

/// Pattern confidence below which the fallback layer is consulted.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.7;

/// Classifier output: one intent or an ordered sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    Single(ActionIntent),
    Multiple(Vec<ActionIntent>),
}

impl Classification {
    /// Highest confidence among the intents.
    pub fn best_confidence(&self) -> f32 {
        match self {
            Classification::Single(intent) => intent.confidence,
            Classification::Multiple(intents) => intents
                .iter()
                .map(|i| i.confidence)
                .fold(0.0, f32::max),
        }
    }

    pub fn into_intents(self) -> Vec<ActionIntent> {
        match self {
            Classification::Single(intent) => vec![intent],
            Classification::Multiple(intents) => intents,
        }
    }
}

fn sequence_splitter() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\s*,?\s*\b(?:и\s+потом|а\s+потом|и\s+затем|а\s+затем|после\s+этого|затем|потом|and\s+then|then|и|and)\b\s*",
        )
        .expect("Invalid regex pattern")
    })
}

/// Splits an utterance on sequencing connectors.
pub fn split_sequence(text: &str) -> Vec<&str> {
    sequence_splitter()
        .split(text.trim())
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect()
}

/// True when the intent's parameters swallow the rest of the utterance, so
/// connectors inside it belong to the payload.
fn carries_free_text(intent: &ActionIntent) -> bool {
    match intent.action {
        ActionName::HandleQuestion | ActionName::SearchWeb => true,
        ActionName::GotoSlide => {
            !intent.params.contains(PARAM_SLIDE_NUMBER) && intent.params.contains(PARAM_SLIDE_TITLE)
        }
        _ => false,
    }
}

/// Maps text to intents: patterns, sequence, then model fallback.
pub struct IntentClassifier {
    fallback: Option<LlmFallback>,
    threshold: f32,
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl IntentClassifier {
    /// A classifier using the pattern table only.
    pub fn new() -> Self {
        Self {
            fallback: None,
            threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }

    pub fn with_fallback(mut self, fallback: LlmFallback) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Pattern layer only, with parameters. `unknown` when nothing matches.
    pub fn classify_patterns(&self, text: &str) -> ActionIntent {
        match best_match(&normalize(text)) {
            Some(hit) => {
                debug!(
                    action = %hit.action,
                    confidence = hit.confidence,
                    pattern = hit.pattern,
                    "Pattern match"
                );
                ActionIntent::new(hit.action, hit.confidence)
                    .with_params(extract_params(text, hit.action))
            }
            None => ActionIntent::unknown(),
        }
    }

    /// Classifies `text` given the current presentation state.
    pub async fn classify(&self, text: &str, state: PresentationState) -> Classification {
        if text.trim().is_empty() {
            return Classification::Single(ActionIntent::unknown());
        }

        let pattern = self.classify_patterns(text);
        if carries_free_text(&pattern) && pattern.confidence >= self.threshold {
            debug!(action = %pattern.action, "Free-text command, not splitting");
            return Classification::Single(pattern);
        }

        if let Some(intents) = self.classify_sequence(text) {
            debug!(count = intents.len(), "Sequence of intents recognised");
            return Classification::Multiple(intents);
        }

        if pattern.confidence >= self.threshold {
            return Classification::Single(pattern);
        }

        let Some(fallback) = &self.fallback else {
            return Classification::Single(pattern);
        };

        debug!(
            pattern_confidence = pattern.confidence,
            state = %state,
            "Pattern layer below threshold, consulting model"
        );
        let candidates = fallback.classify(text, state).await;
        self.promote(text, pattern, candidates)
    }

    /// Every part must clear the threshold on its own; otherwise the text is
    /// treated as a single command.
    fn classify_sequence(&self, text: &str) -> Option<Vec<ActionIntent>> {
        let parts = split_sequence(text);
        if parts.len() < 2 {
            return None;
        }

        let intents: Vec<ActionIntent> = parts
            .iter()
            .map(|part| self.classify_patterns(part))
            .collect();

        intents
            .iter()
            .all(|i| !i.is_unknown() && i.confidence >= self.threshold)
            .then_some(intents)
    }

    /// The model's answer replaces the pattern result only when strictly
    /// more confident.
    fn promote(
        &self,
        text: &str,
        pattern: ActionIntent,
        mut candidates: Vec<ActionIntent>,
    ) -> Classification {
        let best = candidates
            .iter()
            .map(|c| c.confidence)
            .fold(0.0, f32::max);

        if best <= pattern.confidence {
            // Keep the remote error visible when neither layer understood.
            if pattern.is_unknown() && candidates.len() == 1 && candidates[0].is_unknown() {
                return Classification::Single(candidates.remove(0));
            }
            return Classification::Single(pattern);
        }

        for candidate in &mut candidates {
            if candidate.action.is_executable() {
                candidate.params = extract_params(text, candidate.action);
            }
        }

        if candidates.len() == 1 {
            Classification::Single(candidates.remove(0))
        } else {
            Classification::Multiple(candidates)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use podium_core::{CompletionService, ModelTier};
    use podium_models::action::PARAM_SLIDE_NUMBER;
    use podium_models::ActionName;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingModel {
        reply: podium_core::Result<String>,
        calls: AtomicUsize,
    }

    impl CountingModel {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: Err(podium_core::ServiceError::Transport("offline".into())),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CompletionService for CountingModel {
        async fn complete(
            &self,
            _tier: ModelTier,
            _system_prompt: &str,
            _user_prompt: &str,
        ) -> podium_core::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Ok(reply) => Ok(reply.clone()),
                Err(e) => Err(podium_core::ServiceError::Transport(e.to_string())),
            }
        }
    }

    fn classifier_with(model: &Arc<CountingModel>) -> IntentClassifier {
        IntentClassifier::new().with_fallback(LlmFallback::new(model.clone()))
    }

    #[tokio::test]
    async fn test_confident_pattern_skips_model() {
        let model = CountingModel::replying("pause");
        let classifier = classifier_with(&model);

        for (text, action, confidence) in [
            ("следующий слайд", ActionName::NextSlide, 0.95),
            ("дальше", ActionName::NextSlide, 0.85),
            ("начать", ActionName::Start, 0.8),
            ("перейди на слайд 3", ActionName::GotoSlide, 0.95),
        ] {
            match classifier.classify(text, PresentationState::Playing).await {
                Classification::Single(intent) => {
                    assert_eq!(intent.action, action, "{}", text);
                    assert_eq!(intent.confidence, confidence, "{}", text);
                }
                other => panic!("unexpected {:?}", other),
            }
        }
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn test_low_confidence_consults_model_and_promotes() {
        let model = CountingModel::replying("generate_summary");
        let classifier = classifier_with(&model);

        let result = classifier
            .classify("расскажи коротко, о чём было", PresentationState::Playing)
            .await;

        // "расскажи" matches speak at 0.9, so the model is not needed
        assert_eq!(model.calls(), 0);
        assert!(matches!(result, Classification::Single(ref i) if i.action == ActionName::SpeakNextBlock));

        let result = classifier
            .classify("а что было в целом", PresentationState::Playing)
            .await;
        assert_eq!(model.calls(), 1);
        match result {
            Classification::Single(intent) => {
                assert_eq!(intent.action, ActionName::GenerateSummary);
                assert_eq!(intent.confidence, 0.7);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_model_never_overrides_with_equal_confidence() {
        let model = CountingModel::replying("next_slide");
        let classifier = classifier_with(&model).with_threshold(0.96);

        // pattern gives goto_slide at 0.95 (< 0.96) so the model runs, but
        // its 0.7 is lower and the pattern stays
        let result = classifier
            .classify("перейди на слайд 3", PresentationState::Playing)
            .await;
        assert_eq!(model.calls(), 1);
        match result {
            Classification::Single(intent) => {
                assert_eq!(intent.action, ActionName::GotoSlide);
                assert_eq!(intent.params.get_i64(PARAM_SLIDE_NUMBER), Some(3));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_model_list_becomes_multiple_with_params() {
        let model = CountingModel::replying("start, goto_slide");
        let classifier = classifier_with(&model);

        let result = classifier
            .classify("хочу сразу слайд 2 со старта", PresentationState::Ready)
            .await;

        // "слайд 2" is a 0.85 pattern hit, so no model call
        assert_eq!(model.calls(), 0);
        assert_eq!(result.best_confidence(), 0.85);

        let result = classifier
            .classify("давай с самого начала и сразу к сути", PresentationState::Ready)
            .await;
        match result {
            Classification::Multiple(intents) => {
                assert_eq!(intents[0].action, ActionName::Start);
                assert_eq!(intents[1].action, ActionName::GotoSlide);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unrecognised_text_keeps_remote_error() {
        let model = CountingModel::failing();
        let classifier = classifier_with(&model);

        match classifier.classify("ммм", PresentationState::Playing).await {
            Classification::Single(intent) => {
                assert!(intent.is_unknown());
                assert_eq!(intent.confidence, 0.0);
                assert!(intent.error.is_some());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_without_model_low_confidence_pattern_is_returned() {
        let classifier = IntentClassifier::new();
        match classifier.classify("4. Здоровье", PresentationState::Playing).await {
            Classification::Single(intent) => {
                assert_eq!(intent.action, ActionName::GotoSlide);
                assert_eq!(intent.confidence, 0.5);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_sequence_split_into_ordered_intents() {
        let classifier = IntentClassifier::new();
        match classifier
            .classify("дальше и потом озвучь", PresentationState::Playing)
            .await
        {
            Classification::Multiple(intents) => {
                let actions: Vec<_> = intents.iter().map(|i| i.action).collect();
                assert_eq!(actions, vec![ActionName::NextSlide, ActionName::SpeakNextBlock]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_sequence_requires_every_part_to_be_recognised() {
        let classifier = IntentClassifier::new();
        let result = classifier
            .classify("найди в интернете рецепты и советы", PresentationState::Playing)
            .await;
        assert!(matches!(result, Classification::Single(ref i) if i.action == ActionName::SearchWeb));
    }

    #[tokio::test]
    async fn test_question_with_conjunction_stays_whole() {
        let classifier = IntentClassifier::new();
        let text = "ответь на вопрос: почему стоит бросить курить и начать заниматься спортом";

        match classifier.classify(text, PresentationState::Playing).await {
            Classification::Single(intent) => {
                assert_eq!(intent.action, ActionName::HandleQuestion);
                assert_eq!(intent.confidence, 0.95);
                assert_eq!(
                    intent.params.get_text(podium_models::action::PARAM_QUESTION),
                    Some("почему стоит бросить курить и начать заниматься спортом")
                );
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_slide_title_with_conjunction_stays_whole() {
        let classifier = IntentClassifier::new();
        match classifier
            .classify("покажи слайд про сон и отдых", PresentationState::Playing)
            .await
        {
            Classification::Single(intent) => {
                assert_eq!(intent.action, ActionName::GotoSlide);
                assert_eq!(
                    intent.params.get_text(podium_models::action::PARAM_SLIDE_TITLE),
                    Some("сон и отдых")
                );
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_split_sequence() {
        assert_eq!(
            split_sequence("Начни презентацию, затем следующий слайд"),
            vec!["Начни презентацию", "следующий слайд"]
        );
        assert_eq!(split_sequence("next slide and then read"), vec!["next slide", "read"]);
        assert_eq!(split_sequence("пауза"), vec!["пауза"]);
    }

    #[tokio::test]
    async fn test_empty_text_is_unknown() {
        let classifier = IntentClassifier::new();
        assert_eq!(
            classifier.classify("   ", PresentationState::Ready).await,
            Classification::Single(ActionIntent::unknown())
        );
    }
}
