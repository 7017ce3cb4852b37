//! End-to-end turns against the simulated presentation host.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use podium_core::{CompletionService, ModelTier};
use podium_keynote::{PlaybackMode, SimulatedBackend};
use podium_models::{ActionName, PresentationState, TurnResult, UserId};
use podium_runtime::CommandRouter;

const USER: UserId = UserId(42);

struct ScriptedModel {
    reply: String,
    calls: AtomicUsize,
}

impl ScriptedModel {
    fn new(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionService for ScriptedModel {
    async fn complete(
        &self,
        _tier: ModelTier,
        _system_prompt: &str,
        _user_prompt: &str,
    ) -> podium_core::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.reply.clone())
    }
}

fn router(backend: &Arc<SimulatedBackend>) -> CommandRouter {
    CommandRouter::builder(backend.clone()).build().unwrap()
}

fn router_with_model(backend: &Arc<SimulatedBackend>, model: &Arc<ScriptedModel>) -> CommandRouter {
    CommandRouter::builder(backend.clone())
        .completion(model.clone())
        .build()
        .unwrap()
}

fn single(turn: TurnResult) -> (ActionName, f32, Option<podium_models::ExecutionResult>) {
    match turn {
        TurnResult::Single {
            action,
            confidence,
            execution_result,
        } => (action, confidence, execution_result),
        other => panic!("expected a single turn, got {:?}", other),
    }
}

#[tokio::test]
async fn test_start_from_ready_plays() {
    let backend = Arc::new(SimulatedBackend::demo());
    let router = router(&backend);

    let (action, confidence, result) = single(router.handle_command(USER, "начать презентацию").await);

    assert_eq!(action, ActionName::Start);
    assert_eq!(confidence, 0.95);
    assert!(result.unwrap().success);
    assert_eq!(router.status().await.state, PresentationState::Playing);
}

#[tokio::test]
async fn test_start_while_playing_reports_already_running() {
    let backend = Arc::new(SimulatedBackend::demo().playing_at(2));
    let router = router(&backend);

    let (action, _, result) = single(router.handle_command(USER, "начать").await);
    let result = result.unwrap();

    assert_eq!(action, ActionName::Start);
    assert!(!result.success);
    assert!(result.message.contains("уже"));
    assert_eq!(backend.current_slide().await, 2);
}

#[tokio::test]
async fn test_goto_out_of_range_never_navigates() {
    let backend = Arc::new(SimulatedBackend::demo().playing_at(1));
    let router = router(&backend);

    let (action, _, result) = single(router.handle_command(USER, "перейди на слайд 42").await);
    let result = result.unwrap();

    assert_eq!(action, ActionName::GotoSlide);
    assert!(!result.success);
    assert!(result.message.contains("42"));
    assert!(result.message.contains("6"));
    assert_eq!(backend.navigation_calls().await, 0);
}

#[tokio::test]
async fn test_goto_by_number_with_topic() {
    let backend = Arc::new(SimulatedBackend::demo().playing_at(1));
    let router = router(&backend);

    let (action, _, result) = single(router.handle_command(USER, "слайд 4 про здоровье").await);

    assert_eq!(action, ActionName::GotoSlide);
    assert!(result.unwrap().success);
    assert_eq!(backend.current_slide().await, 4);
}

#[tokio::test]
async fn test_reading_cycles_and_repeat_does_not_advance() {
    let backend = Arc::new(SimulatedBackend::demo().playing_at(3));
    let router = router(&backend);

    let mut spoken = Vec::new();
    for _ in 0..5 {
        let turn = router.handle_command(USER, "озвучь").await;
        spoken.push(turn.speech_text().unwrap().to_string());
    }
    assert_eq!(spoken[0], "2. Питание");
    assert_eq!(spoken[3], "Пейте воду");
    assert_eq!(spoken[4], spoken[0]);

    let first = router.handle_command(USER, "повтори").await;
    let second = router.handle_command(USER, "повтори").await;
    assert_eq!(first.speech_text(), Some("2. Питание"));
    assert_eq!(first.speech_text(), second.speech_text());

    let next = router.handle_command(USER, "озвучь").await;
    assert_eq!(next.speech_text(), Some("Больше овощей и фруктов"));
}

#[tokio::test]
async fn test_sequence_executes_in_order() {
    let backend = Arc::new(SimulatedBackend::demo().playing_at(1));
    let router = router(&backend);

    let turn = router.handle_command(USER, "дальше и потом озвучь").await;

    let TurnResult::Multiple {
        actions,
        text_to_speak,
        ..
    } = turn
    else {
        panic!("expected a multi-intent turn");
    };
    let names: Vec<_> = actions.iter().map(|a| a.action).collect();
    assert_eq!(names, vec![ActionName::NextSlide, ActionName::SpeakNextBlock]);
    assert!(actions.iter().all(|a| a.succeeded()));
    assert_eq!(text_to_speak.as_deref(), Some("1. Введение"));
}

#[tokio::test]
async fn test_confident_pattern_skips_model() {
    let backend = Arc::new(SimulatedBackend::demo().playing_at(1));
    let model = ScriptedModel::new("pause");
    let router = router_with_model(&backend, &model);

    let (action, _, _) = single(router.handle_command(USER, "следующий слайд").await);

    assert_eq!(action, ActionName::NextSlide);
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn test_model_resolves_unmatched_text() {
    let backend = Arc::new(SimulatedBackend::demo().playing_at(1));
    let model = ScriptedModel::new("pause");
    let router = router_with_model(&backend, &model);

    let (action, confidence, result) =
        single(router.handle_command(USER, "давай-ка притормозим немного").await);

    assert_eq!(model.calls(), 1);
    assert_eq!(action, ActionName::Pause);
    assert_eq!(confidence, 0.7);
    assert!(result.unwrap().success);
    assert_eq!(backend.mode().await, PlaybackMode::Paused);
}

#[tokio::test]
async fn test_model_can_ask_for_clarification() {
    let backend = Arc::new(SimulatedBackend::demo().playing_at(1));
    let model = ScriptedModel::new("need_clarification");
    let router = router_with_model(&backend, &model);

    let turn = router.handle_command(USER, "ну это самое").await;

    assert!(matches!(
        turn,
        TurnResult::NeedClarification {
            candidate: None,
            ..
        }
    ));
    assert!(router.session(USER).await.awaiting_clarification);
}

#[tokio::test]
async fn test_uncertain_intent_runs_after_confirmation() {
    let backend = Arc::new(SimulatedBackend::demo());
    let router = router(&backend);

    let turn = router.handle_command(USER, "4. Здоровье").await;
    let TurnResult::NeedClarification {
        candidate,
        message,
        ..
    } = turn
    else {
        panic!("expected a clarification question");
    };
    assert_eq!(candidate, Some(ActionName::GotoSlide));
    assert!(message.contains("перейти к слайду"));
    assert_eq!(backend.navigation_calls().await, 0);

    let (action, _, result) = single(router.handle_command(USER, "да").await);

    assert_eq!(action, ActionName::GotoSlide);
    assert!(result.unwrap().success);
    assert_eq!(backend.current_slide().await, 5);
    assert!(!router.session(USER).await.awaiting_clarification);
}

#[tokio::test]
async fn test_declined_clarification_does_nothing() {
    let backend = Arc::new(SimulatedBackend::demo());
    let router = router(&backend);

    router.handle_command(USER, "4. Здоровье").await;
    let (_, _, result) = single(router.handle_command(USER, "нет").await);

    assert!(result.unwrap().success);
    assert_eq!(backend.navigation_calls().await, 0);
    assert_eq!(router.status().await.state, PresentationState::Ready);
}

#[tokio::test]
async fn test_other_text_after_clarification_is_a_new_command() {
    let backend = Arc::new(SimulatedBackend::demo().playing_at(1));
    let router = router(&backend);

    router.handle_command(USER, "4. Здоровье").await;
    let (action, _, result) = single(router.handle_command(USER, "следующий слайд").await);

    assert_eq!(action, ActionName::NextSlide);
    assert!(result.unwrap().success);
    assert_eq!(backend.current_slide().await, 2);

    let (action, _, result) = single(router.handle_command(USER, "да").await);
    assert_eq!(action, ActionName::Unknown);
    assert!(result.is_none());
}

#[tokio::test]
async fn test_clarification_is_per_user() {
    let backend = Arc::new(SimulatedBackend::demo());
    let router = router(&backend);

    router.handle_command(UserId(1), "4. Здоровье").await;
    let (action, _, _) = single(router.handle_command(UserId(2), "да").await);

    assert_eq!(action, ActionName::Unknown);
    assert_eq!(backend.navigation_calls().await, 0);
}

#[tokio::test]
async fn test_unreachable_host_degrades_to_no_host() {
    let backend = Arc::new(SimulatedBackend::demo().playing_at(1));
    let router = router(&backend);
    backend.set_unreachable(true).await;

    let (action, _, result) = single(router.handle_command(USER, "дальше").await);
    let result = result.unwrap();

    assert_eq!(action, ActionName::NextSlide);
    assert!(!result.success);
    assert!(result.message.contains("Keynote"));
    assert_eq!(router.status().await.state, PresentationState::NoHost);
}

#[tokio::test]
async fn test_unrecognised_text_executes_nothing() {
    let backend = Arc::new(SimulatedBackend::demo().playing_at(1));
    let router = router(&backend);

    let turn = router.handle_command(USER, "какая сегодня погода").await;

    assert!(!turn.is_success());
    assert!(!turn.display_text().is_empty());
    assert_eq!(backend.navigation_calls().await, 0);
    let session = router.session(USER).await;
    assert_eq!(session.last_action, Some(ActionName::Unknown));
    assert_eq!(session.history.len(), 1);
}

#[tokio::test]
async fn test_speech_rate_is_remembered() {
    let backend = Arc::new(SimulatedBackend::demo().playing_at(2));
    let router = router(&backend);

    assert_eq!(router.voice_rate(USER).await, 1.0);
    router.handle_command(USER, "читай медленнее").await;
    assert_eq!(router.voice_rate(USER).await, 0.8);
    assert_eq!(router.voice_rate(UserId(7)).await, 1.0);
}

#[tokio::test]
async fn test_question_is_answered_with_slide_context() {
    let backend = Arc::new(SimulatedBackend::demo().playing_at(5));
    let model = ScriptedModel::new("Взрослым нужно спать семь-девять часов.");
    let router = router_with_model(&backend, &model);

    let (action, _, result) =
        single(router.handle_command(USER, "вопрос: сколько нужно спать?").await);
    let result = result.unwrap();

    assert_eq!(action, ActionName::HandleQuestion);
    assert!(result.success);
    assert_eq!(
        result.text_to_speak.as_deref(),
        Some("Взрослым нужно спать семь-девять часов.")
    );
    assert_eq!(model.calls(), 1);
}

#[tokio::test]
async fn test_knowledge_without_model_fails_politely() {
    let backend = Arc::new(SimulatedBackend::demo().playing_at(1));
    let router = router(&backend);

    let (_, _, result) = single(router.handle_command(USER, "подведи итоги").await);
    let result = result.unwrap();

    assert!(!result.success);
    assert!(result.message.contains("не настроен"));
}

#[tokio::test]
async fn test_question_with_conjunction_runs_nothing_else() {
    let backend = Arc::new(SimulatedBackend::demo().playing_at(5));
    let model = ScriptedModel::new("Спорт помогает справиться с тягой к курению.");
    let router = router_with_model(&backend, &model);

    let (action, _, result) = single(
        router
            .handle_command(
                USER,
                "ответь на вопрос: почему стоит бросить курить и начать заниматься спортом",
            )
            .await,
    );

    assert_eq!(action, ActionName::HandleQuestion);
    assert!(result.unwrap().success);
    assert_eq!(model.calls(), 1);
    assert_eq!(backend.navigation_calls().await, 0);
    assert_eq!(backend.current_slide().await, 5);
}

#[tokio::test]
async fn test_goto_four_digit_slide_reports_range() {
    let backend = Arc::new(SimulatedBackend::demo().playing_at(1));
    let router = router(&backend);

    let (action, _, result) = single(router.handle_command(USER, "слайд 1000").await);
    let result = result.unwrap();

    assert_eq!(action, ActionName::GotoSlide);
    assert!(!result.success);
    assert!(result.message.contains("1000"));
    assert_eq!(backend.navigation_calls().await, 0);
}
