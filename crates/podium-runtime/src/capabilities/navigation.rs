//! Slide navigation.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use podium_intent::normalize;
use podium_keynote::{PlaybackMode, PresentationBackend, SlideContent};
use podium_models::action::{PARAM_COUNT, PARAM_SLIDE_NUMBER, PARAM_SLIDE_TITLE};
use podium_models::{ActionName, ActionParams, ExecutionResult};

use crate::capability::Capability;
use crate::error::Result;

/// Largest relative step accepted in one command.
const MAX_STEP: i64 = 20;

/// Next or previous slide, optionally several at once.
pub struct StepSlides {
    backend: Arc<dyn PresentationBackend>,
    forward: bool,
}

impl StepSlides {
    pub fn forward(backend: Arc<dyn PresentationBackend>) -> Self {
        Self {
            backend,
            forward: true,
        }
    }

    pub fn backward(backend: Arc<dyn PresentationBackend>) -> Self {
        Self {
            backend,
            forward: false,
        }
    }
}

#[async_trait]
impl Capability for StepSlides {
    fn action(&self) -> ActionName {
        if self.forward {
            ActionName::NextSlide
        } else {
            ActionName::PreviousSlide
        }
    }

    fn accepted_params(&self) -> &'static [&'static str] {
        &[PARAM_COUNT]
    }

    async fn invoke(&self, params: ActionParams) -> Result<ExecutionResult> {
        let count = params.get_i64(PARAM_COUNT).unwrap_or(1).clamp(1, MAX_STEP);
        let before = self.backend.playback_status().await?.current_slide;

        for _ in 0..count {
            if self.forward {
                self.backend.next().await?;
            } else {
                self.backend.previous().await?;
            }
        }

        let status = self.backend.playback_status().await?;
        let (current, total) = (status.current_slide, status.total_slides);
        debug!(from = before, to = current, count, "Stepped slides");

        let message = match (self.forward, before == current) {
            (true, true) => format!("Это последний слайд ({} из {}).", current, total),
            (false, true) => "Это первый слайд.".to_string(),
            (true, false) => format!("➡️ Слайд {} из {}", current, total),
            (false, false) => format!("⬅️ Слайд {} из {}", current, total),
        };

        Ok(ExecutionResult::ok(message)
            .with_data("current_slide", current)
            .with_data("total_slides", total))
    }
}

/// Jump to a slide by number or by text.
pub struct JumpToSlide {
    backend: Arc<dyn PresentationBackend>,
}

impl JumpToSlide {
    pub fn new(backend: Arc<dyn PresentationBackend>) -> Self {
        Self { backend }
    }

    /// Range-checks `number` before touching the slideshow.
    async fn jump(&self, number: i64, title: Option<&str>) -> Result<ExecutionResult> {
        let status = self.backend.playback_status().await?;
        let total = status.total_slides;

        let target = match u32::try_from(number) {
            Ok(n) if (1..=total).contains(&n) => n,
            _ => {
                return Ok(ExecutionResult::failure(format!(
                    "Слайд {} не существует. Всего слайдов: {}.",
                    number, total
                ))
                .with_data("total_slides", total));
            }
        };

        if status.mode == PlaybackMode::Stopped {
            self.backend.start().await?;
        }
        self.backend.show_slide(target).await?;

        let message = match title.map(str::trim).filter(|t| !t.is_empty()) {
            Some(title) => format!("🎯 Слайд {}: «{}»", target, title),
            None => format!("🎯 Слайд {} из {}", target, total),
        };
        Ok(ExecutionResult::ok(message)
            .with_data("current_slide", target)
            .with_data("total_slides", total))
    }
}

#[async_trait]
impl Capability for JumpToSlide {
    fn action(&self) -> ActionName {
        ActionName::GotoSlide
    }

    fn accepted_params(&self) -> &'static [&'static str] {
        &[PARAM_SLIDE_NUMBER, PARAM_SLIDE_TITLE]
    }

    async fn invoke(&self, params: ActionParams) -> Result<ExecutionResult> {
        if let Some(number) = params.get_i64(PARAM_SLIDE_NUMBER) {
            return self.jump(number, None).await;
        }

        if let Some(query) = params.get_text(PARAM_SLIDE_TITLE) {
            let slides = self.backend.slides().await?;
            return match best_slide_match(&slides, query) {
                Some(slide) => self.jump(i64::from(slide.number), Some(&slide.title)).await,
                None => Ok(ExecutionResult::failure(format!(
                    "Слайд с текстом «{}» не найден.",
                    query
                ))),
            };
        }

        Ok(ExecutionResult::failure(
            "Назовите номер слайда или его заголовок.",
        ))
    }
}

/// Finds the slide whose text best contains `query`.
///
/// A title hit outweighs a body hit, and a query covering more of the
/// matched field scores higher. Without a whole-phrase hit, word stems are
/// tried at a lower weight. Ties keep the earlier slide.
pub fn best_slide_match<'a>(slides: &'a [SlideContent], query: &str) -> Option<&'a SlideContent> {
    let query = normalize(query);
    if query.is_empty() {
        return None;
    }

    let mut best: Option<(&SlideContent, f32)> = None;
    for slide in slides {
        let score = match_score(slide, &query);
        if score > 0.0 && best.map_or(true, |(_, top)| score > top) {
            best = Some((slide, score));
        }
    }
    best.map(|(slide, _)| slide)
}

fn match_score(slide: &SlideContent, query: &str) -> f32 {
    let title = normalize(&slide.title);
    let body = normalize(&slide.body);
    let query_len = query.chars().count() as f32;

    let mut score: f32 = 0.0;
    if title.contains(query) {
        score = query_len / title.chars().count().max(1) as f32 * 100.0;
    }
    if body.contains(query) {
        score = score.max(query_len / body.chars().count().max(1) as f32 * 50.0);
    }
    if score > 0.0 {
        return score;
    }

    (stem_coverage(query, &title) * 40.0).max(stem_coverage(query, &body) * 20.0)
}

/// Share of the query's words whose first five letters appear in `field`.
fn stem_coverage(query: &str, field: &str) -> f32 {
    let stems: Vec<String> = query
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= 3)
        .map(|w| w.chars().take(5).collect())
        .collect();

    if stems.is_empty() {
        return 0.0;
    }
    let hits = stems.iter().filter(|s| field.contains(s.as_str())).count();
    hits as f32 / stems.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use podium_keynote::SimulatedBackend;

    fn demo_slides() -> Vec<SlideContent> {
        vec![
            SlideContent::new(1, "Здоровый образ жизни", "Доклад для семинара"),
            SlideContent::new(2, "1. Введение", "Почему здоровье важно"),
            SlideContent::new(3, "2. Питание", "Больше овощей и фруктов\nМеньше сахара"),
            SlideContent::new(5, "4. Здоровье", "Сон не менее 7 часов"),
        ]
    }

    #[test]
    fn test_title_hit_beats_body_hit() {
        let slides = demo_slides();
        assert_eq!(best_slide_match(&slides, "здоровье").map(|s| s.number), Some(5));
        assert_eq!(best_slide_match(&slides, "Питание").map(|s| s.number), Some(3));
    }

    #[test]
    fn test_body_and_stem_matches() {
        let slides = demo_slides();
        assert_eq!(best_slide_match(&slides, "сахара").map(|s| s.number), Some(3));
        assert_eq!(best_slide_match(&slides, "питании").map(|s| s.number), Some(3));
        assert!(best_slide_match(&slides, "космос").is_none());
        assert!(best_slide_match(&slides, "  ").is_none());
    }

    #[tokio::test]
    async fn test_out_of_range_never_navigates() {
        let backend = Arc::new(SimulatedBackend::demo().playing_at(2));
        let jump = JumpToSlide::new(backend.clone());

        let result = jump
            .invoke(ActionParams::new().with(PARAM_SLIDE_NUMBER, 42i64))
            .await
            .unwrap();

        assert!(!result.success);
        assert!(result.message.contains("Всего слайдов: 6"));
        assert_eq!(backend.navigation_calls().await, 0);
        assert_eq!(backend.current_slide().await, 2);
    }

    #[tokio::test]
    async fn test_jump_from_ready_starts_show() {
        let backend = Arc::new(SimulatedBackend::demo());
        let jump = JumpToSlide::new(backend.clone());

        let result = jump
            .invoke(ActionParams::new().with(PARAM_SLIDE_TITLE, "итоги"))
            .await
            .unwrap();

        assert!(result.success, "{}", result.message);
        assert_eq!(backend.mode().await, PlaybackMode::Playing);
        assert_eq!(backend.current_slide().await, 6);
    }

    #[tokio::test]
    async fn test_step_reports_edges() {
        let backend = Arc::new(SimulatedBackend::demo().playing_at(6));
        let next = StepSlides::forward(backend.clone());

        let result = next.invoke(ActionParams::new()).await.unwrap();
        assert!(result.success);
        assert!(result.message.contains("последний"));

        let back = StepSlides::backward(backend.clone());
        let result = back
            .invoke(ActionParams::new().with(PARAM_COUNT, 2i64))
            .await
            .unwrap();
        assert_eq!(result.data_value("current_slide"), Some(&4.into()));
    }
}
