//! Questions, web search and summaries.
//!
//! These round-trip through the completion and search services, so they are
//! the slow capabilities. A rate-limited primary model degrades to the
//! fallback tier once before giving up.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use podium_core::speakable::DEFAULT_SPEECH_LIMIT;
use podium_core::{
    to_speakable, truncate_for_speech, CompletionService, ModelTier, SearchResponse,
    SearchService, ServiceError,
};
use podium_keynote::{PresentationBackend, SlideContent};
use podium_models::action::{PARAM_QUERY, PARAM_QUESTION};
use podium_models::{ActionName, ActionParams, ExecutionResult};

use crate::capability::Capability;
use crate::error::{Result, RuntimeError};

/// Sources listed under an answer or search result.
const MAX_SOURCES: usize = 3;

/// Slide text sent to the model per slide when summarizing.
const SLIDE_EXCERPT_CHARS: usize = 300;

const RATE_LIMIT_BACKOFF: Duration = Duration::from_secs(1);

const COMPLETION_SERVICE: &str = "языковая модель";
const SEARCH_SERVICE: &str = "веб-поиск";

const ANSWER_PROMPT: &str = "Ты помощник докладчика на презентации. \
Отвечай на вопросы слушателей кратко и по существу, на русском языке, в 2-4 предложениях. \
Опирайся на текст текущего слайда и результаты поиска, если они есть. \
Не выдумывай факты; если не знаешь ответа, так и скажи.";

const SUMMARY_PROMPT: &str = "Ты помощник докладчика. \
Составь краткое резюме презентации на русском языке: 3-5 пунктов, без вступления и заключения.";

async fn complete_with_fallback(
    service: &dyn CompletionService,
    system_prompt: &str,
    user_prompt: &str,
) -> Result<String> {
    match service
        .complete(ModelTier::Primary, system_prompt, user_prompt)
        .await
    {
        Err(ServiceError::RateLimited(provider)) => {
            warn!(provider = %provider, "Rate limited, retrying on fallback model");
            tokio::time::sleep(RATE_LIMIT_BACKOFF).await;
            Ok(service
                .complete(ModelTier::Fallback, system_prompt, user_prompt)
                .await?)
        }
        other => Ok(other?),
    }
}

fn speech_for(text: &str) -> String {
    truncate_for_speech(&to_speakable(text), DEFAULT_SPEECH_LIMIT)
}

fn append_sources(message: &mut String, response: &SearchResponse) {
    let sources: Vec<_> = response.results.iter().take(MAX_SOURCES).collect();
    if sources.is_empty() {
        return;
    }
    message.push_str("\n\nИсточники:");
    for (i, hit) in sources.iter().enumerate() {
        message.push_str(&format!("\n{}. {} - {}", i + 1, hit.title, hit.url));
    }
}

fn excerpt(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        flat
    } else {
        let cut: String = flat.chars().take(max_chars).collect();
        format!("{}…", cut.trim_end())
    }
}

/// Answers an audience question using the current slide and web search.
pub struct QuestionAnswer {
    backend: Arc<dyn PresentationBackend>,
    completion: Option<Arc<dyn CompletionService>>,
    search: Option<Arc<dyn SearchService>>,
}

impl QuestionAnswer {
    pub fn new(
        backend: Arc<dyn PresentationBackend>,
        completion: Option<Arc<dyn CompletionService>>,
        search: Option<Arc<dyn SearchService>>,
    ) -> Self {
        Self {
            backend,
            completion,
            search,
        }
    }

    async fn research(&self, question: &str) -> Option<SearchResponse> {
        let search = self.search.as_ref()?;
        match search.search(question).await {
            Ok(response) => Some(response),
            Err(e) => {
                warn!(error = %e, "Search for question context failed");
                None
            }
        }
    }
}

#[async_trait]
impl Capability for QuestionAnswer {
    fn action(&self) -> ActionName {
        ActionName::HandleQuestion
    }

    fn accepted_params(&self) -> &'static [&'static str] {
        &[PARAM_QUESTION]
    }

    async fn invoke(&self, params: ActionParams) -> Result<ExecutionResult> {
        let completion = self
            .completion
            .as_ref()
            .ok_or(RuntimeError::NotConfigured(COMPLETION_SERVICE))?;
        let question = params
            .get_text(PARAM_QUESTION)
            .ok_or(RuntimeError::MissingParam {
                action: ActionName::HandleQuestion,
                param: PARAM_QUESTION,
            })?;

        // Slide context is optional; questions are allowed with no document open.
        let slide_text = self.backend.current_slide_text().await.unwrap_or_default();
        let research = self.research(question).await;

        let mut prompt = format!("Вопрос слушателя: {}", question);
        if !slide_text.trim().is_empty() {
            prompt.push_str(&format!("\n\nТекст текущего слайда:\n{}", slide_text.trim()));
        }
        if let Some(response) = &research {
            if let Some(answer) = response.best_text() {
                prompt.push_str(&format!("\n\nКраткий ответ из поиска:\n{}", answer));
            }
            for hit in response.results.iter().take(MAX_SOURCES) {
                prompt.push_str(&format!(
                    "\n- {}: {}",
                    hit.title,
                    excerpt(&hit.content, SLIDE_EXCERPT_CHARS)
                ));
            }
        }

        let answer = complete_with_fallback(completion.as_ref(), ANSWER_PROMPT, &prompt).await?;
        let answer = answer.trim();
        info!(question = %question, chars = answer.chars().count(), "Question answered");

        let mut message = format!("❓ {}\n\n💬 {}", question, answer);
        if let Some(response) = &research {
            append_sources(&mut message, response);
        }
        Ok(ExecutionResult::ok(message).with_speech(speech_for(answer)))
    }
}

/// Searches the web and reads the best answer.
pub struct WebSearch {
    search: Option<Arc<dyn SearchService>>,
}

impl WebSearch {
    pub fn new(search: Option<Arc<dyn SearchService>>) -> Self {
        Self { search }
    }
}

#[async_trait]
impl Capability for WebSearch {
    fn action(&self) -> ActionName {
        ActionName::SearchWeb
    }

    fn accepted_params(&self) -> &'static [&'static str] {
        &[PARAM_QUERY]
    }

    async fn invoke(&self, params: ActionParams) -> Result<ExecutionResult> {
        let search = self
            .search
            .as_ref()
            .ok_or(RuntimeError::NotConfigured(SEARCH_SERVICE))?;
        let query = params.get_text(PARAM_QUERY).ok_or(RuntimeError::MissingParam {
            action: ActionName::SearchWeb,
            param: PARAM_QUERY,
        })?;

        let response = search.search(query).await?;
        let Some(best) = response.best_text() else {
            return Ok(ExecutionResult::failure(format!(
                "По запросу «{}» ничего не найдено.",
                query
            )));
        };

        Ok(
            ExecutionResult::ok(response.format_for_display(query, MAX_SOURCES))
                .with_speech(speech_for(best))
                .with_data("sources", response.results.len()),
        )
    }
}

/// Summarizes the open presentation.
pub struct PresentationSummary {
    backend: Arc<dyn PresentationBackend>,
    completion: Option<Arc<dyn CompletionService>>,
}

impl PresentationSummary {
    pub fn new(
        backend: Arc<dyn PresentationBackend>,
        completion: Option<Arc<dyn CompletionService>>,
    ) -> Self {
        Self {
            backend,
            completion,
        }
    }
}

fn outline(slides: &[SlideContent]) -> String {
    slides
        .iter()
        .map(|slide| {
            let body = excerpt(&slide.body, SLIDE_EXCERPT_CHARS);
            if body.is_empty() {
                format!("{}. {}", slide.number, slide.title.trim())
            } else {
                format!("{}. {}: {}", slide.number, slide.title.trim(), body)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl Capability for PresentationSummary {
    fn action(&self) -> ActionName {
        ActionName::GenerateSummary
    }

    async fn invoke(&self, _params: ActionParams) -> Result<ExecutionResult> {
        let completion = self
            .completion
            .as_ref()
            .ok_or(RuntimeError::NotConfigured(COMPLETION_SERVICE))?;

        let status = self.backend.playback_status().await?;
        let slides = self.backend.slides().await?;
        if slides.is_empty() {
            return Ok(ExecutionResult::failure("В презентации нет слайдов."));
        }

        let prompt = format!(
            "Презентация «{}», слайдов: {}, сейчас показан слайд {}.\n\nСлайды:\n{}",
            status.document_name,
            status.total_slides,
            status.current_slide,
            outline(&slides)
        );
        let summary = complete_with_fallback(completion.as_ref(), SUMMARY_PROMPT, &prompt).await?;
        let summary = summary.trim();

        Ok(ExecutionResult::ok(format!(
            "📋 Резюме презентации «{}»:\n\n{}",
            status.document_name, summary
        ))
        .with_speech(speech_for(summary)))
    }
}
