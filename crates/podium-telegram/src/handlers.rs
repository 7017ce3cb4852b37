//! Command and message handlers for the Telegram bot.

use std::sync::Arc;

use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{InputFile, ParseMode};
use teloxide::utils::command::BotCommands;
use tracing::{debug, info, warn};

use podium_models::{PresentationSnapshot, TurnResult, UserId};

use crate::state::BotState;

/// Bot commands that can be invoked with /.
#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "lowercase", description = "Доступные команды:")]
pub enum Command {
    #[command(description = "Начать работу и получить подсказки")]
    Start,

    #[command(description = "Показать список команд")]
    Help,

    #[command(description = "Состояние презентации")]
    Status,
}

/// Dispatch a parsed command.
pub async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    state: Arc<BotState>,
) -> ResponseResult<()> {
    match cmd {
        Command::Start => handle_start(bot, msg, state).await,
        Command::Help => handle_help(bot, msg).await,
        Command::Status => handle_status(bot, msg, state).await,
    }
}

/// Handle the /start command.
pub async fn handle_start(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    let welcome = format!(
        "Привет! Я управляю презентацией в Keynote. 🎤\n\n\
        <b>Примеры команд:</b>\n\
        • «начни презентацию»\n\
        • «дальше», «назад», «слайд 5»\n\
        • «покажи слайд про питание»\n\
        • «читай» и «повтори»\n\
        • «пауза», «продолжи», «закончи»\n\
        • «вопрос: сколько нужно спать?»\n\n\
        Можно писать текстом или отправлять голосовые сообщения.\n\n\
        <b>Сервисы:</b>\n\
        - Распознавание речи: {}\n\
        - Озвучивание ответов: {}\n\
        - Языковая модель: {}\n\n\
        /help - список команд",
        availability(state.can_transcribe()),
        availability(state.can_speak()),
        availability(state.router().has_fallback()),
    );

    bot.send_message(msg.chat.id, welcome)
        .parse_mode(ParseMode::Html)
        .await?;

    info!(chat_id = %msg.chat.id, user = ?msg.from.as_ref().map(|u| &u.username), "User started bot");
    Ok(())
}

/// Handle the /help command.
pub async fn handle_help(bot: Bot, msg: Message) -> ResponseResult<()> {
    let help = format!(
        "{}\n\nВсё остальное я воспринимаю как команду для презентации.",
        Command::descriptions()
    );
    bot.send_message(msg.chat.id, help).await?;
    Ok(())
}

/// Handle the /status command.
pub async fn handle_status(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    let snapshot = state.router().status().await;
    bot.send_message(msg.chat.id, render_status(&snapshot))
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}

/// Handle a plain text message.
pub async fn handle_message(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };

    let user_id = user_of(&msg);
    let turn = state.handle_text(user_id, text).await;
    reply_with_turn(&bot, &msg, &state, user_id, &turn, false).await
}

/// Handle a voice note: download, transcribe, then treat as text.
pub async fn handle_voice(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    let Some(voice) = msg.voice() else {
        return Ok(());
    };

    if !state.can_transcribe() {
        bot.send_message(
            msg.chat.id,
            "Распознавание речи не настроено. Напишите команду текстом.",
        )
        .await?;
        return Ok(());
    }

    let file = bot.get_file(voice.file.id.clone()).await?;
    let mut audio = Vec::new();
    if let Err(e) = bot.download_file(&file.path, &mut audio).await {
        warn!(chat_id = %msg.chat.id, error = %e, "Failed to download voice note");
        bot.send_message(msg.chat.id, "Не удалось получить голосовое сообщение. Попробуйте ещё раз.")
            .await?;
        return Ok(());
    }

    let Some(text) = state.transcribe(audio, "voice.ogg").await else {
        bot.send_message(msg.chat.id, "Не удалось разобрать речь. Повторите, пожалуйста.")
            .await?;
        return Ok(());
    };

    info!(chat_id = %msg.chat.id, text = %text, "Voice command transcribed");
    let user_id = user_of(&msg);
    let turn = state.handle_text(user_id, &text).await;
    reply_with_turn(&bot, &msg, &state, user_id, &turn, true).await
}

async fn reply_with_turn(
    bot: &Bot,
    msg: &Message,
    state: &BotState,
    user_id: UserId,
    turn: &TurnResult,
    voice_input: bool,
) -> ResponseResult<()> {
    bot.send_message(msg.chat.id, render_turn(turn))
        .parse_mode(ParseMode::Html)
        .await?;

    if !state.wants_voice_reply(voice_input) {
        return Ok(());
    }
    let Some(speech) = turn.speech_text() else {
        return Ok(());
    };
    if let Some(audio) = state.synthesize(user_id, speech).await {
        debug!(chat_id = %msg.chat.id, bytes = audio.len(), "Sending voice reply");
        bot.send_voice(msg.chat.id, InputFile::memory(audio).file_name("reply.ogg"))
            .await?;
    }
    Ok(())
}

/// Telegram users map to sessions by user id, falling back to the chat.
fn user_of(msg: &Message) -> UserId {
    msg.from
        .as_ref()
        .map(|user| UserId(user.id.0 as i64))
        .unwrap_or(UserId(msg.chat.id.0))
}

fn availability(enabled: bool) -> &'static str {
    if enabled {
        "✅ доступно"
    } else {
        "❌ не настроено"
    }
}

/// Formats a turn as Telegram HTML.
pub fn render_turn(turn: &TurnResult) -> String {
    match turn {
        TurnResult::Single {
            execution_result: Some(result),
            ..
        } if !result.success => format!("⚠️ {}", html_escape(&result.message)),
        TurnResult::Multiple { actions, .. } => actions
            .iter()
            .map(|outcome| match (&outcome.execution_result, &outcome.skipped) {
                (Some(result), _) => {
                    let mark = if result.success { "✅" } else { "❌" };
                    format!("{} {}", mark, html_escape(&result.message))
                }
                (None, Some(reason)) => format!(
                    "⏭ <i>{}: {}</i>",
                    html_escape(outcome.action.label()),
                    html_escape(reason)
                ),
                (None, None) => format!("⏭ <i>{}</i>", html_escape(outcome.action.label())),
            })
            .collect::<Vec<_>>()
            .join("\n"),
        TurnResult::NeedClarification { message, .. } => format!("🤔 {}", html_escape(message)),
        _ => html_escape(&turn.display_text()),
    }
}

/// Formats a presentation snapshot for /status.
pub fn render_status(snapshot: &PresentationSnapshot) -> String {
    format!(
        "📊 <b>{}</b>\n{}",
        snapshot.state,
        html_escape(&snapshot.status_message())
    )
}

/// Escape HTML special characters for Telegram HTML mode.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use podium_models::{ActionName, ActionParams, ExecutionResult, IntentOutcome, PresentationState};

    fn single(result: ExecutionResult) -> TurnResult {
        TurnResult::Single {
            action: ActionName::NextSlide,
            confidence: 0.9,
            execution_result: Some(result),
        }
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("a < b & c > d"), "a &lt; b &amp; c &gt; d");
        assert_eq!(html_escape("«Здоровье»"), "«Здоровье»");
    }

    #[test]
    fn test_render_single() {
        assert_eq!(render_turn(&single(ExecutionResult::ok("➡️ Слайд 2 из 6"))), "➡️ Слайд 2 из 6");
        assert_eq!(
            render_turn(&single(ExecutionResult::failure("Это <последний> слайд"))),
            "⚠️ Это &lt;последний&gt; слайд"
        );
    }

    #[test]
    fn test_render_unrecognised_uses_fallback_text() {
        let turn = TurnResult::Single {
            action: ActionName::Unknown,
            confidence: 0.0,
            execution_result: None,
        };
        assert_eq!(render_turn(&turn), turn.display_text());
    }

    #[test]
    fn test_render_sequence_marks_each_step() {
        let turn = TurnResult::Multiple {
            actions: vec![
                IntentOutcome {
                    action: ActionName::NextSlide,
                    confidence: 0.9,
                    params: ActionParams::new(),
                    execution_result: Some(ExecutionResult::ok("➡️ Слайд 2 из 6")),
                    skipped: None,
                },
                IntentOutcome {
                    action: ActionName::Pause,
                    confidence: 0.3,
                    params: ActionParams::new(),
                    execution_result: None,
                    skipped: Some("низкая уверенность".to_string()),
                },
            ],
            summary: "➡️ Слайд 2 из 6".to_string(),
            text_to_speak: None,
        };

        let rendered = render_turn(&turn);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "✅ ➡️ Слайд 2 из 6");
        assert!(lines[1].starts_with("⏭ <i>"));
        assert!(lines[1].contains("низкая уверенность"));
    }

    #[test]
    fn test_render_clarification() {
        let turn = TurnResult::NeedClarification {
            message: "Возможно, вы имели в виду «пауза»?".to_string(),
            candidate: Some(ActionName::Pause),
            confidence: 0.5,
        };
        assert!(render_turn(&turn).starts_with("🤔 Возможно"));
    }

    #[test]
    fn test_render_status() {
        let snapshot = PresentationSnapshot {
            state: PresentationState::Playing,
            presentation_name: Some("Здоровье & спорт".to_string()),
            current_slide: 2,
            total_slides: 6,
        };
        let rendered = render_status(&snapshot);
        assert!(rendered.contains("слайд 2 из 6"));
        assert!(rendered.contains("Здоровье &amp; спорт"));
    }
}
