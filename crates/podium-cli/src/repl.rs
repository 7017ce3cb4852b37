//! Interactive REPL for typing presentation commands.

use std::path::{Path, PathBuf};

use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper, Result as RlResult};
use tracing::debug;

use crate::commands::Console;

const HELP: &str = "\
Всё, что не начинается с /, считается командой для презентации:
  начать презентацию, дальше, назад, слайд 5, слайд про питание,
  читай, повтори, пауза, продолжи, закончи, вопрос: ..., найди ...

Служебные команды:
  /status    состояние презентации
  /actions   действия, доступные сейчас
  /history   последние команды
  /json      переключить вывод в JSON
  /help      эта справка
  /quit      выход";

/// Tab completion for slash commands.
struct CommandCompleter;

impl CommandCompleter {
    const COMMANDS: &'static [&'static str] =
        &["/actions", "/help", "/history", "/json", "/quit", "/status"];
}

impl Completer for CommandCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        if !line.starts_with('/') {
            return Ok((0, vec![]));
        }

        let prefix = &line[..pos];
        let matches: Vec<Pair> = Self::COMMANDS
            .iter()
            .filter(|cmd| cmd.starts_with(prefix))
            .map(|cmd| Pair {
                display: cmd.to_string(),
                replacement: cmd.to_string(),
            })
            .collect();

        Ok((0, matches))
    }
}

impl Hinter for CommandCompleter {
    type Hint = String;
}

impl Highlighter for CommandCompleter {}
impl Validator for CommandCompleter {}
impl Helper for CommandCompleter {}

/// Slash commands available in the REPL.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplCommand {
    Status,
    Actions,
    History,
    /// Toggle JSON output
    Json,
    Help,
    Quit,
    /// Unknown slash command
    Unknown(String),
    /// A presentation command
    Text(String),
}

impl ReplCommand {
    /// Parses input into a REPL command.
    pub fn parse(input: &str) -> Self {
        let input = input.trim();

        let Some(stripped) = input.strip_prefix('/') else {
            return ReplCommand::Text(input.to_string());
        };

        let cmd = stripped
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_lowercase();
        match cmd.as_str() {
            "status" | "state" | "s" | "состояние" => ReplCommand::Status,
            "actions" | "a" => ReplCommand::Actions,
            "history" => ReplCommand::History,
            "json" => ReplCommand::Json,
            "help" | "h" | "?" | "помощь" => ReplCommand::Help,
            "quit" | "q" | "exit" | "выход" => ReplCommand::Quit,
            _ => ReplCommand::Unknown(cmd),
        }
    }
}

/// Interactive session against one router.
pub struct Repl {
    editor: Editor<CommandCompleter, DefaultHistory>,
    console: Console,
    history_path: Option<PathBuf>,
}

impl Repl {
    /// Creates a new REPL instance.
    pub fn new(state_dir: &Path, console: Console) -> RlResult<Self> {
        let config = rustyline::Config::builder()
            .completion_type(rustyline::CompletionType::List)
            .build();
        let mut editor = Editor::with_config(config)?;
        editor.set_helper(Some(CommandCompleter));

        let history_path = state_dir.join("repl_history.txt");
        if history_path.exists() {
            let _ = editor.load_history(&history_path);
        }

        Ok(Self {
            editor,
            console,
            history_path: Some(history_path),
        })
    }

    /// Runs the REPL loop.
    pub fn run(&mut self) -> RlResult<()> {
        println!("Podium REPL v{}", env!("CARGO_PKG_VERSION"));
        println!("Type /help for commands, /quit to exit");
        if self.console.router().has_fallback() {
            println!("Model fallback available (OpenRouter)");
        }
        println!();

        loop {
            match self.editor.readline("podium> ") {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    self.editor.add_history_entry(&line)?;

                    let cmd = ReplCommand::parse(&line);
                    debug!(?cmd, "Parsed command");

                    match self.handle_command(cmd) {
                        Ok(true) => break,
                        Ok(false) => {}
                        Err(e) => eprintln!("Error: {}", e),
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                }
                Err(ReadlineError::Eof) => {
                    println!("^D");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        if let Some(path) = &self.history_path {
            let _ = self.editor.save_history(path);
        }

        println!("До встречи!");
        Ok(())
    }

    /// Handles a REPL command. Returns Ok(true) if should quit.
    fn handle_command(&mut self, cmd: ReplCommand) -> crate::commands::Result<bool> {
        match cmd {
            ReplCommand::Status => println!("{}", self.console.status()?),
            ReplCommand::Actions => println!("{}", self.console.actions()),
            ReplCommand::History => println!("{}", self.console.history()),
            ReplCommand::Json => {
                let json = !self.console.json();
                self.console.set_json(json);
                println!("JSON output {}", if json { "on" } else { "off" });
            }
            ReplCommand::Help => println!("{}", HELP),
            ReplCommand::Quit => return Ok(true),
            ReplCommand::Unknown(cmd) => {
                println!("Unknown command: /{}. Type /help for commands.", cmd)
            }
            ReplCommand::Text(text) => println!("{}", self.console.say(&text)?),
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_slash_commands() {
        assert_eq!(ReplCommand::parse("/status"), ReplCommand::Status);
        assert_eq!(ReplCommand::parse("  /Q "), ReplCommand::Quit);
        assert_eq!(ReplCommand::parse("/выход"), ReplCommand::Quit);
        assert_eq!(ReplCommand::parse("/history extra"), ReplCommand::History);
        assert_eq!(
            ReplCommand::parse("/connect"),
            ReplCommand::Unknown("connect".to_string())
        );
    }

    #[test]
    fn test_parse_plain_text_is_presentation_command() {
        assert_eq!(
            ReplCommand::parse("  следующий слайд "),
            ReplCommand::Text("следующий слайд".to_string())
        );
    }
}
