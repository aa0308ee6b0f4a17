// Interactive practice console
// Navigate a character sequence, fetch insights, pronounce and demonstrate strokes

use anyhow::Result;
use hanzi_core::CharacterInfo;
use hanzi_session::{
    run_quiz, DemoController, InsightApplied, PracticeSession, ResolvedWidget, WidgetConfig,
};
use hanzi_spk::{PronounceOutcome, SpeechBackend};
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

pub struct PracticeConsole {
    session: Arc<PracticeSession>,
    widget: Arc<ResolvedWidget>,
    widget_config: WidgetConfig,
    demo: DemoController,
    demo_enabled: bool,
    outline: bool,
}

enum CommandResult {
    Continue,
    Exit,
    Moved,
    Error(String),
    Output(String),
}

pub fn format_insight(info: &CharacterInfo) -> String {
    let mut out = format!(
        "{}  {}  {}\n  {}",
        info.character, info.pinyin, info.zhuyin, info.meaning
    );
    if let Some(radical) = &info.radical {
        out.push_str(&format!("\n  Radical: {}", radical));
    }
    if let Some(strokes) = info.stroke_count {
        out.push_str(&format!("\n  Strokes: {}", strokes));
    }
    if !info.examples.is_empty() {
        out.push_str(&format!("\n  Examples: {}", info.examples.join("、")));
    }
    out
}

impl PracticeConsole {
    pub fn new(
        session: Arc<PracticeSession>,
        widget: Arc<ResolvedWidget>,
        widget_config: WidgetConfig,
        demo_pause: Duration,
        demo_enabled: bool,
    ) -> Self {
        let demo = DemoController::new(widget.clone(), widget_config.clone(), demo_pause);
        Self {
            session,
            widget,
            outline: widget_config.show_outline,
            widget_config,
            demo,
            demo_enabled,
        }
    }

    /// Start the interactive console
    pub async fn run(&mut self) -> Result<()> {
        self.print_help();
        self.on_moved();

        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            print!("{}> ", self.prompt());
            io::stdout().flush()?;

            let line = match lines.next_line().await? {
                Some(line) => line,
                None => break,
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match self.handle_command(line).await {
                CommandResult::Continue => continue,
                CommandResult::Exit => break,
                CommandResult::Moved => self.on_moved(),
                CommandResult::Error(msg) => println!("Error: {}", msg),
                CommandResult::Output(output) => println!("{}", output),
            }
        }

        self.demo.stop().await;
        println!("\nBye!");
        Ok(())
    }

    fn print_help(&self) {
        println!("Commands:");
        println!("  n, next           - Next character");
        println!("  p, prev           - Previous character");
        println!("  g, goto <i>       - Jump to position i (1-based)");
        println!("  i, insight        - Fetch meaning and readings");
        println!("  s, speak          - Pronounce the current character");
        println!("  t, toggle         - Switch Traditional/Simplified");
        println!("  b, backend        - Switch cloud/local speech");
        println!("  o, outline        - Toggle the character outline");
        println!("  quiz              - Stroke quiz on the current character");
        println!("  demo              - Toggle the stroke-order demonstration");
        println!("  text <chars>      - Practice different characters");
        println!("  help, ?           - Show this help message");
        println!("  q, quit, exit     - Exit the console");
        println!();
    }

    fn prompt(&self) -> String {
        match self.session.current() {
            Some(character) => format!(
                "{} [{}/{} {}]",
                character,
                self.session.current_index() + 1,
                self.session.len(),
                self.session.variant()
            ),
            None => "(empty)".to_string(),
        }
    }

    async fn handle_command(&mut self, line: &str) -> CommandResult {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let command = parts[0].to_lowercase();

        match command.as_str() {
            "exit" | "quit" | "q" => CommandResult::Exit,
            "help" | "?" => {
                self.print_help();
                CommandResult::Continue
            }
            "n" | "next" => moved_or(self.session.next(), "Already at the last character"),
            "p" | "prev" => moved_or(self.session.prev(), "Already at the first character"),
            "g" | "goto" => {
                let index = match parts.get(1).and_then(|s| s.parse::<usize>().ok()) {
                    Some(index) if index > 0 => index - 1,
                    _ => return CommandResult::Error("Usage: goto <position>".to_string()),
                };
                if index >= self.session.len() {
                    return CommandResult::Error(format!(
                        "Position must be between 1 and {}",
                        self.session.len()
                    ));
                }
                self.session.go_to(index);
                CommandResult::Moved
            }
            "i" | "insight" => self.insight().await,
            "s" | "speak" => self.speak().await,
            "t" | "toggle" => {
                let variant = self.session.toggle_variant().await;
                println!("Now showing {}", variant);
                CommandResult::Moved
            }
            "b" | "backend" => {
                let speech = self.session.speech();
                let next = match speech.backend() {
                    SpeechBackend::Cloud => SpeechBackend::Local,
                    SpeechBackend::Local => SpeechBackend::Cloud,
                };
                speech.set_backend(next);
                if next == SpeechBackend::Local {
                    speech.refresh_voices(self.session.variant()).await;
                }
                CommandResult::Output(format!("Speech backend: {}", next.as_str()))
            }
            "o" | "outline" => {
                self.outline = !self.outline;
                match self.widget.set_outline(self.outline).await {
                    Ok(()) => CommandResult::Output(format!(
                        "Outline {}",
                        if self.outline { "shown" } else { "hidden" }
                    )),
                    Err(e) => {
                        self.outline = !self.outline;
                        CommandResult::Error(hanzi_core::Error::from(e).to_string())
                    }
                }
            }
            "quiz" => {
                let character = match self.session.current() {
                    Some(character) => character,
                    None => return CommandResult::Error("Nothing to quiz".to_string()),
                };
                match run_quiz(&self.widget, &character, &self.widget_config).await {
                    Ok(summary) => CommandResult::Output(format!(
                        "Finished {} with {} mistakes",
                        summary.character, summary.total_mistakes
                    )),
                    Err(e) => CommandResult::Error(hanzi_core::Error::from(e).to_string()),
                }
            }
            "demo" => {
                self.demo_enabled = !self.demo_enabled;
                if self.demo_enabled {
                    CommandResult::Moved
                } else {
                    self.demo.stop().await;
                    CommandResult::Output("Demonstration stopped".to_string())
                }
            }
            "text" => {
                if parts.len() < 2 {
                    return CommandResult::Error("Usage: text <characters>".to_string());
                }
                self.session.set_text(&parts[1..].join(""));
                CommandResult::Moved
            }
            _ => CommandResult::Error(format!("Unknown command: {}. Type 'help'.", command)),
        }
    }

    /// Refresh everything keyed on the active character
    fn on_moved(&self) {
        let character = match self.session.current() {
            Some(character) => character,
            None => {
                println!("No characters to practice");
                return;
            }
        };

        println!("\n    {}\n", character);

        if self.demo_enabled {
            self.demo.show(&character);
        }

        // Runs in the background; the session drops it if the learner moves on
        let session = self.session.clone();
        tokio::spawn(async move {
            match session.refresh_insight().await {
                InsightApplied::Applied(info) => println!("\n{}", format_insight(&info)),
                other => debug!("Background insight: {:?}", other),
            }
        });
    }

    async fn insight(&self) -> CommandResult {
        match self.session.refresh_insight().await {
            InsightApplied::Applied(info) => CommandResult::Output(format_insight(&info)),
            InsightApplied::Stale => CommandResult::Continue,
            InsightApplied::Empty => CommandResult::Error("No active character".to_string()),
            InsightApplied::Unavailable => CommandResult::Error(
                "No insight available (is GEMINI_API_KEY set?)".to_string(),
            ),
        }
    }

    async fn speak(&self) -> CommandResult {
        match self.session.pronounce_current().await {
            PronounceOutcome::Spoken => CommandResult::Continue,
            PronounceOutcome::Skipped(reason) => {
                debug!("Pronunciation skipped: {:?}", reason);
                CommandResult::Continue
            }
            PronounceOutcome::Failed(failure) => CommandResult::Error(failure.to_string()),
        }
    }
}

fn moved_or(moved: bool, message: &str) -> CommandResult {
    if moved {
        CommandResult::Moved
    } else {
        CommandResult::Output(message.to_string())
    }
}
