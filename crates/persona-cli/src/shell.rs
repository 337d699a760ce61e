//! Interactive line shell.
//!
//! Analyses run on a spawned task while the shell keeps reading input, so
//! an `open` issued mid-analysis supersedes it and the late result is
//! dropped by the session.

use anyhow::Result;
use persona_core::{AnalysisTicket, Completion, DetectionOutcome, SessionState};
use persona_vision::{EngineError, Readiness};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::app::{load_image, App, Photo};

const HELP: &str = "\
commands:
  open <path>     select an image
  analyze         analyze the selected image
  reroll          draw a new nickname for the current analysis
  export [dir]    save the card as analysis-card.png
  status          show session and model state
  clear           drop the image and analysis
  help            show this help
  quit            leave the shell";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Open(PathBuf),
    Analyze,
    Reroll,
    Export(Option<PathBuf>),
    Status,
    Clear,
    Help,
    Quit,
}

impl Command {
    /// Parse one input line. `Ok(None)` for blank lines.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let command = match (word, rest) {
            ("open", "") => return Err("usage: open <path>".into()),
            ("open", path) => Command::Open(PathBuf::from(path)),
            ("analyze", "") => Command::Analyze,
            ("reroll", "") => Command::Reroll,
            ("export", "") => Command::Export(None),
            ("export", dir) => Command::Export(Some(PathBuf::from(dir))),
            ("status", "") => Command::Status,
            ("clear", "") => Command::Clear,
            ("help" | "?", "") => Command::Help,
            ("quit" | "exit", "") => Command::Quit,
            (word, "") => return Err(format!("unknown command: {word} (try `help`)")),
            (word, _) => return Err(format!("`{word}` takes no arguments")),
        };
        Ok(Some(command))
    }
}

/// Printed after exporting a card that had to be rendered without text.
pub const NO_FONT_NOTE: &str =
    "note: no usable font found, so the card has no text; set PERSONA_FONT or `font` in the config";

type Finished = (AnalysisTicket<Photo>, Result<DetectionOutcome, EngineError>);

pub struct Shell {
    app: App,
    done_tx: mpsc::UnboundedSender<Finished>,
    done_rx: mpsc::UnboundedReceiver<Finished>,
}

impl Shell {
    pub fn new(app: App) -> Self {
        let (done_tx, done_rx) = mpsc::unbounded_channel();
        Self { app, done_tx, done_rx }
    }

    pub async fn run(mut self) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        println!("persona shell ({}); type `help` for commands", self.app.locale());

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    match Command::parse(&line) {
                        Ok(Some(Command::Quit)) => break,
                        Ok(Some(command)) => self.execute(command),
                        Ok(None) => {}
                        Err(message) => println!("{message}"),
                    }
                }
                Some((ticket, result)) = self.done_rx.recv() => {
                    self.on_finished(&ticket, result);
                }
            }
        }
        tracing::debug!("shell exiting");
        Ok(())
    }

    fn execute(&mut self, command: Command) {
        match command {
            Command::Open(path) => match load_image(&path) {
                Ok(photo) => {
                    let (w, h) = photo.dimensions();
                    let id = self.app.session_mut().select_image(photo);
                    tracing::debug!(%id, "image selected");
                    println!("opened {} ({w}x{h})", path.display());
                }
                Err(e) => println!("{e:#}"),
            },
            Command::Analyze => self.start_analysis(),
            Command::Reroll => match self.app.session_mut().reroll_persona() {
                Ok(persona) => println!("{persona}"),
                Err(e) => println!("{e}"),
            },
            Command::Export(dir) => match self.app.export(dir.as_deref()) {
                Ok(Some(path)) => {
                    println!("saved {}", path.display());
                    if !self.app.card_has_text() {
                        println!("{NO_FONT_NOTE}");
                    }
                }
                Ok(None) => println!("nothing to export yet"),
                Err(e) => println!("{e:#}"),
            },
            Command::Status => self.print_status(),
            Command::Clear => {
                self.app.session_mut().clear();
                println!("cleared");
            }
            Command::Help => println!("{HELP}"),
            Command::Quit => {}
        }
    }

    fn start_analysis(&mut self) {
        let ticket = match self.app.session_mut().begin_analysis() {
            Ok(ticket) => ticket,
            Err(e) => {
                println!("{e}");
                return;
            }
        };
        if self.app.engine().readiness() == Readiness::Loading {
            println!("models are still loading; analysis queued");
        } else {
            println!("analyzing...");
        }

        let engine = self.app.engine().clone();
        let done = self.done_tx.clone();
        tokio::spawn(async move {
            let result = engine.analyze(Arc::clone(ticket.image())).await;
            let _ = done.send((ticket, result));
        });
    }

    fn on_finished(&mut self, ticket: &AnalysisTicket<Photo>, result: Result<DetectionOutcome, EngineError>) {
        match self.app.finish(ticket, result) {
            Ok(Completion::Analyzed) => {
                if let Some(persona) = self.app.session().persona() {
                    println!("{persona}");
                }
            }
            Ok(Completion::NoFace) => println!("{}", self.app.locale().no_face_notice()),
            Ok(Completion::Stale) => {
                tracing::debug!(image = %ticket.image_id(), "late result for a replaced image dropped");
            }
            Err(e) => println!("{e}"),
        }
    }

    fn print_status(&self) {
        let session = self.app.session();
        let state = match session.state() {
            SessionState::NoImage => "no image",
            SessionState::ImageSelected => "image selected",
            SessionState::Analyzing => "analyzing",
            SessionState::Analyzed => "analyzed",
        };
        let models = match self.app.engine().readiness() {
            Readiness::Loading => "loading".to_string(),
            Readiness::Ready => "ready".to_string(),
            Readiness::Failed(reason) => format!("failed ({reason})"),
        };
        println!("session: {state}");
        if let Some(id) = session.image_id() {
            println!("image:   {id}");
        }
        println!("models:  {models}");
        println!("font:    {}", if self.app.card_has_text() { "loaded" } else { "none (cards without text)" });
        if let Some(record) = session.record() {
            println!(
                "result:  age {} ({:.1}), {}, {}",
                record.rounded_age(),
                record.age(),
                record.gender(),
                record.dominant_expression()
            );
        }
        if let Some(persona) = session.persona() {
            println!("persona: {persona}");
        }
    }
}
