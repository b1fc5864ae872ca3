//! # Interactive Menu
//!
//! Numbered actions read line by line. A failing action is reported and the menu keeps
//! going; `0`, `q`, `quit`, `exit` or end of input leave it. A cancellation only stops
//! the action it interrupted.

use std::io::{BufRead, Write};

use tracing::error;

use super::{perform, Action};
use crate::constants::DEFAULT_THROUGHPUT_DELTA;
use crate::error::WorkflowError;
use crate::workflow::{LinePrompt, Orchestrator};

pub const MENU_TEXT: &str = "
Cosmos management sample - choose an action:
  1) Run full sample
  2) Create/update account
  3) Assign Azure RBAC (Cosmos DB Operator)
  4) Create/update database
  5) Create/update container
  6) Update throughput
  7) Assign Cosmos SQL RBAC (Data Contributor)
  8) Delete account
  0) Exit";

/// Parsed menu input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Perform(Action),
    /// Throughput needs a delta first
    Throughput,
    Exit,
    Empty,
    Unknown,
}

#[must_use]
pub fn parse_selection(input: &str) -> Selection {
    match input.trim().to_lowercase().as_str() {
        "" => Selection::Empty,
        "0" | "q" | "quit" | "exit" => Selection::Exit,
        "1" => Selection::Perform(Action::RunFull),
        "2" => Selection::Perform(Action::CreateAccount),
        "3" => Selection::Perform(Action::AssignAzureRbac),
        "4" => Selection::Perform(Action::CreateDatabase),
        "5" => Selection::Perform(Action::CreateContainer),
        "6" => Selection::Throughput,
        "7" => Selection::Perform(Action::AssignCosmosRbac),
        "8" => Selection::Perform(Action::DeleteAccount),
        _ => Selection::Unknown,
    }
}

/// Delta typed at the throughput prompt; blank or unparsable input gives `default`
#[must_use]
pub fn parse_delta(input: Option<&str>, default: i64) -> i64 {
    input
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

pub struct Menu<R, W> {
    prompt: LinePrompt<R, W>,
}

impl<R, W> std::fmt::Debug for Menu<R, W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Menu").finish_non_exhaustive()
    }
}

impl<R: BufRead + Send, W: Write + Send> Menu<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            prompt: LinePrompt::new(input, output),
        }
    }

    /// Serve the menu until the operator exits or input ends
    ///
    /// # Errors
    /// Only terminal I/O failures end the loop with an error; workflow failures are
    /// reported to the operator.
    pub async fn run(&mut self, orchestrator: &Orchestrator) -> std::io::Result<()> {
        loop {
            self.prompt.say(MENU_TEXT)?;
            let Some(line) = self.prompt.ask("Selection: ")? else {
                return Ok(());
            };

            let action = match parse_selection(&line) {
                Selection::Empty => continue,
                Selection::Exit => return Ok(()),
                Selection::Unknown => {
                    self.prompt.say("Unknown selection.")?;
                    continue;
                }
                Selection::Perform(action) => action,
                Selection::Throughput => {
                    let answer = self.prompt.ask(&format!(
                        "Throughput delta to add [{DEFAULT_THROUGHPUT_DELTA}]: "
                    ))?;
                    Action::UpdateThroughput(parse_delta(answer.as_deref(), DEFAULT_THROUGHPUT_DELTA))
                }
            };

            let result = perform(orchestrator, action, &mut self.prompt).await;
            orchestrator.reset_cancellation();
            match result {
                Ok(summary) => self.prompt.say(summary)?,
                Err(WorkflowError::DeletionNotConfirmed { .. })
                    if action == Action::DeleteAccount =>
                {
                    self.prompt.say("Delete cancelled.")?;
                }
                Err(e) => {
                    error!("{} failed: {}", action.as_str(), e);
                    self.prompt.say(format!("{} failed: {e}", action.as_str()))?;
                    if let Some(guidance) = e.guidance() {
                        self.prompt.say(guidance)?;
                    }
                }
            }
        }
    }
}
