//! # Deletion Gate
//!
//! Account deletion is irreversible and needs two things:
//!
//! 1. The operator opted in (`COSMOS_SAMPLE_DELETE_ACCOUNT=true`, or asked for the
//!    delete action explicitly)
//! 2. When someone is at the prompt, they typed `DELETE` exactly (case-sensitive,
//!    surrounding whitespace ignored)

use std::io::{BufRead, Write};

use tracing::warn;

use crate::constants::DELETE_CONFIRMATION;
use crate::error::WorkflowError;

/// Answer from whoever is driving the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    /// No operator is present; the opt-in alone decides
    Unattended,
    /// Text typed (or passed) by the operator
    Answer(String),
}

/// Source of the typed confirmation
pub trait DeletionPrompt: Send {
    fn confirm(&mut self, account: &str) -> Confirmation;
}

/// Non-interactive runs
#[derive(Debug, Default, Clone, Copy)]
pub struct Unattended;

impl DeletionPrompt for Unattended {
    fn confirm(&mut self, _account: &str) -> Confirmation {
        Confirmation::Unattended
    }
}

/// Answer supplied up front (`delete-account --confirm DELETE`)
#[derive(Debug, Clone)]
pub struct FixedAnswer(pub String);

impl DeletionPrompt for FixedAnswer {
    fn confirm(&mut self, _account: &str) -> Confirmation {
        Confirmation::Answer(self.0.clone())
    }
}

/// Reads one line from `input` after printing the question to `output`
///
/// As a [`DeletionPrompt`], an I/O failure or end of input counts as an empty answer.
pub struct LinePrompt<R, W> {
    input: R,
    output: W,
}

impl<R, W> std::fmt::Debug for LinePrompt<R, W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinePrompt").finish_non_exhaustive()
    }
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print `question` and read one line; `None` at end of input
    ///
    /// # Errors
    /// Returns the underlying write or read error.
    pub fn ask(&mut self, question: &str) -> std::io::Result<Option<String>> {
        write!(self.output, "{question}")?;
        self.output.flush()?;

        let mut line = String::new();
        match self.input.read_line(&mut line)? {
            0 => Ok(None),
            _ => Ok(Some(line)),
        }
    }

    /// Write one line of output
    ///
    /// # Errors
    /// Returns the underlying write error.
    pub fn say(&mut self, text: impl std::fmt::Display) -> std::io::Result<()> {
        writeln!(self.output, "{text}")
    }
}

impl<R: BufRead + Send, W: Write + Send> DeletionPrompt for LinePrompt<R, W> {
    fn confirm(&mut self, account: &str) -> Confirmation {
        let question =
            format!("Type {DELETE_CONFIRMATION} to confirm deleting the Cosmos DB account {account}: ");
        match self.ask(&question) {
            Ok(answer) => Confirmation::Answer(answer.unwrap_or_default()),
            Err(e) => {
                warn!("Confirmation prompt failed: {}", e);
                Confirmation::Answer(String::new())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeletionGate {
    pub opted_in: bool,
}

impl DeletionGate {
    #[must_use]
    pub fn new(opted_in: bool) -> Self {
        Self { opted_in }
    }

    /// Decide whether `account` may be deleted
    ///
    /// # Errors
    /// [`WorkflowError::DeletionNotConfirmed`] when either gate is closed.
    pub fn authorize(
        &self,
        account: &str,
        prompt: &mut dyn DeletionPrompt,
    ) -> Result<(), WorkflowError> {
        if !self.opted_in {
            return Err(WorkflowError::DeletionNotConfirmed {
                reason: "deletion was not requested (set COSMOS_SAMPLE_DELETE_ACCOUNT=true)"
                    .to_string(),
            });
        }

        match prompt.confirm(account) {
            Confirmation::Unattended => Ok(()),
            Confirmation::Answer(answer) if answer.trim() == DELETE_CONFIRMATION => Ok(()),
            Confirmation::Answer(_) => Err(WorkflowError::DeletionNotConfirmed {
                reason: format!("confirmation did not match {DELETE_CONFIRMATION}"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    #[test]
    fn test_not_opted_in_never_deletes() {
        let gate = DeletionGate::new(false);
        gate.authorize("acct1", &mut Unattended)
            .expect_err("no opt-in");
        gate.authorize("acct1", &mut FixedAnswer("DELETE".into()))
            .expect_err("confirmation alone is not enough");
    }

    #[test]
    fn test_confirmation_is_case_sensitive() {
        let gate = DeletionGate::new(true);
        let err = gate
            .authorize("acct1", &mut FixedAnswer("delete".into()))
            .expect_err("lowercase must not confirm");
        assert!(err.is_user_cancellation());
    }

    #[test]
    fn test_confirmation_ignores_surrounding_whitespace() {
        let gate = DeletionGate::new(true);
        gate.authorize("acct1", &mut FixedAnswer("  DELETE\n".into()))
            .expect("trimmed DELETE confirms");
    }

    #[test]
    fn test_unattended_opt_in_deletes() {
        DeletionGate::new(true)
            .authorize("acct1", &mut Unattended)
            .expect("opt-in without a prompt");
    }

    #[test]
    fn test_line_prompt_reads_one_line() {
        let mut output = Vec::new();
        let mut prompt = LinePrompt::new(Cursor::new("DELETE\nextra\n"), &mut output);
        assert_eq!(
            prompt.confirm("acct1"),
            Confirmation::Answer("DELETE\n".into())
        );
        let written = String::from_utf8(output).expect("utf8");
        assert!(written.contains("Type DELETE to confirm"));
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    #[test]
    fn test_ask_reports_output_failure() {
        let mut prompt = LinePrompt::new(Cursor::new("DELETE\n"), BrokenPipe);
        let err = prompt.ask("Selection: ").expect_err("write must fail");
        assert_eq!(err.kind(), std::io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_unwritable_prompt_never_confirms() {
        let gate = DeletionGate::new(true);
        let mut prompt = LinePrompt::new(Cursor::new("DELETE\n"), BrokenPipe);
        gate.authorize("acct1", &mut prompt)
            .expect_err("an unseen question cannot be confirmed");
    }

    #[test]
    fn test_line_prompt_eof_is_empty_answer() {
        let gate = DeletionGate::new(true);
        let mut prompt = LinePrompt::new(Cursor::new(""), Vec::new());
        gate.authorize("acct1", &mut prompt)
            .expect_err("empty answer");
    }
}
