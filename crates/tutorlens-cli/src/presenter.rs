//! Console rendering of advisories and the user's answers to them.

use std::io;
use std::path::{Path, PathBuf};

use console::{Term, style};
use tokio::fs as async_fs;
use tokio::runtime::Handle;
use tracing::{debug, warn};
use tutorlens_watch::{Advisory, AdvisoryEvent};

/// The user's answer to a shown advisory. Every choice ends the advisory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvisoryChoice {
    /// Copy the suggested prompt, then close
    CopySuggestion,
    /// Send the original prompt anyway
    ProceedAnyway,
    /// Close without acting
    Dismiss,
}

impl AdvisoryChoice {
    /// Parses a line typed by the user.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "c" | "copy" => Some(Self::CopySuggestion),
            "p" | "proceed" => Some(Self::ProceedAnyway),
            "d" | "dismiss" | "close" => Some(Self::Dismiss),
            _ => None,
        }
    }
}

/// Renders advisory events on a terminal.
#[derive(Debug)]
pub struct ConsolePresenter {
    term: Term,
    suggestion_path: PathBuf,
    pending: Option<Advisory>,
}

impl ConsolePresenter {
    /// Creates a presenter writing to `term`; copied suggestions go to
    /// `suggestion_path`.
    pub fn new(term: Term, suggestion_path: impl Into<PathBuf>) -> Self {
        Self {
            term,
            suggestion_path: suggestion_path.into(),
            pending: None,
        }
    }

    /// Advisory waiting for an answer, if any.
    pub const fn pending(&self) -> Option<&Advisory> {
        self.pending.as_ref()
    }

    /// Renders an event. Adaptive observations are logged, not shown.
    ///
    /// # Errors
    /// Returns an error if the terminal cannot be written
    pub fn render(&mut self, event: AdvisoryEvent) -> io::Result<()> {
        match event {
            AdvisoryEvent::Show(advisory) => {
                self.term.write_line("")?;
                self.term.write_line(&format!(
                    "{} {}",
                    style("⚠ Learning tip:").yellow().bold(),
                    advisory.warning_message
                ))?;
                self.term.write_line(&format!(
                    "  {} {}",
                    style("Try asking:").cyan(),
                    advisory.suggested_prompt
                ))?;
                self.term.write_line(&format!(
                    "  {}",
                    style("[c] copy suggestion   [p] proceed anyway   [d] dismiss").dim()
                ))?;
                self.pending = Some(advisory);
            }
            AdvisoryEvent::AdaptiveObserved { kinds } => {
                debug!(?kinds, "adaptive prompt; no advisory shown");
            }
        }
        Ok(())
    }

    /// Applies the user's answer to the pending advisory.
    ///
    /// Returns whether an advisory was pending, in which case the caller
    /// should report the dismissal to the gate.
    ///
    /// # Errors
    /// Returns an error if the terminal cannot be written
    pub fn resolve(&mut self, choice: AdvisoryChoice) -> io::Result<bool> {
        let Some(advisory) = self.pending.take() else {
            return Ok(false);
        };

        match choice {
            AdvisoryChoice::CopySuggestion => {
                self.copy_detached(advisory.suggested_prompt);
            }
            AdvisoryChoice::ProceedAnyway => {
                self.term
                    .write_line(&format!("{}", style("Proceeding with your prompt.").dim()))?;
            }
            AdvisoryChoice::Dismiss => {
                self.term.write_line(&format!("{}", style("Tip dismissed.").dim()))?;
            }
        }
        Ok(true)
    }

    /// Writes `text` to the suggestion file without waiting for it.
    ///
    /// A failed write is reported as a transient console message; it never
    /// reaches the gate.
    fn copy_detached(&self, text: String) {
        let Ok(handle) = Handle::try_current() else {
            warn!("no async runtime; suggestion not copied");
            return;
        };

        let term = self.term.clone();
        let path = self.suggestion_path.clone();
        drop(handle.spawn(async move {
            let written = match path.parent() {
                Some(parent) => async_fs::create_dir_all(parent).await,
                None => Ok(()),
            };
            let message = match written {
                Ok(()) => match async_fs::write(&path, text).await {
                    Ok(()) => format!(
                        "{} {}",
                        style("Suggestion copied to").green(),
                        path.display()
                    ),
                    Err(error) => copy_failed(&path, &error),
                },
                Err(error) => copy_failed(&path, &error),
            };
            if let Err(error) = term.write_line(&message) {
                warn!("failed to report copy result: {error}");
            }
        }));
    }
}

fn copy_failed(path: &Path, error: &io::Error) -> String {
    warn!(path = %path.display(), "failed to copy suggestion: {error}");
    format!("{} {error}", style("Could not copy suggestion:").red())
}
