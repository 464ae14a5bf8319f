//! Typed remote predicates.
//!
//! A predicate is a shell test expression whose result is printed as one of
//! two marker lines. Only a line that equals a marker counts; anything else
//! is surfaced as unexpected output instead of being read as `false`.

use super::shell::{Elevation, quote};
use crate::error::{RemoteHostError, RemoteResult};

/// Marker printed when a probed file exists and is readable
pub const READABLE_MARKER: &str = "EXISTS_READABLE";
/// Marker printed when a probed file is missing or unreadable
pub const UNREADABLE_MARKER: &str = "NOT_FOUND_OR_UNREADABLE";
/// Marker printed when a file exists
pub const EXISTS_MARKER: &str = "EXISTS";
/// Marker printed when a file does not exist
pub const NOT_EXISTS_MARKER: &str = "NOT_EXISTS";

/// A boolean question asked through the remote shell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemotePredicate {
    expression: String,
    true_marker: &'static str,
    false_marker: &'static str,
    elevation: Option<Elevation>,
}

/// Result of evaluating a predicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredicateOutcome {
    /// Parsed answer
    pub value: bool,
    /// Raw output, kept for diagnostics
    pub output: String,
}

impl RemotePredicate {
    /// Builds a predicate from a test expression and its markers
    pub const fn new(expression: String, true_marker: &'static str, false_marker: &'static str) -> Self {
        Self {
            expression,
            true_marker,
            false_marker,
            elevation: None,
        }
    }

    /// Regular file that the session user can read
    pub fn readable_file(path: &str) -> Self {
        let quoted = quote(path);
        Self::new(
            format!("test -f {quoted} && test -r {quoted}"),
            READABLE_MARKER,
            UNREADABLE_MARKER,
        )
    }

    /// Regular file, checked with elevated privileges
    pub fn file_exists_elevated(path: &str, elevation: &Elevation) -> Self {
        Self::new(
            format!("test -f {}", quote(path)),
            EXISTS_MARKER,
            NOT_EXISTS_MARKER,
        )
        .elevated(elevation.clone())
    }

    /// Runs the test expression through `elevation`
    #[must_use]
    pub fn elevated(mut self, elevation: Elevation) -> Self {
        self.elevation = Some(elevation);
        self
    }

    /// Shell command that prints exactly one marker
    pub fn command(&self) -> String {
        let test = match &self.elevation {
            Some(elevation) => elevation.apply(&self.expression),
            None => self.expression.clone(),
        };
        format!(
            "{test} && echo {} || echo {}",
            quote(self.true_marker),
            quote(self.false_marker)
        )
    }

    /// Parses command output into a boolean
    ///
    /// # Errors
    ///
    /// Returns `UnexpectedOutput` when no line equals a marker, or when
    /// lines equal to both markers are present.
    pub fn parse(&self, output: &str) -> RemoteResult<bool> {
        let mut saw_true = false;
        let mut saw_false = false;
        for line in output.lines().map(str::trim) {
            if line == self.true_marker {
                saw_true = true;
            } else if line == self.false_marker {
                saw_false = true;
            }
        }

        match (saw_true, saw_false) {
            (true, false) => Ok(true),
            (false, true) => Ok(false),
            _ => Err(RemoteHostError::UnexpectedOutput {
                command: self.command(),
                output: output.to_string(),
            }),
        }
    }

    /// Parses output and keeps it alongside the answer
    ///
    /// # Errors
    ///
    /// Same as [`RemotePredicate::parse`].
    pub fn evaluate(&self, output: String) -> RemoteResult<PredicateOutcome> {
        let value = self.parse(&output)?;
        Ok(PredicateOutcome { value, output })
    }
}
