//! Error types for the accrete engine.
//!
//! Errors here describe problems with the *machinery*, never with the data
//! flowing through it:
//!
//! - **Domain failures** are values. An input that legitimately fails carries
//!   its failure as `Err(B)` (or `Err(Every<B>)` once accumulated) and flows
//!   through every combinator as data.
//! - **Timeouts** are reported to the caller of [`AsyncCell::result`]; the
//!   cell itself is untouched and may still complete later.
//! - **Misuse** (wrong arity, double completion, double initialization) is
//!   reported at the call boundary, before any asynchronous work is wired up.
//!
//! [`AsyncCell::result`]: crate::cell::AsyncCell::result

use core::fmt;
use std::time::Duration;

use crate::config::ConfigError;

/// The kind of engine error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A blocking wait elapsed before the cell completed.
    Timeout,
    /// The completion side of a cell was dropped without completing it.
    Abandoned,
    /// A completion was attempted on a cell that already holds a value.
    AlreadyCompleted,
    /// The process default executor was already installed.
    AlreadyInitialized,
    /// A combinator was called with an unsupported number of inputs.
    InvalidArity,
    /// Configuration could not be loaded or failed validation.
    Config,
    /// An execution strategy could not be built.
    Executor,
}

impl ErrorKind {
    /// Returns a short static description of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Timeout => "timed out waiting for completion",
            Self::Abandoned => "cell abandoned before completion",
            Self::AlreadyCompleted => "cell already completed",
            Self::AlreadyInitialized => "default executor already initialized",
            Self::InvalidArity => "invalid number of inputs",
            Self::Config => "invalid configuration",
            Self::Executor => "executor construction failed",
        }
    }
}

/// An error raised by the accrete engine.
///
/// # Example
///
/// ```
/// use accrete::error::{Error, ErrorKind};
///
/// let err = Error::new(ErrorKind::InvalidArity).with_context("with_good_all needs 2 inputs, got 1");
/// assert_eq!(err.kind(), ErrorKind::InvalidArity);
/// assert!(err.to_string().contains("got 1"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    kind: ErrorKind,
    context: Option<String>,
}

impl Error {
    /// Creates a new error of the given kind.
    #[must_use]
    pub const fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Creates a timeout error recording how long the caller waited.
    #[must_use]
    pub fn timeout(waited: Duration) -> Self {
        Self::new(ErrorKind::Timeout).with_context(format!("waited {waited:?}"))
    }

    /// Creates an abandoned-cell error.
    #[must_use]
    pub const fn abandoned() -> Self {
        Self::new(ErrorKind::Abandoned)
    }

    /// Creates an already-completed error.
    #[must_use]
    pub const fn already_completed() -> Self {
        Self::new(ErrorKind::AlreadyCompleted)
    }

    /// Creates an arity error for `op` given `got` inputs.
    #[must_use]
    pub fn invalid_arity(op: &str, min: usize, got: usize) -> Self {
        Self::new(ErrorKind::InvalidArity)
            .with_context(format!("{op} needs at least {min} inputs, got {got}"))
    }

    /// Adds context to the error.
    #[must_use]
    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        self.context = Some(ctx.into());
        self
    }

    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error context, if any.
    #[must_use]
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// Returns `true` if a blocking wait timed out.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self.kind, ErrorKind::Timeout)
    }

    /// Returns `true` if the cell was abandoned by its producer.
    #[must_use]
    pub const fn is_abandoned(&self) -> bool {
        matches!(self.kind, ErrorKind::Abandoned)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind.as_str())?;
        if let Some(ctx) = &self.context {
            write!(f, ": {ctx}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::new(ErrorKind::Config).with_context(e.to_string())
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::init_test_logging;

    #[test]
    fn kinds_and_predicates() {
        init_test_logging();
        crate::test_phase!("kinds_and_predicates");
        let err = Error::timeout(Duration::from_millis(5));
        assert!(err.is_timeout());
        assert!(!err.is_abandoned());
        assert_eq!(err.kind(), ErrorKind::Timeout);

        let err = Error::abandoned();
        assert!(err.is_abandoned());
        assert!(!err.is_timeout());
    }

    #[test]
    fn display_includes_context() {
        init_test_logging();
        crate::test_phase!("display_includes_context");
        let err = Error::invalid_arity("zip", 2, 0);
        let display = err.to_string();
        assert!(display.contains("invalid number of inputs"));
        assert!(display.contains("got 0"));
        assert_eq!(err.context(), Some("zip needs at least 2 inputs, got 0"));
    }

    #[test]
    fn display_without_context() {
        init_test_logging();
        crate::test_phase!("display_without_context");
        assert_eq!(
            Error::already_completed().to_string(),
            "cell already completed"
        );
    }

    #[test]
    fn config_error_converts() {
        init_test_logging();
        crate::test_phase!("config_error_converts");
        let err: Error = ConfigError::ZeroThreads.into();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert!(err.to_string().contains("thread"));
    }
}
