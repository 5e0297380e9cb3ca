//! Pass/fail outcome of a synchronous validator.

use serde::{Deserialize, Serialize};

/// The result of checking a value against one rule.
///
/// Unlike `Result<(), E>`, a `Validation` reads as a verdict rather than a
/// computation; [`when`](crate::combinator::when) accumulates every `Fail`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Validation<E> {
    /// The value satisfied the rule.
    Pass,
    /// The value violated the rule.
    Fail(E),
}

impl<E> Validation<E> {
    /// Returns `true` for [`Validation::Pass`].
    #[must_use]
    pub const fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    /// Returns `true` for [`Validation::Fail`].
    #[must_use]
    pub const fn is_fail(&self) -> bool {
        matches!(self, Self::Fail(_))
    }

    /// Converts `Ok(_)` into `Pass` and `Err(e)` into `Fail(e)`.
    pub fn from_result<T>(result: Result<T, E>) -> Self {
        match result {
            Ok(_) => Self::Pass,
            Err(e) => Self::Fail(e),
        }
    }

    /// Converts into a `Result<(), E>`.
    pub fn into_result(self) -> Result<(), E> {
        match self {
            Self::Pass => Ok(()),
            Self::Fail(e) => Err(e),
        }
    }

    /// Returns `self` if it failed, otherwise `other`.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        match self {
            Self::Pass => other,
            fail @ Self::Fail(_) => fail,
        }
    }

    /// Maps the failure indicator.
    pub fn map<F, T>(self, f: F) -> Validation<T>
    where
        F: FnOnce(E) -> T,
    {
        match self {
            Self::Pass => Validation::Pass,
            Self::Fail(e) => Validation::Fail(f(e)),
        }
    }
}

/// A boxed synchronous validator over `G` producing failures of type `B`.
pub type Validator<G, B> = Box<dyn Fn(&G) -> Validation<B> + Send + Sync>;
