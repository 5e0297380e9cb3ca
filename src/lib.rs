//! Accrete: asynchronous combinators that accumulate every failure.
//!
//! # Overview
//!
//! An [`AsyncCell<G, B>`] resolves once to a success `G` or a failure `B`.
//! Ordinary future composition stops at the first failure. Accrete's joins
//! wait for every input and surface **all** failures, concatenated in input
//! order, as a non-empty [`Every<B>`].
//!
//! # Core Guarantees
//!
//! - **Exactly once**: every join completes its output once, from whichever
//!   thread delivers the last input
//! - **Input order**: successes and failures follow input order, never
//!   completion order
//! - **No short-circuit**: a late failure is never dropped because an earlier
//!   input already failed
//! - **Scheduling-agnostic**: combinators start no threads; only
//!   [`AsyncCell::spawn`] and [`AsyncCell::spawn_on`] run computations
//!
//! # Module Structure
//!
//! - [`cell`]: The dual-result cell and its promise
//! - [`combinator`]: Fan-in join, fixed-arity combine and zip, validation
//! - [`types`]: Failure accumulation and validation results
//! - [`executor`]: Execution strategies and the process default
//! - [`config`]: Environment and file configuration
//! - [`error`](mod@error): Engine error types
//! - [`tracing_compat`]: Optional tracing integration (requires `tracing-integration` feature)
//!
//! # Example
//!
//! ```
//! use accrete::{AsyncCell, Every, zip2};
//! use std::time::Duration;
//!
//! let name = AsyncCell::<&str, Every<&str>>::bad(Every::one("name missing"));
//! let age = AsyncCell::<u8, Every<&str>>::bad(Every::one("age out of range"));
//! let person = zip2(&name, &age);
//!
//! let failures = person.result(Duration::from_secs(1)).unwrap().unwrap_err();
//! assert_eq!(failures.into_vec(), vec!["name missing", "age out of range"]);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_inception)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::many_single_char_names)]

pub mod cell;
pub mod combinator;
pub mod config;
pub mod error;
pub mod executor;
pub mod tracing_compat;
pub mod types;

// ── Test-only modules ───────────────────────────────────────────────────
#[cfg(any(test, feature = "test-internals"))]
pub mod test_utils;

pub use cell::{AsyncCell, Promise};
pub use combinator::{
    combined, combined_into, first_completed_of, validated_by, validated_by_into,
    validated_by_one, when, when_one, with_good_all, with_good2, with_good3, with_good4,
    with_good5, with_good6, with_good7, with_good8, zip2, zip3, zip4, zip5, zip6, zip7, zip8,
};
pub use config::{Config, ConfigError, ExecutorConfig, ExecutorKind};
pub use error::{Error, ErrorKind, Result};
pub use executor::{Executor, ExecutorHandle, GlobalPool, Inline};
pub use types::{Every, Validation, Validator};
