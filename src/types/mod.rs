//! Value types that flow through accrete cells.
//!
//! - [`every`]: [`Every`], the non-empty ordered failure accumulation
//! - [`validation`]: [`Validation`], the verdict of a synchronous validator
//!
//! The dual-valued result itself is `std::result::Result<G, B>`: `Ok` is the
//! success payload, `Err` the failure.

pub mod every;
pub mod validation;

pub use every::Every;
pub use validation::{Validation, Validator};
