//! Accumulating combinators.
//!
//! This module provides the combinators built on the fan-in join:
//!
//! - [`combined`]: Join N cells, keeping every success or every failure
//! - [`with_good2`] .. [`with_good8`]: Combine differently-typed successes
//! - [`zip2`] .. [`zip8`]: Tuple the successes of N cells
//! - [`validated_by`]: Map items through an async validator, then join
//! - [`when`]: Apply several synchronous validators to one success
//! - [`first_completed_of`]: Resolve with whichever input completes first
//!
//! Every join reports successes and failures in **input order**, never in
//! completion order, and never stops at the first failure.

pub mod fan_in;
pub mod first_completed;
pub mod validated_by;
pub mod when;
pub mod with_good;

pub use fan_in::{combined, combined_into};
pub use first_completed::first_completed_of;
pub use validated_by::{validated_by, validated_by_into, validated_by_one};
pub use when::{when, when_one};
pub use with_good::{
    with_good_all, with_good2, with_good3, with_good4, with_good5, with_good6, with_good7,
    with_good8, zip2, zip3, zip4, zip5, zip6, zip7, zip8,
};
