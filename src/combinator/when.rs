//! Apply several synchronous validators to a resolved success.

use crate::cell::AsyncCell;
use crate::tracing_compat::debug;
use crate::types::{Every, Validation};

/// Checks the eventual success of `cell` against every validator.
///
/// A failed input passes through unchanged and no validator runs. Otherwise
/// every validator sees the success, in order; the result is the success if
/// all passed, or every validator failure in validator order.
///
/// # Example
///
/// ```
/// use accrete::cell::AsyncCell;
/// use accrete::combinator::when;
/// use accrete::types::{Every, Validation};
///
/// fn positive(n: &i32) -> Validation<&'static str> {
///     if *n > 0 { Validation::Pass } else { Validation::Fail("not positive") }
/// }
/// fn even(n: &i32) -> Validation<&'static str> {
///     if n % 2 == 0 { Validation::Pass } else { Validation::Fail("odd") }
/// }
///
/// let rules: [fn(&i32) -> Validation<&'static str>; 2] = [positive, even];
/// let checked = when(&AsyncCell::<i32, Every<&str>>::good(-3), rules);
/// let failures = checked.value().unwrap().unwrap_err();
/// assert_eq!(failures.into_vec(), vec!["not positive", "odd"]);
/// ```
pub fn when<G, B, V, I>(cell: &AsyncCell<G, Every<B>>, validators: I) -> AsyncCell<G, Every<B>>
where
    G: Clone + Send + 'static,
    B: Clone + Send + 'static,
    V: Fn(&G) -> Validation<B> + Send + 'static,
    I: IntoIterator<Item = V>,
{
    let validators: Vec<V> = validators.into_iter().collect();
    cell.transform(move |result| {
        let good = result?;
        let failures: Vec<B> = validators
            .iter()
            .filter_map(|validator| match validator(&good) {
                Validation::Pass => None,
                Validation::Fail(bad) => Some(bad),
            })
            .collect();
        debug!(
            validators = validators.len(),
            failures = failures.len(),
            "validators applied"
        );
        match Every::try_from_vec(failures) {
            Some(failures) => Err(failures),
            None => Ok(good),
        }
    })
}

/// [`when`] for a single-failure cell; its failure becomes a one-element
/// accumulation.
pub fn when_one<G, B, V, I>(cell: &AsyncCell<G, B>, validators: I) -> AsyncCell<G, Every<B>>
where
    G: Clone + Send + 'static,
    B: Clone + Send + 'static,
    V: Fn(&G) -> Validation<B> + Send + 'static,
    I: IntoIterator<Item = V>,
{
    when(&cell.accumulating(), validators)
}
