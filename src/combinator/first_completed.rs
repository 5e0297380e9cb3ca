//! Race: resolve with whichever input completes first.

use std::sync::Arc;

use crate::cell::AsyncCell;
use crate::error::Error;
use crate::tracing_compat::trace;

/// Returns a cell completed by the first input to complete, good or bad.
///
/// Later completions are ignored. The race is abandoned only if every input
/// is. Fails with [`ErrorKind::InvalidArity`](crate::error::ErrorKind::InvalidArity)
/// on an empty input, which could never complete.
pub fn first_completed_of<G, B, I>(cells: I) -> Result<AsyncCell<G, B>, Error>
where
    G: Clone + Send + 'static,
    B: Clone + Send + 'static,
    I: IntoIterator<Item = AsyncCell<G, B>>,
{
    let cells: Vec<_> = cells.into_iter().collect();
    if cells.is_empty() {
        return Err(Error::invalid_arity("first_completed_of", 1, 0));
    }

    let (promise, race) = AsyncCell::promise();
    let promise = Arc::new(promise);
    for (index, cell) in cells.into_iter().enumerate() {
        let promise = Arc::clone(&promise);
        cell.on_complete(move |result| {
            if promise.try_complete(result.clone()) {
                trace!(index, "race won");
            }
        });
    }
    Ok(race)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::test_utils::init_test_logging;
    use std::time::Duration;

    const WAIT: Duration = Duration::from_secs(10);

    #[test]
    fn first_completion_wins() {
        init_test_logging();
        crate::test_phase!("first_completion_wins");
        let (slow, slow_cell) = AsyncCell::<&str, &str>::promise();
        let (fast, fast_cell) = AsyncCell::<&str, &str>::promise();
        let race = first_completed_of(vec![slow_cell, fast_cell]).expect("two inputs");

        fast.complete(Err("fast failure")).expect("fast");
        slow.complete(Ok("slow")).expect("slow");
        assert_eq!(race.result(WAIT), Ok(Err("fast failure")));
    }

    #[test]
    fn already_completed_input_wins_immediately() {
        init_test_logging();
        crate::test_phase!("already_completed_input_wins_immediately");
        let (_pending, pending_cell) = AsyncCell::<u8, ()>::promise();
        let race = first_completed_of(vec![pending_cell, AsyncCell::good(3)]).expect("race");
        assert_eq!(race.value(), Some(Ok(3)));
    }

    #[test]
    fn abandoned_only_when_every_input_is() {
        init_test_logging();
        crate::test_phase!("abandoned_only_when_every_input_is");
        let (a, a_cell) = AsyncCell::<u8, ()>::promise();
        let (b, b_cell) = AsyncCell::<u8, ()>::promise();
        let race = first_completed_of(vec![a_cell, b_cell]).expect("race");
        drop(a);
        assert!(race.result(Duration::from_millis(20)).expect_err("pending").is_timeout());
        drop(b);
        assert!(race.wait().expect_err("abandoned").is_abandoned());
    }

    #[test]
    fn empty_race_is_rejected() {
        init_test_logging();
        crate::test_phase!("empty_race_is_rejected");
        let err = first_completed_of(Vec::<AsyncCell<u8, ()>>::new()).expect_err("empty");
        assert_eq!(err.kind(), ErrorKind::InvalidArity);
    }
}
