//! Map a sequence through an asynchronous validator, then join.

use super::fan_in::combined_into;
use crate::cell::AsyncCell;
use crate::types::Every;

/// Applies `f` to every item and joins the resulting cells.
///
/// Equivalent to `combined(items.map(f))`: the result succeeds with every
/// validated value in item order, or fails with every item's failures in
/// item order. `f` only starts the work; each call may run concurrently with
/// the others on whatever executor the returned cells use.
pub fn validated_by<A, G, B, I, F>(items: I, f: F) -> AsyncCell<Vec<G>, Every<B>>
where
    G: Clone + Send + 'static,
    B: Clone + Send + 'static,
    I: IntoIterator<Item = A>,
    F: FnMut(A) -> AsyncCell<G, Every<B>>,
{
    validated_by_into(items, f)
}

/// [`validated_by`] collecting successes into `C`.
pub fn validated_by_into<C, A, G, B, I, F>(items: I, f: F) -> AsyncCell<C, Every<B>>
where
    C: FromIterator<G> + Clone + Send + 'static,
    G: Clone + Send + 'static,
    B: Clone + Send + 'static,
    I: IntoIterator<Item = A>,
    F: FnMut(A) -> AsyncCell<G, Every<B>>,
{
    combined_into(items.into_iter().map(f))
}

/// [`validated_by`] for a validator yielding single-failure cells.
pub fn validated_by_one<A, G, B, I, F>(items: I, mut f: F) -> AsyncCell<Vec<G>, Every<B>>
where
    G: Clone + Send + 'static,
    B: Clone + Send + 'static,
    I: IntoIterator<Item = A>,
    F: FnMut(A) -> AsyncCell<G, B>,
{
    validated_by(items, move |item| f(item).accumulating())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::ExecutorHandle;
    use crate::test_utils::init_test_logging;
    use std::collections::BTreeSet;
    use std::time::Duration;

    const WAIT: Duration = Duration::from_secs(10);

    fn parse(s: &'static str) -> AsyncCell<u32, Every<String>> {
        match s.parse() {
            Ok(n) => AsyncCell::good(n),
            Err(_) => AsyncCell::bad(Every::one(format!("not a number: {s}"))),
        }
    }

    #[test]
    fn all_valid_items_keep_order() {
        init_test_logging();
        crate::test_phase!("all_valid_items_keep_order");
        let parsed = validated_by(["3", "1", "2"], parse);
        assert_eq!(parsed.result(WAIT), Ok(Ok(vec![3, 1, 2])));
    }

    #[test]
    fn every_invalid_item_is_reported() {
        init_test_logging();
        crate::test_phase!("every_invalid_item_is_reported");
        let parsed = validated_by(["1", "x", "2", "y"], parse);
        let failures = parsed.result(WAIT).expect("done").expect_err("bad");
        assert_eq!(
            failures.into_vec(),
            vec!["not a number: x".to_string(), "not a number: y".to_string()]
        );
    }

    #[test]
    fn custom_collector_receives_successes() {
        init_test_logging();
        crate::test_phase!("custom_collector_receives_successes");
        let parsed: AsyncCell<BTreeSet<u32>, _> = validated_by_into(["5", "1", "5"], parse);
        assert_eq!(parsed.result(WAIT), Ok(Ok(BTreeSet::from([1, 5]))));
    }

    #[test]
    fn empty_items_succeed_immediately() {
        init_test_logging();
        crate::test_phase!("empty_items_succeed_immediately");
        let parsed = validated_by(Vec::<&'static str>::new(), parse);
        assert_eq!(parsed.value(), Some(Ok(vec![])));
    }

    #[test]
    fn single_failure_validator_is_adapted() {
        init_test_logging();
        crate::test_phase!("single_failure_validator_is_adapted");
        let pool = ExecutorHandle::pool(2, "validated-by-test").expect("pool");
        let checked = validated_by_one(0..6u32, |n| {
            AsyncCell::spawn_on(&pool, move || if n % 2 == 0 { Ok(n) } else { Err(n) })
        });
        let failures = checked.result(WAIT).expect("done").expect_err("odd items fail");
        assert_eq!(failures.into_vec(), vec![1, 3, 5]);
    }
}
