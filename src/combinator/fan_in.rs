//! Fan-in barrier: wait for every input, then merge once.
//!
//! [`combined`] is the core every other multi-input combinator is built on.
//! Given N accumulating cells it returns one cell that completes exactly once,
//! after all N inputs completed, with either:
//!
//! - `Ok(successes)` in **input order** if every input succeeded, or
//! - `Err(failures)`: the concatenation, in input order, of every failing
//!   input's own accumulation. Successes contribute nothing to it.
//!
//! It never short-circuits on the first failure. Stopping early would drop
//! the failures of inputs that finish later.
//!
//! # Synchronization
//!
//! Each join owns an atomic `remaining` counter and one slot per input. The
//! callback for input `i` writes slot `i`, then decrements `remaining` with
//! `AcqRel`. Exactly one callback observes the transition to zero; its
//! acquire synchronizes with every earlier release, so it sees all slots
//! filled and is the only thread that merges and completes the output.
//! Slots are locked individually, so inputs completing together never
//! contend with each other.

use std::iter;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::cell::{AsyncCell, Promise};
use crate::tracing_compat::{debug, error, trace};
use crate::types::Every;

/// Countdown over `n` write-once slots.
pub(crate) struct FanIn<T> {
    remaining: AtomicUsize,
    slots: Box<[Mutex<Option<T>>]>,
}

impl<T> FanIn<T> {
    pub(crate) fn new(n: usize) -> Self {
        Self {
            remaining: AtomicUsize::new(n),
            slots: iter::repeat_with(|| Mutex::new(None)).take(n).collect(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    /// Records the value for input `index`.
    ///
    /// Returns every slot, in index order, to the single arrival that
    /// completes the set; all other arrivals get `None`.
    pub(crate) fn arrive(&self, index: usize, value: T) -> Option<Vec<T>> {
        {
            let mut slot = self.slots[index].lock();
            debug_assert!(slot.is_none(), "fan-in slot {index} written twice");
            *slot = Some(value);
        }

        let before = self.remaining.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(before > 0, "fan-in received more arrivals than inputs");
        trace!(index, remaining = before - 1, "fan-in slot filled");
        if before != 1 {
            return None;
        }

        Some(
            self.slots
                .iter()
                .map(|slot| {
                    slot.lock()
                        .take()
                        .expect("every slot is written before the count reaches zero")
                })
                .collect(),
        )
    }
}

/// Per-call join state: the barrier plus the output it completes.
struct Join<C, G, B> {
    barrier: FanIn<Result<G, Every<B>>>,
    output: Promise<C, Every<B>>,
}

/// Merges ordered slot values under "any failure wins".
fn merge<C, G, B>(slots: Vec<Result<G, Every<B>>>) -> Result<C, Every<B>>
where
    C: FromIterator<G>,
{
    let total = slots.len();
    let mut goods = Vec::with_capacity(total);
    let mut bads: Option<Every<B>> = None;
    for slot in slots {
        match slot {
            Ok(good) if bads.is_none() => goods.push(good),
            Ok(_) => {}
            Err(bad) => {
                bads = Some(match bads.take() {
                    Some(acc) => acc.concat(bad),
                    None => bad,
                });
            }
        }
    }
    match bads {
        Some(bads) => {
            debug!(inputs = total, failures = bads.len(), "fan-in merged to failure");
            Err(bads)
        }
        None => {
            debug!(inputs = total, "fan-in merged to success");
            Ok(goods.into_iter().collect())
        }
    }
}

/// Joins accumulating cells into one cell of their ordered successes.
///
/// An empty input resolves immediately to `Ok(vec![])`.
///
/// # Example
///
/// ```
/// use accrete::cell::AsyncCell;
/// use accrete::combinator::combined;
/// use accrete::types::Every;
/// use std::time::Duration;
///
/// let inputs = vec![
///     AsyncCell::<u32, Every<u32>>::good(0),
///     AsyncCell::bad(Every::one(1)),
///     AsyncCell::good(2),
///     AsyncCell::bad(Every::of(3, [4])),
/// ];
/// let joined = combined(inputs).result(Duration::from_secs(1)).unwrap();
/// assert_eq!(joined.unwrap_err().into_vec(), vec![1, 3, 4]);
/// ```
pub fn combined<G, B, I>(inputs: I) -> AsyncCell<Vec<G>, Every<B>>
where
    G: Clone + Send + 'static,
    B: Clone + Send + 'static,
    I: IntoIterator<Item = AsyncCell<G, Every<B>>>,
{
    combined_into(inputs)
}

/// [`combined`] with a caller-chosen success sequence type.
///
/// `C` plays the role of a collector: the ordered successes are gathered
/// with `FromIterator`, so `VecDeque`, `SmallVec` or any ordered container
/// works.
pub fn combined_into<C, G, B, I>(inputs: I) -> AsyncCell<C, Every<B>>
where
    C: FromIterator<G> + Clone + Send + 'static,
    G: Clone + Send + 'static,
    B: Clone + Send + 'static,
    I: IntoIterator<Item = AsyncCell<G, Every<B>>>,
{
    let inputs: Vec<_> = inputs.into_iter().collect();
    if inputs.is_empty() {
        trace!("fan-in over no inputs");
        return AsyncCell::good(iter::empty().collect());
    }

    let (output, cell) = AsyncCell::promise();
    let join = Arc::new(Join {
        barrier: FanIn::new(inputs.len()),
        output,
    });
    trace!(inputs = join.barrier.len(), "fan-in created");

    for (index, input) in inputs.into_iter().enumerate() {
        let join = Arc::clone(&join);
        input.on_complete(move |result| {
            let Some(slots) = join.barrier.arrive(index, result.clone()) else {
                return;
            };
            if let Err(err) = join.output.complete(merge(slots)) {
                error!(error = %err, "fan-in output completed twice");
                debug_assert!(false, "fan-in output completed twice: {err}");
            }
        });
    }
    cell
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::init_test_logging;
    use std::collections::VecDeque;
    use std::sync::Barrier;
    use std::time::Duration;

    const WAIT: Duration = Duration::from_secs(10);

    fn init_test(name: &str) {
        init_test_logging();
        crate::test_phase!(name);
    }

    #[test]
    fn barrier_hands_slots_to_last_arrival() {
        init_test("barrier_hands_slots_to_last_arrival");
        let barrier = FanIn::new(3);
        assert_eq!(barrier.arrive(2, 'c'), None);
        assert_eq!(barrier.arrive(0, 'a'), None);
        assert_eq!(barrier.arrive(1, 'b'), Some(vec!['a', 'b', 'c']));
    }

    #[test]
    fn barrier_has_one_winner_under_contention() {
        init_test("barrier_has_one_winner_under_contention");
        const N: usize = 16;
        for _ in 0..50 {
            let barrier = Arc::new(FanIn::new(N));
            let start = Arc::new(Barrier::new(N));
            let handles: Vec<_> = (0..N)
                .map(|i| {
                    let barrier = Arc::clone(&barrier);
                    let start = Arc::clone(&start);
                    std::thread::spawn(move || {
                        start.wait();
                        barrier.arrive(i, i * 10)
                    })
                })
                .collect();
            let winners: Vec<Vec<usize>> = handles
                .into_iter()
                .filter_map(|h| h.join().expect("arrival thread"))
                .collect();
            assert_eq!(winners.len(), 1);
            assert_eq!(winners[0], (0..N).map(|i| i * 10).collect::<Vec<_>>());
        }
    }

    #[test]
    fn merge_all_good_keeps_order() {
        init_test("merge_all_good_keeps_order");
        let merged: Result<Vec<u8>, Every<&str>> = merge(vec![Ok(1), Ok(2), Ok(3)]);
        assert_eq!(merged, Ok(vec![1, 2, 3]));
    }

    #[test]
    fn merge_concatenates_failures_in_input_order() {
        init_test("merge_concatenates_failures_in_input_order");
        let merged: Result<Vec<u8>, Every<&str>> = merge(vec![
            Ok(1),
            Err(Every::of("a", ["b"])),
            Ok(2),
            Err(Every::one("c")),
        ]);
        assert_eq!(merged.expect_err("failure wins").into_vec(), vec!["a", "b", "c"]);
    }

    #[test]
    fn empty_input_is_immediate_success() {
        init_test("empty_input_is_immediate_success");
        let joined = combined(Vec::<AsyncCell<u8, Every<()>>>::new());
        assert_eq!(joined.value(), Some(Ok(vec![])));
    }

    #[test]
    fn completion_order_does_not_change_output_order() {
        init_test("completion_order_does_not_change_output_order");
        let (first, first_cell) = AsyncCell::<&str, Every<&str>>::promise();
        let (second, second_cell) = AsyncCell::<&str, Every<&str>>::promise();
        let joined = combined(vec![first_cell, second_cell]);

        second.complete(Ok("2")).expect("second");
        assert!(!joined.is_completed());
        first.complete(Ok("1")).expect("first");
        assert_eq!(joined.result(WAIT), Ok(Ok(vec!["1", "2"])));
    }

    #[test]
    fn late_failure_is_not_dropped() {
        init_test("late_failure_is_not_dropped");
        let (early, early_cell) = AsyncCell::<u8, Every<&str>>::promise();
        let (late, late_cell) = AsyncCell::<u8, Every<&str>>::promise();
        let joined = combined(vec![late_cell, early_cell]);

        early.complete(Err(Every::one("early"))).expect("early");
        assert!(!joined.is_completed());
        late.complete(Err(Every::one("late"))).expect("late");
        let failures = joined.result(WAIT).expect("done").expect_err("bad");
        assert_eq!(failures.into_vec(), vec!["late", "early"]);
    }

    #[test]
    fn pending_input_keeps_join_pending() {
        init_test("pending_input_keeps_join_pending");
        let (_pending, pending_cell) = AsyncCell::<u8, Every<()>>::promise();
        let joined = combined(vec![AsyncCell::good(1), pending_cell]);
        assert!(joined.result(Duration::from_millis(20)).expect_err("pending").is_timeout());
        assert!(!joined.is_completed());
    }

    #[test]
    fn abandoned_input_abandons_join() {
        init_test("abandoned_input_abandons_join");
        let (pending, pending_cell) = AsyncCell::<u8, Every<()>>::promise();
        let joined = combined(vec![AsyncCell::good(1), pending_cell]);
        drop(pending);
        assert!(joined.wait().expect_err("abandoned").is_abandoned());
    }

    #[test]
    fn custom_collector() {
        init_test("custom_collector");
        let joined: AsyncCell<VecDeque<u8>, Every<()>> =
            combined_into((1u8..=3).map(AsyncCell::good));
        assert_eq!(joined.result(WAIT), Ok(Ok(VecDeque::from(vec![1, 2, 3]))));
    }

    #[test]
    fn nested_joins_sum_accumulations() {
        init_test("nested_joins_sum_accumulations");
        let inner = combined(vec![
            AsyncCell::<u8, Every<u8>>::bad(Every::one(1)),
            AsyncCell::bad(Every::one(2)),
        ]);
        let inner = inner.map(|v| v.len() as u8);
        let outer = combined(vec![inner, AsyncCell::bad(Every::one(3))]);
        let failures = outer.result(WAIT).expect("done").expect_err("bad");
        assert_eq!(failures.into_vec(), vec![1, 2, 3]);
    }
}
