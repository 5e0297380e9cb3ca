//! The completing side of a cell.

use core::fmt;
use std::sync::Arc;

use super::{AsyncCell, Shared, State, fire, settle};
use crate::error::Error;
use crate::tracing_compat::warn;

/// Completes an [`AsyncCell`] exactly once.
///
/// Dropping a promise that never completed abandons its cell: blocking
/// waiters see [`ErrorKind::Abandoned`](crate::error::ErrorKind::Abandoned)
/// and registered callbacks are discarded without running.
pub struct Promise<G, B> {
    shared: Arc<Shared<G, B>>,
}

impl<G, B> Promise<G, B> {
    pub(super) fn new(shared: Arc<Shared<G, B>>) -> Self {
        Self { shared }
    }
}

impl<G, B> Promise<G, B>
where
    G: Clone + Send + 'static,
    B: Clone + Send + 'static,
{
    /// Returns a handle to the cell this promise completes.
    #[must_use]
    pub fn cell(&self) -> AsyncCell<G, B> {
        AsyncCell {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Completes the cell with `result`.
    ///
    /// Callbacks registered so far run on this thread, after the state lock
    /// is released. A callback that panics is logged and the rest still run.
    /// Fails with
    /// [`ErrorKind::AlreadyCompleted`](crate::error::ErrorKind::AlreadyCompleted)
    /// if the cell already holds a value; the stored value is left as is.
    pub fn complete(&self, result: Result<G, B>) -> Result<(), Error> {
        let mut state = self.shared.state.lock();
        let State::Pending { callbacks, .. } = &*state else {
            return Err(Error::already_completed());
        };

        // Keep the original for callbacks only when someone is listening.
        let (stored, for_callbacks) = if callbacks.is_empty() {
            (result, None)
        } else {
            (result.clone(), Some(result))
        };
        let Some((callbacks, wakers)) = settle(&mut state, State::Completed(stored)) else {
            return Err(Error::already_completed());
        };
        drop(state);

        self.shared.completed.notify_all();
        for waker in wakers {
            waker.wake();
        }
        if let Some(result) = for_callbacks {
            for callback in callbacks {
                fire(callback, &result);
            }
        }
        Ok(())
    }

    /// Completes the cell, returning `false` if it was already complete.
    pub fn try_complete(&self, result: Result<G, B>) -> bool {
        self.complete(result).is_ok()
    }

    /// Returns `true` once the cell holds a value.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(&*self.shared.state.lock(), State::Completed(_))
    }
}

impl<G, B> Drop for Promise<G, B> {
    fn drop(&mut self) {
        let mut state = self.shared.state.lock();
        let Some((callbacks, wakers)) = settle(&mut state, State::Abandoned) else {
            return;
        };
        drop(state);

        warn!(
            dropped_callbacks = callbacks.len(),
            "promise dropped before completion; cell abandoned"
        );
        self.shared.completed.notify_all();
        // Dropping callbacks releases whatever they captured, which may in
        // turn abandon cells derived from this one.
        drop(callbacks);
        drop(wakers);
    }
}

impl<G, B> fmt::Debug for Promise<G, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Promise")
            .field("state", &self.shared.state.lock().name())
            .finish()
    }
}
