//! Dual-result future cells.
//!
//! An [`AsyncCell<G, B>`] is a handle to an asynchronous computation that
//! resolves exactly once to `Ok(G)` or `Err(B)`. The completing side is a
//! [`Promise`]; every other party observes through the cell:
//!
//! - [`AsyncCell::on_complete`] registers a callback. It fires immediately on
//!   the registering thread if the cell is already complete, otherwise once,
//!   on whichever thread completes the cell.
//! - [`AsyncCell::result`] blocks up to a timeout. Giving up does not affect
//!   the cell.
//! - `.await` yields the result from async code.
//!
//! # State machine
//!
//! ```text
//! Pending ──complete──► Completed(result)
//!    │
//!    └──promise dropped──► Abandoned
//! ```
//!
//! Both transitions happen at most once. A second completion attempt is
//! rejected with [`ErrorKind::AlreadyCompleted`](crate::error::ErrorKind) and
//! leaves the stored value untouched.
//!
//! # Sharing
//!
//! Cells are cheap `Arc` handles. Every observer gets its own copy of the
//! final value, so payloads are `Clone`, as with `futures::future::Shared`.

mod promise;
mod transform;

pub use promise::Promise;

use core::fmt;
use std::future::Future;
use std::mem;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::error::Error;
use crate::executor::{self, Executor};
use crate::tracing_compat::error;
use crate::types::Every;

/// A completion callback.
pub(crate) type Callback<G, B> = Box<dyn FnOnce(&Result<G, B>) + Send>;

pub(crate) enum State<G, B> {
    Pending {
        callbacks: Vec<Callback<G, B>>,
        wakers: Vec<Waker>,
    },
    Completed(Result<G, B>),
    Abandoned,
}

impl<G, B> State<G, B> {
    const fn pending() -> Self {
        Self::Pending {
            callbacks: Vec::new(),
            wakers: Vec::new(),
        }
    }

    const fn name(&self) -> &'static str {
        match self {
            Self::Pending { .. } => "pending",
            Self::Completed(Ok(_)) => "good",
            Self::Completed(Err(_)) => "bad",
            Self::Abandoned => "abandoned",
        }
    }
}

pub(crate) struct Shared<G, B> {
    pub(crate) state: Mutex<State<G, B>>,
    pub(crate) completed: Condvar,
}

impl<G, B> Shared<G, B> {
    fn new(state: State<G, B>) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(state),
            completed: Condvar::new(),
        })
    }
}

/// A handle to an asynchronous computation yielding `Result<G, B>`.
///
/// # Example
///
/// ```
/// use accrete::cell::AsyncCell;
/// use std::time::Duration;
///
/// let (promise, cell) = AsyncCell::<u32, String>::promise();
/// let doubled = cell.map(|n| n * 2);
/// promise.complete(Ok(21)).unwrap();
/// assert_eq!(doubled.result(Duration::from_secs(1)).unwrap(), Ok(42));
/// ```
pub struct AsyncCell<G, B> {
    shared: Arc<Shared<G, B>>,
}

impl<G, B> Clone for AsyncCell<G, B> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<G, B> fmt::Debug for AsyncCell<G, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncCell")
            .field("state", &self.shared.state.lock().name())
            .finish()
    }
}

impl<G, B> AsyncCell<G, B>
where
    G: Clone + Send + 'static,
    B: Clone + Send + 'static,
{
    /// Creates a pending cell together with the promise that completes it.
    #[must_use]
    pub fn promise() -> (Promise<G, B>, Self) {
        let shared = Shared::new(State::pending());
        let cell = Self {
            shared: Arc::clone(&shared),
        };
        (Promise::new(shared), cell)
    }

    /// Creates an already-completed cell.
    #[must_use]
    pub fn ready(result: Result<G, B>) -> Self {
        Self {
            shared: Shared::new(State::Completed(result)),
        }
    }

    /// Creates a cell already completed with `Ok(good)`.
    #[must_use]
    pub fn good(good: G) -> Self {
        Self::ready(Ok(good))
    }

    /// Creates a cell already completed with `Err(bad)`.
    #[must_use]
    pub fn bad(bad: B) -> Self {
        Self::ready(Err(bad))
    }

    /// Runs `computation` on the process default executor.
    ///
    /// See [`executor::default_executor`].
    pub fn spawn<F>(computation: F) -> Self
    where
        F: FnOnce() -> Result<G, B> + Send + 'static,
    {
        Self::spawn_on(&executor::default_executor(), computation)
    }

    /// Runs `computation` on `executor` and returns a cell for its result.
    ///
    /// A computation that panics never completes its cell; the cell is
    /// abandoned instead.
    pub fn spawn_on<E, F>(executor: &E, computation: F) -> Self
    where
        E: Executor + ?Sized,
        F: FnOnce() -> Result<G, B> + Send + 'static,
    {
        let (promise, cell) = Self::promise();
        executor.execute(Box::new(move || {
            match catch_unwind(AssertUnwindSafe(computation)) {
                Ok(result) => {
                    let _ = promise.complete(result);
                }
                Err(_) => {
                    error!("spawned computation panicked; abandoning its cell");
                    drop(promise);
                }
            }
        }));
        cell
    }

    /// Registers `callback` to receive the final result exactly once.
    ///
    /// Runs immediately on this thread if the cell is already complete.
    /// Callbacks registered on an abandoned cell never run. A panicking
    /// callback is logged and does not stop the others.
    pub fn on_complete<F>(&self, callback: F)
    where
        F: FnOnce(&Result<G, B>) + Send + 'static,
    {
        let ready = {
            let mut state = self.shared.state.lock();
            match &mut *state {
                State::Pending { callbacks, .. } => {
                    callbacks.push(Box::new(callback));
                    return;
                }
                State::Completed(result) => result.clone(),
                State::Abandoned => return,
            }
        };
        fire(callback, &ready);
    }

    /// Blocks until the cell completes or `timeout` elapses.
    ///
    /// Fails with [`ErrorKind::Timeout`](crate::error::ErrorKind::Timeout) if
    /// the wait elapsed, or [`ErrorKind::Abandoned`](crate::error::ErrorKind::Abandoned)
    /// if the producer went away. Neither affects the cell.
    pub fn result(&self, timeout: Duration) -> Result<Result<G, B>, Error> {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.wait_until(Some(deadline), timeout),
            None => self.wait_until(None, timeout),
        }
    }

    /// [`result`](Self::result) with the process default timeout.
    pub fn result_default(&self) -> Result<Result<G, B>, Error> {
        self.result(executor::default_timeout())
    }

    /// Blocks until the cell completes, without a deadline.
    pub fn wait(&self) -> Result<Result<G, B>, Error> {
        self.wait_until(None, Duration::MAX)
    }

    fn wait_until(
        &self,
        deadline: Option<Instant>,
        timeout: Duration,
    ) -> Result<Result<G, B>, Error> {
        let mut state = self.shared.state.lock();
        loop {
            match &*state {
                State::Completed(result) => return Ok(result.clone()),
                State::Abandoned => return Err(Error::abandoned()),
                State::Pending { .. } => {}
            }
            match deadline {
                Some(deadline) => {
                    if self
                        .shared
                        .completed
                        .wait_until(&mut state, deadline)
                        .timed_out()
                    {
                        return match &*state {
                            State::Completed(result) => Ok(result.clone()),
                            State::Abandoned => Err(Error::abandoned()),
                            State::Pending { .. } => Err(Error::timeout(timeout)),
                        };
                    }
                }
                None => self.shared.completed.wait(&mut state),
            }
        }
    }

    /// Returns the result if the cell has completed.
    #[must_use]
    pub fn value(&self) -> Option<Result<G, B>> {
        match &*self.shared.state.lock() {
            State::Completed(result) => Some(result.clone()),
            _ => None,
        }
    }

    /// Returns `true` once the cell holds a result.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(&*self.shared.state.lock(), State::Completed(_))
    }

    /// Lifts a single failure into a one-element accumulation.
    ///
    /// `Ok(g)` passes through unchanged; `Err(b)` becomes `Err(Every::one(b))`.
    #[must_use]
    pub fn accumulating(&self) -> AsyncCell<G, Every<B>> {
        self.transform(|result| result.map_err(Every::one))
    }
}

/// Awaiting an abandoned cell never resolves. Use
/// [`AsyncCell::result`] with a timeout when the producer may be dropped.
impl<G, B> Future for AsyncCell<G, B>
where
    G: Clone + Send + 'static,
    B: Clone + Send + 'static,
{
    type Output = Result<G, B>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut state = self.shared.state.lock();
        match &mut *state {
            State::Completed(result) => Poll::Ready(result.clone()),
            State::Pending { wakers, .. } => {
                if !wakers.iter().any(|w| w.will_wake(cx.waker())) {
                    wakers.push(cx.waker().clone());
                }
                Poll::Pending
            }
            // Nothing will ever complete it.
            State::Abandoned => Poll::Pending,
        }
    }
}

/// Runs one callback, containing a panic so the remaining callbacks still fire.
pub(crate) fn fire<G, B, F>(callback: F, result: &Result<G, B>)
where
    F: FnOnce(&Result<G, B>),
{
    if catch_unwind(AssertUnwindSafe(|| callback(result))).is_err() {
        error!("completion callback panicked; continuing with the rest");
    }
}

/// Moves the pending callbacks and wakers out, leaving `next` in place.
///
/// Returns `None` if the cell was not pending.
pub(crate) fn settle<G, B>(
    state: &mut State<G, B>,
    next: State<G, B>,
) -> Option<(Vec<Callback<G, B>>, Vec<Waker>)> {
    let State::Pending { callbacks, wakers } = state else {
        return None;
    };
    let taken = (mem::take(callbacks), mem::take(wakers));
    *state = next;
    Some(taken)
}
