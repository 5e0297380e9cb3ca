//! Single-cell transforms.
//!
//! Each transform registers one callback on the source and completes a fresh
//! cell from it. If the source is abandoned, so is the derived cell.

use super::AsyncCell;
use crate::types::Validation;

impl<G, B> AsyncCell<G, B>
where
    G: Clone + Send + 'static,
    B: Clone + Send + 'static,
{
    /// Maps the whole result into a new cell.
    pub fn transform<H, C, F>(&self, f: F) -> AsyncCell<H, C>
    where
        H: Clone + Send + 'static,
        C: Clone + Send + 'static,
        F: FnOnce(Result<G, B>) -> Result<H, C> + Send + 'static,
    {
        let (promise, derived) = AsyncCell::promise();
        self.on_complete(move |result| {
            let _ = promise.complete(f(result.clone()));
        });
        derived
    }

    /// Maps the success payload.
    pub fn map<H, F>(&self, f: F) -> AsyncCell<H, B>
    where
        H: Clone + Send + 'static,
        F: FnOnce(G) -> H + Send + 'static,
    {
        self.transform(|result| result.map(f))
    }

    /// Maps the failure payload.
    pub fn bad_map<C, F>(&self, f: F) -> AsyncCell<G, C>
    where
        C: Clone + Send + 'static,
        F: FnOnce(B) -> C + Send + 'static,
    {
        self.transform(|result| result.map_err(f))
    }

    /// Chains a dependent asynchronous step on success.
    pub fn flat_map<H, F>(&self, f: F) -> AsyncCell<H, B>
    where
        H: Clone + Send + 'static,
        F: FnOnce(G) -> AsyncCell<H, B> + Send + 'static,
    {
        let (promise, derived) = AsyncCell::promise();
        self.on_complete(move |result| match result.clone() {
            Ok(good) => f(good).on_complete(move |inner| {
                let _ = promise.complete(inner.clone());
            }),
            Err(bad) => {
                let _ = promise.complete(Err(bad));
            }
        });
        derived
    }

    /// Replaces a failure with a success computed from it.
    pub fn recover<F>(&self, f: F) -> AsyncCell<G, B>
    where
        F: FnOnce(B) -> G + Send + 'static,
    {
        self.transform(|result| Ok(result.unwrap_or_else(f)))
    }

    /// Replaces a failure with the outcome of another asynchronous step.
    pub fn recover_with<C, F>(&self, f: F) -> AsyncCell<G, C>
    where
        C: Clone + Send + 'static,
        F: FnOnce(B) -> AsyncCell<G, C> + Send + 'static,
    {
        let (promise, derived) = AsyncCell::promise();
        self.on_complete(move |result| match result.clone() {
            Ok(good) => {
                let _ = promise.complete(Ok(good));
            }
            Err(bad) => f(bad).on_complete(move |inner| {
                let _ = promise.complete(inner.clone());
            }),
        });
        derived
    }

    /// Turns a success that fails `validator` into that failure.
    pub fn filter<F>(&self, validator: F) -> AsyncCell<G, B>
    where
        F: FnOnce(&G) -> Validation<B> + Send + 'static,
    {
        self.transform(|result| {
            result.and_then(|good| match validator(&good) {
                Validation::Pass => Ok(good),
                Validation::Fail(bad) => Err(bad),
            })
        })
    }

    /// Runs a side effect, then completes a new cell with the same result.
    ///
    /// Observers of the returned cell see the effect as already applied.
    pub fn and_then<F>(&self, effect: F) -> AsyncCell<G, B>
    where
        F: FnOnce(&Result<G, B>) + Send + 'static,
    {
        self.transform(|result| {
            effect(&result);
            result
        })
    }

    /// Runs `f` with the success payload, if any.
    pub fn on_good<F>(&self, f: F)
    where
        F: FnOnce(&G) + Send + 'static,
    {
        self.on_complete(move |result| {
            if let Ok(good) = result {
                f(good);
            }
        });
    }

    /// Runs `f` with the failure payload, if any.
    pub fn on_bad<F>(&self, f: F)
    where
        F: FnOnce(&B) + Send + 'static,
    {
        self.on_complete(move |result| {
            if let Err(bad) = result {
                f(bad);
            }
        });
    }
}
