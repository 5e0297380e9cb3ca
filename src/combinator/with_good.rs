//! Fixed-arity "combine if all good" and zip.
//!
//! `with_goodN(c1, .., cN, f)` joins N cells with possibly different success
//! types and applies `f` to their successes, in argument order, only if all
//! of them succeeded. Otherwise the result carries every failure, in argument
//! order. `zipN` is `with_goodN` with a tuple constructor.
//!
//! All arities share the single [`combined`] core: each input's success is
//! boxed as `Arc<dyn Any>` on the way in and downcast back to its declared
//! type on the way out. Inputs are accumulating cells, so an input that
//! already carries several failures (say, from an earlier join) contributes
//! all of them. Single-failure cells join via
//! [`AsyncCell::accumulating`].

use std::any::Any;
use std::sync::Arc;

use super::fan_in::combined;
use crate::cell::AsyncCell;
use crate::error::Error;
use crate::types::Every;

type Erased = Arc<dyn Any + Send + Sync>;

fn erase<G, B>(cell: &AsyncCell<G, Every<B>>) -> AsyncCell<Erased, Every<B>>
where
    G: Clone + Send + Sync + 'static,
    B: Clone + Send + 'static,
{
    cell.map(|good| Arc::new(good) as Erased)
}

fn unerase<G>(slot: Option<Erased>) -> G
where
    G: Clone + Send + Sync + 'static,
{
    let erased = slot.expect("fan-in yields one success per input");
    let typed = Arc::downcast::<G>(erased).expect("fan-in preserves input order");
    Arc::try_unwrap(typed).unwrap_or_else(|shared| (*shared).clone())
}

macro_rules! with_good_arity {
    ($n:literal, $with_good:ident, $zip:ident; $($cell:ident: $g:ident),+) => {
        #[doc = concat!("Applies `combiner` to the successes of ", stringify!($n), " cells, accumulating every failure.")]
        pub fn $with_good<$($g,)+ B, T, F>(
            $($cell: &AsyncCell<$g, Every<B>>,)+
            combiner: F,
        ) -> AsyncCell<T, Every<B>>
        where
            $($g: Clone + Send + Sync + 'static,)+
            B: Clone + Send + 'static,
            T: Clone + Send + 'static,
            F: FnOnce($($g),+) -> T + Send + 'static,
        {
            combined(vec![$(erase($cell)),+]).map(move |goods| {
                let mut goods = goods.into_iter();
                combiner($(unerase::<$g>(goods.next())),+)
            })
        }

        #[doc = concat!("Joins ", stringify!($n), " cells into a tuple of their successes, accumulating every failure.")]
        pub fn $zip<$($g,)+ B>(
            $($cell: &AsyncCell<$g, Every<B>>,)+
        ) -> AsyncCell<($($g,)+), Every<B>>
        where
            $($g: Clone + Send + Sync + 'static,)+
            B: Clone + Send + 'static,
        {
            $with_good($($cell,)+ |$($cell),+| ($($cell,)+))
        }
    };
}

with_good_arity!(2, with_good2, zip2; c1: G1, c2: G2);
with_good_arity!(3, with_good3, zip3; c1: G1, c2: G2, c3: G3);
with_good_arity!(4, with_good4, zip4; c1: G1, c2: G2, c3: G3, c4: G4);
with_good_arity!(5, with_good5, zip5; c1: G1, c2: G2, c3: G3, c4: G4, c5: G5);
with_good_arity!(6, with_good6, zip6; c1: G1, c2: G2, c3: G3, c4: G4, c5: G5, c6: G6);
with_good_arity!(7, with_good7, zip7; c1: G1, c2: G2, c3: G3, c4: G4, c5: G5, c6: G6, c7: G7);
with_good_arity!(8, with_good8, zip8; c1: G1, c2: G2, c3: G3, c4: G4, c5: G5, c6: G6, c7: G7, c8: G8);

/// Sequence form of `with_goodN` for same-typed inputs of any arity.
///
/// Fails at the call boundary with
/// [`ErrorKind::InvalidArity`](crate::error::ErrorKind::InvalidArity) when
/// given fewer than two inputs; use [`combined`] for zero or one.
pub fn with_good_all<G, B, T, F>(
    cells: Vec<AsyncCell<G, Every<B>>>,
    combiner: F,
) -> Result<AsyncCell<T, Every<B>>, Error>
where
    G: Clone + Send + 'static,
    B: Clone + Send + 'static,
    T: Clone + Send + 'static,
    F: FnOnce(Vec<G>) -> T + Send + 'static,
{
    if cells.len() < 2 {
        return Err(Error::invalid_arity("with_good_all", 2, cells.len()));
    }
    Ok(combined(cells).map(combiner))
}
