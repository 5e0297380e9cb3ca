//! Non-empty, ordered accumulation of failures.
//!
//! [`Every`] is the failure side of every accumulating cell. It always holds
//! at least one element, and concatenation keeps operand order: the left
//! operand's elements come first. Joins rely on that to report failures in
//! input order rather than completion order.

use core::fmt;
use core::ops::Index;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::{SmallVec, smallvec};

/// Inline capacity before spilling to the heap.
///
/// Most accumulations come from a single failing input.
const INLINE: usize = 2;

/// An ordered collection of one or more failure indicators.
///
/// # Example
///
/// ```
/// use accrete::types::Every;
///
/// let left = Every::of(1, vec![3]);
/// let right = Every::one(5);
/// let all = left.concat(right);
/// assert_eq!(all.as_slice(), &[1, 3, 5]);
/// assert_eq!(*all.head(), 1);
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Every<E> {
    items: SmallVec<[E; INLINE]>,
}

impl<E> Every<E> {
    /// Creates a one-element accumulation.
    #[must_use]
    pub fn one(item: E) -> Self {
        Self {
            items: smallvec![item],
        }
    }

    /// Creates an accumulation from a head element and any trailing elements.
    #[must_use]
    pub fn of(head: E, tail: impl IntoIterator<Item = E>) -> Self {
        let mut items: SmallVec<[E; INLINE]> = smallvec![head];
        items.extend(tail);
        Self { items }
    }

    /// Builds an accumulation from a vector, or `None` if it is empty.
    #[must_use]
    pub fn try_from_vec(items: Vec<E>) -> Option<Self> {
        if items.is_empty() {
            None
        } else {
            Some(Self {
                items: SmallVec::from_vec(items),
            })
        }
    }

    /// Returns the first element.
    #[must_use]
    pub fn head(&self) -> &E {
        &self.items[0]
    }

    /// Returns the number of elements (always at least one).
    #[must_use]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns the element at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&E> {
        self.items.get(index)
    }

    /// Iterates the elements in order.
    pub fn iter(&self) -> core::slice::Iter<'_, E> {
        self.items.iter()
    }

    /// Returns the elements as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[E] {
        &self.items
    }

    /// Consumes the accumulation into a vector.
    #[must_use]
    pub fn into_vec(self) -> Vec<E> {
        self.items.into_vec()
    }

    /// Appends one element.
    pub fn push(&mut self, item: E) {
        self.items.push(item);
    }

    /// Appends every element of `other`, keeping order.
    pub fn extend_from(&mut self, other: Self) {
        self.items.extend(other.items);
    }

    /// Order-preserving concatenation: `self`'s elements precede `other`'s.
    #[must_use]
    pub fn concat(mut self, other: Self) -> Self {
        self.extend_from(other);
        self
    }

    /// Maps every element, keeping order and length.
    #[must_use]
    pub fn map<F, T>(self, f: F) -> Every<T>
    where
        F: FnMut(E) -> T,
    {
        Every {
            items: self.items.into_iter().map(f).collect(),
        }
    }
}

impl<E> From<E> for Every<E> {
    fn from(item: E) -> Self {
        Self::one(item)
    }
}

impl<E> Index<usize> for Every<E> {
    type Output = E;

    fn index(&self, index: usize) -> &E {
        &self.items[index]
    }
}

impl<E> IntoIterator for Every<E> {
    type Item = E;
    type IntoIter = smallvec::IntoIter<[E; INLINE]>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, E> IntoIterator for &'a Every<E> {
    type Item = &'a E;
    type IntoIter = core::slice::Iter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<E: fmt::Debug> fmt::Debug for Every<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Every").field(&self.as_slice()).finish()
    }
}

impl<E: fmt::Display> fmt::Display for Every<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Every(")?;
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{item}")?;
        }
        write!(f, ")")
    }
}

impl<E: Serialize> Serialize for Every<E> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_slice().serialize(serializer)
    }
}

impl<'de, E: Deserialize<'de>> Deserialize<'de> for Every<E> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let items = Vec::<E>::deserialize(deserializer)?;
        Self::try_from_vec(items)
            .ok_or_else(|| serde::de::Error::invalid_length(0, &"at least one element"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::init_test_logging;

    #[test]
    fn one_has_single_element() {
        init_test_logging();
        crate::test_phase!("one_has_single_element");
        let every = Every::one("bad");
        assert_eq!(every.len(), 1);
        assert_eq!(*every.head(), "bad");
        assert_eq!(every.get(1), None);
    }

    #[test]
    fn concat_keeps_left_first() {
        init_test_logging();
        crate::test_phase!("concat_keeps_left_first");
        let left = Every::of(1, [2]);
        let right = Every::of(3, [4, 5]);
        assert_eq!(left.concat(right).into_vec(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn empty_vec_is_rejected() {
        init_test_logging();
        crate::test_phase!("empty_vec_is_rejected");
        assert!(Every::<u8>::try_from_vec(Vec::new()).is_none());
        let every = Every::try_from_vec(vec![7, 8]).expect("non-empty");
        assert_eq!(every[1], 8);
    }

    #[test]
    fn display_lists_elements() {
        init_test_logging();
        crate::test_phase!("display_lists_elements");
        let every = Every::of("a", ["b"]);
        assert_eq!(every.to_string(), "Every(a, b)");
        assert_eq!(format!("{every:?}"), "Every([\"a\", \"b\"])");
    }

    #[test]
    fn map_preserves_order() {
        init_test_logging();
        crate::test_phase!("map_preserves_order");
        let every = Every::of(1, [2, 3]).map(|n| n * 10);
        assert_eq!(every.iter().copied().collect::<Vec<_>>(), vec![10, 20, 30]);
    }

    #[test]
    fn spills_past_inline_capacity() {
        init_test_logging();
        crate::test_phase!("spills_past_inline_capacity");
        let mut every = Every::one(0);
        for i in 1..10 {
            every.push(i);
        }
        assert_eq!(every.len(), 10);
        assert_eq!(every.as_slice(), &(0..10).collect::<Vec<_>>()[..]);
    }

    #[test]
    fn serde_round_trip_and_empty_rejection() {
        init_test_logging();
        crate::test_phase!("serde_round_trip_and_empty_rejection");
        let every = Every::of(1u32, [2, 3]);
        let json = serde_json::to_string(&every).expect("serialize");
        assert_eq!(json, "[1,2,3]");
        let back: Every<u32> = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, every);
        assert!(serde_json::from_str::<Every<u32>>("[]").is_err());
    }
}
