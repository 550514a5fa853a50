//! Fixed-capacity ring buffer over a logical, ever-increasing index space
//!
//! Each displayed signal owns one buffer. Entries are addressed by logical
//! index (the position in the append-only sequence), not by physical slot, so
//! a reader can tell an evicted sample apart from a retained one.

use thiserror::Error;

/// Ring buffer access errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RingError {
    #[error("Ring buffer capacity must be positive")]
    ZeroCapacity,

    #[error("Logical index {index} is behind the retained window (length {len}, capacity {capacity})")]
    OutOfWindow {
        index: usize,
        len: usize,
        capacity: usize,
    },
}

/// Bounded FIFO history with O(1) insert and O(1) indexed access
///
/// Capacity is fixed for the buffer's lifetime; once `len() >= capacity()`,
/// every `push` overwrites the oldest retained entry. Only the most recent
/// `min(len, capacity)` logical entries are retrievable.
///
/// # Example
///
/// ```
/// use oscsim::ring::RingBuffer;
///
/// let mut buf = RingBuffer::with_capacity(3).unwrap();
/// for i in 0..5 {
///     buf.push(i);
/// }
/// assert_eq!(buf.get(1), None);     // evicted
/// assert_eq!(buf.get(2), Some(&2)); // oldest retained
/// assert_eq!(buf.truncated_len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RingBuffer<T> {
    storage: Vec<Option<T>>,
    len: usize,
}

impl<T> RingBuffer<T> {
    /// Create a buffer with exactly `capacity` slots
    pub fn with_capacity(capacity: usize) -> Result<Self, RingError> {
        if capacity == 0 {
            return Err(RingError::ZeroCapacity);
        }
        let mut storage = Vec::with_capacity(capacity);
        storage.resize_with(capacity, || None);
        Ok(Self { storage, len: 0 })
    }

    /// Physical capacity in slots
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Logical length: total number of entries ever appended
    ///
    /// Monotonically non-decreasing across `push`; `set` may advance it
    /// arbitrarily far via sparse fill.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of currently retrievable entries: `min(len, capacity)`
    pub fn truncated_len(&self) -> usize {
        self.len.min(self.storage.len())
    }

    /// Append a value, evicting the oldest retained entry once full
    pub fn push(&mut self, value: T) {
        let n = self.storage.len();
        self.storage[self.len % n] = Some(value);
        self.len += 1;
    }

    /// Retrieve the value at logical index `i`
    ///
    /// Returns `None` for evicted indices, indices at or past the logical
    /// length, and slots skipped by a sparse `set`. Never silently reads a
    /// slot that has since been overwritten by a newer entry.
    pub fn get(&self, i: usize) -> Option<&T> {
        let n = self.storage.len();
        if i >= self.len || i + n < self.len {
            return None;
        }
        self.storage[i % n].as_ref()
    }

    /// Write the value at logical index `i`
    ///
    /// Writing behind the retained window is an error. Writing at or past the
    /// current length advances it: intermediate slots are cleared (reported
    /// absent by `get`) and the logical length becomes `i + 1`.
    pub fn set(&mut self, i: usize, value: T) -> Result<(), RingError> {
        let n = self.storage.len();
        if i + n < self.len {
            return Err(RingError::OutOfWindow {
                index: i,
                len: self.len,
                capacity: n,
            });
        }

        while i > self.len {
            self.storage[self.len % n] = None;
            self.len += 1;
        }

        self.storage[i % n] = Some(value);
        if i == self.len {
            self.len += 1;
        }
        Ok(())
    }

    /// Most recently appended entry, if any is retained
    pub fn last(&self) -> Option<&T> {
        if self.len == 0 {
            return None;
        }
        self.get(self.len - 1)
    }

    /// Iterate the retained window oldest-to-newest
    ///
    /// Sparse-cleared slots inside the window are skipped.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        let start = self.len.saturating_sub(self.storage.len());
        (start..self.len).filter_map(move |i| self.get(i))
    }

    /// Drop all entries, keeping the capacity
    pub fn clear(&mut self) {
        for slot in &mut self.storage {
            *slot = None;
        }
        self.len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_capacity_rejected() {
        assert_eq!(
            RingBuffer::<f64>::with_capacity(0).unwrap_err(),
            RingError::ZeroCapacity
        );
    }

    #[test]
    fn test_push_within_capacity() {
        let mut buf = RingBuffer::with_capacity(5).unwrap();
        buf.push(1.0);
        buf.push(2.0);

        assert_eq!(buf.len(), 2);
        assert_eq!(buf.truncated_len(), 2);
        assert_eq!(buf.get(0), Some(&1.0));
        assert_eq!(buf.get(1), Some(&2.0));
        assert_eq!(buf.get(2), None);
    }

    #[test]
    fn test_push_evicts_oldest() {
        let mut buf = RingBuffer::with_capacity(4).unwrap();
        for i in 0..5 {
            buf.push(i);
        }

        // Capacity-n buffer after n+1 pushes retains only the last n
        assert_eq!(buf.len(), 5);
        assert_eq!(buf.truncated_len(), 4);
        assert_eq!(buf.get(0), None);
        assert_eq!(buf.get(1), Some(&1));
        assert_eq!(buf.get(4), Some(&4));
    }

    #[test]
    fn test_truncated_len_never_exceeds_capacity() {
        let mut buf = RingBuffer::with_capacity(3).unwrap();
        for i in 0..100 {
            buf.push(i);
            assert!(buf.truncated_len() <= 3);
        }
        assert_eq!(buf.truncated_len(), 3);
    }

    #[test]
    fn test_set_sparse_fill() {
        let mut buf = RingBuffer::with_capacity(10).unwrap();
        buf.push(1.0);

        // Write two beyond the current length: slots 1 and 2 are skipped
        buf.set(3, 4.0).unwrap();

        assert_eq!(buf.len(), 4);
        assert_eq!(buf.get(0), Some(&1.0));
        assert_eq!(buf.get(1), None);
        assert_eq!(buf.get(2), None);
        assert_eq!(buf.get(3), Some(&4.0));
    }

    #[test]
    fn test_set_behind_window_fails() {
        let mut buf = RingBuffer::with_capacity(3).unwrap();
        for i in 0..6 {
            buf.push(i);
        }

        let err = buf.set(2, 99).unwrap_err();
        assert_eq!(
            err,
            RingError::OutOfWindow {
                index: 2,
                len: 6,
                capacity: 3
            }
        );
        // Storage untouched
        assert_eq!(buf.get(3), Some(&3));
    }

    #[test]
    fn test_set_overwrites_in_window() {
        let mut buf = RingBuffer::with_capacity(3).unwrap();
        for i in 0..5 {
            buf.push(i);
        }

        buf.set(3, 30).unwrap();
        assert_eq!(buf.get(3), Some(&30));
        assert_eq!(buf.len(), 5);
    }

    #[test]
    fn test_iter_chronological() {
        let mut buf = RingBuffer::with_capacity(3).unwrap();
        for i in 0..5 {
            buf.push(i);
        }

        let items: Vec<i32> = buf.iter().copied().collect();
        assert_eq!(items, vec![2, 3, 4]);
    }

    #[test]
    fn test_last() {
        let mut buf = RingBuffer::with_capacity(2).unwrap();
        assert_eq!(buf.last(), None);

        buf.push(7);
        buf.push(8);
        buf.push(9);
        assert_eq!(buf.last(), Some(&9));
    }

    #[test]
    fn test_clear() {
        let mut buf = RingBuffer::with_capacity(3).unwrap();
        buf.push(1);
        buf.clear();

        assert!(buf.is_empty());
        assert_eq!(buf.get(0), None);
        assert_eq!(buf.truncated_len(), 0);
    }
}
