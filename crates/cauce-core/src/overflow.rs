//! Unwritten tail of a rendered block.
//!
//! When a device accepts only part of a write, the rest has to go out first on
//! the next tick. [`Overflow`] keeps the whole rendered block plus a cursor; the
//! active window is `base[offset..]`, materialized on demand by
//! [`Overflow::pending`].

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// Owned `(buffer, cursor)` pair holding samples the device has not accepted yet.
#[derive(Debug, Clone, Default)]
pub struct Overflow {
    base: Vec<f32>,
    offset: usize,
}

impl Overflow {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if nothing is waiting to be written.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.offset >= self.base.len()
    }

    /// Number of samples still waiting.
    #[inline]
    pub fn len(&self) -> usize {
        self.base.len().saturating_sub(self.offset)
    }

    /// The samples still waiting, or `None` when empty.
    #[inline]
    pub fn pending(&self) -> Option<&[f32]> {
        if self.is_empty() {
            None
        } else {
            Some(&self.base[self.offset..])
        }
    }

    /// Marks `accepted` leading pending samples as written.
    ///
    /// Clears the tracker once the last sample is consumed.
    pub fn consume(&mut self, accepted: usize) {
        self.offset = (self.offset + accepted).min(self.base.len());
        if self.is_empty() {
            self.clear();
        }
    }

    /// Takes ownership of `rendered`, of which `accepted` leading samples were
    /// already written.
    ///
    /// `rendered` is swapped with the previous (cleared) base, so the caller
    /// gets an allocation back to render into next time.
    pub fn capture(&mut self, rendered: &mut Vec<f32>, accepted: usize) {
        self.base.clear();
        core::mem::swap(&mut self.base, rendered);
        self.offset = accepted.min(self.base.len());
        if self.is_empty() {
            self.clear();
        }
    }

    /// Drops any pending samples.
    pub fn clear(&mut self) {
        self.base.clear();
        self.offset = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let overflow = Overflow::new();
        assert!(overflow.is_empty());
        assert_eq!(overflow.len(), 0);
        assert!(overflow.pending().is_none());
    }

    #[test]
    fn capture_keeps_unaccepted_tail() {
        let mut overflow = Overflow::new();
        let mut rendered = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        overflow.capture(&mut rendered, 2);
        assert_eq!(overflow.pending(), Some(&[3.0, 4.0, 5.0][..]));
        assert!(rendered.is_empty());
    }

    #[test]
    fn consume_advances_cursor_then_clears() {
        let mut overflow = Overflow::new();
        let mut rendered = vec![1.0, 2.0, 3.0, 4.0];
        overflow.capture(&mut rendered, 1);

        overflow.consume(1);
        assert_eq!(overflow.pending(), Some(&[3.0, 4.0][..]));

        overflow.consume(2);
        assert!(overflow.is_empty());
        assert!(overflow.pending().is_none());
    }

    #[test]
    fn consume_past_end_saturates() {
        let mut overflow = Overflow::new();
        let mut rendered = vec![1.0, 2.0];
        overflow.capture(&mut rendered, 0);
        overflow.consume(10);
        assert!(overflow.is_empty());
    }

    #[test]
    fn capture_fully_accepted_stays_empty() {
        let mut overflow = Overflow::new();
        let mut rendered = vec![1.0, 2.0];
        overflow.capture(&mut rendered, 2);
        assert!(overflow.is_empty());
    }

    #[test]
    fn capture_recycles_previous_allocation() {
        let mut overflow = Overflow::new();
        let mut first = Vec::with_capacity(64);
        first.extend_from_slice(&[1.0, 2.0]);
        overflow.capture(&mut first, 1);
        overflow.consume(1);

        let mut second = vec![9.0, 8.0, 7.0];
        overflow.capture(&mut second, 1);
        assert!(second.is_empty());
        assert!(second.capacity() >= 64);
        assert_eq!(overflow.pending(), Some(&[8.0, 7.0][..]));
    }
}
