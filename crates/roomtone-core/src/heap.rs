//! Indexed binary min-heap over a fixed key space.
//!
//! Items are dense integers in `0..capacity` (search labels during path
//! search). A position table maps each item to its slot in the heap, which
//! makes decrease-key O(log n) without searching. Storage is allocated in
//! [`IndexedMinHeap::with_capacity`] and only grows through
//! [`IndexedMinHeap::reserve_items`]; pushing, popping, and clearing never
//! allocate.

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

use crate::error::SearchError;

const NOT_QUEUED: u32 = u32::MAX;

/// Binary min-heap keyed by dense item indices, with decrease-key.
///
/// Ties are broken by insertion order only as far as the heap shape allows;
/// callers must not rely on a particular order among equal priorities.
#[derive(Debug, Clone)]
pub struct IndexedMinHeap {
    /// Heap-ordered `(priority, item)` pairs.
    slots: Vec<(f32, u32)>,
    /// `positions[item]` is the item's slot in `slots`, or `NOT_QUEUED`.
    positions: Vec<u32>,
}

impl IndexedMinHeap {
    /// Allocates a heap for items in `0..capacity`.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            positions: vec![NOT_QUEUED; capacity],
        }
    }

    /// Size of the item key space.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.positions.len()
    }

    /// Grows the key space to at least `capacity` items, keeping queued
    /// items in place.
    pub fn reserve_items(&mut self, capacity: usize) {
        if capacity > self.positions.len() {
            self.positions.resize(capacity, NOT_QUEUED);
            self.slots.reserve(capacity - self.slots.len());
        }
    }

    /// Number of queued items.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` when no items are queued.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Whether `item` is currently queued.
    #[inline]
    pub fn contains(&self, item: usize) -> bool {
        self.positions.get(item).is_some_and(|&p| p != NOT_QUEUED)
    }

    /// Current priority of a queued item.
    pub fn priority(&self, item: usize) -> Option<f32> {
        let pos = *self.positions.get(item)?;
        (pos != NOT_QUEUED).then(|| self.slots[pos as usize].0)
    }

    /// Inserts `item`, or lowers its priority if already queued.
    ///
    /// Returns `Ok(true)` if the queue changed. A priority that is not lower
    /// than the queued one is ignored and returns `Ok(false)`.
    ///
    /// # Errors
    ///
    /// [`SearchError::QueueOverflow`] if `item` is outside the key space.
    pub fn push_or_decrease(&mut self, item: usize, priority: f32) -> Result<bool, SearchError> {
        let Some(&pos) = self.positions.get(item) else {
            return Err(SearchError::QueueOverflow {
                item,
                capacity: self.capacity(),
            });
        };

        if pos == NOT_QUEUED {
            let slot = self.slots.len();
            self.slots.push((priority, item as u32));
            self.positions[item] = slot as u32;
            self.sift_up(slot);
            return Ok(true);
        }

        let slot = pos as usize;
        if priority < self.slots[slot].0 {
            self.slots[slot].0 = priority;
            self.sift_up(slot);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Removes and returns the item with the lowest priority.
    pub fn pop_min(&mut self) -> Option<(usize, f32)> {
        if self.slots.is_empty() {
            return None;
        }
        let last = self.slots.len() - 1;
        self.swap_slots(0, last);
        let (priority, item) = self.slots.pop()?;
        self.positions[item as usize] = NOT_QUEUED;
        if !self.slots.is_empty() {
            self.sift_down(0);
        }
        Some((item as usize, priority))
    }

    /// Empties the queue in O(len), leaving capacity intact.
    pub fn clear(&mut self) {
        for &(_, item) in &self.slots {
            self.positions[item as usize] = NOT_QUEUED;
        }
        self.slots.clear();
    }

    fn sift_up(&mut self, mut slot: usize) {
        while slot > 0 {
            let parent = (slot - 1) / 2;
            if self.slots[slot].0 < self.slots[parent].0 {
                self.swap_slots(slot, parent);
                slot = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut slot: usize) {
        let len = self.slots.len();
        loop {
            let left = 2 * slot + 1;
            let right = left + 1;
            let mut smallest = slot;
            if left < len && self.slots[left].0 < self.slots[smallest].0 {
                smallest = left;
            }
            if right < len && self.slots[right].0 < self.slots[smallest].0 {
                smallest = right;
            }
            if smallest == slot {
                break;
            }
            self.swap_slots(slot, smallest);
            slot = smallest;
        }
    }

    #[inline]
    fn swap_slots(&mut self, a: usize, b: usize) {
        self.slots.swap(a, b);
        self.positions[self.slots[a].1 as usize] = a as u32;
        self.positions[self.slots[b].1 as usize] = b as u32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(feature = "std"))]
    use alloc::vec::Vec;

    #[test]
    fn pops_in_priority_order() {
        let mut heap = IndexedMinHeap::with_capacity(8);
        for (item, p) in [(3, 5.0), (1, 2.0), (7, 9.0), (0, 1.0), (4, 3.5)] {
            assert_eq!(heap.push_or_decrease(item, p), Ok(true));
        }
        let order: Vec<usize> = core::iter::from_fn(|| heap.pop_min().map(|(i, _)| i)).collect();
        assert_eq!(order, [0, 1, 4, 3, 7]);
        assert!(heap.is_empty());
    }

    #[test]
    fn decrease_key_reorders() {
        let mut heap = IndexedMinHeap::with_capacity(4);
        heap.push_or_decrease(0, 10.0).unwrap();
        heap.push_or_decrease(1, 5.0).unwrap();
        heap.push_or_decrease(2, 7.0).unwrap();
        assert_eq!(heap.push_or_decrease(0, 1.0), Ok(true));
        assert_eq!(heap.priority(0), Some(1.0));
        assert_eq!(heap.pop_min(), Some((0, 1.0)));
    }

    #[test]
    fn higher_priority_is_ignored() {
        let mut heap = IndexedMinHeap::with_capacity(4);
        heap.push_or_decrease(2, 3.0).unwrap();
        assert_eq!(heap.push_or_decrease(2, 4.0), Ok(false));
        assert_eq!(heap.push_or_decrease(2, 3.0), Ok(false));
        assert_eq!(heap.len(), 1);
        assert_eq!(heap.priority(2), Some(3.0));
    }

    #[test]
    fn out_of_range_item_overflows() {
        let mut heap = IndexedMinHeap::with_capacity(2);
        assert_eq!(
            heap.push_or_decrease(2, 1.0),
            Err(SearchError::QueueOverflow {
                item: 2,
                capacity: 2
            })
        );
        assert!(!heap.contains(2));
    }

    #[test]
    fn clear_forgets_positions() {
        let mut heap = IndexedMinHeap::with_capacity(4);
        heap.push_or_decrease(1, 1.0).unwrap();
        heap.push_or_decrease(3, 2.0).unwrap();
        heap.clear();
        assert!(heap.is_empty());
        assert!(!heap.contains(1));
        assert!(!heap.contains(3));
        assert_eq!(heap.push_or_decrease(3, 9.0), Ok(true));
        assert_eq!(heap.pop_min(), Some((3, 9.0)));
    }

    #[test]
    fn reinsert_after_pop() {
        let mut heap = IndexedMinHeap::with_capacity(3);
        heap.push_or_decrease(1, 1.0).unwrap();
        assert_eq!(heap.pop_min(), Some((1, 1.0)));
        assert_eq!(heap.priority(1), None);
        assert_eq!(heap.push_or_decrease(1, 4.0), Ok(true));
        assert!(heap.contains(1));
    }

    #[test]
    fn reserve_items_keeps_queue() {
        let mut heap = IndexedMinHeap::with_capacity(2);
        heap.push_or_decrease(1, 4.0).unwrap();
        assert!(heap.push_or_decrease(5, 1.0).is_err());

        heap.reserve_items(8);
        assert_eq!(heap.capacity(), 8);
        assert_eq!(heap.push_or_decrease(5, 1.0), Ok(true));
        assert_eq!(heap.pop_min(), Some((5, 1.0)));
        assert_eq!(heap.pop_min(), Some((1, 4.0)));
    }
}
