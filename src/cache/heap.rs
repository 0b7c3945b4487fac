//! Expiry Heap Module
//!
//! Array-backed min-heap ordered by expiration deadline.
//!
//! Entries live in an arena and are addressed by a stable [`EntryId`]; the heap
//! array holds ids. Each entry records its own slot in the heap array, updated
//! on every swap, so an entry can be re-heapified or removed in O(log n)
//! without scanning.

use super::Entry;

/// Stable handle to an entry for as long as it stays in the heap.
pub type EntryId = usize;

// == Expiry Heap ==
/// Min-heap of cache entries keyed on `expires_at`.
///
/// Ties compare equal; their relative order is unspecified.
#[derive(Debug)]
pub struct ExpiryHeap<K, V> {
    /// Entry storage, `None` marks a free arena cell
    arena: Vec<Option<Entry<K, V>>>,
    /// Arena cells available for reuse
    free: Vec<EntryId>,
    /// Heap order: `order[slot]` is the id of the entry in that slot
    order: Vec<EntryId>,
}

impl<K, V> Default for ExpiryHeap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> ExpiryHeap<K, V> {
    // == Constructor ==
    /// Creates an empty heap.
    pub fn new() -> Self {
        Self {
            arena: Vec::new(),
            free: Vec::new(),
            order: Vec::new(),
        }
    }

    /// Number of entries in the heap.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if the heap holds no entries.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Looks up an entry by id.
    pub fn get(&self, id: EntryId) -> Option<&Entry<K, V>> {
        self.arena.get(id).and_then(Option::as_ref)
    }

    /// Mutable lookup by id.
    ///
    /// Changing `expires_at` through this reference breaks heap order until
    /// [`fix`](Self::fix) is called on the entry's slot.
    pub fn get_mut(&mut self, id: EntryId) -> Option<&mut Entry<K, V>> {
        self.arena.get_mut(id).and_then(Option::as_mut)
    }

    // == Push ==
    /// Inserts an entry and returns its id.
    pub fn push(&mut self, mut entry: Entry<K, V>) -> EntryId {
        let slot = self.order.len();
        entry.slot = slot;

        let id = match self.free.pop() {
            Some(id) => {
                self.arena[id] = Some(entry);
                id
            }
            None => {
                self.arena.push(Some(entry));
                self.arena.len() - 1
            }
        };

        self.order.push(id);
        self.sift_up(slot);
        id
    }

    // == Peek Min ==
    /// Returns the entry with the earliest deadline without removing it.
    pub fn peek_min(&self) -> Option<&Entry<K, V>> {
        self.order.first().and_then(|&id| self.get(id))
    }

    // == Pop ==
    /// Removes and returns the entry with the earliest deadline.
    pub fn pop(&mut self) -> Option<Entry<K, V>> {
        self.remove_at(0)
    }

    // == Remove At ==
    /// Removes the entry in `slot`, restoring heap order around the element
    /// moved into its place.
    pub fn remove_at(&mut self, slot: usize) -> Option<Entry<K, V>> {
        if slot >= self.order.len() {
            return None;
        }

        let last = self.order.len() - 1;
        if slot != last {
            self.swap(slot, last);
        }

        let id = self.order.pop()?;
        let entry = self.arena.get_mut(id).and_then(Option::take);
        self.free.push(id);

        if slot < self.order.len() {
            self.fix(slot);
        }

        entry
    }

    // == Fix ==
    /// Restores heap order after the deadline of the entry in `slot` changed.
    pub fn fix(&mut self, slot: usize) {
        if slot >= self.order.len() {
            return;
        }
        if !self.sift_up(slot) {
            self.sift_down(slot);
        }
    }

    // == Internals ==

    fn deadline(&self, slot: usize) -> Option<tokio::time::Instant> {
        self.get(self.order[slot]).map(|entry| entry.expires_at)
    }

    fn less(&self, a: usize, b: usize) -> bool {
        match (self.deadline(a), self.deadline(b)) {
            (Some(a), Some(b)) => a < b,
            _ => false,
        }
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.order.swap(a, b);
        for slot in [a, b] {
            let id = self.order[slot];
            if let Some(entry) = self.get_mut(id) {
                entry.slot = slot;
            }
        }
    }

    /// Moves the element up while it is earlier than its parent.
    /// Returns true if it moved.
    fn sift_up(&mut self, mut slot: usize) -> bool {
        let start = slot;
        while slot > 0 {
            let parent = (slot - 1) / 2;
            if !self.less(slot, parent) {
                break;
            }
            self.swap(slot, parent);
            slot = parent;
        }
        slot != start
    }

    /// Moves the element down while a child is earlier. Returns true if it moved.
    fn sift_down(&mut self, mut slot: usize) -> bool {
        let start = slot;
        let len = self.order.len();
        loop {
            let left = 2 * slot + 1;
            if left >= len {
                break;
            }
            let right = left + 1;
            let child = if right < len && self.less(right, left) {
                right
            } else {
                left
            };
            if !self.less(child, slot) {
                break;
            }
            self.swap(slot, child);
            slot = child;
        }
        slot != start
    }

    /// Checks the heap property and slot back-references.
    #[cfg(test)]
    pub(crate) fn is_valid(&self) -> bool {
        let slots_ok = self
            .order
            .iter()
            .enumerate()
            .all(|(slot, &id)| self.get(id).is_some_and(|entry| entry.slot == slot));
        let order_ok = (1..self.order.len()).all(|slot| !self.less(slot, (slot - 1) / 2));
        slots_ok && order_ok
    }
}
