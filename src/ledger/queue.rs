//! FIFO queue of open lots.
//!
//! ```text
//! head (oldest) <-> lot2 <-> lot3 <-> tail (newest)
//! ```
//!
//! - New lots are appended at the tail
//! - Matching consumes lots from the head
//! - Lot data lives in the shared slab; the queue only holds metadata

use slab::Slab;

use crate::ledger::LotNode;

/// Open lots of one identity on one side of the ledger.
#[derive(Debug, Clone, Default)]
pub struct LotQueue {
    /// Sum of `remaining` over all queued lots
    pub total_remaining: u64,

    /// Oldest lot (slab key), matched first
    pub head: Option<usize>,

    /// Newest lot (slab key)
    pub tail: Option<usize>,

    /// Number of queued lots
    pub len: usize,
}

impl LotQueue {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn peek_head(&self) -> Option<usize> {
        self.head
    }

    /// Append a lot that is already stored in `slab`
    ///
    /// # Panics
    ///
    /// Panics if `key` (or the current tail) is not in the slab.
    pub fn push_back(&mut self, key: usize, slab: &mut Slab<LotNode>) {
        let node = &mut slab[key];
        let remaining = node.remaining;
        node.prev = self.tail;
        node.next = None;

        match self.tail {
            Some(tail_key) => slab[tail_key].next = Some(key),
            None => self.head = Some(key),
        }

        self.tail = Some(key);
        self.len += 1;
        self.total_remaining = self.total_remaining.saturating_add(remaining);
    }

    /// Unlink a lot from anywhere in the queue, returning its remaining quantity
    ///
    /// The lot stays in the slab.
    pub fn unlink(&mut self, key: usize, slab: &mut Slab<LotNode>) -> u64 {
        let (prev_key, next_key, remaining) = {
            let node = &slab[key];
            (node.prev, node.next, node.remaining)
        };

        match prev_key {
            Some(prev) => slab[prev].next = next_key,
            None => self.head = next_key,
        }
        match next_key {
            Some(next) => slab[next].prev = prev_key,
            None => self.tail = prev_key,
        }

        let node = &mut slab[key];
        node.prev = None;
        node.next = None;

        self.len -= 1;
        self.total_remaining = self.total_remaining.saturating_sub(remaining);
        remaining
    }

    /// Unlink the head lot and remove it from the slab
    pub fn pop_front(&mut self, slab: &mut Slab<LotNode>) -> Option<LotNode> {
        let key = self.head?;
        self.unlink(key, slab);
        Some(slab.remove(key))
    }

    /// Record quantity matched out of a queued lot
    pub fn reduce_quantity(&mut self, matched: u64) {
        self.total_remaining = self.total_remaining.saturating_sub(matched);
    }

    /// Slab keys from head to tail
    pub fn keys<'a>(&self, slab: &'a Slab<LotNode>) -> impl Iterator<Item = usize> + 'a {
        std::iter::successors(self.head, move |&key| slab.get(key).and_then(|n| n.next))
    }
}
