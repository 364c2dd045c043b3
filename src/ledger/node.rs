//! Lot node for slab-based storage.
//!
//! A lot is one event that is still open in the streaming ledger: an input
//! batch with quantity left to hand out, or an output with demand left to
//! cover. Lots of one identity and one stream form a doubly-linked FIFO
//! queue through their `next` / `prev` slab keys.

/// Lot stored in the ledger slab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LotNode {
    /// Sequencing value of the originating event
    pub order_dim: i64,

    /// Original event quantity (fixed-point)
    pub quantity: u64,

    /// Quantity not yet matched (fixed-point)
    pub remaining: u64,

    /// End of this lot's interval on its stream's cumulative axis
    pub cum_qty: u64,

    /// Demand lots: quantity served by inputs with a later `order_dim`
    pub backdated: u64,

    /// Next (newer) lot in the queue
    pub next: Option<usize>,

    /// Previous (older) lot in the queue
    pub prev: Option<usize>,
}

impl LotNode {
    /// Create a new, unlinked lot with nothing matched yet
    ///
    /// ```
    /// use fifo_allocator::ledger::LotNode;
    ///
    /// let lot = LotNode::new(3, 1_000, 5_000);
    /// assert_eq!(lot.remaining, 1_000);
    /// assert!(lot.is_unlinked());
    /// ```
    #[inline]
    pub fn new(order_dim: i64, quantity: u64, cum_qty: u64) -> Self {
        Self {
            order_dim,
            quantity,
            remaining: quantity,
            cum_qty,
            backdated: 0,
            next: None,
            prev: None,
        }
    }

    #[inline]
    pub fn is_unlinked(&self) -> bool {
        self.next.is_none() && self.prev.is_none()
    }

    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    /// Consume up to `qty` from this lot, returning what was actually taken
    #[inline]
    pub fn take(&mut self, qty: u64) -> u64 {
        let taken = qty.min(self.remaining);
        self.remaining -= taken;
        taken
    }
}
