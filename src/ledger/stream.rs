//! Streaming FIFO allocator.
//!
//! ## Architecture
//!
//! - **Slab**: storage for every open lot, O(1) insert and remove
//! - **BTreeMap**: one [`IdentityBook`] per identity, iterated in key order
//! - **LotQueue**: per book, a supply queue (open inputs) and a demand queue
//!   (open outputs)
//!
//! Each pushed event is appended to its queue and the two heads are matched
//! until one side runs dry. Both heads always sit at the same point of the
//! identity's cumulative axis, so every step emits exactly the overlap of
//! the two head intervals: the same fact the batch pipeline derives from
//! running totals.
//!
//! ## Example
//!
//! ```
//! use fifo_allocator::config::AllocatorConfig;
//! use fifo_allocator::ledger::StreamingAllocator;
//! use fifo_allocator::types::Event;
//!
//! let mut ledger = StreamingAllocator::new(AllocatorConfig::default());
//!
//! assert!(ledger.push_input(Event::new("sku", 1, 10)).unwrap().is_empty());
//! let facts = ledger.push_output(Event::new("sku", 2, 4)).unwrap();
//!
//! assert_eq!(facts.len(), 1);
//! assert_eq!(facts[0].qty, 4);
//! assert_eq!(ledger.on_hand("sku"), 6);
//! ```

use std::collections::BTreeMap;

use slab::Slab;
use tracing::{debug, trace};

use crate::config::{AllocatorConfig, UniquenessMode};
use crate::error::{AllocationError, Result};
use crate::ledger::{LotNode, LotQueue};
use crate::pipeline::enforce_policy;
use crate::types::{AllocationFact, Event, OutStatus, Shortfall, StockDeficit, StreamKind};

/// Ledger state of one identity.
///
/// A book outlives its lots. Once both queues are empty it still holds the
/// running totals and last `order_dim` of each stream, which place and
/// validate every later event of the identity, so books are never pruned.
/// Memory grows with the number of distinct identities, not with events.
#[derive(Debug, Clone, Default)]
pub struct IdentityBook {
    /// Open input lots
    pub supply: LotQueue,
    /// Open output lots
    pub demand: LotQueue,
    /// Running total of the inputs stream
    pub input_cum: u64,
    /// Running total of the outputs stream
    pub output_cum: u64,
    last_input: Option<i64>,
    last_output: Option<i64>,
    /// Deficits of demand lots that have been fully served
    closed_deficits: Vec<StockDeficit>,
}

impl IdentityBook {
    fn cursor(&mut self, stream: StreamKind) -> (&mut u64, &mut Option<i64>) {
        match stream {
            StreamKind::Inputs => (&mut self.input_cum, &mut self.last_input),
            StreamKind::Outputs => (&mut self.output_cum, &mut self.last_output),
        }
    }

    fn queue_mut(&mut self, stream: StreamKind) -> &mut LotQueue {
        match stream {
            StreamKind::Inputs => &mut self.supply,
            StreamKind::Outputs => &mut self.demand,
        }
    }
}

/// Single-pass FIFO allocator over interleaved input and output events.
///
/// Arrival order is the FIFO order, so within an identity each stream's
/// `order_dim` must never decrease. Equal values are rejected under strict
/// uniqueness.
#[derive(Debug)]
pub struct StreamingAllocator {
    config: AllocatorConfig,
    lots: Slab<LotNode>,
    books: BTreeMap<String, IdentityBook>,
    input_events: u64,
    output_events: u64,
    facts_emitted: u64,
}

impl StreamingAllocator {
    pub fn new(config: AllocatorConfig) -> Self {
        Self::with_capacity(config, 0)
    }

    /// Create a ledger with room for `lot_capacity` open lots
    pub fn with_capacity(config: AllocatorConfig, lot_capacity: usize) -> Self {
        Self {
            config,
            lots: Slab::with_capacity(lot_capacity),
            books: BTreeMap::new(),
            input_events: 0,
            output_events: 0,
            facts_emitted: 0,
        }
    }

    // ========================================================================
    // Event intake
    // ========================================================================

    /// Add supply and return the facts it resolves
    pub fn push_input(&mut self, event: Event) -> Result<Vec<AllocationFact>> {
        self.push(event, StreamKind::Inputs)
    }

    /// Add demand and return the facts it resolves
    pub fn push_output(&mut self, event: Event) -> Result<Vec<AllocationFact>> {
        self.push(event, StreamKind::Outputs)
    }

    /// Add an event of either stream and return the facts it resolves
    ///
    /// # Errors
    ///
    /// `NonMonotonicInput` for a decreasing `order_dim`, `UniquenessViolation`
    /// for a repeated one (strict uniqueness only), `QuantityOverflow` if the
    /// stream's running total overflows. A rejected event leaves the ledger
    /// unchanged.
    pub fn push(&mut self, event: Event, stream: StreamKind) -> Result<Vec<AllocationFact>> {
        let book = self.books.entry(event.identity.clone()).or_default();

        let strict_unique = self.config.uniqueness == UniquenessMode::Strict;
        let (cum, last) = book.cursor(stream);

        if let Some(previous) = *last {
            if event.order_dim < previous {
                return Err(AllocationError::NonMonotonicInput {
                    stream,
                    identity: event.identity,
                    previous,
                    current: event.order_dim,
                });
            }
            if event.order_dim == previous && strict_unique {
                return Err(AllocationError::UniquenessViolation {
                    stream,
                    identity: event.identity,
                    order_dim: event.order_dim,
                });
            }
        }

        let next_cum = cum
            .checked_add(event.quantity)
            .ok_or_else(|| AllocationError::QuantityOverflow {
                stream,
                identity: event.identity.clone(),
            })?;
        *cum = next_cum;
        *last = Some(event.order_dim);

        match stream {
            StreamKind::Inputs => self.input_events += 1,
            StreamKind::Outputs => self.output_events += 1,
        }

        if event.is_empty() {
            trace!(identity = %event.identity, order_dim = event.order_dim, "skipping empty event");
            return Ok(Vec::new());
        }

        let key = self.lots.insert(LotNode::new(event.order_dim, event.quantity, next_cum));
        book.queue_mut(stream).push_back(key, &mut self.lots);

        let facts = drain(&event.identity, book, &mut self.lots);
        self.facts_emitted += facts.len() as u64;
        Ok(facts)
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    /// Unallocated supply of an identity
    pub fn on_hand(&self, identity: &str) -> u64 {
        self.books.get(identity).map_or(0, |b| b.supply.total_remaining)
    }

    /// Uncovered demand of an identity
    pub fn outstanding(&self, identity: &str) -> u64 {
        self.books.get(identity).map_or(0, |b| b.demand.total_remaining)
    }

    pub fn book(&self, identity: &str) -> Option<&IdentityBook> {
        self.books.get(identity)
    }

    /// Number of lots (supply and demand) still open
    #[inline]
    pub fn open_lots(&self) -> usize {
        self.lots.len()
    }

    #[inline]
    pub fn input_events(&self) -> u64 {
        self.input_events
    }

    #[inline]
    pub fn output_events(&self) -> u64 {
        self.output_events
    }

    #[inline]
    pub fn facts_emitted(&self) -> u64 {
        self.facts_emitted
    }

    /// Outstanding demand as shortfalls, by identity then arrival
    pub fn shortfalls(&self) -> Vec<Shortfall> {
        let mut shortfalls = Vec::new();
        for (identity, book) in &self.books {
            for key in book.demand.keys(&self.lots) {
                let lot = &self.lots[key];
                shortfalls.push(Shortfall {
                    identity: identity.clone(),
                    out_order_dim: lot.order_dim,
                    requested: lot.quantity,
                    unmatched: lot.remaining,
                });
            }
        }
        shortfalls
    }

    /// Outputs served by inputs with a later `order_dim`, by identity then arrival
    ///
    /// Includes demand still open that has already drawn on later supply.
    pub fn deficits(&self) -> Vec<StockDeficit> {
        let mut deficits = Vec::new();
        for (identity, book) in &self.books {
            deficits.extend(book.closed_deficits.iter().cloned());
            for key in book.demand.keys(&self.lots) {
                let lot = &self.lots[key];
                if lot.backdated > 0 {
                    deficits.push(deficit(identity, lot));
                }
            }
        }
        deficits
    }

    /// Close the stream: apply the under-supply policy to outstanding demand
    /// and to negative-stock deficits
    ///
    /// # Errors
    ///
    /// `UnderSupply` or `NegativeStock` under
    /// [`UnderSupplyPolicy::Fail`](crate::config::UnderSupplyPolicy::Fail).
    pub fn finish(&self) -> Result<Vec<Shortfall>> {
        let shortfalls = self.shortfalls();
        let deficits = self.deficits();
        enforce_policy(&shortfalls, &deficits, self.config.under_supply)?;
        debug!(
            inputs = self.input_events,
            outputs = self.output_events,
            facts = self.facts_emitted,
            shortfalls = shortfalls.len(),
            deficits = deficits.len(),
            "stream finished"
        );
        Ok(shortfalls)
    }
}

/// Match the supply and demand heads of one book until either side is empty
fn drain(identity: &str, book: &mut IdentityBook, lots: &mut Slab<LotNode>) -> Vec<AllocationFact> {
    let mut facts = Vec::new();

    while let (Some(in_key), Some(out_key)) = (book.supply.peek_head(), book.demand.peek_head()) {
        let (in_order_dim, in_cum, in_remaining) = {
            let lot = &lots[in_key];
            (lot.order_dim, lot.cum_qty, lot.remaining)
        };
        let (out_order_dim, out_cum, out_remaining) = {
            let lot = &lots[out_key];
            (lot.order_dim, lot.cum_qty, lot.remaining)
        };

        let qty = in_remaining.min(out_remaining);
        lots[in_key].take(qty);
        lots[out_key].take(qty);
        if in_order_dim > out_order_dim {
            lots[out_key].backdated += qty;
        }
        book.supply.reduce_quantity(qty);
        book.demand.reduce_quantity(qty);

        facts.push(AllocationFact {
            identity: identity.to_string(),
            in_order_dim,
            out_order_dim,
            out_status: OutStatus::between(in_cum, out_cum),
            qty,
            qty_left_from_this_batch: in_cum - in_cum.min(out_cum),
        });

        if lots[in_key].is_exhausted() {
            book.supply.pop_front(lots);
        }
        if lots[out_key].is_exhausted() {
            if let Some(lot) = book.demand.pop_front(lots) {
                if lot.backdated > 0 {
                    book.closed_deficits.push(deficit(identity, &lot));
                }
            }
        }
    }

    facts
}

fn deficit(identity: &str, lot: &LotNode) -> StockDeficit {
    StockDeficit {
        identity: identity.to_string(),
        out_order_dim: lot.order_dim,
        requested: lot.quantity,
        deficit: lot.backdated,
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UnderSupplyPolicy;

    fn ledger() -> StreamingAllocator {
        StreamingAllocator::with_capacity(AllocatorConfig::default(), 16)
    }

    #[test]
    fn test_outputs_wait_for_supply() {
        let mut ledger = ledger();

        assert!(ledger.push_output(Event::new("a", 1, 5)).unwrap().is_empty());
        assert_eq!(ledger.outstanding("a"), 5);

        let facts = ledger.push_input(Event::new("a", 1, 8)).unwrap();
        assert_eq!(facts.len(), 1);
        assert_eq!(facts[0].qty, 5);
        assert_eq!(facts[0].out_status, OutStatus::Finished);
        assert_eq!(facts[0].qty_left_from_this_batch, 3);
        assert_eq!(ledger.on_hand("a"), 3);
        assert_eq!(ledger.outstanding("a"), 0);
        assert_eq!(ledger.open_lots(), 1);
    }

    #[test]
    fn test_output_split_across_batches() {
        let mut ledger = ledger();
        for t in 1..=5 {
            ledger.push_input(Event::new("a", t, 10)).unwrap();
        }
        ledger.push_output(Event::new("a", 6, 35)).unwrap();

        let facts = ledger.push_output(Event::new("a", 7, 10)).unwrap();

        let rows: Vec<_> = facts.iter().map(|f| (f.in_order_dim, f.out_status, f.qty)).collect();
        assert_eq!(
            rows,
            vec![(4, OutStatus::Unfinished, 5), (5, OutStatus::Finished, 5)]
        );
        assert_eq!(ledger.on_hand("a"), 5);
    }

    #[test]
    fn test_shortfalls_and_finish() {
        let mut ledger = ledger();
        for t in 1..=4 {
            ledger.push_input(Event::new("a", t, 10)).unwrap();
        }
        let facts = ledger.push_output(Event::new("a", 5, 45)).unwrap();

        assert_eq!(facts.len(), 4);
        assert!(facts.iter().all(|f| f.out_status == OutStatus::Unfinished));
        assert_eq!(ledger.shortfalls().len(), 1);
        assert_eq!(ledger.shortfalls()[0].unmatched, 5);
        assert_eq!(ledger.shortfalls()[0].requested, 45);
        assert!(ledger.finish().is_ok());

        let failing = StreamingAllocator {
            config: AllocatorConfig::default().with_under_supply(UnderSupplyPolicy::Fail),
            ..ledger
        };
        assert!(matches!(failing.finish(), Err(AllocationError::UnderSupply { unmatched: 5, .. })));
    }

    #[test]
    fn test_decreasing_order_dim_rejected() {
        let mut ledger = ledger();
        ledger.push_input(Event::new("a", 5, 1)).unwrap();

        let err = ledger.push_input(Event::new("a", 4, 1)).unwrap_err();
        assert!(matches!(err, AllocationError::NonMonotonicInput { previous: 5, current: 4, .. }));

        // Streams are tracked separately
        assert!(ledger.push_output(Event::new("a", 1, 1)).is_ok());
        assert_eq!(ledger.input_events(), 1);
    }

    #[test]
    fn test_repeated_order_dim() {
        let mut strict = ledger();
        strict.push_input(Event::new("a", 1, 1)).unwrap();
        assert!(matches!(
            strict.push_input(Event::new("a", 1, 1)),
            Err(AllocationError::UniquenessViolation { .. })
        ));
        assert_eq!(strict.on_hand("a"), 1);

        let mut permissive = StreamingAllocator::new(
            AllocatorConfig::default().with_uniqueness(UniquenessMode::Permissive),
        );
        permissive.push_input(Event::new("a", 1, 1)).unwrap();
        permissive.push_input(Event::new("a", 1, 1)).unwrap();
        assert_eq!(permissive.on_hand("a"), 2);
    }

    #[test]
    fn test_empty_events_are_noops() {
        let mut ledger = ledger();
        ledger.push_input(Event::new("a", 1, 0)).unwrap();
        ledger.push_output(Event::new("a", 1, 0)).unwrap();

        assert_eq!(ledger.open_lots(), 0);
        assert_eq!(ledger.facts_emitted(), 0);
        assert_eq!(ledger.input_events(), 1);
        assert!(ledger.shortfalls().is_empty());
    }

    #[test]
    fn test_output_before_receipt_is_a_deficit() {
        let mut ledger = ledger();
        ledger.push_output(Event::new("a", 1, 4)).unwrap();
        let facts = ledger.push_input(Event::new("a", 5, 10)).unwrap();

        assert_eq!(facts.len(), 1);
        assert_eq!((facts[0].in_order_dim, facts[0].qty), (5, 4));
        assert!(ledger.shortfalls().is_empty());
        assert_eq!(
            ledger.deficits(),
            vec![StockDeficit {
                identity: "a".to_string(),
                out_order_dim: 1,
                requested: 4,
                deficit: 4,
            }]
        );
        assert!(ledger.finish().is_ok());

        let failing = StreamingAllocator {
            config: AllocatorConfig::default().with_under_supply(UnderSupplyPolicy::Fail),
            ..ledger
        };
        assert!(matches!(
            failing.finish(),
            Err(AllocationError::NegativeStock { order_dim: 1, deficit: 4, .. })
        ));
    }

    #[test]
    fn test_open_demand_reports_partial_deficit() {
        let mut ledger = ledger();
        ledger.push_input(Event::new("a", 1, 6)).unwrap();
        ledger.push_output(Event::new("a", 3, 20)).unwrap();
        ledger.push_input(Event::new("a", 7, 10)).unwrap();

        // 6 on hand at t=3, 10 from t=7, 4 never supplied
        assert_eq!(ledger.deficits()[0].deficit, 10);
        assert_eq!(ledger.shortfalls()[0].unmatched, 4);
    }

    #[test]
    fn test_drained_book_is_kept() {
        let mut ledger = ledger();
        ledger.push_input(Event::new("a", 1, 5)).unwrap();
        ledger.push_output(Event::new("a", 2, 5)).unwrap();

        assert_eq!(ledger.open_lots(), 0);
        let book = ledger.book("a").unwrap();
        assert!(book.supply.is_empty() && book.demand.is_empty());
        assert_eq!((book.input_cum, book.output_cum), (5, 5));

        // The retained cursor still rejects an out-of-order input
        assert!(matches!(
            ledger.push_input(Event::new("a", 0, 1)),
            Err(AllocationError::NonMonotonicInput { previous: 1, current: 0, .. })
        ));
    }

    #[test]
    fn test_identities_do_not_share_supply() {
        let mut ledger = ledger();
        ledger.push_input(Event::new("a", 1, 10)).unwrap();

        assert!(ledger.push_output(Event::new("b", 2, 3)).unwrap().is_empty());
        assert_eq!(ledger.on_hand("a"), 10);
        assert_eq!(ledger.outstanding("b"), 3);
        assert!(ledger.book("a").is_some());
        assert!(ledger.book("zzz").is_none());
    }
}
