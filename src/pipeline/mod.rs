//! Batch allocation pipeline.
//!
//! ## Stages
//!
//! 1. **Validate**: uniqueness / ordering preconditions ([`validate_stream`])
//! 2. **Running totals**: cumulative position of every event ([`build_running_totals`])
//! 3. **Range matching**: overlapping (input, output) intervals ([`match_partition`])
//! 4. **Split**: discrete quantity per pair ([`split_partition`])
//! 5. **Under-supply**: uncovered output quantity ([`find_shortfalls`]) and output
//!    served before its supply arrived ([`find_stock_deficits`]), then the policy
//!
//! Identities are independent. They are processed one after another in
//! ascending identity order so the fact table (and its digest) is identical
//! on every run.
//!
//! ## Example
//!
//! ```
//! use fifo_allocator::config::AllocatorConfig;
//! use fifo_allocator::pipeline::FifoAllocator;
//! use fifo_allocator::types::{Event, OutStatus};
//!
//! let inputs = vec![Event::new("sku", 1, 10)];
//! let outputs = vec![Event::new("sku", 2, 4), Event::new("sku", 3, 6)];
//!
//! let allocation = FifoAllocator::new(AllocatorConfig::default())
//!     .allocate(&inputs, &outputs)
//!     .unwrap();
//!
//! assert_eq!(allocation.facts.len(), 2);
//! assert_eq!(allocation.facts[1].qty, 6);
//! assert_eq!(allocation.facts[1].out_status, OutStatus::Finished);
//! ```

pub mod range_matcher;
pub mod running_total;
pub mod shortfall;
pub mod split;
pub mod validate;

pub use range_matcher::{match_partition, overlaps};
pub use running_total::build_running_totals;
pub use shortfall::{enforce_policy, find_shortfalls, find_stock_deficits};
pub use split::split_partition;
pub use validate::validate_stream;

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::config::AllocatorConfig;
use crate::error::Result;
use crate::logging::allocation_span;
use crate::types::{
    AllocationFact, AllocationReceipt, Event, RunningTotalEvent, Shortfall, StockDeficit, StreamKind,
};

/// Result of one allocation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    /// Facts ordered by (identity, output order, input order)
    pub facts: Vec<AllocationFact>,
    /// Outputs not fully covered by supply, in the same order
    pub shortfalls: Vec<Shortfall>,
    /// Outputs that drew on later supply, in the same order
    pub deficits: Vec<StockDeficit>,
    pub receipt: AllocationReceipt,
}

impl Allocation {
    /// Total allocated quantity for one output event
    pub fn allocated_to_output(&self, identity: &str, out_order_dim: i64) -> u64 {
        self.facts
            .iter()
            .filter(|f| f.identity == identity && f.out_order_dim == out_order_dim)
            .map(|f| f.qty)
            .sum()
    }

    /// Total quantity drawn from one input event
    pub fn drawn_from_input(&self, identity: &str, in_order_dim: i64) -> u64 {
        self.facts
            .iter()
            .filter(|f| f.identity == identity && f.in_order_dim == in_order_dim)
            .map(|f| f.qty)
            .sum()
    }
}

#[derive(Default)]
struct Partition {
    inputs: Vec<RunningTotalEvent>,
    outputs: Vec<RunningTotalEvent>,
}

/// Batch FIFO allocator.
#[derive(Debug, Clone, Default)]
pub struct FifoAllocator {
    config: AllocatorConfig,
}

impl FifoAllocator {
    pub fn new(config: AllocatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AllocatorConfig {
        &self.config
    }

    /// Allocate `outputs` against `inputs` in FIFO order
    ///
    /// Within each identity both streams are expected in ascending
    /// `order_dim`; enable `strict_ordering` to have that checked.
    ///
    /// # Errors
    ///
    /// Any precondition violation enabled in the configuration, a cumulative
    /// overflow, or under-supply / negative stock under [`UnderSupplyPolicy::Fail`](crate::config::UnderSupplyPolicy::Fail).
    pub fn allocate(&self, inputs: &[Event], outputs: &[Event]) -> Result<Allocation> {
        let span = allocation_span("batch", inputs.len(), outputs.len());
        let _guard = span.enter();

        validate_stream(inputs, StreamKind::Inputs, &self.config)?;
        validate_stream(outputs, StreamKind::Outputs, &self.config)?;

        let input_totals = build_running_totals(inputs, StreamKind::Inputs)?;
        let output_totals = build_running_totals(outputs, StreamKind::Outputs)?;

        let mut partitions: BTreeMap<String, Partition> = BTreeMap::new();
        for event in input_totals {
            partitions.entry(event.identity.clone()).or_default().inputs.push(event);
        }
        for event in output_totals {
            partitions.entry(event.identity.clone()).or_default().outputs.push(event);
        }
        debug!(identities = partitions.len(), "partitioned streams");

        let mut facts = Vec::new();
        let mut shortfalls = Vec::new();
        let mut deficits = Vec::new();
        let mut pair_count = 0usize;

        for (identity, partition) in &partitions {
            let pairs = match_partition(&partition.inputs, &partition.outputs);
            pair_count += pairs.len();

            let supply = partition.inputs.last().map_or(0, |e| e.cum_qty);
            let missing = find_shortfalls(supply, &partition.outputs);
            let early = find_stock_deficits(&partition.inputs, &partition.outputs);
            debug!(
                identity = %identity,
                pairs = pairs.len(),
                shortfalls = missing.len(),
                deficits = early.len(),
                "allocated identity"
            );

            facts.extend(split_partition(&pairs));
            shortfalls.extend(missing);
            deficits.extend(early);
        }

        enforce_policy(&shortfalls, &deficits, self.config.under_supply)?;

        let unmatched = shortfalls.iter().fold(0u64, |acc, s| acc.saturating_add(s.unmatched));
        let receipt = AllocationReceipt::from_facts(
            &facts,
            partitions.len() as u64,
            inputs.len() as u64,
            outputs.len() as u64,
            unmatched,
        );

        info!(
            pairs = pair_count,
            facts = receipt.facts,
            allocated_qty = receipt.allocated_qty,
            unmatched_qty = receipt.unmatched_qty,
            digest = %receipt.digest_hex(),
            "allocation complete"
        );

        Ok(Allocation {
            facts,
            shortfalls,
            deficits,
            receipt,
        })
    }
}
