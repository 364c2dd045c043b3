//! # FIFO Allocator
//!
//! First-in-first-out allocation matching between an inputs stream (quantity
//! entering a pool) and an outputs stream (quantity leaving it), keyed by a
//! shared identity and sequenced by an order dimension.
//!
//! ## Architecture
//!
//! - **Types**: events, derived rows, allocation facts, receipts
//! - **Pipeline**: batch computation (running totals → range matching → split)
//! - **Ledger**: single-pass streaming allocator over the same semantics
//!
//! ## Design Principles
//!
//! 1. **Determinism**: identical streams produce identical facts and digest
//! 2. **No Floating Point**: quantities are fixed-point `u64` (10^8 scaling)
//! 3. **Linear Matching**: interval overlaps found by a two-pointer merge
//! 4. **Explicit Under-Supply**: uncovered demand is reported, never hidden

// ============================================================================
// Module declarations
// ============================================================================

/// Core data types: Event, AllocationFact, AllocationReceipt
pub mod types;

/// Batch pipeline: running totals, range matcher, split calculator
pub mod pipeline;

/// Streaming ledger: slab-backed FIFO lot queues
pub mod ledger;

/// Validation and under-supply settings
pub mod config;

/// Error taxonomy
pub mod error;

/// Subscriber setup and spans
pub mod logging;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use config::{AllocatorConfig, UnderSupplyPolicy, UniquenessMode};
pub use error::{AllocationError, Result};
pub use ledger::StreamingAllocator;
pub use pipeline::{Allocation, FifoAllocator};
pub use types::{AllocationFact, AllocationReceipt, Event, OutStatus, Shortfall, StockDeficit, StreamKind};
