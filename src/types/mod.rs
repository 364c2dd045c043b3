//! Core data types for the FIFO allocator
//!
//! All quantities use fixed-point representation (scaled by 10^8).
//!
//! ## Types
//!
//! - [`Event`]: A row of the inputs or outputs stream
//! - [`RawEvent`]: An unvalidated upstream row
//! - [`RunningTotalEvent`]: An event placed in cumulative-quantity space
//! - [`MatchedPair`]: Overlapping (input, output) intervals
//! - [`AllocationFact`]: The quantity of one output served by one input
//! - [`Shortfall`]: Output quantity left without supply
//! - [`StockDeficit`]: Output quantity served before its supply arrived
//! - [`AllocationReceipt`]: Run summary with a fact-table digest

mod event;
mod fact;
mod receipt;
pub mod quantity;

pub use event::{ingest, Event, RawEvent, RawValue, StreamKind};
pub use fact::{AllocationFact, MatchedPair, OutStatus, RunningTotalEvent, Shortfall, StockDeficit};
pub use receipt::AllocationReceipt;
