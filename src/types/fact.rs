//! Derived rows of the allocation pipeline.
//!
//! ```text
//! Event ──► RunningTotalEvent ──► MatchedPair ──► AllocationFact
//!            (builder)            (matcher)       (split calculator)
//! ```
//!
//! All quantities are fixed-point (scaled by 10^8).

use std::fmt;

use serde::{Deserialize, Serialize};

/// An event annotated with its position in cumulative-quantity space.
///
/// The event occupies the half-open interval `(cum_qty_prev_batch, cum_qty]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunningTotalEvent {
    pub identity: String,
    pub order_dim: i64,
    pub quantity: u64,
    /// Running total up to and including this event
    pub cum_qty: u64,
    /// Running total immediately before this event
    pub cum_qty_prev_batch: u64,
}

/// Whether an output still needs supply after a given input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutStatus {
    /// The input ran out before the output was covered
    #[serde(rename = "Unfinished out")]
    Unfinished,
    /// The output is covered up to its cumulative end
    #[serde(rename = "Finished out")]
    Finished,
}

impl OutStatus {
    /// Status of an output whose interval ends at `out_cum` when matched
    /// against an input ending at `in_cum`
    #[inline]
    pub fn between(in_cum: u64, out_cum: u64) -> Self {
        if in_cum < out_cum {
            OutStatus::Unfinished
        } else {
            OutStatus::Finished
        }
    }

    pub(crate) fn to_u8(self) -> u8 {
        match self {
            OutStatus::Unfinished => 0,
            OutStatus::Finished => 1,
        }
    }
}

impl fmt::Display for OutStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutStatus::Unfinished => f.write_str("Unfinished out"),
            OutStatus::Finished => f.write_str("Finished out"),
        }
    }
}

/// An (input, output) pair whose cumulative intervals overlap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedPair {
    pub identity: String,
    pub in_order_dim: i64,
    pub out_order_dim: i64,
    pub in_cum_qty: u64,
    pub out_cum_qty: u64,
    pub out_status: OutStatus,
    /// `min(in_cum_qty, out_cum_qty)`: total resolved through this pair
    pub handled_cum_qty: u64,
}

/// One resolved (input, output) allocation.
///
/// ## Example
///
/// ```
/// use fifo_allocator::types::{AllocationFact, OutStatus};
///
/// // 5 units of the output at t=9 were served by the batch received at t=4
/// let fact = AllocationFact {
///     identity: "sku-1".to_string(),
///     in_order_dim: 4,
///     out_order_dim: 9,
///     out_status: OutStatus::Unfinished,
///     qty: 500_000_000,
///     qty_left_from_this_batch: 0,
/// };
/// assert_eq!(fact.out_status.to_string(), "Unfinished out");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AllocationFact {
    #[serde(rename = "unique_combination")]
    pub identity: String,
    pub in_order_dim: i64,
    pub out_order_dim: i64,
    pub out_status: OutStatus,
    /// Quantity of the output served by this input
    pub qty: u64,
    /// Input quantity still unconsumed after this pair (diagnostic only)
    pub qty_left_from_this_batch: u64,
}

impl AllocationFact {
    /// Append the canonical byte encoding used for digests
    ///
    /// Layout: identity length (u64 LE), identity bytes, then every numeric
    /// field little-endian in declaration order, status as one byte.
    pub fn encode_canonical(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&(self.identity.len() as u64).to_le_bytes());
        buf.extend_from_slice(self.identity.as_bytes());
        buf.extend_from_slice(&self.in_order_dim.to_le_bytes());
        buf.extend_from_slice(&self.out_order_dim.to_le_bytes());
        buf.push(self.out_status.to_u8());
        buf.extend_from_slice(&self.qty.to_le_bytes());
        buf.extend_from_slice(&self.qty_left_from_this_batch.to_le_bytes());
    }
}

/// Output quantity that cumulative supply could not cover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortfall {
    #[serde(rename = "unique_combination")]
    pub identity: String,
    pub out_order_dim: i64,
    /// Original quantity of the output event
    pub requested: u64,
    /// Part of `requested` with no matching supply
    pub unmatched: u64,
}

/// Output quantity served only by inputs sequenced after the output.
///
/// The stock on hand at `out_order_dim` (inputs with `order_dim <=
/// out_order_dim`) was short by `deficit`; the FIFO join still covers it
/// from later supply, so the facts are unaffected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockDeficit {
    #[serde(rename = "unique_combination")]
    pub identity: String,
    pub out_order_dim: i64,
    /// Original quantity of the output event
    pub requested: u64,
    /// Part of `requested` drawn from inputs with a later `order_dim`
    pub deficit: u64,
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn fact(qty: u64) -> AllocationFact {
        AllocationFact {
            identity: "sku".to_string(),
            in_order_dim: 1,
            out_order_dim: 2,
            out_status: OutStatus::Finished,
            qty,
            qty_left_from_this_batch: 0,
        }
    }

    #[test]
    fn test_out_status_between() {
        assert_eq!(OutStatus::between(10, 45), OutStatus::Unfinished);
        assert_eq!(OutStatus::between(45, 45), OutStatus::Finished);
        assert_eq!(OutStatus::between(50, 45), OutStatus::Finished);
    }

    #[test]
    fn test_out_status_labels() {
        assert_eq!(OutStatus::Unfinished.to_string(), "Unfinished out");
        assert_eq!(OutStatus::Finished.to_string(), "Finished out");
    }

    #[test]
    fn test_canonical_encoding_layout() {
        let mut buf = Vec::new();
        fact(7).encode_canonical(&mut buf);

        // 8 (len) + 3 (identity) + 8 + 8 + 1 + 8 + 8
        assert_eq!(buf.len(), 44);
        assert_eq!(&buf[8..11], b"sku");
    }

    #[test]
    fn test_canonical_encoding_distinguishes_qty() {
        let mut a = Vec::new();
        let mut b = Vec::new();
        fact(7).encode_canonical(&mut a);
        fact(8).encode_canonical(&mut b);

        assert_ne!(a, b);
    }
}
