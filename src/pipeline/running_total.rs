//! Running-total builder.
//!
//! Places every event of a stream on its identity's cumulative-quantity
//! axis. For the k-th event of an identity (in stream order):
//!
//! ```text
//! cum_qty[k]            = quantity[0] + ... + quantity[k]
//! cum_qty_prev_batch[k] = cum_qty[k] - quantity[k]
//! ```
//!
//! Stream order is trusted to be ascending `order_dim` per identity. Ties are
//! neither merged nor reordered.

use std::collections::HashMap;

use crate::error::{AllocationError, Result};
use crate::types::{Event, RunningTotalEvent, StreamKind};

/// Compute running totals for a stream that may interleave identities
///
/// Output has one row per input event, in the same order.
///
/// # Errors
///
/// [`AllocationError::QuantityOverflow`] if an identity's running total leaves
/// the fixed-point range.
///
/// # Example
///
/// ```
/// use fifo_allocator::pipeline::build_running_totals;
/// use fifo_allocator::types::{Event, StreamKind};
///
/// let events = vec![Event::new("a", 1, 10), Event::new("b", 1, 7), Event::new("a", 2, 5)];
/// let totals = build_running_totals(&events, StreamKind::Inputs).unwrap();
///
/// assert_eq!(totals[2].cum_qty, 15);
/// assert_eq!(totals[2].cum_qty_prev_batch, 10);
/// ```
pub fn build_running_totals(events: &[Event], stream: StreamKind) -> Result<Vec<RunningTotalEvent>> {
    let mut running: HashMap<&str, u64> = HashMap::new();
    let mut totals = Vec::with_capacity(events.len());

    for event in events {
        let acc = running.entry(event.identity.as_str()).or_insert(0);
        let prev = *acc;
        let cum = prev
            .checked_add(event.quantity)
            .ok_or_else(|| AllocationError::QuantityOverflow {
                stream,
                identity: event.identity.clone(),
            })?;
        *acc = cum;

        totals.push(RunningTotalEvent {
            identity: event.identity.clone(),
            order_dim: event.order_dim,
            quantity: event.quantity,
            cum_qty: cum,
            cum_qty_prev_batch: prev,
        });
    }

    Ok(totals)
}
