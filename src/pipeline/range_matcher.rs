//! Range matcher.
//!
//! Within one identity each stream tiles the cumulative-quantity axis with
//! contiguous, non-overlapping intervals `(cum_qty_prev_batch, cum_qty]`.
//! An input and an output are paired when their intervals overlap:
//!
//! ```text
//! o.cum_qty > i.cum_qty_prev_batch  &&  i.cum_qty > o.cum_qty_prev_batch
//!
//! inputs   |---- 10 ----|---- 10 ----|---- 10 ----|---- 10 ----|---- 10 ----|
//!          0           10           20           30           40           50
//! output                                              (35 ------- 45]
//!                                                      pairs with (30,40] and (40,50]
//! ```
//!
//! Both interval sequences are sorted, so a two-pointer merge finds every
//! overlap in `O(inputs + outputs + pairs)`.

use crate::types::{MatchedPair, OutStatus, RunningTotalEvent};

/// Overlap test between an input interval and an output interval
#[inline]
pub fn overlaps(input: &RunningTotalEvent, output: &RunningTotalEvent) -> bool {
    output.cum_qty > input.cum_qty_prev_batch && input.cum_qty > output.cum_qty_prev_batch
}

/// Pair the inputs and outputs of a single identity
///
/// Both slices must belong to the same identity and be in stream order.
/// Zero-quantity events are skipped. Pairs come out ordered by output, then
/// by input, which is the order the split calculator expects.
///
/// # Example
///
/// ```
/// use fifo_allocator::pipeline::{build_running_totals, match_partition};
/// use fifo_allocator::types::{Event, OutStatus, StreamKind};
///
/// let inputs = build_running_totals(&[Event::new("a", 1, 10), Event::new("a", 2, 10)], StreamKind::Inputs).unwrap();
/// let outputs = build_running_totals(&[Event::new("a", 3, 15)], StreamKind::Outputs).unwrap();
///
/// let pairs = match_partition(&inputs, &outputs);
/// assert_eq!(pairs.len(), 2);
/// assert_eq!(pairs[0].out_status, OutStatus::Unfinished);
/// assert_eq!(pairs[1].handled_cum_qty, 15);
/// ```
pub fn match_partition(inputs: &[RunningTotalEvent], outputs: &[RunningTotalEvent]) -> Vec<MatchedPair> {
    let inputs: Vec<&RunningTotalEvent> = inputs.iter().filter(|e| e.quantity > 0).collect();
    let mut pairs = Vec::with_capacity(inputs.len().max(outputs.len()));
    let mut start = 0;

    for output in outputs.iter().filter(|e| e.quantity > 0) {
        // Inputs ending at or before this output's start cannot reach any later output either
        while start < inputs.len() && inputs[start].cum_qty <= output.cum_qty_prev_batch {
            start += 1;
        }

        for input in inputs[start..]
            .iter()
            .take_while(|input| input.cum_qty_prev_batch < output.cum_qty)
        {
            if overlaps(input, output) {
                pairs.push(pair(input, output));
            }
        }
    }

    pairs
}

fn pair(input: &RunningTotalEvent, output: &RunningTotalEvent) -> MatchedPair {
    MatchedPair {
        identity: output.identity.clone(),
        in_order_dim: input.order_dim,
        out_order_dim: output.order_dim,
        in_cum_qty: input.cum_qty,
        out_cum_qty: output.cum_qty,
        out_status: OutStatus::between(input.cum_qty, output.cum_qty),
        handled_cum_qty: input.cum_qty.min(output.cum_qty),
    }
}
