//! Split calculator.
//!
//! `handled_cum_qty` is a running marker of how much of an identity's output
//! has been resolved so far. Walking the matched pairs in (output, input)
//! order and differencing consecutive markers recovers the discrete quantity
//! each pair accounts for:
//!
//! ```text
//! pair            handled   previous   qty
//! (in 40, out 35)    35        30        5
//! (in 40, out 45)    40        35        5
//! (in 50, out 45)    45        40        5
//! ```
//!
//! The marker restarts at zero for every identity.

use crate::types::{AllocationFact, MatchedPair};

/// Turn the matched pairs of a single identity into allocation facts
///
/// `pairs` must be ordered as produced by
/// [`match_partition`](crate::pipeline::match_partition).
pub fn split_partition(pairs: &[MatchedPair]) -> Vec<AllocationFact> {
    let mut previous = 0u64;

    pairs
        .iter()
        .map(|pair| {
            debug_assert!(pair.handled_cum_qty >= previous, "handled marker went backwards");
            let qty = pair.handled_cum_qty.saturating_sub(previous);
            previous = pair.handled_cum_qty;

            AllocationFact {
                identity: pair.identity.clone(),
                in_order_dim: pair.in_order_dim,
                out_order_dim: pair.out_order_dim,
                out_status: pair.out_status,
                qty,
                qty_left_from_this_batch: pair.in_cum_qty - pair.handled_cum_qty,
            }
        })
        .collect()
}
