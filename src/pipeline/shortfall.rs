//! Under-supply detection and policy enforcement.
//!
//! Two conditions are measured per output event:
//!
//! - **Shortfall**: the output's cumulative interval reaches past the
//!   identity's total supply. The matcher produces no pair for the uncovered
//!   part.
//! - **Stock deficit**: the output exceeds the stock on hand at its own
//!   `order_dim` (inputs with `order_dim <= out_order_dim`) and is partly
//!   covered by later inputs. Facts are unaffected; stock went negative.
//!
//! The two quantities never overlap. Both go through the configured
//! [`UnderSupplyPolicy`].

use tracing::{debug, warn};

use crate::config::UnderSupplyPolicy;
use crate::error::{AllocationError, Result};
use crate::types::{RunningTotalEvent, Shortfall, StockDeficit};

/// Measure uncovered output quantity for a single identity
///
/// `supply` is the identity's total input quantity (the last input
/// `cum_qty`, or zero without inputs).
pub fn find_shortfalls(supply: u64, outputs: &[RunningTotalEvent]) -> Vec<Shortfall> {
    outputs
        .iter()
        .filter(|o| o.quantity > 0 && o.cum_qty > supply)
        .map(|o| Shortfall {
            identity: o.identity.clone(),
            out_order_dim: o.order_dim,
            requested: o.quantity,
            unmatched: o.cum_qty - supply.max(o.cum_qty_prev_batch),
        })
        .collect()
}

/// Measure output quantity served by inputs sequenced after the output
///
/// Both slices belong to one identity and are in ascending `order_dim`.
/// An input sharing the output's `order_dim` counts as on hand.
///
/// ```
/// use fifo_allocator::pipeline::{build_running_totals, find_stock_deficits};
/// use fifo_allocator::types::{Event, StreamKind};
///
/// let inputs = build_running_totals(&[Event::new("a", 5, 10)], StreamKind::Inputs).unwrap();
/// let outputs = build_running_totals(&[Event::new("a", 1, 4)], StreamKind::Outputs).unwrap();
///
/// let deficits = find_stock_deficits(&inputs, &outputs);
/// assert_eq!(deficits[0].deficit, 4);
/// ```
pub fn find_stock_deficits(inputs: &[RunningTotalEvent], outputs: &[RunningTotalEvent]) -> Vec<StockDeficit> {
    let supply = inputs.last().map_or(0, |e| e.cum_qty);
    let mut on_hand = 0u64;
    let mut next = 0;
    let mut deficits = Vec::new();

    for output in outputs.iter().filter(|o| o.quantity > 0) {
        while next < inputs.len() && inputs[next].order_dim <= output.order_dim {
            on_hand = inputs[next].cum_qty;
            next += 1;
        }

        // Covered part of the output that lies beyond the stock on hand
        let covered_end = output.cum_qty.min(supply);
        let start = output.cum_qty_prev_batch.max(on_hand);
        if covered_end > start {
            deficits.push(StockDeficit {
                identity: output.identity.clone(),
                out_order_dim: output.order_dim,
                requested: output.quantity,
                deficit: covered_end - start,
            });
        }
    }

    deficits
}

/// Apply the under-supply policy to a run's shortfalls and stock deficits
///
/// # Errors
///
/// Under [`UnderSupplyPolicy::Fail`], [`AllocationError::UnderSupply`] for
/// the first shortfall, otherwise [`AllocationError::NegativeStock`] for the
/// first deficit.
pub fn enforce_policy(
    shortfalls: &[Shortfall],
    deficits: &[StockDeficit],
    policy: UnderSupplyPolicy,
) -> Result<()> {
    if shortfalls.is_empty() && deficits.is_empty() {
        return Ok(());
    }

    match policy {
        UnderSupplyPolicy::Fail => {
            if let Some(first) = shortfalls.first() {
                return Err(AllocationError::UnderSupply {
                    identity: first.identity.clone(),
                    order_dim: first.out_order_dim,
                    unmatched: first.unmatched,
                });
            }
            match deficits.first() {
                Some(first) => Err(AllocationError::NegativeStock {
                    identity: first.identity.clone(),
                    order_dim: first.out_order_dim,
                    deficit: first.deficit,
                }),
                None => Ok(()),
            }
        }
        UnderSupplyPolicy::Warn => {
            for shortfall in shortfalls {
                warn!(
                    identity = %shortfall.identity,
                    out_order_dim = shortfall.out_order_dim,
                    requested = shortfall.requested,
                    unmatched = shortfall.unmatched,
                    "output exceeds cumulative supply"
                );
            }
            for deficit in deficits {
                warn!(
                    identity = %deficit.identity,
                    out_order_dim = deficit.out_order_dim,
                    requested = deficit.requested,
                    deficit = deficit.deficit,
                    "output exceeds stock on hand"
                );
            }
            Ok(())
        }
        UnderSupplyPolicy::Truncate => {
            debug!(
                shortfalls = shortfalls.len(),
                deficits = deficits.len(),
                "dropping under-supply reports"
            );
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::build_running_totals;
    use crate::types::{Event, StreamKind};

    fn totals(rows: &[(i64, u64)], stream: StreamKind) -> Vec<RunningTotalEvent> {
        let events: Vec<Event> = rows.iter().map(|&(t, q)| Event::new("a", t, q)).collect();
        build_running_totals(&events, stream).unwrap()
    }

    fn outputs(rows: &[(i64, u64)]) -> Vec<RunningTotalEvent> {
        totals(rows, StreamKind::Outputs)
    }

    fn inputs(rows: &[(i64, u64)]) -> Vec<RunningTotalEvent> {
        totals(rows, StreamKind::Inputs)
    }

    #[test]
    fn test_partial_and_full_shortfalls() {
        let shortfalls = find_shortfalls(40, &outputs(&[(1, 30), (2, 15), (3, 0), (4, 8)]));

        assert_eq!(shortfalls.len(), 2);
        assert_eq!((shortfalls[0].out_order_dim, shortfalls[0].unmatched), (2, 5));
        assert_eq!((shortfalls[1].out_order_dim, shortfalls[1].unmatched), (4, 8));
        assert_eq!(shortfalls[1].requested, 8);
    }

    #[test]
    fn test_exact_supply_has_no_shortfall() {
        assert!(find_shortfalls(45, &outputs(&[(1, 45)])).is_empty());
    }

    #[test]
    fn test_output_before_any_receipt_is_a_deficit() {
        let deficits = find_stock_deficits(&inputs(&[(5, 10)]), &outputs(&[(1, 4)]));

        assert_eq!(
            deficits,
            vec![StockDeficit {
                identity: "a".to_string(),
                out_order_dim: 1,
                requested: 4,
                deficit: 4,
            }]
        );
    }

    #[test]
    fn test_partial_deficit() {
        // 6 on hand at t=3, output of 10 needs 4 from the receipt at t=7
        let deficits = find_stock_deficits(&inputs(&[(1, 6), (7, 10)]), &outputs(&[(3, 10), (8, 6)]));

        assert_eq!(deficits.len(), 1);
        assert_eq!((deficits[0].out_order_dim, deficits[0].deficit), (3, 4));
    }

    #[test]
    fn test_same_order_dim_counts_as_on_hand() {
        assert!(find_stock_deficits(&inputs(&[(2, 5)]), &outputs(&[(2, 5)])).is_empty());
    }

    #[test]
    fn test_deficit_excludes_shortfall() {
        // Output of 12 at t=1: 10 arrives later, 2 never arrives
        let inputs = inputs(&[(3, 10)]);
        let outputs = outputs(&[(1, 12)]);

        let deficits = find_stock_deficits(&inputs, &outputs);
        let shortfalls = find_shortfalls(10, &outputs);

        assert_eq!(deficits[0].deficit, 10);
        assert_eq!(shortfalls[0].unmatched, 2);
    }

    #[test]
    fn test_policies() {
        let shortfalls = find_shortfalls(0, &outputs(&[(7, 3)]));

        assert!(enforce_policy(&shortfalls, &[], UnderSupplyPolicy::Warn).is_ok());
        assert!(enforce_policy(&shortfalls, &[], UnderSupplyPolicy::Truncate).is_ok());
        assert_eq!(
            enforce_policy(&shortfalls, &[], UnderSupplyPolicy::Fail),
            Err(AllocationError::UnderSupply {
                identity: "a".to_string(),
                order_dim: 7,
                unmatched: 3,
            })
        );
        assert!(enforce_policy(&[], &[], UnderSupplyPolicy::Fail).is_ok());
    }

    #[test]
    fn test_fail_policy_on_deficit() {
        let deficits = find_stock_deficits(&inputs(&[(5, 10)]), &outputs(&[(1, 4)]));

        assert!(enforce_policy(&[], &deficits, UnderSupplyPolicy::Warn).is_ok());
        assert_eq!(
            enforce_policy(&[], &deficits, UnderSupplyPolicy::Fail),
            Err(AllocationError::NegativeStock {
                identity: "a".to_string(),
                order_dim: 1,
                deficit: 4,
            })
        );
    }
}
