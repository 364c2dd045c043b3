//! Precondition checks on a raw event stream.
//!
//! The running-total builder trusts its input. These checks run before it
//! and are controlled by [`AllocatorConfig`]:
//!
//! | Check | Default | Error |
//! |-------|---------|-------|
//! | `(identity, order_dim)` unique | on | `UniquenessViolation` |
//! | `order_dim` non-decreasing per identity | off | `NonMonotonicInput` |

use std::collections::{HashMap, HashSet};

use crate::config::{AllocatorConfig, UniquenessMode};
use crate::error::{AllocationError, Result};
use crate::types::{Event, StreamKind};

/// Validate one stream against the configured preconditions
///
/// Reports the first violation in stream order.
pub fn validate_stream(events: &[Event], stream: StreamKind, config: &AllocatorConfig) -> Result<()> {
    let check_unique = config.uniqueness == UniquenessMode::Strict;
    if !check_unique && !config.strict_ordering {
        return Ok(());
    }

    let mut seen: HashSet<(&str, i64)> = HashSet::with_capacity(if check_unique { events.len() } else { 0 });
    let mut last: HashMap<&str, i64> = HashMap::new();

    for event in events {
        let identity = event.identity.as_str();

        if config.strict_ordering {
            if let Some(&previous) = last.get(identity) {
                if event.order_dim < previous {
                    return Err(AllocationError::NonMonotonicInput {
                        stream,
                        identity: event.identity.clone(),
                        previous,
                        current: event.order_dim,
                    });
                }
            }
            last.insert(identity, event.order_dim);
        }

        if check_unique && !seen.insert((identity, event.order_dim)) {
            return Err(AllocationError::UniquenessViolation {
                stream,
                identity: event.identity.clone(),
                order_dim: event.order_dim,
            });
        }
    }

    Ok(())
}
