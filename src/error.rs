//! Error taxonomy for the allocation pipeline.
//!
//! Every failure is fatal to the run that raised it. There is nothing to
//! retry: the only recovery path is correcting the input streams (or the
//! configuration) and running again.

use thiserror::Error;

use crate::types::StreamKind;

/// Errors raised while ingesting, validating, or allocating event streams.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocationError {
    /// A required field is missing or cannot be parsed.
    #[error("{stream} row: field `{field}` {reason}")]
    Schema {
        stream: StreamKind,
        field: &'static str,
        reason: String,
    },

    /// Two events in one stream share the same (identity, order_dim).
    #[error("{stream} stream: duplicate order_dim {order_dim} for identity `{identity}`")]
    UniquenessViolation {
        stream: StreamKind,
        identity: String,
        order_dim: i64,
    },

    /// Events of one identity are not sorted by order_dim.
    #[error(
        "{stream} stream: order_dim {current} follows {previous} for identity `{identity}`"
    )]
    NonMonotonicInput {
        stream: StreamKind,
        identity: String,
        previous: i64,
        current: i64,
    },

    /// An output event could not be fully covered by cumulative supply.
    #[error("under-supply for identity `{identity}` at order_dim {order_dim}: {unmatched} unmatched")]
    UnderSupply {
        identity: String,
        order_dim: i64,
        /// Unmatched quantity (fixed-point)
        unmatched: u64,
    },

    /// An output exceeded the stock on hand at its own order_dim.
    #[error("negative stock for identity `{identity}` at order_dim {order_dim}: {deficit} served by later inputs")]
    NegativeStock {
        identity: String,
        order_dim: i64,
        /// Quantity drawn from later supply (fixed-point)
        deficit: u64,
    },

    /// A cumulative quantity left the fixed-point range.
    #[error("{stream} stream: cumulative quantity overflow for identity `{identity}`")]
    QuantityOverflow { stream: StreamKind, identity: String },

    /// A configuration value could not be interpreted.
    #[error("invalid configuration value for {key}: `{value}`")]
    Config { key: &'static str, value: String },
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, AllocationError>;
