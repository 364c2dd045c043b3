//! Event types for the inflow and outflow streams.
//!
//! ## Streams
//!
//! Both streams share one row shape. The inputs stream adds quantity to a
//! pool (`qty_in`), the outputs stream removes it (`qty_out`). Rows are keyed
//! by an opaque identity (`unique_combination`, e.g. SKU + warehouse) and
//! sequenced by `order_dim` within that identity.
//!
//! ## Ingestion
//!
//! Upstream rows arrive loosely typed ([`RawEvent`]). [`RawEvent::into_event`]
//! is the only place a [`AllocationError::Schema`] can originate: fields are
//! either present and well-formed, or the run stops.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AllocationError, Result};
use crate::types::quantity::{from_units, to_fixed};

// ============================================================================
// StreamKind enum
// ============================================================================

/// Which of the two event streams a row belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    /// Quantity added to the pool
    Inputs,
    /// Quantity removed from the pool
    Outputs,
}

impl StreamKind {
    /// Name of the quantity column for this stream
    pub fn quantity_field(self) -> &'static str {
        match self {
            StreamKind::Inputs => "qty_in",
            StreamKind::Outputs => "qty_out",
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Inputs => f.write_str("inputs"),
            StreamKind::Outputs => f.write_str("outputs"),
        }
    }
}

// ============================================================================
// Event struct
// ============================================================================

/// One row of either stream.
///
/// `quantity` is fixed-point (scaled by 10^8).
///
/// ## Example
///
/// ```
/// use fifo_allocator::types::Event;
///
/// // 10 units of SKU-1 received at sequence 1
/// let event = Event::new("sku-1/wh-a", 1, 1_000_000_000);
/// assert!(!event.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Event {
    /// Shared grouping key, never interpreted
    #[serde(rename = "unique_combination")]
    pub identity: String,

    /// Sequencing value within the identity
    pub order_dim: i64,

    /// Quantity in fixed-point (scaled by 10^8)
    pub quantity: u64,
}

impl Event {
    /// Create a new event
    pub fn new(identity: impl Into<String>, order_dim: i64, quantity: u64) -> Self {
        Self {
            identity: identity.into(),
            order_dim,
            quantity,
        }
    }

    /// A zero-quantity event occupies no cumulative range
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.quantity == 0
    }
}

// ============================================================================
// Raw rows
// ============================================================================

/// A loosely typed field value as delivered by an upstream table
///
/// Values of any other JSON type land in `Other` so that ingestion, not
/// deserialization, reports them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Integer(i64),
    Float(f64),
    Text(String),
    Other(serde_json::Value),
}

/// An unvalidated row of either stream.
///
/// Field names follow the upstream tables: `unique_combination`,
/// `order_dim`, and `qty_in` / `qty_out`. Only the quantity column of the
/// stream being ingested is read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    #[serde(default, alias = "identity")]
    pub unique_combination: Option<RawValue>,

    #[serde(default)]
    pub order_dim: Option<RawValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qty_in: Option<RawValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qty_out: Option<RawValue>,
}

impl RawEvent {
    /// Validate the row and convert it into an [`Event`]
    ///
    /// # Errors
    ///
    /// [`AllocationError::Schema`] if a field is absent or mistyped.
    pub fn into_event(self, stream: StreamKind) -> Result<Event> {
        let identity = match required(stream, "unique_combination", self.unique_combination)? {
            RawValue::Text(s) if s.trim().is_empty() => {
                return Err(schema(stream, "unique_combination", "is empty"));
            }
            RawValue::Text(s) => s,
            RawValue::Integer(i) => i.to_string(),
            RawValue::Float(_) | RawValue::Other(_) => {
                return Err(schema(stream, "unique_combination", "must be a string key"));
            }
        };

        let order_dim = match required(stream, "order_dim", self.order_dim)? {
            RawValue::Integer(i) => i,
            RawValue::Text(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| schema(stream, "order_dim", format!("`{s}` is not an integer")))?,
            RawValue::Float(f) => {
                return Err(schema(stream, "order_dim", format!("`{f}` is not an integer")));
            }
            RawValue::Other(v) => {
                return Err(schema(stream, "order_dim", format!("`{v}` is not an integer")));
            }
        };

        let field = stream.quantity_field();
        let column = match stream {
            StreamKind::Inputs => self.qty_in,
            StreamKind::Outputs => self.qty_out,
        };
        let quantity = match required(stream, field, column)? {
            RawValue::Integer(i) if i < 0 => {
                return Err(schema(stream, field, format!("`{i}` is negative")));
            }
            RawValue::Integer(i) => from_units(i.unsigned_abs())
                .ok_or_else(|| schema(stream, field, format!("`{i}` is out of range")))?,
            RawValue::Float(f) => parse_quantity(stream, &f.to_string())?,
            RawValue::Text(s) => parse_quantity(stream, &s)?,
            RawValue::Other(v) => {
                return Err(schema(stream, field, format!("`{v}` is not a decimal")));
            }
        };

        Ok(Event::new(identity, order_dim, quantity))
    }
}

/// Convert a batch of raw rows, stopping at the first malformed one
pub fn ingest<I>(rows: I, stream: StreamKind) -> Result<Vec<Event>>
where
    I: IntoIterator<Item = RawEvent>,
{
    rows.into_iter().map(|row| row.into_event(stream)).collect()
}

fn required(stream: StreamKind, field: &'static str, value: Option<RawValue>) -> Result<RawValue> {
    value.ok_or_else(|| schema(stream, field, "is missing"))
}

fn parse_quantity(stream: StreamKind, s: &str) -> Result<u64> {
    let field = stream.quantity_field();
    to_fixed(s).ok_or_else(|| schema(stream, field, format!("`{s}` is not a non-negative decimal")))
}

fn schema(stream: StreamKind, field: &'static str, reason: impl Into<String>) -> AllocationError {
    AllocationError::Schema {
        stream,
        field,
        reason: reason.into(),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
