//! Streaming lot ledger.
//!
//! The batch pipeline needs both streams up front. The ledger reaches the
//! same facts one event at a time by keeping, per identity, the inputs that
//! still hold quantity and the outputs still waiting for it.
//!
//! ## Components
//!
//! - [`LotNode`]: an open event plus linked-list pointers
//! - [`LotQueue`]: FIFO queue of lots for one identity and one stream
//! - [`StreamingAllocator`]: the ledger itself
//!
//! ## Performance
//!
//! | Operation | Complexity |
//! |-----------|------------|
//! | Push event | O(log identities + facts emitted) |
//! | On-hand / outstanding lookup | O(log identities) |
//! | Shortfall report | O(open demand lots) |

pub mod node;
pub mod queue;
pub mod stream;

pub use node::LotNode;
pub use queue::LotQueue;
pub use stream::{IdentityBook, StreamingAllocator};
