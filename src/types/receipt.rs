//! Allocation receipt summarizing one run.
//!
//! The receipt carries a SHA-256 digest of the canonical fact table and is
//! itself SSZ-encoded, so two runs over the same streams can be compared
//! byte for byte without diffing the facts.

use ssz_rs::prelude::*;
use sha2::{Digest, Sha256};

use crate::types::AllocationFact;

/// Summary of one allocation run.
///
/// ## Example
///
/// ```
/// use fifo_allocator::types::AllocationReceipt;
///
/// let receipt = AllocationReceipt::from_facts(&[], 0, 0, 0, 0);
/// assert!(receipt.is_empty());
/// assert!(receipt.fully_supplied());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct AllocationReceipt {
    /// Number of distinct identities seen in either stream
    pub identities: u64,

    /// Number of input events consumed
    pub input_events: u64,

    /// Number of output events consumed
    pub output_events: u64,

    /// Number of allocation facts produced
    pub facts: u64,

    /// Sum of allocated quantity over all facts (fixed-point)
    pub allocated_qty: u64,

    /// Output quantity left without supply (fixed-point)
    pub unmatched_qty: u64,

    /// SHA-256 over the canonical encoding of every fact, in order
    pub digest: [u8; 32],
}

impl AllocationReceipt {
    /// Build a receipt for a finished fact table
    pub fn from_facts(
        facts: &[AllocationFact],
        identities: u64,
        input_events: u64,
        output_events: u64,
        unmatched_qty: u64,
    ) -> Self {
        let allocated_qty = facts.iter().fold(0u64, |acc, f| acc.saturating_add(f.qty));

        Self {
            identities,
            input_events,
            output_events,
            facts: facts.len() as u64,
            allocated_qty,
            unmatched_qty,
            digest: Self::compute_digest(facts),
        }
    }

    /// SHA-256 over the canonical encoding of `facts`
    pub fn compute_digest(facts: &[AllocationFact]) -> [u8; 32] {
        let mut buf = Vec::with_capacity(facts.len() * 64);
        for fact in facts {
            fact.encode_canonical(&mut buf);
        }

        let mut hasher = Sha256::new();
        hasher.update(&buf);

        let mut digest = [0u8; 32];
        digest.copy_from_slice(&hasher.finalize());
        digest
    }

    /// Digest as a hex string
    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest)
    }

    /// True when no facts were produced
    pub fn is_empty(&self) -> bool {
        self.facts == 0
    }

    /// True when every output was covered by supply
    pub fn fully_supplied(&self) -> bool {
        self.unmatched_qty == 0
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
