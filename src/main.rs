//! FIFO Allocator - demo binary
//!
//! Allocates one sample identity with both the batch pipeline and the
//! streaming ledger and prints the resulting fact table.
//! Set `FIFO_ALLOC_*` variables to change validation and under-supply handling,
//! and `RUST_LOG=debug` to see each stage.

use fifo_allocator::logging::{init_logging, LogFormat};
use fifo_allocator::types::quantity::{from_fixed_trimmed, SCALE};
use fifo_allocator::{AllocatorConfig, Event, FifoAllocator, StreamingAllocator};

fn units(n: u64) -> u64 {
    n * SCALE
}

fn main() -> fifo_allocator::Result<()> {
    init_logging(LogFormat::Pretty);
    let config = AllocatorConfig::from_env()?;

    println!("===========================================");
    println!("  FIFO Allocator");
    println!("===========================================");
    println!();

    // Five receipts of 10 units; outputs of 35 then 10 (the second spans 36..45)
    let inputs: Vec<Event> = (1..=5).map(|t| Event::new("sku-1/wh-a", t, units(10))).collect();
    let outputs = vec![
        Event::new("sku-1/wh-a", 6, units(35)),
        Event::new("sku-1/wh-a", 7, units(10)),
        Event::new("sku-2/wh-a", 8, units(3)),
    ];

    let allocation = FifoAllocator::new(config).allocate(&inputs, &outputs)?;

    println!(
        "{:<12} {:>8} {:>8} {:<16} {:>8} {:>10}",
        "identity", "in", "out", "status", "qty", "left"
    );
    for fact in &allocation.facts {
        println!(
            "{:<12} {:>8} {:>8} {:<16} {:>8} {:>10}",
            fact.identity,
            fact.in_order_dim,
            fact.out_order_dim,
            fact.out_status.to_string(),
            from_fixed_trimmed(fact.qty),
            from_fixed_trimmed(fact.qty_left_from_this_batch),
        );
    }
    println!();

    for shortfall in &allocation.shortfalls {
        println!(
            "Under-supply: {} at {} is short {} of {}",
            shortfall.identity,
            shortfall.out_order_dim,
            from_fixed_trimmed(shortfall.unmatched),
            from_fixed_trimmed(shortfall.requested),
        );
    }

    for deficit in &allocation.deficits {
        println!(
            "Negative stock: {} at {} drew {} from later receipts",
            deficit.identity,
            deficit.out_order_dim,
            from_fixed_trimmed(deficit.deficit),
        );
    }

    let receipt = &allocation.receipt;
    println!("Receipt:");
    println!("  Facts:      {}", receipt.facts);
    println!("  Allocated:  {}", from_fixed_trimmed(receipt.allocated_qty));
    println!("  Unmatched:  {}", from_fixed_trimmed(receipt.unmatched_qty));
    println!("  Digest:     {}", receipt.digest_hex());
    match ssz_rs::serialize(receipt) {
        Ok(bytes) => println!("  SSZ bytes:  {}", bytes.len()),
        Err(e) => println!("  ERROR: Failed to serialize receipt: {:?}", e),
    }
    println!();

    // Same events, one at a time
    let mut ledger = StreamingAllocator::new(config);
    let mut streamed = Vec::new();
    for event in inputs {
        streamed.extend(ledger.push_input(event)?);
    }
    for event in outputs {
        streamed.extend(ledger.push_output(event)?);
    }
    ledger.finish()?;

    println!(
        "Streaming ledger: {} facts, identical to batch: {}",
        streamed.len(),
        streamed == allocation.facts
    );
    println!("On hand sku-1/wh-a: {}", from_fixed_trimmed(ledger.on_hand("sku-1/wh-a")));

    Ok(())
}
