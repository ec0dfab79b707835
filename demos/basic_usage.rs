// ============================================================================
// Basic Usage Example
// ============================================================================

use limit_order_book::numeric::parse_decimal;
use limit_order_book::prelude::*;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .init();

    println!("=== Limit Order Book Example ===\n");

    let mut engine = MatchingEngineBuilder::new("BTC-USD")
        .with_tick_size(parse_decimal("0.01").unwrap())
        .build(Arc::new(LoggingEventHandler))
        .unwrap();

    println!("Created matching engine for {}\n", engine.instrument());

    // Add sell orders at different prices
    println!("Adding sell orders...");
    for i in 0i64..5 {
        engine
            .submit_limit(format!("seller_{}", i), Side::Sell, Decimal::ONE, Decimal::from(50000 + i * 100))
            .unwrap();
    }

    // Add buy orders
    println!("Adding buy orders...");
    for i in 0i64..5 {
        engine
            .submit_limit(format!("buyer_{}", i), Side::Buy, Decimal::ONE, Decimal::from(49900 - i * 100))
            .unwrap();
    }

    // Get order book snapshot
    println!("\n=== Order Book Snapshot ===");
    let snapshot = engine.snapshot(5);

    println!("\nBids:");
    for level in &snapshot.bids {
        println!("  {} @ {}", level.volume, level.price);
    }

    println!("\nAsks:");
    for level in &snapshot.asks {
        println!("  {} @ {}", level.volume, level.price);
    }

    println!("\nSpread: {:?}", snapshot.spread);
    println!("Mid Price: {:?}", snapshot.mid_price);

    // Price the order before sending it
    let volume = parse_decimal("2.5").unwrap();
    match engine.quote(Side::Buy, volume) {
        Ok(total) => println!("\nBuying {} would cost {}", volume, total),
        Err(err) => println!("\nCannot price {}: {}", volume, err),
    }

    // Submit a crossing buy order
    println!("\n=== Submitting Crossing Order ===");
    let execution = engine
        .submit_limit("aggressive_buyer", Side::Buy, volume, Decimal::from(50200))
        .unwrap();

    println!("\nDone:");
    for order in &execution.done {
        println!("  {}", order);
    }
    if let Some(partial) = &execution.partial {
        println!("Partial: {} ({} executed)", partial, execution.partial_volume);
    }

    // Sweep whatever is left on the bid side
    let sweep = engine.sweep(Side::Sell, Decimal::from(10)).unwrap();
    println!("\nSwept {} bids, {} left unfilled", sweep.done.len(), sweep.volume_left);

    // Final snapshot
    println!("\n=== Final Order Book ===");
    let depth = engine.depth();
    println!("Bids: {} levels", depth.bids.len());
    println!("Asks: {} levels", depth.asks.len());
    println!("Spread: {:?}", engine.spread());
}
