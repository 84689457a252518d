//! Example: Reading data from PLC memory
//!
//! Run with: cargo run --example simple_read -- 192.168.1.250 [tcp|udp] [area]
//!
//! This example demonstrates:
//! - Connecting over TCP or UDP and identifying the controller
//! - Reading words and bits
//! - Reading the PLC clock and cycle time
//! - Inspecting transfer statistics
//!
//! Set `RUST_LOG=omron_fins_channel=debug` to see the channel's events.

use omron_fins_channel::{Client, ClientConfig, ConnectionMethod, FinsError, MemoryArea};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> omron_fins_channel::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let mut args = std::env::args().skip(1);
    let host = args.next().unwrap_or_else(|| "192.168.1.250".to_string());
    let method = match args.next().as_deref() {
        Some("udp") => ConnectionMethod::Udp,
        _ => ConnectionMethod::Tcp,
    };
    let area: MemoryArea = match args.next() {
        Some(name) => name.parse()?,
        None => MemoryArea::DM,
    };

    // =========================================================================
    // Connect to PLC
    // =========================================================================

    // UDP needs node numbers; TCP negotiates them and ignores these.
    let config = ClientConfig::new(host, method)
        .with_timeout(Duration::from_secs(1))
        .with_retries(2)
        .with_nodes(1, 250);
    let mut client = Client::new(config)?;

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    client.initialize(&cancel).await?;
    if let Some(unit) = client.cpu_unit() {
        println!("Model:   {} ({})", unit.model, client.family());
        println!("Version: {}", unit.version);
        println!("DM size: {} words", unit.dm_word_count);
    }

    // =========================================================================
    // Reading Words (16-bit values)
    // =========================================================================

    println!("\n=== Reading Words ===\n");

    let first = client.read_word(area, 0, &cancel).await?;
    println!("{area}0 = {} (0x{:04X})", first.value, first.value);

    let block = client.read_words(area, 100, 5, &cancel).await?;
    println!("{area}100-{area}104: {:?}", block.value);
    println!(
        "  {} bytes sent, {} bytes received in {:?}",
        block.stats.bytes_sent, block.stats.bytes_received, block.stats.duration
    );

    for area in [MemoryArea::CIO, MemoryArea::WR, MemoryArea::HR] {
        match client.read_word(area, 0, &cancel).await {
            Ok(word) => println!("{area}0 = 0x{:04X}", word.value),
            Err(FinsError::InvalidAddressing { reason }) => println!("{area}0 skipped: {reason}"),
            Err(e) => return Err(e),
        }
    }

    // =========================================================================
    // Reading Bits
    // =========================================================================

    println!("\n=== Reading Bits ===\n");

    let bit = client.read_bit(MemoryArea::CIO, 0, 5, &cancel).await?;
    println!("CIO 0.05 = {}", bit.value);

    let bits = client.read_bits(MemoryArea::CIO, 100, 0, 16, &cancel).await?;
    let on: Vec<usize> = bits
        .value
        .iter()
        .enumerate()
        .filter_map(|(i, &on)| on.then_some(i))
        .collect();
    println!("CIO100 bits ON: {:?}", on);

    // =========================================================================
    // Clock and Cycle Time
    // =========================================================================

    println!("\n=== Status ===\n");

    let clock = client.read_clock(&cancel).await?;
    println!(
        "PLC clock: {} (day of week {})",
        clock.value.date_time, clock.value.day_of_week
    );

    match client.read_cycle_time(&cancel).await {
        Ok(cycle) => println!(
            "Cycle time: avg {:.1} ms, max {:.1} ms, min {:.1} ms",
            cycle.value.average_ms, cycle.value.maximum_ms, cycle.value.minimum_ms
        ),
        Err(FinsError::UnsupportedOperation { .. }) => {
            println!("Cycle time is not available on {} PLCs", client.family())
        }
        Err(e) => return Err(e),
    }

    client.dispose().await;
    println!("\nRead example completed!");
    Ok(())
}
