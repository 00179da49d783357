//! Brokers command implementation.

use crate::display::open_store;
use anyhow::Result;
use mims_lib::prelude::*;

/// List registered brokers with their pair counts.
pub(crate) async fn list_brokers(snapshot: &SnapshotFile) -> Result<()> {
    let store = open_store(snapshot)?;
    let brokers = store.brokers().await?;
    let pairs = store.pairs().await?;

    if brokers.is_empty() {
        println!("No brokers registered. Run `mims ingest` first.");
        return Ok(());
    }

    println!("{:<15} {:<38} {:>6}", "NAME", "ID", "PAIRS");
    println!("{}", "-".repeat(61));
    for broker in &brokers {
        let count = pairs.iter().filter(|p| p.broker_id == broker.id).count();
        println!("{:<15} {:<38} {:>6}", broker.name, broker.id.to_string(), count);
    }

    println!("\nTotal: {} brokers", brokers.len());
    Ok(())
}
