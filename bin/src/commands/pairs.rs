//! Pairs command implementation.

use crate::display::open_store;
use anyhow::Result;
use mims_lib::prelude::*;
use std::collections::HashMap;

/// List registered pairs, optionally only those of `broker`.
pub(crate) async fn list_pairs(snapshot: &SnapshotFile, broker: Option<&str>) -> Result<()> {
    let store = open_store(snapshot)?;
    let brokers: HashMap<_, _> = store
        .brokers()
        .await?
        .into_iter()
        .map(|b| (b.id, b.name))
        .collect();

    let mut rows = Vec::new();
    for pair in store.pairs().await? {
        let broker_name = brokers.get(&pair.broker_id).map_or("?", String::as_str);
        if broker.is_some_and(|wanted| wanted != broker_name) {
            continue;
        }
        let count = store.row_count(pair.id).await;
        rows.push((pair.symbol(), broker_name.to_string(), count));
    }

    if rows.is_empty() {
        println!("No pairs found.");
        return Ok(());
    }

    rows.sort();
    println!("{:<15} {:<15} {:>10}", "SYMBOL", "BROKER", "ROWS");
    println!("{}", "-".repeat(42));
    for (symbol, broker_name, count) in &rows {
        println!("{symbol:<15} {broker_name:<15} {count:>10}");
    }

    println!("\nTotal: {} pairs", rows.len());
    Ok(())
}
