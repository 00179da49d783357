//! Coverage command implementation.
//!
//! Prints the ingested ranges of a pair and, given a range, the gaps a
//! backfill would have to fetch.

use crate::display::{format_span, open_store, parse_symbol};
use anyhow::Result;
use chrono::{DateTime, Utc};
use mims_lib::prelude::*;

/// Show the availability index of `symbol` at `broker`.
pub(crate) async fn show_coverage(
    snapshot: &SnapshotFile,
    symbol: &str,
    broker: &str,
    check: Option<(DateTime<Utc>, DateTime<Utc>)>,
) -> Result<()> {
    let (base, quote) = parse_symbol(symbol)?;
    let store = open_store(snapshot)?;
    let pair = store.resolve(base, quote, broker).await?;
    let known = store.known_ranges(pair.id).await?;

    println!("{} at {} ({})", pair.symbol(), broker, pair.id);
    if known.is_empty() {
        println!("No ingested ranges.");
    } else {
        println!("{:<22} {:<22} {:>14}", "START", "END", "SPAN");
        println!("{}", "-".repeat(60));
        for range in &known {
            println!(
                "{:<22} {:<22} {:>14}",
                range.start().format("%Y-%m-%d %H:%M"),
                range.end().format("%Y-%m-%d %H:%M"),
                format_span(range.duration())
            );
        }
        println!("\nTotal: {} ranges", known.len());
    }

    let Some((start, end)) = check else {
        return Ok(());
    };

    let requested = Interval::new(start, end)?;
    let gaps = AvailabilityTracker::gaps(&requested, known.as_slice());
    if gaps.is_empty() {
        println!("\n{requested} is covered.");
        return Ok(());
    }

    println!("\nGaps in {requested}:");
    for gap in &gaps {
        println!("  {gap} ({})", format_span(gap.duration()));
    }
    Ok(())
}
