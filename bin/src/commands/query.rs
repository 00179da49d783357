//! Query command implementation.
//!
//! Builds a market-data request from flags or a JSON file and runs it
//! against the stored snapshot.

use crate::display::{Coverage, Format, open_store, parse_indicator, parse_symbol, write_response};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use mims_lib::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Arguments of `mims query`.
#[derive(Args)]
pub(crate) struct QueryArgs {
    /// Pair symbol (e.g., BTC/USD)
    #[arg(required_unless_present = "request")]
    symbol: Option<String>,

    /// Broker quoting the pair
    #[arg(short, long, default_value = "COINBASE")]
    broker: String,

    /// Exclusive start (RFC 3339, minute a multiple of 15)
    #[arg(short, long, required_unless_present = "request")]
    start: Option<DateTime<Utc>>,

    /// Inclusive end (RFC 3339, minute a multiple of 15)
    #[arg(short, long, required_unless_present = "request")]
    end: Option<DateTime<Utc>>,

    /// Bucket width as an ISO-8601 duration (PT15M .. P4M)
    #[arg(long, default_value = "PT15M")]
    interval: String,

    /// Indicator, e.g. `sma:20` or `macd:longPeriod=26,shortPeriod=12,smoothing=2` (repeatable)
    #[arg(short, long = "indicator")]
    indicators: Vec<String>,

    /// Read the request body from a JSON file instead of flags
    #[arg(short, long, conflicts_with_all = ["symbol", "start", "end", "indicators"])]
    request: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: Format,

    /// Output file path. Defaults to stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// How the range is tested against ingested history
    #[arg(long, value_enum, default_value = "per-range")]
    coverage: Coverage,

    /// Deadline for the candle fetch, in seconds
    #[arg(long)]
    timeout: Option<u64>,
}

impl QueryArgs {
    /// Builds the wire request from the flags, or loads it from `--request`.
    fn to_request(&self) -> Result<MarketDataRequest> {
        if let Some(path) = &self.request {
            let body = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            return serde_json::from_str(&body)
                .with_context(|| format!("Invalid request in {}", path.display()));
        }

        let symbol = self.symbol.as_deref().context("Missing symbol")?;
        let (base, quote) = parse_symbol(symbol)?;
        let indicators = if self.indicators.is_empty() {
            None
        } else {
            Some(
                self.indicators
                    .iter()
                    .map(|arg| parse_indicator(arg))
                    .collect::<Result<Vec<_>>>()?,
            )
        };

        Ok(MarketDataRequest {
            base: base.to_string(),
            quote: quote.to_string(),
            broker: self.broker.clone(),
            start: self.start.context("Missing --start")?,
            end: self.end.context("Missing --end")?,
            interval: self.interval.clone(),
            indicators,
        })
    }

    fn config(&self) -> OrchestratorConfig {
        let config = OrchestratorConfig::default().with_coverage(self.coverage.into());
        match self.timeout {
            Some(secs) => config.with_fetch_timeout(Duration::from_secs(secs)),
            None => config,
        }
    }
}

/// Run a query and write the annotated bars.
pub(crate) async fn query(snapshot: &SnapshotFile, args: QueryArgs) -> Result<()> {
    let request = args.to_request()?;
    let store = Arc::new(open_store(snapshot)?);
    let orchestrator = QueryOrchestrator::from_store(store, args.config());

    let response = match orchestrator.handle(&request, chrono::Utc::now()).await {
        Ok(response) => response,
        Err(e @ MimsError::DataUnavailable { .. }) => {
            return Err(e).with_context(|| {
                format!(
                    "Ingest the missing range, then retry (see `mims coverage {}/{} --broker {}`)",
                    request.base, request.quote, request.broker
                )
            });
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(
        bars = response.bars.len(),
        indicators = response.indicators.len(),
        "query complete"
    );
    write_response(&response, args.format, args.output.as_deref(), args.pretty)?;

    if let Some(output) = &args.output {
        println!("Output written to: {}", output.display());
    }

    Ok(())
}
