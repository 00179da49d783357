//! Display utilities and argument parsing for the mims CLI.

use anyhow::{Context, Result, bail};
use chrono::TimeDelta;
use clap::ValueEnum;
use mims_lib::prelude::*;
use mims_lib::Snapshot;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Output format for query results.
#[derive(Clone, Copy, ValueEnum)]
pub(crate) enum Format {
    Json,
    Ndjson,
    Csv,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Json => Self::Json,
            Format::Ndjson => Self::Ndjson,
            Format::Csv => Self::Csv,
        }
    }
}

/// How a query range is tested against ingested ranges.
#[derive(Clone, Copy, ValueEnum)]
pub(crate) enum Coverage {
    /// A single ingested range must enclose the query
    PerRange,
    /// The merged ingested ranges must enclose the query
    Union,
}

impl From<Coverage> for CoveragePolicy {
    fn from(coverage: Coverage) -> Self {
        match coverage {
            Coverage::PerRange => Self::PerRange,
            Coverage::Union => Self::Union,
        }
    }
}

/// Loads the snapshot into a fresh in-memory store.
pub(crate) fn open_store(file: &SnapshotFile) -> Result<MemoryStore> {
    let snapshot: Snapshot = file
        .load()
        .with_context(|| format!("Failed to load store from {}", file.path().display()))?;
    Ok(MemoryStore::from_snapshot(StoreConfig::default(), snapshot))
}

/// Splits `BASE/QUOTE`.
pub(crate) fn parse_symbol(symbol: &str) -> Result<(&str, &str)> {
    Pair::split_symbol(symbol)
        .with_context(|| format!("Invalid symbol: {symbol}. Expected BASE/QUOTE, e.g. BTC/USD"))
}

/// Parses an indicator argument of the form `name[:param,...]`.
///
/// Each param is `name=value`; a bare `value` is accepted when the
/// indicator takes a single parameter, so `sma:20` means `sma:period=20`.
pub(crate) fn parse_indicator(arg: &str) -> Result<IndicatorSpec> {
    let (name, params) = arg.split_once(':').unwrap_or((arg, ""));
    let kind: IndicatorKind = name.trim().parse()?;
    let names = kind.parameter_names();

    let mut parameters = Vec::new();
    for param in params.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (param_name, value) = match param.split_once('=') {
            Some((n, v)) => (n.trim(), v.trim()),
            None if names.len() == 1 => (names[0], param),
            None => bail!(
                "Parameter {param} of {kind} needs a name, expected: {}",
                names.join(", ")
            ),
        };
        let value: u32 = value
            .parse()
            .with_context(|| format!("Invalid value for {param_name} of {kind}: {value}"))?;
        parameters.push(Parameter::new(param_name, value));
    }

    Ok(IndicatorSpec::new(kind, parameters))
}

/// Writes `response` to `output`, or stdout if `None`.
pub(crate) fn write_response(
    response: &QueryResponse,
    format: Format,
    output: Option<&Path>,
    pretty: bool,
) -> Result<()> {
    let writer: Box<dyn Write + Send> = match output {
        Some(path) => Box::new(
            File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?,
        ),
        None => Box::new(std::io::stdout()),
    };
    let mut writer = BufWriter::new(writer);

    match OutputFormat::from(format) {
        OutputFormat::Json => JsonFormatter::new()
            .with_pretty(pretty)
            .write_response(response, &mut writer)?,
        OutputFormat::Ndjson => JsonFormatter::ndjson().write_response(response, &mut writer)?,
        OutputFormat::Csv => CsvFormatter::new().write_response(response, &mut writer)?,
    }

    writer.flush()?;
    Ok(())
}

/// Formats a span as days, hours and minutes, e.g. `3d 4h 15m`.
pub(crate) fn format_span(span: TimeDelta) -> String {
    let minutes = span.num_minutes();
    let (days, rest) = (minutes / 1440, minutes % 1440);
    let (hours, minutes) = (rest / 60, rest % 60);

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{days}d"));
    }
    if hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if minutes > 0 || parts.is_empty() {
        parts.push(format!("{minutes}m"));
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_indicator_shorthand() {
        let spec = parse_indicator("sma:20").unwrap();
        assert_eq!(spec.name, IndicatorKind::Sma);
        assert_eq!(spec.parameters, vec![Parameter::new("period", 20)]);
    }

    #[test]
    fn test_parse_indicator_named() {
        let spec = parse_indicator("MACD:longPeriod=26, shortPeriod=12,smoothing=2").unwrap();
        assert_eq!(spec.name, IndicatorKind::Macd);
        assert_eq!(spec.parameters.len(), 3);
        assert_eq!(spec.parameters[1], Parameter::new("shortPeriod", 12));
    }

    #[test]
    fn test_parse_indicator_rejects() {
        assert!(parse_indicator("vwap:14").is_err());
        assert!(parse_indicator("ema:20,2").is_err());
        assert!(parse_indicator("rsi:fourteen").is_err());
    }

    #[test]
    fn test_format_span() {
        assert_eq!(format_span(TimeDelta::minutes(0)), "0m");
        assert_eq!(format_span(TimeDelta::minutes(15)), "15m");
        assert_eq!(format_span(TimeDelta::minutes(1440 + 60)), "1d 1h");
    }
}
