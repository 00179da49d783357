//! JSON output format.

use std::collections::BTreeMap;
use std::io::Write;

use mims_types::{Annotation, Candle, IndicatorKey, Parameter, QueryResponse};
use serde::Serialize;

use crate::formatter::iso_millis;
use crate::{FormatError, Formatter};

/// JSON output style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonStyle {
    /// The `{indicatorKeys, data}` envelope.
    #[default]
    Envelope,
    /// One bar tuple per line.
    Ndjson,
}

/// JSON formatter.
#[derive(Debug, Clone, Default)]
pub struct JsonFormatter {
    /// Output style.
    style: JsonStyle,
    /// Whether to pretty-print (envelope style only).
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter with default settings (envelope style).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            style: JsonStyle::Envelope,
            pretty: false,
        }
    }

    /// Creates a new NDJSON formatter.
    #[must_use]
    pub const fn ndjson() -> Self {
        Self {
            style: JsonStyle::Ndjson,
            pretty: false,
        }
    }

    /// Sets whether to pretty-print output (envelope style only).
    #[must_use]
    pub const fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Sets the output style.
    #[must_use]
    pub const fn with_style(mut self, style: JsonStyle) -> Self {
        self.style = style;
        self
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<'a> {
    indicator_keys: BTreeMap<&'a str, KeyEntry<'a>>,
    data: Vec<BarTuple<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct KeyEntry<'a> {
    indicator_id: u32,
    parameters: &'a [Parameter],
}

/// `[timestamp, open, high, low, close, volume, annotations]`.
#[derive(Serialize)]
struct BarTuple<'a>(String, f64, f64, f64, f64, f64, &'a BTreeMap<IndicatorKey, Annotation>);

impl<'a> From<&'a Candle> for BarTuple<'a> {
    fn from(bar: &'a Candle) -> Self {
        Self(
            iso_millis(&bar.timestamp),
            bar.open,
            bar.high,
            bar.low,
            bar.close,
            bar.volume,
            &bar.annotations,
        )
    }
}

impl<'a> From<&'a QueryResponse> for Envelope<'a> {
    fn from(response: &'a QueryResponse) -> Self {
        Self {
            indicator_keys: response
                .indicators
                .iter()
                .map(|r| {
                    (
                        r.key.as_str(),
                        KeyEntry {
                            indicator_id: r.indicator_id,
                            parameters: &r.parameters,
                        },
                    )
                })
                .collect(),
            data: response.bars.iter().map(BarTuple::from).collect(),
        }
    }
}

impl Formatter for JsonFormatter {
    fn write_response<W: Write + Send>(
        &self,
        response: &QueryResponse,
        mut writer: W,
    ) -> Result<(), FormatError> {
        match self.style {
            JsonStyle::Envelope => {
                let envelope = Envelope::from(response);
                if self.pretty {
                    serde_json::to_writer_pretty(&mut writer, &envelope)?;
                } else {
                    serde_json::to_writer(&mut writer, &envelope)?;
                }
                writeln!(writer)?;
            }
            JsonStyle::Ndjson => {
                for bar in &response.bars {
                    serde_json::to_writer(&mut writer, &BarTuple::from(bar))?;
                    writeln!(writer)?;
                }
            }
        }
        Ok(())
    }

    fn extension(&self) -> &str {
        match self.style {
            JsonStyle::Envelope => "json",
            JsonStyle::Ndjson => "ndjson",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use mims_types::{Band, Indicator, Ohlcv};
    use serde_json::{Value, json};
    use std::io::Cursor;

    fn create_test_response() -> QueryResponse {
        let timestamp = Utc.with_ymd_and_hms(2024, 1, 15, 12, 30, 0).unwrap();
        let sma = Indicator::Sma { period: 2 };
        let bb = Indicator::Bollinger {
            period: 2,
            deviation: 2,
        };

        let mut first = Candle::from(Ohlcv::new(timestamp, 1.0, 2.0, 0.5, 1.5, 10.0));
        first.annotations.insert(sma.key(), Annotation::NULL);
        first.annotations.insert(bb.key(), Annotation::NULL);

        let mut second = Candle::from(Ohlcv::flat(timestamp + chrono::TimeDelta::minutes(15), 2.0, 5.0));
        second.annotations.insert(sma.key(), Annotation::value(1.75));
        second.annotations.insert(
            bb.key(),
            Annotation::Band(Band {
                upper: 2.25,
                lower: 1.25,
            }),
        );

        QueryResponse {
            bars: vec![first, second],
            indicators: vec![sma.registration(), bb.registration()],
        }
    }

    #[test]
    fn test_envelope_shape() {
        let mut output = Cursor::new(Vec::new());
        JsonFormatter::new()
            .write_response(&create_test_response(), &mut output)
            .unwrap();

        let value: Value = serde_json::from_slice(&output.into_inner()).unwrap();
        assert_eq!(
            value["indicatorKeys"]["sma_2"],
            json!({"indicatorId": 1, "parameters": [{"name": "period", "value": 2}]})
        );
        assert_eq!(value["indicatorKeys"]["bb_2_2"]["indicatorId"], json!(7));

        let data = value["data"].as_array().unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0][0], json!("2024-01-15T12:30:00.000Z"));
        assert_eq!(data[0][5], json!(10.0));
        assert_eq!(data[0][6]["sma_2"], json!({"value": null}));
        assert_eq!(data[0][6]["bb_2_2"], json!({"value": null}));
        assert_eq!(data[1][6]["sma_2"], json!({"value": 1.75}));
        assert_eq!(data[1][6]["bb_2_2"], json!({"upper": 2.25, "lower": 1.25}));
    }

    #[test]
    fn test_ndjson() {
        let formatter = JsonFormatter::ndjson();
        let mut output = Cursor::new(Vec::new());

        formatter
            .write_response(&create_test_response(), &mut output)
            .unwrap();

        let result = String::from_utf8(output.into_inner()).unwrap();
        let lines: Vec<_> = result.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("[\"2024-01-15T12:30:00.000Z\""));
        assert_eq!(formatter.extension(), "ndjson");
    }

    #[test]
    fn test_pretty_json() {
        let formatter = JsonFormatter::new().with_pretty(true);
        let mut output = Cursor::new(Vec::new());

        formatter
            .write_response(&create_test_response(), &mut output)
            .unwrap();

        let result = String::from_utf8(output.into_inner()).unwrap();
        assert!(result.contains('\n'));
        assert!(result.contains("  ")); // Indentation
    }
}
