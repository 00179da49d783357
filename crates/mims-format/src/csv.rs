//! CSV output format.

use std::io::Write;

use mims_types::{Annotation, Candle, FibLevels, IndicatorKind, IndicatorRegistration, QueryResponse};

use crate::formatter::iso_millis;
use crate::{FormatError, Formatter};

/// CSV formatter.
///
/// Structured annotations are flattened: a Bollinger key `k` becomes
/// `k_upper` and `k_lower`, a Fibonacci key becomes `k_0`, `k_23.6`, ...
/// `k_100`. Null values are written as empty cells.
#[derive(Debug, Clone)]
pub struct CsvFormatter {
    /// Field delimiter (default: comma).
    delimiter: char,
    /// Whether to include header row.
    include_header: bool,
}

impl Default for CsvFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvFormatter {
    /// Creates a new CSV formatter with default settings.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            delimiter: ',',
            include_header: true,
        }
    }

    /// Sets the field delimiter.
    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets whether to include a header row.
    #[must_use]
    pub const fn with_header(mut self, include: bool) -> Self {
        self.include_header = include;
        self
    }

    /// Creates a tab-separated values (TSV) formatter.
    #[must_use]
    pub const fn tsv() -> Self {
        Self {
            delimiter: '\t',
            include_header: true,
        }
    }
}

/// How one registration spreads over columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Scalar,
    Band,
    Levels,
}

impl Shape {
    fn of(registration: &IndicatorRegistration) -> Self {
        match IndicatorKind::from_id(registration.indicator_id) {
            Some(IndicatorKind::Bollinger) => Self::Band,
            Some(IndicatorKind::Fib) => Self::Levels,
            _ => Self::Scalar,
        }
    }

    fn headers(self, key: &str) -> Vec<String> {
        match self {
            Self::Scalar => vec![key.to_string()],
            Self::Band => vec![format!("{key}_upper"), format!("{key}_lower")],
            Self::Levels => FibLevels::LABELS
                .iter()
                .map(|label| format!("{key}_{label}"))
                .collect(),
        }
    }

    fn cells(self, annotation: Option<&Annotation>) -> Vec<String> {
        let width = match self {
            Self::Scalar => 1,
            Self::Band => 2,
            Self::Levels => FibLevels::LABELS.len(),
        };
        let values: Vec<f64> = match (self, annotation) {
            (Self::Scalar, Some(Annotation::Scalar { value: Some(v) })) => vec![*v],
            (Self::Band, Some(Annotation::Band(band))) => vec![band.upper, band.lower],
            (Self::Levels, Some(Annotation::Levels(levels))) => {
                levels.labelled().iter().map(|(_, v)| *v).collect()
            }
            _ => return vec![String::new(); width],
        };
        values.iter().map(f64::to_string).collect()
    }
}

impl Formatter for CsvFormatter {
    fn write_response<W: Write + Send>(
        &self,
        response: &QueryResponse,
        mut writer: W,
    ) -> Result<(), FormatError> {
        let d = self.delimiter.to_string();
        let columns: Vec<(&IndicatorRegistration, Shape)> = response
            .indicators
            .iter()
            .map(|r| (r, Shape::of(r)))
            .collect();

        if self.include_header {
            let mut header: Vec<String> = ["timestamp", "open", "high", "low", "close", "volume"]
                .iter()
                .map(ToString::to_string)
                .collect();
            for (registration, shape) in &columns {
                header.extend(shape.headers(registration.key.as_str()));
            }
            writeln!(writer, "{}", header.join(&d))?;
        }

        for bar in &response.bars {
            writeln!(writer, "{}", row(bar, &columns).join(&d))?;
        }

        Ok(())
    }

    fn extension(&self) -> &str {
        "csv"
    }
}

fn row(bar: &Candle, columns: &[(&IndicatorRegistration, Shape)]) -> Vec<String> {
    let mut cells = vec![
        iso_millis(&bar.timestamp),
        bar.open.to_string(),
        bar.high.to_string(),
        bar.low.to_string(),
        bar.close.to_string(),
        bar.volume.to_string(),
    ];
    for (registration, shape) in columns {
        cells.extend(shape.cells(bar.annotations.get(&registration.key)));
    }
    cells
}
