//! Streaming row-to-bucket rollup.

use chrono::{DateTime, Utc};
use mims_types::{BucketWidth, Ohlcv};

/// Streaming bucket aggregator.
///
/// Rolls ascending base-resolution rows up into bars of the configured
/// width. Bucket boundaries are aligned to [`BucketWidth::epoch`].
#[derive(Debug)]
pub struct BucketAggregator {
    width: BucketWidth,
    current_bar: Option<BarBuilder>,
}

impl BucketAggregator {
    /// Creates a new aggregator for the given width.
    #[must_use]
    pub const fn new(width: BucketWidth) -> Self {
        Self {
            width,
            current_bar: None,
        }
    }

    /// Returns the width being aggregated to.
    #[must_use]
    pub const fn width(&self) -> BucketWidth {
        self.width
    }

    /// Processes a row, potentially emitting a completed bar.
    ///
    /// Rows must arrive in ascending timestamp order.
    pub fn process(&mut self, row: &Ohlcv) -> Option<Ohlcv> {
        let bucket = self.width.bucket_start(row.timestamp);

        match self.current_bar.take() {
            Some(mut builder) if builder.timestamp == bucket => {
                builder.update(row);
                self.current_bar = Some(builder);
                None
            }
            Some(builder) => {
                self.current_bar = Some(BarBuilder::new(bucket, row));
                Some(builder.finish())
            }
            None => {
                self.current_bar = Some(BarBuilder::new(bucket, row));
                None
            }
        }
    }

    /// Finishes aggregation, returning any remaining partial bar.
    #[must_use]
    pub fn finish(self) -> Option<Ohlcv> {
        self.current_bar.map(BarBuilder::finish)
    }
}

/// Rolls ascending `rows` up into bars of `width`.
///
/// Only buckets holding at least one row produce a bar.
pub fn rollup<'a, I>(rows: I, width: BucketWidth) -> Vec<Ohlcv>
where
    I: IntoIterator<Item = &'a Ohlcv>,
{
    let mut aggregator = BucketAggregator::new(width);
    let mut bars: Vec<Ohlcv> = rows
        .into_iter()
        .filter_map(|row| aggregator.process(row))
        .collect();
    bars.extend(aggregator.finish());
    bars
}

#[derive(Debug)]
struct BarBuilder {
    timestamp: DateTime<Utc>,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

impl BarBuilder {
    const fn new(timestamp: DateTime<Utc>, row: &Ohlcv) -> Self {
        Self {
            timestamp,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        }
    }

    fn update(&mut self, row: &Ohlcv) {
        self.high = self.high.max(row.high);
        self.low = self.low.min(row.low);
        self.close = row.close;
        self.volume += row.volume;
    }

    const fn finish(self) -> Ohlcv {
        Ohlcv::new(
            self.timestamp,
            self.open,
            self.high,
            self.low,
            self.close,
            self.volume,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{TimeDelta, TimeZone};

    fn row(minute: i64, open: f64, high: f64, low: f64, close: f64) -> Ohlcv {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Ohlcv::new(t0 + TimeDelta::minutes(minute), open, high, low, close, 1.0)
    }

    #[test]
    fn test_hourly_rollup() {
        let rows = [
            row(0, 10.0, 12.0, 9.0, 11.0),
            row(15, 11.0, 15.0, 10.0, 14.0),
            row(30, 14.0, 14.5, 8.0, 9.0),
            row(60, 9.0, 9.5, 8.5, 9.2),
        ];
        let hour = BucketWidth::from_minutes(60).unwrap();
        let bars = rollup(&rows, hour);

        assert_eq!(bars.len(), 2);
        let first = bars[0];
        assert_eq!(first.timestamp, rows[0].timestamp);
        assert_relative_eq!(first.open, 10.0);
        assert_relative_eq!(first.high, 15.0);
        assert_relative_eq!(first.low, 8.0);
        assert_relative_eq!(first.close, 9.0);
        assert_relative_eq!(first.volume, 3.0);
        assert_eq!(bars[1].timestamp, rows[3].timestamp);
    }

    #[test]
    fn test_empty_buckets_are_skipped() {
        let rows = [row(0, 1.0, 1.0, 1.0, 1.0), row(180, 2.0, 2.0, 2.0, 2.0)];
        let bars = rollup(&rows, BucketWidth::from_minutes(60).unwrap());
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[1].timestamp - bars[0].timestamp, TimeDelta::hours(3));
    }

    #[test]
    fn test_bucket_alignment_from_epoch() {
        // 2024-01-01 is a Monday, so weekly buckets start there
        let rows = [row(0, 1.0, 1.0, 1.0, 1.0), row(60 * 24 * 3, 2.0, 2.0, 2.0, 2.0)];
        let week = BucketWidth::from_minutes(7 * 24 * 60).unwrap();
        let bars = rollup(&rows, week);
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].timestamp, rows[0].timestamp);
        assert_relative_eq!(bars[0].close, 2.0);
    }

    #[test]
    fn test_streaming_emits_on_boundary() {
        let mut agg = BucketAggregator::new(BucketWidth::from_minutes(30).unwrap());
        assert!(agg.process(&row(0, 1.0, 1.0, 1.0, 1.0)).is_none());
        assert!(agg.process(&row(15, 2.0, 2.0, 2.0, 2.0)).is_none());
        let done = agg.process(&row(30, 3.0, 3.0, 3.0, 3.0)).unwrap();
        assert_relative_eq!(done.close, 2.0);
        assert_relative_eq!(agg.finish().unwrap().open, 3.0);
    }
}
