//! Wire request and validation.

use chrono::{DateTime, TimeDelta, Timelike, Utc};
use mims_types::{BucketWidth, Indicator, IndicatorSpec, Interval, ValidationError};
use serde::{Deserialize, Serialize};

/// A market-data query as received on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketDataRequest {
    /// Base asset symbol.
    pub base: String,
    /// Quote asset symbol.
    pub quote: String,
    /// Broker name.
    pub broker: String,
    /// Exclusive lower bound of the returned bars.
    pub start: DateTime<Utc>,
    /// Inclusive upper bound of the returned bars.
    pub end: DateTime<Utc>,
    /// Bucket width as an ISO-8601 duration.
    pub interval: String,
    /// Indicators to compute; absent means none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indicators: Option<Vec<IndicatorSpec>>,
}

impl MarketDataRequest {
    /// Validates the request against the clock reading `now`.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule: 15-minute alignment, instants in the
    /// past, end after start, bucket width policy, bucket width within the
    /// range, non-empty indicator list, and per-indicator parameter sets.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<ValidatedQuery, ValidationError> {
        check_instant("start", self.start, now)?;
        check_instant("end", self.end, now)?;
        if self.end <= self.start {
            return Err(ValidationError::EndBeforeStart);
        }
        let range = Interval::new(self.start, self.end)?;

        let width: BucketWidth = self
            .interval
            .parse()
            .map_err(|e: mims_types::BucketWidthParseError| ValidationError::BucketWidth(e.to_string()))?;
        if width < BucketWidth::FIFTEEN_MINUTES
            || width > BucketWidth::MAX
            || !width.is_quarter_hour_multiple()
        {
            return Err(ValidationError::BucketWidthOutOfPolicy(self.interval.clone()));
        }
        if width.as_delta().is_none_or(|w| w > range.duration()) {
            return Err(ValidationError::BucketWiderThanRange);
        }

        let indicators = match &self.indicators {
            None => Vec::new(),
            Some(specs) if specs.is_empty() => return Err(ValidationError::EmptyIndicators),
            Some(specs) => specs
                .iter()
                .map(Indicator::try_from)
                .collect::<Result<Vec<_>, _>>()?,
        };

        Ok(ValidatedQuery {
            base: self.base.clone(),
            quote: self.quote.clone(),
            broker: self.broker.clone(),
            range,
            width,
            indicators,
        })
    }
}

fn check_instant(
    field: &'static str,
    value: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<(), ValidationError> {
    if value.minute() % 15 != 0 {
        return Err(ValidationError::Misaligned { field, value });
    }
    if value >= now {
        return Err(ValidationError::NotInPast { field, value });
    }
    Ok(())
}

/// A request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedQuery {
    /// Base asset symbol.
    pub base: String,
    /// Quote asset symbol.
    pub quote: String,
    /// Broker name.
    pub broker: String,
    /// Requested `[start, end]`.
    pub range: Interval,
    /// Bucket width.
    pub width: BucketWidth,
    /// Typed indicators, in request order.
    pub indicators: Vec<Indicator>,
}

impl ValidatedQuery {
    /// Returns the warm-up span: the bucket width times the largest
    /// parameter value across all indicators.
    ///
    /// Zero when no indicators were requested; `None` if the span does
    /// not fit in a [`TimeDelta`].
    #[must_use]
    pub fn lookback(&self) -> Option<TimeDelta> {
        lookback(self.width, &self.indicators)
    }
}

pub(crate) fn lookback(width: BucketWidth, indicators: &[Indicator]) -> Option<TimeDelta> {
    indicators
        .iter()
        .flat_map(Indicator::parameters)
        .map(|p| p.value)
        .max()
        .map_or(Some(TimeDelta::zero()), |periods| width.times(periods))
}
