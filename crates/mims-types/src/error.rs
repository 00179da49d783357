//! Error types for mims.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{IndicatorKind, Interval, PairId};

/// Result type alias for mims operations.
pub type Result<T> = std::result::Result<T, MimsError>;

/// Errors surfaced by the query and ingestion paths.
///
/// Every variant is terminal for the request; nothing is retried internally.
#[derive(Error, Debug)]
pub enum MimsError {
    /// Malformed or out-of-policy request.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The base/quote/broker triple (or another identity) does not resolve.
    #[error("Not found: {what}")]
    NotFound {
        /// Description of the missing resource.
        what: String,
    },

    /// The pair exists but ingested history does not cover the range.
    #[error("No ingested data for pair {pair_id} covering {requested}")]
    DataUnavailable {
        /// The pair that lacks data.
        pair_id: PairId,
        /// The (lookback-widened) range that was checked.
        requested: Interval,
    },

    /// An upstream feed call failed or timed out.
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Repository failure.
    #[error("Store error: {0}")]
    Store(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MimsError {
    /// Builds a `NotFound` error.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Returns the distinguishing kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::DataUnavailable { .. } => ErrorKind::DataUnavailable,
            Self::UpstreamUnavailable(_) => ErrorKind::UpstreamUnavailable,
            Self::Store(_) | Self::Io(_) | Self::Json(_) => ErrorKind::Internal,
        }
    }
}

impl From<IntervalError> for MimsError {
    fn from(err: IntervalError) -> Self {
        Self::Validation(ValidationError::Interval(err))
    }
}

/// Coarse error classification for transport layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Client sent a bad request.
    Validation,
    /// Unknown identity.
    NotFound,
    /// Known pair, missing history; backfill then retry.
    DataUnavailable,
    /// Upstream feed failure.
    UpstreamUnavailable,
    /// Anything else.
    Internal,
}

impl ErrorKind {
    /// Returns the HTTP status an API layer should answer with.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::Validation => 400,
            Self::NotFound => 404,
            Self::DataUnavailable => 409,
            Self::UpstreamUnavailable => 503,
            Self::Internal => 500,
        }
    }
}

/// Request shape or policy violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Instant not aligned to a 15-minute boundary.
    #[error("Invalid {field} date {value}, minute must be a multiple of 15")]
    Misaligned {
        /// Field name (`start` or `end`).
        field: &'static str,
        /// The offending instant.
        value: DateTime<Utc>,
    },

    /// Instant not strictly before now.
    #[error("Invalid {field} date {value}, must be before now")]
    NotInPast {
        /// Field name.
        field: &'static str,
        /// The offending instant.
        value: DateTime<Utc>,
    },

    /// End is not after start.
    #[error("End date must be after start date")]
    EndBeforeStart,

    /// Invalid interval endpoints.
    #[error(transparent)]
    Interval(#[from] IntervalError),

    /// Bucket width could not be parsed.
    #[error("{0}")]
    BucketWidth(String),

    /// Bucket width outside 15 minutes .. 4 months or not a multiple of 15 minutes.
    #[error("Invalid interval {0}, must be between 15m and 4M and multiple of 15m")]
    BucketWidthOutOfPolicy(String),

    /// Bucket width longer than the requested range.
    #[error("Interval must be inferior to the difference between start and end")]
    BucketWiderThanRange,

    /// Indicator list present but empty.
    #[error("Indicator list must not be empty")]
    EmptyIndicators,

    /// Unknown indicator name.
    #[error("Unknown indicator: {0}")]
    UnknownIndicator(String),

    /// Wrong parameter names or arity.
    #[error("Invalid parameters for {indicator}, expected exactly: {expected}")]
    ParameterSet {
        /// Indicator family.
        indicator: IndicatorKind,
        /// Comma-separated required names.
        expected: String,
    },

    /// Parameter value of zero.
    #[error("Parameter {parameter} of {indicator} must be a positive integer")]
    NonPositiveParameter {
        /// Indicator family.
        indicator: IndicatorKind,
        /// Parameter name.
        parameter: String,
    },
}

/// Error for invalid intervals.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntervalError {
    /// Start is after end.
    #[error("Invalid interval: {start} > {end}")]
    Inverted {
        /// The start instant.
        start: DateTime<Utc>,
        /// The end instant.
        end: DateTime<Utc>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_kinds_and_statuses() {
        let t = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let unavailable = MimsError::DataUnavailable {
            pair_id: PairId::new_v4(),
            requested: Interval::point(t),
        };
        assert_eq!(unavailable.kind(), ErrorKind::DataUnavailable);
        assert_eq!(unavailable.kind().http_status(), 409);

        let not_found = MimsError::not_found("pair BTC/USD@COINBASE");
        assert_eq!(not_found.kind().http_status(), 404);

        let invalid: MimsError = ValidationError::EmptyIndicators.into();
        assert_eq!(invalid.kind(), ErrorKind::Validation);
        assert_eq!(
            MimsError::UpstreamUnavailable("feed".into()).kind().http_status(),
            503
        );
    }

    #[test]
    fn test_interval_error_is_validation() {
        let a = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let err: MimsError = Interval::new(a, b).unwrap_err().into();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
