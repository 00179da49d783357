//! Candle bucket widths.

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Minutes in a calendar-agnostic month (365 / 12 days).
pub const MINUTES_PER_MONTH: u64 = 43_800;

/// Minutes in a calendar-agnostic year.
pub const MINUTES_PER_YEAR: u64 = 525_600;

const MINUTES_PER_WEEK: u64 = 10_080;
const MINUTES_PER_DAY: u64 = 1_440;
const MINUTES_PER_HOUR: u64 = 60;

/// The duration each rolled-up candle represents.
///
/// Stored as a whole number of minutes. Parsed from ISO-8601 durations
/// (`PT15M`, `PT4H`, `P1D`, `P1M`) or short forms (`15m`, `4h`, `1d`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BucketWidth {
    minutes: u64,
}

impl BucketWidth {
    /// Fifteen minutes, the finest alignment the service accepts.
    pub const FIFTEEN_MINUTES: Self = Self { minutes: 15 };

    /// Largest width accepted by query validation (four months).
    pub const MAX: Self = Self {
        minutes: 4 * MINUTES_PER_MONTH,
    };

    /// Alignment origin for bucket boundaries (`2000-01-03T00:00:00Z`).
    #[must_use]
    pub fn epoch() -> DateTime<Utc> {
        Utc.timestamp_opt(946_857_600, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }

    /// Creates a width from a number of minutes.
    ///
    /// Returns `None` for zero.
    #[must_use]
    pub const fn from_minutes(minutes: u64) -> Option<Self> {
        if minutes == 0 {
            None
        } else {
            Some(Self { minutes })
        }
    }

    /// Returns the width in minutes.
    #[must_use]
    pub const fn minutes(&self) -> u64 {
        self.minutes
    }

    /// Returns the width as a signed time delta.
    ///
    /// `None` if the width exceeds the range of [`TimeDelta`].
    #[must_use]
    pub fn as_delta(&self) -> Option<TimeDelta> {
        TimeDelta::try_minutes(i64::try_from(self.minutes).ok()?)
    }

    /// Returns the span covered by `count` consecutive buckets.
    ///
    /// `None` if the span exceeds the range of [`TimeDelta`].
    #[must_use]
    pub fn times(&self, count: u32) -> Option<TimeDelta> {
        let minutes = self.minutes.checked_mul(u64::from(count))?;
        TimeDelta::try_minutes(i64::try_from(minutes).ok()?)
    }

    /// Returns true if the width is a whole multiple of fifteen minutes.
    #[must_use]
    pub const fn is_quarter_hour_multiple(&self) -> bool {
        self.minutes % 15 == 0
    }

    /// Returns the start of the bucket containing `timestamp`.
    ///
    /// Buckets are laid end to end from [`BucketWidth::epoch`].
    #[must_use]
    pub fn bucket_start(&self, timestamp: DateTime<Utc>) -> DateTime<Utc> {
        let epoch = Self::epoch();
        let width_secs = i64::try_from(self.minutes.saturating_mul(60)).unwrap_or(i64::MAX);
        let offset = (timestamp - epoch).num_seconds();
        let buckets = offset.div_euclid(width_secs);
        epoch + TimeDelta::seconds(buckets * width_secs)
    }
}

impl std::fmt::Display for BucketWidth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let days = self.minutes / MINUTES_PER_DAY;
        let hours = self.minutes % MINUTES_PER_DAY / MINUTES_PER_HOUR;
        let minutes = self.minutes % MINUTES_PER_HOUR;

        write!(f, "P")?;
        if days > 0 {
            write!(f, "{days}D")?;
        }
        if hours > 0 || minutes > 0 {
            write!(f, "T")?;
            if hours > 0 {
                write!(f, "{hours}H")?;
            }
            if minutes > 0 {
                write!(f, "{minutes}M")?;
            }
        }
        Ok(())
    }
}

impl FromStr for BucketWidth {
    type Err = BucketWidthParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let minutes = if trimmed.starts_with(['P', 'p']) {
            parse_iso8601(trimmed)
        } else {
            parse_short(trimmed)
        }
        .ok_or_else(|| BucketWidthParseError(s.to_string()))?;

        Self::from_minutes(minutes).ok_or_else(|| BucketWidthParseError(s.to_string()))
    }
}

impl TryFrom<String> for BucketWidth {
    type Error = BucketWidthParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BucketWidth> for String {
    fn from(width: BucketWidth) -> Self {
        width.to_string()
    }
}

/// Parses `P[nY][nM][nW][nD][T[nH][nM][nS]]` into whole minutes.
fn parse_iso8601(s: &str) -> Option<u64> {
    let body = &s[1..];
    let (date_part, time_part) = match body.split_once(['T', 't']) {
        Some((date, time)) if !time.is_empty() => (date, Some(time)),
        Some(_) => return None,
        None => (body, None),
    };

    let mut total_seconds: u64 = 0;
    let mut any = false;

    for (value, unit) in designators(date_part)? {
        let minutes = match unit {
            'Y' => MINUTES_PER_YEAR,
            'M' => MINUTES_PER_MONTH,
            'W' => MINUTES_PER_WEEK,
            'D' => MINUTES_PER_DAY,
            _ => return None,
        };
        total_seconds = total_seconds.checked_add(value.checked_mul(minutes * 60)?)?;
        any = true;
    }

    if let Some(time) = time_part {
        for (value, unit) in designators(time)? {
            let seconds = match unit {
                'H' => 3_600,
                'M' => 60,
                'S' => 1,
                _ => return None,
            };
            total_seconds = total_seconds.checked_add(value.checked_mul(seconds)?)?;
            any = true;
        }
    }

    if !any || total_seconds % 60 != 0 {
        return None;
    }
    Some(total_seconds / 60)
}

/// Splits `12H30M` into `[(12, 'H'), (30, 'M')]`.
fn designators(s: &str) -> Option<Vec<(u64, char)>> {
    let mut out = Vec::new();
    let mut digits = String::new();

    for c in s.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
        } else {
            if digits.is_empty() {
                return None;
            }
            out.push((digits.parse().ok()?, c.to_ascii_uppercase()));
            digits.clear();
        }
    }

    if digits.is_empty() { Some(out) } else { None }
}

/// Parses short forms such as `15m`, `4h`, `1d`, `1w`.
fn parse_short(s: &str) -> Option<u64> {
    let split = s.find(|c: char| !c.is_ascii_digit())?;
    let (value, unit) = s.split_at(split);
    let value: u64 = value.parse().ok()?;
    let per_unit = match unit {
        "m" | "min" => 1,
        "h" | "H" => MINUTES_PER_HOUR,
        "d" | "D" => MINUTES_PER_DAY,
        "w" | "W" => MINUTES_PER_WEEK,
        "M" | "mo" => MINUTES_PER_MONTH,
        _ => return None,
    };
    value.checked_mul(per_unit)
}

/// Error returned when parsing an invalid bucket width string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketWidthParseError(String);

impl std::fmt::Display for BucketWidthParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid bucket width '{}', expected an ISO-8601 duration such as PT15M, PT1H or P1D",
            self.0
        )
    }
}

impl std::error::Error for BucketWidthParseError {}
