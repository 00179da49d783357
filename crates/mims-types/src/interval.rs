//! Closed time intervals and the coverage algebra built on them.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::IntervalError;

/// A closed interval of UTC instants.
///
/// Both endpoints are inclusive, so two intervals that merely touch at a
/// boundary are considered overlapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawInterval")]
pub struct Interval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

#[derive(Deserialize)]
struct RawInterval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TryFrom<RawInterval> for Interval {
    type Error = IntervalError;

    fn try_from(raw: RawInterval) -> Result<Self, Self::Error> {
        Self::new(raw.start, raw.end)
    }
}

impl Interval {
    /// Creates a new interval, validating that `start <= end`.
    ///
    /// # Errors
    ///
    /// Returns an error if `start > end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, IntervalError> {
        if start > end {
            return Err(IntervalError::Inverted { start, end });
        }
        Ok(Self { start, end })
    }

    /// Creates an interval covering a single instant.
    #[must_use]
    pub const fn point(instant: DateTime<Utc>) -> Self {
        Self {
            start: instant,
            end: instant,
        }
    }

    /// Returns the inclusive start.
    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Returns the inclusive end.
    #[must_use]
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Returns the length of the interval.
    #[must_use]
    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    /// Returns true if the interval has zero length.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.start == self.end
    }

    /// Returns true if `instant` lies within the closed span.
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant <= self.end
    }

    /// Returns true if `other` lies entirely within this interval.
    #[must_use]
    pub fn encloses(&self, other: &Self) -> bool {
        self.contains(other.start) && self.contains(other.end)
    }

    /// Returns true if any endpoint of one interval lies within the other.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.contains(other.start)
            || self.contains(other.end)
            || other.contains(self.start)
            || other.contains(self.end)
    }

    /// Removes `other` from this interval.
    ///
    /// Yields zero, one or two intervals. Boundary-coincident cuts never
    /// produce a degenerate remainder.
    #[must_use]
    pub fn subtract(&self, other: &Self) -> Vec<Self> {
        if !self.overlaps(other) {
            return vec![*self];
        }

        match (other.contains(self.start), other.contains(self.end)) {
            (true, true) => Vec::new(),
            (true, false) => vec![Self {
                start: other.end,
                end: self.end,
            }],
            (false, true) => vec![Self {
                start: self.start,
                end: other.start,
            }],
            // Overlapping with neither endpoint of `self` inside `other`
            // means `other` sits strictly inside `self`.
            (false, false) => vec![
                Self {
                    start: self.start,
                    end: other.start,
                },
                Self {
                    start: other.end,
                    end: self.end,
                },
            ],
        }
    }

    /// Merges two intervals.
    ///
    /// Disjoint inputs come back unchanged as a pair; overlapping inputs
    /// collapse into their enclosing interval.
    #[must_use]
    pub fn union(&self, other: &Self) -> Vec<Self> {
        if self.overlaps(other) {
            vec![self.hull(other)]
        } else {
            vec![*self, *other]
        }
    }

    /// Returns the smallest interval enclosing both inputs.
    #[must_use]
    pub fn hull(&self, other: &Self) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Folds arbitrary intervals into a sorted, pairwise disjoint, minimal list.
    ///
    /// The result does not depend on input order.
    #[must_use]
    pub fn combine<I>(intervals: I) -> Vec<Self>
    where
        I: IntoIterator<Item = Self>,
    {
        let mut combined = intervals.into_iter().fold(Vec::new(), absorb);
        combined.sort_unstable();
        combined
    }
}

/// Adds `interval` to an accumulator of disjoint intervals, returning the new
/// accumulator.
fn absorb(accumulated: Vec<Interval>, interval: Interval) -> Vec<Interval> {
    let (overlapping, mut disjoint): (Vec<_>, Vec<_>) = accumulated
        .into_iter()
        .partition(|existing| existing.overlaps(&interval));

    let merged = overlapping
        .iter()
        .fold(interval, |merged, existing| merged.hull(existing));
    disjoint.push(merged);
    disjoint
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}, {}]",
            self.start.format("%Y-%m-%dT%H:%M:%SZ"),
            self.end.format("%Y-%m-%dT%H:%M:%SZ")
        )
    }
}

/// A minimal set of closed intervals.
///
/// Always sorted, pairwise disjoint and non-adjacent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Interval>", into = "Vec<Interval>")]
pub struct IntervalSet {
    intervals: Vec<Interval>,
}

impl IntervalSet {
    /// Creates an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            intervals: Vec::new(),
        }
    }

    /// Returns a new set with `interval` merged in.
    #[must_use]
    pub fn with(&self, interval: Interval) -> Self {
        Self {
            intervals: Interval::combine(self.intervals.iter().copied().chain([interval])),
        }
    }

    /// Returns true if a single member encloses `interval`.
    #[must_use]
    pub fn covers(&self, interval: &Interval) -> bool {
        self.intervals.iter().any(|member| member.encloses(interval))
    }

    /// Returns the members in ascending order.
    #[must_use]
    pub fn as_slice(&self) -> &[Interval] {
        &self.intervals
    }

    /// Returns an iterator over the members.
    pub fn iter(&self) -> std::slice::Iter<'_, Interval> {
        self.intervals.iter()
    }

    /// Returns the number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    /// Returns true if the set has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }
}

impl FromIterator<Interval> for IntervalSet {
    fn from_iter<I: IntoIterator<Item = Interval>>(iter: I) -> Self {
        Self {
            intervals: Interval::combine(iter),
        }
    }
}

impl From<Vec<Interval>> for IntervalSet {
    fn from(intervals: Vec<Interval>) -> Self {
        intervals.into_iter().collect()
    }
}

impl From<IntervalSet> for Vec<Interval> {
    fn from(set: IntervalSet) -> Self {
        set.intervals
    }
}

impl<'a> IntoIterator for &'a IntervalSet {
    type Item = &'a Interval;
    type IntoIter = std::slice::Iter<'a, Interval>;

    fn into_iter(self) -> Self::IntoIter {
        self.intervals.iter()
    }
}
