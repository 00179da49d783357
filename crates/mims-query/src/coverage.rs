//! Availability checks over a pair's ingested ranges.

use mims_types::Interval;

/// How a requested interval is tested against known ranges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CoveragePolicy {
    /// Covered only if a single known range encloses the request.
    ///
    /// A request spanning two touching ranges is reported as not covered.
    #[default]
    PerRange,
    /// Covered if the merged known ranges enclose the request.
    Union,
}

/// Decides whether ingested history covers a requested interval.
#[derive(Debug, Clone, Copy, Default)]
pub struct AvailabilityTracker {
    policy: CoveragePolicy,
}

impl AvailabilityTracker {
    /// Creates a tracker with the given policy.
    #[must_use]
    pub const fn new(policy: CoveragePolicy) -> Self {
        Self { policy }
    }

    /// Returns the policy in use.
    #[must_use]
    pub const fn policy(&self) -> CoveragePolicy {
        self.policy
    }

    /// Returns true if `known` covers `requested` under the configured policy.
    #[must_use]
    pub fn is_covered(&self, requested: &Interval, known: &[Interval]) -> bool {
        match self.policy {
            CoveragePolicy::PerRange => covered_by_one(requested, known),
            CoveragePolicy::Union => {
                covered_by_one(requested, &Interval::combine(known.iter().copied()))
            }
        }
    }

    /// Returns the parts of `requested` no known range covers, ascending.
    ///
    /// Gaps are closed intervals, so they share their endpoints with the
    /// neighbouring known ranges.
    #[must_use]
    pub fn gaps(requested: &Interval, known: &[Interval]) -> Vec<Interval> {
        let mut gaps = known.iter().fold(vec![*requested], |pieces, range| {
            pieces
                .iter()
                .flat_map(|piece| piece.subtract(range))
                .collect()
        });
        gaps.sort_unstable();
        gaps
    }
}

fn covered_by_one(requested: &Interval, known: &[Interval]) -> bool {
    known
        .iter()
        .any(|range| requested.subtract(range).is_empty())
}
