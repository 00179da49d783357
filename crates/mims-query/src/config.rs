//! Query and backfill configuration.

use std::time::Duration;

use crate::CoveragePolicy;

/// Configuration for [`QueryOrchestrator`](crate::QueryOrchestrator).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Deadline for a single candle fetch; `None` waits indefinitely.
    pub fetch_timeout: Option<Duration>,
    /// How the availability index is tested.
    pub coverage: CoveragePolicy,
}

impl OrchestratorConfig {
    /// Sets the candle fetch deadline.
    #[must_use]
    pub const fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = Some(timeout);
        self
    }

    /// Sets the coverage policy.
    #[must_use]
    pub const fn with_coverage(mut self, coverage: CoveragePolicy) -> Self {
        self.coverage = coverage;
        self
    }
}

/// Configuration for [`Backfill`](crate::Backfill).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackfillConfig {
    /// Deadline for each upstream feed call.
    pub timeout: Duration,
}

impl BackfillConfig {
    /// Default per-call deadline.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
}

impl Default for BackfillConfig {
    fn default() -> Self {
        Self {
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }
}
