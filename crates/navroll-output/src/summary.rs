//! Run summary counts.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Counts of how each scheme in a run ended up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Schemes with a code that the run attempted.
    pub total: usize,
    /// Schemes with a computed return.
    pub computed: usize,
    /// Schemes fetched but with a missing return.
    pub missing: usize,
    /// Schemes whose fetch failed (excluded from the report).
    pub skipped: usize,
    /// Registry entries without a scheme code.
    pub unconfigured: usize,
}

impl RunSummary {
    /// Create an empty summary for `total` schemes.
    pub const fn new(total: usize) -> Self {
        Self {
            total,
            computed: 0,
            missing: 0,
            skipped: 0,
            unconfigured: 0,
        }
    }

    /// Schemes that made it into the report.
    pub const fn reported(&self) -> usize {
        self.computed + self.missing
    }

    /// Whether every attempted scheme was accounted for.
    pub const fn is_consistent(&self) -> bool {
        self.computed + self.missing + self.skipped == self.total
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "processed {}: {} computed, {} missing, {} skipped",
            self.total, self.computed, self.missing, self.skipped
        )?;
        if self.unconfigured > 0 {
            write!(f, ", {} without scheme code", self.unconfigured)?;
        }
        Ok(())
    }
}
