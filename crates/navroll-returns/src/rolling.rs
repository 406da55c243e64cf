//! Annualised one-month rolling return.
//!
//! The window runs between the last NAVs of the two most recent completed
//! months. The return over that window is scaled to a 365-day rate with
//! simple (non-compounded) annualisation.

use crate::calendar::AnchorDates;
use chrono::NaiveDate;
use derive_more::Display;
use navroll_data::{NavHistory, NavPoint};
use serde::{Deserialize, Serialize};

/// Why a rolling return could not be computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingReason {
    /// No NAV on or before the end of the previous month.
    #[display("no NAV on or before the previous month end")]
    NoNavBeforeT1,
    /// History does not reach back to the month end before that.
    #[display("history does not reach back two month ends")]
    NoNavBeforeT0,
    /// Both anchors resolve to the same NAV (no data in the latest month).
    #[display("fewer than two distinct trailing months")]
    NoDistinctMonths,
    /// The starting NAV is zero.
    #[display("NAV at t0 is zero")]
    ZeroStartNav,
    /// The arithmetic produced NaN or infinity.
    #[display("return is not a finite number")]
    NonFinite,
}

/// Result of the return computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum ReturnOutcome {
    /// Annualised return as a fraction (0.24 = 24%).
    Computed(f64),
    /// No meaningful value.
    Missing(MissingReason),
}

/// Simple annualisation of the return between two NAVs `days` apart.
///
/// Returns `None` when `days` is not positive, `start_nav` is zero, or the
/// result is not finite.
pub fn annualise(start_nav: f64, end_nav: f64, days: i64, days_in_year: f64) -> Option<f64> {
    if days <= 0 || start_nav == 0.0 {
        return None;
    }
    let value = ((end_nav - start_nav) / start_nav) * (days_in_year / days as f64);
    value.is_finite().then_some(value)
}

/// Configuration for [`MonthlyRollingReturn`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollingReturnConfig {
    /// Day count used for annualisation (default: 365)
    pub days_in_year: f64,
}

impl Default for RollingReturnConfig {
    fn default() -> Self {
        Self {
            days_in_year: 365.0,
        }
    }
}

/// A rolling return together with the anchors it was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RollingReturn {
    /// Calendar targets used to resolve the anchors.
    pub anchors: AnchorDates,
    /// NAV at the start of the window, when one exists.
    pub t0: Option<NavPoint>,
    /// NAV at the end of the window, when one exists.
    pub t1: Option<NavPoint>,
    /// Computed value or reason it is missing.
    pub outcome: ReturnOutcome,
}

impl RollingReturn {
    /// The annualised return, if computed.
    pub const fn value(&self) -> Option<f64> {
        match self.outcome {
            ReturnOutcome::Computed(v) => Some(v),
            ReturnOutcome::Missing(_) => None,
        }
    }

    /// The reason the return is missing, if it is.
    pub const fn missing_reason(&self) -> Option<MissingReason> {
        match self.outcome {
            ReturnOutcome::Computed(_) => None,
            ReturnOutcome::Missing(reason) => Some(reason),
        }
    }

    /// Days between the two anchors, when both resolved.
    pub fn days(&self) -> Option<i64> {
        match (self.t0, self.t1) {
            (Some(t0), Some(t1)) => Some((t1.date - t0.date).num_days()),
            _ => None,
        }
    }
}

/// Calculator for the annualised one-month rolling return.
#[derive(Debug, Default)]
pub struct MonthlyRollingReturn {
    config: RollingReturnConfig,
}

impl MonthlyRollingReturn {
    /// Create a calculator with the 365-day convention.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a calculator with a custom configuration.
    pub const fn with_config(config: RollingReturnConfig) -> Self {
        Self { config }
    }

    /// Compute the rolling return of `history` as seen on `reference`.
    pub fn compute(&self, history: &NavHistory, reference: NaiveDate) -> RollingReturn {
        let anchors = AnchorDates::for_reference(reference);
        let t1 = history.last_on_or_before(anchors.t1_target);
        let t0 = history.last_on_or_before(anchors.t0_target);

        let outcome = match (t0, t1) {
            (_, None) => ReturnOutcome::Missing(MissingReason::NoNavBeforeT1),
            (None, Some(_)) => ReturnOutcome::Missing(MissingReason::NoNavBeforeT0),
            (Some(t0), Some(t1)) => self.outcome_between(t0, t1),
        };

        RollingReturn {
            anchors,
            t0,
            t1,
            outcome,
        }
    }

    fn outcome_between(&self, t0: NavPoint, t1: NavPoint) -> ReturnOutcome {
        let days = (t1.date - t0.date).num_days();
        if days <= 0 {
            return ReturnOutcome::Missing(MissingReason::NoDistinctMonths);
        }
        if t0.nav == 0.0 {
            return ReturnOutcome::Missing(MissingReason::ZeroStartNav);
        }

        annualise(t0.nav, t1.nav, days, self.config.days_in_year).map_or(
            ReturnOutcome::Missing(MissingReason::NonFinite),
            ReturnOutcome::Computed,
        )
    }
}
