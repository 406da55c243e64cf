#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/navroll/navroll/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod calendar;
pub mod rolling;

pub use calendar::{AnchorDates, last_day_of_previous_month};
pub use rolling::{
    MissingReason, MonthlyRollingReturn, ReturnOutcome, RollingReturn, RollingReturnConfig,
    annualise,
};
