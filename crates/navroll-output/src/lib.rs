#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/navroll/navroll/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod export;
pub mod report;
pub mod runlog;
pub mod summary;
mod xlsx;

pub use export::{ExportError, ExportFormat, Exporter, write_report};
pub use report::{CategorySheet, Report, ReportBuilder, RollingReturnResult};
pub use runlog::RunLog;
pub use summary::RunSummary;
pub use xlsx::sheet_name;
