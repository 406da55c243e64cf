#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/navroll/navroll/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod mfapi;
pub mod nav;
pub mod provider;

pub use error::{DataError, Result};
pub use mfapi::{MfApiClient, MfApiConfig, SchemeMeta, parse_nav_response};
pub use nav::{NavHistory, NavPoint, SchemeCode};
pub use provider::{NavProvider, SchemeNav};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
