//! mfapi.in NAV data source.
//!
//! Every scheme is served at `GET {base}/mf/{scheme_code}` with its full
//! NAV history. No authentication, no paging.

pub mod client;
pub mod response;

pub use client::{MfApiClient, MfApiConfig};
pub use response::{SchemeMeta, parse_nav_response};
