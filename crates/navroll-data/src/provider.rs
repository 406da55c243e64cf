//! Source-agnostic access to NAV histories.

use crate::error::Result;
use crate::mfapi::SchemeMeta;
use crate::nav::{NavHistory, SchemeCode};
use std::future::Future;

/// NAV history of one scheme together with whatever metadata the source had.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemeNav {
    /// Scheme the history belongs to.
    pub scheme_code: SchemeCode,
    /// Source metadata, when provided.
    pub meta: Option<SchemeMeta>,
    /// Sorted NAV history.
    pub history: NavHistory,
}

/// Trait for anything that can produce the NAV history of a scheme.
pub trait NavProvider {
    /// Fetch the full NAV history for `scheme_code`.
    ///
    /// # Errors
    ///
    /// Returns an error if the history cannot be retrieved or contains no
    /// usable points.
    fn fetch_nav_history(
        &self,
        scheme_code: &SchemeCode,
    ) -> impl Future<Output = Result<SchemeNav>> + Send;
}
