#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/navroll/navroll/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod registry;

// Re-export main types from sub-crates
pub use navroll_data as data;
pub use navroll_output as output;
pub use navroll_returns as returns;

pub use registry::{RegistryError, SchemeRegistry, SchemeRegistryEntry, UnconfiguredScheme};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
