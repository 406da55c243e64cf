//! Run orchestration for the navroll CLI.
//!
//! Path resolution for the registry, run log and outputs, and the batch
//! pipeline that turns a registry into report rows.

pub(crate) mod paths;
pub(crate) mod pipeline;
