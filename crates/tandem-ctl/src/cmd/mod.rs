//! CLI command modules.

pub mod http;
pub mod queue;
pub mod sessions;
pub mod status;
