//! Tools module
//!
//! MCP tool implementations for the Fitness Profile Manager.

pub mod profiles;
pub mod status;
