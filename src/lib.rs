//! Fitness Profile Manager Library
//!
//! Normalizes profile measurements and estimates body fat, BMR and TDEE.
//! The entry point for every profile write is
//! [`pipeline::process_profile_write`].

pub mod build_info;
pub mod config;
pub mod db;
pub mod error;
pub mod estimation;
pub mod mcp;
pub mod measurement;
pub mod models;
pub mod pipeline;
pub mod tools;

pub use error::ValidationError;
pub use pipeline::{process_profile_write, ProfileFields, ProfileInput, ProfileUpdate};
