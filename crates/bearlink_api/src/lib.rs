//! Agent-facing boundary for bearlink.
//!
//! Wraps the core note service so every operation yields a
//! [`ToolResponse`] and nothing escapes as a panic or raw error.

pub mod api;
pub mod request;

pub use api::{BearApi, SystemApi, ToolResponse};
pub use request::ToolRequest;
