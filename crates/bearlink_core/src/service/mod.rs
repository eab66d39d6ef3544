//! Core use-case services.
//!
//! # Responsibility
//! - Combine the read path and the write path per logical operation.
//! - Keep API/CLI layers decoupled from SQL and URL details.

pub mod note_service;
