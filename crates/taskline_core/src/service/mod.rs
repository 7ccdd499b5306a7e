//! Use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls, identity generation and rollover into
//!   caller-level operations.
//! - Keep FFI and CLI layers free of storage details.

pub mod date_service;
pub mod project_service;
pub mod task_service;
