//! Use-case services over the repository layer.
//!
//! # Responsibility
//! - Expose named roster operations to the sandbox and CLI.
//! - Keep callers decoupled from SQL and raw column values.

pub mod roster_service;
