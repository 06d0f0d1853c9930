//! Domain model for the student roster.
//!
//! # Responsibility
//! - Define the single table-backed entity used by the repository layer.
//!
//! # Invariants
//! - Every persisted student is identified by a storage-generated `StudentId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod student;
