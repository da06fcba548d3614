//! # rota-core
//!
//! Core types for Rota, the multi-team scheduling calendar.
//!
//! This crate provides the foundational types shared across all Rota crates:
//! - Entity structs for events, audit log entries, and planning templates
//! - The closed `Team` set and audit action/entity-kind enums
//! - Verified actor identity with a single capability-check entry point
//! - The field-level diff algorithm used when audit history is read
//! - Cross-cutting error types

pub mod diff;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod identity;
pub mod ids;
