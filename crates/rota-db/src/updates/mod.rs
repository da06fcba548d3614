//! Patch structs + builders for update operations.

pub mod event;
