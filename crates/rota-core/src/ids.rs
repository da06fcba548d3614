//! ID prefix constants.
//!
//! Every row id is `{prefix}-{8 hex chars}`, generated in SQL via
//! `randomblob(4)`.

pub const PREFIX_EVENT: &str = "evt";
pub const PREFIX_TEMPLATE: &str = "tpl";
pub const PREFIX_AUDIT: &str = "aud";

/// All prefixes, for exhaustive generation tests.
pub const ALL_PREFIXES: &[&str] = &[PREFIX_EVENT, PREFIX_TEMPLATE, PREFIX_AUDIT];
