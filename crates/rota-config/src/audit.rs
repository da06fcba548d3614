//! Audit log retention and paging configuration.

use serde::{Deserialize, Serialize};

/// Default age cutoff for the retention sweep, in days.
const fn default_retention_days() -> u32 {
    90
}

/// Default page size for audit listings.
const fn default_limit() -> u32 {
    50
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuditConfig {
    /// Entries older than this many days are removed by `audit cleanup`.
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,

    /// Default page size for audit list queries.
    #[serde(default = "default_limit")]
    pub default_limit: u32,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            retention_days: default_retention_days(),
            default_limit: default_limit(),
        }
    }
}
