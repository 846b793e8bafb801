use async_trait::async_trait;
use stratum_core::AppResult;
use stratum_domain::{ModuleCatalog, RoleId};

use crate::role_admin_ports::{RoleRecord, RoleSummary};

/// Identifier of one cached backend query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    /// `GET /system-modules`.
    SystemModules,
    /// `GET /roles`.
    Roles,
    /// `GET /roles/{id}`.
    Role(RoleId),
}

impl QueryKey {
    /// Returns the key segments, e.g. `["role", "42"]`.
    #[must_use]
    pub fn segments(&self) -> Vec<&str> {
        match self {
            Self::SystemModules => vec!["system-modules"],
            Self::Roles => vec!["roles"],
            Self::Role(role_id) => vec!["role", role_id.as_str()],
        }
    }
}

/// Cached query result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    /// Module catalog.
    Catalog(ModuleCatalog),
    /// Role list.
    Roles(Vec<RoleSummary>),
    /// Single role with grants.
    Role(RoleRecord),
}

/// Cache port for backend query results with explicit invalidation.
#[async_trait]
pub trait QueryCache: Send + Sync {
    /// Returns the cached value for one key, if present and fresh.
    async fn get(&self, key: &QueryKey) -> AppResult<Option<QueryValue>>;

    /// Stores a value for one key with ttl.
    async fn set(&self, key: QueryKey, value: QueryValue, ttl_seconds: u32) -> AppResult<()>;

    /// Drops the cached value for one key.
    async fn invalidate(&self, key: &QueryKey) -> AppResult<()>;
}
