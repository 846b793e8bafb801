use std::sync::Arc;

use stratum_core::AppResult;
use stratum_domain::{ModuleCatalog, PermissionMatrix, RoleId};

use crate::query_cache_ports::{QueryCache, QueryKey, QueryValue};
use crate::role_admin_ports::{RoleAdminRepository, RoleRecord, RoleSummary};

mod loading;
mod session;
mod submission;

pub use session::RoleEditSession;
pub use submission::{RoleForm, RoleFormErrors, RoleSubmitError, SavedRole};

/// Role administration service: loads catalog and roles, opens editing
/// sessions and submits them.
#[derive(Clone)]
pub struct RoleEditorService {
    repository: Arc<dyn RoleAdminRepository>,
    query_cache: Option<Arc<dyn QueryCache>>,
    query_cache_ttl_seconds: u32,
}

impl RoleEditorService {
    /// Creates a role editor service without caching.
    #[must_use]
    pub fn new(repository: Arc<dyn RoleAdminRepository>) -> Self {
        Self {
            repository,
            query_cache: None,
            query_cache_ttl_seconds: 0,
        }
    }

    /// Adds query caching for catalog and role reads.
    #[must_use]
    pub fn with_query_cache(mut self, query_cache: Arc<dyn QueryCache>, ttl_seconds: u32) -> Self {
        self.query_cache = Some(query_cache);
        self.query_cache_ttl_seconds = ttl_seconds;
        self
    }

    /// Opens a create session (`None`) or an edit session for an existing role.
    pub async fn open_session(&self, role_id: Option<&RoleId>) -> AppResult<RoleEditSession> {
        let catalog = self.load_catalog().await?;
        match role_id {
            Some(role_id) => {
                let record = self.load_role(role_id).await?;
                Ok(RoleEditSession::edit(&catalog, record))
            }
            None => Ok(RoleEditSession::create(&catalog)),
        }
    }

    /// Seeds a matrix for a role without opening a full session.
    pub async fn permission_matrix(&self, role_id: &RoleId) -> AppResult<PermissionMatrix> {
        let catalog = self.load_catalog().await?;
        let record = self.load_role(role_id).await?;
        Ok(PermissionMatrix::seed(&catalog, Some(&record.grants)))
    }

    async fn cached(&self, key: &QueryKey) -> AppResult<Option<QueryValue>> {
        if self.query_cache_ttl_seconds > 0
            && let Some(cache) = &self.query_cache
        {
            return cache.get(key).await;
        }

        Ok(None)
    }

    async fn store(&self, key: QueryKey, value: QueryValue) -> AppResult<()> {
        if self.query_cache_ttl_seconds > 0
            && let Some(cache) = &self.query_cache
        {
            cache.set(key, value, self.query_cache_ttl_seconds).await?;
        }

        Ok(())
    }

    async fn invalidate(&self, keys: &[QueryKey]) -> AppResult<()> {
        if let Some(cache) = &self.query_cache {
            for key in keys {
                cache.invalidate(key).await?;
            }
        }

        Ok(())
    }
}

fn catalog_from(value: QueryValue) -> Option<ModuleCatalog> {
    match value {
        QueryValue::Catalog(catalog) => Some(catalog),
        _ => None,
    }
}

fn roles_from(value: QueryValue) -> Option<Vec<RoleSummary>> {
    match value {
        QueryValue::Roles(roles) => Some(roles),
        _ => None,
    }
}

fn role_from(value: QueryValue) -> Option<RoleRecord> {
    match value {
        QueryValue::Role(role) => Some(role),
        _ => None,
    }
}
