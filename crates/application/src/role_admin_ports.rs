use async_trait::async_trait;

use stratum_core::AppResult;
use stratum_domain::{ModuleCatalog, PermissionGrant, RoleDraft, RoleGrants, RoleId};

/// Role row as listed by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSummary {
    /// Stable role identifier.
    pub role_id: RoleId,
    /// Unique role name.
    pub name: String,
    /// Role description.
    pub description: String,
}

/// Role with its granted permission levels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleRecord {
    /// Stable role identifier.
    pub role_id: RoleId,
    /// Unique role name.
    pub name: String,
    /// Role description.
    pub description: String,
    /// Granted levels grouped by module.
    pub grants: RoleGrants,
}

/// Remote port for role and permission administration.
#[async_trait]
pub trait RoleAdminRepository: Send + Sync {
    /// Lists the module catalog.
    async fn list_system_modules(&self) -> AppResult<ModuleCatalog>;

    /// Lists all roles.
    async fn list_roles(&self) -> AppResult<Vec<RoleSummary>>;

    /// Loads one role with its grants.
    async fn find_role(&self, role_id: &RoleId) -> AppResult<RoleRecord>;

    /// Creates a role and returns its assigned identifier.
    async fn create_role(&self, draft: &RoleDraft) -> AppResult<RoleId>;

    /// Updates name and description of an existing role.
    async fn update_role(&self, role_id: &RoleId, draft: &RoleDraft) -> AppResult<RoleId>;

    /// Replaces every grant of a role with `grants`.
    async fn replace_role_permissions(
        &self,
        role_id: &RoleId,
        grants: &[PermissionGrant],
    ) -> AppResult<()>;

    /// Deletes a role.
    async fn delete_role(&self, role_id: &RoleId) -> AppResult<()>;
}
