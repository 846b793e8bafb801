use super::*;

impl RoleEditorService {
    /// Returns the module catalog, served from cache when fresh.
    pub async fn load_catalog(&self) -> AppResult<ModuleCatalog> {
        let key = QueryKey::SystemModules;
        if let Some(catalog) = self.cached(&key).await?.and_then(catalog_from) {
            return Ok(catalog);
        }

        let catalog = self.repository.list_system_modules().await?;
        self.store(key, QueryValue::Catalog(catalog.clone()))
            .await?;
        Ok(catalog)
    }

    /// Returns all roles, served from cache when fresh.
    pub async fn list_roles(&self) -> AppResult<Vec<RoleSummary>> {
        let key = QueryKey::Roles;
        if let Some(roles) = self.cached(&key).await?.and_then(roles_from) {
            return Ok(roles);
        }

        let roles = self.repository.list_roles().await?;
        self.store(key, QueryValue::Roles(roles.clone())).await?;
        Ok(roles)
    }

    /// Returns one role with its grants, served from cache when fresh.
    pub async fn load_role(&self, role_id: &RoleId) -> AppResult<RoleRecord> {
        let key = QueryKey::Role(role_id.clone());
        if let Some(role) = self.cached(&key).await?.and_then(role_from) {
            return Ok(role);
        }

        let role = self.repository.find_role(role_id).await?;
        self.store(key, QueryValue::Role(role.clone())).await?;
        Ok(role)
    }

    /// Deletes a role and drops its cached entries.
    pub async fn delete_role(&self, role_id: &RoleId) -> AppResult<()> {
        self.repository.delete_role(role_id).await?;
        self.invalidate(&[QueryKey::Roles, QueryKey::Role(role_id.clone())])
            .await
    }
}
