use stratum_domain::{ModuleCatalog, PermissionMatrix, RoleId};

use crate::role_admin_ports::RoleRecord;

/// One open create or edit of a role.
///
/// The session owns its matrix exclusively. Dropping the session discards all
/// unsaved edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleEditSession {
    role_id: Option<RoleId>,
    name: String,
    description: String,
    matrix: PermissionMatrix,
}

impl RoleEditSession {
    /// Opens a session for a new role with every module disabled.
    #[must_use]
    pub fn create(catalog: &ModuleCatalog) -> Self {
        Self {
            role_id: None,
            name: String::new(),
            description: String::new(),
            matrix: PermissionMatrix::seed(catalog, None),
        }
    }

    /// Opens a session seeded from an existing role.
    #[must_use]
    pub fn edit(catalog: &ModuleCatalog, record: RoleRecord) -> Self {
        let matrix = PermissionMatrix::seed(catalog, Some(&record.grants));
        Self {
            role_id: Some(record.role_id),
            name: record.name,
            description: record.description,
            matrix,
        }
    }

    /// Returns the role identifier, absent until the role is first saved.
    #[must_use]
    pub fn role_id(&self) -> Option<&RoleId> {
        self.role_id.as_ref()
    }

    /// Returns whether submitting creates a new role.
    #[must_use]
    pub fn is_new(&self) -> bool {
        self.role_id.is_none()
    }

    /// Returns the name loaded with the role, empty for new roles.
    #[must_use]
    pub fn initial_name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the description loaded with the role, empty for new roles.
    #[must_use]
    pub fn initial_description(&self) -> &str {
        self.description.as_str()
    }

    /// Returns the permission matrix.
    #[must_use]
    pub fn matrix(&self) -> &PermissionMatrix {
        &self.matrix
    }

    /// Returns the permission matrix for editing.
    pub fn matrix_mut(&mut self) -> &mut PermissionMatrix {
        &mut self.matrix
    }
}
