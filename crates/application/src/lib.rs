//! Application services and ports.

#![forbid(unsafe_code)]

mod query_cache_ports;
mod role_admin_ports;
mod role_editor_service;

pub use query_cache_ports::{QueryCache, QueryKey, QueryValue};
pub use role_admin_ports::{RoleAdminRepository, RoleRecord, RoleSummary};
pub use role_editor_service::{
    RoleEditSession, RoleEditorService, RoleForm, RoleFormErrors, RoleSubmitError, SavedRole,
};
