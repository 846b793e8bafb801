//! Domain entities and invariants for role permission editing.

#![forbid(unsafe_code)]

mod catalog;
mod grant;
mod matrix;
mod role;

pub use catalog::{LevelName, ModuleCatalog, ModuleName, PermissionLevel, SystemModule};
pub use grant::{GRANT_SEPARATOR, PermissionGrant};
pub use matrix::{MatrixEntry, PermissionMatrix};
pub use role::{
    ROLE_DESCRIPTION_MAX_LENGTH, ROLE_NAME_MAX_LENGTH, RoleDescription, RoleDraft, RoleGrants,
    RoleId, RoleName,
};
