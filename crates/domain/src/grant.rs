use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::Serialize;
use stratum_core::{AppError, AppResult};

use crate::catalog::{LevelName, ModuleName};

/// Separator between module and level in the wire form of a grant.
pub const GRANT_SEPARATOR: char = ':';

/// A single `module:level` permission as persisted by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PermissionGrant {
    module: ModuleName,
    level: LevelName,
}

impl PermissionGrant {
    /// Creates a grant from validated parts.
    #[must_use]
    pub fn new(module: ModuleName, level: LevelName) -> Self {
        Self { module, level }
    }

    /// Parses the wire form. A doubled module prefix is normalised away.
    pub fn parse(value: &str) -> AppResult<Self> {
        let (module, level) = value.trim().split_once(GRANT_SEPARATOR).ok_or_else(|| {
            AppError::Validation(format!(
                "permission grant '{value}' must have the form 'module{GRANT_SEPARATOR}level'"
            ))
        })?;

        let module = ModuleName::new(module)?;
        let level = LevelName::scoped(&module, level)?;
        Ok(Self { module, level })
    }

    /// Returns the module part.
    #[must_use]
    pub fn module(&self) -> &ModuleName {
        &self.module
    }

    /// Returns the level part.
    #[must_use]
    pub fn level(&self) -> &LevelName {
        &self.level
    }

    /// Returns the wire string sent to the backend.
    #[must_use]
    pub fn to_wire(&self) -> String {
        self.to_string()
    }
}

impl Display for PermissionGrant {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}{GRANT_SEPARATOR}{}", self.module, self.level)
    }
}

impl FromStr for PermissionGrant {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

#[cfg(test)]
mod tests {
    use super::PermissionGrant;

    #[test]
    fn wire_form_joins_module_and_level() {
        let grant = PermissionGrant::parse("users:create").unwrap_or_else(|_| panic!("test"));
        assert_eq!(grant.module().as_str(), "users");
        assert_eq!(grant.level().as_str(), "create");
        assert_eq!(grant.to_wire(), "users:create");
    }

    #[test]
    fn doubled_prefix_is_normalised() {
        let grant = "users:users:create"
            .parse::<PermissionGrant>()
            .unwrap_or_else(|_| panic!("test"));
        assert_eq!(grant.to_wire(), "users:create");
    }

    #[test]
    fn malformed_grants_are_rejected() {
        assert!(PermissionGrant::parse("users").is_err());
        assert!(PermissionGrant::parse(":create").is_err());
        assert!(PermissionGrant::parse("users:").is_err());
        assert!(PermissionGrant::parse("users:billing:create").is_err());
    }
}
