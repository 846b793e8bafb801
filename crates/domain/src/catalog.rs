//! System module catalog published by the backend.
//!
//! The catalog is read-only on the client. It decides which modules and
//! permission levels exist, and in which order they are displayed and
//! serialized.

use std::collections::HashSet;

use serde::Serialize;
use stratum_core::{AppError, AppResult, NonEmptyString};

use crate::grant::GRANT_SEPARATOR;

/// Stable identifier of a permission module, e.g. `user_management`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ModuleName(NonEmptyString);

impl ModuleName {
    /// Creates a validated module name.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.contains(GRANT_SEPARATOR) {
            return Err(AppError::Validation(format!(
                "module name '{trimmed}' must not contain '{GRANT_SEPARATOR}'"
            )));
        }

        Ok(Self(NonEmptyString::new(trimmed)?))
    }

    /// Returns the module name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for ModuleName {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Name of a permission level, unique within its module, e.g. `delete`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct LevelName(NonEmptyString);

impl LevelName {
    /// Creates a validated bare level name.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.contains(GRANT_SEPARATOR) {
            return Err(AppError::Validation(format!(
                "permission level '{trimmed}' must not contain '{GRANT_SEPARATOR}'"
            )));
        }

        Ok(Self(NonEmptyString::new(trimmed)?))
    }

    /// Creates a level name scoped to `module`, stripping any `module:` prefix.
    ///
    /// Previously saved grants can come back from the backend already in wire
    /// form. Stripping here keeps serialization from emitting `module:module:level`.
    pub fn scoped(module: &ModuleName, value: &str) -> AppResult<Self> {
        let prefix = format!("{}{GRANT_SEPARATOR}", module.as_str());
        let mut bare = value.trim();
        while let Some(rest) = bare.strip_prefix(prefix.as_str()) {
            bare = rest.trim_start();
        }

        Self::new(bare)
    }

    /// Returns the level name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for LevelName {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Grantable action within a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionLevel {
    name: LevelName,
    label: String,
    order: i32,
}

impl PermissionLevel {
    /// Creates a permission level. An empty label falls back to the name.
    pub fn new(name: impl Into<String>, label: impl Into<String>, order: i32) -> AppResult<Self> {
        Ok(Self::named(LevelName::new(name)?, label, order))
    }

    /// Creates a permission level of `module`, accepting a `module:` prefixed name.
    pub fn scoped(
        module: &ModuleName,
        name: &str,
        label: impl Into<String>,
        order: i32,
    ) -> AppResult<Self> {
        Ok(Self::named(LevelName::scoped(module, name)?, label, order))
    }

    fn named(name: LevelName, label: impl Into<String>, order: i32) -> Self {
        let label = label.into().trim().to_owned();
        let label = if label.is_empty() {
            name.as_str().to_owned()
        } else {
            label
        };

        Self { name, label, order }
    }

    /// Returns the level name.
    #[must_use]
    pub fn name(&self) -> &LevelName {
        &self.name
    }

    /// Returns the human-readable label.
    #[must_use]
    pub fn label(&self) -> &str {
        self.label.as_str()
    }

    /// Returns the display order.
    #[must_use]
    pub fn order(&self) -> i32 {
        self.order
    }
}

/// Named permission group with its ordered levels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemModule {
    name: ModuleName,
    label: String,
    is_active: bool,
    levels: Vec<PermissionLevel>,
}

impl SystemModule {
    /// Creates a module, sorting levels by their display order.
    ///
    /// Levels sharing the same order keep their catalog position.
    pub fn new(
        name: impl Into<String>,
        label: impl Into<String>,
        is_active: bool,
        mut levels: Vec<PermissionLevel>,
    ) -> AppResult<Self> {
        let name = ModuleName::new(name)?;

        let mut seen = HashSet::new();
        for level in &levels {
            if !seen.insert(level.name().as_str()) {
                return Err(AppError::Validation(format!(
                    "module '{name}' defines permission level '{}' more than once",
                    level.name()
                )));
            }
        }

        levels.sort_by_key(PermissionLevel::order);

        let label = label.into().trim().to_owned();
        let label = if label.is_empty() {
            name.as_str().to_owned()
        } else {
            label
        };

        Ok(Self {
            name,
            label,
            is_active,
            levels,
        })
    }

    /// Returns the module name.
    #[must_use]
    pub fn name(&self) -> &ModuleName {
        &self.name
    }

    /// Returns the human-readable label.
    #[must_use]
    pub fn label(&self) -> &str {
        self.label.as_str()
    }

    /// Returns whether the backend reports the module as enabled system-wide.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Returns levels in display order.
    #[must_use]
    pub fn levels(&self) -> &[PermissionLevel] {
        &self.levels
    }

    /// Returns whether the module defines `level`.
    #[must_use]
    pub fn contains_level(&self, level: &LevelName) -> bool {
        self.levels.iter().any(|candidate| candidate.name() == level)
    }
}

/// Ordered, authoritative list of modules.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ModuleCatalog {
    modules: Vec<SystemModule>,
}

impl ModuleCatalog {
    /// Creates a catalog, rejecting duplicate module names.
    pub fn new(modules: Vec<SystemModule>) -> AppResult<Self> {
        let mut seen = HashSet::new();
        for module in &modules {
            if !seen.insert(module.name().as_str()) {
                return Err(AppError::Validation(format!(
                    "catalog defines module '{}' more than once",
                    module.name()
                )));
            }
        }

        Ok(Self { modules })
    }

    /// Returns modules in catalog order.
    #[must_use]
    pub fn modules(&self) -> &[SystemModule] {
        &self.modules
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn module_name(value: &str) -> ModuleName {
        ModuleName::new(value).unwrap_or_else(|_| panic!("test"))
    }

    #[test]
    fn module_name_rejects_separator() {
        assert!(ModuleName::new("users:admin").is_err());
        assert!(ModuleName::new("  ").is_err());
    }

    #[test]
    fn scoped_level_strips_repeated_prefix() {
        let module = module_name("users");
        let level = LevelName::scoped(&module, "users:users:create");
        assert_eq!(
            level.map(|value| value.as_str().to_owned()),
            Ok("create".to_owned())
        );
    }

    #[test]
    fn scoped_permission_level_accepts_prefixed_name() {
        let module = module_name("users");
        let level = PermissionLevel::scoped(&module, "users:create", "", 2)
            .unwrap_or_else(|_| panic!("test"));

        assert_eq!(level.name().as_str(), "create");
        assert_eq!(level.label(), "create");
    }

    #[test]
    fn scoped_level_rejects_foreign_prefix() {
        let module = module_name("users");
        assert!(LevelName::scoped(&module, "billing:create").is_err());
    }

    #[test]
    fn module_sorts_levels_by_order() {
        let module = SystemModule::new(
            "users",
            "User Management",
            true,
            vec![
                PermissionLevel::new("delete", "Delete", 3).unwrap_or_else(|_| panic!("test")),
                PermissionLevel::new("read", "Read", 1).unwrap_or_else(|_| panic!("test")),
                PermissionLevel::new("create", "", 2).unwrap_or_else(|_| panic!("test")),
            ],
        )
        .unwrap_or_else(|_| panic!("test"));

        let names: Vec<&str> = module
            .levels()
            .iter()
            .map(|level| level.name().as_str())
            .collect();
        assert_eq!(names, vec!["read", "create", "delete"]);
        assert_eq!(module.levels()[1].label(), "create");
    }

    #[test]
    fn duplicate_levels_are_rejected() {
        let result = SystemModule::new(
            "users",
            "Users",
            true,
            vec![
                PermissionLevel::new("read", "Read", 1).unwrap_or_else(|_| panic!("test")),
                PermissionLevel::new("read", "Read again", 2).unwrap_or_else(|_| panic!("test")),
            ],
        );
        assert!(result.is_err());
    }

    #[test]
    fn duplicate_modules_are_rejected() {
        let module = SystemModule::new("users", "Users", true, Vec::new())
            .unwrap_or_else(|_| panic!("test"));
        let result = ModuleCatalog::new(vec![module.clone(), module]);
        assert!(result.is_err());
    }
}
