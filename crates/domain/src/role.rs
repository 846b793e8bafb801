use std::collections::BTreeMap;

use serde::Serialize;
use stratum_core::{AppResult, NonEmptyString};

/// Maximum role name length in characters.
pub const ROLE_NAME_MAX_LENGTH: usize = 96;

/// Maximum role description length in characters.
pub const ROLE_DESCRIPTION_MAX_LENGTH: usize = 255;

/// Backend-assigned role identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RoleId(NonEmptyString);

impl RoleId {
    /// Creates a role identifier.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        Ok(Self(NonEmptyString::new(value.into().trim())?))
    }

    /// Returns the identifier as sent in request paths.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for RoleId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Validated role name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleName(NonEmptyString);

impl RoleName {
    /// Creates a trimmed role name of at most [`ROLE_NAME_MAX_LENGTH`] characters.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        Ok(Self(NonEmptyString::bounded(
            "role name",
            value,
            ROLE_NAME_MAX_LENGTH,
        )?))
    }

    /// Returns the role name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Validated role description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleDescription(NonEmptyString);

impl RoleDescription {
    /// Creates a trimmed description of at most [`ROLE_DESCRIPTION_MAX_LENGTH`] characters.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        Ok(Self(NonEmptyString::bounded(
            "role description",
            value,
            ROLE_DESCRIPTION_MAX_LENGTH,
        )?))
    }

    /// Returns the description.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Role fields sent on create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleDraft {
    name: RoleName,
    description: RoleDescription,
}

impl RoleDraft {
    /// Creates a draft from validated fields.
    #[must_use]
    pub fn new(name: RoleName, description: RoleDescription) -> Self {
        Self { name, description }
    }

    /// Returns the role name.
    #[must_use]
    pub fn name(&self) -> &RoleName {
        &self.name
    }

    /// Returns the role description.
    #[must_use]
    pub fn description(&self) -> &RoleDescription {
        &self.description
    }
}

/// Levels granted to a role, grouped by module name, as received from the backend.
///
/// Values are kept raw: level names may still carry a `module:` prefix and
/// modules may no longer exist in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RoleGrants(BTreeMap<String, Vec<String>>);

impl RoleGrants {
    /// Creates an empty grant map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends granted levels for a module.
    pub fn insert(&mut self, module: impl Into<String>, levels: Vec<String>) {
        self.0.entry(module.into()).or_default().extend(levels);
    }

    /// Returns the granted levels for `module`, empty when none.
    #[must_use]
    pub fn levels_for(&self, module: &str) -> &[String] {
        self.0.get(module).map(Vec::as_slice).unwrap_or_default()
    }
}

impl<M, L> FromIterator<(M, Vec<L>)> for RoleGrants
where
    M: Into<String>,
    L: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (M, Vec<L>)>>(iter: T) -> Self {
        let mut grants = Self::new();
        for (module, levels) in iter {
            grants.insert(module, levels.into_iter().map(Into::into).collect());
        }
        grants
    }
}
