//! In-memory permission matrix edited while a role is open.
//!
//! Each catalog module owns one entry holding an enabled flag and a set of
//! selected levels. Mutations keep `enabled == !selected_levels.is_empty()`;
//! seeding from backend data is the only way to break it, which is why
//! [`PermissionMatrix::validate`] checks it again before submission.

use std::collections::BTreeSet;

use serde::Serialize;
use stratum_core::{AppError, AppResult};

use crate::catalog::{LevelName, ModuleCatalog, ModuleName, SystemModule};
use crate::grant::PermissionGrant;
use crate::role::RoleGrants;

/// Editing state of one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatrixEntry {
    module: ModuleName,
    enabled: bool,
    selected_levels: BTreeSet<LevelName>,
}

impl MatrixEntry {
    fn disabled(module: ModuleName) -> Self {
        Self {
            module,
            enabled: false,
            selected_levels: BTreeSet::new(),
        }
    }

    /// Returns the module this entry edits.
    #[must_use]
    pub fn module(&self) -> &ModuleName {
        &self.module
    }

    /// Returns whether the module is switched on.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns the selected levels, unordered with respect to the catalog.
    #[must_use]
    pub fn selected_levels(&self) -> &BTreeSet<LevelName> {
        &self.selected_levels
    }

    fn has_selection(&self) -> bool {
        !self.selected_levels.is_empty()
    }
}

/// Module-by-module permission state for one role being edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionMatrix {
    #[serde(skip)]
    catalog: ModuleCatalog,
    entries: Vec<MatrixEntry>,
}

impl PermissionMatrix {
    /// Builds a matrix with one entry per catalog module.
    ///
    /// Without grants every entry starts disabled. With grants, a module is
    /// enabled when it has any granted level; levels the catalog does not know
    /// and modules missing from the catalog are dropped.
    #[must_use]
    pub fn seed(catalog: &ModuleCatalog, grants: Option<&RoleGrants>) -> Self {
        let entries = catalog
            .modules()
            .iter()
            .map(|module| {
                let granted = grants
                    .map(|grants| grants.levels_for(module.name().as_str()))
                    .unwrap_or_default();
                if granted.is_empty() {
                    return MatrixEntry::disabled(module.name().clone());
                }

                let selected_levels = granted
                    .iter()
                    .filter_map(|level| LevelName::scoped(module.name(), level).ok())
                    .filter(|level| module.contains_level(level))
                    .collect();

                MatrixEntry {
                    module: module.name().clone(),
                    enabled: true,
                    selected_levels,
                }
            })
            .collect();

        Self {
            catalog: catalog.clone(),
            entries,
        }
    }

    /// Returns entries in catalog order.
    #[must_use]
    pub fn entries(&self) -> &[MatrixEntry] {
        &self.entries
    }

    /// Returns the entry for `module`.
    #[must_use]
    pub fn entry(&self, module: &str) -> Option<&MatrixEntry> {
        self.entries
            .iter()
            .find(|entry| entry.module.as_str() == module)
    }

    /// Returns whether `module` is enabled. Unknown modules are disabled.
    #[must_use]
    pub fn is_enabled(&self, module: &str) -> bool {
        self.entry(module).is_some_and(MatrixEntry::is_enabled)
    }

    /// Returns the selected levels of `module` in catalog order.
    #[must_use]
    pub fn selected_levels(&self, module: &str) -> Vec<&LevelName> {
        let Some((definition, entry)) = self.position(module).map(|index| self.pair(index)) else {
            return Vec::new();
        };

        definition
            .levels()
            .iter()
            .map(|level| level.name())
            .filter(|level| entry.selected_levels.contains(*level))
            .collect()
    }

    /// Flips a module on or off and returns the new state.
    ///
    /// Switching off always discards the selection.
    pub fn toggle_module(&mut self, module: &str) -> AppResult<bool> {
        let index = self.require_position(module)?;
        let entry = &mut self.entries[index];
        entry.enabled = !entry.enabled;
        if !entry.enabled {
            entry.selected_levels.clear();
        }

        Ok(entry.enabled)
    }

    /// Replaces the selection of a module and derives its enabled flag from it.
    ///
    /// Levels may be bare or carry the module prefix. Any level the catalog
    /// does not define for the module rejects the whole call.
    pub fn set_selected_levels<I, S>(&mut self, module: &str, levels: I) -> AppResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let index = self.require_position(module)?;
        let definition = &self.catalog.modules()[index];

        let mut selected_levels = BTreeSet::new();
        for raw_level in levels {
            let level = LevelName::scoped(definition.name(), raw_level.as_ref())?;
            if !definition.contains_level(&level) {
                return Err(AppError::Validation(format!(
                    "module '{}' has no permission level '{level}'",
                    definition.name()
                )));
            }
            selected_levels.insert(level);
        }

        let entry = &mut self.entries[index];
        entry.enabled = !selected_levels.is_empty();
        entry.selected_levels = selected_levels;
        Ok(())
    }

    /// Checks the matrix before submission.
    pub fn validate(&self) -> AppResult<()> {
        if self
            .entries
            .iter()
            .any(|entry| entry.enabled && !entry.has_selection())
        {
            return Err(AppError::Validation(
                "every enabled module needs at least one permission level".to_owned(),
            ));
        }

        if !self
            .entries
            .iter()
            .any(|entry| entry.enabled && entry.has_selection())
        {
            return Err(AppError::Validation(
                "a role needs at least one permission".to_owned(),
            ));
        }

        Ok(())
    }

    /// Returns grants for every enabled module.
    ///
    /// Modules follow catalog order and levels follow catalog level order.
    #[must_use]
    pub fn to_grant_list(&self) -> Vec<PermissionGrant> {
        (0..self.entries.len())
            .map(|index| self.pair(index))
            .filter(|(_, entry)| entry.enabled)
            .flat_map(|(definition, entry)| {
                definition
                    .levels()
                    .iter()
                    .filter(move |level| entry.selected_levels.contains(level.name()))
                    .map(move |level| {
                        PermissionGrant::new(entry.module.clone(), level.name().clone())
                    })
            })
            .collect()
    }

    /// Returns [`Self::to_grant_list`] in wire form.
    #[must_use]
    pub fn to_wire_grants(&self) -> Vec<String> {
        self.to_grant_list()
            .iter()
            .map(PermissionGrant::to_wire)
            .collect()
    }

    fn pair(&self, index: usize) -> (&SystemModule, &MatrixEntry) {
        (&self.catalog.modules()[index], &self.entries[index])
    }

    fn position(&self, module: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.module.as_str() == module)
    }

    fn require_position(&self, module: &str) -> AppResult<usize> {
        self.position(module)
            .ok_or_else(|| AppError::NotFound(format!("module '{module}' is not in the catalog")))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use stratum_core::AppError;

    use crate::catalog::{ModuleCatalog, PermissionLevel, SystemModule};
    use crate::role::RoleGrants;

    use super::PermissionMatrix;

    fn level(name: &str, order: i32) -> PermissionLevel {
        PermissionLevel::new(name, name.to_uppercase(), order).unwrap_or_else(|_| panic!("test"))
    }

    fn catalog() -> ModuleCatalog {
        ModuleCatalog::new(vec![
            SystemModule::new("A", "Module A", true, vec![level("a2", 2), level("a1", 1)])
                .unwrap_or_else(|_| panic!("test")),
            SystemModule::new("B", "Module B", true, vec![level("b1", 1)])
                .unwrap_or_else(|_| panic!("test")),
        ])
        .unwrap_or_else(|_| panic!("test"))
    }

    fn grants(pairs: Vec<(&str, Vec<&str>)>) -> RoleGrants {
        pairs.into_iter().collect()
    }

    fn selected(matrix: &PermissionMatrix, module: &str) -> Vec<String> {
        matrix
            .selected_levels(module)
            .into_iter()
            .map(|level| level.as_str().to_owned())
            .collect()
    }

    #[test]
    fn seeding_enables_granted_modules_only() {
        let matrix = PermissionMatrix::seed(&catalog(), Some(&grants(vec![("A", vec!["a1"])])));

        assert!(matrix.is_enabled("A"));
        assert_eq!(selected(&matrix, "A"), vec!["a1"]);
        assert!(!matrix.is_enabled("B"));
        assert!(selected(&matrix, "B").is_empty());
    }

    #[test]
    fn seeding_without_role_disables_everything() {
        let matrix = PermissionMatrix::seed(&catalog(), None);

        assert_eq!(matrix.entries().len(), 2);
        assert!(
            matrix
                .entries()
                .iter()
                .all(|entry| !entry.is_enabled() && entry.selected_levels().is_empty())
        );
    }

    #[test]
    fn seeding_drops_modules_missing_from_catalog() {
        let matrix = PermissionMatrix::seed(
            &catalog(),
            Some(&grants(vec![("A", vec!["a1"]), ("retired", vec!["x"])])),
        );

        assert!(matrix.entry("retired").is_none());
        assert_eq!(matrix.to_wire_grants(), vec!["A:a1"]);
    }

    #[test]
    fn toggle_off_clears_selection() {
        let seeded = grants(vec![("A", vec!["a1", "a2"])]);
        let mut matrix = PermissionMatrix::seed(&catalog(), Some(&seeded));

        let enabled = matrix.toggle_module("A");

        assert_eq!(enabled, Ok(false));
        assert!(!matrix.is_enabled("A"));
        assert!(selected(&matrix, "A").is_empty());
    }

    #[test]
    fn toggle_on_keeps_empty_selection() {
        let mut matrix = PermissionMatrix::seed(&catalog(), None);

        assert_eq!(matrix.toggle_module("B"), Ok(true));
        assert!(matrix.is_enabled("B"));
        assert!(selected(&matrix, "B").is_empty());
        assert!(matrix.validate().is_err());
    }

    #[test]
    fn toggle_unknown_module_is_not_found() {
        let mut matrix = PermissionMatrix::seed(&catalog(), None);
        assert!(matches!(
            matrix.toggle_module("missing"),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn selecting_levels_forces_enable() {
        let mut matrix = PermissionMatrix::seed(&catalog(), None);

        let result = matrix.set_selected_levels("B", ["b1"]);

        assert!(result.is_ok());
        assert!(matrix.is_enabled("B"));
        assert_eq!(selected(&matrix, "B"), vec!["b1"]);
    }

    #[test]
    fn clearing_levels_forces_disable() {
        let mut matrix = PermissionMatrix::seed(&catalog(), Some(&grants(vec![("A", vec!["a1"])])));

        let result = matrix.set_selected_levels("A", Vec::<String>::new());

        assert!(result.is_ok());
        assert!(!matrix.is_enabled("A"));
    }

    #[test]
    fn unknown_level_leaves_entry_untouched() {
        let mut matrix = PermissionMatrix::seed(&catalog(), Some(&grants(vec![("A", vec!["a1"])])));

        let result = matrix.set_selected_levels("A", ["a2", "purge"]);

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(selected(&matrix, "A"), vec!["a1"]);
    }

    #[test]
    fn grant_list_follows_catalog_level_order() {
        let mut matrix = PermissionMatrix::seed(&catalog(), None);
        let result = matrix.set_selected_levels("A", ["a2", "a1"]);
        assert!(result.is_ok());

        assert_eq!(matrix.to_wire_grants(), vec!["A:a1", "A:a2"]);
        assert_eq!(matrix.to_wire_grants(), matrix.to_wire_grants());
    }

    #[test]
    fn prefixed_levels_are_not_prefixed_twice() {
        let matrix = PermissionMatrix::seed(&catalog(), Some(&grants(vec![("A", vec!["A:a1"])])));

        assert_eq!(matrix.to_wire_grants(), vec!["A:a1"]);
    }

    #[test]
    fn prefixed_levels_are_accepted_on_selection() {
        let mut matrix = PermissionMatrix::seed(&catalog(), None);
        let result = matrix.set_selected_levels("B", ["B:b1", "b1"]);

        assert!(result.is_ok());
        assert_eq!(matrix.to_wire_grants(), vec!["B:b1"]);
    }

    #[test]
    fn all_disabled_matrix_fails_validation() {
        let matrix = PermissionMatrix::seed(&catalog(), None);

        let result = matrix.validate();

        assert!(matches!(result, Err(AppError::Validation(ref message)) if !message.is_empty()));
    }

    #[test]
    fn stale_levels_leave_enabled_entry_without_selection() {
        let matrix = PermissionMatrix::seed(
            &catalog(),
            Some(&grants(vec![("A", vec!["gone"]), ("B", vec!["b1"])])),
        );

        assert!(matrix.is_enabled("A"));
        assert!(selected(&matrix, "A").is_empty());
        assert!(matrix.validate().is_err());
        assert_eq!(matrix.to_wire_grants(), vec!["B:b1"]);
    }

    #[test]
    fn seeded_grants_round_trip() {
        let role_grants = grants(vec![("A", vec!["a2", "a1"]), ("B", vec!["b1"])]);
        let matrix = PermissionMatrix::seed(&catalog(), Some(&role_grants));

        assert!(matrix.validate().is_ok());
        let serialized: BTreeSet<String> = matrix.to_wire_grants().into_iter().collect();
        let expected: BTreeSet<String> = ["A:a1", "A:a2", "B:b1"]
            .into_iter()
            .map(str::to_owned)
            .collect();
        assert_eq!(serialized, expected);
    }
}
