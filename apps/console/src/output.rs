use stratum_application::{RoleFormErrors, RoleSummary, SavedRole};
use stratum_domain::{ModuleCatalog, PermissionMatrix};

pub fn render_catalog(catalog: &ModuleCatalog) -> String {
    let mut rendered = String::new();
    for module in catalog.modules() {
        let status = if module.is_active() { "" } else { " (inactive)" };
        rendered.push_str(&format!("{} - {}{status}\n", module.name(), module.label()));
        for level in module.levels() {
            rendered.push_str(&format!(
                "  [{:>3}] {} - {}\n",
                level.order(),
                level.name(),
                level.label()
            ));
        }
    }
    rendered
}

pub fn render_roles(roles: &[RoleSummary]) -> String {
    roles
        .iter()
        .map(|role| format!("{}\t{}\t{}\n", role.role_id, role.name, role.description))
        .collect()
}

pub fn render_matrix(matrix: &PermissionMatrix) -> String {
    let mut rendered: String = matrix
        .entries()
        .iter()
        .map(|entry| {
            let marker = if entry.is_enabled() { "[x]" } else { "[ ]" };
            let levels: Vec<&str> = matrix
                .selected_levels(entry.module().as_str())
                .into_iter()
                .map(|level| level.as_str())
                .collect();
            format!("{marker} {}: {}\n", entry.module(), levels.join(", "))
        })
        .collect();

    rendered.push_str(&format!("grants: {}\n", matrix.to_wire_grants().join(" ")));
    rendered
}

pub fn render_saved(saved: &SavedRole) -> String {
    let verb = if saved.created { "created" } else { "updated" };
    format!(
        "role {} {verb} with {} permission(s)\n",
        saved.role_id,
        saved.grants.len()
    )
}

pub fn render_form_errors(errors: &RoleFormErrors) -> String {
    [
        ("name", &errors.name),
        ("description", &errors.description),
        ("permissions", &errors.permissions),
    ]
    .into_iter()
    .filter_map(|(field, message)| {
        message
            .as_ref()
            .map(|message| format!("{field}: {message}\n"))
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use stratum_application::RoleFormErrors;
    use stratum_domain::{
        ModuleCatalog, PermissionLevel, PermissionMatrix, RoleGrants, SystemModule,
    };

    use super::{render_form_errors, render_matrix};

    #[test]
    fn form_errors_list_only_set_fields() {
        let errors = RoleFormErrors {
            name: Some("role name is required".to_owned()),
            permissions: Some("a role needs at least one permission".to_owned()),
            ..RoleFormErrors::default()
        };

        assert_eq!(
            render_form_errors(&errors),
            "name: role name is required\npermissions: a role needs at least one permission\n"
        );
    }

    #[test]
    fn matrix_lists_modules_and_grants() {
        let catalog = ModuleCatalog::new(vec![
            SystemModule::new(
                "users",
                "Users",
                true,
                vec![
                    PermissionLevel::new("read", "Read", 1).unwrap_or_else(|_| panic!("test")),
                    PermissionLevel::new("create", "Create", 2)
                        .unwrap_or_else(|_| panic!("test")),
                ],
            )
            .unwrap_or_else(|_| panic!("test")),
            SystemModule::new("billing", "Billing", true, Vec::new())
                .unwrap_or_else(|_| panic!("test")),
        ])
        .unwrap_or_else(|_| panic!("test"));
        let grants: RoleGrants = [("users", vec!["create", "read"])].into_iter().collect();

        let rendered = render_matrix(&PermissionMatrix::seed(&catalog, Some(&grants)));

        assert_eq!(
            rendered,
            "[x] users: read, create\n[ ] billing: \ngrants: users:read users:create\n"
        );
    }
}
