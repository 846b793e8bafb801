use std::collections::BTreeMap;

use stratum_application::{RoleEditSession, RoleEditorService, RoleForm, RoleSubmitError};
use stratum_core::{AppError, AppResult};
use stratum_domain::{PermissionGrant, RoleId};
use thiserror::Error;
use tracing::{info, warn};

use crate::cli::Command;
use crate::output;

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error(transparent)]
    App(#[from] AppError),

    #[error(transparent)]
    Submit(#[from] RoleSubmitError),
}

/// Matrix edits requested on the command line.
#[derive(Debug, Default)]
pub struct MatrixEdits {
    grants: Vec<String>,
    cleared_modules: Vec<String>,
}

impl MatrixEdits {
    pub fn new(grants: Vec<String>, cleared_modules: Vec<String>) -> Self {
        Self {
            grants,
            cleared_modules,
        }
    }

    /// Applies the edits: cleared modules first, then each granted module's
    /// selection is replaced by the levels named for it.
    pub fn apply(&self, session: &mut RoleEditSession) -> AppResult<()> {
        let matrix = session.matrix_mut();

        for module in &self.cleared_modules {
            if matrix.is_enabled(module) {
                matrix.toggle_module(module)?;
            } else if matrix.entry(module).is_none() {
                return Err(AppError::NotFound(format!("module '{module}' does not exist")));
            }
        }

        for (module, levels) in self.grouped_grants()? {
            matrix.set_selected_levels(module.as_str(), levels)?;
        }

        Ok(())
    }

    fn grouped_grants(&self) -> AppResult<BTreeMap<String, Vec<String>>> {
        let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for raw_grant in &self.grants {
            let grant = PermissionGrant::parse(raw_grant)?;
            grouped
                .entry(grant.module().as_str().to_owned())
                .or_default()
                .push(grant.level().as_str().to_owned());
        }
        Ok(grouped)
    }
}

pub async fn run(service: &RoleEditorService, command: Command) -> Result<(), ConsoleError> {
    match command {
        Command::Modules => {
            let catalog = service.load_catalog().await?;
            print!("{}", output::render_catalog(&catalog));
        }
        Command::Roles => {
            let roles = service.list_roles().await?;
            print!("{}", output::render_roles(&roles));
        }
        Command::Show { role_id } => {
            let matrix = service.permission_matrix(&RoleId::new(role_id)?).await?;
            print!("{}", output::render_matrix(&matrix));
        }
        Command::Save {
            id,
            name,
            description,
            grants,
            cleared_modules,
        } => {
            let role_id = id.map(RoleId::new).transpose()?;
            let mut session = service.open_session(role_id.as_ref()).await?;
            MatrixEdits::new(grants, cleared_modules).apply(&mut session)?;

            let form = RoleForm {
                name: name.unwrap_or_else(|| session.initial_name().to_owned()),
                description: description
                    .unwrap_or_else(|| session.initial_description().to_owned()),
            };

            match service.submit_role(&session, form).await {
                Ok(saved) => {
                    info!(role_id = %saved.role_id, created = saved.created, "role saved");
                    print!("{}", output::render_saved(&saved));
                }
                Err(RoleSubmitError::Form(errors)) => {
                    eprint!("{}", output::render_form_errors(&errors));
                    return Err(RoleSubmitError::Form(errors).into());
                }
                Err(error @ RoleSubmitError::PartialFailure { .. }) => {
                    warn!("role saved without its permissions; rerun save to retry");
                    return Err(error.into());
                }
                Err(error) => return Err(error.into()),
            }
        }
        Command::Delete { role_id } => {
            let role_id = RoleId::new(role_id)?;
            service.delete_role(&role_id).await?;
            info!(role_id = %role_id, "role deleted");
            println!("role {role_id} deleted");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use stratum_application::RoleEditSession;
    use stratum_core::AppError;
    use stratum_domain::{ModuleCatalog, PermissionLevel, SystemModule};

    use super::MatrixEdits;

    fn session() -> RoleEditSession {
        let level = |name: &str, order: i32| {
            PermissionLevel::new(name, name, order).unwrap_or_else(|_| panic!("test"))
        };
        let catalog = ModuleCatalog::new(vec![
            SystemModule::new("users", "Users", true, vec![level("read", 1), level("create", 2)])
                .unwrap_or_else(|_| panic!("test")),
            SystemModule::new("billing", "Billing", true, vec![level("read", 1)])
                .unwrap_or_else(|_| panic!("test")),
        ])
        .unwrap_or_else(|_| panic!("test"));
        RoleEditSession::create(&catalog)
    }

    #[test]
    fn grants_are_grouped_per_module() {
        let mut session = session();
        let edits = MatrixEdits::new(
            vec![
                "users:create".to_owned(),
                "billing:read".to_owned(),
                "users:read".to_owned(),
            ],
            Vec::new(),
        );

        edits
            .apply(&mut session)
            .unwrap_or_else(|error| panic!("{error}"));

        assert_eq!(
            session.matrix().to_wire_grants(),
            vec!["users:read", "users:create", "billing:read"]
        );
    }

    #[test]
    fn cleared_module_drops_its_selection() {
        let mut session = session();
        MatrixEdits::new(vec!["billing:read".to_owned()], Vec::new())
            .apply(&mut session)
            .unwrap_or_else(|error| panic!("{error}"));

        MatrixEdits::new(Vec::new(), vec!["billing".to_owned()])
            .apply(&mut session)
            .unwrap_or_else(|error| panic!("{error}"));

        assert!(!session.matrix().is_enabled("billing"));
        assert!(session.matrix().to_wire_grants().is_empty());
    }

    #[test]
    fn unknown_level_is_rejected() {
        let mut session = session();
        let result =
            MatrixEdits::new(vec!["users:purge".to_owned()], Vec::new()).apply(&mut session);

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn unknown_cleared_module_is_rejected() {
        let mut session = session();
        let result = MatrixEdits::new(Vec::new(), vec!["audit".to_owned()]).apply(&mut session);

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
