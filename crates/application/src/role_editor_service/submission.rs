use super::*;

use std::fmt::{Display, Formatter};

use stratum_core::AppError;
use stratum_domain::{PermissionGrant, RoleDescription, RoleDraft, RoleName};
use thiserror::Error;
use tracing::warn;

/// Role fields entered by the operator.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RoleForm {
    /// Role name as typed.
    pub name: String,
    /// Role description as typed.
    pub description: String,
}

/// Validation messages to render next to the role form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RoleFormErrors {
    /// Message for the name field.
    pub name: Option<String>,
    /// Message for the description field.
    pub description: Option<String>,
    /// Message for the permission matrix area.
    pub permissions: Option<String>,
}

impl RoleFormErrors {
    /// Returns whether no message is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.permissions.is_none()
    }
}

impl Display for RoleFormErrors {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        let messages: Vec<String> = [
            ("name", &self.name),
            ("description", &self.description),
            ("permissions", &self.permissions),
        ]
        .into_iter()
        .filter_map(|(field, message)| {
            message
                .as_ref()
                .map(|message| format!("{field}: {message}"))
        })
        .collect();

        formatter.write_str(messages.join("; ").as_str())
    }
}

/// Outcome of a failed role submission.
#[derive(Debug, Error)]
pub enum RoleSubmitError {
    /// Input was rejected locally or by the backend; nothing was changed.
    #[error("role form is invalid: {0}")]
    Form(RoleFormErrors),

    /// The role was saved but replacing its permissions failed.
    #[error("role '{role_id}' was saved but its permissions were not: {source}")]
    PartialFailure {
        /// Identifier of the persisted role.
        role_id: RoleId,
        /// Error of the permission replacement call.
        source: AppError,
    },

    /// The backend failed before anything was persisted.
    #[error(transparent)]
    Backend(AppError),
}

/// Result of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedRole {
    /// Authoritative role identifier returned by the backend.
    pub role_id: RoleId,
    /// Whether the role was created rather than updated.
    pub created: bool,
    /// Grants that now make up the role's permissions.
    pub grants: Vec<PermissionGrant>,
}

impl RoleEditorService {
    /// Validates and saves a role together with its permission matrix.
    ///
    /// The role is created or updated first, then its permissions are
    /// replaced with the matrix's grant list. The two calls are not atomic.
    pub async fn submit_role(
        &self,
        session: &RoleEditSession,
        form: RoleForm,
    ) -> Result<SavedRole, RoleSubmitError> {
        let draft = validate_form(&form)?;

        session.matrix().validate().map_err(|error| {
            RoleSubmitError::Form(RoleFormErrors {
                permissions: Some(error.message().to_owned()),
                ..RoleFormErrors::default()
            })
        })?;
        let grants = session.matrix().to_grant_list();

        let saved_role_id = match session.role_id() {
            Some(role_id) => self.repository.update_role(role_id, &draft).await,
            None => self.repository.create_role(&draft).await,
        }
        .map_err(dispatch_backend_error)?;

        let replaced = self
            .repository
            .replace_role_permissions(&saved_role_id, grants.as_slice())
            .await;

        if let Err(error) = self
            .invalidate(&[QueryKey::Roles, QueryKey::Role(saved_role_id.clone())])
            .await
        {
            warn!(role_id = %saved_role_id, error = %error, "failed to invalidate role queries");
        }

        if let Err(source) = replaced {
            return Err(RoleSubmitError::PartialFailure {
                role_id: saved_role_id,
                source,
            });
        }

        Ok(SavedRole {
            role_id: saved_role_id,
            created: session.is_new(),
            grants,
        })
    }
}

fn validate_form(form: &RoleForm) -> Result<RoleDraft, RoleSubmitError> {
    let name = RoleName::new(form.name.as_str());
    let description = RoleDescription::new(form.description.as_str());

    match (name, description) {
        (Ok(name), Ok(description)) => Ok(RoleDraft::new(name, description)),
        (name, description) => Err(RoleSubmitError::Form(RoleFormErrors {
            name: name.err().map(|error| error.message().to_owned()),
            description: description.err().map(|error| error.message().to_owned()),
            permissions: None,
        })),
    }
}

/// Attaches backend rejections to the form field their message mentions.
///
/// The backend reports free text only, so a message mentioning "name" is
/// shown on the name field and any other rejection on the permission area.
fn dispatch_backend_error(error: AppError) -> RoleSubmitError {
    match error {
        AppError::Validation(message) | AppError::Conflict(message) => {
            if message.to_lowercase().contains("name") {
                RoleSubmitError::Form(RoleFormErrors {
                    name: Some(message),
                    ..RoleFormErrors::default()
                })
            } else {
                RoleSubmitError::Form(RoleFormErrors {
                    permissions: Some(message),
                    ..RoleFormErrors::default()
                })
            }
        }
        other => RoleSubmitError::Backend(other),
    }
}
