use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use stratum_application::{RoleAdminRepository, RoleRecord, RoleSummary};
use stratum_core::{AccessToken, AppError, AppResult};
use stratum_domain::{
    ModuleCatalog, ModuleName, PermissionGrant, PermissionLevel, RoleDraft, RoleGrants, RoleId,
    SystemModule,
};
use tracing::{debug, warn};
use url::Url;

/// REST adapter for the role administration backend.
///
/// Reads are retried on transport errors, 5xx and 429 responses. Writes are
/// sent exactly once.
pub struct HttpRoleAdminRepository {
    http_client: reqwest::Client,
    base_url: Url,
    access_token: Option<AccessToken>,
    max_attempts: u8,
    retry_backoff_ms: u64,
}

#[derive(Debug, Deserialize)]
struct SystemModuleResponse {
    name: String,
    #[serde(default)]
    label: String,
    #[serde(default = "default_module_enabled")]
    enabled: bool,
    #[serde(default)]
    permissions: Vec<PermissionLevelResponse>,
}

#[derive(Debug, Deserialize)]
struct PermissionLevelResponse {
    name: String,
    #[serde(default)]
    label: String,
    #[serde(default)]
    order: i32,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireId {
    Text(String),
    Number(i64),
}

#[derive(Debug, Deserialize)]
struct RoleSummaryResponse {
    id: WireId,
    name: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RoleResponse {
    id: WireId,
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    permissions: HashMap<String, Vec<GrantedPermissionResponse>>,
}

#[derive(Debug, Deserialize)]
struct GrantedPermissionResponse {
    name: String,
}

#[derive(Debug, Deserialize)]
struct CreatedRoleResponse {
    id: WireId,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: Option<String>,
}

#[derive(Debug, Serialize)]
struct RoleWriteRequest<'a> {
    name: &'a str,
    description: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplacePermissionsRequest {
    permission_names: Vec<String>,
}

fn default_module_enabled() -> bool {
    true
}

impl WireId {
    fn into_role_id(self) -> AppResult<RoleId> {
        match self {
            Self::Text(value) => RoleId::new(value),
            Self::Number(value) => RoleId::new(value.to_string()),
        }
    }
}

impl SystemModuleResponse {
    fn into_module(self) -> AppResult<SystemModule> {
        let module = ModuleName::new(self.name)?;
        let levels = self
            .permissions
            .into_iter()
            .map(|level| {
                PermissionLevel::scoped(&module, level.name.as_str(), level.label, level.order)
            })
            .collect::<AppResult<Vec<_>>>()?;

        SystemModule::new(module.as_str(), self.label, self.enabled, levels)
    }
}

impl RoleSummaryResponse {
    fn into_summary(self) -> AppResult<RoleSummary> {
        Ok(RoleSummary {
            role_id: self.id.into_role_id()?,
            name: self.name,
            description: self.description.unwrap_or_default(),
        })
    }
}

impl RoleResponse {
    fn into_record(self) -> AppResult<RoleRecord> {
        let grants = self
            .permissions
            .into_iter()
            .map(|(module, levels)| {
                (
                    module,
                    levels
                        .into_iter()
                        .map(|level| level.name)
                        .collect::<Vec<_>>(),
                )
            })
            .collect::<RoleGrants>();

        Ok(RoleRecord {
            role_id: self.id.into_role_id()?,
            name: self.name,
            description: self.description.unwrap_or_default(),
            grants,
        })
    }
}

impl HttpRoleAdminRepository {
    /// Creates a repository talking to the API rooted at `base_url`.
    #[must_use]
    pub fn new(
        http_client: reqwest::Client,
        base_url: Url,
        access_token: Option<AccessToken>,
        max_attempts: u8,
        retry_backoff_ms: u64,
    ) -> Self {
        Self {
            http_client,
            base_url,
            access_token,
            max_attempts: max_attempts.max(1),
            retry_backoff_ms,
        }
    }

    fn endpoint(&self, segments: &[&str]) -> AppResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                AppError::Internal(format!(
                    "API base URL '{}' cannot carry a path",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        let builder = self.http_client.request(method, url);
        match &self.access_token {
            Some(token) => builder.header(reqwest::header::AUTHORIZATION, token.bearer_header()),
            None => builder,
        }
    }

    async fn get_json<T>(&self, segments: &[&str]) -> AppResult<T>
    where
        T: DeserializeOwned + Send,
    {
        let url = self.endpoint(segments)?;
        let mut attempt = 0_u8;
        let mut last_error: Option<AppError> = None;

        while attempt < self.max_attempts {
            attempt = attempt.saturating_add(1);
            debug!(url = %url, attempt, "GET request");
            let response = self.request(Method::GET, url.clone()).send().await;

            match response {
                Ok(response) if response.status().is_success() => {
                    return response.json::<T>().await.map_err(|error| {
                        AppError::Internal(format!("invalid response body from {url}: {error}"))
                    });
                }
                Ok(response)
                    if response.status().is_server_error()
                        || response.status() == StatusCode::TOO_MANY_REQUESTS =>
                {
                    let status = response.status();
                    warn!(url = %url, attempt, status = %status, "transient backend status");
                    last_error = Some(error_from_response(response).await);
                }
                Ok(response) => return Err(error_from_response(response).await),
                Err(error) => {
                    warn!(url = %url, attempt, error = %error, "backend transport error");
                    last_error = Some(AppError::Internal(format!(
                        "request to {url} failed: {error}"
                    )));
                }
            }

            if attempt < self.max_attempts {
                let delay = self.retry_backoff_ms.saturating_mul(u64::from(attempt));
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
        }

        Err(last_error
            .unwrap_or_else(|| AppError::Internal(format!("request to {url} exhausted retries"))))
    }

    async fn send_once(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&(impl Serialize + Sync)>,
    ) -> AppResult<reqwest::Response> {
        let url = self.endpoint(segments)?;
        debug!(url = %url, method = %method, "write request");

        let mut builder = self.request(method, url.clone());
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|error| {
            AppError::Internal(format!("request to {url} failed: {error}"))
        })?;

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(error_from_response(response).await)
        }
    }
}

async fn error_from_response(response: reqwest::Response) -> AppError {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<response body unavailable>".to_owned());
    let message = serde_json::from_str::<ErrorResponse>(body.as_str())
        .ok()
        .and_then(|payload| payload.message)
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                format!("backend responded with status {status}")
            } else {
                body
            }
        });

    error_for_status(status, message)
}

fn error_for_status(status: StatusCode, message: String) -> AppError {
    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => AppError::Validation(message),
        StatusCode::UNAUTHORIZED => AppError::Unauthorized(message),
        StatusCode::FORBIDDEN => AppError::Forbidden(message),
        StatusCode::NOT_FOUND => AppError::NotFound(message),
        StatusCode::CONFLICT => AppError::Conflict(message),
        _ => AppError::Internal(message),
    }
}

#[async_trait]
impl RoleAdminRepository for HttpRoleAdminRepository {
    async fn list_system_modules(&self) -> AppResult<ModuleCatalog> {
        let modules: Vec<SystemModuleResponse> = self.get_json(&["system-modules"]).await?;
        let modules = modules
            .into_iter()
            .map(SystemModuleResponse::into_module)
            .collect::<AppResult<Vec<_>>>()?;

        ModuleCatalog::new(modules)
    }

    async fn list_roles(&self) -> AppResult<Vec<RoleSummary>> {
        let roles: Vec<RoleSummaryResponse> = self.get_json(&["roles"]).await?;
        roles
            .into_iter()
            .map(RoleSummaryResponse::into_summary)
            .collect()
    }

    async fn find_role(&self, role_id: &RoleId) -> AppResult<RoleRecord> {
        let role: RoleResponse = self.get_json(&["roles", role_id.as_str()]).await?;
        role.into_record()
    }

    async fn create_role(&self, draft: &RoleDraft) -> AppResult<RoleId> {
        let request = RoleWriteRequest {
            name: draft.name().as_str(),
            description: draft.description().as_str(),
        };
        let response = self
            .send_once(Method::POST, &["roles"], Some(&request))
            .await?;

        let created: CreatedRoleResponse = response.json().await.map_err(|error| {
            AppError::Internal(format!("invalid create role response: {error}"))
        })?;
        let role_id = created.id.into_role_id()?;
        debug!(role_id = %role_id, "role created");
        Ok(role_id)
    }

    async fn update_role(&self, role_id: &RoleId, draft: &RoleDraft) -> AppResult<RoleId> {
        let request = RoleWriteRequest {
            name: draft.name().as_str(),
            description: draft.description().as_str(),
        };
        self.send_once(Method::PATCH, &["roles", role_id.as_str()], Some(&request))
            .await?;

        Ok(role_id.clone())
    }

    async fn replace_role_permissions(
        &self,
        role_id: &RoleId,
        grants: &[PermissionGrant],
    ) -> AppResult<()> {
        let request = ReplacePermissionsRequest {
            permission_names: grants.iter().map(PermissionGrant::to_wire).collect(),
        };
        self.send_once(
            Method::POST,
            &["roles", role_id.as_str(), "permissions"],
            Some(&request),
        )
        .await?;

        debug!(
            role_id = %role_id,
            grant_count = grants.len(),
            "role permissions replaced"
        );
        Ok(())
    }

    async fn delete_role(&self, role_id: &RoleId) -> AppResult<()> {
        self.send_once(
            Method::DELETE,
            &["roles", role_id.as_str()],
            None::<&serde_json::Value>,
        )
        .await?;

        Ok(())
    }
}
