use std::env;
use std::str::FromStr;

use stratum_core::{AccessToken, AppError, AppResult};
use tracing_subscriber::EnvFilter;
use url::Url;

#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    pub api_base_url: Url,
    pub api_token: Option<AccessToken>,
    pub http_timeout_seconds: u64,
    pub http_max_attempts: u8,
    pub http_retry_backoff_ms: u64,
    pub cache_ttl_seconds: u32,
}

impl ConsoleConfig {
    pub fn load() -> AppResult<Self> {
        Self::from_source(|name| env::var(name).ok())
    }

    fn from_source(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let raw_base_url = required(&lookup, "STRATUM_API_BASE_URL")?;
        let api_base_url = Url::parse(raw_base_url.trim()).map_err(|error| {
            AppError::Validation(format!(
                "invalid STRATUM_API_BASE_URL '{raw_base_url}': {error}"
            ))
        })?;
        if !matches!(api_base_url.scheme(), "http" | "https") {
            return Err(AppError::Validation(
                "STRATUM_API_BASE_URL must use http or https".to_owned(),
            ));
        }

        let api_token = lookup("STRATUM_API_TOKEN")
            .filter(|value| !value.trim().is_empty())
            .map(AccessToken::new)
            .transpose()?;

        let http_timeout_seconds: u64 = parse(&lookup, "STRATUM_HTTP_TIMEOUT_SECONDS", 15)?;
        let http_max_attempts: u8 = parse(&lookup, "STRATUM_HTTP_MAX_ATTEMPTS", 3)?;
        let http_retry_backoff_ms: u64 = parse(&lookup, "STRATUM_HTTP_RETRY_BACKOFF_MS", 200)?;
        let cache_ttl_seconds: u32 = parse(&lookup, "STRATUM_CACHE_TTL_SECONDS", 300)?;

        if http_timeout_seconds == 0 {
            return Err(AppError::Validation(
                "STRATUM_HTTP_TIMEOUT_SECONDS must be greater than zero".to_owned(),
            ));
        }

        if http_max_attempts == 0 {
            return Err(AppError::Validation(
                "STRATUM_HTTP_MAX_ATTEMPTS must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            api_base_url,
            api_token,
            http_timeout_seconds,
            http_max_attempts,
            http_retry_backoff_ms,
            cache_ttl_seconds,
        })
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn required(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> AppResult<String> {
    lookup(name)
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| AppError::Validation(format!("{name} is required")))
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> AppResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(value) => value.trim().parse::<T>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use stratum_core::AppError;

    use super::ConsoleConfig;

    fn load(pairs: &[(&str, &str)]) -> Result<ConsoleConfig, AppError> {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
            .collect();
        ConsoleConfig::from_source(|name| values.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_only_base_url_is_set() {
        let config = load(&[("STRATUM_API_BASE_URL", "https://admin.example.com/api/")])
            .unwrap_or_else(|error| panic!("{error}"));

        assert_eq!(config.api_base_url.as_str(), "https://admin.example.com/api/");
        assert!(config.api_token.is_none());
        assert_eq!(config.http_timeout_seconds, 15);
        assert_eq!(config.http_max_attempts, 3);
        assert_eq!(config.http_retry_backoff_ms, 200);
        assert_eq!(config.cache_ttl_seconds, 300);
    }

    #[test]
    fn base_url_is_required() {
        assert_eq!(
            load(&[]).err(),
            Some(AppError::Validation(
                "STRATUM_API_BASE_URL is required".to_owned()
            ))
        );
    }

    #[test]
    fn non_http_base_url_is_rejected() {
        assert!(load(&[("STRATUM_API_BASE_URL", "ftp://admin.example.com")]).is_err());
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        let result = load(&[
            ("STRATUM_API_BASE_URL", "http://localhost:3001"),
            ("STRATUM_HTTP_MAX_ATTEMPTS", "many"),
        ]);
        assert!(matches!(result, Err(AppError::Validation(_))));

        let result = load(&[
            ("STRATUM_API_BASE_URL", "http://localhost:3001"),
            ("STRATUM_HTTP_MAX_ATTEMPTS", "0"),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn token_is_read_when_present() {
        let config = load(&[
            ("STRATUM_API_BASE_URL", "http://localhost:3001"),
            ("STRATUM_API_TOKEN", "abc123"),
            ("STRATUM_CACHE_TTL_SECONDS", "0"),
        ])
        .unwrap_or_else(|error| panic!("{error}"));

        assert_eq!(
            config.api_token.as_ref().map(|token| token.bearer_header()),
            Some("Bearer abc123".to_owned())
        );
        assert_eq!(config.cache_ttl_seconds, 0);
    }
}
