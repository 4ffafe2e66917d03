use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use steward_application::{ResolutionConfig, parse_flag};
use steward_core::AppError;
use steward_domain::FallbackPolicy;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_ACCESS_CONTEXT_TTL_SECONDS: u32 = 300;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub database_url: String,
    pub database_max_connections: u32,
    pub api_host: String,
    pub api_port: u16,
    pub access_context_ttl_seconds: u32,
    pub fallback_policy_path: Option<PathBuf>,
    pub strict_role_names: bool,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

        let database_url = required_env("DATABASE_URL")?;
        let database_max_connections = parse_env_number(
            "DATABASE_MAX_CONNECTIONS",
            optional_env("DATABASE_MAX_CONNECTIONS"),
            10,
        )?;
        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = parse_env_number("API_PORT", optional_env("API_PORT"), 3001)?;
        let access_context_ttl_seconds = parse_env_number(
            "ACCESS_CONTEXT_TTL_SECONDS",
            optional_env("ACCESS_CONTEXT_TTL_SECONDS"),
            DEFAULT_ACCESS_CONTEXT_TTL_SECONDS,
        )?;
        let fallback_policy_path = optional_env("FALLBACK_POLICY_PATH").map(PathBuf::from);
        let strict_role_names = optional_env("STRICT_ROLE_NAMES")
            .map(|value| parse_flag("STRICT_ROLE_NAMES", value.as_str()))
            .transpose()?
            .unwrap_or(cfg!(debug_assertions));

        Ok(Self {
            migrate_only,
            database_url,
            database_max_connections,
            api_host,
            api_port,
            access_context_ttl_seconds,
            fallback_policy_path,
            strict_role_names,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }

    /// Builds the resolution settings, reading the fallback policy file when one is configured.
    pub fn resolution_config(&self) -> Result<ResolutionConfig, AppError> {
        let policy = match &self.fallback_policy_path {
            Some(path) => {
                let document = std::fs::read_to_string(path).map_err(|error| {
                    AppError::Validation(format!(
                        "failed to read FALLBACK_POLICY_PATH '{}': {error}",
                        path.display()
                    ))
                })?;
                let policy = FallbackPolicy::from_json(document.as_str())?;
                info!(
                    path = %path.display(),
                    version = policy.version(),
                    "loaded fallback policy"
                );
                policy
            }
            None => FallbackPolicy::standard(),
        };

        Ok(ResolutionConfig::new(policy, self.strict_role_names))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn optional_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
}

fn parse_env_number<T>(name: &str, value: Option<String>, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|error| AppError::Validation(format!("invalid {name} '{value}': {error}"))),
        None => Ok(default),
    }
}
