use std::str::FromStr;
use std::sync::Arc;

use steward_core::{AppError, AppResult};
use steward_domain::{FallbackPolicy, Role};
use tracing::warn;

/// Settings shared by every resolution.
#[derive(Debug, Clone)]
pub struct ResolutionConfig {
    /// Fallback table applied when no explicit grant resolves a query.
    pub fallback_policy: Arc<FallbackPolicy>,
    /// Whether role checks with an unknown role name fail instead of answering false.
    pub strict_role_names: bool,
}

impl ResolutionConfig {
    /// Creates a configuration.
    #[must_use]
    pub fn new(fallback_policy: FallbackPolicy, strict_role_names: bool) -> Self {
        Self {
            fallback_policy: Arc::new(fallback_policy),
            strict_role_names,
        }
    }

    /// Parses caller-supplied role names.
    ///
    /// Unknown names are a caller bug: in strict mode they fail, otherwise they
    /// are logged and dropped so the check answers as if the role were not held.
    pub fn parse_role_names(&self, names: &[&str]) -> AppResult<Vec<Role>> {
        let mut roles = Vec::with_capacity(names.len());
        for name in names {
            match Role::from_str(name.trim()) {
                Ok(role) => roles.push(role),
                Err(error) if self.strict_role_names => return Err(error),
                Err(_) => warn!(role = %name, "role check used an unknown role name"),
            }
        }

        Ok(roles)
    }
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self::new(FallbackPolicy::standard(), cfg!(debug_assertions))
    }
}

/// Parses the value of a boolean setting such as `STRICT_ROLE_NAMES`.
pub fn parse_flag(name: &str, value: &str) -> AppResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(AppError::Validation(format!(
            "{name} must be a boolean, got '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use steward_core::AppError;
    use steward_domain::{FallbackPolicy, Role};

    use super::{ResolutionConfig, parse_flag};

    #[test]
    fn strict_mode_rejects_unknown_role_names() {
        let config = ResolutionConfig::new(FallbackPolicy::standard(), true);
        let result = config.parse_role_names(&["leader", "bishop"]);
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn lenient_mode_drops_unknown_role_names() {
        let config = ResolutionConfig::new(FallbackPolicy::standard(), false);
        let roles = config
            .parse_role_names(&["leader", "bishop", " pastor "])
            .unwrap_or_default();
        assert_eq!(roles, vec![Role::Leader, Role::Pastor]);
    }

    #[test]
    fn flags_accept_common_spellings() {
        assert_eq!(parse_flag("X", "TRUE").ok(), Some(true));
        assert_eq!(parse_flag("X", "off").ok(), Some(false));
        assert!(parse_flag("X", "maybe").is_err());
    }
}
