//! Callback client configuration.
//!
//! Defaults suit a Lambda-hosted provider. Override via environment
//! variables or explicit construction for tests.

use std::time::Duration;

/// Default request timeout for the callback PUT.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for delivering responses to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackConfig {
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// `User-Agent` header sent with the PUT. `None` uses reqwest's default.
    pub user_agent: Option<String>,
}

impl Default for CallbackConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: None,
        }
    }
}

impl CallbackConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `CFNR_CALLBACK_TIMEOUT_SECS` (default: 30)
    /// - `CFNR_USER_AGENT` (optional)
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when a variable is set but
    /// cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            timeout_secs: env_parse("CFNR_CALLBACK_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
            user_agent: std::env::var("CFNR_USER_AGENT")
                .ok()
                .filter(|s| !s.is_empty()),
        })
    }

    /// Request timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Read and parse an environment variable, falling back to `default` when
/// it is unset.
pub fn env_parse<T: std::str::FromStr>(var: &str, default: T) -> Result<T, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(var.to_string(), raw)),
        Err(_) => Ok(default),
    }
}

/// Read a boolean flag from the environment.
///
/// Accepts `1`/`true`/`yes`/`on` and `0`/`false`/`no`/`off`, case
/// insensitive. Unset or empty means `default`.
pub fn env_flag(var: &str, default: bool) -> Result<bool, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "" => Ok(default),
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidValue(var.to_string(), raw)),
        },
        Err(_) => Ok(default),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {0}: {1:?}")]
    InvalidValue(String, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_thirty_second_timeout() {
        let cfg = CallbackConfig::default();
        assert_eq!(cfg.timeout(), Duration::from_secs(30));
        assert!(cfg.user_agent.is_none());
    }

    #[test]
    fn env_parse_uses_default_when_var_absent() {
        let value: u64 = env_parse("NONEXISTENT_VAR_CFNR_12345", 7).unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn env_parse_rejects_garbage() {
        std::env::set_var("TEST_BAD_TIMEOUT_CFNR", "soon");
        let result: Result<u64, _> = env_parse("TEST_BAD_TIMEOUT_CFNR", 30);
        std::env::remove_var("TEST_BAD_TIMEOUT_CFNR");
        assert_eq!(
            result,
            Err(ConfigError::InvalidValue(
                "TEST_BAD_TIMEOUT_CFNR".into(),
                "soon".into()
            ))
        );
    }

    #[test]
    fn env_flag_accepts_common_spellings() {
        std::env::set_var("TEST_FLAG_CFNR_ON", "Yes");
        std::env::set_var("TEST_FLAG_CFNR_OFF", "0");
        std::env::set_var("TEST_FLAG_CFNR_BAD", "maybe");
        assert_eq!(env_flag("TEST_FLAG_CFNR_ON", false), Ok(true));
        assert_eq!(env_flag("TEST_FLAG_CFNR_OFF", true), Ok(false));
        assert!(env_flag("TEST_FLAG_CFNR_BAD", false).is_err());
        assert_eq!(env_flag("TEST_FLAG_CFNR_UNSET", true), Ok(true));
        std::env::remove_var("TEST_FLAG_CFNR_ON");
        std::env::remove_var("TEST_FLAG_CFNR_OFF");
        std::env::remove_var("TEST_FLAG_CFNR_BAD");
    }

    #[test]
    fn env_flag_empty_value_falls_back_to_default() {
        std::env::set_var("TEST_FLAG_CFNR_EMPTY", "");
        std::env::set_var("TEST_FLAG_CFNR_BLANK", "  ");
        assert_eq!(env_flag("TEST_FLAG_CFNR_EMPTY", true), Ok(true));
        assert_eq!(env_flag("TEST_FLAG_CFNR_EMPTY", false), Ok(false));
        assert_eq!(env_flag("TEST_FLAG_CFNR_BLANK", true), Ok(true));
        std::env::remove_var("TEST_FLAG_CFNR_EMPTY");
        std::env::remove_var("TEST_FLAG_CFNR_BLANK");
    }
}
