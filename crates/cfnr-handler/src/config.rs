//! Handler configuration.
//!
//! Everything a host needs to build a [`Handler`](crate::Handler), loadable
//! from the environment in one call.

use cfnr_callback::config::env_flag;
use cfnr_callback::{CallbackConfig, ConfigError};

/// What scope exit does when no response was sent and no error occurred.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NoResponsePolicy {
    /// Deliver `FAILED` ("No response sent") and return normally.
    #[default]
    Report,
    /// Deliver `FAILED` and also return [`HandlerError::NoResponseSent`].
    ///
    /// [`HandlerError::NoResponseSent`]: crate::HandlerError::NoResponseSent
    Strict,
}

/// Responder behavior switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResponderSettings {
    /// Send the full diagnostic chain as the failure reason.
    pub verbose_failures: bool,
    /// Behavior when the scope closes without a response.
    pub no_response: NoResponsePolicy,
}

/// Configuration for a [`Handler`](crate::Handler).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandlerConfig {
    /// Callback delivery settings.
    pub callback: CallbackConfig,
    /// Responder settings.
    pub responder: ResponderSettings,
}

impl HandlerConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables (in addition to those read by [`CallbackConfig::from_env`]):
    /// - `CFNR_VERBOSE_FAILURES` (default: false)
    /// - `CFNR_STRICT_RESPONSES` (default: false)
    pub fn from_env() -> Result<Self, ConfigError> {
        let strict = env_flag("CFNR_STRICT_RESPONSES", false)?;
        Ok(Self {
            callback: CallbackConfig::from_env()?,
            responder: ResponderSettings {
                verbose_failures: env_flag("CFNR_VERBOSE_FAILURES", false)?,
                no_response: if strict {
                    NoResponsePolicy::Strict
                } else {
                    NoResponsePolicy::Report
                },
            },
        })
    }
}
