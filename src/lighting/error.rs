//! Errors raised while setting up the shadow pipeline.
//! Per-frame stages never fail, so everything here is an initialization error.

use thiserror::Error;

/// Anything that stops a [`crate::lighting::pipeline::ShadowPipeline`] from being built
#[derive(Debug, Error)]
pub enum ShadowError {
    /// A configuration value is outside of what the stages can work with
    #[error("invalid shadow config `{field}`: {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: String,
    },

    /// A stage kernel could not be prepared
    #[error("failed to load {stage} kernel: {reason}")]
    KernelLoad {
        stage: &'static str,
        reason: String,
    },

    /// The TOML configuration could not be parsed
    #[error("failed to parse shadow config: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

impl ShadowError {
    pub fn invalid_config(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}
