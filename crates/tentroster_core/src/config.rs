//! Board configuration.
//!
//! # Responsibility
//! - Carry the policy knobs that are not part of the listing payload.
//! - Parse them from JSON text or a file path.
//!
//! # Invariants
//! - Unknown keys are rejected so typos surface at load time.
//! - `first_container_id` is non-blank and never a sentinel id.

use crate::model::container::is_reserved_id;
use crate::service::lifecycle_service::ContainerDeleteMode;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

const DEFAULT_FIRST_CONTAINER_ID: &str = "A";

/// Errors from configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read board config: {err}"),
            Self::Parse(err) => write!(f, "failed to parse board config: {err}"),
            Self::Invalid(message) => write!(f, "invalid board config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Policy settings for one roster board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BoardConfig {
    /// Behavior of `delete_container` on a container that still has members.
    pub delete_mode: ContainerDeleteMode,
    /// Id given to the container materialized from `PLACEHOLDER` when the
    /// board has none.
    pub first_container_id: String,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            delete_mode: ContainerDeleteMode::default(),
            first_container_id: DEFAULT_FIRST_CONTAINER_ID.to_string(),
        }
    }
}

impl BoardConfig {
    /// Parses and validates a JSON document.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let seed = self.first_container_id.trim();
        if seed.is_empty() {
            return Err(ConfigError::Invalid(
                "first_container_id must not be blank".to_string(),
            ));
        }
        if is_reserved_id(seed) {
            return Err(ConfigError::Invalid(format!(
                "first_container_id `{seed}` collides with a drop sentinel"
            )));
        }
        Ok(())
    }
}
