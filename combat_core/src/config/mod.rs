//! Configuration loading from TOML files

mod base_stats;
mod constants;
mod roster;

pub use base_stats::{
    builtin_base_stats, default_base_stats, load_base_stats, parse_base_stats, BaseStatsConfig,
};
pub use constants::{CombatConstants, HitConstants, ResistanceConstants};
pub use roster::{
    load_roster, parse_roster, CreatureConfig, ModifierConfig, OperationKind, PlacementConfig,
    RosterConfig, SkillConfig, TargetedModifierConfig,
};

use crate::stats::{ParseValueError, StatId};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration loading error
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", .path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to parse {}: {source}", .path.display())]
    FileParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Invalid value for {stat}: {source}")]
    InvalidValue {
        stat: StatId,
        #[source]
        source: ParseValueError,
    },
    #[error("Configuration validation error: {0}")]
    ValidationError(String),
}

/// Load a TOML file and deserialize it; errors name the file
pub fn load_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::IoError {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::FileParseError {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a TOML string and deserialize it
pub fn parse_toml<T: serde::de::DeserializeOwned>(content: &str) -> Result<T, ConfigError> {
    let config: T = toml::from_str(content)?;
    Ok(config)
}
