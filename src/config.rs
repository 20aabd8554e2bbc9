//
//  config.rs
//  Retain
//
//  Created by hak (tharun)
//

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, RetainError};
use crate::reach::helpers::DEFAULT_NAMESPACE;
use crate::reach::{TraversalStrategy, VisibilityPolicy};

/// Top-level configuration, read from `retain.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetainConfig {
    #[serde(default)]
    pub walk: WalkConfig,
    #[serde(default)]
    pub helpers: HelperConfig,
    #[serde(default)]
    pub include: IncludeConfig,
    #[serde(default)]
    pub foreign: ForeignConfig,
}

/// Traversal settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalkConfig {
    #[serde(default)]
    pub strategy: TraversalStrategy,
    /// Record first-reach edges so `explain` can answer.
    #[serde(default = "default_record_retention")]
    pub record_retention: bool,
}

/// Support namespace settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HelperConfig {
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncludeConfig {
    #[serde(default)]
    pub policy: VisibilityPolicy,
}

/// Foreign class repository settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignConfig {
    /// Directory of class descriptions (relative to the config file).
    #[serde(default = "default_class_path")]
    pub class_path: String,
}

fn default_record_retention() -> bool {
    true
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn default_class_path() -> String {
    "classes".to_string()
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            strategy: TraversalStrategy::default(),
            record_retention: default_record_retention(),
        }
    }
}

impl Default for HelperConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
        }
    }
}

impl Default for ForeignConfig {
    fn default() -> Self {
        Self {
            class_path: default_class_path(),
        }
    }
}

impl RetainConfig {
    /// Load config from a TOML file, falling back to defaults when it is missing.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_toml_str(&contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(RetainError::io(path, e)),
        }
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }
}
