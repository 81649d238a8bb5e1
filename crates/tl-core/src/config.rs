//! Extraction options and the `lineage.yml` configuration file

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default limit on the nesting depth of a textual Hive AST
pub const DEFAULT_MAX_AST_DEPTH: usize = 10_000;

/// File names searched by [`Config::load_from_dir`], in order
pub const CONFIG_FILE_NAMES: [&str; 2] = ["lineage.yml", "lineage.yaml"];

/// Per-call options of the traversal engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractOptions {
    /// Also record a reference to a CTE under the CTE's own name.
    ///
    /// Off by default: only the tables read by the CTE body are recorded.
    #[serde(default)]
    pub emit_cte_as_synthetic_name: bool,
}

impl ExtractOptions {
    pub fn emit_cte_names(mut self, emit: bool) -> Self {
        self.emit_cte_as_synthetic_name = emit;
        self
    }
}

/// SQL dialect of the upstream text parser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// HiveQL
    #[default]
    Hive,
    /// Spark SQL
    Spark,
    /// ANSI-ish generic SQL
    Generic,
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dialect::Hive => write!(f, "hive"),
            Dialect::Spark => write!(f, "spark"),
            Dialect::Generic => write!(f, "generic"),
        }
    }
}

/// Configuration from lineage.yml
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Dialect used to parse SQL text
    #[serde(default)]
    pub dialect: Dialect,

    /// See [`ExtractOptions::emit_cte_as_synthetic_name`]
    #[serde(default)]
    pub emit_cte_as_synthetic_name: bool,

    /// Maximum nesting depth accepted when reading a Hive AST dump
    #[serde(default = "default_max_ast_depth")]
    pub max_ast_depth: usize,
}

fn default_max_ast_depth() -> usize {
    DEFAULT_MAX_AST_DEPTH
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            emit_cte_as_synthetic_name: false,
            max_ast_depth: DEFAULT_MAX_AST_DEPTH,
        }
    }
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> CoreResult<Self> {
        // An empty file means "all defaults"
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a directory
    /// Looks for lineage.yml or lineage.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        for name in CONFIG_FILE_NAMES {
            let path = dir.join(name);
            if path.exists() {
                return Self::load(&path);
            }
        }
        Err(CoreError::ConfigNotFound {
            path: dir.join(CONFIG_FILE_NAMES[0]).display().to_string(),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> CoreResult<()> {
        if self.max_ast_depth == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "max_ast_depth must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Engine options derived from this configuration
    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            emit_cte_as_synthetic_name: self.emit_cte_as_synthetic_name,
        }
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
