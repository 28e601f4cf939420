//! Query pipeline configuration structures.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{QuarryError, QuarryResult};

/// Top-level configuration for planning and execution.
///
/// # Example
///
/// ```rust
/// use quarry_common::config::QueryConfig;
///
/// let config = QueryConfig::default();
/// assert_eq!(config.rewrite.max_iterations, 16);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Rewriter configuration.
    #[serde(default)]
    pub rewrite: RewriteConfig,

    /// Storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
}

impl QueryConfig {
    /// Creates a config with every rewrite rule disabled.
    #[must_use]
    pub fn minimal() -> Self {
        Self {
            rewrite: RewriteConfig::disabled(),
            storage: StorageConfig::default(),
        }
    }

    /// Parses a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> QuarryResult<Self> {
        let config: Self = toml::from_str(content).map_err(|e| QuarryError::InvalidConfig {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a file.
    pub fn from_file(path: &Path) -> QuarryResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| QuarryError::InvalidConfig {
            message: format!("failed to read {}: {}", path.display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// Converts configuration to TOML string.
    pub fn to_toml(&self) -> QuarryResult<String> {
        toml::to_string_pretty(self).map_err(|e| QuarryError::InvalidConfig {
            message: e.to_string(),
        })
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> QuarryResult<()> {
        if self.rewrite.max_iterations == 0 {
            return Err(QuarryError::InvalidConfig {
                message: "rewrite.max_iterations must be at least 1".to_string(),
            });
        }

        for (i, name) in self.storage.sys_fields.iter().enumerate() {
            if name.is_empty() {
                return Err(QuarryError::InvalidConfig {
                    message: format!("storage.sys_fields[{}] is empty", i),
                });
            }
            if self.storage.sys_fields[..i].contains(name) {
                return Err(QuarryError::InvalidConfig {
                    message: format!("duplicate system field '{}'", name),
                });
            }
        }

        Ok(())
    }
}

/// Rewriter configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteConfig {
    /// Upper bound on fixpoint passes before the rewrite is abandoned.
    /// Default: 16
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Expression-level rules (folding, normalization, conjunction cleanup).
    #[serde(default = "default_true")]
    pub enable_expression_rules: bool,

    /// Removal of predicates that are always true.
    #[serde(default = "default_true")]
    pub enable_predicate_rewrite: bool,

    /// Moving single-table predicates into table scans.
    #[serde(default = "default_true")]
    pub enable_predicate_pushdown: bool,
}

fn default_max_iterations() -> usize {
    16
}

fn default_true() -> bool {
    true
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            enable_expression_rules: true,
            enable_predicate_rewrite: true,
            enable_predicate_pushdown: true,
        }
    }
}

impl RewriteConfig {
    /// Creates a config with all rules disabled.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            enable_expression_rules: false,
            enable_predicate_rewrite: false,
            enable_predicate_pushdown: false,
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Names of the integer system fields prepended to every new table.
    /// Default: `["__trx_id"]`
    #[serde(default = "default_sys_fields")]
    pub sys_fields: Vec<String>,
}

fn default_sys_fields() -> Vec<String> {
    vec!["__trx_id".to_string()]
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            sys_fields: default_sys_fields(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = QueryConfig::default();
        assert_eq!(config.rewrite.max_iterations, 16);
        assert!(config.rewrite.enable_predicate_pushdown);
        assert_eq!(config.storage.sys_fields, vec!["__trx_id".to_string()]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_minimal_config() {
        let config = QueryConfig::minimal();
        assert!(!config.rewrite.enable_expression_rules);
        assert!(!config.rewrite.enable_predicate_rewrite);
        assert!(!config.rewrite.enable_predicate_pushdown);
    }

    #[test]
    fn test_validate_rejects_zero_iterations() {
        let mut config = QueryConfig::default();
        config.rewrite.max_iterations = 0;
        assert!(matches!(
            config.validate(),
            Err(QuarryError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_duplicate_sys_field() {
        let mut config = QueryConfig::default();
        config.storage.sys_fields = vec!["__a".to_string(), "__a".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml() {
        let config = QueryConfig::from_toml_str(
            r#"
            [rewrite]
            max_iterations = 4
            enable_predicate_pushdown = false
            "#,
        )
        .unwrap();

        assert_eq!(config.rewrite.max_iterations, 4);
        assert!(!config.rewrite.enable_predicate_pushdown);
        assert!(config.rewrite.enable_expression_rules);
        assert_eq!(config.storage, StorageConfig::default());
    }

    #[test]
    fn test_invalid_toml() {
        let result = QueryConfig::from_toml_str("[rewrite]\nmax_iterations = 0\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("quarry.toml");

        let mut config = QueryConfig::default();
        config.rewrite.max_iterations = 7;
        std::fs::write(&path, config.to_toml().unwrap()).unwrap();

        let loaded = QueryConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
