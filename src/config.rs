//! Engine configuration, persisted as pretty JSON.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::operation::{DefaultReflectionPredicate, DEFAULT_STRING_MAXLEN};
use crate::sequence::FailurePolicy;

/// Configuration for parsing, execution and rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandoopConfig {
    /// Maximum escaped length of string literals
    pub string_maxlen: usize,

    /// Reaction to statements that throw
    pub failure_policy: FailurePolicy,

    /// Write literals at their use sites in generated code
    pub inline_literals: bool,

    /// Member names (bare or qualified) excluded from enumeration
    pub omit_methods: Vec<String>,

    /// Only enumerate public members
    pub public_only: bool,
}

impl Default for RandoopConfig {
    fn default() -> Self {
        Self {
            string_maxlen: DEFAULT_STRING_MAXLEN,
            failure_policy: FailurePolicy::Halt,
            inline_literals: true,
            omit_methods: Vec::new(),
            public_only: true,
        }
    }
}

impl RandoopConfig {
    /// Member filter described by this configuration.
    pub fn reflection_predicate(&self) -> DefaultReflectionPredicate {
        DefaultReflectionPredicate::new(self.omit_methods.clone(), self.public_only)
    }

    /// Load from a JSON file; missing keys take their defaults.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::PathNotFound(path.to_path_buf()));
        }
        let data = fs::read(path)?;
        let config = serde_json::from_slice(&data)?;
        tracing::debug!("loaded config from {:?}", path);
        Ok(config)
    }

    /// Write as pretty JSON through a temporary file and a rename.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let json = serde_json::to_vec_pretty(self)?;
        let temp_path = path.with_extension("tmp");

        let mut file = File::create(&temp_path)?;
        file.write_all(&json)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&temp_path, path)?;
        tracing::debug!("saved config to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("randoop.json");

        let config = RandoopConfig {
            string_maxlen: 64,
            failure_policy: FailurePolicy::RequireFinal,
            inline_literals: false,
            omit_methods: vec!["hashCode".into()],
            public_only: false,
        };
        config.save(&path).unwrap();
        assert!(!path.with_extension("tmp").exists());

        assert_eq!(RandoopConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_keys_use_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("partial.json");
        fs::write(&path, br#"{ "failure_policy": "require_final" }"#).unwrap();

        let config = RandoopConfig::load(&path).unwrap();
        assert_eq!(config.failure_policy, FailurePolicy::RequireFinal);
        assert_eq!(config.string_maxlen, DEFAULT_STRING_MAXLEN);
        assert!(config.inline_literals);
        assert!(config.public_only);
    }

    #[test]
    fn test_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = RandoopConfig::load(&temp.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::PathNotFound(_)));
    }
}
