//! TOML configuration file.
//!
//! ```toml
//! data_dir = "/var/lib/ontorel"
//! parallel_threshold = 4096
//!
//! [prefixes]
//! obo = "http://purl.obolibrary.org/obo/"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::classify::DEFAULT_PARALLEL_THRESHOLD;
use crate::engine::EngineConfig;
use crate::error::ConfigError;
use crate::prefix::Prefix;

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// On-disk engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Data directory for the redb store. Memory-only when absent.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// Node count from which classification runs in parallel.
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,
    /// Extra CURIE prefixes, name to base IRI.
    #[serde(default)]
    pub prefixes: BTreeMap<String, String>,
}

fn default_parallel_threshold() -> usize {
    DEFAULT_PARALLEL_THRESHOLD
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            data_dir: None,
            parallel_threshold: default_parallel_threshold(),
            prefixes: BTreeMap::new(),
        }
    }
}

impl ConfigFile {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::parse(&content, path)
    }

    fn parse(content: &str, path: &Path) -> ConfigResult<Self> {
        let config: ConfigFile = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        if let Some((name, _)) = config.prefixes.iter().find(|(_, base)| base.is_empty()) {
            return Err(ConfigError::Invalid {
                message: format!("prefix '{name}' has an empty base IRI"),
            });
        }
        Ok(config)
    }

    /// Convert to an `EngineConfig`.
    pub fn to_engine_config(&self) -> EngineConfig {
        EngineConfig {
            data_dir: self.data_dir.clone(),
            prefixes: self
                .prefixes
                .iter()
                .map(|(prefix, base)| Prefix {
                    prefix: prefix.clone(),
                    base: base.clone(),
                })
                .collect(),
            parallel_threshold: self.parallel_threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let cfg = ConfigFile::parse("", Path::new("empty.toml")).unwrap();
        assert_eq!(cfg, ConfigFile::default());
        assert!(cfg.to_engine_config().data_dir.is_none());
    }

    #[test]
    fn load_from_disk() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("ontorel.toml");
        std::fs::write(
            &path,
            "data_dir = \"/tmp/onto\"\nparallel_threshold = 16\n\n[prefixes]\nobo = \"http://purl.obolibrary.org/obo/\"\n",
        )
        .unwrap();

        let cfg = ConfigFile::load(&path).unwrap();
        let engine_cfg = cfg.to_engine_config();
        assert_eq!(engine_cfg.parallel_threshold, 16);
        assert_eq!(engine_cfg.data_dir, Some(PathBuf::from("/tmp/onto")));
        assert_eq!(engine_cfg.prefixes[0].prefix, "obo");
    }

    #[test]
    fn bad_toml_is_parse_error() {
        let err = ConfigFile::parse("parallel_threshold = \"many\"", Path::new("x.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn empty_base_is_invalid() {
        let err = ConfigFile::parse("[prefixes]\nex = \"\"\n", Path::new("x.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = ConfigFile::load(Path::new("/nonexistent/ontorel.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
