//! Transfer configuration.
//!
//! One [`Config`] is built by the caller at startup and passed by reference
//! to whatever needs it. Config files are JSON and may contain `//` comment
//! lines.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::mirror::MirrorTable;
use crate::scene::AttributeFilter;
use crate::transfer::PasteOption;
use crate::util::{json, Result};

/// Environment variable pointing at a config file.
pub const CONFIG_ENV: &str = "POSELIB_CONFIG";

/// Settings shared by capture and restore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Attributes captured when none are given; empty means all listed
    pub default_attributes: Vec<String>,

    /// Treat the first unresolved object of a restore as fatal
    pub strict: bool,

    /// Default animation paste mode
    pub paste: PasteOption,

    /// Mirror table used when mirroring is requested without one
    pub mirror_table: Option<PathBuf>,

    /// Indent saved transfer files
    pub pretty: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_attributes: Vec::new(),
            strict: false,
            paste: PasteOption::Replace,
            mirror_table: None,
            pretty: true,
        }
    }
}

impl Config {
    /// Platform config file location (`<config dir>/poselib/config.json`).
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("poselib").join("config.json"))
    }

    /// Load a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let config = json::read_json(path.as_ref(), true)?;
        debug!("Loaded config {}", path.as_ref().display());
        Ok(config)
    }

    /// Resolve the config to use.
    ///
    /// Priority: explicit path → `POSELIB_CONFIG` → platform config file if
    /// present → defaults. An explicit or env path that does not exist is an
    /// error; a missing platform file is not.
    pub fn locate(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Self::load(PathBuf::from(path));
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }

    /// Atomically write the config.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        json::write_json_atomic(path.as_ref(), self, true)
    }

    /// Capture filter derived from `default_attributes`.
    pub fn attribute_filter(&self) -> AttributeFilter {
        if self.default_attributes.is_empty() {
            AttributeFilter::All
        } else {
            AttributeFilter::Names(self.default_attributes.clone())
        }
    }

    /// Load the configured mirror table, if any.
    pub fn mirror_table(&self) -> Result<Option<MirrorTable>> {
        self.mirror_table
            .as_deref()
            .map(|path| MirrorTable::from_file(path))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::Error;

    #[test]
    fn test_defaults_fill_missing_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            "// studio defaults\n{\n  \"strict\": true,\n  // channels\n  \"defaultAttributes\": [\"rotateX\"]\n}\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert!(config.strict);
        assert!(config.pretty);
        assert_eq!(config.paste, PasteOption::Replace);
        assert_eq!(config.attribute_filter(), AttributeFilter::names(&["rotateX"]));
    }

    #[test]
    fn test_explicit_missing_path_is_error() {
        let err = Config::locate(Some(Path::new("/definitely/not/here.json"))).unwrap_err();
        assert!(matches!(err, Error::FileNotFound(_)));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = Config {
            paste: PasteOption::Insert,
            ..Config::default()
        };
        config.save(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), config);
        assert_eq!(config.attribute_filter(), AttributeFilter::All);
        assert!(config.mirror_table().unwrap().is_none());
    }
}
