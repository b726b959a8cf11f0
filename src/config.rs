use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{EmissionError, EmissionResult};
use crate::mass_balance::MassBalanceInput;
use crate::reference::ReferenceTable;

/// Optional TOML settings for the command-line tool.
///
/// ```toml
/// data_path = "data/emission_factors.csv"
///
/// [mass_balance]
/// volume_m3 = 30.0
/// ach_per_h = 0.5
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Reference CSV to load instead of the bundled table.
    pub data_path: Option<PathBuf>,
    /// Defaults for the mass-balance simulation; missing keys keep built-in values.
    pub mass_balance: MassBalanceInput,
}

impl AppConfig {
    /// Parse config text; unknown keys are an error.
    pub fn from_toml_str(text: &str) -> EmissionResult<Self> {
        toml::from_str(text).map_err(|e| EmissionError::Config(e.to_string()))
    }

    /// Read and parse the config file at `path`.
    pub fn from_path<P: AsRef<Path>>(path: P) -> EmissionResult<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        log::debug!("loaded config from {}", path.as_ref().display());
        Self::from_toml_str(&text)
    }

    /// Reference table named by `data_path`, or the bundled one.
    pub fn reference_table(&self) -> EmissionResult<ReferenceTable> {
        match &self.data_path {
            Some(path) => ReferenceTable::from_path(path),
            None => ReferenceTable::bundled().cloned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let cfg = AppConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.mass_balance.volume_m3, 50.0);
        assert_eq!(cfg.mass_balance.emission_g_per_h, 0.1);
    }

    #[test]
    fn test_partial_mass_balance_override() {
        let cfg = AppConfig::from_toml_str(
            "data_path = \"ef.csv\"\n[mass_balance]\nvolume_m3 = 30.0\nk_per_h = 0.2\n",
        )
        .unwrap();
        assert_eq!(cfg.data_path, Some(PathBuf::from("ef.csv")));
        assert_eq!(cfg.mass_balance.volume_m3, 30.0);
        assert_eq!(cfg.mass_balance.k_per_h, 0.2);
        assert_eq!(cfg.mass_balance.ach_per_h, 1.0);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = AppConfig::from_toml_str("[mass_balance]\nvolume = 3.0\n").unwrap_err();
        assert!(matches!(err, EmissionError::Config(_)));
    }

    #[test]
    fn test_bundled_table_when_no_path() {
        let table = AppConfig::default().reference_table().unwrap();
        assert!(!table.is_empty());
    }
}
