use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{MunimError, Result};
use crate::schema;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Path of the registered daybook CSV. Empty until `munim load` runs.
    #[serde(default)]
    pub daybook: String,
    #[serde(default = "default_targets")]
    pub targets: BTreeMap<String, f64>,
}

fn default_targets() -> BTreeMap<String, f64> {
    schema::DEFAULT_TARGETS
        .iter()
        .map(|(company, amount)| (company.to_string(), *amount))
        .collect()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            daybook: String::new(),
            targets: default_targets(),
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("munim")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_default()
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| MunimError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| PathBuf::from(path))
        .to_string_lossy()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let mut settings = Settings {
            daybook: "/tmp/daybook.csv".to_string(),
            targets: BTreeMap::new(),
        };
        settings.targets.insert("SML FINANCE LTD".to_string(), 750_000.0);
        let json = serde_json::to_string_pretty(&settings).unwrap();
        std::fs::write(&path, &json).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let loaded: Settings = serde_json::from_str(&content).unwrap();
        assert_eq!(loaded.daybook, "/tmp/daybook.csv");
        assert_eq!(loaded.targets.get("SML FINANCE LTD"), Some(&750_000.0));
    }

    #[test]
    fn test_defaults_seed_every_company() {
        let s = Settings::default();
        assert!(s.daybook.is_empty());
        assert_eq!(s.targets.len(), schema::DEFAULT_TARGETS.len());
        assert_eq!(s.targets.get("SML FINANCE LTD"), Some(&5_000_000.0));
        assert_eq!(s.targets.get("SANGEETH NIDHI LTD"), Some(&1_500_000.0));
    }

    #[test]
    fn test_load_merges_with_defaults() {
        let json = r#"{"daybook": "/tmp/daybook.csv"}"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(s.daybook, "/tmp/daybook.csv");
        // Missing targets fall back to the seeded quotas.
        assert_eq!(s.targets.get("BRD FINANCE LTD"), Some(&2_000_000.0));
    }

    #[test]
    fn test_shellexpand_leaves_unknown_paths() {
        assert_eq!(shellexpand_path("/no/such/file.csv"), "/no/such/file.csv");
    }
}
