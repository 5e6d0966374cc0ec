use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Resolve the vault data directory path based on priority:
/// 1. Explicit path (with tilde expansion)
/// 2. CHATVAULT_PATH environment variable (with tilde expansion)
/// 3. XDG data directory (recommended default)
/// 4. ~/.chatvault (fallback for systems without XDG)
pub fn resolve_vault_path(explicit_path: Option<&str>) -> Result<PathBuf> {
    if let Some(path) = explicit_path {
        return Ok(expand_tilde(path));
    }

    if let Ok(env_path) = std::env::var("CHATVAULT_PATH") {
        return Ok(expand_tilde(&env_path));
    }

    if let Some(data_dir) = dirs::data_dir() {
        return Ok(data_dir.join("chatvault"));
    }

    if let Some(home) = std::env::var_os("HOME") {
        return Ok(PathBuf::from(home).join(".chatvault"));
    }

    Err(Error::Config(
        "Could not determine vault path: no HOME directory or XDG data directory found"
            .to_string(),
    ))
}

/// Expand tilde (~) in paths to the user's home directory
fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = std::env::var_os("HOME")
    {
        return PathBuf::from(home).join(stripped);
    }
    PathBuf::from(path)
}

fn default_page_size() -> usize {
    50
}

/// Vault runtime configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Window size used when the viewer does not ask for a specific one.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

impl VaultConfig {
    /// Load from a TOML file; a missing file means defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: VaultConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = VaultConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.page_size, 50);
    }

    #[test]
    fn config_round_trips_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = VaultConfig { page_size: 20 };
        config.save_to(&path).unwrap();

        let loaded = VaultConfig::load_from(&path).unwrap();
        assert_eq!(loaded.page_size, 20);
    }

    #[test]
    fn explicit_path_wins() {
        let resolved = resolve_vault_path(Some("/tmp/vault")).unwrap();
        assert_eq!(resolved, PathBuf::from("/tmp/vault"));
    }
}
