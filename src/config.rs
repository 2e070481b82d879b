use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "coachscore.toml";

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    /// Directory relative paths in the config resolve against.
    pub base_dir: PathBuf,
}

impl LoadedConfig {
    pub fn store_dir(&self) -> PathBuf {
        crate::utils::fs::resolve_path(&self.base_dir, Path::new(&self.config.store.dir))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub store: StoreConfig,
    pub context: ContextConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub default_assessment: String,
    pub weak_section_percent: u32,
    pub json: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_assessment: "business-health".to_string(),
            weak_section_percent: 60,
            json: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub enabled: bool,
    pub dir: String,
    pub save_attempts: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: ".coachscore/results".to_string(),
            save_attempts: 3,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_id: Option<String>,
}

pub fn load_config(cli_config_path: Option<&Path>, cwd: &Path) -> Result<LoadedConfig> {
    if let Some(path) = cli_config_path {
        let path = crate::utils::fs::resolve_path(cwd, path);
        if !path.exists() {
            bail!(
                "config file not found at {} (passed with --config)",
                path.display()
            );
        }

        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| cwd.to_path_buf());
        return Ok(LoadedConfig {
            config: read_config(&path)?,
            base_dir,
        });
    }

    let local_path = cwd.join(CONFIG_FILE);
    if local_path.exists() {
        return Ok(LoadedConfig {
            config: read_config(&local_path)?,
            base_dir: cwd.to_path_buf(),
        });
    }

    Ok(LoadedConfig {
        config: Config::default(),
        base_dir: cwd.to_path_buf(),
    })
}

pub fn write_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        bail!(
            "refusing to overwrite existing config file: {}",
            path.display()
        );
    }

    let content = default_config_toml()?;
    fs::write(path, content).with_context(|| format!("failed writing {}", path.display()))?;
    Ok(())
}

pub fn default_config_toml() -> Result<String> {
    toml::to_string_pretty(&Config::default()).context("failed to serialize default config")
}

fn read_config(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed reading config file {}", path.display()))?;
    let config = toml::from_str::<Config>(&content)
        .with_context(|| format!("failed parsing config file {}", path.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn partial_file_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
[general]
weak_section_percent = 70

[context]
user_id = "coach-7"
"#,
        )
        .unwrap();

        assert_eq!(config.general.weak_section_percent, 70);
        assert_eq!(config.general.default_assessment, "business-health");
        assert_eq!(config.store.save_attempts, 3);
        assert_eq!(config.context.user_id.as_deref(), Some("coach-7"));
        assert_eq!(config.context.business_id, None);
    }

    #[test]
    fn default_config_round_trips() {
        let text = default_config_toml().unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.store.dir, ".coachscore/results");
        assert!(!text.contains("user_id"));
    }

    #[test]
    fn finds_config_in_cwd_and_resolves_store_dir() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            "[store]\ndir = \"data/results\"\n",
        )
        .unwrap();

        let loaded = load_config(None, dir.path()).unwrap();
        assert_eq!(loaded.store_dir(), dir.path().join("data/results"));
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let dir = tempdir().unwrap();
        let err = load_config(Some(&dir.path().join("nope.toml")), dir.path()).unwrap_err();
        assert!(err.to_string().contains("passed with --config"));
    }

    #[test]
    fn init_refuses_to_overwrite() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        write_default_config(&path).unwrap();
        assert!(write_default_config(&path).is_err());
    }
}
