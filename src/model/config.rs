use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

const DEFAULTS: &str = include_str!("../../config/default.toml");

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub editor: EditorConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EditorConfig {
    pub tab_width: usize,
    pub line_numbers: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            tab_width: 4,
            line_numbers: true,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SearchConfig {
    pub case_sensitive: bool,
}

impl AppConfig {
    /// Load configuration with layering: defaults → user config.
    pub fn load() -> Result<Self> {
        let mut config = Self::defaults()?;

        if let Some(config_path) = Self::user_config_path()
            && config_path.exists()
        {
            let user_str = fs::read_to_string(&config_path)
                .with_context(|| format!("reading {}", config_path.display()))?;
            config = Self::layered(&user_str)
                .with_context(|| format!("parsing {}", config_path.display()))?;
        }

        config.editor.tab_width = config.editor.tab_width.clamp(1, 16);
        Ok(config)
    }

    /// The embedded defaults alone.
    pub fn defaults() -> Result<Self> {
        Ok(toml::from_str(DEFAULTS)?)
    }

    /// Defaults with the keys present in `user` overriding them.
    pub fn layered(user: &str) -> Result<Self> {
        let mut merged: toml::Table = toml::from_str(DEFAULTS)?;
        let overrides: toml::Table = toml::from_str(user)?;
        merge_tables(&mut merged, overrides);
        Ok(toml::Value::Table(merged).try_into()?)
    }

    pub fn user_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "nib").map(|d| d.config_dir().join("config.toml"))
    }

    /// Directory for the rolling log file.
    pub fn log_dir() -> PathBuf {
        directories::ProjectDirs::from("", "", "nib")
            .map(|d| d.data_dir().to_path_buf())
            .unwrap_or_else(std::env::temp_dir)
    }
}

fn merge_tables(base: &mut toml::Table, overrides: toml::Table) {
    for (key, value) in overrides {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(base_table)), toml::Value::Table(over_table)) => {
                merge_tables(base_table, over_table);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}
