// Keyrec Config Parser - TOML with Serde
// Loads recorder policy and platform settings from TOML files

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::combo_parser::{parse_combo_string, ComboParseError};
use crate::policy::{PolicyOptions, DEFAULT_MAX_MOD_KEYS, DEFAULT_MIN_MOD_KEYS};
use crate::recorder::{Platform, ShortcutRecorder};

/// Configuration parser errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("Invalid combo string '{entry}': {source}")]
    InvalidCombo {
        entry: String,
        source: ComboParseError,
    },
}

/// Main configuration structure (root TOML table)
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigToml {
    /// Recorder policy
    #[serde(default)]
    pub recorder: RecorderSection,

    /// Platform override
    #[serde(default)]
    pub platform: Option<PlatformSection>,
}

/// `[recorder]` table
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RecorderSection {
    pub min_mod_keys: i64,
    pub max_mod_keys: i64,
    pub excluded_mod_keys: Vec<String>,
    pub excluded_keys: Vec<String>,
    pub excluded_shortcuts: Vec<ShortcutEntry>,
}

impl Default for RecorderSection {
    fn default() -> Self {
        Self {
            min_mod_keys: DEFAULT_MIN_MOD_KEYS as i64,
            max_mod_keys: DEFAULT_MAX_MOD_KEYS as i64,
            excluded_mod_keys: Vec::new(),
            excluded_keys: Vec::new(),
            excluded_shortcuts: Vec::new(),
        }
    }
}

/// An excluded shortcut, either as a token list or a combo string
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ShortcutEntry {
    Tokens(Vec<String>),
    Combo(String),
}

impl ShortcutEntry {
    fn into_tokens(self) -> Result<Vec<String>, ConfigError> {
        match self {
            ShortcutEntry::Tokens(tokens) => Ok(tokens),
            ShortcutEntry::Combo(combo) => {
                parse_combo_string(&combo).map_err(|source| ConfigError::InvalidCombo {
                    entry: combo.clone(),
                    source,
                })
            }
        }
    }
}

/// `[platform]` table
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct PlatformSection {
    /// Force the Mac-class platform behavior on or off
    pub mac: Option<bool>,
}

/// Resolved recorder configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecorderConfig {
    /// Raw policy options, compiled when a recorder is built
    pub policy: PolicyOptions,
    /// Platform override; `None` means detect
    pub mac: Option<bool>,
    source_path: Option<PathBuf>,
}

impl RecorderConfig {
    /// Load configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let parsed: ConfigToml =
            toml::from_str(content).map_err(|e| ConfigError::TomlParse(e.to_string()))?;

        let recorder = parsed.recorder;
        let excluded_shortcuts = recorder
            .excluded_shortcuts
            .into_iter()
            .map(ShortcutEntry::into_tokens)
            .collect::<Result<Vec<_>, _>>()?;

        log::debug!(
            "Parsed config with {} excluded shortcut(s)",
            excluded_shortcuts.len()
        );

        Ok(Self {
            policy: PolicyOptions {
                excluded_mod_keys: recorder.excluded_mod_keys,
                excluded_keys: recorder.excluded_keys,
                excluded_shortcuts,
                min_mod_keys: recorder.min_mod_keys,
                max_mod_keys: recorder.max_mod_keys,
            },
            mac: parsed.platform.and_then(|p| p.mac),
            source_path: None,
        })
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(&path)?;
        let mut config = Self::from_toml(&content)?;
        config.source_path = Some(path.as_ref().to_path_buf());
        Ok(config)
    }

    /// Get the default config path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("keyrec").join("config.toml"))
    }

    /// Load from the default location, falling back to defaults if absent
    pub fn load_default() -> Result<Self, ConfigError> {
        if let Some(path) = Self::default_path() {
            if path.exists() {
                return Self::from_file(path);
            }
        }
        Ok(Self::default())
    }

    /// Path this config was loaded from, if any
    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    /// Platform after applying the override
    pub fn platform(&self) -> Platform {
        match self.mac {
            Some(is_mac) => Platform::from_mac_flag(is_mac),
            None => Platform::current(),
        }
    }

    /// Compile the policy and build an idle recorder
    pub fn build_recorder(&self) -> ShortcutRecorder {
        ShortcutRecorder::with_options(&self.policy, self.platform())
    }
}
