//! Persisted settings for the host side.
//!
//! The rewrite engine never reads this file; hosts load it and pass the base
//! URL and strategy explicitly.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::rewrite::RewriteStrategy;

/// Directory name under the user configuration directory.
const APP_DIR: &str = "altfront";

/// Settings file name.
const CONFIG_FILE: &str = "config.toml";

/// What clicking the toolbar icon does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupMode {
    /// No base URL saved yet: show the settings popup.
    Settings,
    /// A base URL is saved: redirect immediately.
    Direct,
}

/// User settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Root of the alternate front-end, stored normalized.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Overrides the per-entry-point strategy when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<RewriteStrategy>,
}

impl Settings {
    /// Default settings file location, `<config dir>/altfront/config.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error when the platform has no configuration directory.
    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs::config_dir().context("Failed to locate the user configuration directory")?;
        Ok(dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load settings from `path`, falling back to defaults if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("no settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        let settings = toml::from_str(&text)
            .with_context(|| format!("Failed to parse settings in {}", path.display()))?;
        debug!("settings={settings:?}");
        Ok(settings)
    }

    /// Write settings to `path`, creating its parent directory as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or any filesystem operation fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let text = toml::to_string_pretty(self).context("Failed to serialize settings")?;
        fs::write(path, text).with_context(|| format!("Failed to write settings to {}", path.display()))?;
        info!("settings saved to {}", path.display());
        Ok(())
    }

    /// Normalize and store a user-entered base URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBaseUrl`] when the input is blank.
    pub fn set_base_url(&mut self, input: &str) -> Result<(), Error> {
        self.base_url = Some(normalize_base_url(input)?);
        Ok(())
    }

    /// Whether the toolbar icon should open the settings popup or redirect.
    #[must_use]
    pub fn popup_mode(&self) -> PopupMode {
        if self.base_url.is_some() {
            PopupMode::Direct
        } else {
            PopupMode::Settings
        }
    }
}

/// Where the dispatcher reads settings from.
pub trait SettingsSource {
    /// Read the current settings.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing store cannot be read or parsed.
    fn read(&mut self) -> Result<Settings>;
}

/// Settings stored in a TOML file, re-read on every access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsFile {
    path: PathBuf,
}

impl SettingsFile {
    /// Settings backed by the file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the settings file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsSource for SettingsFile {
    fn read(&mut self) -> Result<Settings> {
        Settings::load(&self.path)
    }
}

/// Trim surrounding whitespace and one trailing slash from a base URL.
///
/// # Errors
///
/// Returns [`Error::InvalidBaseUrl`] when nothing is left.
///
/// # Examples
///
/// ```
/// # use altfront::config::normalize_base_url;
/// assert_eq!(normalize_base_url("  https://redditpx.com/ ").unwrap(), "https://redditpx.com");
/// assert!(normalize_base_url("   ").is_err());
/// ```
pub fn normalize_base_url(input: &str) -> Result<String, Error> {
    let trimmed = input.trim();
    let url = trimmed.strip_suffix('/').unwrap_or(trimmed);
    if url.is_empty() {
        return Err(Error::InvalidBaseUrl);
    }
    Ok(url.to_string())
}
