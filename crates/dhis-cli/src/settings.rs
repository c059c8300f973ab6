//! Viewer settings, stored as TOML in the platform config folder:
//! - macOS: ~/Library/Application Support/org.dhis2-viewer.DHIS2 Viewer/
//! - Windows: %APPDATA%/dhis2-viewer/DHIS2 Viewer/config/
//! - Linux: ~/.config/dhis2viewer/
//!
//! Credentials are never stored; the password comes from the command
//! line or `DHIS2_PASSWORD`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use dhis_analysis::{Period, Thresholds};
use dhis_client::{DEFAULT_TIMEOUT, ResolverOptions, SortOrder};
use dhis_model::ScopeFilter;

const APP_QUALIFIER: &str = "org";
const APP_ORG: &str = "dhis2-viewer";
const APP_NAME: &str = "DHIS2 Viewer";
const CONFIG_FILENAME: &str = "settings.toml";

pub const DEFAULT_BASE_URL: &str = "https://senegal.dhis2.org/dhis";
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// All persisted settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub catalog: CatalogSettings,
    pub analysis: AnalysisSettings,
    pub resolver: ResolverOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub base_url: String,
    pub username: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            username: None,
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl ServerSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    pub page_size: usize,
    pub scope: ScopeFilter,
    pub sort: SortOrder,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            scope: ScopeFilter::default(),
            sort: SortOrder::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    pub period: Period,
    pub top_n: usize,
    pub thresholds: Thresholds,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            period: Period::default(),
            top_n: dhis_analysis::views::geographic::DEFAULT_TOP_N,
            thresholds: Thresholds::default(),
        }
    }
}

/// Path of the settings file, `None` when the platform has no config folder.
pub fn settings_path() -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
}

/// Load settings from `explicit`, or from [`settings_path`].
///
/// Defaults are returned if:
/// - no path can be determined
/// - the file doesn't exist
/// - the file cannot be read or parsed
pub fn load_settings(explicit: Option<&Path>) -> Settings {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match settings_path() {
            Some(path) => path,
            None => {
                tracing::warn!("could not determine settings path, using defaults");
                return Settings::default();
            }
        },
    };
    load_settings_from(&path)
}

pub fn load_settings_from(path: &Path) -> Settings {
    match fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(settings) => {
                tracing::info!("loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                tracing::warn!("failed to parse {}: {e}, using defaults", path.display());
                Settings::default()
            }
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("no settings file at {}, using defaults", path.display());
            Settings::default()
        }
        Err(e) => {
            tracing::warn!("failed to read {}: {e}, using defaults", path.display());
            Settings::default()
        }
    }
}

/// Write `settings` to `path`, creating the parent folder.
pub fn save_settings(path: &Path, settings: &Settings) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create config directory {}", parent.display()))?;
    }
    let content = toml::to_string_pretty(settings).context("serialize settings")?;
    fs::write(path, content).with_context(|| format!("write {}", path.display()))?;
    tracing::info!("saved settings to {}", path.display());
    Ok(())
}
