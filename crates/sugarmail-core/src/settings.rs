//! User settings, stored as JSON in the platform config directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sugarmail_mime::{BodyResolver, DEFAULT_QUOTE_MARKERS};
use tracing::{debug, info, warn};

use crate::conversation::DateOrder;
use crate::error::{Error, Result};
use crate::labels::{DEFAULT_LABELS, LabelTable};

/// Directory under the platform config dir holding our files.
pub const APP_DIR: &str = "sugarmail";

/// Settings file name.
pub const SETTINGS_FILE: &str = "settings.json";

/// Threads listed per tab unless configured otherwise.
pub const DEFAULT_MAX_RESULTS: u32 = 25;

/// Everything the user can configure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// How dates are shown on message cards.
    pub date_order: DateOrder,
    /// Markers where quoted content of a message begins.
    pub quote_markers: Vec<String>,
    /// Label display names.
    pub labels: LabelTable,
    /// Label ids listed as tabs, in order.
    pub tabs: Vec<String>,
    /// Threads requested per tab.
    pub max_results: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            date_order: DateOrder::default(),
            quote_markers: DEFAULT_QUOTE_MARKERS.iter().map(ToString::to_string).collect(),
            labels: LabelTable::default(),
            tabs: DEFAULT_LABELS.iter().map(|(id, _)| (*id).to_string()).collect(),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

impl Settings {
    /// `<config dir>/sugarmail/settings.json`, or a relative path when the
    /// platform has no config dir.
    #[must_use]
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join(SETTINGS_FILE)
    }

    /// Loads settings from [`default_path`](Self::default_path).
    ///
    /// # Errors
    ///
    /// See [`load_from`](Self::load_from).
    pub async fn load() -> Result<Self> {
        Self::load_from(&Self::default_path()).await
    }

    /// Loads settings from a file; a missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid settings
    /// JSON.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let contents = match tokio::fs::read_to_string(path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No settings at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        let settings = Self::parse(&contents)
            .inspect_err(|e| warn!("Unreadable settings at {}: {e}", path.display()))?;
        info!("Settings loaded from {}", path.display());
        Ok(settings)
    }

    /// Saves settings to [`default_path`](Self::default_path).
    ///
    /// # Errors
    ///
    /// See [`save_to`](Self::save_to).
    pub async fn save(&self) -> Result<()> {
        self.save_to(&Self::default_path()).await
    }

    /// Saves settings as pretty-printed JSON, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent()
            && !dir.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(dir).await?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, contents).await?;

        info!("Settings saved to {}", path.display());
        Ok(())
    }

    fn parse(contents: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(contents)?;
        settings.check()?;
        Ok(settings)
    }

    /// Rejects values no view could work with.
    fn check(&self) -> Result<()> {
        if self.max_results == 0 {
            return Err(Error::Config("max_results must be at least 1".into()));
        }
        if self.quote_markers.iter().any(String::is_empty) {
            return Err(Error::Config("quote markers must not be empty".into()));
        }
        Ok(())
    }

    /// Label display names.
    #[must_use]
    pub fn label_table(&self) -> LabelTable {
        self.labels.clone()
    }

    /// Body resolver using the configured quote markers.
    #[must_use]
    pub fn resolver(&self) -> BodyResolver {
        BodyResolver::with_markers(self.quote_markers.iter().cloned())
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.date_order, DateOrder::DayMonthYear);
        assert_eq!(settings.max_results, 25);
        assert_eq!(settings.quote_markers.len(), DEFAULT_QUOTE_MARKERS.len());
        assert_eq!(
            settings.tabs,
            vec!["CATEGORY_PERSONAL", "STARRED", "IMPORTANT", "SENT", "SPAM", "TRASH"]
        );
        assert_eq!(settings.resolver(), BodyResolver::new());
    }

    #[test]
    fn test_default_path() {
        let path = Settings::default_path();
        assert!(path.ends_with("sugarmail/settings.json"));
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"date_order": "month_day_year"}"#).unwrap();
        assert_eq!(settings.date_order, DateOrder::MonthDayYear);
        assert_eq!(settings.labels, LabelTable::default());
        assert_eq!(settings.max_results, DEFAULT_MAX_RESULTS);
    }

    #[tokio::test]
    async fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::load_from(&dir.path().join("absent.json")).await.unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let settings = Settings {
            date_order: DateOrder::MonthDayYear,
            quote_markers: vec!["-----Original Message-----".into()],
            max_results: 10,
            ..Settings::default()
        };
        settings.save_to(&path).await.unwrap();

        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(contents.contains("\n  \"date_order\": \"month_day_year\""));

        let loaded = Settings::load_from(&path).await.unwrap();
        assert_eq!(loaded, settings);
        assert_eq!(loaded.resolver().markers(), ["-----Original Message-----"]);
    }

    #[tokio::test]
    async fn test_invalid_settings_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");

        tokio::fs::write(&path, r#"{"max_results": 0}"#).await.unwrap();
        assert!(matches!(
            Settings::load_from(&path).await,
            Err(Error::Config(_))
        ));

        tokio::fs::write(&path, "not json").await.unwrap();
        assert!(matches!(Settings::load_from(&path).await, Err(Error::Serde(_))));
    }
}
