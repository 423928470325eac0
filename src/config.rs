use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tokio::time::Duration;

use crate::contest::ContestStore;
use crate::range::LabelRange;
use crate::submit::DEFAULT_LANGUAGES;
use crate::types::{BrowserOptions, Timing, TransferError};

/// Settings for a transfer run, read from a JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Judge account whose accepted submissions are copied.
    pub username: String,
    /// Only needed for the login step.
    pub password: Option<String>,
    /// Where exported solutions are written.
    pub save_folder: PathBuf,
    pub source_contest_url: String,
    pub target_contest_url: String,
    pub start_from: String,
    pub stop_at: Option<String>,
    pub settle_delay_secs: f64,
    pub wait_timeout_secs: f64,
    pub source_data_path: PathBuf,
    pub target_data_path: PathBuf,
    pub file_extension: String,
    /// Submission language preferences, most preferred first.
    pub languages: Vec<String>,
    pub site_url: String,
    pub webdriver_url: String,
    /// WebDriver binary to spawn; when unset one must already listen on
    /// `webdriver_url`.
    pub driver_path: Option<PathBuf>,
    pub browser_binary: Option<PathBuf>,
    pub profile_dir: PathBuf,
    pub headless: bool,
    /// Page screenshots are taken here when a browser step fails.
    pub screenshot_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            username: String::new(),
            password: None,
            save_folder: PathBuf::from("solutions"),
            source_contest_url: String::new(),
            target_contest_url: String::new(),
            start_from: "A".to_string(),
            stop_at: None,
            settle_delay_secs: 8.0,
            wait_timeout_secs: 5.0,
            source_data_path: PathBuf::from("soldata.json"),
            target_data_path: PathBuf::from("newdata.json"),
            file_extension: "cpp".to_string(),
            languages: DEFAULT_LANGUAGES.iter().map(|s| s.to_string()).collect(),
            site_url: "https://vjudge.net/".to_string(),
            webdriver_url: "http://localhost:4444".to_string(),
            driver_path: None,
            browser_binary: None,
            profile_dir: PathBuf::from("chrome-profile"),
            headless: false,
            screenshot_dir: None,
        }
    }
}

impl Config {
    /// Reads the config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, TransferError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        serde_json::from_str(&contents)
            .map_err(|e| TransferError::Config(format!("{}: {e}", path.display())))
    }

    pub fn save(&self, path: &Path) -> Result<(), TransferError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| TransferError::Config(e.to_string()))?;
        fs::write(path, contents)?;
        Ok(())
    }

    pub fn range(&self) -> LabelRange {
        LabelRange::new(self.start_from.clone(), self.stop_at.clone())
    }

    pub fn timing(&self) -> Timing {
        Timing::new(
            secs(self.settle_delay_secs),
            secs(self.wait_timeout_secs),
        )
    }

    pub fn browser_options(&self) -> BrowserOptions {
        let mut options = BrowserOptions::new()
            .headless(self.headless)
            .profile_dir(&self.profile_dir)
            .webdriver_url(&self.webdriver_url);
        if let Some(binary) = &self.browser_binary {
            options = options.binary(binary);
        }
        options
    }

    pub fn source_store(&self) -> ContestStore {
        ContestStore::new(&self.source_data_path)
    }

    pub fn target_store(&self) -> ContestStore {
        ContestStore::new(&self.target_data_path)
    }

    /// Fails unless everything a browser run needs is set.
    pub fn validate(&self) -> Result<(), TransferError> {
        if self.username.trim().is_empty() {
            return Err(TransferError::Config("username is not set".into()));
        }
        if self.source_contest_url.trim().is_empty() {
            return Err(TransferError::Config("source_contest_url is not set".into()));
        }
        if self.start_from.is_empty() {
            return Err(TransferError::Config("start_from is empty".into()));
        }
        for (name, value) in [
            ("settle_delay_secs", self.settle_delay_secs),
            ("wait_timeout_secs", self.wait_timeout_secs),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(TransferError::Config(format!(
                    "{name} must be a non-negative number of seconds"
                )));
            }
        }
        Ok(())
    }

    /// The password, or a config error naming where to set it.
    pub fn require_password(&self) -> Result<&str, TransferError> {
        self.password
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| {
                TransferError::Config(
                    "password is not set (config file or VJUDGE_PASSWORD)".into(),
                )
            })
    }

    pub fn require_target(&self) -> Result<&str, TransferError> {
        let url = self.target_contest_url.trim();
        if url.is_empty() {
            return Err(TransferError::Config("target_contest_url is not set".into()));
        }
        Ok(url)
    }
}

fn secs(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("transfer.json")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.languages.first().map(String::as_str), Some("C++ 20 (gcc 12.2)"));
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transfer.json");
        fs::write(
            &path,
            r#"{"username": "thercube", "source_contest_url": "https://vjudge.net/contest/613268", "stop_at": "J", "settle_delay_secs": 2.5}"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.username, "thercube");
        assert_eq!(config.range(), LabelRange::new("A", Some("J".into())));
        assert_eq!(config.timing().settle, Duration::from_millis(2500));
        assert_eq!(config.timing().wait, Duration::from_secs(5));
        assert_eq!(config.source_data_path, PathBuf::from("soldata.json"));
        config.validate().unwrap();
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conf").join("transfer.json");
        let config = Config {
            username: "me".into(),
            headless: true,
            ..Default::default()
        };

        config.save(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn validation_catches_missing_fields() {
        let config = Config::default();
        assert!(matches!(config.validate(), Err(TransferError::Config(_))));

        let config = Config {
            username: "me".into(),
            source_contest_url: "u".into(),
            settle_delay_secs: -1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(config.require_password().is_err());
        assert!(config.require_target().is_err());
    }

    #[test]
    fn bad_json_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transfer.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(Config::load(&path), Err(TransferError::Config(_))));
    }
}
