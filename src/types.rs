use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;
use tokio::time::Duration;

//
// ---------- Error Types ----------
//
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("WebDriver session could not be started: {0}")]
    DriverInit(String),

    #[error("Contest page did not have the expected layout: {0}")]
    Scrape(String),

    #[error("Timed out waiting for '{0}'")]
    ElementTimeout(String),

    #[error("Browser operation failed: {0}")]
    Operation(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Contest data store error: {0}")]
    Store(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TransferError {
    /// True when a bounded wait ran out before the element showed up.
    pub fn is_timeout(&self) -> bool {
        matches!(self, TransferError::ElementTimeout(_))
    }
}

//
// ---------- Browser Config ----------
//
/// Configuration options for starting a browser session.
#[derive(Debug, Clone, Serialize)]
pub struct BrowserOptions {
    /// Whether the browser should run in headless mode.
    pub headless: bool,
    /// Optional window dimensions (width, height).
    pub window_size: Option<(u32, u32)>,
    /// Chrome profile directory, keeps the judge login between runs.
    pub profile_dir: PathBuf,
    /// Optional path to the Chrome binary.
    pub binary: Option<PathBuf>,
    /// WebDriver endpoint.
    pub webdriver_url: String,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            headless: false,
            window_size: Some((1920, 1080)),
            profile_dir: PathBuf::from("chrome-profile"),
            binary: None,
            webdriver_url: "http://localhost:4444".to_string(),
        }
    }
}

impl BrowserOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn headless(mut self, enabled: bool) -> Self {
        self.headless = enabled;
        self
    }

    pub fn profile_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.profile_dir = dir.into();
        self
    }

    pub fn binary(mut self, path: impl Into<PathBuf>) -> Self {
        self.binary = Some(path.into());
        self
    }

    pub fn webdriver_url(mut self, url: &str) -> Self {
        self.webdriver_url = url.to_string();
        self
    }

    /// Chrome command-line switches for this session.
    pub fn chrome_args(&self) -> Vec<String> {
        let mut args = vec![
            format!("--user-data-dir={}", self.profile_dir.display()),
            "--no-sandbox".to_string(),
            "--disable-dev-shm-usage".to_string(),
            "--disable-gpu".to_string(),
            "--disable-software-rasterizer".to_string(),
            "--disable-extensions".to_string(),
        ];
        if self.headless {
            args.push("--headless=new".to_string());
        }
        if let Some((width, height)) = self.window_size {
            args.push(format!("--window-size={width},{height}"));
        }
        args
    }
}

//
// ---------- Pacing ----------
//
/// Delays used between UI steps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timing {
    /// Fixed pause after a navigation or click, lets page scripts settle.
    pub settle: Duration,
    /// Upper bound for waiting on an element to appear.
    pub wait: Duration,
}

impl Timing {
    pub fn new(settle: Duration, wait: Duration) -> Self {
        Self { settle, wait }
    }

    /// No settle delay, short waits. Used by tests.
    pub fn instant() -> Self {
        Self {
            settle: Duration::ZERO,
            wait: Duration::from_millis(10),
        }
    }

    /// Sleeps for the full settle delay.
    pub async fn settle(&self) {
        tokio::time::sleep(self.settle).await;
    }

    /// Sleeps for a fraction of the settle delay.
    pub async fn settle_fraction(&self, divisor: u32) {
        tokio::time::sleep(self.settle / divisor.max(1)).await;
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            settle: Duration::from_secs(8),
            wait: Duration::from_secs(5),
        }
    }
}
