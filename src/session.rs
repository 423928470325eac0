use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::{Child, Command};
use tokio::time::{Duration, Instant};
use url::Url;

use crate::client::BrowserClient;
use crate::config::Config;
use crate::types::TransferError;

/// How long a spawned WebDriver gets to start answering.
const DRIVER_STARTUP: Duration = Duration::from_secs(10);
const DRIVER_RETRY: Duration = Duration::from_millis(250);

/// A browser session, plus the WebDriver process when we started it.
///
/// The driver process is killed on [`Session::stop`] and also when the
/// session is dropped.
pub struct Session {
    pub browser: BrowserClient,
    driver: Option<Child>,
    screenshot_dir: Option<PathBuf>,
}

impl Session {
    pub async fn start(config: &Config) -> Result<Self, TransferError> {
        let driver = match &config.driver_path {
            Some(path) => Some(spawn_driver(path, &config.webdriver_url)?),
            None => None,
        };

        let options = config.browser_options();
        let deadline = Instant::now() + DRIVER_STARTUP;
        let browser = loop {
            match BrowserClient::connect(&options).await {
                Ok(browser) => break browser,
                Err(e) if driver.is_some() && Instant::now() < deadline => {
                    debug!("WebDriver not ready yet: {e}");
                    tokio::time::sleep(DRIVER_RETRY).await;
                }
                Err(e) => return Err(e),
            }
        };
        info!("Browser session started on {}", config.webdriver_url);

        Ok(Self {
            browser,
            driver,
            screenshot_dir: config.screenshot_dir.clone(),
        })
    }

    /// Saves a screenshot of the current page when a screenshot folder is set.
    pub async fn capture_failure(&mut self, step: &str) {
        let Some(dir) = self.screenshot_dir.clone() else {
            return;
        };
        match self.browser.capture_screenshot(&dir, step).await {
            Ok(path) => info!("Saved screenshot to {}", path.display()),
            Err(e) => warn!("Could not take screenshot: {e}"),
        }
    }

    /// Closes the browser and stops the driver we spawned.
    pub async fn stop(self) -> Result<(), TransferError> {
        let Session {
            browser,
            mut driver,
            ..
        } = self;

        let closed = browser.shutdown().await;
        if let Some(child) = driver.as_mut() {
            if let Err(e) = child.kill().await {
                warn!("Could not stop WebDriver process: {e}");
            }
        }
        info!("Browser session closed");
        closed
    }
}

fn spawn_driver(path: &Path, webdriver_url: &str) -> Result<Child, TransferError> {
    let port = driver_port(webdriver_url)?;

    info!("Starting {} on port {port}", path.display());
    Command::new(path)
        .arg(format!("--port={port}"))
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| TransferError::DriverInit(format!("cannot start {}: {e}", path.display())))
}

/// Port the WebDriver URL points at, the scheme's default when none is given.
fn driver_port(webdriver_url: &str) -> Result<u16, TransferError> {
    let url = Url::parse(webdriver_url).map_err(|e| {
        TransferError::DriverInit(format!("invalid webdriver url '{webdriver_url}': {e}"))
    })?;
    url.port_or_known_default().ok_or_else(|| {
        TransferError::DriverInit(format!("no port in webdriver url '{webdriver_url}'"))
    })
}
