use async_trait::async_trait;
use chrono::Local;
use fantoccini::{
    Client, ClientBuilder, Locator,
    elements::Element,
    error::CmdError,
    wd::Capabilities,
};
use log::debug;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use tokio::time::{Duration, Instant};

use crate::dom::{self, Table};
use crate::types::{BrowserOptions, TransferError};

/// How often bounded waits re-check the page.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// The UI capabilities the transfer phases need from a browser.
///
/// Selectors are CSS selectors. Methods taking a `timeout` poll until the
/// element is there (or clickable) and fail with
/// [`TransferError::ElementTimeout`] once the timeout runs out; the others
/// look the element up once.
#[async_trait]
pub trait Browser: Send {
    /// Navigates the current tab to the given URL.
    async fn goto(&mut self, url: &str) -> Result<(), TransferError>;

    /// Clicks an element that must already be present.
    async fn click(&mut self, selector: &str) -> Result<(), TransferError>;

    /// Waits until the element is displayed and enabled, then clicks it.
    async fn wait_and_click(&mut self, selector: &str, timeout: Duration)
    -> Result<(), TransferError>;

    /// Waits until the element is present and returns its rendered text.
    async fn wait_for_text(&mut self, selector: &str, timeout: Duration)
    -> Result<String, TransferError>;

    /// Types into an input or textarea that must already be present.
    async fn send_keys(&mut self, selector: &str, text: &str) -> Result<(), TransferError>;

    /// Waits for a `<select>` to become clickable and lists its option labels
    /// in display order.
    async fn option_labels(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Vec<String>, TransferError>;

    /// Selects the option with the given visible label.
    async fn select_option(&mut self, selector: &str, label: &str) -> Result<(), TransferError>;

    /// Waits for a table and reads its header and body texts.
    async fn read_table(&mut self, selector: &str, timeout: Duration)
    -> Result<Table, TransferError>;
}

/// WebDriver-backed browser powered by `fantoccini`.
pub struct BrowserClient {
    /// The underlying WebDriver client instance.
    pub client: Client,
}

impl BrowserClient {
    /// Connects to the WebDriver server and opens a Chrome session bound to
    /// the configured profile directory.
    pub async fn connect(options: &BrowserOptions) -> Result<Self, TransferError> {
        fs::create_dir_all(&options.profile_dir).map_err(|e| {
            TransferError::DriverInit(format!(
                "cannot create profile directory {}: {e}",
                options.profile_dir.display()
            ))
        })?;

        let mut chrome_options = json!({ "args": options.chrome_args() });
        if let Some(binary) = &options.binary {
            chrome_options["binary"] = json!(binary.display().to_string());
        }

        let mut caps = Capabilities::new();
        caps.insert("goog:chromeOptions".to_string(), chrome_options);

        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(&options.webdriver_url)
            .await
            .map_err(|e| TransferError::DriverInit(e.to_string()))?;

        Ok(Self { client })
    }

    /// Polls until an element is displayed and enabled.
    async fn clickable(&self, selector: &str, timeout: Duration) -> Result<Element, TransferError> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Ok(el) = self.client.find(Locator::Css(selector)).await {
                let displayed = el.is_displayed().await.unwrap_or(false);
                let enabled = el.is_enabled().await.unwrap_or(false);
                if displayed && enabled {
                    return Ok(el);
                }
            }
            if Instant::now() >= deadline {
                return Err(TransferError::ElementTimeout(selector.to_string()));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Waits for an element to be present in the DOM.
    async fn present(&self, selector: &str, timeout: Duration) -> Result<Element, TransferError> {
        self.client
            .wait()
            .at_most(timeout)
            .every(POLL_INTERVAL)
            .for_element(Locator::Css(selector))
            .await
            .map_err(|e| match e {
                CmdError::WaitTimeout => TransferError::ElementTimeout(selector.to_string()),
                e => TransferError::Operation(format!("Failed to find '{selector}': {e}")),
            })
    }

    async fn find(&self, selector: &str) -> Result<Element, TransferError> {
        self.client
            .find(Locator::Css(selector))
            .await
            .map_err(|e| TransferError::Operation(format!("Failed to find '{selector}': {e}")))
    }

    /// Capture a timestamped screenshot of the current page.
    pub async fn capture_screenshot(
        &mut self,
        output_dir: &Path,
        prefix: &str,
    ) -> Result<PathBuf, TransferError> {
        let timestamp = Local::now().format("%Y%m%d-%H%M%S%.3f");
        let filename = format!("{prefix}-{timestamp}.png");
        let path = output_dir.join(filename);

        let png_data = self
            .client
            .screenshot()
            .await
            .map_err(|e| TransferError::Operation(e.to_string()))?;

        fs::create_dir_all(output_dir)?;
        fs::write(&path, &png_data)?;

        Ok(path)
    }

    /// Shuts down the browser session and closes the webdriver.
    pub async fn shutdown(self) -> Result<(), TransferError> {
        self.client
            .close()
            .await
            .map_err(|e| TransferError::Operation(e.to_string()))
    }
}

#[async_trait]
impl Browser for BrowserClient {
    async fn goto(&mut self, url: &str) -> Result<(), TransferError> {
        debug!("Navigating to {url}");
        self.client
            .goto(url)
            .await
            .map_err(|e| TransferError::Operation(e.to_string()))
    }

    async fn click(&mut self, selector: &str) -> Result<(), TransferError> {
        debug!("Clicking element '{selector}'");
        let el = self.find(selector).await?;
        el.click().await.map_err(|e| {
            TransferError::Operation(format!("Click failed '{selector}': {e}"))
        })
    }

    async fn wait_and_click(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), TransferError> {
        debug!("Waiting to click element '{selector}'");
        let el = self.clickable(selector, timeout).await?;
        el.click().await.map_err(|e| {
            TransferError::Operation(format!("Click failed '{selector}': {e}"))
        })
    }

    async fn wait_for_text(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<String, TransferError> {
        let el = self.present(selector, timeout).await?;
        el.text().await.map_err(|e| {
            TransferError::Operation(format!("Reading text of '{selector}' failed: {e}"))
        })
    }

    async fn send_keys(&mut self, selector: &str, text: &str) -> Result<(), TransferError> {
        debug!("Typing {} characters into '{selector}'", text.chars().count());
        let el = self.find(selector).await?;
        el.send_keys(text).await.map_err(|e| {
            TransferError::Operation(format!("Send keys failed '{selector}': {e}"))
        })
    }

    async fn option_labels(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Vec<String>, TransferError> {
        let select = self.clickable(selector, timeout).await?;
        let options = select
            .find_all(Locator::Css("option"))
            .await
            .map_err(|e| TransferError::Operation(format!("Listing options failed: {e}")))?;

        let mut labels = Vec::with_capacity(options.len());
        for option in options {
            let label = option
                .text()
                .await
                .map_err(|e| TransferError::Operation(format!("Reading option failed: {e}")))?;
            labels.push(label);
        }
        Ok(labels)
    }

    async fn select_option(&mut self, selector: &str, label: &str) -> Result<(), TransferError> {
        let select = self.find(selector).await?;
        select.select_by_label(label).await.map_err(|e| {
            TransferError::Operation(format!("Selecting '{label}' in '{selector}' failed: {e}"))
        })
    }

    async fn read_table(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Table, TransferError> {
        self.present(selector, timeout).await.map_err(|e| match e {
            TransferError::ElementTimeout(_) => {
                TransferError::Scrape(format!("no element matches '{selector}'"))
            }
            e => e,
        })?;

        let value = self
            .client
            .execute(dom::TABLE_SCRIPT, vec![json!(selector)])
            .await
            .map_err(|e| TransferError::Operation(e.to_string()))?;

        dom::parse_table(selector, value)
    }
}
