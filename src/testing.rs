//! In-memory [`Browser`] used by the unit tests.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::time::Duration;

use crate::client::Browser;
use crate::dom::Table;
use crate::types::TransferError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Goto(String),
    Click(String),
    Keys(String, String),
    Select(String, String),
}

/// Records every interaction. Elements are present unless listed in
/// `missing`; texts, options and the table are whatever the test sets up.
#[derive(Debug, Default)]
pub struct FakeBrowser {
    pub actions: Vec<Action>,
    pub texts: HashMap<String, String>,
    pub missing: HashSet<String>,
    pub options: Vec<String>,
    pub table: Option<Table>,
    /// Text returned for `#code-content`, consumed one entry per read.
    pub codes: Vec<String>,
    /// Fail navigation to this URL with an operation error.
    pub broken_url: Option<String>,
}

impl FakeBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn without(mut self, selector: &str) -> Self {
        self.missing.insert(selector.to_string());
        self
    }

    pub fn gotos(&self) -> Vec<&str> {
        self.actions
            .iter()
            .filter_map(|a| match a {
                Action::Goto(url) => Some(url.as_str()),
                _ => None,
            })
            .collect()
    }

    fn check(&self, selector: &str) -> Result<(), TransferError> {
        if self.missing.contains(selector) {
            Err(TransferError::ElementTimeout(selector.to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Browser for FakeBrowser {
    async fn goto(&mut self, url: &str) -> Result<(), TransferError> {
        if self.broken_url.as_deref() == Some(url) {
            return Err(TransferError::Operation(format!("cannot reach {url}")));
        }
        self.actions.push(Action::Goto(url.to_string()));
        Ok(())
    }

    async fn click(&mut self, selector: &str) -> Result<(), TransferError> {
        if self.missing.contains(selector) {
            return Err(TransferError::Operation(format!("Failed to find '{selector}'")));
        }
        self.actions.push(Action::Click(selector.to_string()));
        Ok(())
    }

    async fn wait_and_click(
        &mut self,
        selector: &str,
        _timeout: Duration,
    ) -> Result<(), TransferError> {
        self.check(selector)?;
        self.actions.push(Action::Click(selector.to_string()));
        Ok(())
    }

    async fn wait_for_text(
        &mut self,
        selector: &str,
        _timeout: Duration,
    ) -> Result<String, TransferError> {
        self.check(selector)?;
        if selector == "#code-content" && !self.codes.is_empty() {
            return Ok(self.codes.remove(0));
        }
        Ok(self.texts.get(selector).cloned().unwrap_or_default())
    }

    async fn send_keys(&mut self, selector: &str, text: &str) -> Result<(), TransferError> {
        if self.missing.contains(selector) {
            return Err(TransferError::Operation(format!("Failed to find '{selector}'")));
        }
        self.actions
            .push(Action::Keys(selector.to_string(), text.to_string()));
        Ok(())
    }

    async fn option_labels(
        &mut self,
        selector: &str,
        _timeout: Duration,
    ) -> Result<Vec<String>, TransferError> {
        self.check(selector)?;
        Ok(self.options.clone())
    }

    async fn select_option(&mut self, selector: &str, label: &str) -> Result<(), TransferError> {
        self.actions
            .push(Action::Select(selector.to_string(), label.to_string()));
        Ok(())
    }

    async fn read_table(
        &mut self,
        selector: &str,
        _timeout: Duration,
    ) -> Result<Table, TransferError> {
        self.table
            .clone()
            .ok_or_else(|| TransferError::Scrape(format!("no element matches '{selector}'")))
    }
}
