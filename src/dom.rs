use crate::types::TransferError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Header and cell texts of an HTML table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Reads `thead th` and `tbody tr > td` texts of the table matching `arguments[0]`.
/// Returns `null` when no such element exists.
pub const TABLE_SCRIPT: &str = r#"
    const table = document.querySelector(arguments[0]);
    if (!table) {
        return null;
    }
    const text = (el) => (el.innerText || el.textContent || "").trim();
    return {
        headers: Array.from(table.querySelectorAll("thead th")).map(text),
        rows: Array.from(table.querySelectorAll("tbody tr")).map(
            (tr) => Array.from(tr.querySelectorAll("td")).map(text)
        ),
    };
"#;

/// Turns the value returned by [`TABLE_SCRIPT`] into a [`Table`].
pub fn parse_table(selector: &str, value: Value) -> Result<Table, TransferError> {
    if value.is_null() {
        return Err(TransferError::Scrape(format!("no element matches '{selector}'")));
    }

    serde_json::from_value(value)
        .map_err(|e| TransferError::Scrape(format!("unreadable table '{selector}': {e}")))
}
