use indexmap::IndexMap;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::future::Future;
use std::path::{Path, PathBuf};

use crate::types::TransferError;

/// Column holding the problem label.
pub const LABEL_COLUMN: &str = "#";
/// Column holding the problem title.
pub const TITLE_COLUMN: &str = "Title";

//
// ---------- Problem Record ----------
//
/// One row of a contest's problem table plus what was derived or copied for it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemRecord {
    /// Display columns as shown on the contest overview (`#`, `Title`, ...).
    #[serde(flatten)]
    pub columns: IndexMap<String, String>,
    /// Problem page inside the contest.
    #[serde(rename = "Link", default)]
    pub link: String,
    /// The configured user's submission history for this problem.
    #[serde(rename = "sol_link", default)]
    pub solution_link: String,
    /// Accepted source code, once copied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ProblemRecord {
    pub fn column(&self, name: &str) -> Option<&str> {
        self.columns.get(name).map(String::as_str)
    }

    /// The problem title, empty when the column is missing.
    pub fn title(&self) -> &str {
        self.column(TITLE_COLUMN).unwrap_or_default()
    }

    pub fn has_code(&self) -> bool {
        self.code.is_some()
    }
}

//
// ---------- Contest Data ----------
//
/// Problem records of one contest keyed by label, in page order.
///
/// Serializes as a JSON object whose key order is the page order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContestData {
    problems: IndexMap<String, ProblemRecord>,
}

impl ContestData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the record for `label`. A new label goes to the end.
    pub fn insert(&mut self, label: impl Into<String>, record: ProblemRecord) {
        self.problems.insert(label.into(), record);
    }

    pub fn get(&self, label: &str) -> Option<&ProblemRecord> {
        self.problems.get(label)
    }

    pub fn get_mut(&mut self, label: &str) -> Option<&mut ProblemRecord> {
        self.problems.get_mut(label)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.problems.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ProblemRecord)> {
        self.problems
            .iter()
            .map(|(label, record)| (label.as_str(), record))
    }

    pub fn len(&self) -> usize {
        self.problems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    /// Copies code from `previous` into records of the same label that have none.
    pub fn carry_code_from(&mut self, previous: &ContestData) {
        for (label, record) in &mut self.problems {
            if record.code.is_none() {
                record.code = previous.get(label).and_then(|r| r.code.clone());
            }
        }
    }

    pub fn to_json(&self) -> Result<String, TransferError> {
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.serialize(&mut ser)
            .map_err(|e| TransferError::Store(e.to_string()))?;
        String::from_utf8(out).map_err(|e| TransferError::Store(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, TransferError> {
        serde_json::from_str(json).map_err(|e| TransferError::Store(e.to_string()))
    }
}

//
// ---------- Store ----------
//
/// A contest snapshot on disk.
#[derive(Debug, Clone)]
pub struct ContestStore {
    path: PathBuf,
}

impl ContestStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn load(&self) -> Result<ContestData, TransferError> {
        let data = fs::read_to_string(&self.path).map_err(|e| {
            TransferError::Store(format!("cannot read {}: {e}", self.path.display()))
        })?;
        ContestData::from_json(&data)
    }

    pub fn save(&self, data: &ContestData) -> Result<(), TransferError> {
        fs::write(&self.path, data.to_json()?).map_err(|e| {
            TransferError::Store(format!("cannot write {}: {e}", self.path.display()))
        })
    }

    /// Loads the snapshot if there is one, otherwise awaits `fetch` and writes
    /// its result before returning it. `fetch` is not polled on a hit.
    pub async fn load_or_fetch<F>(&self, fetch: F) -> Result<ContestData, TransferError>
    where
        F: Future<Output = Result<ContestData, TransferError>>,
    {
        if self.exists() {
            let data = self.load()?;
            info!(
                "Loaded {} problems from {}",
                data.len(),
                self.path.display()
            );
            return Ok(data);
        }

        let data = fetch.await?;
        self.save(&data)?;
        info!("Saved {} problems to {}", data.len(), self.path.display());
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str) -> ProblemRecord {
        ProblemRecord {
            columns: IndexMap::from([(TITLE_COLUMN.to_string(), title.to_string())]),
            ..Default::default()
        }
    }

    #[test]
    fn keeps_page_order_through_json() {
        let mut data = ContestData::new();
        for (label, title) in [("C", "Gamma"), ("A", "Alpha"), ("B", "Beta")] {
            data.insert(label, record(title));
        }

        let back = ContestData::from_json(&data.to_json().unwrap()).unwrap();
        assert_eq!(back.labels().collect::<Vec<_>>(), vec!["C", "A", "B"]);
        assert_eq!(back, data);
    }

    #[test]
    fn reads_snapshot_written_by_hand() {
        let json = r##"{
            "A": {"#": "A", "Title": "Sum", "Link": "u/1#problem/A", "sol_link": "u/1#status/me/A/1/", "code": "int main(){}"},
            "B": {"Title": "Product"}
        }"##;

        let data = ContestData::from_json(json).unwrap();
        let a = data.get("A").unwrap();
        assert_eq!(a.title(), "Sum");
        assert_eq!(a.column("#"), Some("A"));
        assert_eq!(a.link, "u/1#problem/A");
        assert_eq!(a.code.as_deref(), Some("int main(){}"));
        assert!(!data.get("B").unwrap().has_code());
    }

    #[test]
    fn keeps_column_order_through_json() {
        let json = r##"{"A": {"#": "A", "Title": "Sum", "Solved": "3", "Link": "u/1#problem/A"}}"##;

        let data = ContestData::from_json(json).unwrap();
        let a = data.get("A").unwrap();
        assert_eq!(
            a.columns.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["#", "Title", "Solved"]
        );

        let written = data.to_json().unwrap();
        let title = written.find("\"Title\"").unwrap();
        let solved = written.find("\"Solved\"").unwrap();
        assert!(written.find("\"#\"").unwrap() < title);
        assert!(title < solved);
        assert!(solved < written.find("\"Link\"").unwrap());
    }

    #[test]
    fn records_without_code_serialize_without_the_key() {
        let mut data = ContestData::new();
        data.insert("A", record("Sum"));

        let json = data.to_json().unwrap();
        assert!(!json.contains("\"code\""));
        assert!(json.contains("\"sol_link\""));
        assert!(json.contains("\n    \"A\""));
    }

    #[test]
    fn carries_code_over_to_a_refreshed_scrape() {
        let mut old = ContestData::new();
        old.insert(
            "A",
            ProblemRecord {
                code: Some("old".into()),
                ..record("Sum")
            },
        );

        let mut fresh = ContestData::new();
        fresh.insert("A", record("Sum"));
        fresh.insert("B", record("Product"));
        fresh.carry_code_from(&old);

        assert_eq!(fresh.get("A").unwrap().code.as_deref(), Some("old"));
        assert!(fresh.get("B").unwrap().code.is_none());
    }

    #[tokio::test]
    async fn load_or_fetch_prefers_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContestStore::new(dir.path().join("soldata.json"));

        let fetched = store
            .load_or_fetch(async {
                let mut data = ContestData::new();
                data.insert("A", record("Sum"));
                Ok(data)
            })
            .await
            .unwrap();
        assert!(store.exists());

        let cached = store
            .load_or_fetch(async { Err(TransferError::Scrape("should not fetch".into())) })
            .await
            .unwrap();
        assert_eq!(cached, fetched);
    }

    #[tokio::test]
    async fn failed_fetch_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContestStore::new(dir.path().join("newdata.json"));

        let err = store
            .load_or_fetch(async { Err(TransferError::Scrape("no table".into())) })
            .await
            .unwrap_err();

        assert!(matches!(err, TransferError::Scrape(_)));
        assert!(!store.exists());
    }
}
