use indexmap::IndexMap;
use log::{info, warn};

use crate::client::Browser;
use crate::contest::{ContestData, LABEL_COLUMN, ProblemRecord, TITLE_COLUMN};
use crate::dom::Table;
use crate::types::{Timing, TransferError};

/// Problems table on the contest overview.
pub const PROBLEMS_TABLE: &str = "#contest-problems";

pub fn overview_url(contest_url: &str) -> String {
    format!("{contest_url}#overview")
}

pub fn problem_url(contest_url: &str, label: &str) -> String {
    format!("{contest_url}#problem/{label}")
}

/// First page of `username`'s submissions for one problem.
pub fn solution_url(contest_url: &str, username: &str, label: &str) -> String {
    format!("{contest_url}#status/{username}/{label}/1/")
}

/// Scrapes the problem list of a contest.
pub async fn fetch<B: Browser>(
    browser: &mut B,
    contest_url: &str,
    username: &str,
    timing: &Timing,
) -> Result<ContestData, TransferError> {
    info!("Fetching problems of {contest_url}");
    browser.goto(&overview_url(contest_url)).await?;
    let table = browser.read_table(PROBLEMS_TABLE, timing.wait).await?;
    let data = build_contest(contest_url, username, &table)?;
    if data.is_empty() {
        warn!("No problems listed on {contest_url}");
    }
    Ok(data)
}

/// Turns the scraped problems table into contest data.
pub fn build_contest(
    contest_url: &str,
    username: &str,
    table: &Table,
) -> Result<ContestData, TransferError> {
    for required in [LABEL_COLUMN, TITLE_COLUMN] {
        if !table.headers.iter().any(|h| h == required) {
            return Err(TransferError::Scrape(format!(
                "problems table has no '{required}' column (headers: {:?})",
                table.headers
            )));
        }
    }

    let mut data = ContestData::new();
    for (index, row) in table.rows.iter().enumerate() {
        if row.len() < table.headers.len() {
            return Err(TransferError::Scrape(format!(
                "row {} has {} cells for {} columns",
                index + 1,
                row.len(),
                table.headers.len()
            )));
        }

        let columns: IndexMap<String, String> = table
            .headers
            .iter()
            .cloned()
            .zip(row.iter().cloned())
            .collect();
        let label = columns[LABEL_COLUMN].clone();

        let record = ProblemRecord {
            link: problem_url(contest_url, &label),
            solution_link: solution_url(contest_url, username, &label),
            columns,
            code: None,
        };
        data.insert(label, record);
    }

    Ok(data)
}
