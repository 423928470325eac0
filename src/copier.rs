use log::{error, info, warn};

use crate::client::Browser;
use crate::contest::{ContestData, ContestStore};
use crate::range::LabelRange;
use crate::types::{Timing, TransferError};

pub const VIEW_SOLUTION: &str = ".view-solution";
pub const CODE_CONTENT: &str = "#code-content";
pub const CLOSE_SOLUTION: &str = "#solutionModal .modal-header button.close a";

/// Copy steps wait a fifth of the settle delay.
const COPY_SETTLE_DIVISOR: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    Copied,
    AlreadyPresent,
    /// No accepted submission was shown for this problem.
    NotFound,
}

/// Fills in accepted code for every label in `range`.
///
/// `data` is written to `store` after each copied solution, and once more
/// before returning, whether the run succeeded or not.
pub async fn copy<B: Browser>(
    browser: &mut B,
    data: &mut ContestData,
    store: &ContestStore,
    range: &LabelRange,
    timing: &Timing,
) -> Result<Vec<(String, CopyOutcome)>, TransferError> {
    let result = copy_range(browser, data, store, range, timing).await;

    if let Err(e) = store.save(data) {
        if result.is_ok() {
            return Err(e);
        }
        error!("Could not save progress to {}: {e}", store.path().display());
    }

    result
}

async fn copy_range<B: Browser>(
    browser: &mut B,
    data: &mut ContestData,
    store: &ContestStore,
    range: &LabelRange,
    timing: &Timing,
) -> Result<Vec<(String, CopyOutcome)>, TransferError> {
    let labels: Vec<String> = range
        .select(data.labels())
        .into_iter()
        .map(str::to_owned)
        .collect();

    let mut outcomes = Vec::with_capacity(labels.len());
    for label in labels {
        let Some(record) = data.get_mut(&label) else {
            continue;
        };

        if record.has_code() {
            info!("skipped copying {label}");
            outcomes.push((label, CopyOutcome::AlreadyPresent));
            continue;
        }

        let link = record.solution_link.clone();
        browser.goto(&link).await?;
        timing.settle_fraction(COPY_SETTLE_DIVISOR).await;

        match read_solution(browser, timing).await {
            Ok(code) => {
                record.code = Some(code);
                info!("solutions saved for {label} {}", record.title());
                store.save(data)?;
            }
            Err(e) if e.is_timeout() => {
                warn!("Solve not found for {link}: {label}");
                outcomes.push((label, CopyOutcome::NotFound));
                continue;
            }
            Err(e) => return Err(e),
        }

        match close_solution(browser, timing).await {
            Ok(()) => {}
            Err(e) if e.is_timeout() => warn!("Solution dialog for {label} did not close: {e}"),
            Err(e) => return Err(e),
        }
        outcomes.push((label, CopyOutcome::Copied));
    }

    Ok(outcomes)
}

async fn read_solution<B: Browser>(browser: &mut B, timing: &Timing) -> Result<String, TransferError> {
    browser.wait_and_click(VIEW_SOLUTION, timing.wait).await?;
    timing.settle_fraction(COPY_SETTLE_DIVISOR).await;
    browser.wait_for_text(CODE_CONTENT, timing.wait).await
}

async fn close_solution<B: Browser>(browser: &mut B, timing: &Timing) -> Result<(), TransferError> {
    browser.wait_and_click(CLOSE_SOLUTION, timing.wait).await?;
    timing.settle_fraction(COPY_SETTLE_DIVISOR).await;
    Ok(())
}
