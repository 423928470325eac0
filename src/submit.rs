use log::{info, warn};

use crate::client::Browser;
use crate::contest::ContestData;
use crate::range::LabelRange;
use crate::types::{Timing, TransferError};

pub const SUBMIT_PROBLEM: &str = "#problem-submit";
pub const LANGUAGE_SELECT: &str = "#submit-language";
pub const SOLUTION_INPUT: &str = "#submit-solution";
pub const SUBMIT_BUTTON: &str = "#btn-submit";
pub const CLOSE_SUBMISSION: &str = "#solutionModal .modal-header .close a .fa-close";

/// Compiler names tried in order when picking the submission language.
pub const DEFAULT_LANGUAGES: &[&str] = &[
    "C++ 20 (gcc 12.2)",
    "cpp20",
    "cpp",
    "C++ 20 (gnu 10.2)",
    "GNU G++17 7.3.0",
    "C++14 (gcc 8.3)",
    "C++ (gcc 8.3)",
    "C++11 5.3.0",
    "C (GCC 9.2.1)",
    "C (gcc 6.3)",
    "ANSI C 5.3.0",
    "GNU GCC C11 5.1.0",
    "c",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Submitted,
    NoCode,
    TitleMismatch { source: String, target: String },
}

/// Picks the option for the most preferred language available.
///
/// Preferences are substrings. The first preference matching any option
/// wins, and among its matches the first option in display order.
pub fn choose_language<'a, P, O>(preferences: &[P], options: &'a [O]) -> Option<&'a str>
where
    P: AsRef<str>,
    O: AsRef<str>,
{
    preferences.iter().find_map(|pref| {
        options
            .iter()
            .map(|option| option.as_ref())
            .find(|option| option.contains(pref.as_ref()))
    })
}

/// Selects the best available language in the open submit dialog.
/// Returns the chosen option label, `None` when nothing matched.
pub async fn select_language<B: Browser>(
    browser: &mut B,
    preferences: &[String],
    timing: &Timing,
) -> Result<Option<String>, TransferError> {
    let options = browser.option_labels(LANGUAGE_SELECT, timing.wait).await?;

    match choose_language(preferences, &options) {
        Some(option) => {
            browser.select_option(LANGUAGE_SELECT, option).await?;
            info!("Selected language: {option}");
            Ok(Some(option.to_string()))
        }
        None => {
            warn!("None of the preferred languages were found.");
            Ok(None)
        }
    }
}

/// Submits stored solutions of `source` to the problems of `target` with the
/// same label and title.
///
/// Nothing checks the judge's verdict.
pub async fn submit<B: Browser>(
    browser: &mut B,
    target: &ContestData,
    source: &ContestData,
    range: &LabelRange,
    preferences: &[String],
    timing: &Timing,
) -> Result<Vec<(String, SubmitOutcome)>, TransferError> {
    let mut outcomes = Vec::new();

    for label in range.select(target.labels()) {
        let Some(target_record) = target.get(label) else {
            continue;
        };
        let Some((source_record, code)) = source
            .get(label)
            .and_then(|r| r.code.as_deref().map(|code| (r, code)))
        else {
            outcomes.push((label.to_string(), SubmitOutcome::NoCode));
            continue;
        };

        if source_record.title() != target_record.title() {
            warn!(
                "{label}\nold title={}\nnew title={}",
                source_record.title(),
                target_record.title()
            );
            timing.settle().await;
            outcomes.push((
                label.to_string(),
                SubmitOutcome::TitleMismatch {
                    source: source_record.title().to_string(),
                    target: target_record.title().to_string(),
                },
            ));
            continue;
        }

        browser.goto(&target_record.link).await?;
        timing.settle().await;

        browser.wait_and_click(SUBMIT_PROBLEM, timing.wait).await?;
        timing.settle().await;
        select_language(browser, preferences, timing).await?;
        timing.settle().await;

        browser.send_keys(SOLUTION_INPUT, code).await?;
        timing.settle().await;
        browser.click(SUBMIT_BUTTON).await?;
        timing.settle().await;
        info!("{label} submitted");

        browser.wait_and_click(CLOSE_SUBMISSION, timing.wait).await?;
        timing.settle().await;

        outcomes.push((label.to_string(), SubmitOutcome::Submitted));
    }

    Ok(outcomes)
}
