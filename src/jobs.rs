use futures::FutureExt;
use log::{error, info};
use std::future::Future;
use std::panic::AssertUnwindSafe;

use crate::client::Browser;
use crate::config::Config;
use crate::contest::{ContestData, ContestStore};
use crate::types::TransferError;
use crate::{auth, copier, export, fetch, submit};

/// A step of a transfer run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Job {
    Login,
    /// Scrape both contests; `refresh` ignores existing snapshots.
    Fetch { refresh: bool },
    Copy,
    Export,
    Submit,
}

impl Job {
    pub fn name(&self) -> &'static str {
        match self {
            Job::Login => "login",
            Job::Fetch { .. } => "fetch",
            Job::Copy => "copy",
            Job::Export => "export",
            Job::Submit => "submit",
        }
    }

    pub async fn run<B: Browser>(
        &self,
        browser: &mut B,
        config: &Config,
        workspace: &mut Workspace,
    ) -> Result<(), TransferError> {
        let timing = config.timing();
        match self {
            Job::Login => {
                let password = config.require_password()?;
                auth::login(browser, &config.site_url, &config.username, password, &timing).await
            }
            Job::Fetch { refresh } => {
                workspace.load_source(browser, config, *refresh).await?;
                if !config.target_contest_url.trim().is_empty() {
                    workspace.load_target(browser, config, *refresh).await?;
                }
                Ok(())
            }
            Job::Copy => {
                let source = workspace.load_source(browser, config, false).await?;
                let outcomes = copier::copy(
                    browser,
                    source,
                    &config.source_store(),
                    &config.range(),
                    &timing,
                )
                .await?;
                let copied = outcomes
                    .iter()
                    .filter(|(_, o)| *o == copier::CopyOutcome::Copied)
                    .count();
                info!("Copied {copied} of {} problems in range", outcomes.len());
                Ok(())
            }
            Job::Export => {
                let source = workspace.load_source(browser, config, false).await?;
                let outcomes = export::export(
                    source,
                    &config.range(),
                    &config.save_folder,
                    &config.file_extension,
                )?;
                let written = outcomes
                    .iter()
                    .filter(|(_, o)| *o == export::ExportOutcome::Written)
                    .count();
                info!("Wrote {written} files to {}", config.save_folder.display());
                Ok(())
            }
            Job::Submit => {
                config.require_target()?;
                workspace.load_source(browser, config, false).await?;
                workspace.load_target(browser, config, false).await?;
                let (source, target) = workspace.loaded()?;
                let outcomes = submit::submit(
                    browser,
                    target,
                    source,
                    &config.range(),
                    &config.languages,
                    &timing,
                )
                .await?;
                let submitted = outcomes
                    .iter()
                    .filter(|(_, o)| *o == submit::SubmitOutcome::Submitted)
                    .count();
                info!("Submitted {submitted} of {} problems in range", outcomes.len());
                Ok(())
            }
        }
    }
}

/// Runs jobs in order and stops at the first failure.
/// Returns the failed job together with its error.
pub async fn run_all<B: Browser>(
    browser: &mut B,
    config: &Config,
    workspace: &mut Workspace,
    jobs: &[Job],
) -> Result<(), (Job, TransferError)> {
    for job in jobs {
        info!("Running {}", job.name());
        if let Err(err) = job.run(browser, config, workspace).await {
            error!("Job {} failed: {err}", job.name());
            return Err((*job, err));
        }
    }
    Ok(())
}

/// Awaits `work` and turns a panic inside it into an error, so the caller
/// still gets to close the browser session.
pub async fn catch_panic<F: Future>(work: F) -> Result<F::Output, TransferError> {
    AssertUnwindSafe(work).catch_unwind().await.map_err(|panic| {
        let message = panic
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| panic.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        TransferError::Operation(format!("job panicked: {message}"))
    })
}

/// Contest data shared by the jobs of one run, loaded on first use.
#[derive(Debug, Default)]
pub struct Workspace {
    source: Option<ContestData>,
    target: Option<ContestData>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load_source<B: Browser>(
        &mut self,
        browser: &mut B,
        config: &Config,
        refresh: bool,
    ) -> Result<&mut ContestData, TransferError> {
        let store = config.source_store();
        let url = config.source_contest_url.as_str();
        let data = match self.source.take() {
            Some(data) if !refresh => data,
            previous => match load(browser, config, &store, url, refresh).await {
                Ok(data) => data,
                Err(e) => {
                    self.source = previous;
                    return Err(e);
                }
            },
        };
        Ok(self.source.insert(data))
    }

    pub async fn load_target<B: Browser>(
        &mut self,
        browser: &mut B,
        config: &Config,
        refresh: bool,
    ) -> Result<&mut ContestData, TransferError> {
        let store = config.target_store();
        let url = config.require_target()?;
        let data = match self.target.take() {
            Some(data) if !refresh => data,
            previous => match load(browser, config, &store, url, refresh).await {
                Ok(data) => data,
                Err(e) => {
                    self.target = previous;
                    return Err(e);
                }
            },
        };
        Ok(self.target.insert(data))
    }

    fn loaded(&self) -> Result<(&ContestData, &ContestData), TransferError> {
        match (&self.source, &self.target) {
            (Some(source), Some(target)) => Ok((source, target)),
            _ => Err(TransferError::Store("contest data not loaded".into())),
        }
    }
}

async fn load<B: Browser>(
    browser: &mut B,
    config: &Config,
    store: &ContestStore,
    contest_url: &str,
    refresh: bool,
) -> Result<ContestData, TransferError> {
    let timing = config.timing();
    if !refresh {
        return store
            .load_or_fetch(fetch::fetch(browser, contest_url, &config.username, &timing))
            .await;
    }

    let mut fresh = fetch::fetch(browser, contest_url, &config.username, &timing).await?;
    if store.exists() {
        fresh.carry_code_from(&store.load()?);
    }
    store.save(&fresh)?;
    info!("Refreshed {} problems in {}", fresh.len(), store.path().display());
    Ok(fresh)
}
