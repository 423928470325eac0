mod cli;

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use cli::{Cli, Commands};
use log::{error, info, warn};
use vjudge_transfer::{Config, Job, Session, Workspace, export, jobs, report};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut config = Config::load(&cli.config)
        .with_context(|| format!("Failed to read settings from {}", cli.config.display()))?;
    cli.overrides.apply(&mut config);

    match &cli.command {
        Commands::Init => {
            if cli.config.exists() {
                bail!("{} already exists", cli.config.display());
            }
            config.save(&cli.config)?;
            info!("Wrote default settings to {}", cli.config.display());
        }
        Commands::Export => {
            let store = config.source_store();
            let data = store
                .load()
                .context("No source contest snapshot yet; run `vjt copy` first")?;
            export::export(
                &data,
                &config.range(),
                &config.save_folder,
                &config.file_extension,
            )?;
        }
        Commands::Show { target } => {
            let store = if *target {
                config.target_store()
            } else {
                config.source_store()
            };
            let data = store.load()?;
            report::write_csv(&data, std::io::stdout().lock())?;
        }
        command => run_session(&config, &command.jobs()).await?,
    }

    Ok(())
}

/// Runs browser jobs in one session. The session is closed whatever happens.
async fn run_session(config: &Config, jobs: &[Job]) -> Result<()> {
    config.validate()?;

    let mut session = Session::start(config)
        .await
        .context("Failed to initialize the browser session")?;
    let mut workspace = Workspace::new();

    let result = tokio::select! {
        res = jobs::catch_panic(jobs::run_all(&mut session.browser, config, &mut workspace, jobs)) => {
            match res {
                Ok(Ok(())) => Ok(()),
                Ok(Err((job, e))) => Err(anyhow::Error::new(e).context(format!("{} failed", job.name()))),
                Err(e) => Err(e.into()),
            }
        }
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted");
            Err(anyhow!("interrupted"))
        }
    };

    if result.is_err() {
        session.capture_failure("failure").await;
    }
    if let Err(e) = session.stop().await {
        error!("Error closing browser: {e}");
    }

    result
}
