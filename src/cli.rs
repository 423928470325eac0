use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use vjudge_transfer::{Config, Job};

#[derive(Parser, Debug)]
#[command(
    name = "vjt",
    version,
    about = "Copy accepted Virtual Judge solutions from one contest into another"
)]
pub struct Cli {
    /// JSON settings file
    #[arg(short, long, global = true, default_value = "transfer.json")]
    pub config: PathBuf,

    #[command(flatten)]
    pub overrides: Overrides,

    #[command(subcommand)]
    pub command: Commands,
}

/// Command-line values that win over the settings file.
#[derive(Args, Debug, Default)]
pub struct Overrides {
    /// First problem label to process
    #[arg(long, global = true)]
    pub start: Option<String>,

    /// Problem label to stop before
    #[arg(long, global = true)]
    pub stop: Option<String>,

    /// Seconds to let a page settle after each step
    #[arg(long, global = true)]
    pub delay: Option<f64>,

    /// Run the browser without a window
    #[arg(long, global = true)]
    pub headless: bool,

    /// Judge password for the login step
    #[arg(long, env = "VJUDGE_PASSWORD", hide_env_values = true, global = true)]
    pub password: Option<String>,
}

impl Overrides {
    pub fn apply(&self, config: &mut Config) {
        if let Some(start) = &self.start {
            config.start_from = start.clone();
        }
        if let Some(stop) = &self.stop {
            config.stop_at = Some(stop.clone());
        }
        if let Some(delay) = self.delay {
            config.settle_delay_secs = delay;
        }
        if self.headless {
            config.headless = true;
        }
        if let Some(password) = &self.password {
            config.password = Some(password.clone());
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load both contests, copy solutions and save them as files
    Run {
        /// Log in before doing anything else
        #[arg(long)]
        login: bool,
        /// Also submit the copied solutions to the target contest
        #[arg(long)]
        submit: bool,
    },
    /// Scrape the contests' problem lists into the local snapshots
    Fetch {
        /// Scrape again even if a snapshot exists, keeping copied code
        #[arg(long)]
        refresh: bool,
    },
    /// Log in to the judge in the persistent browser profile
    Login,
    /// Copy accepted solutions from the source contest
    Copy,
    /// Write copied solutions to the save folder (no browser needed)
    Export,
    /// Submit copied solutions to the target contest
    Submit,
    /// Print a contest snapshot as CSV (no browser needed)
    Show {
        /// Show the target contest instead of the source
        #[arg(long)]
        target: bool,
    },
    /// Write a settings file with every option at its default
    Init,
}

impl Commands {
    /// Browser jobs for this command, in order.
    pub fn jobs(&self) -> Vec<Job> {
        match self {
            Commands::Run { login, submit } => {
                let mut jobs = Vec::new();
                if *login {
                    jobs.push(Job::Login);
                }
                jobs.extend([Job::Fetch { refresh: false }, Job::Copy, Job::Export]);
                if *submit {
                    jobs.push(Job::Submit);
                }
                jobs
            }
            Commands::Fetch { refresh } => vec![Job::Fetch { refresh: *refresh }],
            Commands::Login => vec![Job::Login],
            Commands::Copy => vec![Job::Copy],
            Commands::Submit => vec![Job::Submit],
            Commands::Export | Commands::Show { .. } | Commands::Init => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_composes_jobs() {
        let cli = Cli::try_parse_from(["vjt", "run", "--login", "--submit"]).unwrap();
        assert_eq!(
            cli.command.jobs(),
            vec![
                Job::Login,
                Job::Fetch { refresh: false },
                Job::Copy,
                Job::Export,
                Job::Submit
            ]
        );

        let cli = Cli::try_parse_from(["vjt", "run"]).unwrap();
        assert_eq!(
            cli.command.jobs(),
            vec![Job::Fetch { refresh: false }, Job::Copy, Job::Export]
        );
    }

    #[test]
    fn overrides_win_over_file() {
        let cli = Cli::try_parse_from([
            "vjt", "copy", "--start", "C", "--stop", "F", "--delay", "1.5", "--headless",
        ])
        .unwrap();
        let mut config = Config::default();
        cli.overrides.apply(&mut config);

        assert_eq!(config.start_from, "C");
        assert_eq!(config.stop_at.as_deref(), Some("F"));
        assert_eq!(config.settle_delay_secs, 1.5);
        assert!(config.headless);
    }

    #[test]
    fn offline_commands_have_no_browser_jobs() {
        let cli = Cli::try_parse_from(["vjt", "show", "--target"]).unwrap();
        assert!(cli.command.jobs().is_empty());
    }
}
