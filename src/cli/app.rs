//! CLI definitions and entry point

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::LevelFilter;

use super::commands::{self, Session};
use reviewbot::config::Overrides;
use reviewbot::core::models::ReviewMode;
use reviewbot::output::OutputMode;

/// reviewbot - Automated reviewer for build service and forge requests
#[derive(Parser, Debug)]
#[command(
    name = "reviewbot",
    version,
    about = "Automated reviewer for build service and forge requests",
    long_about = "Run acceptance checks on change requests and record the verdict.\n\n\
                  Each verdict becomes a review transition plus one managed audit\n\
                  comment that is replaced, never duplicated, on later runs."
)]
pub struct Cli {
    /// API root URL
    #[arg(short = 'A', long, global = true, value_name = "URL")]
    pub apiurl: Option<String>,

    /// Review as this user
    #[arg(long, global = true)]
    pub user: Option<String>,

    /// Review as this group
    #[arg(long, global = true)]
    pub group: Option<String>,

    /// Decide and report, never mutate
    #[arg(long, global = true)]
    pub dry: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log HTTP traffic including bodies
    #[arg(long, global = true)]
    pub debug_http: bool,

    /// Output in JSON format (machine-readable)
    #[arg(long, global = true)]
    pub json: bool,

    /// Override the review mode (normal, no, accept, accept-onpass, fallback-onfail, fallback-always)
    #[arg(long, global = true, value_name = "MODE")]
    pub review_mode: Option<ReviewMode>,

    /// Fallback reviewer user
    #[arg(long, global = true)]
    pub fallback_user: Option<String>,

    /// Fallback reviewer group
    #[arg(long, global = true)]
    pub fallback_group: Option<String>,

    /// Config file (default: ~/.config/reviewbot/config.toml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check the given requests
    Id {
        /// Request identifiers
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Check requests with an open review for the bot
    Review {
        /// Poll every MINUTES instead of running once
        #[arg(short = 'n', long, value_name = "MINUTES")]
        interval: Option<u64>,
    },

    /// Check requests of a type against a project
    Project {
        /// Target project
        project: String,

        /// Action type (submit, delete, maintenance_incident, ...)
        #[arg(value_name = "TYPE")]
        action_type: String,

        /// Poll every MINUTES instead of running once
        #[arg(short = 'n', long, value_name = "MINUTES")]
        interval: Option<u64>,
    },

    /// Print requests changed in the last day as JSON lines
    Fetch {
        /// Target project prefix
        #[arg(short, long, default_value = "openSUSE:")]
        namespace: String,
    },
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            apiurl: self.apiurl.clone(),
            user: self.user.clone(),
            group: self.group.clone(),
            dry: self.dry,
            review_mode: self.review_mode,
            fallback_user: self.fallback_user.clone(),
            fallback_group: self.fallback_group.clone(),
        }
    }
}

/// Run the CLI
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    let mut logger = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter));
    if cli.debug_http {
        logger.filter_module("reviewbot::adapters", LevelFilter::Debug);
    }
    logger.init();

    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Human
    };

    let session = Session {
        config_path: cli.config.clone(),
        overrides: cli.overrides(),
        mode: output_mode,
        trace_http: cli.debug_http,
    };

    match cli.command {
        Command::Id { ids } => commands::id(&session, ids),
        Command::Review { interval } => commands::review(&session, interval),
        Command::Project {
            project,
            action_type,
            interval,
        } => commands::project(&session, project, &action_type, interval),
        Command::Fetch { namespace } => commands::fetch(&session, &namespace),
    }
}
