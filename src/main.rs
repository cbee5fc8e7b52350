use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use dialogue_train::config::{CliOverrides, Config};

mod cmd;

#[derive(Parser)]
#[command(name = "dialogue-train")]
#[command(version, about = "Train dialogue policies and compare them on shrinking story sets")]
pub struct Cli {
    /// Log at debug level (RUST_LOG still wins)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, default_value = "info", global = true)]
    pub loglevel: String,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Domain specification file
    #[arg(short, long, default_value = "domain.yml", global = true)]
    pub domain: PathBuf,

    /// File or folder containing training stories
    #[arg(short, long, default_value = "data/core", global = true)]
    pub stories: PathBuf,

    /// URL to download training stories from (overrides --stories)
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Directory to persist trained models in
    #[arg(short, long, default_value = "models/dialogue", global = true)]
    pub out: PathBuf,

    /// Policy configuration file(s). Compare mode trains each of them.
    #[arg(short = 'c', long = "config", num_args = 1.., default_value = "config.yml", global = true)]
    pub config: Vec<PathBuf>,

    /// How many stories to glue together when augmenting training data
    #[arg(long, global = true)]
    pub augmentation: Option<u32>,

    /// Write debug plots while training
    #[arg(long, global = true)]
    pub debug_plots: bool,

    /// Dump the flattened training stories next to the model
    #[arg(long, global = true)]
    pub dump_stories: bool,

    /// Training command (overrides TRAINER_CMD and train.toml)
    #[arg(long, global = true)]
    pub trainer_cmd: Option<String>,

    /// Settings file (defaults to ./train.toml when present)
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Train a single model with the first policy configuration
    Default,
    /// Train every policy configuration on shrinking story sets
    Compare {
        /// Percentages of stories to exclude, one training round each
        #[arg(long, num_args = 1.., default_values_t = [0.0, 5.0, 25.0, 50.0, 70.0, 90.0, 95.0])]
        percentages: Vec<f64>,

        /// Number of times the whole grid is trained
        #[arg(long, default_value = "3")]
        runs: u32,
    },
    /// Hand off to an interactive learning session
    Interactive {
        /// Only train the dialogue core model
        #[arg(long)]
        core: bool,

        /// Keep training the model at --out instead of starting fresh
        #[arg(long)]
        finetune: bool,

        /// Disable plotting the conversation graph
        #[arg(long)]
        skip_visualization: bool,

        /// Interactive command (overrides INTERACTIVE_CMD and train.toml)
        #[arg(long)]
        interactive_cmd: Option<String>,
    },
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        let interactive_cmd = match &self.command {
            Some(Commands::Interactive {
                interactive_cmd, ..
            }) => interactive_cmd.clone(),
            _ => None,
        };
        CliOverrides {
            settings: self.settings.clone(),
            trainer_cmd: self.trainer_cmd.clone(),
            interactive_cmd,
            augmentation: self.augmentation,
            debug_plots: self.debug_plots,
        }
    }
}

fn init_tracing(cli: &Cli) {
    let level = if cli.verbose {
        "debug"
    } else {
        cli.loglevel.as_str()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let fmt = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let registry = tracing_subscriber::registry().with(filter);
    if cli.log_json {
        registry.with(fmt.json()).init();
    } else {
        registry.with(fmt).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(&cli);

    let working_dir = std::env::current_dir().context("Failed to get current directory")?;
    let config = Config::new(working_dir, cli.overrides())?;
    for warning in config.validate() {
        tracing::warn!("{}", warning);
    }

    match cli.command.clone().unwrap_or(Commands::Default) {
        Commands::Default => cmd::cmd_default(&cli, &config).await?,
        Commands::Compare { percentages, runs } => {
            cmd::cmd_compare(&cli, &config, &percentages, runs).await?
        }
        Commands::Interactive {
            core,
            finetune,
            skip_visualization,
            ..
        } => cmd::cmd_interactive(&cli, &config, core, finetune, skip_visualization).await?,
    }

    Ok(())
}
