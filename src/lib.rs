pub mod cli;
pub mod clients;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod parser;
pub mod services;

use clap::Parser;
pub use config::Config;
pub use error::ScrapeError;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, cmd_aggregate, cmd_latest, cmd_merge, cmd_tag, cmd_upcoming};

pub async fn run() -> anyhow::Result<()> {
    let config = Config::load()?;
    config.validate()?;

    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    // stdout carries the JSON result.
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    let cli = Cli::parse();

    let Some(command) = cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Latest {
            source,
            limit,
            kind,
            populate,
            output,
        } => cmd_latest(&config, source, limit, kind, populate, output.as_deref()).await,

        Commands::Upcoming { populate, output } => {
            cmd_upcoming(&config, populate, output.as_deref()).await
        }

        Commands::Tag {
            tag,
            reject,
            populate,
            output,
        } => cmd_tag(&config, &tag, reject, populate, output.as_deref()).await,

        Commands::Merge {
            a,
            b,
            threshold,
            output,
        } => cmd_merge(&config, &a, &b, threshold, output.as_deref()),

        Commands::Aggregate {
            limit,
            populate,
            output,
        } => cmd_aggregate(&config, limit, populate, output.as_deref()).await,

        Commands::Init => {
            if Config::create_default_if_missing()? {
                info!("Default config written");
                println!("✓ Config file created. Edit showscrape.toml and run again.");
            } else {
                println!("Config file already exists.");
            }
            Ok(())
        }
    }
}
