mod cmd;
mod output;
mod root;

use autoblog_core::paths;
use clap::{Parser, Subcommand};
use cmd::{config::ConfigSubcommand, topic::TopicSubcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "autoblog",
    about = "Daily blog automation: mine usage history for topics, write an article, publish it with git, announce it",
    version,
    propagate_version = true,
    args_conflicts_with_subcommands = true
)]
struct Cli {
    /// Blog repository root (default: auto-detect from autoblog.yaml or .git/)
    #[arg(long, global = true, env = "AUTOBLOG_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Debug logging
    #[arg(long, global = true, short = 'v')]
    verbose: bool,

    /// Show the topic stock and the next candidates
    #[arg(long, conflicts_with_all = ["refresh", "dry_run"])]
    status: bool,

    /// Top the topic stock up to its minimum
    #[arg(long, conflicts_with = "dry_run")]
    refresh: bool,

    /// Show the topic the next run would write about, without doing anything
    #[arg(long)]
    dry_run: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default autoblog.yaml and create the data and articles directories
    Init,

    /// Analyse usage history and print topic candidates (read-only)
    Analyze,

    /// Manage the topic stock
    Topic {
        #[command(subcommand)]
        subcommand: TopicSubcommand,
    },

    /// Engagement metrics of past announcements
    Metrics,

    /// Inspect the configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let pipeline_run = cli.command.is_none() && !cli.status && !cli.dry_run;
    let default_level = if cli.verbose {
        tracing::Level::DEBUG
    } else if pipeline_run {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    // Values already in the environment take precedence over the file.
    let env_file = paths::env_path(&root);
    if env_file.is_file() {
        if let Err(e) = dotenv::from_path(&env_file) {
            tracing::warn!(path = %env_file.display(), error = %e, "could not read .env");
        }
    }

    let result = match cli.command {
        Some(Commands::Init) => cmd::init::run(&root),
        Some(Commands::Analyze) => cmd::analyze::run(&root, cli.json),
        Some(Commands::Topic { subcommand }) => cmd::topic::run(&root, subcommand, cli.json),
        Some(Commands::Metrics) => cmd::metrics::run(&root, cli.json),
        Some(Commands::Config { subcommand }) => cmd::config::run(&root, subcommand, cli.json),
        None if cli.status => cmd::stock::status(&root, cli.json),
        None if cli.refresh => cmd::stock::refresh(&root, cli.json),
        None if cli.dry_run => cmd::run::dry_run(&root, cli.json),
        None => match cmd::run::run(&root, cli.json) {
            Ok(true) => Ok(()),
            Ok(false) => std::process::exit(1),
            Err(e) => Err(e),
        },
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
