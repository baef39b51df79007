//! Command-line interface definitions.
//!
//! Defines the CLI structure for listwatch using `clap`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Exchange listing sync and cross-exchange comparison lists
#[derive(Parser, Debug)]
#[command(name = "listwatch")]
#[command(version)]
pub struct Cli {
    /// Path to the config file [default: listwatch.toml when present]
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Color output mode [auto, always, never]
    #[arg(
        long,
        global = true,
        default_value = "auto",
        hide_possible_values = true
    )]
    pub color: ColorChoice,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Color output mode for terminal rendering.
#[derive(Clone, Debug, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect automatically
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the auto-update scheduler until Ctrl-C
    Run,

    /// Sync every enabled exchange once and print the summary
    Sync,

    /// Rebuild or inspect pair lists
    #[command(subcommand)]
    Lists(ListsCommand),

    /// Rebuild segment lists
    #[command(subcommand)]
    Segments(SegmentsCommand),

    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
pub enum ListsCommand {
    /// Rebuild pair lists from the stored market state
    Rebuild(ListsRebuildArgs),
    /// Print a stored list as `SPOT, FUTURES` lines
    Show(ListsShowArgs),
}

#[derive(Args, Debug)]
pub struct ListsRebuildArgs {
    /// Only lists whose source exchange has this slug
    #[arg(long)]
    pub source: Option<String>,

    /// Only lists whose target exchange has this slug
    #[arg(long)]
    pub target: Option<String>,

    /// Rebuild a single list by slug
    #[arg(long, conflicts_with_all = ["source", "target"])]
    pub slug: Option<String>,
}

#[derive(Args, Debug)]
pub struct ListsShowArgs {
    /// List slug, e.g. `binance_to_upbit` or `okx_seg2`
    pub slug: String,
}

#[derive(Subcommand, Debug)]
pub enum SegmentsCommand {
    /// Rebuild segments for the given sources (all configured when omitted)
    Rebuild(SegmentsRebuildArgs),
}

#[derive(Args, Debug)]
pub struct SegmentsRebuildArgs {
    /// Source exchange slug; repeatable
    #[arg(long = "source")]
    pub sources: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Load and validate the configuration, then print the effective settings
    Validate,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn segments_accept_repeated_sources() {
        let cli = Cli::parse_from([
            "listwatch", "segments", "rebuild", "--source", "okx", "--source", "bybit",
        ]);
        match cli.command {
            Commands::Segments(SegmentsCommand::Rebuild(args)) => {
                assert_eq!(args.sources, vec!["okx", "bybit"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn slug_conflicts_with_filters() {
        let result = Cli::try_parse_from([
            "listwatch", "lists", "rebuild", "--slug", "okx_to_upbit", "--source", "okx",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn global_config_flag_after_subcommand() {
        let cli = Cli::parse_from(["listwatch", "sync", "--config", "lw.toml", "--json"]);
        assert_eq!(cli.config, Some(PathBuf::from("lw.toml")));
        assert!(cli.json);
    }
}
