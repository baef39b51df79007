//! Command dispatch.

use std::sync::Arc;

use serde_json::json;
use tokio::sync::watch;
use tracing::info;

use super::command::{
    Cli, ColorChoice, Commands, ConfigCommand, ListsCommand, ListsRebuildArgs, SegmentsCommand,
};
use super::output::{self, OutputConfig};
use crate::error::Result;
use crate::infrastructure::bootstrap::{build_list_service, App};
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::factory::persistence::{build_pool, build_repositories};

/// Execute a parsed command line.
pub async fn execute(cli: Cli) -> Result<()> {
    apply_color(&cli.color);
    output::configure(OutputConfig::new(cli.json, cli.quiet));

    let config = Config::load_or_default(cli.config.as_deref())?;
    if !matches!(cli.command, Commands::Config(_)) {
        config.init_logging();
    }
    dispatch(cli.command, &config).await
}

async fn dispatch(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Run => run_scheduler(config).await,
        Commands::Sync => sync_once(config).await,
        Commands::Lists(ListsCommand::Rebuild(args)) => rebuild_lists(config, args).await,
        Commands::Lists(ListsCommand::Show(args)) => show_list(config, &args.slug).await,
        Commands::Segments(SegmentsCommand::Rebuild(args)) => {
            rebuild_segments(config, &args.sources).await
        }
        Commands::Config(ConfigCommand::Validate) => {
            show_config(config);
            Ok(())
        }
    }
}

fn apply_color(choice: &ColorChoice) {
    match choice {
        ColorChoice::Auto => owo_colors::unset_override(),
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
    }
}

async fn run_scheduler(config: &Config) -> Result<()> {
    if !config.scheduler.enabled {
        output::warning("Scheduler is disabled in configuration");
        return Ok(());
    }
    let app = App::build(config)?;
    let scheduler = app.scheduler(config);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received");
        }
        let _ = shutdown_tx.send(true);
    });

    output::success("Scheduler running, press Ctrl-C to stop");
    Arc::clone(&scheduler).run(shutdown_rx).await;
    Ok(())
}

async fn sync_once(config: &Config) -> Result<()> {
    let app = App::build(config)?;
    let report = app.orchestrator.run_all().await?;

    if output::is_json() {
        for line in report.lines() {
            output::emit_json("sync", serde_json::to_value(line)?);
        }
    } else {
        output::block(&report.render_table());
    }
    for failure in report.failures.iter() {
        output::warning(&failure.to_string());
    }
    Ok(())
}

async fn rebuild_lists(config: &Config, args: ListsRebuildArgs) -> Result<()> {
    let pool = build_pool(config)?;
    let service = build_list_service(config, &build_repositories(&pool));

    let counts = match args.slug {
        Some(slug) => {
            let count = service.rebuild_by_slug(&slug).await?;
            std::iter::once((slug, count)).collect()
        }
        None => {
            service
                .rebuild_filtered(args.source.as_deref(), args.target.as_deref())
                .await?
        }
    };

    output::section("Lists rebuilt");
    for (slug, count) in &counts {
        output::field(slug, count);
    }
    if counts.is_empty() {
        output::note("(no matching lists)");
    }
    Ok(())
}

async fn show_list(config: &Config, slug: &str) -> Result<()> {
    let pool = build_pool(config)?;
    let service = build_list_service(config, &build_repositories(&pool));
    let text = service.rows_text(slug).await?;

    if output::is_json() {
        let rows: Vec<&str> = text.lines().collect();
        output::emit_json("list", json!({ "slug": slug, "rows": rows }));
    } else {
        print!("{text}");
    }
    Ok(())
}

async fn rebuild_segments(config: &Config, sources: &[String]) -> Result<()> {
    let pool = build_pool(config)?;
    let service = build_list_service(config, &build_repositories(&pool));
    let counts = service.rebuild_segments(sources).await?;

    output::section("Segments rebuilt");
    for (slug, count) in &counts {
        output::field(slug, count);
    }
    Ok(())
}

fn show_config(config: &Config) {
    output::success("Configuration is valid");
    output::section("Effective configuration");
    output::field("Database", &config.database);
    output::field("Pool size", config.pool_size);
    output::field("Exchanges", config.sync.exchanges.join(", "));
    output::field("Task timeout", format!("{}s", config.sync.task_timeout_secs));
    output::field(
        "HTTP",
        format!(
            "timeout {}ms, {} retries, backoff {}..{}ms",
            config.http.timeout_ms,
            config.http.retries,
            config.http.backoff_min_ms,
            config.http.backoff_max_ms
        ),
    );
    output::field(
        "Scheduler",
        if config.scheduler.enabled {
            format!("every {}s", config.scheduler.interval_secs)
        } else {
            "disabled".to_string()
        },
    );
    output::field("Segments", config.segments.sources.join(", "));
}
