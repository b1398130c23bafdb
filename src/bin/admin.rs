//! CLI administration tool for linklet.
//!
//! Runs the analytics jobs by hand: backfilling daily aggregates for an
//! arbitrary date, sweeping expired links, pruning old click rows, and
//! rebuilding the ranking cache, without requiring HTTP API access.
//!
//! # Usage
//!
//! ```bash
//! # Backfill daily aggregates for a historical date
//! cargo run --bin linklet-admin -- aggregate --date 2024-01-01
//!
//! # Aggregate yesterday (what the scheduler does hourly)
//! cargo run --bin linklet-admin -- aggregate
//!
//! # Deactivate links whose expiry has passed
//! cargo run --bin linklet-admin -- sweep-expired
//!
//! # Delete raw click rows past the retention horizon
//! cargo run --bin linklet-admin -- sweep-retention --yes
//!
//! # Rebuild the ranking cache
//! cargo run --bin linklet-admin -- refresh-ranking
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required): PostgreSQL connection string
//! - `REDIS_URL` (optional): enables ranking cache writes

use linklet::application::services::{AnalyticsConfig, AnalyticsService};
use linklet::config;
use linklet::infrastructure::cache::{Cache, NullCache, RedisCache};
use linklet::infrastructure::persistence::{
    PgAggregateRepository, PgClickRepository, PgLinkRepository,
};

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

/// CLI tool for operating linklet's analytics jobs.
#[derive(Parser)]
#[command(name = "linklet-admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recompute daily aggregates for one date (default: yesterday)
    Aggregate {
        /// Target date, YYYY-MM-DD
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Deactivate links whose expiry has passed
    SweepExpired,

    /// Delete raw click rows older than the retention horizon
    SweepRetention {
        /// Override the configured horizon
        #[arg(long)]
        days: Option<u32>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Rebuild the trailing-window ranking and cache it
    RefreshRanking {
        #[arg(long)]
        window_days: Option<u32>,

        #[arg(long)]
        limit: Option<i64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = config::load_from_env().context("Failed to load configuration")?;

    let pool = PgPool::connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    let pool = Arc::new(pool);

    let cache: Arc<dyn Cache> = match &config.redis_url {
        Some(redis_url) => {
            match RedisCache::connect(redis_url, Duration::from_secs(config.cache_ttl_seconds))
                .await
            {
                Ok(redis) => Arc::new(redis),
                Err(e) => {
                    eprintln!(
                        "{} Redis unavailable ({e}); ranking cache writes will be skipped",
                        "warning:".yellow().bold()
                    );
                    Arc::new(NullCache::new())
                }
            }
        }
        None => Arc::new(NullCache::new()),
    };

    let mut analytics_config = AnalyticsConfig {
        retention_days: config.retention_days,
        ranking_window_days: config.ranking_window_days,
        ranking_limit: config.ranking_limit,
        ranking_ttl: Duration::from_secs(config.ranking_refresh_secs),
    };

    // Command-line overrides
    match &cli.command {
        Commands::SweepRetention { days: Some(days), .. } => {
            analytics_config.retention_days = *days;
        }
        Commands::RefreshRanking { window_days, limit } => {
            if let Some(window_days) = window_days {
                analytics_config.ranking_window_days = *window_days;
            }
            if let Some(limit) = limit {
                analytics_config.ranking_limit = *limit;
            }
        }
        _ => {}
    }

    let analytics = AnalyticsService::new(
        Arc::new(PgLinkRepository::new(pool.clone())),
        Arc::new(PgClickRepository::new(pool.clone())),
        Arc::new(PgAggregateRepository::new(pool.clone())),
        cache,
        analytics_config.clone(),
    );

    match cli.command {
        Commands::Aggregate { date } => {
            let day = date.unwrap_or_else(|| Utc::now().date_naive() - chrono::Duration::days(1));
            println!("Aggregating clicks for {}", day.to_string().cyan());

            let report = analytics
                .aggregate_day(day)
                .await
                .context("Aggregation failed")?;

            println!(
                "{} {} links aggregated, {} failures",
                "done:".green().bold(),
                report.links_processed,
                report.failures
            );
            if report.failures > 0 {
                println!(
                    "{} the job is idempotent; re-run it to retry the failed links",
                    "note:".yellow()
                );
            }
        }

        Commands::SweepExpired => {
            let swept = analytics
                .sweep_expired()
                .await
                .context("Expiry sweep failed")?;
            println!(
                "{} deactivated {} expired links",
                "done:".green().bold(),
                swept
            );
        }

        Commands::SweepRetention { yes, .. } => {
            let horizon = analytics_config.retention_days;
            if !yes {
                let proceed = Confirm::new()
                    .with_prompt(format!(
                        "Delete all click rows older than {horizon} days? This cannot be undone"
                    ))
                    .default(false)
                    .interact()?;
                if !proceed {
                    println!("{}", "aborted".yellow());
                    return Ok(());
                }
            }

            let deleted = analytics
                .sweep_retention()
                .await
                .context("Retention sweep failed")?;
            println!(
                "{} deleted {} click rows older than {} days",
                "done:".green().bold(),
                deleted,
                horizon
            );
        }

        Commands::RefreshRanking { .. } => {
            let ranking = analytics
                .refresh_ranking()
                .await
                .context("Ranking refresh failed")?;

            println!(
                "{} ranking rebuilt with {} entries",
                "done:".green().bold(),
                ranking.len()
            );
            for (i, entry) in ranking.iter().take(10).enumerate() {
                println!(
                    "  {:>2}. {}  {} clicks",
                    i + 1,
                    entry.code.cyan(),
                    entry.clicks
                );
            }
        }
    }

    Ok(())
}
