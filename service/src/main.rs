#![deny(
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used
)]
#![allow(clippy::print_stdout)]

use std::sync::Arc;

use chrono::Utc;
use clap::{Parser, Subcommand};
use legtrack::{
    config::Config,
    limiter::Limiter,
    reconcile::Reconciler,
    refresh::{RefreshOptions, RefreshScheduler},
    resolver::Registry,
    scorecard::ScorecardService,
    store::{LegislationStore, MemoryStore},
};
use lt_core::{Bodies, BodyId, Bookmark, LegislationId};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "legtrack", version, about = "Track legislation across bodies")]
struct Cli {
    /// Configuration file, overridden by LT_ environment variables
    #[arg(long, default_value = "config.yaml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve a bill URL and start tracking it
    Lookup { url: String },
    /// Refresh one batch of stale bills
    Refresh {
        #[arg(long)]
        batch_size: Option<usize>,
        /// Report what would change without writing anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Fetch companions that stored bills reference but that are missing
    Reconcile {
        #[arg(long, default_value_t = 100)]
        limit: usize,
    },
    /// Show the combined sponsor history of a bill and its companion
    Changes {
        #[arg(long)]
        body: String,
        #[arg(long)]
        id: String,
    },
    /// Bookmark a bill for a user
    Bookmark {
        #[arg(long)]
        user: Uuid,
        #[arg(long)]
        body: String,
        #[arg(long)]
        id: String,
        /// The user wants the bill to fail
        #[arg(long)]
        oppose: bool,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Print a user's scorecard for a body as JSON
    Scorecard {
        #[arg(long)]
        user: Uuid,
        #[arg(long)]
        body: String,
    },
}

#[tokio::main]
#[allow(clippy::too_many_lines)]
async fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Load and validate configuration first (fail-fast)
    let config = Config::load_from(&cli.config).map_err(|e| anyhow::anyhow!("{e}"))?;

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "legtrack starting up");

    let bodies = Bodies::builtin();
    let memory = Arc::new(MemoryStore::load(&config.store.snapshot_path, bodies.clone()).await?);
    let store: Arc<dyn LegislationStore> = memory.clone();
    let registry = Arc::new(Registry::from_config(&config, &bodies)?);
    if registry.is_empty() {
        tracing::warn!("no sources configured, nothing can be fetched");
    }

    let limiter = Limiter::new(config.refresh.concurrency);
    let reconciler = Reconciler::new(
        registry.clone(),
        store.clone(),
        Arc::new(bodies),
        limiter.clone(),
    );
    let scheduler = RefreshScheduler::new(
        registry.clone(),
        store.clone(),
        reconciler.clone(),
        limiter,
    )
    .with_freshness_window(config.refresh.freshness_window())
    .with_acquire_timeout(config.refresh.acquire_timeout());

    let mut dirty = true;
    match cli.command {
        Command::Lookup { url } => match scheduler.ingest(&url).await? {
            Some(ingested) => {
                let bill = &ingested.legislation;
                println!("{} {} ({})", bill.body, bill.display_id, bill.title);
                println!("  url:       {}", bill.url);
                println!("  session:   {}", bill.session);
                println!("  sponsors:  {}", bill.sponsors.len());
                println!("  companion: {:?}", ingested.companion);
                if !ingested.created {
                    println!("  already tracked, {} sponsor change(s)", ingested.changes.len());
                }
            }
            None => {
                println!("no tracked body recognises {url}");
                dirty = false;
            }
        },
        Command::Refresh {
            batch_size,
            dry_run,
        } => {
            let cancel = CancellationToken::new();
            let on_signal = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::warn!("interrupt received, finishing in-flight refreshes");
                    on_signal.cancel();
                }
            });

            let options = RefreshOptions {
                batch_size: batch_size.unwrap_or(config.refresh.batch_size),
                dry_run,
                bodies: config.refresh.bodies.iter().map(BodyId::new).collect(),
            };
            let report = scheduler.run(options, &cancel).await?;
            println!(
                "candidates {}  updated {}  unchanged {}  sponsor changes {}  skipped {}  errors {}",
                report.candidates,
                report.updated(),
                report.unchanged(),
                report.sponsor_changes(),
                report.skipped.len(),
                report.errors.len(),
            );
            if dry_run {
                for item in report.refreshed.iter().filter(|i| !i.changes.is_empty()) {
                    println!(
                        "  {} {}: {} sponsor change(s)",
                        item.legislation.body,
                        item.legislation.display_id,
                        item.changes.len()
                    );
                }
            }
            for error in &report.errors {
                println!("  error: {error}");
            }
            dirty = !dry_run;
        }
        Command::Reconcile { limit } => {
            let report = reconciler.sweep(limit).await?;
            println!(
                "referenced {}  missing {}  repaired {}  errors {}",
                report.referenced,
                report.missing,
                report.repaired.len(),
                report.errors.len()
            );
            for error in &report.errors {
                println!("  error: {error}");
            }
        }
        Command::Changes { body, id } => {
            let body = BodyId::new(body);
            let id = LegislationId::new(id);
            let bill = store
                .get_bill(&body, &id)
                .await?
                .ok_or_else(|| anyhow::anyhow!("{body}/{id} is not tracked"))?;
            for entry in reconciler.combined_changes(&bill).await? {
                let verb = if entry.change.withdraw { "withdrew" } else { "added" };
                println!(
                    "{}  {:<12} {:<8} {}",
                    entry.change.date.format("%Y-%m-%d"),
                    entry.body.as_str(),
                    verb,
                    entry.change.member.name()
                );
            }
        }
        Command::Bookmark {
            user,
            body,
            id,
            oppose,
            notes,
        } => {
            store
                .save_bookmark(&Bookmark {
                    user_id: user,
                    body: BodyId::new(body),
                    legislation_id: LegislationId::new(id),
                    oppose,
                    notes,
                    created: Utc::now(),
                })
                .await?;
            println!("bookmarked");
        }
        Command::Scorecard { user, body } => {
            let service = ScorecardService::new(registry, store.clone());
            let scorecard = service.for_user(user, &BodyId::new(body)).await?;
            println!("{}", serde_json::to_string_pretty(&scorecard)?);
            dirty = false;
        }
    }

    if dirty {
        memory.save(&config.store.snapshot_path).await?;
        tracing::info!(path = %config.store.snapshot_path, "snapshot written");
    }

    Ok(())
}
