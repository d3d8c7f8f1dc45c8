mod browse;
mod debounce;
mod display;

use std::collections::BTreeSet;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rehearsal_core::{
    AgeRange, CitizenView, Gender, Market, RosterState, RosterView, TargetingConfig,
    TargetingSession,
};
use rehearsal_sync::{RosterClient, RosterOrigin, SnapshotSource};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rehearsal", version, about = "Audience sizing and population browsing for market rehearsals")]
struct Cli {
    #[command(flatten)]
    source: SourceArgs,

    #[command(subcommand)]
    command: Command,
}

/// Where the citizen roster is loaded from.
#[derive(Args)]
struct SourceArgs {
    /// Simulation backend base URL.
    #[arg(long, env = "REHEARSAL_API_BASE", default_value = "http://localhost:8000", global = true)]
    api_base: String,

    /// Fallback roster: a `citizens.json` URL or file path. Defaults to the bundled snapshot.
    #[arg(long, env = "REHEARSAL_SNAPSHOT", global = true)]
    snapshot: Option<String>,

    /// Live request timeout in seconds.
    #[arg(long, env = "REHEARSAL_TIMEOUT_SECS", default_value_t = 10, global = true)]
    timeout_secs: u64,
}

#[derive(Subcommand)]
enum Command {
    /// Estimate the addressable population for a targeting filter.
    Estimate {
        #[arg(long, default_value = "TW")]
        market: Market,
        /// Age range such as `18-45` or `25-60+`.
        #[arg(long, default_value = "18-60+")]
        age: AgeRange,
        #[arg(long, default_value = "all")]
        gender: Gender,
        /// Occupation tag; repeat for several.
        #[arg(long = "occupation")]
        occupations: Vec<String>,
        /// Print the submission payload instead of the breakdown.
        #[arg(long)]
        json: bool,
    },
    /// List one page of citizens, optionally filtered.
    Citizens {
        #[arg(long, default_value = "TW")]
        market: Market,
        #[arg(long)]
        query: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Show one citizen resolved for a market.
    Show {
        id: String,
        #[arg(long, default_value = "TW")]
        market: Market,
    },
    /// Browse the roster interactively from stdin.
    Browse {
        #[arg(long, default_value = "TW")]
        market: Market,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!("rehearsal v{}", env!("CARGO_PKG_VERSION"));

    let Cli { source, command } = Cli::parse();
    match command {
        Command::Estimate {
            market,
            age,
            gender,
            occupations,
            json,
        } => {
            let config = TargetingConfig {
                age_range: age,
                gender,
                occupations: occupations.into_iter().collect::<BTreeSet<_>>(),
                market,
            };
            run_estimate(config, json)
        }
        Command::Citizens {
            market,
            query,
            page,
        } => {
            let mut view = load_view(&source, market).await?;
            if let Some(query) = query {
                view.set_query(query);
            }
            view.go_to_page(page);
            let mut rng = StdRng::from_entropy();
            display::print_roster_page(&view, &mut rng);
            ensure_loaded(&view)
        }
        Command::Show { id, market } => {
            let view = load_view(&source, market).await?;
            ensure_loaded(&view)?;
            let citizen = view
                .roster()
                .and_then(|roster| roster.find(&id))
                .with_context(|| format!("no citizen with id {id}"))?;
            let mut rng = StdRng::from_entropy();
            display::print_citizen_card(&CitizenView::build(citizen, market, &mut rng));
            Ok(())
        }
        Command::Browse { market } => {
            let view = load_view(&source, market).await?;
            browse::run(view).await
        }
    }
}

fn run_estimate(config: TargetingConfig, json: bool) -> anyhow::Result<()> {
    let session = TargetingSession::new(config);
    if json {
        let submission = session
            .submit()
            .context("targeting filter cannot be submitted")?;
        println!("{}", serde_json::to_string_pretty(&submission)?);
        return Ok(());
    }

    let mut rng = StdRng::from_entropy();
    let displayed = session.display_tam(&mut rng);
    display::print_estimate(&session, displayed);
    Ok(())
}

/// Load the roster into a fresh view. Load failure becomes the view's
/// `Failed` state rather than an error.
async fn load_view(source: &SourceArgs, market: Market) -> anyhow::Result<RosterView> {
    let client = RosterClient::with_timeout(
        source.api_base.clone(),
        Duration::from_secs(source.timeout_secs),
    )
    .context("building HTTP client")?
    .with_snapshot(SnapshotSource::from_setting(source.snapshot.as_deref()));

    let mut view = RosterView::new(market);
    match client.load().await {
        Ok(load) => {
            let origin = match &load.origin {
                RosterOrigin::Live => client.api_base().to_string(),
                RosterOrigin::Snapshot(snapshot) => snapshot.to_string(),
            };
            info!(
                origin = %origin,
                count = load.roster.citizens.len(),
                total = load.roster.total,
                loaded_at = %load.loaded_at.to_rfc3339(),
                "roster ready"
            );
            view.load(load.roster);
        }
        Err(e) => view.fail(e.to_string()),
    }
    Ok(view)
}

fn ensure_loaded(view: &RosterView) -> anyhow::Result<()> {
    match view.state() {
        RosterState::Failed(reason) => anyhow::bail!("citizen roster unavailable: {reason}"),
        _ => Ok(()),
    }
}
