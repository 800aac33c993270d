use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, bail};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use travel_times::batch::{BatchConfig, BatchReport, CancelFlag, run_batch};
use travel_times::input::TripTable;
use travel_times::maps::{MapsClient, MapsConfig, MockMapsClient, TripRouter};
use travel_times::results::{PREVIEW_MAX_CHARS, default_export_name, truncate_for_display};
use travel_times::web::{AppState, RouterSource, create_router};

/// Environment variable holding the Distance Matrix API key.
const API_KEY_ENV: &str = "GOOGLE_MAPS_API_KEY";

#[derive(Debug, Parser)]
#[command(name = "travel-times")]
#[command(about = "Batch travel times and distances for a CSV of trips")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Route every trip of a CSV file and write the results.
    Run(RunArgs),
    /// Start the web front end.
    Serve(ServeArgs),
}

/// Options shared by both commands.
#[derive(Debug, Args)]
struct RoutingArgs {
    /// Distance Matrix API key
    #[arg(long, env = API_KEY_ENV, hide_env_values = true)]
    api_key: Option<String>,

    /// Language of duration and distance texts
    #[arg(long, default_value = "fr")]
    language: String,

    /// Distance Matrix endpoint
    #[arg(long)]
    base_url: Option<String>,

    /// Serve canned responses from this JSON file instead of calling the API
    #[arg(long, value_name = "FILE")]
    mock_responses: Option<PathBuf>,
}

impl RoutingArgs {
    fn maps_config(&self, api_key: &str) -> MapsConfig {
        let config = MapsConfig::new(api_key).with_language(&self.language);
        match &self.base_url {
            Some(url) => config.with_base_url(url),
            None => config,
        }
    }
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Trip file (CSV with Origine, Destination, Mode de transport)
    input: PathBuf,

    /// Where to write the results (defaults to a timestamped name)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pause between requests, in milliseconds
    #[arg(long, default_value_t = 200)]
    delay_ms: u64,

    #[command(flatten)]
    routing: RoutingArgs,
}

#[derive(Debug, Args)]
struct ServeArgs {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:3000")]
    addr: SocketAddr,

    /// Pause between requests, in milliseconds
    #[arg(long, default_value_t = 500)]
    delay_ms: u64,

    /// Finished jobs kept in memory for viewing and download
    #[arg(long, default_value_t = 32)]
    keep_jobs: usize,

    /// Directory of static assets
    #[arg(long, default_value = concat!(env!("CARGO_MANIFEST_DIR"), "/static"))]
    static_dir: String,

    #[command(flatten)]
    routing: RoutingArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => run(args).await,
        Commands::Serve(args) => serve(args).await,
    }
}

async fn run(args: RunArgs) -> anyhow::Result<()> {
    let table = TripTable::from_path(&args.input)
        .with_context(|| format!("cannot load {}", args.input.display()))?;
    println!("{} trajets chargés depuis {}", table.len(), args.input.display());

    let config = BatchConfig::default().with_delay_ms(args.delay_ms);

    let report = match &args.routing.mock_responses {
        Some(path) => {
            let mock = MockMapsClient::from_file(path)?;
            route_all(&mock, table, &config).await
        }
        None => {
            let api_key = match &args.routing.api_key {
                Some(key) if !key.trim().is_empty() => key.trim().to_string(),
                _ => prompt_api_key().await?,
            };
            let client = MapsClient::new(args.routing.maps_config(&api_key))?;
            route_all(&client, table, &config).await
        }
    };

    let summary = report.results.summary();
    println!();
    if report.cancelled {
        println!("⚠️  Interrompu après {} / {} trajets", summary.total, report.total);
    }
    println!(
        "Total : {}  ·  Réussis : {}  ·  Erreurs : {}",
        summary.total, summary.success, summary.errors
    );

    if summary.errors > 0 {
        println!();
        println!("Trajets en erreur :");
        for failure in report.results.failures() {
            println!(
                "  Ligne {} : {} → {}",
                failure.row, failure.request.origin, failure.request.destination
            );
            println!("    Raison : {}", failure.outcome.status());
        }
    }

    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(default_export_name(&Local::now())));
    report
        .results
        .write_csv_file(&output)
        .with_context(|| format!("cannot write {}", output.display()))?;
    println!();
    println!("Résultats écrits dans {}", output.display());

    Ok(())
}

/// Run a batch, printing each trip as it completes. Ctrl-C stops the
/// batch after the current trip; a second Ctrl-C exits immediately.
async fn route_all<R: TripRouter>(router: &R, table: TripTable, config: &BatchConfig) -> BatchReport {
    let cancel = CancelFlag::new();

    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if on_signal.cancel_on_interrupt(tokio::signal::ctrl_c).await {
            eprintln!("Interrompu.");
            std::process::exit(130);
        }
    });

    run_batch(router, table, config, &cancel, Local::now, |progress| {
        if let Some(last) = progress.results.rows().last() {
            println!(
                "[{}/{}] {} → {} : {}",
                progress.done(),
                progress.total,
                truncate_for_display(&last.request.origin, PREVIEW_MAX_CHARS),
                truncate_for_display(&last.request.destination, PREVIEW_MAX_CHARS),
                last.outcome.status()
            );
        }
    })
    .await
}

/// Ask for the API key on standard input.
async fn prompt_api_key() -> anyhow::Result<String> {
    eprint!("Clé API Google Maps : ");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let key = lines
        .next_line()
        .await
        .context("cannot read API key from stdin")?
        .unwrap_or_default();

    let key = key.trim();
    if key.is_empty() {
        bail!("no API key given (use --api-key or set {API_KEY_ENV})");
    }
    Ok(key.to_string())
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let source = match &args.routing.mock_responses {
        Some(path) => RouterSource::Mock(MockMapsClient::from_file(path)?),
        None => RouterSource::live(&args.routing.maps_config("")),
    };
    if args.routing.api_key.is_some() {
        tracing::warn!("the web front end asks for the API key in the form; --api-key is ignored");
    }

    let state = AppState::new(source, BatchConfig::default().with_delay_ms(args.delay_ms))
        .with_finished_job_limit(args.keep_jobs);
    let app = create_router(state, &args.static_dir);

    let listener = tokio::net::TcpListener::bind(args.addr)
        .await
        .with_context(|| format!("cannot listen on {}", args.addr))?;

    tracing::info!(addr = %args.addr, "listening");
    println!("Calcul de temps de trajet : http://{}", args.addr);

    axum::serve(listener, app).await?;
    Ok(())
}
