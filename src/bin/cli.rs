use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use testrail_reporter::prelude::*;
use tracing_subscriber::EnvFilter;
#[cfg(feature = "otel")]
use tracing_subscriber::layer::SubscriberExt;
#[cfg(feature = "otel")]
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "testrail-reporter")]
#[command(about = "Report libtest results to a TestRail run", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect libtest JSON events and report them to TestRail
    ///
    /// Tests without a TestRail case id are logged and left out of the run.
    Report {
        /// libtest JSON output (default: stdin)
        #[arg(value_name = "INPUT")]
        input: Option<PathBuf>,

        /// Path to the reporter config (YAML or JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// The json filename to which to dump test results
        #[arg(long, value_name = "FILE")]
        totestrail: Option<PathBuf>,

        /// Extract case ids by concatenating every digit of the marker
        #[arg(long)]
        legacy_ids: bool,

        /// Submit skipped tests as Blocked
        #[arg(long)]
        report_skipped: bool,

        /// Pin the time used in the run name
        #[arg(long, value_name = "TIME")]
        run_time: Option<String>,
    },

    /// Collect libtest JSON events and print the summary without reporting
    Summarize {
        /// libtest JSON output (default: stdin)
        #[arg(value_name = "INPUT")]
        input: Option<PathBuf>,

        /// Path to the reporter config (YAML or JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Extract case ids by concatenating every digit of the marker
        #[arg(long)]
        legacy_ids: bool,

        /// Print the session report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[cfg(feature = "otel")]
fn init_otel_tracing(verbose: bool) {
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry_otlp::WithExportConfig;
    use opentelemetry_sdk::runtime::Tokio;
    use opentelemetry_sdk::trace::TracerProvider;

    let filter = if verbose {
        "testrail_reporter=debug"
    } else {
        "testrail_reporter=info"
    };

    let otlp_endpoint =
        std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").unwrap_or_else(|_| "http://localhost:4317".to_string());

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&otlp_endpoint)
        .build()
        .expect("Failed to create OTLP exporter");

    let provider = TracerProvider::builder()
        .with_batch_exporter(exporter, Tokio)
        .build();

    let tracer = provider.tracer("testrail-reporter");
    let otel_layer = tracing_opentelemetry::layer().with_tracer(tracer);

    tracing_subscriber::registry()
        .with(EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(otel_layer)
        .init();

    opentelemetry::global::set_tracer_provider(provider);
}

#[cfg(not(feature = "otel"))]
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        "testrail_reporter=debug"
    } else {
        "testrail_reporter=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    #[cfg(feature = "otel")]
    init_otel_tracing(cli.verbose);

    #[cfg(not(feature = "otel"))]
    init_tracing(cli.verbose);

    let result = run(cli).await;

    #[cfg(feature = "otel")]
    opentelemetry::global::shutdown_tracer_provider();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Reporter failed");
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Report {
            input,
            config,
            totestrail,
            legacy_ids,
            report_skipped,
            run_time,
        } => {
            let mut config = load_config(config.as_deref(), legacy_ids)?;
            if report_skipped {
                config.report_skipped = true;
            }
            report(input, config, totestrail, run_time).await
        }
        Commands::Summarize {
            input,
            config,
            legacy_ids,
            json,
        } => {
            let config = load_config(config.as_deref(), legacy_ids)?;
            summarize(input, config, json)
        }
    }
}

fn load_config(path: Option<&Path>, legacy_ids: bool) -> anyhow::Result<ReporterConfig> {
    let mut config = match path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            ReporterConfig::load(path)?
        }
        None => ReporterConfig::default(),
    };
    config.apply_env_overrides();
    if legacy_ids {
        config.extraction = ExtractionMode::Legacy;
    }
    Ok(config)
}

fn open_input(input: Option<PathBuf>) -> anyhow::Result<Box<dyn BufRead>> {
    match input {
        Some(path) if path.as_os_str() != "-" => {
            if !path.exists() {
                anyhow::bail!("Input file not found: {}", path.display());
            }
            Ok(Box::new(BufReader::new(File::open(path)?)))
        }
        _ => Ok(Box::new(BufReader::new(std::io::stdin()))),
    }
}

#[tracing::instrument(skip_all)]
async fn report(
    input: Option<PathBuf>,
    config: ReporterConfig,
    dump: Option<PathBuf>,
    run_time: Option<String>,
) -> anyhow::Result<()> {
    let clock: Arc<dyn Clock> = match run_time {
        Some(time) => Arc::new(MockClock::fixed(parse_time(&time)?)),
        None => Arc::new(SystemClock),
    };
    let client = Arc::new(TestRailClient::new(&config)?);

    let mut session = Session::start(&config, client, clock);
    session.ingest(open_input(input)?)?;

    print_summary(session.report());
    if let Some(path) = dump {
        session.dump(&path)?;
        println!("Results written to: {}", path.display());
    }

    match session.finish().await? {
        ReportOutcome::NothingToReport => println!("\nTestRail: nothing to report"),
        ReportOutcome::RunCreationFailed { error } => {
            println!("\nTestRail: failed to create test run: {}", error)
        }
        ReportOutcome::Reported { run_id, results } => println!(
            "\nTestRail: run {} created, {} results submitted",
            run_id,
            results.len()
        ),
    }
    Ok(())
}

fn summarize(input: Option<PathBuf>, config: ReporterConfig, json: bool) -> anyhow::Result<()> {
    let mut collector = EventCollector::new(&config);
    collector.ingest(open_input(input)?)?;

    if json {
        println!("{}", serde_json::to_string_pretty(collector.report())?);
    } else {
        print_summary(collector.report());
    }
    Ok(())
}

fn print_summary(report: &SessionReport) {
    println!("=== Session ===\n");
    println!("  Passed:   {}", join_ids(report.passed.iter()));
    println!("  Failed:   {}", join_ids(report.failed.iter()));
    println!("  Skipped:  {}", join_ids(report.skipped.iter()));
    println!("  Duration: {:.3}s", report.duration);
}

fn join_ids<T: std::fmt::Display>(ids: impl Iterator<Item = T>) -> String {
    let ids: Vec<String> = ids.map(|id| id.to_string()).collect();
    if ids.is_empty() {
        "-".to_string()
    } else {
        format!("{} ({})", ids.len(), ids.join(", "))
    }
}
