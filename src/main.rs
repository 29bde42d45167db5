use clap::Parser;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use swagger_upgrade::{
    run_batch, BatchReporter, ConfigError, ConversionEngine, DriverConfig, ReportFormat,
};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "warn,swagger_upgrade=info";

#[derive(Parser, Debug)]
#[command(name = "swagger-upgrade")]
#[command(about = "Convert Swagger 2.0 documents to OpenAPI 3.0.0 in place", version)]
struct Args {
    /// Directory to search for documents
    #[arg(default_value = "fixtures")]
    dir: PathBuf,

    /// Convert everything but write nothing back
    #[arg(long)]
    dry_run: bool,

    /// File extension to pick up (json, yaml, yml); repeat for several
    #[arg(long = "extension", value_name = "EXT", default_value = "json")]
    extensions: Vec<String>,

    /// Skip paths matching this regular expression; repeatable
    #[arg(long, value_name = "REGEX")]
    exclude: Vec<String>,

    /// Documents converted concurrently (defaults to the number of CPUs)
    #[arg(long, value_name = "N")]
    jobs: Option<usize>,

    /// Report format printed to stdout
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    /// Exit with status 2 when any document failed to convert
    #[arg(long)]
    fail_on_error: bool,
}

#[tokio::main]
async fn main() {
    init_tracing();
    let args = Args::parse();

    let config = match build_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("\n❌ Error: {}", e);
            process::exit(1);
        }
    };

    let engine = Arc::new(ConversionEngine::new());
    let report = match run_batch(&config, engine).await {
        Ok(report) => report,
        Err(e) => {
            eprintln!("\n❌ Error: {}", e);
            process::exit(1);
        }
    };

    let reporter = BatchReporter::new().with_format(args.report);
    match reporter.format_report(&report) {
        Ok(formatted) => print!("{}", formatted),
        Err(e) => {
            eprintln!("\n❌ Error: {}", e);
            process::exit(1);
        }
    }

    if args.fail_on_error && report.has_failures() {
        process::exit(2);
    }
}

fn build_config(args: &Args) -> Result<DriverConfig, ConfigError> {
    let mut config = DriverConfig::new(&args.dir)
        .with_extensions(&args.extensions)?
        .with_exclude_patterns(&args.exclude)?
        .with_dry_run(args.dry_run);
    if let Some(jobs) = args.jobs {
        config = config.with_jobs(jobs);
    }
    Ok(config)
}

/// Log to stderr so stdout carries only the report. `RUST_LOG` overrides the default filter.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
