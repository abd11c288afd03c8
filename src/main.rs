use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use wrestling_results::config::Config;
use wrestling_results::output::{OutputOptions, write_outputs};
use wrestling_results::pipeline::{filename_of, plan_years, process_documents};
use wrestling_results::reader::discover_documents;
use wrestling_results::{TracingObserver, YearExtractor};

#[derive(Parser)]
#[command(name = "wrestling-results")]
#[command(version)]
#[command(about = "Merge wrestling result listings into one normalized document per year")]
struct Cli {
    /// Directory containing the .md / .md.zst result documents
    input_dir: PathBuf,

    /// Directory the year documents and summary are written to
    output_dir: PathBuf,

    /// TOML configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Extra filename-to-year mapping, e.g. specialfile.md=2005
    #[arg(long = "add-mapping", value_name = "FILE=YEAR")]
    add_mapping: Vec<String>,

    /// Discover and group documents without writing anything
    #[arg(long)]
    dry_run: bool,

    /// Process everything but write only the summary report
    #[arg(long)]
    summary_only: bool,

    /// Also write <year>_season.json
    #[arg(long)]
    json: bool,

    /// Shorthand for --log-level debug
    #[arg(short, long)]
    verbose: bool,

    /// Log level used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn init_tracing(cli: &Cli) {
    let level = if cli.verbose { "debug" } else { cli.log_level.as_str() };
    let log_filter = format!("wrestling_results={level}");
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    if !cli.input_dir.is_dir() {
        bail!("input directory '{}' does not exist", cli.input_dir.display());
    }

    let config = Config::load_or_default(cli.config.as_deref())?;
    let mut extractor: YearExtractor = config.year_extractor();
    for mapping in &cli.add_mapping {
        let (filename, year) = YearExtractor::parse_mapping(mapping)?;
        extractor.add_mapping(&filename, Some(year));
    }

    let paths = discover_documents(&cli.input_dir)
        .with_context(|| format!("discovering documents in '{}'", cli.input_dir.display()))?;
    info!(count = paths.len(), input = %cli.input_dir.display(), "discovered documents");

    let mut observer = TracingObserver;

    if cli.dry_run {
        let plan = plan_years(&paths, &extractor, &mut observer);
        println!("Dry run: {} documents found", paths.len());
        for (year, year_paths) in &plan.years {
            println!("{year}: {} files -> {year}_season.md", year_paths.len());
            for path in year_paths {
                println!("  - {}", filename_of(path));
            }
        }
        if !plan.unassigned.is_empty() {
            println!("No year: {}", plan.unassigned.join(", "));
        }
        return Ok(());
    }

    let run = process_documents(&paths, &extractor, &mut observer);

    let options = OutputOptions {
        summary_file: config.output.summary_file.clone(),
        json: cli.json || config.output.json,
        summary_only: cli.summary_only,
    };
    let written = write_outputs(&run, &cli.output_dir, &options)
        .with_context(|| format!("writing output to '{}'", cli.output_dir.display()))?;

    for path in &written {
        info!(path = %path.display(), "wrote");
    }
    info!(
        years = run.bundles.len(),
        unassigned = run.unassigned.len(),
        "processing complete"
    );
    Ok(())
}
