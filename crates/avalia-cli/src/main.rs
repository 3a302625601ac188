//! AVALIA command line: parse saved LLM reports and check catalogs.

use anyhow::{Context, Result};
use avalia_core::{
    AnalysisReport, CriteriaCatalog, CriteriaResponseParser, CriterionRequest, ParserConfig,
};
use clap::{Parser, Subcommand, ValueEnum};
use std::fmt::Write as _;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "avalia")]
#[command(about = "Extract per-criterion results from LLM code-quality reports")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log parser decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a saved LLM response against a criteria catalog
    Parse {
        /// Response file, or "-" for stdin
        #[arg(short, long)]
        response: PathBuf,

        /// Catalog file (YAML or JSON)
        #[arg(short, long)]
        catalog: PathBuf,

        /// Criteria keys in prompt order (default: whole catalog)
        #[arg(long, value_delimiter = ',')]
        criteria: Vec<String>,

        /// Parser config file (YAML)
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },

    /// Validate a catalog file and list its criteria
    CheckCatalog {
        /// Catalog file (YAML or JSON)
        path: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    Json,
    Text,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Parse {
            response,
            catalog,
            criteria,
            config,
            format,
        } => {
            let output = run_parse(&response, &catalog, &criteria, config.as_deref(), format)?;
            print!("{}", output);
        }
        Commands::CheckCatalog { path } => {
            let catalog = load_catalog(&path)?;
            print!("{}", describe_catalog(&catalog));
        }
    }

    Ok(())
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_parse(
    response: &Path,
    catalog: &Path,
    criteria: &[String],
    config: Option<&Path>,
    format: OutputFormat,
) -> Result<String> {
    let raw = read_response(response)?;
    let catalog = load_catalog(catalog)?;
    let requested = select_requests(&catalog, criteria)?;

    let config = match config {
        Some(path) => ParserConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to load parser config {}", path.display()))?,
        None => ParserConfig::default(),
    };

    let report = CriteriaResponseParser::with_config(config).parse_report(&raw, &requested);
    tracing::debug!(
        matched = report.summary.matched,
        unmatched = report.summary.unmatched,
        "Response parsed"
    );

    match format {
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(&report)?;
            json.push('\n');
            Ok(json)
        }
        OutputFormat::Text => Ok(render_text(&report)),
    }
}

fn read_response(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut raw = String::new();
        std::io::stdin()
            .read_to_string(&mut raw)
            .context("Failed to read response from stdin")?;
        return Ok(raw);
    }
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read response {}", path.display()))
}

fn load_catalog(path: &Path) -> Result<CriteriaCatalog> {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let catalog = if is_json {
        CriteriaCatalog::from_json_file(path)
    } else {
        CriteriaCatalog::from_yaml_file(path)
    };
    catalog.with_context(|| format!("Invalid catalog {}", path.display()))
}

fn select_requests(catalog: &CriteriaCatalog, criteria: &[String]) -> Result<Vec<CriterionRequest>> {
    if criteria.is_empty() {
        return Ok(catalog.all_requests());
    }
    Ok(catalog.requests_for(criteria)?)
}

fn render_text(report: &AnalysisReport) -> String {
    let mut out = String::new();

    for result in &report.results {
        let confidence = result
            .confidence
            .map(|c| format!("{:.0}%", c * 100.0))
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "[{}] {} ({}): {}, confidence {}",
            if result.matched { "x" } else { " " },
            result.name,
            result.key,
            result.status,
            confidence
        );
    }

    let summary = &report.summary;
    let _ = writeln!(
        out,
        "\n{} of {} criteria matched; {} conformant, {} partial, {} non-conformant, {} unknown",
        summary.matched,
        summary.total,
        summary.conformant,
        summary.partially_conformant,
        summary.non_conformant,
        summary.unknown
    );
    if let Some(score) = summary.conformance_score {
        let _ = writeln!(out, "Conformance score: {:.2}", score);
    }
    if let Some(pass) = report.pass {
        let _ = writeln!(out, "Heading grammar: {}", pass);
    }
    if let Some(general) = &report.general_section {
        let _ = writeln!(out, "\n{}", general);
    }

    out
}

fn describe_catalog(catalog: &CriteriaCatalog) -> String {
    let mut out = format!(
        "Catalog '{}' v{}: {} criteria\n",
        catalog.name,
        catalog.catalog_version,
        catalog.criteria.len()
    );
    for criterion in &catalog.criteria {
        let _ = writeln!(out, "  {}  {}", criterion.key, criterion.name);
    }
    out
}
