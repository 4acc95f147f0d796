//! Command-line interface for the harvester.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use roxmltree::Document;

use crate::config::{validate_date, DEFAULT_DAYS_BACK, OAI_BASE_URL, OAI_NS};
use crate::error::Result;
use crate::harvester::Harvester;
use crate::normalizer::normalize;
use crate::oai::parse_list_records;
use crate::types::{NormalizedDocument, RawRecord};
use crate::xml::{first_text, is_element, Step};

/// PMC Harvester - Harvest PubMed Central records over OAI-PMH.
#[derive(Parser)]
#[command(name = "pmc-harvester")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Harvest recent records and print them as normalized documents.
    Harvest {
        /// Harvest records changed in the last N days
        #[arg(short, long, default_value_t = DEFAULT_DAYS_BACK, conflicts_with = "from")]
        days_back: u32,

        /// Harvest records changed since this date (YYYY-MM-DD)
        #[arg(short, long)]
        from: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// OAI-PMH endpoint
        #[arg(long, default_value = OAI_BASE_URL)]
        base_url: String,
    },

    /// Normalize a raw record file (a single record or a ListRecords response).
    Normalize {
        /// Path to the XML file
        file: PathBuf,

        /// Timestamp to stamp on the documents (default: now)
        #[arg(short, long)]
        timestamp: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
}

/// How documents are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One JSON document per line.
    Json,
    /// A stream of YAML documents.
    Yaml,
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Harvest {
            days_back,
            from,
            format,
            base_url,
        } => harvest_command(days_back, from.as_deref(), format, &base_url),
        Commands::Normalize {
            file,
            timestamp,
            format,
        } => normalize_command(&file, timestamp, format),
    }
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Execute the harvest command.
///
/// Records that fail to normalize are reported and skipped so one bad record
/// does not hide the rest of the harvest.
fn harvest_command(
    days_back: u32,
    from: Option<&str>,
    format: OutputFormat,
    base_url: &str,
) -> Result<()> {
    // Validate inputs before making HTTP requests
    let from = from.map(validate_date).transpose()?;

    let harvester = Harvester::pmc()?.with_base_url(base_url);

    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.set_message("Harvesting records...");
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let harvested = match from {
        Some(date) => harvester.consume_since(date),
        None => harvester.consume(days_back),
    };
    let records = match harvested {
        Ok(records) => records,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };

    pb.set_message("Normalizing records...");
    let timestamp = now();
    let mut documents = Vec::with_capacity(records.len());
    let mut failures = 0usize;
    for record in &records {
        match normalize(record, &timestamp) {
            Ok(doc) => documents.push(doc),
            Err(e) => {
                failures += 1;
                tracing::warn!(doc_id = %record.doc_id, error = %e, "Skipping record");
            }
        }
    }
    pb.finish_and_clear();

    write_documents(&documents, format)?;

    eprintln!(
        "{} {} records, {} normalized",
        style("Harvested").green().bold(),
        records.len(),
        documents.len()
    );
    if failures > 0 {
        eprintln!("  Failed: {}", style(failures).yellow().bold());
    }

    Ok(())
}

/// Execute the normalize command. Any record that fails aborts the command.
fn normalize_command(file: &Path, timestamp: Option<String>, format: OutputFormat) -> Result<()> {
    let contents = std::fs::read_to_string(file)?;
    let timestamp = timestamp.unwrap_or_else(now);

    let documents = load_records(&contents, file)?
        .iter()
        .map(|record| normalize(record, &timestamp))
        .collect::<Result<Vec<_>>>()?;

    write_documents(&documents, format)
}

/// Read raw records from a file: either a whole `ListRecords` response or one
/// record.
fn load_records(contents: &str, file: &Path) -> Result<Vec<RawRecord>> {
    let doc = Document::parse(contents)?;

    if is_element(doc.root_element(), OAI_NS, "OAI-PMH") {
        return Ok(parse_list_records(contents)?.records);
    }

    let doc_id = first_text(doc.root(), &[Step::oai("header"), Step::oai("identifier")])
        .unwrap_or_else(|| file.display().to_string());
    Ok(vec![RawRecord::new(contents, doc_id)])
}

fn write_documents(documents: &[NormalizedDocument], format: OutputFormat) -> Result<()> {
    let mut out = std::io::stdout().lock();

    for doc in documents {
        match format {
            OutputFormat::Json => writeln!(out, "{}", serde_json::to_string(doc)?)?,
            OutputFormat::Yaml => write!(out, "---\n{}", serde_yaml_ng::to_string(doc)?)?,
        }
    }

    out.flush()?;
    Ok(())
}
