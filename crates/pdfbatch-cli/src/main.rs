mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "pdfbatch", version, about = "Rename PDF documents in bulk from their content")]
pub struct Cli {
    /// Configuration file. Falls back to $PDFBATCH_CONFIG, then ~/.pdfbatch/config.json.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Rename PDFs from files, directories or a single zip archive.
    Run {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        #[arg(long)]
        doc_type: String,
        /// Naming pattern; defaults to the first pattern of the document type.
        #[arg(long)]
        pattern: Option<String>,
        /// Result archive; defaults to renamed_<timestamp>.zip.
        #[arg(long, short)]
        output: Option<PathBuf>,
        #[arg(long)]
        separator: Option<String>,
        #[arg(long)]
        prefix: Option<String>,
        #[arg(long)]
        suffix: Option<String>,
    },
    /// List stored batches, oldest first.
    List,
    /// Print one batch as JSON.
    Show { id: String },
    /// Print the progress of one batch.
    Progress { id: String },
    /// Reset stale batches and finish every pending one.
    Resume {
        /// Directory, files or zip archive holding the original documents.
        #[arg(long, required = true)]
        source: Vec<PathBuf>,
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Move batches stuck in processing back to pending.
    Recover,
    /// Remove completed batches older than the retention period.
    Clean,
    /// Rebuild the result archive of one batch.
    Export {
        id: String,
        #[arg(long, required = true)]
        source: Vec<PathBuf>,
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// List document types and their naming patterns.
    Templates,
}

fn init_logging(format: LogFormat) {
    if let Err(e) = tracing_log::LogTracer::init() {
        eprintln!("Warning: could not bridge log records into tracing: {}", e);
    }

    // LogTracer is already installed, so the subscriber goes in with
    // set_global_default rather than init().
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    let registry = tracing_subscriber::registry().with(filter);
    let result = match format {
        LogFormat::Text => {
            tracing::subscriber::set_global_default(registry.with(fmt::layer().with_target(false)))
        }
        LogFormat::Json => tracing::subscriber::set_global_default(registry.with(fmt::layer().json())),
    };
    if let Err(e) = result {
        eprintln!("Warning: could not install tracing subscriber: {}", e);
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_format);

    info!("Starting pdfbatch v{}", env!("CARGO_PKG_VERSION"));
    commands::dispatch(cli)
}
