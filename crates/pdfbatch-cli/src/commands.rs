use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context};
use chrono::Utc;
use log::{info, warn};

use pdfbatch::archive::export_file_name;
use pdfbatch::{
    export_batch, ingest_zip_file, load_config_or_default, write_results, BatchDriver,
    BatchManager, Config, ContentStore, FileContentStore, LogProgress, NamingOptions, RunReport,
};

use crate::{Cli, Command};

pub fn dispatch(cli: Cli) -> anyhow::Result<()> {
    let config = load_config_or_default(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Command::Run {
            inputs,
            doc_type,
            pattern,
            output,
            separator,
            prefix,
            suffix,
        } => {
            let naming = naming_overrides(&config.naming, separator, prefix, suffix);
            run(&config, &inputs, &doc_type, pattern, output, naming)
        }
        Command::List => list(&config),
        Command::Show { id } => show(&config, &id),
        Command::Progress { id } => progress(&config, &id),
        Command::Resume { source, output } => resume(&config, &source, output),
        Command::Recover => recover(&config),
        Command::Clean => clean(&config),
        Command::Export { id, source, output } => export(&config, &id, &source, output),
        Command::Templates => templates(&config),
    }
}

fn naming_overrides(
    base: &NamingOptions,
    separator: Option<String>,
    prefix: Option<String>,
    suffix: Option<String>,
) -> NamingOptions {
    let mut naming = base.clone();
    if let Some(separator) = separator {
        naming.separator = separator;
    }
    if let Some(prefix) = prefix {
        naming.prefix = prefix;
    }
    if let Some(suffix) = suffix {
        naming.suffix = suffix;
    }
    naming
}

/// A single `.zip` input is read as an upload; anything else is scanned for PDFs.
fn load_sources(inputs: &[PathBuf]) -> anyhow::Result<Box<dyn ContentStore>> {
    if let [single] = inputs {
        if is_zip(single) {
            let report = ingest_zip_file(single)?;
            for skipped in &report.skipped {
                warn!("Skipped archive entry {}: {}", skipped.name, skipped.reason);
            }
            if report.ignored > 0 {
                info!("Ignored {} non-PDF archive entries", report.ignored);
            }
            return Ok(Box::new(report.content));
        }
    }

    Ok(Box::new(FileContentStore::collect(inputs)?))
}

fn is_zip(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("zip"))
}

fn timestamped_output() -> PathBuf {
    PathBuf::from(format!("renamed_{}.zip", Utc::now().format("%Y%m%d_%H%M%S")))
}

fn run(
    config: &Config,
    inputs: &[PathBuf],
    doc_type: &str,
    pattern: Option<String>,
    output: Option<PathBuf>,
    naming: NamingOptions,
) -> anyhow::Result<()> {
    let driver = BatchDriver::from_config(config).with_naming(naming);
    let pattern = match pattern {
        Some(pattern) => pattern,
        None => driver
            .parser()
            .patterns(doc_type)
            .and_then(|p| p.first().cloned())
            .ok_or_else(|| anyhow!("Unknown document type '{}'", doc_type))?,
    };

    let content = load_sources(inputs)?;
    if content.is_empty() {
        bail!("No PDF documents found in the given inputs");
    }

    let mut manager = BatchManager::from_config(config)?;
    let report = driver.run(&mut manager, content.as_ref(), doc_type, &pattern, &LogProgress)?;

    let output = output.unwrap_or_else(timestamped_output);
    write_archive(&report, content.as_ref(), &output)
}

fn write_archive(report: &RunReport, content: &dyn ContentStore, output: &Path) -> anyhow::Result<()> {
    let summary = write_results(report.renamed_pairs(), content, output)?;

    println!(
        "{} renamed ({} with placeholder names), {} failed, batches: {}",
        report.renamed.len(),
        report.fallback_count(),
        report.failed.len(),
        report.batch_ids.join(", ")
    );
    for failure in &report.failed {
        println!("  failed  {}: {}", failure.file_name, failure.error_message);
    }
    println!("Archive: {} ({} entries)", summary.path.display(), summary.entries.len());
    Ok(())
}

fn list(config: &Config) -> anyhow::Result<()> {
    let manager = BatchManager::from_config(config)?;
    let batches = manager.batches_by_age();
    if batches.is_empty() {
        println!("No batches stored in {}", manager.store().path().display());
        return Ok(());
    }

    for batch in batches {
        println!(
            "{}  {:<10}  {:>3.0}%  {}/{} done, {} failed  {}  {}",
            batch.id(),
            batch.status(),
            batch.progress() * 100.0,
            batch.processed_files(),
            batch.total_files(),
            batch.failed_files(),
            batch.doc_type(),
            batch.created_at().format("%Y-%m-%d %H:%M:%S")
        );
    }

    let counts = manager.counts();
    println!(
        "{} batches: {} pending, {} processing, {} completed, {} failed",
        counts.total(),
        counts.pending,
        counts.processing,
        counts.completed,
        counts.failed
    );
    Ok(())
}

fn show(config: &Config, id: &str) -> anyhow::Result<()> {
    let manager = BatchManager::from_config(config)?;
    let batch = manager
        .get_batch(id)
        .ok_or_else(|| anyhow!("Batch '{}' not found", id))?;
    println!("{}", serde_json::to_string_pretty(batch)?);
    Ok(())
}

fn progress(config: &Config, id: &str) -> anyhow::Result<()> {
    let manager = BatchManager::from_config(config)?;
    if manager.get_batch(id).is_none() {
        warn!("Batch '{}' not found", id);
    }
    println!("{:.0}%", manager.get_progress(id) * 100.0);
    Ok(())
}

fn resume(config: &Config, source: &[PathBuf], output: Option<PathBuf>) -> anyhow::Result<()> {
    let mut manager = BatchManager::from_config(config)?;
    let recovered = manager.recover_stale_batches()?;
    if !recovered.is_empty() {
        info!("Recovered {} stale batches", recovered.len());
    }

    if manager.pending_batches().is_empty() {
        println!("Nothing to resume");
        return Ok(());
    }

    let content = load_sources(source)?;
    let driver = BatchDriver::from_config(config);
    let report = driver.resume(&mut manager, content.as_ref(), &LogProgress)?;

    let output = output.unwrap_or_else(timestamped_output);
    write_archive(&report, content.as_ref(), &output)
}

fn recover(config: &Config) -> anyhow::Result<()> {
    let mut manager = BatchManager::from_config(config)?;
    let recovered = manager.recover_stale_batches()?;
    if recovered.is_empty() {
        println!("No stale batches");
    } else {
        println!("Moved back to pending: {}", recovered.join(", "));
    }
    Ok(())
}

fn clean(config: &Config) -> anyhow::Result<()> {
    let mut manager = BatchManager::from_config(config)?;
    let removed = manager.clear_completed_batches()?;
    println!(
        "Removed {} completed batches older than {} days",
        removed,
        manager.retention_days()
    );
    Ok(())
}

fn export(config: &Config, id: &str, source: &[PathBuf], output: Option<PathBuf>) -> anyhow::Result<()> {
    let manager = BatchManager::from_config(config)?;
    let content = load_sources(source)?;
    let output = output.unwrap_or_else(|| PathBuf::from(export_file_name(id, Utc::now())));

    let summary = export_batch(&manager, id, content.as_ref(), &output)?
        .ok_or_else(|| anyhow!("Batch '{}' not found", id))?;

    for name in &summary.missing {
        println!("  missing  {}", name);
    }
    println!("Archive: {} ({} entries)", summary.path.display(), summary.entries.len());
    Ok(())
}

fn templates(config: &Config) -> anyhow::Result<()> {
    let driver = BatchDriver::from_config(config);
    let parser = driver.parser();
    for name in parser.template_names() {
        println!("{}", name);
        for pattern in parser.patterns(name).unwrap_or_default() {
            println!("  {}", pattern);
        }
    }
    Ok(())
}
