//! Info command - load a document through the cache and report on it

use crate::cache::{CacheStats, DocumentCache};
use crate::cli::args::{InfoArgs, OutputFormat};
use crate::config::Config;
use crate::document::{DocumentAccess, DocumentSource, SizeGuard};
use crate::error::PreviewResult;
use crate::storage::FsStore;
use crate::ui::{self, UiContext};
use serde::Serialize;
use std::sync::Arc;
use tokio::time::Instant;

#[derive(Debug, Serialize)]
struct DocumentReport {
    id: String,
    name: String,
    size: u64,
    pdf_version: Option<String>,
    elapsed_ms: u64,
    cache: CacheStats,
}

/// Execute the info command
pub async fn execute(args: InfoArgs, config: &Config) -> PreviewResult<()> {
    let mut guard = SizeGuard::from(&config.document);
    if args.restricted {
        guard.restricted = true;
    }

    let cache = Arc::new(DocumentCache::with_capacity(config.cache.capacity));
    let source = DocumentSource::from_path(&args.file);
    let name = source.name();
    let access = DocumentAccess::new(source, cache.clone(), Arc::new(FsStore::new()), guard);

    let started = Instant::now();
    let data = access.get_file_data().await?;

    let report = DocumentReport {
        id: access.id().to_string(),
        name,
        size: data.len() as u64,
        pdf_version: pdf_version(&data),
        elapsed_ms: started.elapsed().as_millis() as u64,
        cache: cache.stats(),
    };

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print_text(&report),
    }

    Ok(())
}

fn print_text(report: &DocumentReport) {
    let ctx = UiContext::detect();
    ui::section(&ctx, &report.name);
    ui::key_value(&ctx, "Location", &report.id);
    ui::key_value(&ctx, "Size", &format_size(report.size));
    ui::key_value(
        &ctx,
        "Version",
        report.pdf_version.as_deref().unwrap_or("not a PDF"),
    );
    ui::key_value(&ctx, "Load time", &format!("{}ms", report.elapsed_ms));
    ui::key_value(
        &ctx,
        "Cache",
        &format!("{}/{} documents", report.cache.count, report.cache.capacity),
    );
}

/// Header version, e.g. "1.7" for a file starting with `%PDF-1.7`
fn pdf_version(data: &[u8]) -> Option<String> {
    let rest = data.strip_prefix(b"%PDF-")?;
    let version: String = rest
        .iter()
        .take_while(|b| b.is_ascii_digit() || **b == b'.')
        .map(|b| *b as char)
        .collect();
    (!version.is_empty()).then_some(version)
}

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
