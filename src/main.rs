mod config;
mod detector;
mod error;
mod fetcher;
mod filter;
mod ingest;
mod normalizer;
mod pipeline;
mod scorer;
mod stats;
mod taxonomy;
mod types;

use std::path::{Path, PathBuf};

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{Config, ScoringConfig, BULK_CHUNK_SIZE};
use crate::error::{AppError, Result};
use crate::fetcher::collect_all;
use crate::ingest::{
    read_json_lines, write_backup, write_daily_raw, write_json_lines, BulkIngester, IngestStats,
};
use crate::pipeline::{EnrichReport, Enricher};
use crate::taxonomy::{Blocklist, KeywordTaxonomy};
use crate::types::{EnrichedListing, RawListing};

const USAGE: &str = "Usage: wallapop-risk [run] | poll | enrich <input> [output] | ingest <file>";

enum Mode {
    /// Collect -> enrich -> ingest -> optional backup.
    Run,
    /// Collect only; write the raw daily file.
    Poll,
    /// Enrich a JSON-lines file of raw listings, no network.
    Enrich { input: PathBuf, output: PathBuf },
    /// Bulk-index an already enriched JSON-lines file.
    Ingest { input: PathBuf },
}

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    let mode = match parse_mode(std::env::args().skip(1).collect()) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("{e}");
            eprintln!("{USAGE}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    let result = match mode {
        Mode::Run => run(cfg).await,
        Mode::Poll => poll(cfg).await,
        Mode::Enrich { input, output } => enrich_file(cfg, &input, &output).await,
        Mode::Ingest { input } => ingest_file(cfg, &input).await,
    };
    if let Err(e) = result {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

fn parse_mode(args: Vec<String>) -> Result<Mode> {
    match args.first().map(String::as_str) {
        None | Some("run") => Ok(Mode::Run),
        Some("poll") => Ok(Mode::Poll),
        Some("enrich") => {
            let input = input_arg(&args, "enrich")?;
            let output = args
                .get(2)
                .map(PathBuf::from)
                .unwrap_or_else(|| default_output_path(&input));
            Ok(Mode::Enrich { input, output })
        }
        Some("ingest") => Ok(Mode::Ingest {
            input: input_arg(&args, "ingest")?,
        }),
        Some(other) => Err(AppError::Config(format!("unknown command '{other}'"))),
    }
}

fn input_arg(args: &[String], command: &str) -> Result<PathBuf> {
    args.get(1)
        .map(PathBuf::from)
        .ok_or_else(|| AppError::Config(format!("{command} needs an input file")))
}

/// `data/x.json` -> `data/x_enriched.json`.
fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "listings".to_string());
    input.with_file_name(format!("{stem}_enriched.json"))
}

fn build_enricher(cfg: &Config) -> Result<Enricher> {
    let taxonomy = match &cfg.keywords_file {
        Some(path) => KeywordTaxonomy::from_file(path)?,
        None => KeywordTaxonomy::default(),
    };
    let blocklist = match &cfg.clothing_keywords {
        Some(terms) => Blocklist::new(terms.iter().cloned()),
        None => Blocklist::default(),
    };
    info!(
        "Taxonomy: {} phrases | accessory blocklist: {} terms",
        taxonomy.phrase_count(),
        blocklist.len()
    );
    Ok(Enricher::new(taxonomy, blocklist, ScoringConfig::default()))
}

async fn collect(cfg: &Config) -> Result<Vec<RawListing>> {
    info!(
        "[COLLECT] category={} at ({:.4}, {:.4}), {} keywords",
        cfg.category_id,
        cfg.latitude,
        cfg.longitude,
        cfg.keywords.len()
    );
    let (raw, collect_stats) = collect_all(cfg).await?;
    info!(
        "[COLLECT] {} items from {} keyword searches",
        collect_stats.fetched, collect_stats.keywords
    );
    Ok(raw)
}

async fn run(cfg: Config) -> Result<()> {
    let enricher = build_enricher(&cfg)?;

    // --- Collect ---
    let raw = collect(&cfg).await?;
    if raw.is_empty() {
        warn!("[COLLECT] no items collected, nothing to do");
        return Ok(());
    }

    // --- Enrich ---
    let report = enricher.run(raw);
    log_report(&report);
    if report.listings.is_empty() {
        warn!("[FILTER] no motorbikes left after filtering");
        return Ok(());
    }

    // --- Ingest ---
    let ingester = BulkIngester::new(&cfg.es_host, &cfg.index_alias, BULK_CHUNK_SIZE)?;
    match ingester.bulk_ingest(&report.listings).await {
        Ok(stats) => log_ingest(&stats, &cfg.index_alias),
        // The backup below still preserves the batch.
        Err(e) => error!("[INGEST] bulk ingestion failed: {e}"),
    }

    // --- Backup ---
    if cfg.backup_enabled {
        let path = write_backup(&cfg.backup_dir, &report.listings).await?;
        info!("[BACKUP] saved {}", path.display());
    }

    Ok(())
}

async fn poll(cfg: Config) -> Result<()> {
    let raw = collect(&cfg).await?;
    let path = write_daily_raw(&cfg.backup_dir, &raw).await?;
    info!(
        event = "POLL_DONE",
        items = raw.len(),
        "[BACKUP] raw listings saved to {}",
        path.display()
    );
    Ok(())
}

async fn enrich_file(cfg: Config, input: &Path, output: &Path) -> Result<()> {
    let enricher = build_enricher(&cfg)?;

    let raw: Vec<RawListing> = read_json_lines(input).await?;
    info!("Loaded {} items from {}", raw.len(), input.display());

    let report = enricher.run(raw);
    log_report(&report);
    write_json_lines(output, &report.listings).await?;
    Ok(())
}

async fn ingest_file(cfg: Config, input: &Path) -> Result<()> {
    let listings: Vec<EnrichedListing> = read_json_lines(input).await?;
    info!("Loaded {} enriched documents from {}", listings.len(), input.display());
    if listings.is_empty() {
        warn!("[INGEST] nothing to index");
        return Ok(());
    }

    let ingester = BulkIngester::new(&cfg.es_host, &cfg.index_alias, BULK_CHUNK_SIZE)?;
    let stats = ingester.bulk_ingest(&listings).await?;
    log_ingest(&stats, &cfg.index_alias);
    Ok(())
}

fn log_ingest(stats: &IngestStats, index_alias: &str) {
    info!(
        event = "INGEST_DONE",
        indexed = stats.indexed,
        failed = stats.failed,
        "[INGEST] {} indexed into {} ({} failed)",
        stats.indexed,
        index_alias,
        stats.failed,
    );
}

fn log_report(r: &EnrichReport) {
    info!(
        event = "ENRICH_DONE",
        enriched = r.listings.len(),
        duplicates = r.duplicates,
        accessories_removed = r.removed_accessories,
        high_risk = r.high_risk,
        "[ENRICH] {} listings | median €{:.2} | range €{:.2}-€{:.2} | sellers: {} | high risk (score >= {}): {}",
        r.listings.len(),
        r.price_stats.median,
        r.price_stats.min,
        r.price_stats.max,
        r.unique_sellers,
        config::HIGH_RISK_THRESHOLD,
        r.high_risk,
    );
}
