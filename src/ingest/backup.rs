use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::types::{EnrichedListing, RawListing};

/// Write the batch to `<dir>/wallapop_motorbikes_<YYYYMMDD>_enriched.json`, one document per line.
pub async fn write_backup(dir: &str, listings: &[EnrichedListing]) -> Result<PathBuf> {
    write_dated(dir, "_enriched", listings).await
}

/// Write collected, unenriched listings to `<dir>/wallapop_motorbikes_<YYYYMMDD>.json`.
/// This is the input file format of the offline enrich mode.
pub async fn write_daily_raw(dir: &str, listings: &[RawListing]) -> Result<PathBuf> {
    write_dated(dir, "", listings).await
}

async fn write_dated<T: Serialize>(dir: &str, suffix: &str, items: &[T]) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let today = chrono::Utc::now().format("%Y%m%d");
    let path = Path::new(dir).join(format!("wallapop_motorbikes_{today}{suffix}.json"));
    write_json_lines(&path, items).await?;
    Ok(path)
}

pub async fn write_json_lines<T: Serialize>(path: &Path, items: &[T]) -> Result<()> {
    let mut out = String::new();
    for item in items {
        out.push_str(&serde_json::to_string(item)?);
        out.push('\n');
    }
    tokio::fs::write(path, out).await?;
    info!("[BACKUP] {} records written to {}", items.len(), path.display());
    Ok(())
}

/// Load a JSON-lines file as raw (`RawListing`) or enriched (`EnrichedListing`)
/// records. Blank lines are skipped; a malformed line fails the whole read.
pub async fn read_json_lines<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let contents = tokio::fs::read_to_string(path).await?;
    parse_json_lines(&contents)
}

fn parse_json_lines<T: DeserializeOwned>(contents: &str) -> Result<Vec<T>> {
    contents
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| -> Result<T> { Ok(serde_json::from_str(l)?) })
        .collect()
}
