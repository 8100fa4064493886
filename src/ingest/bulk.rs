use std::time::Duration;

use tracing::{info, warn};

use crate::config::BULK_TIMEOUT_SECS;
use crate::error::{AppError, Result};
use crate::types::EnrichedListing;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestStats {
    pub indexed: usize,
    pub failed: usize,
}

impl std::ops::AddAssign for IngestStats {
    fn add_assign(&mut self, other: Self) {
        self.indexed += other.indexed;
        self.failed += other.failed;
    }
}

/// Writes enriched listings to the search store through the `_bulk` endpoint.
/// Documents are keyed by listing id, so re-ingesting a listing overwrites it.
/// Batches go out in chunks of `chunk_size` documents, one request each.
pub struct BulkIngester {
    client: reqwest::Client,
    es_host: String,
    index_alias: String,
    chunk_size: usize,
}

impl BulkIngester {
    pub fn new(es_host: &str, index_alias: &str, chunk_size: usize) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(BULK_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            es_host: es_host.trim_end_matches('/').to_string(),
            index_alias: index_alias.to_string(),
            chunk_size: chunk_size.max(1),
        })
    }

    /// A chunk that fails in transport or with a non-2xx status counts every
    /// document in it as failed; the remaining chunks are still sent.
    pub async fn bulk_ingest(&self, listings: &[EnrichedListing]) -> Result<IngestStats> {
        let mut stats = IngestStats::default();
        if listings.is_empty() {
            return Ok(stats);
        }

        let bodies = build_bulk_bodies(&self.index_alias, listings, self.chunk_size)?;
        let total = bodies.len();
        let chunks = listings.chunks(self.chunk_size);
        for (i, (body, chunk)) in bodies.into_iter().zip(chunks).enumerate() {
            match self.send_chunk(body).await {
                Ok(chunk_stats) => stats += chunk_stats,
                Err(e) => {
                    warn!("[INGEST] chunk {}/{} ({} docs) failed: {e}", i + 1, total, chunk.len());
                    stats.failed += chunk.len();
                }
            }
        }

        if stats.failed > 0 {
            warn!("[INGEST] {} documents not indexed into {}", stats.failed, self.index_alias);
        }
        info!("[INGEST] indexed={} failed={} requests={}", stats.indexed, stats.failed, total);
        Ok(stats)
    }

    async fn send_chunk(&self, body: String) -> Result<IngestStats> {
        let resp = self
            .client
            .post(format!("{}/_bulk", self.es_host))
            .header("Content-Type", "application/x-ndjson")
            .body(body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(AppError::Ingest(format!("bulk request failed with {status}: {text}")));
        }

        let result: serde_json::Value = resp.json().await?;
        Ok(count_bulk_results(&result))
    }
}

/// One NDJSON body per `chunk_size` listings, in input order.
pub fn build_bulk_bodies(
    index: &str,
    listings: &[EnrichedListing],
    chunk_size: usize,
) -> Result<Vec<String>> {
    listings
        .chunks(chunk_size.max(1))
        .map(|chunk| build_bulk_body(index, chunk))
        .collect()
}

/// NDJSON body: one `index` action line and one document line per listing.
pub fn build_bulk_body(index: &str, listings: &[EnrichedListing]) -> Result<String> {
    let mut body = String::new();
    for listing in listings {
        let action = match &listing.id {
            Some(id) => serde_json::json!({ "index": { "_index": index, "_id": id } }),
            None => serde_json::json!({ "index": { "_index": index } }),
        };
        body.push_str(&serde_json::to_string(&action)?);
        body.push('\n');
        body.push_str(&serde_json::to_string(listing)?);
        body.push('\n');
    }
    Ok(body)
}

/// Per-item outcome from a `_bulk` response: 200/201 count as indexed.
pub fn count_bulk_results(result: &serde_json::Value) -> IngestStats {
    let mut stats = IngestStats::default();
    let Some(items) = result.get("items").and_then(|i| i.as_array()) else {
        return stats;
    };
    for item in items {
        let Some(index) = item.get("index") else { continue };
        match index.get("status").and_then(|s| s.as_u64()) {
            Some(200) | Some(201) => stats.indexed += 1,
            _ => stats.failed += 1,
        }
    }
    stats
}
