use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::{Config, PAGE_DELAY_MS, PAGE_SIZE, SEARCH_TIMEOUT_SECS};
use crate::error::Result;
use crate::normalizer::format_utc;
use crate::types::RawListing;

#[derive(Debug, Default)]
pub struct CollectStats {
    pub keywords: usize,
    /// Items returned across all keyword searches, duplicates included.
    pub fetched: usize,
}

/// Run one paginated search per configured keyword and concatenate the results
/// in keyword order. Overlapping searches return the same item more than once;
/// the enrichment pipeline deduplicates. Every item is stamped with the capture time.
pub async fn collect_all(cfg: &Config) -> Result<(Vec<RawListing>, CollectStats)> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(SEARCH_TIMEOUT_SECS))
        .build()?;

    let mut stats = CollectStats {
        keywords: cfg.keywords.len(),
        ..CollectStats::default()
    };
    let mut all = Vec::new();

    for keyword in &cfg.keywords {
        let items = fetch_all_pages(&client, cfg, Some(keyword.as_str())).await;
        info!("[COLLECT] keyword '{keyword}': {} items", items.len());
        all.extend(items);
    }
    stats.fetched = all.len();

    let captured_at = format_utc(chrono::Utc::now());
    for item in &mut all {
        tag_crawl_timestamp(item, &captured_at);
    }

    Ok((all, stats))
}

/// Page through one search until an empty or short page. A failed page ends the
/// search with what has been gathered so far.
pub async fn fetch_all_pages(
    client: &reqwest::Client,
    cfg: &Config,
    keyword: Option<&str>,
) -> Vec<RawListing> {
    let mut items = Vec::new();
    let mut offset = 0usize;
    let mut page = 1usize;

    loop {
        let mut query: Vec<(&str, String)> = vec![
            ("source", "search_box".to_string()),
            ("category_id", cfg.category_id.clone()),
            ("latitude", cfg.latitude.to_string()),
            ("longitude", cfg.longitude.to_string()),
            ("time_filter", "today".to_string()),
            ("order_by", "newest".to_string()),
            ("offset", offset.to_string()),
            ("limit", PAGE_SIZE.to_string()),
        ];
        if let Some(k) = keyword {
            query.push(("keywords", k.to_string()));
        }

        let resp = match fetch_page(client, cfg, &query).await {
            Ok(v) => v,
            Err(e) => {
                warn!("[COLLECT] page {page} error: {e}");
                break;
            }
        };

        let page_items = extract_items(&resp);
        if page_items.is_empty() {
            break;
        }
        let n = page_items.len();
        debug!("[COLLECT] page {page}: +{n} items");
        items.extend(page_items.into_iter().map(RawListing::new));

        if n < PAGE_SIZE {
            break;
        }
        offset += PAGE_SIZE;
        page += 1;
        tokio::time::sleep(Duration::from_millis(PAGE_DELAY_MS)).await;
    }

    items
}

async fn fetch_page(
    client: &reqwest::Client,
    cfg: &Config,
    query: &[(&str, String)],
) -> Result<serde_json::Value> {
    let resp = client
        .get(&cfg.api_url)
        .header("X-DeviceOS", "0")
        .query(query)
        .send()
        .await?
        .error_for_status()?;
    Ok(resp.json().await?)
}

/// Items live under `data.section.payload.items`; older response shapes use
/// `search_objects` or a top-level `items` array.
pub fn extract_items(resp: &serde_json::Value) -> Vec<serde_json::Value> {
    resp.pointer("/data/section/payload/items")
        .or_else(|| resp.get("search_objects"))
        .or_else(|| resp.get("items"))
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default()
}

fn tag_crawl_timestamp(item: &mut RawListing, captured_at: &str) {
    if let Some(obj) = item.0.as_object_mut() {
        obj.entry("crawl_timestamp")
            .or_insert_with(|| serde_json::Value::String(captured_at.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_items_from_section_payload() {
        let resp = json!({"data": {"section": {"payload": {"items": [{"id": "1"}, {"id": "2"}]}}}});
        assert_eq!(extract_items(&resp).len(), 2);
    }

    #[test]
    fn extracts_items_from_fallback_shapes() {
        assert_eq!(extract_items(&json!({"search_objects": [{"id": "1"}]})).len(), 1);
        assert_eq!(extract_items(&json!({"items": [{"id": "1"}]})).len(), 1);
        assert!(extract_items(&json!({"data": {}})).is_empty());
        assert!(extract_items(&json!([1, 2])).is_empty());
    }

    #[test]
    fn crawl_timestamp_tag_keeps_existing_value() {
        let mut fresh = RawListing::new(json!({"id": "1"}));
        tag_crawl_timestamp(&mut fresh, "2025-12-06T05:46:40Z");
        assert_eq!(fresh.0["crawl_timestamp"], "2025-12-06T05:46:40Z");

        let mut tagged = RawListing::new(json!({"id": "2", "crawl_timestamp": "2025-12-01T00:00:00Z"}));
        tag_crawl_timestamp(&mut tagged, "2025-12-06T05:46:40Z");
        assert_eq!(tagged.0["crawl_timestamp"], "2025-12-01T00:00:00Z");
    }
}
