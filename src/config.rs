use crate::error::{AppError, Result};
use crate::types::Severity;

pub const WALLAPOP_API_URL: &str = "https://api.wallapop.com/api/v3/search";
pub const ES_HOST: &str = "http://localhost:9200";
pub const INDEX_ALIAS: &str = "lab001.wallapop";

/// Wallapop category for Motors -> Motorbikes.
pub const MOTORBIKE_CATEGORY_ID: &str = "14000";

/// Default search centre (Zaragoza).
pub const SEARCH_LATITUDE: f64 = 41.648823;
pub const SEARCH_LONGITUDE: f64 = -0.889085;

/// One search per keyword; results overlap and are deduplicated afterwards.
pub const MOTORBIKE_KEYWORDS: &[&str] = &[
    "yamaha", "honda", "kawasaki", "suzuki", "ktm", "bmw", "ducati", "triumph", "harley", "moto",
];

/// Items per search page. A shorter page means the last one.
pub const PAGE_SIZE: usize = 50;

/// Pause between consecutive page requests (milliseconds).
pub const PAGE_DELAY_MS: u64 = 500;

pub const SEARCH_TIMEOUT_SECS: u64 = 15;
pub const BULK_TIMEOUT_SECS: u64 = 60;

/// Documents per `_bulk` request. Larger batches are split.
pub const BULK_CHUNK_SIZE: usize = 500;

/// Listings scoring at or above this are reported as high risk.
pub const HIGH_RISK_THRESHOLD: u8 = 60;

/// Numeric timestamps above this are epoch milliseconds, not seconds.
pub const EPOCH_MILLIS_THRESHOLD: f64 = 10_000_000_000.0;

/// Bucket key for listings without a seller identifier.
pub const UNKNOWN_SELLER: &str = "unknown";

pub const DEFAULT_CURRENCY: &str = "EUR";

/// Tier thresholds and point weights for the four risk signal groups.
/// Each group awards at most one tier; thresholds are checked most severe first.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringConfig {
    /// Points when the strongest matched keyword category is critical.
    pub critical_keyword_points: u32,
    pub general_keyword_points: u32,
    /// (ratio below which the tier applies, points, factor name), lowest ratio first.
    pub price_tiers: Vec<(f64, u32, &'static str)>,
    /// (listing count above which the tier applies, points, factor name), highest count first.
    pub seller_tiers: Vec<(usize, u32, &'static str)>,
    /// Descriptions shorter than this many characters are penalised.
    pub min_description_chars: usize,
    pub short_description_points: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            critical_keyword_points: 30,
            general_keyword_points: 15,
            price_tiers: vec![
                (0.3, 40, "extremely_low_price"),
                (0.5, 30, "very_low_price"),
                (0.7, 15, "low_price"),
            ],
            seller_tiers: vec![
                (10, 20, "high_volume_seller"),
                (5, 10, "medium_volume_seller"),
            ],
            min_description_chars: 20,
            short_description_points: 10,
        }
    }
}

impl ScoringConfig {
    pub fn keyword_points(&self, severity: Severity) -> u32 {
        match severity {
            Severity::Critical => self.critical_keyword_points,
            Severity::General => self.general_keyword_points,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub category_id: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Search keywords (SEARCH_KEYWORDS, comma-separated).
    pub keywords: Vec<String>,
    pub es_host: String,
    pub index_alias: String,
    pub backup_dir: String,
    pub backup_enabled: bool,
    /// Optional JSON taxonomy file (KEYWORDS_FILE). Built-in taxonomy when unset.
    pub keywords_file: Option<String>,
    /// Overrides the built-in accessory blocklist when set (CLOTHING_KEYWORDS, comma-separated).
    pub clothing_keywords: Option<Vec<String>>,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            api_url: std::env::var("WALLAPOP_API_URL")
                .unwrap_or_else(|_| WALLAPOP_API_URL.to_string()),
            category_id: std::env::var("CATEGORY_ID")
                .unwrap_or_else(|_| MOTORBIKE_CATEGORY_ID.to_string()),
            latitude: parse_coordinate("SEARCH_LATITUDE", SEARCH_LATITUDE)?,
            longitude: parse_coordinate("SEARCH_LONGITUDE", SEARCH_LONGITUDE)?,
            keywords: std::env::var("SEARCH_KEYWORDS")
                .map(|s| split_list(&s))
                .unwrap_or_else(|_| MOTORBIKE_KEYWORDS.iter().map(|k| k.to_string()).collect()),
            es_host: std::env::var("ES_HOST").unwrap_or_else(|_| ES_HOST.to_string()),
            index_alias: std::env::var("INDEX_ALIAS").unwrap_or_else(|_| INDEX_ALIAS.to_string()),
            backup_dir: std::env::var("BACKUP_DIR").unwrap_or_else(|_| "data".to_string()),
            backup_enabled: std::env::var("BACKUP_ENABLED")
                .map(|v| !matches!(v.trim().to_lowercase().as_str(), "0" | "false" | "no"))
                .unwrap_or(true),
            keywords_file: std::env::var("KEYWORDS_FILE").ok().filter(|s| !s.trim().is_empty()),
            clothing_keywords: std::env::var("CLOTHING_KEYWORDS")
                .ok()
                .map(|s| split_list(&s))
                .filter(|v| !v.is_empty()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn parse_coordinate(var: &str, default: f64) -> Result<f64> {
    match std::env::var(var) {
        Ok(v) => v
            .trim()
            .parse::<f64>()
            .map_err(|_| AppError::Config(format!("{var} must be a decimal coordinate"))),
        Err(_) => Ok(default),
    }
}

fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
