use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Raw listing
// ---------------------------------------------------------------------------

/// One marketplace item exactly as the search API returned it.
/// Field names differ between API variants (`user_id` / `userid`, ...), so the
/// record stays untyped and is read through the accessors below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawListing(pub serde_json::Value);

impl RawListing {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// First present, non-null value among `keys`.
    pub fn field(&self, keys: &[&str]) -> Option<&serde_json::Value> {
        keys.iter()
            .filter_map(|k| self.0.get(*k))
            .find(|v| !v.is_null())
    }

    /// First field among `keys` rendered as a non-empty string. Numbers are stringified.
    pub fn str_field(&self, keys: &[&str]) -> Option<String> {
        keys.iter()
            .filter_map(|k| self.0.get(*k))
            .find_map(value_to_string)
    }

    /// Listing identifier, if the source supplied one.
    pub fn id(&self) -> Option<String> {
        self.str_field(&["id"])
    }

    pub fn title(&self) -> String {
        self.str_field(&["title"]).unwrap_or_default()
    }

    pub fn description(&self) -> String {
        self.str_field(&["description"]).unwrap_or_default()
    }

    pub fn seller_id(&self) -> Option<String> {
        self.str_field(&["user_id", "userid"])
    }

    /// Title and description joined for keyword matching.
    pub fn text(&self) -> String {
        format!("{} {}", self.title(), self.description())
    }

    /// Price as a bare number, numeric string, or `{ "amount": .. }` wrapper.
    /// Anything else reads as 0.0.
    pub fn price(&self) -> f64 {
        let Some(price) = self.field(&["price"]) else {
            return 0.0;
        };
        let amount = match price.get("amount") {
            Some(a) => a,
            None => price,
        };
        value_to_f64(amount).filter(|p| p.is_finite()).unwrap_or(0.0)
    }
}

/// Numbers and numeric strings as f64.
pub fn value_to_f64(v: &serde_json::Value) -> Option<f64> {
    v.as_f64()
        .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
}

/// Non-empty strings as-is, numbers stringified.
pub fn value_to_string(v: &serde_json::Value) -> Option<String> {
    match v {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Risk taxonomy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskCategory {
    /// Missing paperwork.
    CriticalLegal,
    /// Vehicle sold for parts or without inspection.
    CriticalIntegrity,
    /// Stolen or dubious provenance.
    CriticalFraud,
    /// Catch-all bucket for vehicle-specific red flags in two-bucket keyword files.
    MotorbikeSpecific,
    GeneralUrgency,
    GeneralPrice,
    /// Catch-all bucket for generic scam wording in two-bucket keyword files.
    GeneralFraud,
}

impl RiskCategory {
    pub const ALL: [RiskCategory; 7] = [
        RiskCategory::CriticalLegal,
        RiskCategory::CriticalIntegrity,
        RiskCategory::CriticalFraud,
        RiskCategory::MotorbikeSpecific,
        RiskCategory::GeneralUrgency,
        RiskCategory::GeneralPrice,
        RiskCategory::GeneralFraud,
    ];

    pub fn severity(self) -> Severity {
        match self {
            RiskCategory::CriticalLegal
            | RiskCategory::CriticalIntegrity
            | RiskCategory::CriticalFraud
            | RiskCategory::MotorbikeSpecific => Severity::Critical,
            RiskCategory::GeneralUrgency
            | RiskCategory::GeneralPrice
            | RiskCategory::GeneralFraud => Severity::General,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        RiskCategory::ALL
            .into_iter()
            .find(|c| c.to_string().eq_ignore_ascii_case(s.trim()))
    }
}

impl std::fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RiskCategory::CriticalLegal => "CRITICAL_LEGAL",
            RiskCategory::CriticalIntegrity => "CRITICAL_INTEGRITY",
            RiskCategory::CriticalFraud => "CRITICAL_FRAUD",
            RiskCategory::MotorbikeSpecific => "MOTORBIKE_SPECIFIC",
            RiskCategory::GeneralUrgency => "GENERAL_URGENCY",
            RiskCategory::GeneralPrice => "GENERAL_PRICE",
            RiskCategory::GeneralFraud => "GENERAL_FRAUD",
        };
        write!(f, "{s}")
    }
}

/// Ordered so that `Critical > General`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    General,
    Critical,
}

// ---------------------------------------------------------------------------
// Enriched listing (search-store document shape)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedListing {
    pub id: Option<String>,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub currency: String,
    pub seller_id: Option<String>,
    pub category_id: Option<String>,
    pub web_slug: Option<String>,
    pub location: Location,
    pub timestamps: Timestamps,
    pub taxonomy: Vec<serde_json::Value>,
    pub enrichment: Enrichment,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub city: String,
    pub postal_code: String,
    pub region: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub geo: Option<GeoPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// ISO-8601 UTC strings. `crawl_timestamp` is always set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timestamps {
    pub created_at: Option<String>,
    pub modified_at: Option<String>,
    pub crawl_timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrichment {
    pub price: f64,
    pub relative_price_index: f64,
    pub risk_score: u8,
    pub risk_factors: Vec<String>,
    pub suspicious_keywords: Vec<String>,
    pub has_suspicious_keywords: bool,
    pub seller_items_today: usize,
}
