use chrono::{DateTime, SecondsFormat, Utc};

use crate::config::{DEFAULT_CURRENCY, EPOCH_MILLIS_THRESHOLD};
use crate::types::{
    value_to_f64, value_to_string, EnrichedListing, Enrichment, GeoPoint, Location, RawListing,
    Timestamps,
};

/// Canonical document fields derived from one raw listing, before enrichment.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalFields {
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
}

impl CanonicalFields {
    pub fn with_enrichment(self, enrichment: Enrichment) -> EnrichedListing {
        EnrichedListing {
            id: self.id,
            title: self.title,
            description: self.description,
            price: self.price,
            currency: self.currency,
            seller_id: self.seller_id,
            category_id: self.category_id,
            web_slug: self.web_slug,
            location: self.location,
            timestamps: self.timestamps,
            taxonomy: self.taxonomy,
            enrichment,
        }
    }
}

/// Map any accepted raw shape onto the canonical fields. Never fails: absent or
/// mistyped optional fields fall back to empty strings, nulls or zero.
/// `now` stands in for `crawl_timestamp` when the source has none.
pub fn normalize(listing: &RawListing, now: DateTime<Utc>) -> CanonicalFields {
    let currency = listing
        .str_field(&["currency"])
        .or_else(|| {
            listing
                .field(&["price"])
                .and_then(|p| p.get("currency"))
                .and_then(value_to_string)
        })
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

    let taxonomy = listing
        .field(&["taxonomy"])
        .and_then(|t| t.as_array())
        .cloned()
        .unwrap_or_default();

    CanonicalFields {
        id: listing.id(),
        title: listing.title(),
        description: listing.description(),
        price: listing.price(),
        currency,
        seller_id: listing.seller_id(),
        category_id: listing.str_field(&["category_id", "categoryid"]),
        web_slug: listing.str_field(&["web_slug", "webslug"]),
        location: normalize_location(listing),
        timestamps: normalize_timestamps(listing, now),
        taxonomy,
    }
}

/// City, postal code and region as strings; `geo` only when both coordinates convert.
pub fn normalize_location(listing: &RawListing) -> Location {
    let Some(loc) = listing.field(&["location"]).filter(|l| l.is_object()) else {
        return Location::default();
    };
    let text = |keys: &[&str]| {
        keys.iter()
            .filter_map(|k| loc.get(*k))
            .find_map(value_to_string)
            .unwrap_or_default()
    };

    let lat = loc.get("latitude").and_then(value_to_f64);
    let lon = loc.get("longitude").and_then(value_to_f64);
    let geo = match (lat, lon) {
        (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => Some(GeoPoint { lat, lon }),
        _ => None,
    };

    Location {
        city: text(&["city"]),
        postal_code: text(&["postal_code", "postalcode"]),
        region: text(&["region"]),
        geo,
    }
}

pub fn normalize_timestamps(listing: &RawListing, now: DateTime<Utc>) -> Timestamps {
    let ts = |keys: &[&str]| listing.field(keys).and_then(normalize_timestamp);
    Timestamps {
        created_at: ts(&["created_at", "createdat"]),
        modified_at: ts(&["modified_at", "modifiedat"]),
        crawl_timestamp: ts(&["crawl_timestamp"]).unwrap_or_else(|| format_utc(now)),
    }
}

/// ISO strings pass through; epoch seconds or milliseconds become UTC ISO-8601
/// with a `Z` suffix. Zero, empty and non-scalar values yield `None`.
pub fn normalize_timestamp(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        serde_json::Value::Number(n) => {
            let raw = n.as_f64().filter(|v| v.is_finite() && *v != 0.0)?;
            let millis = if raw.abs() > EPOCH_MILLIS_THRESHOLD {
                raw
            } else {
                raw * 1000.0
            };
            DateTime::from_timestamp_millis(millis.round() as i64).map(format_utc)
        }
        _ => None,
    }
}

pub fn format_utc(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}
