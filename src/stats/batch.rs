use std::collections::HashMap;

use crate::config::UNKNOWN_SELLER;
use crate::types::RawListing;

// ---------------------------------------------------------------------------
// PriceStatistics
// ---------------------------------------------------------------------------

/// Batch-wide price aggregates over positive, finite prices.
/// All zero when the batch has no usable price.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PriceStatistics {
    pub median: f64,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// Number of prices that went into the aggregates.
    pub samples: usize,
}

impl PriceStatistics {
    pub fn from_listings(listings: &[RawListing]) -> Self {
        let prices: Vec<f64> = listings.iter().map(RawListing::price).collect();
        Self::from_prices(&prices)
    }

    pub fn from_prices(prices: &[f64]) -> Self {
        let mut valid: Vec<f64> = prices
            .iter()
            .copied()
            .filter(|p| p.is_finite() && *p > 0.0)
            .collect();
        if valid.is_empty() {
            return Self::default();
        }
        valid.sort_by(|a, b| a.total_cmp(b));

        let n = valid.len();
        let median = if n % 2 == 1 {
            valid[n / 2]
        } else {
            (valid[n / 2 - 1] + valid[n / 2]) / 2.0
        };

        Self {
            median,
            mean: valid.iter().sum::<f64>() / n as f64,
            min: valid[0],
            max: valid[n - 1],
            samples: n,
        }
    }

    /// Reference price for relative pricing.
    pub fn reference(&self) -> f64 {
        self.median
    }

    /// `price / reference`, or 0.0 when there is no reference to divide by.
    pub fn ratio(&self, price: f64) -> f64 {
        let reference = self.reference();
        if reference > 0.0 {
            price / reference
        } else {
            0.0
        }
    }
}

// ---------------------------------------------------------------------------
// SellerCounts
// ---------------------------------------------------------------------------

/// Listings per seller in the batch. Missing seller ids share one bucket.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SellerCounts {
    counts: HashMap<String, usize>,
}

impl SellerCounts {
    pub fn from_listings(listings: &[RawListing]) -> Self {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for listing in listings {
            *counts.entry(Self::key(listing)).or_insert(0) += 1;
        }
        Self { counts }
    }

    /// Bucket key for a listing: its seller id, or the unknown sentinel.
    pub fn key(listing: &RawListing) -> String {
        listing
            .seller_id()
            .unwrap_or_else(|| UNKNOWN_SELLER.to_string())
    }

    pub fn count(&self, seller_key: &str) -> usize {
        self.counts.get(seller_key).copied().unwrap_or(0)
    }

    pub fn count_for(&self, listing: &RawListing) -> usize {
        self.count(&Self::key(listing))
    }

    /// Distinct buckets, the unknown bucket included.
    pub fn unique_sellers(&self) -> usize {
        self.counts.len()
    }
}
