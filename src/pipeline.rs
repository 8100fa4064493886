use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::config::{ScoringConfig, HIGH_RISK_THRESHOLD};
use crate::detector::detect_keywords;
use crate::filter::{dedup_by_id, filter_accessories};
use crate::normalizer::normalize;
use crate::scorer::RiskScorer;
use crate::stats::{PriceStatistics, SellerCounts};
use crate::taxonomy::{Blocklist, KeywordTaxonomy};
use crate::types::{EnrichedListing, Enrichment, RawListing};

/// Outcome of one batch run.
#[derive(Debug, Clone)]
pub struct EnrichReport {
    pub listings: Vec<EnrichedListing>,
    pub duplicates: usize,
    pub removed_accessories: usize,
    pub price_stats: PriceStatistics,
    pub unique_sellers: usize,
    /// Listings scoring at or above HIGH_RISK_THRESHOLD.
    pub high_risk: usize,
}

/// Dedup -> accessory filter -> batch statistics -> per-listing normalize + score.
pub struct Enricher {
    taxonomy: KeywordTaxonomy,
    blocklist: Blocklist,
    scorer: RiskScorer,
}

impl Enricher {
    pub fn new(taxonomy: KeywordTaxonomy, blocklist: Blocklist, scoring: ScoringConfig) -> Self {
        Self {
            taxonomy,
            blocklist,
            scorer: RiskScorer::new(scoring),
        }
    }

    pub fn run(&self, raw: Vec<RawListing>) -> EnrichReport {
        self.run_at(raw, Utc::now())
    }

    /// `now` is the crawl time stamped on listings that arrive without one.
    pub fn run_at(&self, raw: Vec<RawListing>, now: DateTime<Utc>) -> EnrichReport {
        let (unique, duplicates) = dedup_by_id(raw);
        let (kept, removed_accessories) = filter_accessories(unique, &self.blocklist);
        info!(
            "[FILTER] duplicates={duplicates} accessories_removed={removed_accessories} remaining={}",
            kept.len()
        );

        let price_stats = PriceStatistics::from_listings(&kept);
        let sellers = SellerCounts::from_listings(&kept);
        let listings = self.enrich_with(&kept, &price_stats, &sellers, now);

        let high_risk = listings
            .iter()
            .filter(|l| l.enrichment.risk_score >= HIGH_RISK_THRESHOLD)
            .count();

        EnrichReport {
            listings,
            duplicates,
            removed_accessories,
            price_stats,
            unique_sellers: sellers.unique_sellers(),
            high_risk,
        }
    }

    fn enrich_with(
        &self,
        listings: &[RawListing],
        price_stats: &PriceStatistics,
        sellers: &SellerCounts,
        now: DateTime<Utc>,
    ) -> Vec<EnrichedListing> {
        info!(
            "[ENRICH] median={:.2} mean={:.2} min={:.2} max={:.2} priced={} sellers={}",
            price_stats.median,
            price_stats.mean,
            price_stats.min,
            price_stats.max,
            price_stats.samples,
            sellers.unique_sellers(),
        );
        listings
            .iter()
            .map(|listing| self.enrich_one(listing, price_stats, sellers, now))
            .collect()
    }

    pub fn enrich_one(
        &self,
        listing: &RawListing,
        price_stats: &PriceStatistics,
        sellers: &SellerCounts,
        now: DateTime<Utc>,
    ) -> EnrichedListing {
        let fields = normalize(listing, now);
        let matches = detect_keywords(&listing.text(), &self.taxonomy);
        let assessment = self
            .scorer
            .score(listing, fields.price, price_stats, sellers, &matches);

        debug!(
            id = ?fields.id,
            score = assessment.score,
            keyword = assessment.points.keyword,
            price = assessment.points.price,
            seller = assessment.points.seller,
            description = assessment.points.description,
            "scored listing"
        );

        let enrichment = Enrichment {
            price: fields.price,
            relative_price_index: round2(price_stats.ratio(fields.price)),
            risk_score: assessment.score,
            risk_factors: assessment.factors,
            has_suspicious_keywords: !matches.is_empty(),
            suspicious_keywords: matches.phrases.into_iter().collect(),
            seller_items_today: sellers.count_for(listing),
        };
        fields.with_enrichment(enrichment)
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
