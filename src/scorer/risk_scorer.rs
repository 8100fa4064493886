use crate::config::{ScoringConfig, UNKNOWN_SELLER};
use crate::detector::KeywordMatches;
use crate::stats::{PriceStatistics, SellerCounts};
use crate::types::RawListing;

/// Points taken from each signal group. At most one tier per group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignalPoints {
    pub keyword: u32,
    pub price: u32,
    pub seller: u32,
    pub description: u32,
}

impl SignalPoints {
    pub fn total(&self) -> u32 {
        self.keyword
            .saturating_add(self.price)
            .saturating_add(self.seller)
            .saturating_add(self.description)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RiskAssessment {
    /// Sum of the selected tiers, clamped to 0..=100.
    pub score: u8,
    pub points: SignalPoints,
    /// Matched risk categories followed by the price/seller/description factors that fired.
    pub factors: Vec<String>,
}

/// Combines keyword, price, seller-volume and description signals into a 0-100 score.
/// Batch statistics are borrowed read-only for every call.
#[derive(Debug, Clone, Default)]
pub struct RiskScorer {
    cfg: ScoringConfig,
}

impl RiskScorer {
    pub fn new(cfg: ScoringConfig) -> Self {
        Self { cfg }
    }

    pub fn score(
        &self,
        listing: &RawListing,
        price: f64,
        price_stats: &PriceStatistics,
        sellers: &SellerCounts,
        keywords: &KeywordMatches,
    ) -> RiskAssessment {
        let mut points = SignalPoints::default();
        let mut factors: Vec<String> = keywords.categories.iter().map(|c| c.to_string()).collect();

        // 1. Keywords: strongest category only, never summed across categories.
        if let Some(category) = keywords.strongest() {
            points.keyword = self.cfg.keyword_points(category.severity());
        }

        // 2. Price: lowest-ratio tier that matches.
        if price > 0.0 && price_stats.reference() > 0.0 {
            let ratio = price_stats.ratio(price);
            if let Some(&(_, pts, name)) = self.cfg.price_tiers.iter().find(|(below, ..)| ratio < *below) {
                points.price = pts;
                factors.push(name.to_string());
            }
        }

        // 3. Seller volume: highest count tier that matches. Unknown sellers are not scored.
        let seller_key = SellerCounts::key(listing);
        if seller_key != UNKNOWN_SELLER {
            let count = sellers.count(&seller_key);
            if let Some(&(_, pts, name)) = self.cfg.seller_tiers.iter().find(|(above, ..)| count > *above) {
                points.seller = pts;
                factors.push(name.to_string());
            }
        }

        // 4. Description quality.
        if listing.description().chars().count() < self.cfg.min_description_chars {
            points.description = self.cfg.short_description_points;
            factors.push("short_description".to_string());
        }

        RiskAssessment {
            score: points.total().min(100) as u8,
            points,
            factors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::detect_keywords;
    use crate::taxonomy::KeywordTaxonomy;
        use serde_json::json;

    const LONG_DESC: &str = "Moto en perfecto estado, revisiones al día en concesionario oficial.";

    fn listing(seller: &str, description: &str) -> RawListing {
        RawListing::new(json!({"user_id": seller, "description": description}))
    }

    fn stats(median: f64) -> PriceStatistics {
        PriceStatistics::from_prices(&[median])
    }

    fn score_price(price: f64, median: f64) -> RiskAssessment {
        RiskScorer::default().score(
            &listing("s1", LONG_DESC),
            price,
            &stats(median),
            &SellerCounts::default(),
            &KeywordMatches::default(),
        )
    }

    #[test]
    fn price_tier_is_not_cumulative() {
        // ratio 0.2 satisfies every price tier numerically; only the top one applies.
        let a = score_price(200.0, 1000.0);
        assert_eq!(a.points.price, 40);
        assert_eq!(a.score, 40);
        assert_eq!(a.factors, vec!["extremely_low_price"]);
    }

    #[test]
    fn price_tiers_in_order() {
        assert_eq!(score_price(400.0, 1000.0).points.price, 30);
        assert_eq!(score_price(600.0, 1000.0).points.price, 15);
        assert_eq!(score_price(700.0, 1000.0).points.price, 0);
        assert_eq!(score_price(300.0, 1000.0).points.price, 30);
    }

    #[test]
    fn missing_price_or_reference_scores_no_price_points() {
        assert_eq!(score_price(0.0, 1000.0).points.price, 0);
        assert_eq!(score_price(100.0, 0.0).points.price, 0);
    }

    #[test]
    fn keyword_signal_takes_strongest_category_only() {
        let matches = detect_keywords(
            "Sin papeles, para piezas, urgente y muy barato",
            &KeywordTaxonomy::default(),
        );
        let a = RiskScorer::default().score(
            &listing("s1", LONG_DESC),
            0.0,
            &PriceStatistics::default(),
            &SellerCounts::default(),
            &matches,
        );
        assert_eq!(a.points.keyword, 30);
        assert_eq!(a.score, 30);
        assert!(a.factors.contains(&"CRITICAL_LEGAL".to_string()));
        assert!(a.factors.contains(&"GENERAL_PRICE".to_string()));
    }

    #[test]
    fn general_keywords_score_lower_tier() {
        let matches = detect_keywords("Chollo", &KeywordTaxonomy::default());
        let a = RiskScorer::default().score(
            &listing("s1", LONG_DESC),
            0.0,
            &PriceStatistics::default(),
            &SellerCounts::default(),
            &matches,
        );
        assert_eq!(a.points.keyword, 15);
    }

    #[test]
    fn keyword_points_come_from_config() {
        let cfg = ScoringConfig {
            critical_keyword_points: 50,
            general_keyword_points: 5,
            ..ScoringConfig::default()
        };
        let scorer = RiskScorer::new(cfg);
        let keyword_pts = |text: &str| {
            scorer
                .score(
                    &listing("s1", LONG_DESC),
                    0.0,
                    &PriceStatistics::default(),
                    &SellerCounts::default(),
                    &detect_keywords(text, &KeywordTaxonomy::default()),
                )
                .points
                .keyword
        };
        assert_eq!(keyword_pts("moto de importacion"), 50);
        assert_eq!(keyword_pts("solo hoy"), 5);
        assert_eq!(keyword_pts("Honda CB500"), 0);
    }

    #[test]
    fn seller_volume_tiers() {
        let batch: Vec<RawListing> = (0..12)
            .map(|_| listing("busy", LONG_DESC))
            .chain((0..6).map(|_| listing("mid", LONG_DESC)))
            .chain((0..5).map(|_| listing("calm", LONG_DESC)))
            .collect();
        let sellers = SellerCounts::from_listings(&batch);
        let scorer = RiskScorer::default();
        let pts = |seller: &str| {
            scorer
                .score(
                    &listing(seller, LONG_DESC),
                    0.0,
                    &PriceStatistics::default(),
                    &sellers,
                    &KeywordMatches::default(),
                )
                .points
                .seller
        };
        assert_eq!(pts("busy"), 20);
        assert_eq!(pts("mid"), 10);
        assert_eq!(pts("calm"), 0);
    }

    #[test]
    fn unknown_seller_bucket_is_not_scored() {
        let batch: Vec<RawListing> = (0..12).map(|_| RawListing::new(json!({}))).collect();
        let sellers = SellerCounts::from_listings(&batch);
        let a = RiskScorer::default().score(
            &RawListing::new(json!({"description": LONG_DESC})),
            0.0,
            &PriceStatistics::default(),
            &sellers,
            &KeywordMatches::default(),
        );
        assert_eq!(a.points.seller, 0);
    }

    #[test]
    fn short_description_adds_flat_points() {
        let a = RiskScorer::default().score(
            &listing("s1", "Vendo moto"),
            0.0,
            &PriceStatistics::default(),
            &SellerCounts::default(),
            &KeywordMatches::default(),
        );
        assert_eq!(a.points.description, 10);
        assert_eq!(a.factors, vec!["short_description"]);
    }

    #[test]
    fn all_groups_max_out_at_one_hundred() {
        let batch: Vec<RawListing> = (0..11).map(|_| listing("busy", "")).collect();
        let sellers = SellerCounts::from_listings(&batch);
        let matches = detect_keywords("robo", &KeywordTaxonomy::default());
        let a = RiskScorer::default().score(&batch[0], 10.0, &stats(1000.0), &sellers, &matches);
        assert_eq!(a.points.total(), 100);
        assert_eq!(a.score, 100);
    }

    #[test]
    fn oversized_weights_saturate_at_one_hundred() {
        let cfg = ScoringConfig {
            price_tiers: vec![(0.5, 90, "extremely_low_price")],
            short_description_points: 90,
            ..ScoringConfig::default()
        };
        let a = RiskScorer::new(cfg).score(
            &listing("s1", ""),
            100.0,
            &stats(1000.0),
            &SellerCounts::default(),
            &KeywordMatches::default(),
        );
        assert_eq!(a.points.total(), 180);
        assert_eq!(a.score, 100);
    }
}
