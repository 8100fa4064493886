use std::collections::BTreeMap;

use crate::error::{AppError, Result};
use crate::types::RiskCategory;

/// Built-in trigger phrases per risk category (Spanish marketplace wording).
const DEFAULT_PHRASES: &[(RiskCategory, &[&str])] = &[
    (RiskCategory::CriticalLegal, &["sin papeles", "sin documentacion", "no papeles"]),
    (RiskCategory::CriticalIntegrity, &["sin itv", "para piezas", "despiece"]),
    (RiskCategory::CriticalFraud, &["robo", "importacion", "procedencia dudosa"]),
    (RiskCategory::GeneralUrgency, &["urgente", "solo hoy", "rapido"]),
    (RiskCategory::GeneralPrice, &["ganga", "chollo", "muy barato"]),
];

/// Terms marking a listing as gear or an accessory rather than a vehicle.
const DEFAULT_BLOCKLIST: &[&str] = &[
    "casco", "guante", "chaqueta", "pantalón", "pantalon", "botas", "alforja", "mochila",
    "chaleco", "protector", "cubremanos", "candado", "antirrobo", "baul", "maleta", "caballete",
];

/// Risk category -> trigger phrases. Phrases are stored lowercased.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordTaxonomy {
    categories: BTreeMap<RiskCategory, Vec<String>>,
}

impl KeywordTaxonomy {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (RiskCategory, Vec<S>)>,
        S: Into<String>,
    {
        let mut categories: BTreeMap<RiskCategory, Vec<String>> = BTreeMap::new();
        for (category, phrases) in entries {
            let bucket = categories.entry(category).or_default();
            for phrase in phrases {
                let phrase = phrase.into().trim().to_lowercase();
                if !phrase.is_empty() && !bucket.contains(&phrase) {
                    bucket.push(phrase);
                }
            }
        }
        Self { categories }
    }

    /// Parse `{ "CRITICAL_LEGAL": ["sin papeles", ...], ... }`. Keys are case-insensitive,
    /// so the two-bucket `{ "motorbike_specific": [..], "general_fraud": [..] }` layout
    /// loads as one critical and one general category.
    /// Unknown category names are rejected rather than ignored.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let raw: BTreeMap<String, Vec<String>> = serde_json::from_str(s)?;
        let mut entries = Vec::with_capacity(raw.len());
        for (name, phrases) in raw {
            let category = RiskCategory::parse(&name)
                .ok_or_else(|| AppError::Taxonomy(format!("unknown risk category '{name}'")))?;
            entries.push((category, phrases));
        }
        Ok(Self::new(entries))
    }

    pub fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn iter(&self) -> impl Iterator<Item = (RiskCategory, &[String])> {
        self.categories.iter().map(|(c, p)| (*c, p.as_slice()))
    }

    pub fn phrase_count(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }
}

impl Default for KeywordTaxonomy {
    fn default() -> Self {
        Self::new(
            DEFAULT_PHRASES
                .iter()
                .map(|(c, phrases)| (*c, phrases.to_vec())),
        )
    }
}

/// Accessory-indicating terms, stored lowercased.
#[derive(Debug, Clone, PartialEq)]
pub struct Blocklist {
    terms: Vec<String>,
}

impl Blocklist {
    pub fn new<S: Into<String>>(terms: impl IntoIterator<Item = S>) -> Self {
        Self {
            terms: terms
                .into_iter()
                .map(|t| t.into().trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    /// True if any term occurs in `text` (case-insensitive substring).
    pub fn matches(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        self.terms.iter().any(|t| text.contains(t.as_str()))
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }
}

impl Default for Blocklist {
    fn default() -> Self {
        Self::new(DEFAULT_BLOCKLIST.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_taxonomy_covers_every_category() {
        let taxonomy = KeywordTaxonomy::default();
        let categories: Vec<RiskCategory> = taxonomy.iter().map(|(c, _)| c).collect();
        let expected: Vec<RiskCategory> = DEFAULT_PHRASES.iter().map(|(c, _)| *c).collect();
        assert_eq!(categories, expected);
        assert_eq!(taxonomy.phrase_count(), 15);
    }

    #[test]
    fn json_taxonomy_lowercases_phrases() {
        let taxonomy =
            KeywordTaxonomy::from_json_str(r#"{"GENERAL_PRICE": ["Ganga", " CHOLLO "]}"#).unwrap();
        let (category, phrases) = taxonomy.iter().next().unwrap();
        assert_eq!(category, RiskCategory::GeneralPrice);
        assert_eq!(phrases, ["ganga".to_string(), "chollo".to_string()]);
    }

    #[test]
    fn json_taxonomy_rejects_unknown_category() {
        let err = KeywordTaxonomy::from_json_str(r#"{"SPAM": ["x"]}"#).unwrap_err();
        assert!(matches!(err, AppError::Taxonomy(_)));
    }

    #[test]
    fn two_bucket_keyword_file_loads() {
        let taxonomy = KeywordTaxonomy::from_json_str(
            r#"{
                "motorbike_specific": ["Sin papeles", "sin ITV", "para piezas"],
                "general_fraud": ["urgente", "pago por adelantado"]
            }"#,
        )
        .unwrap();
        let buckets: Vec<(RiskCategory, usize)> = taxonomy.iter().map(|(c, p)| (c, p.len())).collect();
        assert_eq!(
            buckets,
            vec![(RiskCategory::MotorbikeSpecific, 3), (RiskCategory::GeneralFraud, 2)]
        );
        let (_, phrases) = taxonomy.iter().next().unwrap();
        assert_eq!(phrases[1], "sin itv");
    }

    #[test]
    fn blocklist_matches_case_insensitively() {
        let blocklist = Blocklist::default();
        assert!(blocklist.matches("Casco moto integral"));
        assert!(blocklist.matches("PANTALÓN de cordura"));
        assert!(!blocklist.matches("Yamaha MT-07 2019"));
    }
}
