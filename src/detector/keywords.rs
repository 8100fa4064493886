use std::collections::BTreeSet;

use crate::taxonomy::KeywordTaxonomy;
use crate::types::RiskCategory;

/// Phrases and categories found in one listing's text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeywordMatches {
    pub phrases: BTreeSet<String>,
    pub categories: BTreeSet<RiskCategory>,
}

impl KeywordMatches {
    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    /// Most severe category matched; ties resolve to the first in taxonomy order.
    pub fn strongest(&self) -> Option<RiskCategory> {
        self.categories
            .iter()
            .copied()
            .max_by(|a, b| a.severity().cmp(&b.severity()).then(b.cmp(a)))
    }
}

/// Case-insensitive substring match of every taxonomy phrase against `text`.
/// No tokenization: "rapido" also hits "rapidos", "robo" also hits "robot".
pub fn detect_keywords(text: &str, taxonomy: &KeywordTaxonomy) -> KeywordMatches {
    let mut matches = KeywordMatches::default();
    if text.trim().is_empty() {
        return matches;
    }

    let text = text.to_lowercase();
    for (category, phrases) in taxonomy.iter() {
        for phrase in phrases {
            if text.contains(phrase.as_str()) {
                matches.phrases.insert(phrase.clone());
                matches.categories.insert(category);
            }
        }
    }
    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_are_case_insensitive() {
        let m = detect_keywords("Honda CBR SIN PAPELES, Urgente", &KeywordTaxonomy::default());
        assert!(m.phrases.contains("sin papeles"));
        assert!(m.phrases.contains("urgente"));
        assert_eq!(
            m.categories.iter().copied().collect::<Vec<_>>(),
            vec![RiskCategory::CriticalLegal, RiskCategory::GeneralUrgency]
        );
    }

    #[test]
    fn substring_matching_has_no_word_boundaries() {
        let m = detect_keywords("Robot de cocina", &KeywordTaxonomy::default());
        assert!(m.phrases.contains("robo"));
        assert!(m.categories.contains(&RiskCategory::CriticalFraud));
    }

    #[test]
    fn empty_text_matches_nothing() {
        let m = detect_keywords("   ", &KeywordTaxonomy::default());
        assert!(m.is_empty());
        assert!(m.strongest().is_none());
    }

    #[test]
    fn strongest_prefers_critical() {
        let m = detect_keywords("chollo, para piezas", &KeywordTaxonomy::default());
        assert_eq!(m.strongest(), Some(RiskCategory::CriticalIntegrity));
    }

    #[test]
    fn two_bucket_taxonomy_prefers_vehicle_bucket() {
        let taxonomy = KeywordTaxonomy::new([
            (RiskCategory::GeneralFraud, vec!["urgente"]),
            (RiskCategory::MotorbikeSpecific, vec!["sin papeles"]),
        ]);
        let m = detect_keywords("URGENTE, sin papeles", &taxonomy);
        assert_eq!(m.strongest(), Some(RiskCategory::MotorbikeSpecific));
    }

    #[test]
    fn injected_taxonomy_replaces_defaults() {
        let taxonomy = KeywordTaxonomy::new([(RiskCategory::GeneralPrice, vec!["regalo"])]);
        let m = detect_keywords("Casi un regalo. Sin papeles", &taxonomy);
        assert_eq!(m.phrases.len(), 1);
        assert!(m.phrases.contains("regalo"));
    }
}
