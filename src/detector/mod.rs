pub mod keywords;

pub use keywords::{detect_keywords, KeywordMatches};
