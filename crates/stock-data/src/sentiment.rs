//! Keyword-based sentiment scoring for news text

use serde::{Deserialize, Serialize};

use crate::error::{Result, StockError};
use crate::models::SentimentLabel;

const POSITIVE_KEYWORDS: &[&str] = &[
    "surge", "gain", "profit", "growth", "beat", "rally", "upgrade", "bullish", "outperform",
    "record", "soar", "jump", "strong", "rise",
];

const NEGATIVE_KEYWORDS: &[&str] = &[
    "drop", "fall", "loss", "decline", "downgrade", "bearish", "underperform", "plunge", "crash",
    "slump", "weak", "lawsuit", "layoff", "tumble",
];

/// Tunable constants for the sentiment classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentConfig {
    /// Divisor applied to the raw keyword tally
    pub normalization: f64,
    /// Scores strictly above this are positive
    pub positive_threshold: f64,
    /// Scores strictly below this are negative
    pub negative_threshold: f64,
    pub positive_keywords: Vec<String>,
    pub negative_keywords: Vec<String>,
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            normalization: 5.0,
            positive_threshold: 0.2,
            negative_threshold: -0.2,
            positive_keywords: POSITIVE_KEYWORDS.iter().map(ToString::to_string).collect(),
            negative_keywords: NEGATIVE_KEYWORDS.iter().map(ToString::to_string).collect(),
        }
    }
}

impl SentimentConfig {
    /// Validate the classifier settings
    pub fn validate(&self) -> Result<()> {
        if !(self.normalization.is_finite() && self.normalization > 0.0) {
            return Err(StockError::ConfigError(
                "sentiment normalization must be a positive number".to_string(),
            ));
        }

        if self.negative_threshold > self.positive_threshold {
            return Err(StockError::ConfigError(
                "sentiment negative threshold must not exceed the positive threshold".to_string(),
            ));
        }

        Ok(())
    }
}

/// Outcome of scoring a piece of text
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SentimentScore {
    pub label: SentimentLabel,
    /// Positive minus negative keyword matches
    pub raw: i32,
    /// Raw tally normalized into [-1, 1]
    pub score: f64,
}

/// Stateless keyword classifier
#[derive(Debug, Clone)]
pub struct SentimentScorer {
    config: SentimentConfig,
    positive: Vec<String>,
    negative: Vec<String>,
}

impl Default for SentimentScorer {
    fn default() -> Self {
        Self::new(SentimentConfig::default())
    }
}

impl SentimentScorer {
    pub fn new(config: SentimentConfig) -> Self {
        let positive = lowercase_all(&config.positive_keywords);
        let negative = lowercase_all(&config.negative_keywords);
        Self {
            config,
            positive,
            negative,
        }
    }

    /// Score `text`
    ///
    /// Matching is case-insensitive and works on words: a keyword matches when some word
    /// starts with it, so "gains" counts for "gain". Each keyword contributes at most once
    /// no matter how often it appears.
    pub fn score(&self, text: &str) -> SentimentScore {
        let words: Vec<String> = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|word| !word.is_empty())
            .map(str::to_lowercase)
            .collect();

        let matches = |keywords: &[String]| -> i32 {
            keywords
                .iter()
                .filter(|keyword| words.iter().any(|word| word.starts_with(keyword.as_str())))
                .count() as i32
        };

        let raw = matches(&self.positive) - matches(&self.negative);
        let score = (f64::from(raw) / self.config.normalization).clamp(-1.0, 1.0);

        SentimentScore {
            label: self.label_for(score),
            raw,
            score,
        }
    }

    /// Classify an already normalized score
    pub fn label_for(&self, score: f64) -> SentimentLabel {
        if score > self.config.positive_threshold {
            SentimentLabel::Positive
        } else if score < self.config.negative_threshold {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }

    /// Mean of per-article scores and its label; an empty slice is neutral at 0
    pub fn aggregate(&self, scores: &[f64]) -> (SentimentLabel, f64) {
        if scores.is_empty() {
            return (SentimentLabel::Neutral, 0.0);
        }
        let mean = scores.iter().sum::<f64>() / scores.len() as f64;
        (self.label_for(mean), mean)
    }
}

fn lowercase_all(keywords: &[String]) -> Vec<String> {
    keywords
        .iter()
        .map(|keyword| keyword.trim().to_lowercase())
        .filter(|keyword| !keyword.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_three_positive_keywords() {
        let scorer = SentimentScorer::default();
        let result = scorer.score("Shares surge after quarterly gain lifts profit");

        assert_eq!(result.raw, 3);
        assert!(approx(result.score, 0.6));
        assert_eq!(result.label, SentimentLabel::Positive);
    }

    #[test]
    fn test_balanced_keywords_are_neutral() {
        let scorer = SentimentScorer::default();
        let result = scorer.score("Profit growth offset by a drop in sales and a lawsuit");

        assert_eq!(result.raw, 0);
        assert!(approx(result.score, 0.0));
        assert_eq!(result.label, SentimentLabel::Neutral);
    }

    #[test]
    fn test_repeated_keyword_counts_once() {
        let scorer = SentimentScorer::default();
        let result = scorer.score("Gain, gain and more GAIN");

        assert_eq!(result.raw, 1);
        // 0.2 sits on the threshold, which is not strictly above it
        assert_eq!(result.label, SentimentLabel::Neutral);
    }

    #[test]
    fn test_negative_and_clamped() {
        let scorer = SentimentScorer::default();
        let result = scorer.score(
            "Stock plunge: crash, loss, decline, downgrade and layoff news, bearish outlook",
        );

        assert_eq!(result.raw, -7);
        assert!(approx(result.score, -1.0));
        assert_eq!(result.label, SentimentLabel::Negative);
    }

    #[test]
    fn test_prefix_matching_on_words() {
        let scorer = SentimentScorer::default();
        assert_eq!(scorer.score("Revenue gains and soaring margins").raw, 2);
        // keywords inside other words do not count
        assert_eq!(scorer.score("Regrowth of the ungainly beast").raw, 0);
        // any word starting with a keyword counts, inflected or not
        assert_eq!(scorer.score("Earnings recorded before the fallout").raw, 0);
        assert_eq!(scorer.score("Shares recorded a gain").raw, 2);
        assert_eq!(scorer.score("Market fallout deepens").raw, -1);
    }

    #[test]
    fn test_aggregate_mean() {
        let scorer = SentimentScorer::default();

        let (label, mean) = scorer.aggregate(&[0.6, 0.0, 0.3]);
        assert!(approx(mean, 0.3));
        assert_eq!(label, SentimentLabel::Positive);

        let (label, mean) = scorer.aggregate(&[-0.4, 0.2]);
        assert!(approx(mean, -0.1));
        assert_eq!(label, SentimentLabel::Neutral);

        assert_eq!(scorer.aggregate(&[]), (SentimentLabel::Neutral, 0.0));
    }

    #[test]
    fn test_custom_constants() {
        let config = SentimentConfig {
            normalization: 2.0,
            positive_threshold: 0.4,
            negative_threshold: -0.4,
            positive_keywords: vec!["Beat".to_string()],
            negative_keywords: vec!["miss".to_string()],
        };
        let scorer = SentimentScorer::new(config);

        let result = scorer.score("Earnings beat estimates");
        assert!(approx(result.score, 0.5));
        assert_eq!(result.label, SentimentLabel::Positive);
    }

    #[test]
    fn test_config_validation() {
        assert!(SentimentConfig::default().validate().is_ok());

        let config = SentimentConfig {
            normalization: 0.0,
            ..SentimentConfig::default()
        };
        assert!(config.validate().is_err());

        let config = SentimentConfig {
            positive_threshold: -0.5,
            negative_threshold: 0.5,
            ..SentimentConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
