//! Story candidates supplied by the ingestion side.
//!
//! Stories are read-only to the director. Malformed fields never reject a
//! story: importance falls back to 5 (and is clamped to 1..=10), unknown
//! sentiment reads as neutral, unknown domain reads as general.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::Domain;

pub const DEFAULT_IMPORTANCE: u8 = 5;

/// Editorial sentiment attached at ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    #[default]
    Neutral,
    Negative,
}

/// A single news item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    #[serde(default)]
    pub headline: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default = "default_domain")]
    pub domain: Domain,
    #[serde(default, deserialize_with = "lenient_sentiment")]
    pub sentiment: Sentiment,
    /// 1..=10 editorial weight.
    #[serde(default = "default_importance", deserialize_with = "lenient_importance")]
    pub importance: u8,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl Story {
    pub fn new(headline: impl Into<String>) -> Self {
        Self {
            headline: headline.into(),
            summary: String::new(),
            domain: Domain::General,
            sentiment: Sentiment::Neutral,
            importance: DEFAULT_IMPORTANCE,
            timestamp: Utc::now(),
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn with_domain(mut self, domain: Domain) -> Self {
        self.domain = domain;
        self
    }

    pub fn with_sentiment(mut self, sentiment: Sentiment) -> Self {
        self.sentiment = sentiment;
        self
    }

    pub fn with_importance(mut self, importance: u8) -> Self {
        self.importance = importance.clamp(1, 10);
        self
    }

    /// Domain used for routing: the declared one, or the headline's.
    pub fn resolved_domain(&self) -> Domain {
        Domain::resolve(Some(self.domain), &self.headline)
    }
}

fn default_domain() -> Domain {
    Domain::General
}

fn default_importance() -> u8 {
    DEFAULT_IMPORTANCE
}

fn lenient_importance<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let parsed = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(match parsed {
        Some(n) if n.is_finite() => n.round().clamp(1.0, 10.0) as u8,
        _ => DEFAULT_IMPORTANCE,
    })
}

fn lenient_sentiment<'de, D>(deserializer: D) -> Result<Sentiment, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => match s.trim().to_lowercase().as_str() {
            "positive" | "bullish" => Sentiment::Positive,
            "negative" | "bearish" => Sentiment::Negative,
            _ => Sentiment::Neutral,
        },
        _ => Sentiment::Neutral,
    })
}

/// Input document read by the harness each cycle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Feed {
    #[serde(default)]
    pub stories: Vec<Story>,
    /// Stories that jump the queue as breaking news.
    #[serde(default)]
    pub breaking: Vec<Story>,
}

impl Feed {
    pub fn from_json(content: &str) -> Result<Self, crate::error::DeskError> {
        serde_json::from_str(content)
            .map_err(|e| crate::error::DeskError::Feed(format!("Failed to parse feed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_fall_back_to_neutral_defaults() {
        let story: Story = serde_json::from_str(r#"{"headline": "Quiet markets"}"#).unwrap();
        assert_eq!(story.importance, 5);
        assert_eq!(story.sentiment, Sentiment::Neutral);
        assert_eq!(story.domain, Domain::General);
    }

    #[test]
    fn test_malformed_fields_are_recovered() {
        let story: Story = serde_json::from_str(
            r#"{"headline": "x", "importance": "high", "sentiment": 7, "domain": "weather"}"#,
        )
        .unwrap();
        assert_eq!(story.importance, 5);
        assert_eq!(story.sentiment, Sentiment::Neutral);
        assert_eq!(story.domain, Domain::General);
    }

    #[test]
    fn test_sentiment_aliases_and_round_trip() {
        let story: Story =
            serde_json::from_str(r#"{"headline": "x", "sentiment": "Bearish"}"#).unwrap();
        assert_eq!(story.sentiment, Sentiment::Negative);
        let story: Story = serde_json::from_str(r#"{"sentiment": "mixed"}"#).unwrap();
        assert_eq!(story.sentiment, Sentiment::Neutral);

        let aired = Story::new("ETF approved").with_sentiment(Sentiment::Positive);
        let json = serde_json::to_string(&aired).unwrap();
        assert!(json.contains(r#""sentiment":"positive""#));
        let back: Story = serde_json::from_str(&json).unwrap();
        assert_eq!(back.sentiment, Sentiment::Positive);
    }

    #[test]
    fn test_importance_is_clamped() {
        let story: Story = serde_json::from_str(r#"{"importance": 42}"#).unwrap();
        assert_eq!(story.importance, 10);
        let story: Story = serde_json::from_str(r#"{"importance": "0"}"#).unwrap();
        assert_eq!(story.importance, 1);
    }

    #[test]
    fn test_resolved_domain_uses_headline_when_general() {
        let story = Story::new("DeFi yield compresses");
        assert_eq!(story.resolved_domain(), Domain::Defi);
        let story = Story::new("DeFi yield compresses").with_domain(Domain::Macro);
        assert_eq!(story.resolved_domain(), Domain::Macro);
    }

    #[test]
    fn test_feed_parses_breaking_section() {
        let feed = Feed::from_json(
            r#"{"stories": [{"headline": "a"}], "breaking": [{"headline": "b", "importance": 9}]}"#,
        )
        .unwrap();
        assert_eq!(feed.stories.len(), 1);
        assert_eq!(feed.breaking[0].importance, 9);
    }
}
