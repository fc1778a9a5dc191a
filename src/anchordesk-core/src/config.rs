//! Configuration module for loading TOML config files.
//!
//! Every section is optional. Cooldowns and probability tables are tuning
//! knobs, so the defaults below are the house settings rather than a contract.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::daypart::Daypart;
use crate::error::DeskError;
use crate::persona::{AnchorProfile, default_roster};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub director: DirectorConfig,
    pub hijinx: HijinxConfig,
    pub assembly: AssemblyConfig,
    pub producer: ProducerConfig,
    /// Roster override. Empty means the built-in roster.
    pub personas: Vec<AnchorProfile>,
}

/// Scheduler timing and thresholds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DirectorConfig {
    pub intro_interval_secs: i64,
    pub reset_interval_secs: i64,
    pub reset_cooldown_secs: i64,
    pub reset_suppression_cycles: u32,
    pub reset_min_escalation: u8,
    /// Queue length that counts as a headline flood.
    pub headline_flood: usize,
    pub ad_buffer_secs: i64,
    pub daytime_ad_buffer_secs: i64,
    pub history_window: usize,
    /// Importance at or above which a story is too serious for hijinx.
    pub serious_importance: u8,
    pub warm_intro_offset_secs: i64,
    pub warm_reset_offset_secs: i64,
    pub warm_ad_offset_secs: i64,
}

impl Default for DirectorConfig {
    fn default() -> Self {
        Self {
            intro_interval_secs: 600,
            reset_interval_secs: 300,
            reset_cooldown_secs: 300,
            reset_suppression_cycles: 2,
            reset_min_escalation: 2,
            headline_flood: 3,
            ad_buffer_secs: 240,
            daytime_ad_buffer_secs: 360,
            history_window: 20,
            serious_importance: 7,
            warm_intro_offset_secs: 60,
            warm_reset_offset_secs: 120,
            warm_ad_offset_secs: 60,
        }
    }
}

impl DirectorConfig {
    pub fn ad_buffer_for(&self, daypart: Daypart) -> i64 {
        if daypart.is_daytime() {
            self.daytime_ad_buffer_secs
        } else {
            self.ad_buffer_secs
        }
    }
}

/// Cameo frequency and the cameo line pools.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HijinxConfig {
    pub day: f64,
    pub morning: f64,
    pub evening: f64,
    pub late_night: f64,
    pub overnight: f64,
    pub fallback: f64,
    pub vibe_lines: Vec<String>,
    pub meta_lines: Vec<String>,
}

impl Default for HijinxConfig {
    fn default() -> Self {
        Self {
            day: 0.05,
            morning: 0.10,
            evening: 0.30,
            late_night: 0.60,
            overnight: 0.20,
            fallback: 0.10,
            vibe_lines: DEFAULT_VIBE_LINES.iter().map(|s| s.to_string()).collect(),
            meta_lines: DEFAULT_META_LINES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl HijinxConfig {
    pub fn probability_for(&self, daypart: Daypart) -> f64 {
        let p = match daypart {
            Daypart::Day => self.day,
            Daypart::Morning => self.morning,
            Daypart::Evening => self.evening,
            Daypart::LateNight => self.late_night,
            Daypart::Overnight => self.overnight,
        };
        if p.is_finite() { p.clamp(0.0, 1.0) } else { self.fallback }
    }
}

/// Timeline assembly knobs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AssemblyConfig {
    pub lead_anchor: String,
    pub vibe_anchor: String,
    pub meta_anchor: String,
    /// Anchors that take over follow-ups on tragic stories.
    pub stable_pool: Vec<String>,
    pub round_two_threshold: f64,
    pub default_social_heat: f64,
    pub news_sentence_limit: usize,
    pub late_night_sentence_limit: usize,
    pub max_rundown: usize,
    pub fatigue_penalty_per_use: i32,
    pub fatigue_penalty_cap: i32,
    pub fatigue_window_secs: i64,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            lead_anchor: "chip".to_string(),
            vibe_anchor: "vega".to_string(),
            meta_anchor: "bitsy".to_string(),
            stable_pool: vec!["bond".to_string(), "lawson".to_string(), "ledger".to_string()],
            round_two_threshold: 1.5,
            default_social_heat: 0.3,
            news_sentence_limit: 1,
            late_night_sentence_limit: 3,
            max_rundown: 3,
            fatigue_penalty_per_use: 1,
            fatigue_penalty_cap: 12,
            fatigue_window_secs: 1800,
        }
    }
}

/// Remote line producer settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProducerConfig {
    /// OpenAI-compatible API base URL.
    pub api_base: String,
    pub model: String,
    pub timeout_secs: u64,
    pub max_tokens: u32,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            timeout_secs: 20,
            max_tokens: 160,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DeskError> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| DeskError::Config(format!("Failed to read config: {}", e)))?;

        Self::from_str(&content)
    }

    /// Load configuration from string content.
    pub fn from_str(content: &str) -> Result<Self, DeskError> {
        toml::from_str(content)
            .map_err(|e| DeskError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Configured roster, or the built-in one.
    pub fn roster(&self) -> Vec<AnchorProfile> {
        if self.personas.is_empty() {
            default_roster()
        } else {
            self.personas.clone()
        }
    }
}

/// Default configuration embedded in the binary.
pub fn default_config() -> Config {
    Config::default()
}

const DEFAULT_VIBE_LINES: &[&str] = &[
    "Hey Chip, the vibe is immaculate tonight.",
    "You didn't hear this from me, but somebody rewired the studio lights again.",
    "Booth check, everything's spicy back here.",
    "Chip, keep an eye on the teleprompter. It just winked at me.",
];

const DEFAULT_META_LINES: &[&str] = &[
    "Technically, that's true, but let's not pretend it's the whole story.",
    "Just so the viewers know, this part gets complicated.",
    "Oh, we're doing that angle? Bold choice.",
    "I ran those numbers and they check out.",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config.director.reset_cooldown_secs, 300);
        assert_eq!(config.director.reset_suppression_cycles, 2);
        assert_eq!(config.hijinx.probability_for(Daypart::LateNight), 0.60);
        assert_eq!(config.assembly.lead_anchor, "chip");
        assert!(!config.roster().is_empty());
    }

    #[test]
    fn test_partial_section_override() {
        let config = Config::from_str(
            r#"
            [director]
            ad_buffer_secs = 120

            [hijinx]
            evening = 0.5
            "#,
        )
        .unwrap();
        assert_eq!(config.director.ad_buffer_secs, 120);
        assert_eq!(config.director.daytime_ad_buffer_secs, 360);
        assert_eq!(config.hijinx.probability_for(Daypart::Evening), 0.5);
        assert_eq!(config.hijinx.probability_for(Daypart::Day), 0.05);
    }

    #[test]
    fn test_ad_buffer_is_longer_during_the_day() {
        let config = DirectorConfig::default();
        assert_eq!(config.ad_buffer_for(Daypart::Morning), 360);
        assert_eq!(config.ad_buffer_for(Daypart::Evening), 240);
    }

    #[test]
    fn test_persona_override() {
        let config = Config::from_str(
            r#"
            [[personas]]
            id = "solo"
            domains = ["macro"]
            "#,
        )
        .unwrap();
        let roster = config.roster();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].id, "solo");
    }

    #[test]
    fn test_invalid_toml_is_a_config_error() {
        let err = Config::from_str("[director\n").unwrap_err();
        assert!(matches!(err, DeskError::Config(_)));
    }
}
