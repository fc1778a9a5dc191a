//! Hijinx gating: how playful the booth may be, and whether a cameo fires.

use serde::{Deserialize, Serialize};

use crate::config::HijinxConfig;
use crate::daypart::Daypart;
use crate::decision::CameoKind;
use crate::random::RandomSource;
use crate::story::{Sentiment, Story};
use crate::timeline::is_tragic;

/// Severity-aware ceiling on comedic interludes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HijinxLevel {
    None,
    Subtle,
    Moderate,
    Strong,
}

impl HijinxLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            HijinxLevel::None => "none",
            HijinxLevel::Subtle => "subtle",
            HijinxLevel::Moderate => "moderate",
            HijinxLevel::Strong => "strong",
        }
    }
}

/// Negative, tragic, or at/above the importance threshold.
pub fn is_serious(story: Option<&Story>, serious_importance: u8) -> bool {
    story.is_some_and(|s| {
        s.sentiment == Sentiment::Negative
            || s.importance >= serious_importance
            || is_tragic(&s.headline)
    })
}

pub fn hijinx_level(daypart: Daypart, serious: bool) -> HijinxLevel {
    if serious {
        return HijinxLevel::None;
    }
    match daypart {
        Daypart::Evening => HijinxLevel::Moderate,
        Daypart::LateNight => HijinxLevel::Strong,
        Daypart::Morning | Daypart::Day | Daypart::Overnight => HijinxLevel::Subtle,
    }
}

pub fn hijinx_probability(config: &HijinxConfig, daypart: Daypart, serious: bool) -> f64 {
    if serious {
        return 0.0;
    }
    config.probability_for(daypart)
}

/// Result of this cycle's hijinx evaluation. Computed every cycle, even when
/// no cameo airs.
#[derive(Debug, Clone, PartialEq)]
pub struct HijinxGate {
    pub level: HijinxLevel,
    pub probability: f64,
    pub roll: f64,
    pub cameo: Option<(CameoKind, String)>,
}

/// One weighted coin flip against the daypart probability; if it lands, pick
/// the cameo's kind and line.
///
/// Subtle hijinx only allows the meta aside. Moderate and strong split evenly
/// between the two booth characters.
pub fn roll_cameo(
    config: &HijinxConfig,
    daypart: Daypart,
    serious: bool,
    rng: &mut dyn RandomSource,
) -> HijinxGate {
    let level = hijinx_level(daypart, serious);
    let probability = hijinx_probability(config, daypart, serious);
    let roll = rng.roll();

    let fired = level != HijinxLevel::None && roll < probability;
    let cameo = if fired {
        let kind = match level {
            HijinxLevel::Moderate | HijinxLevel::Strong if rng.roll() < 0.5 => CameoKind::Vibe,
            _ => CameoKind::Meta,
        };
        let pool = match kind {
            CameoKind::Vibe => &config.vibe_lines,
            CameoKind::Meta => &config.meta_lines,
        };
        let line = if pool.is_empty() {
            String::new()
        } else {
            pool[rng.pick(pool.len())].clone()
        };
        Some((kind, line))
    } else {
        None
    };

    HijinxGate {
        level,
        probability,
        roll,
        cameo,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::ScriptedRandom;

    #[test]
    fn test_serious_stories_disable_hijinx() {
        let story = Story::new("Token slides").with_sentiment(Sentiment::Negative);
        assert!(is_serious(Some(&story), 7));
        assert!(is_serious(Some(&Story::new("x").with_importance(7)), 7));
        assert!(is_serious(Some(&Story::new("Shooting near venue")), 7));
        assert!(!is_serious(Some(&Story::new("x").with_importance(6)), 7));
        assert!(!is_serious(None, 7));
        assert_eq!(hijinx_level(Daypart::LateNight, true), HijinxLevel::None);
        assert_eq!(hijinx_probability(&HijinxConfig::default(), Daypart::LateNight, true), 0.0);
    }

    #[test]
    fn test_daypart_probability_table() {
        let config = HijinxConfig::default();
        assert_eq!(hijinx_probability(&config, Daypart::Day, false), 0.05);
        assert_eq!(hijinx_probability(&config, Daypart::Morning, false), 0.10);
        assert_eq!(hijinx_probability(&config, Daypart::Evening, false), 0.30);
        assert_eq!(hijinx_probability(&config, Daypart::LateNight, false), 0.60);
        assert_eq!(hijinx_probability(&config, Daypart::Overnight, false), 0.20);
    }

    #[test]
    fn test_roll_below_probability_fires() {
        let config = HijinxConfig::default();
        let mut rng = ScriptedRandom::new(vec![0.1, 0.2, 0.0]);
        let gate = roll_cameo(&config, Daypart::LateNight, false, &mut rng);
        let (kind, line) = gate.cameo.unwrap();
        assert_eq!(kind, CameoKind::Vibe);
        assert_eq!(line, config.vibe_lines[0]);
    }

    #[test]
    fn test_roll_above_probability_does_not_fire() {
        let config = HijinxConfig::default();
        let mut rng = ScriptedRandom::constant(0.7);
        let gate = roll_cameo(&config, Daypart::LateNight, false, &mut rng);
        assert!(gate.cameo.is_none());
        assert_eq!(gate.level, HijinxLevel::Strong);
    }

    #[test]
    fn test_subtle_hijinx_is_always_meta() {
        let config = HijinxConfig::default();
        let mut rng = ScriptedRandom::constant(0.01);
        let gate = roll_cameo(&config, Daypart::Day, false, &mut rng);
        assert_eq!(gate.cameo.map(|(kind, _)| kind), Some(CameoKind::Meta));
    }
}
