//! Anchor profiles and the persona directory.
//!
//! Represents the on-air cast with their specialties and pairings.

use serde::{Deserialize, Serialize};

use crate::domain::Domain;
use crate::timeline::ToneShift;

/// Where an anchor sits in the studio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Desk {
    /// Hosts every segment.
    Lead,
    /// Domain specialist eligible for stories and crosstalk.
    #[default]
    Panel,
    /// Booth character for vibe interludes.
    Vibe,
    /// Booth character for self-aware asides.
    Meta,
}

/// Editorial role, used as a selection bonus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonaRole {
    PrimaryAnchor,
    Analyst,
    Contrarian,
}

impl PersonaRole {
    pub fn priority_bonus(&self) -> i32 {
        match self {
            PersonaRole::PrimaryAnchor => 10,
            PersonaRole::Analyst => 4,
            PersonaRole::Contrarian => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FatigueLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl FatigueLevel {
    /// More than 10 recent appearances is high, more than 5 medium.
    pub fn from_usage(usage: u32) -> Self {
        if usage > 10 {
            FatigueLevel::High
        } else if usage > 5 {
            FatigueLevel::Medium
        } else {
            FatigueLevel::Low
        }
    }

    pub fn penalty(&self) -> i32 {
        match self {
            FatigueLevel::Low => 0,
            FatigueLevel::Medium => 2,
            FatigueLevel::High => 4,
        }
    }
}

/// One member of the cast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorProfile {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub desk: Desk,
    #[serde(default)]
    pub domains: Vec<Domain>,
    #[serde(default)]
    pub roles: Vec<PersonaRole>,
    #[serde(default)]
    pub tone_bias: Vec<ToneShift>,
    #[serde(default)]
    pub duo_partner: Option<String>,
    #[serde(default)]
    pub fatigue_level: FatigueLevel,
    /// Volatile personalities kept off tragic follow-ups.
    #[serde(default)]
    pub chaotic: bool,
    #[serde(default)]
    pub voice_id: Option<String>,
}

impl AnchorProfile {
    pub fn new(id: impl Into<String>, desk: Desk) -> Self {
        Self {
            id: id.into(),
            display_name: None,
            desk,
            domains: Vec::new(),
            roles: Vec::new(),
            tone_bias: Vec::new(),
            duo_partner: None,
            fatigue_level: FatigueLevel::Low,
            chaotic: false,
            voice_id: None,
        }
    }

    pub fn with_domains(mut self, domains: &[Domain]) -> Self {
        self.domains = domains.to_vec();
        self
    }

    pub fn with_roles(mut self, roles: &[PersonaRole]) -> Self {
        self.roles = roles.to_vec();
        self
    }

    pub fn with_tone_bias(mut self, tones: &[ToneShift]) -> Self {
        self.tone_bias = tones.to_vec();
        self
    }

    pub fn with_duo(mut self, partner: impl Into<String>) -> Self {
        self.duo_partner = Some(partner.into());
        self
    }

    pub fn with_voice(mut self, voice_id: impl Into<String>) -> Self {
        self.voice_id = Some(voice_id.into());
        self
    }

    pub fn chaotic(mut self) -> Self {
        self.chaotic = true;
        self
    }

    /// Display name, falling back to the capitalised id.
    pub fn name(&self) -> String {
        if let Some(name) = &self.display_name {
            return name.clone();
        }
        let mut chars = self.id.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    /// Booth characters and chaotic panelists.
    pub fn is_comedic(&self) -> bool {
        matches!(self.desk, Desk::Vibe | Desk::Meta) || self.chaotic
    }
}

/// Read-only lookup over the cast, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct PersonaDirectory {
    profiles: Vec<AnchorProfile>,
}

impl PersonaDirectory {
    pub fn new(profiles: Vec<AnchorProfile>) -> Self {
        Self { profiles }
    }

    pub fn get(&self, id: &str) -> Option<&AnchorProfile> {
        self.profiles.iter().find(|p| p.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn profiles(&self) -> &[AnchorProfile] {
        &self.profiles
    }

    /// Panelists eligible to carry a story.
    pub fn panel(&self) -> impl Iterator<Item = &AnchorProfile> {
        self.profiles.iter().filter(|p| p.desk == Desk::Panel)
    }

    pub fn name_of(&self, id: &str) -> String {
        self.get(id).map(|p| p.name()).unwrap_or_else(|| id.to_string())
    }
}

/// Built-in cast.
pub fn default_roster() -> Vec<AnchorProfile> {
    use Domain::*;
    use PersonaRole::*;
    use ToneShift::*;

    vec![
        AnchorProfile::new("chip", Desk::Lead)
            .with_domains(&[General, Macro])
            .with_voice("am_michael"),
        AnchorProfile::new("bond", Desk::Panel)
            .with_domains(&[Macro, Markets])
            .with_roles(&[PrimaryAnchor])
            .with_tone_bias(&[Calm, Serious])
            .with_duo("lawson")
            .with_voice("bm_george"),
        AnchorProfile::new("reef", Desk::Panel)
            .with_domains(&[Defi])
            .with_roles(&[Analyst])
            .with_tone_bias(&[Hype])
            .with_duo("ledger")
            .with_voice("am_adam"),
        AnchorProfile::new("lawson", Desk::Panel)
            .with_domains(&[Regulation, Macro])
            .with_roles(&[Analyst])
            .with_tone_bias(&[Serious])
            .with_duo("bond")
            .with_voice("bm_lewis"),
        AnchorProfile::new("ledger", Desk::Panel)
            .with_domains(&[Onchain, Security])
            .with_roles(&[Analyst])
            .with_tone_bias(&[Serious])
            .with_duo("reef")
            .with_voice("am_eric"),
        AnchorProfile::new("cap", Desk::Panel)
            .with_domains(&[Funding])
            .with_roles(&[Analyst])
            .with_duo("neura"),
        AnchorProfile::new("neura", Desk::Panel)
            .with_domains(&[Ai])
            .with_roles(&[Analyst])
            .with_duo("cap"),
        AnchorProfile::new("ivy", Desk::Panel)
            .with_domains(&[Meme, Markets])
            .with_roles(&[Contrarian])
            .with_tone_bias(&[Calm]),
        AnchorProfile::new("cash", Desk::Panel)
            .with_domains(&[Markets, Retail])
            .with_roles(&[Contrarian])
            .with_tone_bias(&[Hype])
            .with_duo("penny"),
        AnchorProfile::new("rex", Desk::Panel)
            .with_domains(&[Volatility])
            .with_roles(&[Contrarian])
            .with_tone_bias(&[Urgent, Hype])
            .chaotic(),
        AnchorProfile::new("penny", Desk::Panel)
            .with_domains(&[Retail, Meme])
            .with_roles(&[Analyst])
            .with_tone_bias(&[Calm])
            .with_duo("cash")
            .with_voice("af_bella"),
        AnchorProfile::new("vega", Desk::Vibe).with_voice("af_sky"),
        AnchorProfile::new("bitsy", Desk::Meta)
            .with_domains(&[Meme])
            .with_voice("af_nicole"),
    ]
}
