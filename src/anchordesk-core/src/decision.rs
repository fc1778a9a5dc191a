//! Segment decisions emitted by the director.

use serde::{Deserialize, Serialize};

use crate::story::Story;

/// Tag of an on-air segment, as recorded in the director's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentType {
    Breaking,
    ChipReset,
    AdBreak,
    VegaPad,
    BitsyMeta,
    News,
    Banter,
    Expose,
}

impl SegmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentType::Breaking => "breaking",
            SegmentType::ChipReset => "chip_reset",
            SegmentType::AdBreak => "ad_break",
            SegmentType::VegaPad => "vega_pad",
            SegmentType::BitsyMeta => "bitsy_meta",
            SegmentType::News => "news",
            SegmentType::Banter => "banter",
            SegmentType::Expose => "expose",
        }
    }

    pub fn is_cameo(&self) -> bool {
        matches!(self, SegmentType::VegaPad | SegmentType::BitsyMeta)
    }
}

impl std::fmt::Display for SegmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which booth character a cameo belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameoKind {
    /// Short vibe interlude from the booth.
    Vibe,
    /// Self-aware aside about the broadcast itself.
    Meta,
}

/// Fallback segments chosen when nothing more urgent applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Routine {
    News,
    Banter,
    Expose,
}

/// What airs next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SegmentDecision {
    Breaking { story: Story },
    Reset { stories: Vec<Story> },
    Ad,
    Cameo { kind: CameoKind, line: String },
    Routine { routine: Routine },
}

impl SegmentDecision {
    pub fn segment_type(&self) -> SegmentType {
        match self {
            SegmentDecision::Breaking { .. } => SegmentType::Breaking,
            SegmentDecision::Reset { .. } => SegmentType::ChipReset,
            SegmentDecision::Ad => SegmentType::AdBreak,
            SegmentDecision::Cameo { kind: CameoKind::Vibe, .. } => SegmentType::VegaPad,
            SegmentDecision::Cameo { kind: CameoKind::Meta, .. } => SegmentType::BitsyMeta,
            SegmentDecision::Routine { routine: Routine::News } => SegmentType::News,
            SegmentDecision::Routine { routine: Routine::Banter } => SegmentType::Banter,
            SegmentDecision::Routine { routine: Routine::Expose } => SegmentType::Expose,
        }
    }

    pub fn routine(routine: Routine) -> Self {
        SegmentDecision::Routine { routine }
    }
}
