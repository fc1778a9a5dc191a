//! AnchorDesk Core Library
//!
//! Segment direction and dialogue timeline assembly for a continuous
//! multi-anchor news broadcast.

pub mod broadcast;
pub mod config;
pub mod daypart;
pub mod decision;
pub mod director;
pub mod domain;
pub mod error;
pub mod escalation;
pub mod hijinx;
pub mod lines;
pub mod persona;
pub mod producer;
pub mod random;
pub mod selector;
pub mod state;
pub mod story;
pub mod timeline;

pub use broadcast::{Broadcast, BroadcastEvent, CycleReport};
pub use config::{Config, default_config};
pub use daypart::{CycleClock, Daypart, Energy};
pub use decision::{CameoKind, Routine, SegmentDecision, SegmentType};
pub use director::{Director, Evaluation};
pub use domain::Domain;
pub use error::{DeskError, LineError};
pub use escalation::compute_escalation;
pub use lines::{LineWriter, TemplateWriter};
pub use persona::{AnchorProfile, PersonaDirectory};
pub use producer::{DraftProducer, LineProducer, OpenAiProducer, RenderedLine, render_timeline};
pub use random::{RandomSource, ScriptedRandom, SeededRandom};
pub use selector::{AnchorSelection, AnchorSelector, select_anchors};
pub use state::{DirectorState, StateStore};
pub use story::{Feed, Sentiment, Story};
pub use timeline::{Role, Timeline, TimelineAssembler, TimelineEntry, ToneShift};
