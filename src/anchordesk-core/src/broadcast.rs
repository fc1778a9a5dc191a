//! Broadcast cycle: director, anchor selection and assembly wired together.
//!
//! One call to [`Broadcast::run_cycle`] takes a queue snapshot to a decision
//! and a finished timeline. The director state is committed only after the
//! timeline exists.

use serde::Serialize;
use tracing::debug;

use crate::config::Config;
use crate::daypart::CycleClock;
use crate::decision::{SegmentDecision, SegmentType};
use crate::director::Director;
use crate::lines::{LineWriter, TemplateWriter};
use crate::persona::PersonaDirectory;
use crate::random::RandomSource;
use crate::selector::{AnchorSelection, AnchorSelector};
use crate::state::DirectorState;
use crate::story::{Sentiment, Story};
use crate::timeline::{SegmentBrief, Timeline, TimelineAssembler, ToneShift};

/// Headline used when nothing is queued.
const QUIET_HOUR_HEADLINE: &str = "the week in crypto";

/// Callback for broadcast events.
pub type BroadcastCallback = Box<dyn Fn(BroadcastEvent) + Send + Sync>;

/// Events emitted during a cycle.
#[derive(Debug, Clone)]
pub enum BroadcastEvent {
    /// The director picked a segment.
    SegmentChosen {
        cycle: u64,
        segment: SegmentType,
        escalation: u8,
    },
    /// Anchors were picked for the segment.
    AnchorsSelected { primary: String, duo: Option<String> },
    /// The timeline is ready for the producer.
    TimelineReady { entries: usize, tragic: bool },
}

/// Everything one cycle produced.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub cycle: u64,
    pub decision: SegmentDecision,
    pub escalation: u8,
    pub selection: AnchorSelection,
    pub headline: String,
    pub timeline: Timeline,
    /// Queued story that aired and should leave the queue.
    pub aired: Option<Story>,
}

/// Owns the cast, the director and the random source for a broadcast.
pub struct Broadcast {
    config: Config,
    directory: PersonaDirectory,
    director: Director,
    writer: Box<dyn LineWriter + Send>,
    rng: Box<dyn RandomSource>,
    callback: Option<BroadcastCallback>,
}

impl Broadcast {
    pub fn new(config: Config, rng: Box<dyn RandomSource>) -> Self {
        let directory = PersonaDirectory::new(config.roster());
        let director = Director::from_config(&config);
        Self {
            config,
            directory,
            director,
            writer: Box::new(TemplateWriter),
            rng,
            callback: None,
        }
    }

    pub fn with_writer(mut self, writer: Box<dyn LineWriter + Send>) -> Self {
        self.writer = writer;
        self
    }

    /// Set a callback for broadcast events.
    pub fn with_callback(mut self, callback: BroadcastCallback) -> Self {
        self.callback = Some(callback);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn directory(&self) -> &PersonaDirectory {
        &self.directory
    }

    /// Evaluate, select, assemble, then commit to `state`.
    pub fn run_cycle(
        &mut self,
        state: &mut DirectorState,
        story_queue: &[Story],
        clock: CycleClock,
    ) -> CycleReport {
        let now = clock.now;
        let mut evaluation = self
            .director
            .evaluate(state, story_queue, clock, self.rng.as_mut());
        let cycle = evaluation.next_state().cycle_index;
        self.emit_event(BroadcastEvent::SegmentChosen {
            cycle,
            segment: evaluation.decision.segment_type(),
            escalation: evaluation.escalation,
        });

        let story = match &evaluation.decision {
            SegmentDecision::Breaking { story } => Some(story),
            SegmentDecision::Reset { stories } => stories.first(),
            _ => story_queue.first(),
        };
        let headline = story.map_or(QUIET_HOUR_HEADLINE, |s| s.headline.as_str());
        let tone = story.and_then(|s| tone_for(s, evaluation.escalation));

        let window = self.config.assembly.fatigue_window_secs;
        let selection = AnchorSelector::new(&self.directory, &self.config.assembly).select(
            headline,
            story.map(|s| s.domain),
            tone,
            |id| state.recent_usage(id, now, window),
        );
        self.emit_event(BroadcastEvent::AnchorsSelected {
            primary: selection.primary.clone(),
            duo: selection.duo.clone(),
        });

        let is_news = evaluation.decision.segment_type() == SegmentType::News;
        let brief = SegmentBrief::new(headline, clock.daypart())
            .with_synthesis(story.map_or("", |s| s.summary.as_str()))
            .with_domain(selection.domain)
            .with_tone(tone)
            .with_intro(is_news && !state.intro_played);

        let assembler =
            TimelineAssembler::new(&self.directory, &self.config.assembly, &self.config.hijinx);
        let timeline = assembler.assemble(
            &evaluation.decision,
            &selection.anchors(),
            &brief,
            self.writer.as_mut(),
            self.rng.as_mut(),
        );
        self.emit_event(BroadcastEvent::TimelineReady {
            entries: timeline.entries.len(),
            tragic: timeline.tragic,
        });

        let aired = if is_news { story_queue.first().cloned() } else { None };
        let headline = headline.to_string();
        let escalation = evaluation.escalation;

        if timeline.has_intro() {
            evaluation.mark_intro_aired(now);
        }
        evaluation.record_cast(timeline.speakers(), now, window);
        let decision = evaluation.commit(state);
        debug!(cycle, segment = %decision.segment_type(), "cycle committed");

        CycleReport {
            cycle,
            decision,
            escalation,
            selection,
            headline,
            timeline,
            aired,
        }
    }

    /// Emit an event if a callback is registered.
    fn emit_event(&self, event: BroadcastEvent) {
        if let Some(ref callback) = self.callback {
            callback(event);
        }
    }
}

/// Tone shift for a story at the current escalation.
pub fn tone_for(story: &Story, escalation: u8) -> Option<ToneShift> {
    if escalation >= 3 {
        Some(ToneShift::Urgent)
    } else if story.sentiment == Sentiment::Negative {
        Some(ToneShift::Serious)
    } else if story.sentiment == Sentiment::Positive && story.importance >= 7 {
        Some(ToneShift::Hype)
    } else {
        None
    }
}
