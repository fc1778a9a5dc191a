//! Segment director: the per-cycle priority cascade.
//!
//! [`Director::evaluate`] never touches the caller's state. It returns an
//! [`Evaluation`] holding the decision and the state as it should look once
//! the segment has aired; [`Evaluation::commit`] applies it. A cycle that is
//! abandoned before commit leaves no trace.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::config::{Config, DirectorConfig, HijinxConfig};
use crate::daypart::{CycleClock, Energy};
use crate::decision::{Routine, SegmentDecision, SegmentType};
use crate::escalation::compute_escalation;
use crate::hijinx::{HijinxGate, is_serious, roll_cameo};
use crate::random::RandomSource;
use crate::state::DirectorState;
use crate::story::Story;

/// Outcome of one evaluation, not yet applied.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub decision: SegmentDecision,
    /// Escalation after suppression was applied.
    pub escalation: u8,
    /// Hijinx gate for the cycle, absent when a breaking or reset decision
    /// returned before it was reached.
    pub hijinx: Option<HijinxGate>,
    next_state: DirectorState,
}

impl Evaluation {
    pub fn next_state(&self) -> &DirectorState {
        &self.next_state
    }

    /// The show intro aired in this segment.
    pub fn mark_intro_aired(&mut self, now: DateTime<Utc>) {
        self.next_state.intro_played = true;
        self.next_state.last_intro_time = now;
    }

    /// Count an appearance for every anchor who spoke.
    pub fn record_cast<'a>(
        &mut self,
        anchors: impl IntoIterator<Item = &'a str>,
        now: DateTime<Utc>,
        window_secs: i64,
    ) {
        for anchor in anchors {
            self.next_state.record_cast(anchor, now, window_secs);
        }
    }

    /// Apply the evaluated state and hand back the decision.
    pub fn commit(self, state: &mut DirectorState) -> SegmentDecision {
        *state = self.next_state;
        self.decision
    }
}

/// Chooses the next segment.
#[derive(Debug, Clone, Default)]
pub struct Director {
    config: DirectorConfig,
    hijinx: HijinxConfig,
}

impl Director {
    pub fn new(config: DirectorConfig, hijinx: HijinxConfig) -> Self {
        Self { config, hijinx }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.director.clone(), config.hijinx.clone())
    }

    pub fn config(&self) -> &DirectorConfig {
        &self.config
    }

    /// Run the cascade for one cycle: escalation, breaking, reset, hijinx,
    /// ad, then default routing. The first rule that fires wins.
    pub fn evaluate(
        &self,
        state: &DirectorState,
        story_queue: &[Story],
        clock: CycleClock,
        rng: &mut dyn RandomSource,
    ) -> Evaluation {
        let now = clock.now;
        let daypart = clock.daypart();
        let mut next = state.clone();

        let mut escalation = compute_escalation(story_queue, state, daypart);
        if next.reset_suppression_cycles > 0 {
            debug!(
                computed = escalation,
                remaining = next.reset_suppression_cycles,
                "escalation suppressed after reset"
            );
            escalation = 0;
            next.reset_suppression_cycles -= 1;
        }
        next.escalation_level = escalation;

        if let Some(story) = next.breaking_queue.pop_front() {
            info!(
                headline = %story.headline,
                pending = next.breaking_queue.len(),
                "breaking interrupt"
            );
            return self.finish(next, SegmentDecision::Breaking { story }, escalation, None);
        }

        let since_intro = (now - state.last_intro_time).num_seconds();
        let since_reset = (now - state.last_reset_time).num_seconds();
        let breaking_just_ended = state.last_history_entry() == Some(SegmentType::Breaking)
            && state.breaking_queue.is_empty();
        let considered = since_intro > self.config.intro_interval_secs
            || since_reset > self.config.reset_interval_secs
            || story_queue.len() >= self.config.headline_flood
            || breaking_just_ended;
        let eligible = since_reset >= self.config.reset_cooldown_secs
            && escalation >= self.config.reset_min_escalation;

        if considered && eligible {
            info!(
                escalation,
                queue = story_queue.len(),
                since_reset,
                history = ?state.segment_history.iter().rev().take(5).collect::<Vec<_>>(),
                "reset triggered"
            );
            next.mark_reset(now);
            next.last_intro_time = now;
            next.reset_suppression_cycles = self.config.reset_suppression_cycles;
            let decision = SegmentDecision::Reset {
                stories: story_queue.to_vec(),
            };
            return self.finish(next, decision, escalation, None);
        }

        let serious = is_serious(story_queue.first(), self.config.serious_importance);
        let gate = roll_cameo(&self.hijinx, daypart, serious, rng);
        debug!(
            level = gate.level.as_str(),
            probability = gate.probability,
            roll = gate.roll,
            fired = gate.cameo.is_some(),
            "hijinx evaluated"
        );

        let recovering = state.last_segment.is_some_and(|s| s.is_cameo());
        if let Some((kind, line)) = gate.cameo.clone() {
            if recovering {
                debug!(cameo = ?kind, "cameo held back, previous segment was a cameo");
            } else {
                info!(cameo = ?kind, %daypart, "cameo fired");
                let decision = SegmentDecision::Cameo { kind, line };
                return self.finish(next, decision, escalation, Some(gate));
            }
        }

        let since_ad = (now - state.last_ad_time).num_seconds();
        let buffer = self.config.ad_buffer_for(daypart);
        if since_ad > buffer {
            info!(since_ad, buffer, "ad opportunity");
            next.last_ad_time = now;
            return self.finish(next, SegmentDecision::Ad, escalation, Some(gate));
        }

        let decision = if recovering {
            SegmentDecision::routine(Routine::News)
        } else if !story_queue.is_empty() {
            SegmentDecision::routine(Routine::News)
        } else {
            match clock.energy() {
                Energy::High | Energy::MediumHigh => SegmentDecision::routine(Routine::Banter),
                Energy::Low => SegmentDecision::routine(Routine::Expose),
                Energy::Medium => SegmentDecision::routine(Routine::Banter),
            }
        };
        if matches!(decision, SegmentDecision::Routine { routine: Routine::Banter }) {
            next.last_banter_time = now;
        }
        info!(
            segment = %decision.segment_type(),
            queue = story_queue.len(),
            energy = ?clock.energy(),
            "segment routed"
        );
        self.finish(next, decision, escalation, Some(gate))
    }

    fn finish(
        &self,
        mut next: DirectorState,
        decision: SegmentDecision,
        escalation: u8,
        hijinx: Option<HijinxGate>,
    ) -> Evaluation {
        next.record_segment(decision.segment_type(), self.config.history_window);
        next.cycle_index += 1;
        Evaluation {
            decision,
            escalation,
            hijinx,
            next_state: next,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::CameoKind;
    use crate::random::ScriptedRandom;
    use crate::story::Sentiment;
    use chrono::Duration;

    fn director() -> Director {
        Director::default()
    }

    fn clock(now: DateTime<Utc>, hour: u32) -> CycleClock {
        CycleClock::new(now, hour)
    }

    fn warm(now: DateTime<Utc>) -> DirectorState {
        DirectorState::warm(now, &DirectorConfig::default())
    }

    fn calm_story() -> Story {
        Story::new("Bitcoin ETF inflows rise")
    }

    fn severe_story() -> Story {
        Story::new("Exchange suffers major hack")
            .with_importance(9)
            .with_sentiment(Sentiment::Negative)
    }

    #[test]
    fn test_breaking_queue_always_wins() {
        let now = Utc::now();
        let mut eligible = warm(now);
        eligible.last_reset_time = now - Duration::seconds(900);
        eligible.last_ad_time = now - Duration::seconds(900);
        let mut suppressed = warm(now);
        suppressed.reset_suppression_cycles = 2;
        let mut after_cameo = warm(now);
        after_cameo.record_segment(SegmentType::VegaPad, 20);

        for mut state in [warm(now), eligible, suppressed, after_cameo] {
            state.push_breaking(Story::new("Exchange halts withdrawals"));
            for queue in [vec![], vec![severe_story()], vec![calm_story(); 5]] {
                let mut rng = ScriptedRandom::constant(0.0);
                let evaluation = director().evaluate(&state, &queue, clock(now, 23), &mut rng);
                assert_eq!(evaluation.decision.segment_type(), SegmentType::Breaking);
                assert!(evaluation.next_state().breaking_queue.is_empty());
            }
        }
    }

    #[test]
    fn test_severe_story_without_reset_conditions_airs_news() {
        let now = Utc::now();
        let state = warm(now);
        let mut rng = ScriptedRandom::constant(0.99);
        let evaluation = director().evaluate(&state, &[severe_story()], clock(now, 14), &mut rng);
        assert_eq!(evaluation.escalation, 3);
        assert_eq!(evaluation.decision.segment_type(), SegmentType::News);
    }

    #[test]
    fn test_overdue_reset_with_severe_story() {
        let now = Utc::now();
        let mut state = warm(now);
        state.last_reset_time = now - Duration::seconds(301);
        let mut rng = ScriptedRandom::constant(0.99);
        let evaluation = director().evaluate(&state, &[severe_story()], clock(now, 14), &mut rng);
        assert_eq!(evaluation.decision.segment_type(), SegmentType::ChipReset);

        evaluation.commit(&mut state);
        assert_eq!(state.reset_suppression_cycles, 2);
        assert_eq!(state.last_reset_time, now);
        assert_eq!(state.last_segment, Some(SegmentType::ChipReset));
    }

    #[test]
    fn test_reset_suppresses_escalation_for_two_cycles() {
        let now = Utc::now();
        let mut state = warm(now);
        state.last_reset_time = now - Duration::seconds(301);
        let queue = [severe_story()];
        let mut rng = ScriptedRandom::constant(0.99);

        director()
            .evaluate(&state, &queue, clock(now, 14), &mut rng)
            .commit(&mut state);
        assert_eq!(state.reset_suppression_cycles, 2);

        for expected_remaining in [1, 0] {
            let evaluation = director().evaluate(&state, &queue, clock(now, 14), &mut rng);
            assert_eq!(evaluation.escalation, 0);
            assert_eq!(evaluation.next_state().escalation_level, 0);
            assert_ne!(evaluation.decision.segment_type(), SegmentType::ChipReset);
            evaluation.commit(&mut state);
            assert_eq!(state.reset_suppression_cycles, expected_remaining);
        }

        let evaluation = director().evaluate(&state, &queue, clock(now, 14), &mut rng);
        assert_eq!(evaluation.escalation, 3);
    }

    #[test]
    fn test_reset_needs_escalation() {
        let now = Utc::now();
        let mut state = warm(now);
        state.last_reset_time = now - Duration::seconds(600);
        let mut rng = ScriptedRandom::constant(0.99);
        let evaluation = director().evaluate(&state, &[calm_story()], clock(now, 14), &mut rng);
        assert_ne!(evaluation.decision.segment_type(), SegmentType::ChipReset);
    }

    #[test]
    fn test_reset_when_intro_overdue() {
        let now = Utc::now();
        let mut state = warm(now);
        state.last_reset_time = now - Duration::seconds(300);
        state.last_intro_time = now - Duration::seconds(601);
        let mut rng = ScriptedRandom::constant(0.99);
        let evaluation = director().evaluate(&state, &[severe_story()], clock(now, 14), &mut rng);
        assert_eq!(evaluation.decision.segment_type(), SegmentType::ChipReset);
        assert_eq!(evaluation.next_state().last_intro_time, now);
    }

    #[test]
    fn test_reset_on_headline_flood() {
        let now = Utc::now();
        let mut state = warm(now);
        state.last_reset_time = now - Duration::seconds(300);
        state.last_intro_time = now;
        let mut rng = ScriptedRandom::constant(0.99);

        let flood = [severe_story(), calm_story(), calm_story()];
        let evaluation = director().evaluate(&state, &flood, clock(now, 14), &mut rng);
        match &evaluation.decision {
            SegmentDecision::Reset { stories } => assert_eq!(stories.len(), 3),
            other => panic!("expected reset, got {:?}", other),
        }

        let evaluation = director().evaluate(&state, &flood[..2], clock(now, 14), &mut rng);
        assert_eq!(evaluation.decision.segment_type(), SegmentType::News);
    }

    #[test]
    fn test_reset_after_breaking_ends() {
        let now = Utc::now();
        let mut state = warm(now);
        state.last_reset_time = now - Duration::seconds(300);
        state.record_segment(SegmentType::Breaking, 20);
        let mut rng = ScriptedRandom::constant(0.99);
        let evaluation = director().evaluate(&state, &[severe_story()], clock(now, 14), &mut rng);
        assert_eq!(evaluation.decision.segment_type(), SegmentType::ChipReset);
        assert!(evaluation.hijinx.is_none());
    }

    #[test]
    fn test_cameo_is_followed_by_news() {
        let now = Utc::now();
        let mut state = warm(now);
        let queue = [calm_story()];

        let mut rng = ScriptedRandom::new(vec![0.1, 0.2, 0.0]);
        let first = director().evaluate(&state, &queue, clock(now, 23), &mut rng);
        assert_eq!(first.decision.segment_type(), SegmentType::VegaPad);
        first.commit(&mut state);

        let mut rng = ScriptedRandom::constant(0.0);
        let later = now + Duration::seconds(30);
        let second = director().evaluate(&state, &queue, clock(later, 23), &mut rng);
        assert!(second.hijinx.as_ref().is_some_and(|g| g.cameo.is_some()));
        assert_eq!(second.decision.segment_type(), SegmentType::News);
    }

    #[test]
    fn test_cameo_kind_and_line_come_from_gate() {
        let now = Utc::now();
        let state = warm(now);
        let mut rng = ScriptedRandom::new(vec![0.1, 0.7, 0.0]);
        let evaluation = director().evaluate(&state, &[calm_story()], clock(now, 23), &mut rng);
        match evaluation.decision {
            SegmentDecision::Cameo { kind, line } => {
                assert_eq!(kind, CameoKind::Meta);
                assert_eq!(line, HijinxConfig::default().meta_lines[0]);
            }
            other => panic!("expected cameo, got {:?}", other),
        }
    }

    #[test]
    fn test_serious_story_blocks_cameo() {
        let now = Utc::now();
        let state = warm(now);
        let story = calm_story().with_sentiment(Sentiment::Negative);
        let mut rng = ScriptedRandom::constant(0.0);
        let evaluation = director().evaluate(&state, &[story], clock(now, 23), &mut rng);
        assert_eq!(evaluation.decision.segment_type(), SegmentType::News);
    }

    #[test]
    fn test_ad_buffer_depends_on_daypart() {
        let now = Utc::now();
        let mut state = warm(now);
        state.last_ad_time = now - Duration::seconds(300);
        let mut rng = ScriptedRandom::constant(0.99);

        let evening = director().evaluate(&state, &[calm_story()], clock(now, 19), &mut rng);
        assert_eq!(evening.decision, SegmentDecision::Ad);
        assert_eq!(evening.next_state().last_ad_time, now);

        let morning = director().evaluate(&state, &[calm_story()], clock(now, 9), &mut rng);
        assert_eq!(morning.decision.segment_type(), SegmentType::News);
    }

    #[test]
    fn test_empty_queue_routes_by_energy() {
        let now = Utc::now();
        let state = warm(now);
        let mut rng = ScriptedRandom::constant(0.99);
        let cases = [
            (23, SegmentType::Banter),
            (19, SegmentType::Banter),
            (9, SegmentType::Banter),
            (14, SegmentType::Expose),
            (4, SegmentType::Expose),
        ];
        for (hour, expected) in cases {
            let evaluation = director().evaluate(&state, &[], clock(now, hour), &mut rng);
            assert_eq!(evaluation.decision.segment_type(), expected, "hour {hour}");
            assert_eq!(evaluation.escalation, 0);
        }
    }

    #[test]
    fn test_commit_updates_history_and_cast() {
        let now = Utc::now();
        let mut state = warm(now);
        let mut rng = ScriptedRandom::constant(0.99);
        let mut evaluation = director().evaluate(&state, &[calm_story()], clock(now, 14), &mut rng);
        evaluation.mark_intro_aired(now);
        evaluation.record_cast(["chip", "cash"], now, 1800);
        assert_eq!(state.cycle_index, 0);

        let decision = evaluation.commit(&mut state);
        assert_eq!(decision.segment_type(), SegmentType::News);
        assert_eq!(state.segment_history.len(), 1);
        assert_eq!(state.cycle_index, 1);
        assert!(state.intro_played);
        assert_eq!(state.recent_usage("cash", now, 1800), 1);
    }

    #[test]
    fn test_uncommitted_evaluation_is_repeatable() {
        let now = Utc::now();
        let mut state = warm(now);
        state.last_reset_time = now - Duration::seconds(400);
        let queue = [severe_story(), calm_story()];
        let first = director().evaluate(&state, &queue, clock(now, 22), &mut ScriptedRandom::constant(0.3));
        let second = director().evaluate(&state, &queue, clock(now, 22), &mut ScriptedRandom::constant(0.3));
        assert_eq!(first.decision, second.decision);
        assert_eq!(first.next_state(), second.next_state());
        assert_eq!(state.reset_suppression_cycles, 0);
    }
}
