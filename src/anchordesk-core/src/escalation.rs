//! Escalation engine: a 0-3 severity score for the head of the queue.

use tracing::trace;

use crate::daypart::Daypart;
use crate::state::DirectorState;
use crate::story::{Sentiment, Story};

pub const MAX_ESCALATION: u8 = 3;

/// Headline terms that force maximum escalation.
pub const CRITICAL_TERMS: [&str; 7] = [
    "hack",
    "exploit",
    "liquidation",
    "crash",
    "attack",
    "breach",
    "emergency",
];

/// Severity of the current news cycle.
///
/// Rules are evaluated independently and combined by maximum. An empty queue
/// is always 0, whatever else is pending.
pub fn compute_escalation(story_queue: &[Story], state: &DirectorState, daypart: Daypart) -> u8 {
    let Some(story) = story_queue.first() else {
        return 0;
    };

    let mut level = 0;

    if story.importance >= 8 {
        level = level.max(2);
    }
    if story.importance >= 9 {
        level = level.max(3);
    }
    if story.sentiment == Sentiment::Negative {
        level = level.max(2);
    }
    if has_critical_term(&story.headline) {
        level = MAX_ESCALATION;
    }
    if !state.breaking_queue.is_empty() {
        level = MAX_ESCALATION;
    }

    trace!(%daypart, level, headline = %story.headline, "escalation computed");
    level
}

pub fn has_critical_term(headline: &str) -> bool {
    let headline = headline.to_lowercase();
    CRITICAL_TERMS.iter().any(|term| headline.contains(term))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn state() -> DirectorState {
        DirectorState::warm(Utc::now(), &Default::default())
    }

    #[test]
    fn test_empty_queue_short_circuits() {
        let mut state = state();
        state.push_breaking(Story::new("Exchange halts withdrawals"));
        assert_eq!(compute_escalation(&[], &state, Daypart::Day), 0);
    }

    #[test]
    fn test_importance_thresholds() {
        let state = state();
        let calm = Story::new("Quiet session").with_importance(7);
        let big = Story::new("Quiet session").with_importance(8);
        let huge = Story::new("Quiet session").with_importance(9);
        assert_eq!(compute_escalation(&[calm], &state, Daypart::Day), 0);
        assert_eq!(compute_escalation(&[big], &state, Daypart::Day), 2);
        assert_eq!(compute_escalation(&[huge], &state, Daypart::Day), 3);
    }

    #[test]
    fn test_negative_sentiment_raises_to_two() {
        let story = Story::new("Token slides").with_sentiment(Sentiment::Negative);
        assert_eq!(compute_escalation(&[story], &state(), Daypart::Evening), 2);
    }

    #[test]
    fn test_rules_combine_by_maximum_not_sum() {
        let story = Story::new("Token slides")
            .with_sentiment(Sentiment::Negative)
            .with_importance(8);
        assert_eq!(compute_escalation(&[story], &state(), Daypart::Evening), 2);
    }

    #[test]
    fn test_critical_term_overrides() {
        let story = Story::new("Exchange suffers major hack").with_importance(2);
        assert_eq!(compute_escalation(&[story], &state(), Daypart::Day), 3);
    }

    #[test]
    fn test_pending_breaking_news_escalates() {
        let mut state = state();
        state.push_breaking(Story::new("Breaking item"));
        let story = Story::new("Routine update");
        assert_eq!(compute_escalation(&[story], &state, Daypart::Day), 3);
    }

    #[test]
    fn test_only_queue_head_is_scored() {
        let calm = Story::new("Routine update");
        let hot = Story::new("Bridge exploit").with_importance(10);
        assert_eq!(compute_escalation(&[calm, hot], &state(), Daypart::Day), 0);
    }
}
