//! Director state and its on-disk store.
//!
//! The state is an explicit value owned by the caller of the director. A
//! cycle changes it only through [`crate::director::Evaluation::commit`],
//! once the decision and its timeline have both been produced.

use std::collections::{BTreeMap, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, warn};

use crate::config::DirectorConfig;
use crate::decision::SegmentType;
use crate::error::DeskError;
use crate::escalation::MAX_ESCALATION;
use crate::story::Story;

/// Everything the director remembers between cycles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectorState {
    #[serde(default)]
    pub last_segment: Option<SegmentType>,
    #[serde(default, deserialize_with = "lenient_history")]
    pub segment_history: VecDeque<SegmentType>,
    pub last_intro_time: DateTime<Utc>,
    pub last_reset_time: DateTime<Utc>,
    pub last_ad_time: DateTime<Utc>,
    pub last_banter_time: DateTime<Utc>,
    #[serde(default, deserialize_with = "clamped_escalation")]
    pub escalation_level: u8,
    #[serde(default, deserialize_with = "non_negative")]
    pub reset_suppression_cycles: u32,
    #[serde(default)]
    pub breaking_queue: VecDeque<Story>,
    #[serde(default)]
    pub cast_usage: BTreeMap<String, u32>,
    #[serde(default)]
    pub cast_cooldowns: BTreeMap<String, DateTime<Utc>>,
    #[serde(default)]
    pub intro_played: bool,
    #[serde(default)]
    pub cycle_index: u64,
}

impl DirectorState {
    /// Fresh state with timestamps slightly in the past, so the first cycle
    /// neither resets nor breaks for an ad.
    pub fn warm(now: DateTime<Utc>, config: &DirectorConfig) -> Self {
        Self {
            last_segment: None,
            segment_history: VecDeque::new(),
            last_intro_time: now - Duration::seconds(config.warm_intro_offset_secs),
            last_reset_time: now - Duration::seconds(config.warm_reset_offset_secs),
            last_ad_time: now - Duration::seconds(config.warm_ad_offset_secs),
            last_banter_time: now - Duration::seconds(config.warm_ad_offset_secs),
            escalation_level: 0,
            reset_suppression_cycles: 0,
            breaking_queue: VecDeque::new(),
            cast_usage: BTreeMap::new(),
            cast_cooldowns: BTreeMap::new(),
            intro_played: false,
            cycle_index: 0,
        }
    }

    /// Queue a story to interrupt the next cycle.
    pub fn push_breaking(&mut self, story: Story) {
        self.breaking_queue.push_back(story);
    }

    /// Append to the bounded history and set `last_segment`.
    pub fn record_segment(&mut self, segment: SegmentType, window: usize) {
        self.segment_history.push_back(segment);
        while self.segment_history.len() > window.max(1) {
            self.segment_history.pop_front();
        }
        self.last_segment = Some(segment);
    }

    pub fn last_history_entry(&self) -> Option<SegmentType> {
        self.segment_history.back().copied()
    }

    /// Never moves the reset clock backwards.
    pub fn mark_reset(&mut self, now: DateTime<Utc>) {
        if now > self.last_reset_time {
            self.last_reset_time = now;
        }
    }

    /// Appearances within the fatigue window. Older counts have expired.
    pub fn recent_usage(&self, anchor: &str, now: DateTime<Utc>, window_secs: i64) -> u32 {
        let Some(last) = self.cast_cooldowns.get(anchor) else {
            return 0;
        };
        if (now - *last).num_seconds() > window_secs {
            return 0;
        }
        self.cast_usage.get(anchor).copied().unwrap_or(0)
    }

    /// Count one appearance for `anchor` at `now`.
    pub fn record_cast(&mut self, anchor: &str, now: DateTime<Utc>, window_secs: i64) {
        let usage = self.recent_usage(anchor, now, window_secs) + 1;
        self.cast_usage.insert(anchor.to_string(), usage);
        self.cast_cooldowns.insert(anchor.to_string(), now);
    }

    /// Bring a loaded state back inside its invariants.
    pub fn sanitize(&mut self, config: &DirectorConfig) {
        self.escalation_level = self.escalation_level.min(MAX_ESCALATION);
        while self.segment_history.len() > config.history_window.max(1) {
            self.segment_history.pop_front();
        }
        if self.last_segment.is_none() {
            self.last_segment = self.last_history_entry();
        }
    }
}

fn lenient_history<'de, D>(deserializer: D) -> Result<VecDeque<SegmentType>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|value| serde_json::from_value(value).ok())
        .collect())
}

fn clamped_escalation<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = i64::deserialize(deserializer)?;
    Ok(raw.clamp(0, MAX_ESCALATION as i64) as u8)
}

fn non_negative<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = i64::deserialize(deserializer)?;
    Ok(raw.clamp(0, u32::MAX as i64) as u32)
}

/// JSON file holding the state between cycles and across restarts.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted state. A missing or unreadable file yields warm
    /// defaults; the broadcast starts either way.
    pub fn load_or_warm(&self, now: DateTime<Utc>, config: &DirectorConfig) -> DirectorState {
        match self.load(config) {
            Ok(Some(state)) => state,
            Ok(None) => {
                debug!(path = %self.path.display(), "no persisted director state, starting warm");
                DirectorState::warm(now, config)
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "discarding unreadable director state");
                DirectorState::warm(now, config)
            }
        }
    }

    pub fn load(&self, config: &DirectorConfig) -> Result<Option<DirectorState>, DeskError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)
            .map_err(|e| DeskError::State(format!("Failed to read state: {}", e)))?;
        let mut state: DirectorState = serde_json::from_str(&content)
            .map_err(|e| DeskError::State(format!("Failed to parse state: {}", e)))?;
        state.sanitize(config);
        Ok(Some(state))
    }

    /// Write through a temporary file and rename, so a crash mid-write never
    /// leaves a truncated state behind.
    pub fn save(&self, state: &DirectorState) -> Result<(), DeskError> {
        let content = serde_json::to_string_pretty(state)
            .map_err(|e| DeskError::State(format!("Failed to encode state: {}", e)))?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, content)
            .map_err(|e| DeskError::State(format!("Failed to write state: {}", e)))?;
        fs::rename(&tmp, &self.path)
            .map_err(|e| DeskError::State(format!("Failed to replace state: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DirectorConfig {
        DirectorConfig::default()
    }

    #[test]
    fn test_warm_state_is_in_the_recent_past() {
        let now = Utc::now();
        let state = DirectorState::warm(now, &config());
        assert!(state.last_reset_time < now);
        assert!((now - state.last_reset_time).num_seconds() < 300);
        assert_eq!(state.reset_suppression_cycles, 0);
        assert!(state.segment_history.is_empty());
    }

    #[test]
    fn test_history_is_bounded() {
        let mut state = DirectorState::warm(Utc::now(), &config());
        for _ in 0..5 {
            state.record_segment(SegmentType::News, 3);
        }
        state.record_segment(SegmentType::Banter, 3);
        assert_eq!(state.segment_history.len(), 3);
        assert_eq!(state.last_segment, Some(SegmentType::Banter));
        assert_eq!(state.last_history_entry(), Some(SegmentType::Banter));
    }

    #[test]
    fn test_mark_reset_is_monotonic() {
        let now = Utc::now();
        let mut state = DirectorState::warm(now, &config());
        state.mark_reset(now);
        state.mark_reset(now - Duration::seconds(600));
        assert_eq!(state.last_reset_time, now);
    }

    #[test]
    fn test_cast_usage_expires_outside_window() {
        let now = Utc::now();
        let mut state = DirectorState::warm(now, &config());
        state.record_cast("reef", now, 1800);
        state.record_cast("reef", now, 1800);
        assert_eq!(state.recent_usage("reef", now, 1800), 2);
        let later = now + Duration::seconds(1801);
        assert_eq!(state.recent_usage("reef", later, 1800), 0);
        state.record_cast("reef", later, 1800);
        assert_eq!(state.recent_usage("reef", later, 1800), 1);
    }

    #[test]
    fn test_corrupt_counters_are_clamped_on_load() {
        let now = Utc::now();
        let mut value = serde_json::to_value(DirectorState::warm(now, &config())).unwrap();
        value["reset_suppression_cycles"] = serde_json::json!(-4);
        value["escalation_level"] = serde_json::json!(9);
        value["segment_history"] = serde_json::json!(["news", "intro_rundown", "banter"]);
        let mut state: DirectorState = serde_json::from_value(value).unwrap();
        state.sanitize(&config());
        assert_eq!(state.reset_suppression_cycles, 0);
        assert_eq!(state.escalation_level, 3);
        assert_eq!(
            state.segment_history,
            VecDeque::from(vec![SegmentType::News, SegmentType::Banter])
        );
    }

    #[test]
    fn test_store_round_trip_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path().join("director_state.json"));
        assert!(store.load(&config()).unwrap().is_none());

        let now = Utc::now();
        let mut state = DirectorState::warm(now, &config());
        state.record_segment(SegmentType::ChipReset, 20);
        state.reset_suppression_cycles = 2;
        store.save(&state).unwrap();

        let loaded = store.load_or_warm(now, &config());
        assert_eq!(loaded.last_segment, Some(SegmentType::ChipReset));
        assert_eq!(loaded.reset_suppression_cycles, 2);
        assert!(!dir.path().join("director_state.json.tmp").exists());
    }

    #[test]
    fn test_unreadable_store_starts_warm() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("director_state.json");
        fs::write(&path, "{ not json").unwrap();
        let store = StateStore::new(&path);
        assert!(store.load(&config()).is_err());
        let state = store.load_or_warm(Utc::now(), &config());
        assert!(state.segment_history.is_empty());
    }
}
