//! Dialogue timeline assembly.
//!
//! Expands a [`SegmentDecision`] and its anchors into the ordered list of
//! spoken turns. Entries are only ever appended. The tragedy guard and the
//! register are resolved once, up front, and every later step reads them;
//! nothing is filtered after the fact.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{AssemblyConfig, HijinxConfig};
use crate::daypart::Daypart;
use crate::decision::{CameoKind, Routine, SegmentDecision, SegmentType};
use crate::domain::{Domain, mentions};
use crate::lines::{
    LineRequest, LineWriter, apply_tone_shift, clamp_sentences, fallback_line, sanitize_line,
};
use crate::persona::{Desk, PersonaDirectory};
use crate::random::RandomSource;
use crate::selector::duo_candidates;

/// Terms that flag a story as tragic.
pub const TRAGIC_TERMS: [&str; 7] = [
    "dead", "death", "killed", "shooting", "collapse", "terror", "tragedy",
];

/// Nouns tracked by the crosstalk anti-repetition guard.
pub const TRACKED_NOUNS: [&str; 10] = [
    "liquidity",
    "flow",
    "imbalance",
    "whale",
    "protocol",
    "cluster",
    "yield",
    "volatility",
    "pressure",
    "anomaly",
];

const CONTRADICTION_MARKERS: [&str; 4] = ["but", "however", "not exactly", "disagree"];
const VOLATILITY_MARKERS: [&str; 3] = ["volatility", "liquidation", "whale"];

/// Follow-up keyword routing, first match wins.
const FOLLOWUP_ROUTES: &[(&str, &str)] = &[
    ("volatility", "rex"),
    ("liquidation", "rex"),
    ("retail", "penny"),
    ("users", "penny"),
    ("onchain", "ledger"),
    ("on-chain", "ledger"),
    ("wallet", "ledger"),
    ("regulator", "lawson"),
    ("sec", "lawson"),
    ("macro", "bond"),
    ("inflation", "bond"),
    ("defi", "reef"),
    ("liquidity", "reef"),
    ("yield", "reef"),
    ("meme", "bitsy"),
    ("vibe", "vega"),
    ("funding", "cap"),
    ("ai", "neura"),
];

/// Case-insensitive substring match against the tragic term list.
pub fn is_tragic(text: &str) -> bool {
    let lower = text.to_lowercase();
    TRAGIC_TERMS.iter().any(|term| lower.contains(term))
}

/// Tone adjustment carried by an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToneShift {
    Calm,
    Urgent,
    Hype,
    Serious,
    Breaking,
}

/// On-air role of a speaker within one timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Lead,
    PrimaryAnchor,
    SecondaryAnchor,
    Vibe,
    Meta,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    ShowIdent,
    Greeting,
    StoryIntro,
    Toss,
    Reaction,
    Analysis,
    DuoReact,
    DuoAnalysis,
    DuoTransition,
    DuoClose,
    FollowUp,
    FollowUpAnswer,
    CameoToss,
    Cameo,
    Transition,
    Outro,
    BreakingAlert,
    ResetOpen,
    Rundown,
    ResetClose,
    AdRead,
    Banter,
    ExposeIntro,
}

impl EntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::ShowIdent => "show_ident",
            EntryType::Greeting => "greeting",
            EntryType::StoryIntro => "story_intro",
            EntryType::Toss => "toss",
            EntryType::Reaction => "reaction",
            EntryType::Analysis => "analysis",
            EntryType::DuoReact => "duo_react",
            EntryType::DuoAnalysis => "duo_analysis",
            EntryType::DuoTransition => "duo_transition",
            EntryType::DuoClose => "duo_close",
            EntryType::FollowUp => "follow_up",
            EntryType::FollowUpAnswer => "follow_up_answer",
            EntryType::CameoToss => "cameo_toss",
            EntryType::Cameo => "cameo",
            EntryType::Transition => "transition",
            EntryType::Outro => "outro",
            EntryType::BreakingAlert => "breaking_alert",
            EntryType::ResetOpen => "reset_open",
            EntryType::Rundown => "rundown",
            EntryType::ResetClose => "reset_close",
            EntryType::AdRead => "ad_read",
            EntryType::Banter => "banter",
            EntryType::ExposeIntro => "expose_intro",
        }
    }

    /// Analysis turns are exempt from the register's sentence limit.
    pub fn is_analysis(&self) -> bool {
        matches!(self, EntryType::Analysis | EntryType::DuoAnalysis)
    }

    pub fn is_crosstalk(&self) -> bool {
        matches!(
            self,
            EntryType::DuoReact
                | EntryType::DuoAnalysis
                | EntryType::DuoTransition
                | EntryType::DuoClose
        )
    }

    /// Entries that carry the segment's tone shift.
    fn takes_tone(&self) -> bool {
        matches!(
            self,
            EntryType::StoryIntro | EntryType::Reaction | EntryType::BreakingAlert
        )
    }
}

impl std::fmt::Display for EntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One spoken turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub speaker_id: String,
    pub role: Role,
    pub entry_type: EntryType,
    pub tone_shift: Option<ToneShift>,
    pub text: String,
}

/// Delivery style for the whole timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Register {
    /// Terse: one sentence per non-analysis turn.
    News,
    /// Looser: up to three sentences.
    LateNight,
}

/// Tragic content always forces the news register.
pub fn resolve_register(tragic: bool, daypart: Daypart) -> Register {
    if !tragic && daypart == Daypart::LateNight {
        Register::LateNight
    } else {
        Register::News
    }
}

/// Inputs that decide whether a second crosstalk round airs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentScore {
    pub complexity: f64,
    pub contradiction: f64,
    pub social_heat: f64,
    pub volatility: f64,
}

impl SegmentScore {
    /// Score a news segment from its text and the first crosstalk round.
    pub fn measure(headline: &str, synthesis: &str, crosstalk: &[String], social_heat: f64) -> Self {
        let story_text = format!("{} {}", headline, synthesis);
        let keyword_hits: BTreeSet<&str> = Domain::ALL
            .iter()
            .flat_map(|domain| domain.keywords().iter().copied())
            .filter(|term| mentions(&story_text, term))
            .collect();
        let complexity = (keyword_hits.len() as f64 / 3.0).min(1.0);

        let mut spoken = vec![synthesis];
        spoken.extend(crosstalk.iter().map(String::as_str));
        let contradiction = if spoken
            .iter()
            .any(|line| CONTRADICTION_MARKERS.iter().any(|m| mentions(line, m)))
        {
            1.0
        } else {
            0.0
        };

        spoken.push(headline);
        let volatility = if spoken
            .iter()
            .any(|line| VOLATILITY_MARKERS.iter().any(|m| mentions(line, m)))
        {
            0.6
        } else {
            0.0
        };

        Self {
            complexity,
            contradiction,
            social_heat: social_heat.clamp(0.0, 1.0),
            volatility,
        }
    }

    pub fn total(&self) -> f64 {
        self.complexity + self.contradiction + self.social_heat + self.volatility
    }
}

/// Story context for one assembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentBrief {
    pub headline: String,
    pub synthesis: String,
    pub domain: Domain,
    pub tone_shift: Option<ToneShift>,
    pub daypart: Daypart,
    /// First segment of the broadcast: open with the ident and greeting.
    pub show_intro: bool,
    /// Overrides the configured default social heat.
    pub social_heat: Option<f64>,
}

impl SegmentBrief {
    pub fn new(headline: impl Into<String>, daypart: Daypart) -> Self {
        let headline = headline.into();
        Self {
            domain: Domain::detect(&headline),
            headline,
            synthesis: String::new(),
            tone_shift: None,
            daypart,
            show_intro: false,
            social_heat: None,
        }
    }

    pub fn with_synthesis(mut self, synthesis: impl Into<String>) -> Self {
        self.synthesis = synthesis.into();
        self
    }

    pub fn with_domain(mut self, domain: Domain) -> Self {
        self.domain = domain;
        self
    }

    pub fn with_tone(mut self, tone_shift: Option<ToneShift>) -> Self {
        self.tone_shift = tone_shift;
        self
    }

    pub fn with_intro(mut self, show_intro: bool) -> Self {
        self.show_intro = show_intro;
        self
    }

    pub fn with_social_heat(mut self, social_heat: f64) -> Self {
        self.social_heat = Some(social_heat);
        self
    }
}

/// Ordered script for one segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub segment: SegmentType,
    pub register: Register,
    pub tragic: bool,
    pub score: Option<SegmentScore>,
    pub entries: Vec<TimelineEntry>,
}

impl Timeline {
    /// Distinct speakers in order of first appearance.
    pub fn speakers(&self) -> Vec<&str> {
        let mut speakers: Vec<&str> = Vec::new();
        for entry in &self.entries {
            if !speakers.contains(&entry.speaker_id.as_str()) {
                speakers.push(&entry.speaker_id);
            }
        }
        speakers
    }

    pub fn has_intro(&self) -> bool {
        self.entries
            .iter()
            .any(|e| e.entry_type == EntryType::Greeting)
    }
}

/// Builds timelines against a fixed cast and configuration.
pub struct TimelineAssembler<'a> {
    directory: &'a PersonaDirectory,
    assembly: &'a AssemblyConfig,
    hijinx: &'a HijinxConfig,
}

impl<'a> TimelineAssembler<'a> {
    pub fn new(
        directory: &'a PersonaDirectory,
        assembly: &'a AssemblyConfig,
        hijinx: &'a HijinxConfig,
    ) -> Self {
        Self {
            directory,
            assembly,
            hijinx,
        }
    }

    /// Expand `decision` into a timeline. `anchors` is the selector's output:
    /// primary first, then the optional duo partner.
    pub fn assemble(
        &self,
        decision: &SegmentDecision,
        anchors: &[String],
        brief: &SegmentBrief,
        writer: &mut dyn LineWriter,
        rng: &mut dyn RandomSource,
    ) -> Timeline {
        let tragic = is_tragic(&brief.headline) || is_tragic(&brief.synthesis);
        let register = resolve_register(tragic, brief.daypart);
        let tone = match brief.tone_shift {
            Some(ToneShift::Hype) if tragic => Some(ToneShift::Serious),
            other => other,
        };

        let lead = self.assembly.lead_anchor.clone();
        let primary = anchors
            .first()
            .filter(|id| self.directory.contains(id))
            .cloned()
            .unwrap_or_else(|| lead.clone());
        let duo = anchors
            .get(1)
            .filter(|id| **id != primary && self.directory.contains(id))
            .filter(|id| !(tragic && self.is_comedic(id)))
            .cloned();

        let mut assembly = Assembly {
            directory: self.directory,
            brief,
            lead,
            primary,
            register,
            tragic,
            tone,
            sentence_limit: match register {
                Register::News => self.assembly.news_sentence_limit,
                Register::LateNight => self.assembly.late_night_sentence_limit,
            },
            writer,
            rng,
            entries: Vec::new(),
            used_nouns: BTreeSet::new(),
        };

        let mut score = None;
        match decision {
            SegmentDecision::Routine {
                routine: Routine::News,
            } => score = self.news(&mut assembly, duo.as_deref()),
            SegmentDecision::Breaking { .. } => self.breaking(&mut assembly),
            SegmentDecision::Reset { stories } => self.reset(&mut assembly, stories),
            SegmentDecision::Ad => {
                let lead = assembly.lead.clone();
                assembly.speak(&lead, EntryType::AdRead, None);
            }
            SegmentDecision::Cameo { kind, line } => self.cameo(&mut assembly, *kind, line),
            SegmentDecision::Routine {
                routine: Routine::Banter,
            } => self.banter(&mut assembly, duo.as_deref()),
            SegmentDecision::Routine {
                routine: Routine::Expose,
            } => self.expose(&mut assembly),
        }

        if !matches!(decision, SegmentDecision::Cameo { .. }) {
            let lead = assembly.lead.clone();
            assembly.speak(&lead, EntryType::Outro, None);
        }

        Timeline {
            segment: decision.segment_type(),
            register,
            tragic,
            score,
            entries: assembly.entries,
        }
    }

    fn is_comedic(&self, id: &str) -> bool {
        self.directory.get(id).is_some_and(|p| p.is_comedic())
    }

    fn news(&self, a: &mut Assembly<'_, '_>, duo: Option<&str>) -> Option<SegmentScore> {
        let lead = a.lead.clone();
        let primary = a.primary.clone();
        let vibe = self.assembly.vibe_anchor.as_str();

        if a.brief.show_intro {
            if !a.tragic && self.directory.contains(vibe) {
                a.speak(vibe, EntryType::ShowIdent, None);
            }
            a.speak(&lead, EntryType::Greeting, None);
        }

        a.speak(&lead, EntryType::StoryIntro, None);
        a.speak(&lead, EntryType::Toss, Some(&primary));
        a.speak(&primary, EntryType::Reaction, Some(&lead));
        a.speak(&primary, EntryType::Analysis, Some(&lead));

        let round_one = duo.map(|duo| a.crosstalk(&primary, duo));

        // Follow-up reads the last two crosstalk lines, or the primary's when solo.
        let source: Vec<String> = match &round_one {
            Some(lines) => lines.iter().map(|(_, text)| text.clone()).collect(),
            None => a
                .entries
                .iter()
                .filter(|e| e.speaker_id == primary)
                .map(|e| e.text.clone())
                .collect(),
        };
        let source = &source[source.len().saturating_sub(2)..];
        let (topic, next) = self.route_followup(source, &primary, a.tragic);
        a.speak_about(&lead, EntryType::FollowUp, Some(&next), topic);
        a.speak_about(&next, EntryType::FollowUpAnswer, Some(&lead), topic);

        let score = round_one.map(|lines| {
            let texts: Vec<String> = lines.into_iter().map(|(_, text)| text).collect();
            let heat = a
                .brief
                .social_heat
                .unwrap_or(self.assembly.default_social_heat);
            SegmentScore::measure(&a.brief.headline, &a.brief.synthesis, &texts, heat)
        });

        if let (Some(score), Some(duo)) = (score, duo) {
            if score.total() >= self.assembly.round_two_threshold {
                match self.round_two_partner(a, duo, &next) {
                    Some(partner) => {
                        debug!(score = score.total(), %partner, "second crosstalk round");
                        a.crosstalk(&primary, &partner);
                    }
                    None => debug!(score = score.total(), "no partner left for a second round"),
                }
            }
        }

        if !a.tragic {
            let heat = score.map_or(self.assembly.default_social_heat, |s| s.social_heat);
            let meta = self.assembly.meta_anchor.as_str();
            if self.directory.contains(meta) && a.rng.roll() < heat {
                a.speak(&lead, EntryType::CameoToss, Some(meta));
                a.cameo_line(meta, &self.hijinx.meta_lines);
            }
            if self.directory.contains(vibe)
                && a.rng.roll() < self.hijinx.probability_for(a.brief.daypart)
            {
                a.speak(&lead, EntryType::CameoToss, Some(vibe));
                a.cameo_line(vibe, &self.hijinx.vibe_lines);
            }
        }

        score
    }

    /// Pick the follow-up keyword and who answers it.
    fn route_followup(
        &self,
        lines: &[String],
        primary: &str,
        tragic: bool,
    ) -> (Option<&'static str>, String) {
        let route = FOLLOWUP_ROUTES
            .iter()
            .find(|(keyword, _)| lines.iter().any(|line| mentions(line, keyword)));
        let Some((keyword, anchor)) = route else {
            return (None, primary.to_string());
        };

        let mut next = *anchor;
        if tragic && self.is_comedic(next) {
            let stable = self
                .assembly
                .stable_pool
                .iter()
                .find(|id| self.directory.contains(id) && !self.is_comedic(id));
            next = stable.map_or(primary, String::as_str);
            debug!(routed = %anchor, %next, "follow-up redirected to a stable anchor");
        }
        if !self.directory.contains(next) {
            debug!(routed = %next, "follow-up anchor not in directory, using primary");
            next = primary;
        }
        (Some(*keyword), next.to_string())
    }

    fn round_two_partner(&self, a: &Assembly<'_, '_>, duo: &str, followup: &str) -> Option<String> {
        let mut candidates: Vec<&str> = duo_candidates(a.brief.domain).to_vec();
        candidates.push(followup);
        candidates
            .into_iter()
            .find(|id| {
                *id != a.primary
                    && *id != duo
                    && self
                        .directory
                        .get(id)
                        .is_some_and(|p| p.desk == Desk::Panel && !(a.tragic && p.is_comedic()))
            })
            .map(str::to_string)
    }

    fn breaking(&self, a: &mut Assembly<'_, '_>) {
        let lead = a.lead.clone();
        let primary = a.primary.clone();
        a.speak_toned(&lead, EntryType::BreakingAlert, Some(ToneShift::Breaking));
        a.speak(&lead, EntryType::Toss, Some(&primary));
        a.speak(&primary, EntryType::Reaction, Some(&lead));
        a.speak(&primary, EntryType::Analysis, Some(&lead));
    }

    fn reset(&self, a: &mut Assembly<'_, '_>, stories: &[crate::story::Story]) {
        let lead = a.lead.clone();
        a.speak(&lead, EntryType::ResetOpen, None);
        for story in stories.iter().take(self.assembly.max_rundown) {
            a.speak_headline(&lead, EntryType::Rundown, &story.headline);
        }
        a.speak(&lead, EntryType::ResetClose, None);
    }

    fn cameo(&self, a: &mut Assembly<'_, '_>, kind: CameoKind, line: &str) {
        let lead = a.lead.clone();
        let speaker = match kind {
            CameoKind::Vibe => self.assembly.vibe_anchor.as_str(),
            CameoKind::Meta => self.assembly.meta_anchor.as_str(),
        };
        if a.tragic {
            debug!(cameo = ?kind, "cameo dropped for tragic content");
        } else if self.directory.contains(speaker) {
            a.push_cameo(speaker, line);
        }
        a.speak(&lead, EntryType::Transition, None);
    }

    fn banter(&self, a: &mut Assembly<'_, '_>, duo: Option<&str>) {
        let lead = a.lead.clone();
        let primary = a.primary.clone();
        a.speak(&lead, EntryType::Banter, Some(&primary));
        a.speak(&primary, EntryType::Banter, Some(&lead));
        if let Some(duo) = duo {
            a.speak(duo, EntryType::Banter, Some(&primary));
        }
    }

    fn expose(&self, a: &mut Assembly<'_, '_>) {
        let lead = a.lead.clone();
        let primary = a.primary.clone();
        a.speak(&lead, EntryType::ExposeIntro, Some(&primary));
        a.speak(&primary, EntryType::Analysis, Some(&lead));
    }
}

/// Working state of one assembly.
struct Assembly<'s, 'w> {
    directory: &'s PersonaDirectory,
    brief: &'s SegmentBrief,
    lead: String,
    primary: String,
    register: Register,
    tragic: bool,
    tone: Option<ToneShift>,
    sentence_limit: usize,
    writer: &'w mut dyn LineWriter,
    rng: &'w mut dyn RandomSource,
    entries: Vec<TimelineEntry>,
    used_nouns: BTreeSet<&'static str>,
}

impl Assembly<'_, '_> {
    fn role_of(&self, speaker: &str) -> Role {
        if speaker == self.lead {
            return Role::Lead;
        }
        match self.directory.get(speaker).map(|p| p.desk) {
            Some(Desk::Vibe) => Role::Vibe,
            Some(Desk::Meta) => Role::Meta,
            Some(Desk::Lead) => Role::Lead,
            _ if speaker == self.primary => Role::PrimaryAnchor,
            _ => Role::SecondaryAnchor,
        }
    }

    fn draft(
        &mut self,
        speaker: &str,
        entry_type: EntryType,
        partner: Option<&str>,
        topic: Option<&str>,
        headline: &str,
        tone: Option<ToneShift>,
    ) -> TimelineEntry {
        let role = self.role_of(speaker);
        let speaker_name = self.directory.name_of(speaker);
        let partner_name = partner.map(|id| self.directory.name_of(id));
        let previous = self.entries.last().map(|e| e.text.clone());
        let brief = self.brief;
        let request = LineRequest {
            entry_type,
            role,
            speaker: &speaker_name,
            partner: partner_name.as_deref(),
            headline,
            synthesis: &brief.synthesis,
            domain: brief.domain,
            daypart: brief.daypart,
            register: self.register,
            previous: previous.as_deref(),
            topic,
        };

        let text = match self.writer.draft(&request, &mut *self.rng) {
            Ok(text) => sanitize_line(&text),
            Err(e) => {
                debug!(entry = %entry_type, error = %e, "draft failed, using fallback line");
                String::new()
            }
        };
        let text = if text.is_empty() {
            fallback_line(&request)
        } else {
            text
        };
        let text = if entry_type.is_analysis() {
            text
        } else {
            clamp_sentences(&text, self.sentence_limit)
        };
        let tone = tone.filter(|_| entry_type.takes_tone());

        TimelineEntry {
            speaker_id: speaker.to_string(),
            role,
            entry_type,
            tone_shift: tone,
            text: apply_tone_shift(&text, tone),
        }
    }

    fn speak(&mut self, speaker: &str, entry_type: EntryType, partner: Option<&str>) {
        self.speak_about(speaker, entry_type, partner, None);
    }

    fn speak_about(
        &mut self,
        speaker: &str,
        entry_type: EntryType,
        partner: Option<&str>,
        topic: Option<&str>,
    ) {
        let brief = self.brief;
        let entry = self.draft(speaker, entry_type, partner, topic, &brief.headline, self.tone);
        self.entries.push(entry);
    }

    fn speak_toned(&mut self, speaker: &str, entry_type: EntryType, tone: Option<ToneShift>) {
        let brief = self.brief;
        let entry = self.draft(speaker, entry_type, None, None, &brief.headline, tone);
        self.entries.push(entry);
    }

    fn speak_headline(&mut self, speaker: &str, entry_type: EntryType, headline: &str) {
        let entry = self.draft(speaker, entry_type, None, None, headline, None);
        self.entries.push(entry);
    }

    /// Seven-step call and response. Returns the lines that survived the
    /// anti-repetition guard, with their speakers.
    fn crosstalk(&mut self, primary: &str, partner: &str) -> Vec<(String, String)> {
        let steps = [
            (primary, partner, EntryType::DuoReact),
            (partner, primary, EntryType::DuoReact),
            (primary, partner, EntryType::DuoAnalysis),
            (partner, primary, EntryType::DuoAnalysis),
            (primary, partner, EntryType::DuoTransition),
            (partner, primary, EntryType::DuoTransition),
            (primary, partner, EntryType::DuoClose),
        ];

        let mut spoken = Vec::new();
        for (speaker, addressee, entry_type) in steps {
            let brief = self.brief;
            let entry = self.draft(speaker, entry_type, Some(addressee), None, &brief.headline, None);
            let lower = entry.text.to_lowercase();
            let nouns: Vec<&'static str> = TRACKED_NOUNS
                .iter()
                .copied()
                .filter(|noun| lower.contains(noun))
                .collect();
            if let Some(repeat) = nouns.iter().find(|noun| self.used_nouns.contains(*noun)) {
                debug!(%speaker, entry = %entry_type, noun = %repeat, "crosstalk line omitted");
                continue;
            }
            self.used_nouns.extend(nouns);
            spoken.push((speaker.to_string(), entry.text.clone()));
            self.entries.push(entry);
        }
        spoken
    }

    /// Cameo text comes from the hijinx pool; an empty pool asks the writer.
    fn cameo_line(&mut self, speaker: &str, pool: &[String]) {
        if pool.is_empty() {
            self.speak(speaker, EntryType::Cameo, None);
            return;
        }
        let line = pool[self.rng.pick(pool.len())].clone();
        self.push_cameo(speaker, &line);
    }

    fn push_cameo(&mut self, speaker: &str, line: &str) {
        let text = clamp_sentences(&sanitize_line(line), self.sentence_limit);
        if text.is_empty() {
            self.speak(speaker, EntryType::Cameo, None);
            return;
        }
        self.entries.push(TimelineEntry {
            speaker_id: speaker.to_string(),
            role: self.role_of(speaker),
            entry_type: EntryType::Cameo,
            tone_shift: None,
            text,
        });
    }
}
