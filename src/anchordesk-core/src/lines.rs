//! Draft line writing.
//!
//! The assembler needs text while it builds a timeline: the anti-repetition
//! guard and the follow-up routing both read what was said. Drafts come from a
//! [`LineWriter`]; the built-in [`TemplateWriter`] draws from fixed pools
//! through the injected random source. A writer failure falls back to
//! [`fallback_line`], which is fixed per entry type.

use crate::daypart::Daypart;
use crate::domain::Domain;
use crate::error::LineError;
use crate::random::RandomSource;
use crate::timeline::{EntryType, Register, Role, ToneShift};

/// Everything a writer may use to draft one line.
#[derive(Debug, Clone)]
pub struct LineRequest<'a> {
    pub entry_type: EntryType,
    pub role: Role,
    /// Display name of the speaker.
    pub speaker: &'a str,
    /// Display name of whoever the line is addressed to.
    pub partner: Option<&'a str>,
    pub headline: &'a str,
    pub synthesis: &'a str,
    pub domain: Domain,
    pub daypart: Daypart,
    pub register: Register,
    /// The line spoken immediately before.
    pub previous: Option<&'a str>,
    /// Keyword a follow-up question is built around.
    pub topic: Option<&'a str>,
}

/// Produces draft text for timeline entries.
pub trait LineWriter {
    fn draft(
        &mut self,
        request: &LineRequest<'_>,
        rng: &mut dyn RandomSource,
    ) -> Result<String, LineError>;
}

/// Writer backed by fixed template pools.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateWriter;

impl LineWriter for TemplateWriter {
    fn draft(
        &mut self,
        request: &LineRequest<'_>,
        rng: &mut dyn RandomSource,
    ) -> Result<String, LineError> {
        let pool = templates_for(request.entry_type, request.role, request.register);
        if pool.is_empty() {
            return Err(LineError::NoTemplate {
                entry: request.entry_type.as_str(),
            });
        }
        let template = pool[rng.pick(pool.len())];
        Ok(fill(template, request))
    }
}

/// Deterministic line used when the writer cannot produce one.
pub fn fallback_line(request: &LineRequest<'_>) -> String {
    let template = match request.entry_type {
        EntryType::ShowIdent => "Welcome to Token News.",
        EntryType::Greeting => "{greeting}, and welcome to Token News.",
        EntryType::StoryIntro => "Here's the story: {headline}.",
        EntryType::Toss => "{partner}, what's your read?",
        EntryType::Reaction => "That's a big one.",
        EntryType::Analysis => "Let's look at what's actually driving {headline}.",
        EntryType::DuoReact
        | EntryType::DuoAnalysis
        | EntryType::DuoTransition
        | EntryType::DuoClose => "{partner}, I see it a little differently.",
        EntryType::FollowUp => "{partner}, before we wrap, what's the key signal to watch?",
        EntryType::FollowUpAnswer => "Watch the follow-through over the next few sessions.",
        EntryType::CameoToss => "Let's check in with the booth.",
        EntryType::Cameo => "Back to you, Chip.",
        EntryType::Transition => "Alright, let's get back to it. Here's what's next.",
        EntryType::Outro => "We'll keep tracking this one. Stay with us.",
        EntryType::BreakingAlert => "We're interrupting with breaking news: {headline}.",
        EntryType::ResetOpen => "Let's reset and catch everyone up.",
        EntryType::Rundown => "{headline}.",
        EntryType::ResetClose => "That's where things stand. Let's keep moving.",
        EntryType::AdRead => "Token News is brought to you by our partners.",
        EntryType::Banter => "Let's take a breath and talk about the week.",
        EntryType::ExposeIntro => "Tonight we're taking a closer look at {headline}.",
    };
    fill(template, request)
}

/// Prefix a line with the active tone shift.
pub fn apply_tone_shift(text: &str, tone: Option<ToneShift>) -> String {
    match tone {
        Some(ToneShift::Calm) => format!("In a calmer tone, {}", lower_first(text)),
        Some(ToneShift::Urgent) => format!("Urgent update: {}", text),
        Some(ToneShift::Hype) => format!("Big energy on this one: {}", text),
        Some(ToneShift::Serious) => format!("On a serious note, {}", lower_first(text)),
        Some(ToneShift::Breaking) => format!("Breaking now: {}", text),
        None => text.to_string(),
    }
}

fn lower_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn fill(template: &str, request: &LineRequest<'_>) -> String {
    let headline = request.headline.trim().trim_end_matches(['.', '!', '?']);
    template
        .replace("{speaker}", request.speaker)
        .replace("{partner}", request.partner.unwrap_or("team"))
        .replace("{headline}", headline)
        .replace("{synthesis}", request.synthesis.trim())
        .replace("{domain}", request.domain.as_str())
        .replace("{greeting}", request.daypart.greeting())
        .replace("{topic}", request.topic.unwrap_or("the next move"))
}

/// Strip reasoning tags, markup and emphasis from rendered text.
///
/// Removes patterns like <thinking>...</thinking>, <reflection>...</reflection>, etc.
pub fn sanitize_line(line: &str) -> String {
    let tags_to_strip = [
        "thinking",
        "think",
        "reflection",
        "reflect",
        "internal",
        "reasoning",
        "thought",
        "scratchpad",
        "plan",
        "analysis",
    ];

    let mut result = line.to_string();

    for tag in &tags_to_strip {
        let pattern = format!(r"(?is)<{tag}[^>]*>.*?</{tag}>", tag = tag);
        if let Ok(re) = regex::Regex::new(&pattern) {
            result = re.replace_all(&result, "").to_string();
        }
    }

    if let Ok(orphan_re) = regex::Regex::new(r"</?[\w]+[^>]*>") {
        result = orphan_re.replace_all(&result, "").to_string();
    }

    // Stage directions in parentheses or brackets
    if let Ok(direction_re) = regex::Regex::new(r"\([^)]*\)|\[[^\]]*\]") {
        result = direction_re.replace_all(&result, "").to_string();
    }

    result = result.replace('*', "");

    if let Ok(ws_re) = regex::Regex::new(r"\s+") {
        result = ws_re.replace_all(&result, " ").to_string();
    }

    result.trim().to_string()
}

/// Keep at most `limit` sentences.
pub fn clamp_sentences(text: &str, limit: usize) -> String {
    let text = text.trim();
    if limit == 0 {
        return text.to_string();
    }
    let Ok(end_re) = regex::Regex::new(r#"[.!?]+["')]*(\s+|$)"#) else {
        return text.to_string();
    };
    match end_re.find_iter(text).nth(limit - 1) {
        Some(m) => text[..m.end()].trim().to_string(),
        None => text.to_string(),
    }
}

fn templates_for(entry_type: EntryType, role: Role, register: Register) -> &'static [&'static str] {
    let late = register == Register::LateNight;
    match entry_type {
        EntryType::ShowIdent => &["Welcome to Token News.", "This is Token News."],
        EntryType::Greeting => &[
            "{greeting}, I'm Chip Blue and welcome to Token News. Let's get straight into today's top story.",
            "{greeting} and welcome to Token News. A lot to get through, so let's go.",
        ],
        EntryType::StoryIntro => &[
            "Our top story: {headline}.",
            "Here's what's moving right now: {headline}.",
            "Let's start with this one: {headline}.",
        ],
        EntryType::Toss if late => &[
            "{partner}, what's the late-night pulse on this?",
            "{partner}, you've been up watching this. What are you seeing?",
            "{partner}, give us the read before the overnight crowd does.",
        ],
        EntryType::Toss => &[
            "{partner}, what's your read on this?",
            "{partner}, walk us through it.",
            "{partner}, I know you watch this sector closely.",
        ],
        EntryType::Reaction => &[
            "This one caught a lot of people off guard.",
            "Honestly, I expected this sooner.",
            "That's a headline people will be talking about all day.",
            "The market did not see this coming.",
        ],
        EntryType::Analysis => &[
            "The real question is what this does to {domain} over the next week. {synthesis}",
            "If you strip away the noise, this is a {domain} story first. {synthesis}",
            "Look past the headline and the incentives tell you where this goes. {synthesis}",
        ],
        EntryType::DuoReact => &[
            "The liquidity picture is what jumps out at me, {partner}.",
            "Whale wallets were moving before this even hit the wire.",
            "I'm watching the protocol side of this more than the price.",
            "This feels like pressure that's been building for weeks.",
            "My first read is that the {domain} crowd priced this in early.",
        ],
        EntryType::DuoAnalysis => &[
            "If you map the flow, it only points one direction.",
            "The cluster of trades behind this tells the real story.",
            "Yield is the tell here, {partner}, it always is.",
            "But I disagree, the volatility is doing the talking.",
            "However you slice it, the imbalance is real.",
        ],
        EntryType::DuoTransition => &[
            "Which raises the bigger question about what comes next.",
            "And that's where it gets interesting for everyday holders.",
            "That anomaly is the part I'd keep an eye on.",
            "So the next few sessions matter more than today.",
        ],
        EntryType::DuoClose => &[
            "Bottom line, this isn't over yet.",
            "I'll take the other side of that, {partner}, but it's a fair read.",
            "We'll know a lot more by the end of the week.",
        ],
        EntryType::FollowUp => &[
            "{partner}, quick follow-up: where does {topic} go from here?",
            "{partner}, before we move on, how much of this is about {topic}?",
            "{partner}, help me with one thing. What does {topic} tell us?",
        ],
        EntryType::FollowUpAnswer => &[
            "Short version, watch {topic} over the next few sessions.",
            "It's the biggest tell we have right now, and it's not flashing green.",
            "Give it a week and {topic} will answer that for us.",
        ],
        EntryType::CameoToss => &[
            "Let's check in with the booth.",
            "{partner}, I can hear you back there.",
            "Somebody in the booth has thoughts.",
        ],
        // Cameo lines come from the hijinx pools.
        EntryType::Cameo => &[],
        EntryType::Transition => &[
            "Alright, let's get back to it. Here's what's next.",
            "Okay, moving on.",
            "Let's keep it rolling.",
        ],
        EntryType::Outro if late => &[
            "That's the late read. Stick around, the night's young.",
            "We'll keep an eye on it while you sleep. More after this.",
        ],
        EntryType::Outro => &[
            "We'll keep tracking developments on this one.",
            "That's the latest. More ahead on Token News.",
            "Stay with us, there's plenty more coming up.",
        ],
        EntryType::BreakingAlert => &[
            "We're interrupting with breaking news: {headline}.",
            "This just crossed the wire: {headline}.",
        ],
        EntryType::ResetOpen => &[
            "If you're just joining us, here's where things stand.",
            "Let's reset and catch everyone up.",
        ],
        EntryType::Rundown => &["{headline}.", "Also on the board: {headline}."],
        EntryType::ResetClose => &[
            "That's the board. Let's dig back in.",
            "Plenty to get to, so let's keep moving.",
        ],
        EntryType::AdRead => &[
            "Token News is brought to you by our partners. Stick around.",
            "Quick break. We'll be right back with more.",
        ],
        EntryType::Banter if role == Role::Lead => &[
            "Slower news cycle, so let's talk about the week.",
            "Nothing's on fire right now, which means we finally get to chat.",
        ],
        EntryType::Banter => &[
            "Honestly, I'll take a quiet hour after the week we've had.",
            "I've been saying the {domain} crowd needs a nap.",
            "Can I just say the group chat has been unhinged lately?",
        ],
        EntryType::ExposeIntro => &[
            "Tonight we're taking a closer look at {headline}.",
            "Let's slow down and really dig into {headline}.",
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::ScriptedRandom;

    fn request(entry_type: EntryType) -> LineRequest<'static> {
        LineRequest {
            entry_type,
            role: Role::Lead,
            speaker: "Chip",
            partner: Some("Reef"),
            headline: "Solana ETF surge continues.",
            synthesis: "Capital is rotating into the ecosystem.",
            domain: Domain::Markets,
            daypart: Daypart::Morning,
            register: Register::News,
            previous: None,
            topic: Some("liquidity"),
        }
    }

    #[test]
    fn test_template_writer_fills_placeholders() {
        let mut writer = TemplateWriter;
        let mut rng = ScriptedRandom::constant(0.0);
        let line = writer.draft(&request(EntryType::StoryIntro), &mut rng).unwrap();
        assert_eq!(line, "Our top story: Solana ETF surge continues.");
        let line = writer.draft(&request(EntryType::Toss), &mut rng).unwrap();
        assert_eq!(line, "Reef, what's your read on this?");
    }

    #[test]
    fn test_late_night_register_uses_its_own_pool() {
        let mut writer = TemplateWriter;
        let mut rng = ScriptedRandom::constant(0.0);
        let mut req = request(EntryType::Toss);
        req.register = Register::LateNight;
        let line = writer.draft(&req, &mut rng).unwrap();
        assert!(line.contains("late-night"));
    }

    #[test]
    fn test_cameo_lines_have_no_template() {
        let mut writer = TemplateWriter;
        let mut rng = ScriptedRandom::constant(0.0);
        let err = writer.draft(&request(EntryType::Cameo), &mut rng).unwrap_err();
        assert_eq!(err, LineError::NoTemplate { entry: "cameo" });
    }

    #[test]
    fn test_fallback_line_is_deterministic() {
        let req = request(EntryType::FollowUp);
        assert_eq!(fallback_line(&req), fallback_line(&req));
        assert!(fallback_line(&req).starts_with("Reef,"));
        assert_eq!(fallback_line(&request(EntryType::Greeting)), "Good morning, and welcome to Token News.");
    }

    #[test]
    fn test_apply_tone_shift() {
        assert_eq!(apply_tone_shift("Markets slid.", None), "Markets slid.");
        assert_eq!(apply_tone_shift("Markets slid.", Some(ToneShift::Urgent)), "Urgent update: Markets slid.");
        assert_eq!(
            apply_tone_shift("Markets slid.", Some(ToneShift::Serious)),
            "On a serious note, markets slid."
        );
    }

    #[test]
    fn test_sanitize_line_thinking_tags() {
        let input = "<thinking>Let me think about this...</thinking>The answer is 42.";
        assert_eq!(sanitize_line(input), "The answer is 42.");
    }

    #[test]
    fn test_sanitize_line_stage_directions_and_emphasis() {
        let input = "(Leans forward) This is *huge* for [camera two] retail.";
        assert_eq!(sanitize_line(input), "This is huge for retail.");
    }

    #[test]
    fn test_sanitize_line_multiline_tags() {
        let input = "<reasoning>\nMultiple\nlines\n</reasoning>Final answer here.";
        assert_eq!(sanitize_line(input), "Final answer here.");
    }

    #[test]
    fn test_clamp_sentences() {
        let text = "First point. Second point! Third point? Fourth.";
        assert_eq!(clamp_sentences(text, 1), "First point.");
        assert_eq!(clamp_sentences(text, 3), "First point. Second point! Third point?");
        assert_eq!(clamp_sentences("No terminator here", 1), "No terminator here");
        assert_eq!(clamp_sentences(text, 10), text);
    }
}
