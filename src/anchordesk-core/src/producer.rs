//! Line producer boundary.
//!
//! A producer turns one timeline entry into the text that goes to air. It is
//! called once per entry, in order, with a timeout. Any failure airs the
//! entry's draft text instead; a broadcast never waits on a producer.

use std::time::Duration;

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestUserMessage, CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::{AssemblyConfig, ProducerConfig};
use crate::error::DeskError;
use crate::lines::{clamp_sentences, sanitize_line};
use crate::persona::PersonaDirectory;
use crate::timeline::{EntryType, Register, Role, Timeline, TimelineEntry};

/// What a producer sees for one entry.
#[derive(Debug, Clone)]
pub struct RenderRequest<'a> {
    pub entry: &'a TimelineEntry,
    pub speaker_name: &'a str,
    pub headline: &'a str,
    pub register: Register,
    pub sentence_limit: usize,
}

#[async_trait]
pub trait LineProducer: Send + Sync {
    async fn render(&self, request: &RenderRequest<'_>) -> Result<String, DeskError>;
}

/// Airs the draft text unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct DraftProducer;

#[async_trait]
impl LineProducer for DraftProducer {
    async fn render(&self, request: &RenderRequest<'_>) -> Result<String, DeskError> {
        Ok(request.entry.text.clone())
    }
}

/// Rewrites drafts in the speaker's voice through an OpenAI-compatible API.
pub struct OpenAiProducer {
    client: Client<OpenAIConfig>,
    model: String,
    max_tokens: u32,
}

impl OpenAiProducer {
    pub fn new(api_key: &str, config: &ProducerConfig) -> Result<Self, DeskError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| DeskError::Producer(format!("Failed to create HTTP client: {}", e)))?;

        let openai = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(&config.api_base);

        Ok(Self {
            client: Client::with_config(openai).with_http_client(http_client),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }
}

#[async_trait]
impl LineProducer for OpenAiProducer {
    async fn render(&self, request: &RenderRequest<'_>) -> Result<String, DeskError> {
        let system_prompt = voice_prompt(request);
        let user_prompt = format!(
            "Story: {}\nDraft line: {}",
            request.headline, request.entry.text
        );

        let messages = vec![
            ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
                content: system_prompt.into(),
                name: None,
            }),
            ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                content: user_prompt.into(),
                name: None,
            }),
        ];

        let completion = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .max_completion_tokens(self.max_tokens)
            .messages(messages)
            .build()?;

        let response = self.client.chat().create(completion).await?;
        response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| DeskError::Producer("Empty completion".to_string()))
    }
}

fn voice_prompt(request: &RenderRequest<'_>) -> String {
    let desk = match request.entry.role {
        Role::Lead => "the lead anchor",
        Role::PrimaryAnchor => "the anchor carrying this story",
        Role::SecondaryAnchor => "a panel analyst",
        Role::Vibe => "the studio's vibe host",
        Role::Meta => "the self-aware booth commentator",
    };
    let register = match request.register {
        Register::News => "Keep it crisp and factual.",
        Register::LateNight => "It's late night, so you can be looser and wittier.",
    };
    let length = if request.entry.entry_type.is_analysis() {
        "Keep it short.".to_string()
    } else {
        format!("Use at most {} sentence(s).", request.sentence_limit)
    };
    format!(
        "You are {}, {} on Token News, a live crypto news broadcast. \
         Rewrite the draft line in your own voice without changing its meaning. \
         {} {} Reply with the spoken line only, no stage directions.",
        request.speaker_name, desk, register, length
    )
}

/// One entry as it goes to air.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedLine {
    pub speaker_id: String,
    pub speaker_name: String,
    pub role: Role,
    pub entry_type: EntryType,
    pub text: String,
    /// The producer failed and the draft aired instead.
    pub fallback: bool,
}

/// Render every entry in order. Each call gets `timeout`; a failure, timeout
/// or empty result airs the draft.
pub async fn render_timeline(
    producer: &dyn LineProducer,
    timeline: &Timeline,
    directory: &PersonaDirectory,
    headline: &str,
    assembly: &AssemblyConfig,
    timeout: Duration,
) -> Vec<RenderedLine> {
    let sentence_limit = match timeline.register {
        Register::News => assembly.news_sentence_limit,
        Register::LateNight => assembly.late_night_sentence_limit,
    };

    let mut rendered = Vec::with_capacity(timeline.entries.len());
    for entry in &timeline.entries {
        let speaker_name = directory.name_of(&entry.speaker_id);
        let request = RenderRequest {
            entry,
            speaker_name: &speaker_name,
            headline,
            register: timeline.register,
            sentence_limit,
        };

        let outcome = match tokio::time::timeout(timeout, producer.render(&request)).await {
            Ok(result) => result,
            Err(_) => Err(DeskError::Timeout {
                secs: timeout.as_secs(),
            }),
        };

        let produced = outcome.map(|text| {
            let text = sanitize_line(&text);
            if entry.entry_type.is_analysis() {
                text
            } else {
                clamp_sentences(&text, sentence_limit)
            }
        });

        let (text, fallback) = match produced {
            Ok(text) if !text.is_empty() => (text, false),
            Ok(_) => {
                warn!(speaker = %entry.speaker_id, entry = %entry.entry_type, "producer returned nothing, airing draft");
                (entry.text.clone(), true)
            }
            Err(e) => {
                warn!(speaker = %entry.speaker_id, entry = %entry.entry_type, error = %e, "producer failed, airing draft");
                (entry.text.clone(), true)
            }
        };

        rendered.push(RenderedLine {
            speaker_id: entry.speaker_id.clone(),
            speaker_name,
            role: entry.role,
            entry_type: entry.entry_type,
            text,
            fallback,
        });
    }
    rendered
}
