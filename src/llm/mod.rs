//! Reqwest-based LLM client implementing OpenAI-compatible Chat Completions streaming.

use std::{pin::Pin, time::Duration};

use anyhow::{anyhow, Context, Result};
use async_stream::try_stream;
use async_trait::async_trait;
use futures_core::Stream;
use futures_util::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use crate::config::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self { role, content: content.into() }
    }
}

/// Sampling knobs passed with every oracle call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self { temperature: 0.7, max_tokens: 1024, top_p: None }
    }
}

/// Anything that turns a prompt into text.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn generate(&self, system: &str, prompt: &str, opts: &GenerationOptions) -> Result<String>;

    /// Identifies the backing model; part of response cache keys.
    fn model_name(&self) -> &str;
}

/// Chat Completions client for any OpenAI-compatible endpoint.
#[derive(Debug)]
pub struct LlmClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    #[serde(flatten)]
    options: GenerationOptions,
}

impl LlmClient {
    pub fn from_config(cfg: &Config) -> Result<Self> {
        let secs = cfg.get_usize("REQUEST_TIMEOUT").unwrap_or(60) as u64;
        let base = cfg.get("API_BASE_URL").unwrap_or_else(|| "default".into());
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(secs))
            .build()
            .context("building HTTP client")?;

        Ok(Self {
            http,
            endpoint: format!("{}/chat/completions", normalize_base_url(&base)),
            api_key: cfg.get("OPENAI_API_KEY").filter(|k| !k.trim().is_empty()),
            model: cfg.get("DEFAULT_MODEL").unwrap_or_else(|| "gpt-4o-mini".into()),
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));
        if let Some(key) = &self.api_key {
            headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {key}"))?);
        }
        Ok(headers)
    }

    /// Streams reply fragments for `messages` until the server sends `[DONE]`.
    pub fn chat_stream(
        &self,
        messages: Vec<ChatMessage>,
        options: GenerationOptions,
    ) -> Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>> {
        let http = self.http.clone();
        let endpoint = self.endpoint.clone();
        let model = self.model.clone();
        let headers = self.headers();

        Box::pin(try_stream! {
            let body = ChatRequest { model: &model, messages: &messages, stream: true, options };
            log::debug!("oracle request to {} (model {})", endpoint, model);
            let resp = http
                .post(&endpoint)
                .headers(headers?)
                .json(&body)
                .send()
                .await
                .context("sending chat request")?;
            let status = resp.status();
            if !status.is_success() {
                Err(anyhow!("oracle returned {}", status))?;
            }

            let mut lines = LineBuffer::default();
            let mut bytes = resp.bytes_stream();
            while let Some(chunk) = bytes.next().await {
                for line in lines.push(&chunk.context("reading chat stream")?) {
                    match parse_sse_line(&line) {
                        Some(StreamEvent::Done) => {
                            yield StreamEvent::Done;
                            return;
                        }
                        Some(ev) => yield ev,
                        None => {}
                    }
                }
            }
        })
    }
}

/// Reassembles newline-terminated lines from arbitrary byte chunks.
#[derive(Default)]
struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);
        let Some(last) = self.pending.iter().rposition(|b| *b == b'\n') else {
            return Vec::new();
        };
        let complete: Vec<u8> = self.pending.drain(..=last).collect();
        String::from_utf8_lossy(&complete)
            .lines()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect()
    }
}

#[async_trait]
impl LanguageModel for LlmClient {
    async fn generate(&self, system: &str, prompt: &str, opts: &GenerationOptions) -> Result<String> {
        let messages = vec![ChatMessage::new(Role::System, system), ChatMessage::new(Role::User, prompt)];
        let mut stream = self.chat_stream(messages, *opts);
        let mut text = String::new();
        while let Some(ev) = stream.next().await {
            match ev? {
                StreamEvent::Content(t) => text.push_str(&t),
                StreamEvent::Done => break,
            }
        }
        Ok(text)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

fn normalize_base_url(base: &str) -> String {
    match base.trim_end_matches('/') {
        "default" => "https://api.openai.com/v1".to_string(),
        b if b.ends_with("/v1") || b.contains("/v1/") => b.to_string(),
        b => format!("{b}/v1"),
    }
}

/// Decodes one `data:` line of the SSE stream; comments and junk yield `None`.
fn parse_sse_line(line: &str) -> Option<StreamEvent> {
    let payload = line.strip_prefix("data:")?.trim();
    if payload == "[DONE]" {
        return Some(StreamEvent::Done);
    }
    let chunk = serde_json::from_str::<Chunk>(payload).ok()?;
    let content: String = chunk
        .choices
        .into_iter()
        .filter_map(|c| c.delta.and_then(|d| d.content))
        .collect();
    (!content.is_empty()).then_some(StreamEvent::Content(content))
}

/// Pulls the outermost `{…}` span out of free-form model output.
pub fn extract_json_object(text: &str) -> Option<serde_json::Value> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}

#[derive(Debug, PartialEq, Eq)]
pub enum StreamEvent {
    Content(String),
    Done,
}

#[derive(Debug, Deserialize)]
struct Chunk {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    delta: Option<Delta>,
}

#[derive(Debug, Deserialize)]
struct Delta {
    content: Option<String>,
}
