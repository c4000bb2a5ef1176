//! Assist roles: system prompt and sampling defaults per feature.

use crate::llm::GenerationOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssistRole {
    Tutor,
    Debugger,
    Reviewer,
    Completer,
}

impl AssistRole {
    pub fn system_text(&self) -> &'static str {
        match self {
            AssistRole::Tutor => "You are an expert coding tutor.\nExplain code to beginners in a simple, conversational way.\nWhen asked for JSON, reply with a single JSON object and nothing else.",
            AssistRole::Debugger => "You are an expert debugger.\nExplain exactly what went wrong and show the smallest change that fixes it.\nWhen asked for JSON, reply with a single JSON object and nothing else.",
            AssistRole::Reviewer => "You are a senior developer conducting a code review.\nBe constructive and educational; focus on teaching better coding habits.\nWhen asked for JSON, reply with a single JSON object and nothing else.",
            AssistRole::Completer => "You are a code completion engine.\nReply with the completion text only: no prose, no Markdown.",
        }
    }

    pub fn options(&self) -> GenerationOptions {
        match self {
            AssistRole::Tutor => GenerationOptions { temperature: 0.7, max_tokens: 4096, top_p: None },
            AssistRole::Debugger => GenerationOptions { temperature: 0.5, max_tokens: 3072, top_p: None },
            AssistRole::Reviewer => GenerationOptions { temperature: 0.6, max_tokens: 4096, top_p: None },
            AssistRole::Completer => GenerationOptions { temperature: 0.2, max_tokens: 30, top_p: Some(0.8) },
        }
    }
}
