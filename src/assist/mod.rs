//! AI-assisted explanations, fixes, reviews and completions.
//!
//! Every feature asks the oracle for a JSON object; replies that do not carry
//! one degrade to a record built from the raw text.

use anyhow::Result;
use serde::de::DeserializeOwned;

use crate::{
    llm::{extract_json_object, LanguageModel},
    role::AssistRole,
};

pub mod complete;
pub mod explain;
pub mod fix;
pub mod review;

pub use complete::{complete, CursorPosition};
pub use explain::{explain, Explanation};
pub use fix::{suggest_fix, FixSuggestion};
pub use review::{review, Review};

/// Reply parsed as `T`, or the raw text when no usable JSON object is present.
pub(crate) enum Reply<T> {
    Parsed(T),
    Raw(String),
}

pub(crate) async fn ask_json<T: DeserializeOwned>(
    model: &dyn LanguageModel,
    role: AssistRole,
    prompt: &str,
) -> Result<Reply<T>> {
    let text = model.generate(role.system_text(), prompt, &role.options()).await?;
    let parsed = extract_json_object(&text).and_then(|v| serde_json::from_value::<T>(v).ok());
    match parsed {
        Some(value) => Ok(Reply::Parsed(value)),
        None => {
            log::warn!("{:?} reply carried no usable JSON; using raw text", role);
            Ok(Reply::Raw(text))
        }
    }
}
