//! Explain handler: step-by-step walkthrough with a dry run.

use anyhow::Result;

use code_debugger::{assist, llm::LanguageModel, Language};

use super::show_markdown;

pub async fn run(
    model: &dyn LanguageModel,
    code: &str,
    language: Language,
    input: Option<&str>,
    markdown: bool,
) -> Result<()> {
    let explanation = assist::explain(model, code, language, input).await?;
    show_markdown(&explanation.to_markdown(), markdown);
    Ok(())
}
