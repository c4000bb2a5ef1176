//! Review handler: best-practice review seeded with the static analysis.

use anyhow::Result;

use code_debugger::{analyze, assist, llm::LanguageModel, Language};

use super::show_markdown;

pub async fn run(model: &dyn LanguageModel, code: &str, language: Language, markdown: bool) -> Result<()> {
    let analysis = analyze(code, language);
    let review = assist::review(model, code, language, &analysis).await?;
    show_markdown(&review.to_markdown(), markdown);
    Ok(())
}
