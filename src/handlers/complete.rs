//! Complete handler: prints the suggested rest of the line, or nothing.

use anyhow::Result;

use code_debugger::{
    assist::{self, CursorPosition},
    llm::LanguageModel,
    Language,
};

pub async fn run(model: &dyn LanguageModel, code: &str, language: Language, pos: CursorPosition) -> Result<()> {
    if let Some(suggestion) = assist::complete(model, code, language, pos).await? {
        println!("{}", suggestion);
    }
    Ok(())
}
