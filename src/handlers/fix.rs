//! Fix handler: run first, then ask for a fix only when something went wrong.

use anyhow::Result;
use owo_colors::OwoColorize;

use code_debugger::{
    assist, config::Config, execution::ExecutionRequest, llm::LanguageModel,
    printer::ResultPrinter,
};

use super::show_markdown;

pub async fn run(
    cfg: &Config,
    model: &dyn LanguageModel,
    request: &ExecutionRequest,
    markdown: bool,
) -> Result<()> {
    let result = super::run::execute(cfg, request).await;
    ResultPrinter::default().print(&result);
    if result.succeeded() {
        println!("{}", "No errors to fix.".green());
        return Ok(());
    }

    let fix = assist::suggest_fix(
        model,
        &request.source,
        &result.stderr,
        request.language,
        result.diagnostic.as_ref(),
    )
    .await?;
    show_markdown(&fix.to_markdown(), markdown);
    Ok(())
}
