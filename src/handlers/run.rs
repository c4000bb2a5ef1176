//! Run handler: execute a file and print the result.

use anyhow::Result;

use code_debugger::{
    config::Config,
    execution::{ExecutionRequest, ExecutionResult, Executor},
    printer::ResultPrinter,
};

pub async fn execute(cfg: &Config, request: &ExecutionRequest) -> ExecutionResult {
    Executor::from_config(cfg).execute(request).await
}

pub async fn run(cfg: &Config, request: &ExecutionRequest, json: bool) -> Result<ExecutionResult> {
    let result = execute(cfg, request).await;
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        ResultPrinter::default().print(&result);
    }
    Ok(result)
}
