//! CLI handlers: one per mode.

use anyhow::Result;

use code_debugger::{
    cache::{CachedModel, RequestCache},
    config::Config,
    llm::{LanguageModel, LlmClient},
    printer::MarkdownPrinter,
};

pub mod complete;
pub mod explain;
pub mod fix;
pub mod project;
pub mod review;
pub mod run;

/// The oracle as configured: `--model` overrides, cached unless disabled.
pub fn oracle(cfg: &Config, model: Option<&str>, caching: bool) -> Result<Box<dyn LanguageModel>> {
    let mut client = LlmClient::from_config(cfg)?;
    if let Some(m) = model {
        client = client.with_model(m);
    }
    if caching {
        Ok(Box::new(CachedModel::new(client, RequestCache::from_config(cfg))))
    } else {
        Ok(Box::new(client))
    }
}

pub fn show_markdown(text: &str, markdown: bool) {
    if markdown {
        MarkdownPrinter::default().print(text);
    } else {
        println!("{}", text);
    }
}
