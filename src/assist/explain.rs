use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::{ask_json, Reply};
use crate::{execution::Language, llm::LanguageModel, role::AssistRole};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Explanation {
    pub overview: String,
    pub step_by_step: Vec<ExplanationStep>,
    pub dry_run: DryRun,
    pub key_points: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplanationStep {
    pub step: u32,
    pub description: String,
    pub code: String,
    pub variables: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DryRun {
    pub description: String,
    pub steps: Vec<String>,
}

impl Explanation {
    fn from_raw(text: String) -> Self {
        Self {
            overview: text.clone(),
            dry_run: DryRun { description: text, steps: Vec::new() },
            ..Default::default()
        }
    }

    /// Markdown rendering used by the terminal printer.
    pub fn to_markdown(&self) -> String {
        let mut md = format!("## Overview\n\n{}\n\n", self.overview);
        if !self.step_by_step.is_empty() {
            md.push_str("## Step by step\n\n");
            for s in &self.step_by_step {
                md.push_str(&format!("{}. {}\n", s.step, s.description));
                if !s.code.is_empty() {
                    md.push_str(&format!("   `{}`\n", s.code));
                }
                if !s.variables.is_empty() {
                    md.push_str(&format!("   *State:* {}\n", s.variables));
                }
            }
            md.push('\n');
        }
        if !self.dry_run.steps.is_empty() {
            md.push_str(&format!("## Dry run\n\n{}\n\n", self.dry_run.description));
            for s in &self.dry_run.steps {
                md.push_str(&format!("- {s}\n"));
            }
            md.push('\n');
        }
        if !self.key_points.is_empty() {
            md.push_str("## Key points\n\n");
            for p in &self.key_points {
                md.push_str(&format!("- {p}\n"));
            }
        }
        md
    }
}

fn prompt(code: &str, language: Language, input: Option<&str>) -> String {
    let sample = match input.map(str::trim).filter(|s| !s.is_empty()) {
        Some(i) => format!("Sample Input: {i}"),
        None => String::new(),
    };
    format!(
        r#"Explain this {language} code in a simple, beginner-friendly way.

Code:
```{language}
{code}
```

{sample}

Provide your response in this exact JSON format:
{{
  "overview": "Brief overview of what the code does",
  "stepByStep": [
    {{
      "step": 1,
      "description": "What happens in this step",
      "code": "relevant code snippet",
      "variables": "state of variables after this step"
    }}
  ],
  "dryRun": {{
    "description": "Detailed dry run with sample input",
    "steps": ["Step 1: ...", "Step 2: ..."]
  }},
  "keyPoints": ["Important concept 1", "Important concept 2"]
}}

Make it conversational and easy to understand for beginners. Include a complete dry run showing how variables change."#
    )
}

pub async fn explain(
    model: &dyn LanguageModel,
    code: &str,
    language: Language,
    input: Option<&str>,
) -> Result<Explanation> {
    let reply = ask_json(model, AssistRole::Tutor, &prompt(code, language, input)).await?;
    Ok(match reply {
        Reply::Parsed(e) => e,
        Reply::Raw(text) => Explanation::from_raw(text),
    })
}
