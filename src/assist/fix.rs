use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::{ask_json, Reply};
use crate::{
    diagnostics::DiagnosticRecord, execution::Language, llm::LanguageModel, role::AssistRole,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FixSuggestion {
    pub diagnosis: String,
    pub fixed_code: String,
    pub changes: Vec<CodeChange>,
    pub prevention: String,
    pub learning_point: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeChange {
    pub line: Option<u32>,
    pub before: String,
    pub after: String,
    pub reason: String,
}

impl FixSuggestion {
    pub fn to_markdown(&self) -> String {
        let mut md = format!("## Diagnosis\n\n{}\n\n", self.diagnosis);
        for c in &self.changes {
            let at = c.line.map(|l| format!("line {l}")).unwrap_or_else(|| "change".into());
            md.push_str(&format!(
                "- **{at}**: `{}` → `{}`\n  {}\n",
                c.before, c.after, c.reason
            ));
        }
        if !self.fixed_code.is_empty() {
            md.push_str(&format!("\n## Fixed code\n\n```\n{}\n```\n", self.fixed_code));
        }
        if !self.prevention.is_empty() {
            md.push_str(&format!("\n## Prevention\n\n{}\n", self.prevention));
        }
        if !self.learning_point.is_empty() {
            md.push_str(&format!("\n## Learning point\n\n{}\n", self.learning_point));
        }
        md
    }
}

fn prompt(code: &str, error: &str, language: Language, diagnostic: Option<&DiagnosticRecord>) -> String {
    let kind = diagnostic
        .map(|d| d.kind.as_str())
        .filter(|k| !k.is_empty())
        .unwrap_or("Unknown");
    let line = diagnostic
        .and_then(|d| d.line)
        .map(|l| l.to_string())
        .unwrap_or_else(|| "Unknown".into());
    format!(
        r#"A user has encountered an error in this {language} program.

Code:
```{language}
{code}
```

Error Details:
- Type: {kind}
- Message: {error}
- Line: {line}

Provide your response in this exact JSON format:
{{
  "diagnosis": "Clear explanation of what went wrong and why",
  "fixedCode": "The complete corrected code",
  "changes": [
    {{
      "line": 1,
      "before": "old code",
      "after": "new code",
      "reason": "why this change fixes the issue"
    }}
  ],
  "prevention": "How to avoid this error in the future",
  "learningPoint": "Key concept the user should understand"
}}

Be specific and educational. Show exactly what needs to change."#
    )
}

pub async fn suggest_fix(
    model: &dyn LanguageModel,
    code: &str,
    error: &str,
    language: Language,
    diagnostic: Option<&DiagnosticRecord>,
) -> Result<FixSuggestion> {
    let reply = ask_json(model, AssistRole::Debugger, &prompt(code, error, language, diagnostic)).await?;
    Ok(match reply {
        Reply::Parsed(fix) => fix,
        Reply::Raw(text) => FixSuggestion {
            diagnosis: text,
            fixed_code: code.to_string(),
            ..Default::default()
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assist::testing::ScriptedModel;

    #[tokio::test]
    async fn prompt_carries_diagnostic() -> Result<()> {
        let model = ScriptedModel::new(
            r#"{"diagnosis":"typo","fixedCode":"print(total)","changes":[{"line":1,"before":"totl","after":"total","reason":"spelling"}]}"#,
        );
        let diag = DiagnosticRecord { line: Some(1), kind: "Name Error".into(), ..Default::default() };
        let fix = suggest_fix(&model, "print(totl)", "NameError", Language::Python, Some(&diag)).await?;
        assert_eq!(fix.fixed_code, "print(total)");
        assert_eq!(fix.changes[0].line, Some(1));

        let prompt = model.last_prompt().unwrap();
        assert!(prompt.contains("- Type: Name Error"));
        assert!(prompt.contains("- Line: 1"));
        assert_eq!(model.last_options().unwrap().temperature, 0.5);
        Ok(())
    }

    #[tokio::test]
    async fn fallback_keeps_original_code() -> Result<()> {
        let model = ScriptedModel::new("You misspelled a variable.");
        let fix = suggest_fix(&model, "print(totl)", "NameError", Language::Python, None).await?;
        assert_eq!(fix.diagnosis, "You misspelled a variable.");
        assert_eq!(fix.fixed_code, "print(totl)");
        assert!(model.last_prompt().unwrap().contains("- Type: Unknown"));
        Ok(())
    }
}
