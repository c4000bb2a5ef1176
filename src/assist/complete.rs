use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{execution::Language, llm::LanguageModel, role::AssistRole};

const CONTEXT_LINES: usize = 15;
const MIN_LEN: usize = 2;
const MAX_LEN: usize = 80;

static CHATTY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(Here|This|The|You|To|Complete|First|Next)").expect("valid regex")
});

/// 1-based line and column of the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorPosition {
    pub line_number: usize,
    pub column: usize,
}

impl std::str::FromStr for CursorPosition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (line, col) = s.split_once(':').ok_or_else(|| format!("expected LINE:COL, got {s}"))?;
        let line_number = line.trim().parse().map_err(|_| format!("bad line in {s}"))?;
        let column = col.trim().parse().map_err(|_| format!("bad column in {s}"))?;
        Ok(Self { line_number, column })
    }
}

/// Text on the cursor line left of the cursor.
fn before_cursor(lines: &[&str], pos: CursorPosition) -> String {
    let current = pos
        .line_number
        .checked_sub(1)
        .and_then(|i| lines.get(i))
        .copied()
        .unwrap_or("");
    current
        .chars()
        .take(pos.column.saturating_sub(1))
        .collect()
}

/// Suggests the rest of the cursor line, or `None` when there is nothing worth offering.
pub async fn complete(
    model: &dyn LanguageModel,
    code: &str,
    language: Language,
    pos: CursorPosition,
) -> Result<Option<String>> {
    let lines: Vec<&str> = code.split('\n').collect();
    let before = before_cursor(&lines, pos);
    let trimmed = before.trim();
    if trimmed.is_empty() || trimmed.ends_with([':', '{', ';']) {
        return Ok(None);
    }

    let current = pos.line_number.saturating_sub(1).min(lines.len().saturating_sub(1));
    let start = current.saturating_sub(CONTEXT_LINES);
    let context = lines[start..=current].join("\n");

    let prompt = format!(
        r#"Complete ONLY the current line of code.

Language: {language}
Context (last few lines):
{context}

Rules:
1. Return ONLY the completion text (the rest of the current line)
2. NO explanations, NO comments, NO multiple lines
3. NO markdown formatting, NO backticks
4. Keep it SHORT (max 50 characters)
5. Must be valid {language} syntax

Complete this line starting from: "{before}"

Completion:"#
    );

    let role = AssistRole::Completer;
    let text = model.generate(role.system_text(), &prompt, &role.options()).await?;
    Ok(clean_suggestion(&text, trimmed))
}

fn clean_suggestion(text: &str, before: &str) -> Option<String> {
    let text = text.trim();
    let text = text.strip_prefix("```").map_or(text, |rest| {
        // drop the fence's language tag line
        rest.split_once('\n').map_or("", |(_, body)| body)
    });
    let text = text.trim_end().strip_suffix("```").unwrap_or(text);

    let first = text.lines().next().unwrap_or("");
    let first = strip_comment(first, "//");
    let first = strip_comment(first, "#");
    let mut suggestion = first.trim();

    if let Some(rest) = suggestion.strip_prefix(before) {
        suggestion = rest.trim();
    }

    let len = suggestion.chars().count();
    if !(MIN_LEN..=MAX_LEN).contains(&len) || CHATTY.is_match(suggestion) {
        return None;
    }
    Some(suggestion.to_string())
}

fn strip_comment<'a>(line: &'a str, marker: &str) -> &'a str {
    line.find(marker).map_or(line, |i| &line[..i])
}
