use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::{ask_json, Reply};
use crate::{analysis::AnalysisSummary, execution::Language, llm::LanguageModel, role::AssistRole};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Review {
    pub overall_rating: String,
    pub strengths: Vec<String>,
    pub improvements: Vec<Improvement>,
    pub optimized_code: String,
    pub complexity_improvement: String,
    pub best_practices: Vec<String>,
}

impl Default for Review {
    fn default() -> Self {
        Self {
            overall_rating: "Good".into(),
            strengths: Vec::new(),
            improvements: Vec::new(),
            optimized_code: String::new(),
            complexity_improvement: String::new(),
            best_practices: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Improvement {
    pub category: String,
    pub issue: String,
    pub suggestion: String,
    pub priority: String,
    pub example: String,
}

impl Review {
    pub fn to_markdown(&self) -> String {
        let mut md = format!("## Rating: {}\n\n", self.overall_rating);
        if !self.strengths.is_empty() {
            md.push_str("### Strengths\n\n");
            for s in &self.strengths {
                md.push_str(&format!("- {s}\n"));
            }
            md.push('\n');
        }
        if !self.improvements.is_empty() {
            md.push_str("### Improvements\n\n");
            for i in &self.improvements {
                md.push_str(&format!(
                    "- **[{}] {}** ({}): {}\n",
                    i.priority, i.category, i.issue, i.suggestion
                ));
                if !i.example.is_empty() {
                    md.push_str(&format!("  `{}`\n", i.example));
                }
            }
            md.push('\n');
        }
        if !self.complexity_improvement.is_empty() {
            md.push_str(&format!("### Complexity\n\n{}\n\n", self.complexity_improvement));
        }
        if !self.optimized_code.is_empty() {
            md.push_str(&format!("### Optimized version\n\n```\n{}\n```\n\n", self.optimized_code));
        }
        if !self.best_practices.is_empty() {
            md.push_str("### Best practices\n\n");
            for b in &self.best_practices {
                md.push_str(&format!("- {b}\n"));
            }
        }
        md
    }
}

fn prompt(code: &str, language: Language, analysis: &AnalysisSummary) -> String {
    format!(
        r#"Review this {language} code.

Code:
```{language}
{code}
```

Current Analysis:
- Time Complexity: {time}
- Space Complexity: {space}
- Lines: {lines}
- Has Recursion: {recursion}
- Has Loops: {loops}

Provide your response in this exact JSON format:
{{
  "overallRating": "Good/Fair/Needs Improvement",
  "strengths": ["What the code does well"],
  "improvements": [
    {{
      "category": "Performance/Readability/Best Practice/Security",
      "issue": "Description of the issue",
      "suggestion": "How to improve it",
      "priority": "High/Medium/Low",
      "example": "Code example showing the improvement"
    }}
  ],
  "optimizedCode": "A more optimal version if applicable",
  "complexityImprovement": "If optimization improves complexity, explain how",
  "bestPractices": ["Key best practice advice"]
}}"#,
        time = analysis.time_complexity,
        space = analysis.space_complexity,
        lines = analysis.line_count,
        recursion = analysis.has_recursion,
        loops = analysis.has_loops,
    )
}

pub async fn review(
    model: &dyn LanguageModel,
    code: &str,
    language: Language,
    analysis: &AnalysisSummary,
) -> Result<Review> {
    let reply = ask_json(model, AssistRole::Reviewer, &prompt(code, language, analysis)).await?;
    Ok(match reply {
        Reply::Parsed(r) => r,
        Reply::Raw(text) => Review { complexity_improvement: text, ..Default::default() },
    })
}
