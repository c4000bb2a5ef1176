//! Error classifier: raw stderr + source → structured diagnostic.
//!
//! Each language owns an ordered rule table; the first rule whose matcher
//! accepts the stderr text wins. Unrecognized text yields a record with a
//! blank `kind`. Nothing in here can fail.

use serde::{Deserialize, Serialize};

use crate::execution::Language;

mod cpp;
mod python;

/// Structured explanation of one captured error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    pub tip: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl DiagnosticRecord {
    /// True when no rule recognized the error text.
    pub fn is_unrecognized(&self) -> bool {
        self.kind.is_empty()
    }
}

pub fn classify(stderr: &str, source: &str, language: Language) -> DiagnosticRecord {
    // gcc quotes with U+2018/U+2019 under UTF-8 locales.
    let stderr = stderr.replace(['\u{2018}', '\u{2019}'], "'");
    match language {
        Language::Python => python::classify(&stderr, source),
        Language::Cpp => cpp::classify(&stderr, source),
    }
}

/// For failures raised before a language pipeline ran: tries every rule
/// table and keeps the first recognized record.
pub fn classify_unscoped(stderr: &str) -> DiagnosticRecord {
    [Language::Python, Language::Cpp]
        .into_iter()
        .map(|language| classify(stderr, "", language))
        .find(|rec| !rec.is_unrecognized())
        .unwrap_or_default()
}

/// Which stderr texts a rule accepts.
pub(crate) enum Matcher {
    Contains(&'static str),
    AnyOf(&'static [&'static str]),
    AllOf(&'static [&'static str]),
    Either(&'static Matcher, &'static Matcher),
}

impl Matcher {
    fn accepts(&self, text: &str) -> bool {
        match self {
            Matcher::Contains(needle) => text.contains(needle),
            Matcher::AnyOf(needles) => needles.iter().any(|n| text.contains(n)),
            Matcher::AllOf(needles) => needles.iter().all(|n| text.contains(n)),
            Matcher::Either(a, b) => a.accepts(text) || b.accepts(text),
        }
    }
}

/// What a rule sees when it describes a match.
pub(crate) struct Context<'a> {
    pub stderr: &'a str,
    pub source_lines: Vec<&'a str>,
    pub line: Option<u32>,
}

impl<'a> Context<'a> {
    fn new(stderr: &'a str, source: &'a str, line: Option<u32>) -> Self {
        Self { stderr, source_lines: source.split('\n').collect(), line }
    }

    /// Source text of the reported line, if any.
    pub fn offending_line(&self) -> Option<&'a str> {
        let idx = self.line?.checked_sub(1)? as usize;
        self.source_lines.get(idx).copied()
    }
}

#[derive(Debug, Default)]
pub(crate) struct Detail {
    pub message: String,
    pub tip: String,
    pub suggestion: Option<String>,
}

impl Detail {
    pub fn new(message: impl Into<String>, tip: impl Into<String>) -> Self {
        Self { message: message.into(), tip: tip.into(), suggestion: None }
    }

    pub fn suggest(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

pub(crate) struct Rule {
    pub matcher: Matcher,
    pub kind: &'static str,
    pub describe: fn(&Context<'_>) -> Detail,
}

/// Runs `rules` in order over `stderr`; shared by every language table.
pub(crate) fn apply_rules(
    rules: &[Rule],
    stderr: &str,
    source: &str,
    position: (Option<u32>, Option<u32>),
) -> DiagnosticRecord {
    let (line, column) = position;
    let mut record = DiagnosticRecord { line, column, ..Default::default() };

    if let Some(rule) = rules.iter().find(|r| r.matcher.accepts(stderr)) {
        let ctx = Context::new(stderr, source, line);
        let detail = (rule.describe)(&ctx);
        record.kind = rule.kind.to_string();
        record.message = detail.message;
        record.tip = detail.tip;
        record.suggestion = detail.suggestion;
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unscoped_faults() {
        assert!(classify_unscoped("Unsupported language").is_unrecognized());
        let rec = classify_unscoped("main.cpp:(.text+0x5): undefined reference to `helper()'");
        assert_eq!(rec.kind, "Linker Error");
    }

    #[test]
    fn typographic_quotes_are_folded() {
        let stderr = "main.cpp:4:19: error: expected \u{2018};\u{2019} before \u{2018}return\u{2019}\n";
        let rec = classify(stderr, "int main() {\n  int x = 1\n  return 0;\n}", Language::Cpp);
        assert_eq!(rec.kind, "Syntax Error");
        assert_eq!(rec.message, "Missing semicolon");
        assert_eq!(rec.line, Some(4));
    }

    #[test]
    fn unknown_text_gives_blank_record() {
        let rec = classify("something odd happened", "print(1)", Language::Python);
        assert!(rec.is_unrecognized());
        assert!(rec.message.is_empty());
        assert!(rec.tip.is_empty());
        assert_eq!(rec.suggestion, None);
    }

    #[test]
    fn classify_is_pure() {
        let stderr = "main.cpp:4:5: error: 'x' was not declared in this scope";
        let source = "int main() {\n\n\n    x = 1;\n}";
        let a = classify(stderr, source, Language::Cpp);
        let b = classify(stderr, source, Language::Cpp);
        assert_eq!(a, b);
    }

    #[test]
    fn wire_shape_uses_type_key() {
        let rec = DiagnosticRecord {
            line: Some(3),
            kind: "Name Error".into(),
            ..Default::default()
        };
        let v = serde_json::to_value(&rec).unwrap();
        assert_eq!(v["type"], "Name Error");
        assert_eq!(v["line"], 3);
        assert!(v.get("column").is_none());
    }
}
