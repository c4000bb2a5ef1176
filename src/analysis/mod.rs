//! Heuristic static analysis: rough complexity labels from source text.
//!
//! Recursion and loops are found by pattern matching, not parsing, so
//! keywords inside comments or strings count, and any `return …name(` in the
//! file marks `name` as recursive.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::execution::Language;

static PY_FUNCTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"def\s+(\w+)\(").expect("valid regex"));
static CPP_FUNCTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w+)\s+(\w+)\([^)]*\)").expect("valid regex"));
static LOOP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"for|while").expect("valid regex"));
// `.` stops at line breaks, so both keywords must share a line.
static NESTED_LOOP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"for.*for|while.*while|for.*while|while.*for").expect("valid regex")
});

pub const CONSTANT: &str = "O(1)";
pub const LINEAR: &str = "O(n)";
pub const QUADRATIC: &str = "O(n^2)";
pub const EXPONENTIAL: &str = "O(2^n)";
pub const NOT_APPLICABLE: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    #[serde(rename = "lines")]
    pub line_count: usize,
    #[serde(rename = "complexity")]
    pub time_complexity: String,
    pub space_complexity: String,
    pub has_recursion: bool,
    pub has_loops: bool,
}

impl AnalysisSummary {
    /// Placeholder used when no source could be analyzed.
    pub fn not_applicable() -> Self {
        Self {
            line_count: 0,
            time_complexity: NOT_APPLICABLE.into(),
            space_complexity: NOT_APPLICABLE.into(),
            has_recursion: false,
            has_loops: false,
        }
    }
}

pub fn analyze(source: &str, language: Language) -> AnalysisSummary {
    let line_count = source.split('\n').count();
    let has_recursion = has_recursion(source, language);
    let has_loops = LOOP.is_match(source);
    let nested = has_loops && NESTED_LOOP.is_match(source);

    let (time, space) = if has_recursion {
        (EXPONENTIAL, LINEAR)
    } else if nested {
        (QUADRATIC, CONSTANT)
    } else if has_loops {
        (LINEAR, CONSTANT)
    } else {
        (CONSTANT, CONSTANT)
    };

    AnalysisSummary {
        line_count,
        time_complexity: time.into(),
        space_complexity: space.into(),
        has_recursion,
        has_loops,
    }
}

fn function_names(source: &str, language: Language) -> Vec<&str> {
    let (pattern, group) = match language {
        Language::Python => (&*PY_FUNCTION, 1),
        Language::Cpp => (&*CPP_FUNCTION, 2),
    };
    pattern
        .captures_iter(source)
        .filter_map(|caps| caps.get(group).map(|m| m.as_str()))
        .collect()
}

fn has_recursion(source: &str, language: Language) -> bool {
    function_names(source, language).into_iter().any(|name| {
        Regex::new(&format!(r"return.*{}\(", regex::escape(name)))
            .map(|re| re.is_match(source))
            .unwrap_or(false)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn python_recursion_is_exponential() {
        let summary = analyze("def f(n):\n    return f(n-1)", Language::Python);
        assert!(summary.has_recursion);
        assert_eq!(summary.time_complexity, "O(2^n)");
        assert_eq!(summary.space_complexity, "O(n)");
        assert_eq!(summary.line_count, 2);
    }

    #[test]
    fn cpp_recursion() {
        let src = "int fib(int n) {\n    if (n < 2) return n;\n    return fib(n - 1) + fib(n - 2);\n}";
        let summary = analyze(src, Language::Cpp);
        assert!(summary.has_recursion);
        assert_eq!(summary.time_complexity, EXPONENTIAL);
    }

    #[test]
    fn recursion_wins_over_nested_loops() {
        let src = "def g(n):\n    for i in range(n): for_each(i)\n    return g(n-1)";
        let summary = analyze(src, Language::Python);
        assert!(summary.has_loops);
        assert_eq!(summary.time_complexity, EXPONENTIAL);
    }

    #[test]
    fn nested_loop_on_one_line_is_quadratic() {
        let src = "for (int i = 0; i < n; i++) for (int j = 0; j < n; j++) s++;";
        let summary = analyze(src, Language::Cpp);
        assert_eq!(summary.time_complexity, QUADRATIC);
        assert_eq!(summary.space_complexity, CONSTANT);
    }

    #[test]
    fn loops_on_separate_lines_are_linear() {
        let src = "for i in range(3):\n    print(i)\nwhile False:\n    pass";
        let summary = analyze(src, Language::Python);
        assert!(summary.has_loops);
        assert!(!summary.has_recursion);
        assert_eq!(summary.time_complexity, LINEAR);
    }

    #[test]
    fn straight_line_code_is_constant() {
        let summary = analyze("print('hi')", Language::Python);
        assert_eq!(summary.time_complexity, CONSTANT);
        assert_eq!(summary.space_complexity, CONSTANT);
        assert!(!summary.has_loops);
    }

    #[test]
    fn analysis_is_deterministic() {
        let src = "int main() {\n  while (true) {}\n}";
        assert_eq!(analyze(src, Language::Cpp), analyze(src, Language::Cpp));
    }

    #[test]
    fn wire_names() {
        let v = serde_json::to_value(AnalysisSummary::not_applicable()).unwrap();
        assert_eq!(v["lines"], 0);
        assert_eq!(v["complexity"], "N/A");
        assert_eq!(v["spaceComplexity"], "N/A");
        assert_eq!(v["hasRecursion"], false);
    }
}
