use std::sync::LazyLock;

use regex::Regex;

use super::{apply_rules, Context, Detail, DiagnosticRecord, Matcher, Rule};

static LOCATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"File ".*", line (\d+)"#).expect("valid regex"));
static UNDEFINED_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"name '(\w+)' is not defined").expect("valid regex"));
static BLOCK_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(if|for|while|def|class)\s+.*[^:]$").expect("valid regex"));

const UNTERMINATED: &[&str] = &["EOL while scanning string", "unterminated string literal"];

static RULES: &[Rule] = &[
    Rule {
        matcher: Matcher::Either(
            &Matcher::Contains("SyntaxError"),
            &Matcher::AnyOf(UNTERMINATED),
        ),
        kind: "Syntax Error",
        describe: syntax_error,
    },
    Rule {
        matcher: Matcher::Contains("IndentationError"),
        kind: "Indentation Error",
        describe: |_| {
            Detail::new(
                "Incorrect indentation",
                "Python uses indentation to define code blocks",
            )
            .suggest("Use consistent spaces (4 spaces recommended)")
        },
    },
    Rule {
        matcher: Matcher::Contains("NameError"),
        kind: "Name Error",
        describe: name_error,
    },
    Rule {
        matcher: Matcher::Contains("TypeError"),
        kind: "Type Error",
        describe: |_| {
            Detail::new(
                "Operation not supported between these types",
                "Check that you're using compatible data types",
            )
            .suggest("Try converting types with int(), str(), or float()")
        },
    },
    Rule {
        matcher: Matcher::Contains("ValueError"),
        kind: "Value Error",
        describe: |_| {
            Detail::new("Invalid value provided", "Check your input values and conversions")
                .suggest("Use try-except to handle input errors")
        },
    },
    Rule {
        matcher: Matcher::Contains("ZeroDivisionError"),
        kind: "Zero Division Error",
        describe: |_| {
            Detail::new("Cannot divide by zero", "Add a check to ensure divisor is not zero")
                .suggest("Use: if divisor != 0: before division")
        },
    },
    Rule {
        matcher: Matcher::Contains("IndexError"),
        kind: "Index Error",
        describe: |_| {
            Detail::new(
                "List index out of range",
                "Trying to access an index that doesn't exist",
            )
            .suggest("Check list length with len() before accessing")
        },
    },
];

pub(super) fn classify(stderr: &str, source: &str) -> DiagnosticRecord {
    let line = LOCATION
        .captures(stderr)
        .and_then(|c| c[1].parse::<u32>().ok());
    apply_rules(RULES, stderr, source, (line, None))
}

fn syntax_error(ctx: &Context<'_>) -> Detail {
    // Unterminated strings take precedence over the generic invalid-syntax text.
    if UNTERMINATED.iter().any(|n| ctx.stderr.contains(n)) {
        return Detail::new("Unterminated string", "You forgot to close a string with a quote")
            .suggest("Make sure all strings have matching quotes");
    }
    if ctx.stderr.contains("invalid syntax") || ctx.stderr.contains("expected ':'") {
        let mut detail = Detail::new(
            "Invalid syntax detected",
            "Check for missing colons (:), parentheses, or quotes",
        );
        if let Some(src) = ctx.offending_line() {
            let trimmed = src.trim();
            if BLOCK_HEADER.is_match(trimmed) {
                detail = detail.suggest(format!("Add a colon at the end: {trimmed}:"));
            }
        }
        return detail;
    }
    Detail::default()
}

fn name_error(ctx: &Context<'_>) -> Detail {
    match UNDEFINED_NAME.captures(ctx.stderr) {
        Some(caps) => {
            let name = &caps[1];
            Detail::new(
                format!("Variable '{name}' is not defined"),
                "Make sure you define variables before using them",
            )
            .suggest(format!("Did you mean to define: {name} = ... ?"))
        }
        None => Detail::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unterminated_string_legacy_wording() {
        let stderr = "  File \"/tmp/main.py\", line 1\n    print(\"hi)\n               ^\nSyntaxError: EOL while scanning string literal\n";
        let rec = classify(stderr, "print(\"hi)");
        assert_eq!(rec.kind, "Syntax Error");
        assert_eq!(rec.message, "Unterminated string");
        assert_eq!(rec.line, Some(1));
        assert_eq!(rec.column, None);
    }

    #[test]
    fn unterminated_string_modern_wording() {
        let stderr = "  File \"/tmp/main.py\", line 2\n    x = 'abc\n        ^\nSyntaxError: unterminated string literal (detected at line 2)\n";
        let rec = classify(stderr, "y = 1\nx = 'abc");
        assert_eq!(rec.kind, "Syntax Error");
        assert_eq!(rec.message, "Unterminated string");
    }

    #[test]
    fn missing_colon_gets_suggestion() {
        let source = "x = 3\nif x > 2\n    print(x)";
        let stderr = "  File \"/tmp/main.py\", line 2\n    if x > 2\n            ^\nSyntaxError: invalid syntax\n";
        let rec = classify(stderr, source);
        assert_eq!(rec.message, "Invalid syntax detected");
        assert_eq!(rec.suggestion.as_deref(), Some("Add a colon at the end: if x > 2:"));
    }

    #[test]
    fn expected_colon_wording_also_suggests() {
        let source = "def f()\n    return 1";
        let stderr = "  File \"/tmp/main.py\", line 1\n    def f()\n           ^\nSyntaxError: expected ':'\n";
        let rec = classify(stderr, source);
        assert_eq!(rec.suggestion.as_deref(), Some("Add a colon at the end: def f():"));
    }

    #[test]
    fn name_error_extracts_identifier() {
        let stderr = "Traceback (most recent call last):\n  File \"/tmp/main.py\", line 3, in <module>\n    print(totl)\nNameError: name 'totl' is not defined\n";
        let rec = classify(stderr, "a = 1\nb = 2\nprint(totl)");
        assert_eq!(rec.kind, "Name Error");
        assert_eq!(rec.line, Some(3));
        assert_eq!(rec.message, "Variable 'totl' is not defined");
        assert_eq!(rec.suggestion.as_deref(), Some("Did you mean to define: totl = ... ?"));
    }

    #[test]
    fn runtime_categories() {
        let cases = [
            ("ZeroDivisionError: division by zero", "Zero Division Error"),
            ("IndexError: list index out of range", "Index Error"),
            ("ValueError: invalid literal for int()", "Value Error"),
            ("TypeError: unsupported operand type(s)", "Type Error"),
            ("IndentationError: expected an indented block", "Indentation Error"),
        ];
        for (stderr, kind) in cases {
            assert_eq!(classify(stderr, "").kind, kind, "for {stderr}");
        }
    }

    #[test]
    fn line_out_of_range_does_not_panic() {
        let stderr = "  File \"x.py\", line 99\nSyntaxError: invalid syntax";
        let rec = classify(stderr, "pass");
        assert_eq!(rec.line, Some(99));
        assert_eq!(rec.suggestion, None);
    }
}
