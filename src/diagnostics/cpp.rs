use std::sync::LazyLock;

use regex::Regex;

use super::{apply_rules, Context, Detail, DiagnosticRecord, Matcher, Rule};

static LOCATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":(\d+):(\d+):").expect("valid regex"));
static UNDECLARED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"'(\w+)' was not declared|undeclared identifier '(\w+)'").expect("valid regex")
});
static UNDEFINED_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"undefined reference to [`']([^'(`]+)").expect("valid regex"));

static RULES: &[Rule] = &[
    Rule {
        matcher: Matcher::Either(
            &Matcher::AllOf(&["expected", "before"]),
            &Matcher::Contains("expected ';'"),
        ),
        kind: "Syntax Error",
        describe: syntax_error,
    },
    Rule {
        matcher: Matcher::AnyOf(&["was not declared in this scope", "use of undeclared identifier"]),
        kind: "Declaration Error",
        describe: declaration_error,
    },
    Rule {
        matcher: Matcher::Contains("cannot convert"),
        kind: "Type Conversion Error",
        describe: |_| {
            Detail::new("Incompatible types", "Cannot convert between these types")
                .suggest("Use type casting or change variable type")
        },
    },
    Rule {
        matcher: Matcher::Contains("undefined reference to"),
        kind: "Linker Error",
        describe: linker_error,
    },
];

pub(super) fn classify(stderr: &str, source: &str) -> DiagnosticRecord {
    let (line, column) = match LOCATION.captures(stderr) {
        Some(caps) => (caps[1].parse::<u32>().ok(), caps[2].parse::<u32>().ok()),
        None => (None, None),
    };
    apply_rules(RULES, stderr, source, (line, column))
}

fn syntax_error(ctx: &Context<'_>) -> Detail {
    // A missing brace report wins over a missing semicolon in the same output.
    if ctx.stderr.contains("expected '{'") {
        return Detail::new(
            "Missing opening brace",
            "Functions and control structures need braces { }",
        );
    }
    if ctx.stderr.contains("expected ';'") {
        return Detail::new(
            "Missing semicolon",
            "Every C++ statement must end with a semicolon (;)",
        )
        .suggest("Add ; at the end of the statement");
    }
    Detail::default()
}

fn declaration_error(ctx: &Context<'_>) -> Detail {
    let name = UNDECLARED.captures(ctx.stderr).and_then(|caps| {
        caps.get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str().to_string())
    });
    match name {
        Some(name) => Detail::new(
            format!("'{name}' not declared"),
            "Variable or function used before declaration",
        )
        .suggest(format!("Declare before use: int {name};")),
        None => Detail::default(),
    }
}

fn linker_error(ctx: &Context<'_>) -> Detail {
    match UNDEFINED_REF.captures(ctx.stderr) {
        Some(caps) => Detail::new(
            format!("Function '{}' not defined", caps[1].trim()),
            "Function declared but not implemented",
        )
        .suggest("Provide function definition"),
        None => Detail::default(),
    }
}
