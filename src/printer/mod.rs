//! Printers: run results (owo-colors) and assist output (termimad).

use owo_colors::OwoColorize;
use termimad::MadSkin;

use crate::{diagnostics::DiagnosticRecord, execution::ExecutionResult, store::Project};

pub struct ResultPrinter {
    pub color: bool,
}

impl Default for ResultPrinter {
    fn default() -> Self {
        Self { color: true }
    }
}

impl ResultPrinter {
    pub fn print(&self, result: &ExecutionResult) {
        print!("{}", self.render(result));
    }

    pub fn render(&self, result: &ExecutionResult) -> String {
        let mut out = String::new();
        if !result.stdout.is_empty() {
            out.push_str(&result.stdout);
            if !result.stdout.ends_with('\n') {
                out.push('\n');
            }
        }
        if !result.stderr.is_empty() {
            let header = self.paint("── stderr ──", Paint::Red);
            out.push_str(&format!("{header}\n{}", result.stderr));
            if !result.stderr.ends_with('\n') {
                out.push('\n');
            }
        }
        if let Some(diag) = result.diagnostic.as_ref().filter(|d| !d.is_unrecognized()) {
            out.push_str(&self.render_diagnostic(diag));
        }
        let a = &result.analysis;
        let summary = format!(
            "lines: {}  time: {}  space: {}  recursion: {}  loops: {}",
            a.line_count, a.time_complexity, a.space_complexity, a.has_recursion, a.has_loops
        );
        out.push_str(&format!("{}\n", self.paint(&summary, Paint::Cyan)));
        out
    }

    fn render_diagnostic(&self, diag: &DiagnosticRecord) -> String {
        let location = match (diag.line, diag.column) {
            (Some(l), Some(c)) => format!(" (line {l}, column {c})"),
            (Some(l), None) => format!(" (line {l})"),
            _ => String::new(),
        };
        let mut out = format!("{}\n", self.paint(&format!("{}{location}", diag.kind), Paint::Yellow));
        if !diag.message.is_empty() {
            out.push_str(&format!("  {}\n", diag.message));
        }
        if !diag.tip.is_empty() {
            out.push_str(&format!("  tip: {}\n", diag.tip));
        }
        if let Some(s) = &diag.suggestion {
            out.push_str(&format!("  {} {}\n", self.paint("fix:", Paint::Green), s));
        }
        out
    }

    fn paint(&self, text: &str, paint: Paint) -> String {
        if !self.color {
            return text.to_string();
        }
        match paint {
            Paint::Red => text.red().to_string(),
            Paint::Yellow => text.yellow().to_string(),
            Paint::Green => text.green().to_string(),
            Paint::Cyan => text.cyan().to_string(),
        }
    }
}

#[derive(Clone, Copy)]
enum Paint {
    Red,
    Yellow,
    Green,
    Cyan,
}

pub fn print_project_line(p: &Project) {
    println!(
        "{}  {:<6} {}  {}",
        p.id.magenta(),
        p.language.as_str(),
        p.last_modified.format("%Y-%m-%d %H:%M"),
        p.name
    );
}

pub struct MarkdownPrinter {
    pub skin: MadSkin,
}

impl Default for MarkdownPrinter {
    fn default() -> Self {
        Self { skin: MadSkin::default() }
    }
}

impl MarkdownPrinter {
    pub fn print(&self, text: &str) {
        self.skin.print_text(text);
        println!();
    }
}
