use std::path::PathBuf;

use clap::{ArgGroup, Parser};
use code_debugger::{assist::CursorPosition, Language};

#[derive(Parser, Debug, Clone)]
#[command(name = "cdbg", about = "Run, explain and fix Python/C++ snippets", version)]
#[command(group(ArgGroup::new("mode").args(["explain", "fix", "review", "complete"]).multiple(false)))]
#[command(group(ArgGroup::new("input_source").args(["input", "input_file"]).multiple(false)))]
#[command(group(ArgGroup::new("md_switch").args(["md", "no_md"]).multiple(false)))]
#[command(group(ArgGroup::new("project").args([
    "list_projects", "create_project", "show_project", "save_project", "delete_project", "watch_project",
]).multiple(false)))]
pub struct Cli {
    /// Source file to run (.py, .cpp, .cc, .cxx).
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Language of FILE; inferred from the extension when omitted.
    #[arg(long = "lang", value_parser = parse_language)]
    pub language: Option<Language>,

    /// Text fed to the program's stdin.
    #[arg(long)]
    pub input: Option<String>,

    /// Read the program's stdin from a file.
    #[arg(long = "input-file")]
    pub input_file: Option<PathBuf>,

    /// Print the run result as JSON.
    #[arg(long)]
    pub json: bool,

    /// Explain the code step by step, with a dry run.
    #[arg(short = 'e', long)]
    pub explain: bool,

    /// Run the code and, if it fails, ask for a fix.
    #[arg(short = 'f', long)]
    pub fix: bool,

    /// Review the code for best practices and complexity.
    #[arg(short = 'r', long)]
    pub review: bool,

    /// Suggest the rest of the line at LINE:COL.
    #[arg(long, value_name = "LINE:COL")]
    pub complete: Option<CursorPosition>,

    /// Large language model to use.
    #[arg(long)]
    pub model: Option<String>,

    /// Disable caching of assistant replies.
    #[arg(long = "no-cache")]
    pub no_cache: bool,

    /// Render assistant output as Markdown.
    #[arg(long)]
    pub md: bool,
    /// Print assistant output as plain text.
    #[arg(long = "no-md")]
    pub no_md: bool,

    /// List saved projects.
    #[arg(short = 'l', long = "list-projects", visible_alias = "lp")]
    pub list_projects: bool,

    /// Create a project named NAME (code from FILE, or a starter program).
    #[arg(long = "create-project", value_name = "NAME")]
    pub create_project: Option<String>,

    /// Print a project's code.
    #[arg(long = "show-project", value_name = "ID")]
    pub show_project: Option<String>,

    /// Overwrite a project's code with FILE.
    #[arg(long = "save-project", value_name = "ID")]
    pub save_project: Option<String>,

    /// Delete a project.
    #[arg(long = "delete-project", value_name = "ID")]
    pub delete_project: Option<String>,

    /// Stream changes to a project until interrupted.
    #[arg(long = "watch-project", value_name = "ID")]
    pub watch_project: Option<String>,
}

fn parse_language(s: &str) -> Result<Language, String> {
    s.parse::<Language>().map_err(|e| e.to_string())
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// `--lang`, else the FILE extension.
    pub fn resolved_language(&self) -> Option<Language> {
        self.language.or_else(|| {
            self.file
                .as_ref()
                .and_then(|f| f.extension())
                .and_then(|e| e.to_str())
                .and_then(Language::from_extension)
        })
    }
}
