//! Execution engine: request/result types and the per-language pipeline.

use std::{fmt, path::PathBuf, str::FromStr, time::Duration};

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::{
    analysis::{self, AnalysisSummary},
    config::Config,
    diagnostics::{self, DiagnosticRecord},
};

pub mod compiler;
pub mod request;
pub mod runner;
pub mod workspace;

use compiler::Compiler;
use workspace::Workspace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    Cpp,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::Cpp => "cpp",
        }
    }

    pub fn source_file_name(&self) -> &'static str {
        match self {
            Language::Python => "main.py",
            Language::Cpp => "main.cpp",
        }
    }

    /// Guess from a file extension (`py`, `cpp`, `cc`, `cxx`).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "py" => Some(Language::Python),
            "cpp" | "cc" | "cxx" => Some(Language::Cpp),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "python" | "py" => Ok(Language::Python),
            "cpp" | "c++" => Ok(Language::Cpp),
            other => bail!("Unsupported language: {}", other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
    pub language: Language,
    pub source: String,
    pub stdin: Option<String>,
}

impl ExecutionRequest {
    pub fn new(language: Language, source: impl Into<String>) -> Self {
        Self { language, source: source.into(), stdin: None }
    }

    pub fn with_stdin(mut self, stdin: impl Into<String>) -> Self {
        self.stdin = Some(stdin.into());
        self
    }

    /// Blank input means "no stdin"; anything else is trimmed and newline-terminated.
    pub fn stdin_payload(&self) -> Option<String> {
        let text = self.stdin.as_deref()?.trim();
        if text.is_empty() {
            None
        } else {
            Some(format!("{text}\n"))
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRunResult {
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub stdout: String,
    pub stderr: String,
    #[serde(rename = "debugInfo", default, skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<DiagnosticRecord>,
    pub analysis: AnalysisSummary,
}

impl ExecutionResult {
    /// Builds a result, classifying `stderr` whenever it is non-empty.
    pub fn new(
        stdout: String,
        stderr: String,
        language: Language,
        source: &str,
        analysis: AnalysisSummary,
    ) -> Self {
        let diagnostic =
            (!stderr.is_empty()).then(|| diagnostics::classify(&stderr, source, language));
        Self { stdout, stderr, diagnostic, analysis }
    }

    /// Result for a failure that happened before anything could run.
    pub fn fault(message: impl Into<String>) -> Self {
        let stderr: String = message.into();
        let diagnostic = (!stderr.is_empty()).then(|| diagnostics::classify_unscoped(&stderr));
        Self { stdout: String::new(), stderr, diagnostic, analysis: AnalysisSummary::not_applicable() }
    }

    pub fn succeeded(&self) -> bool {
        self.stderr.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct ExecutionSettings {
    pub python: String,
    pub cxx: String,
    pub cxx_flags: Vec<String>,
    pub run_timeout: Duration,
    pub compile_timeout: Duration,
    pub work_dir: PathBuf,
}

impl Default for ExecutionSettings {
    fn default() -> Self {
        Self::from_config(&Config::from_pairs(std::iter::empty::<(String, String)>()))
    }
}

impl ExecutionSettings {
    pub fn from_config(cfg: &Config) -> Self {
        let python = cfg.get("PYTHON_CMD").unwrap_or_else(|| "python3".into());
        let cxx = cfg.get("CXX_CMD").unwrap_or_else(|| "g++".into());
        let cxx_flags = cfg
            .get("CXX_FLAGS")
            .map(|v| v.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();
        Self {
            python,
            cxx,
            cxx_flags,
            run_timeout: cfg
                .get_millis("RUN_TIMEOUT_MS")
                .unwrap_or(Duration::from_secs(5)),
            compile_timeout: cfg
                .get_millis("COMPILE_TIMEOUT_MS")
                .unwrap_or(Duration::from_secs(10)),
            work_dir: cfg.work_dir(),
        }
    }
}

/// Drives one request through compile (if needed) and run.
#[derive(Debug, Clone)]
pub struct Executor {
    settings: ExecutionSettings,
}

impl Executor {
    pub fn new(settings: ExecutionSettings) -> Self {
        Self { settings }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(ExecutionSettings::from_config(cfg))
    }

    pub fn settings(&self) -> &ExecutionSettings {
        &self.settings
    }

    /// Never fails: every problem is reported through `stderr`.
    pub async fn execute(&self, request: &ExecutionRequest) -> ExecutionResult {
        log::info!("running {} snippet ({} bytes)", request.language, request.source.len());
        match self.try_execute(request).await {
            Ok(result) => {
                log::info!("{} run finished, stderr empty: {}", request.language, result.succeeded());
                result
            }
            Err(e) => {
                log::warn!("execution fault: {:#}", e);
                ExecutionResult::fault(format!("{:#}", e))
            }
        }
    }

    async fn try_execute(&self, request: &ExecutionRequest) -> Result<ExecutionResult> {
        // Held until the end of this call; removal happens on every return path.
        let workspace = Workspace::create(&self.settings.work_dir)?;
        let source_path = workspace
            .write_source(request.language.source_file_name(), &request.source)
            .await?;
        let stdin = request.stdin_payload();

        let raw = match request.language {
            Language::Python => {
                runner::run(
                    &self.settings.python,
                    &[source_path.as_os_str()],
                    stdin.as_deref(),
                    self.settings.run_timeout,
                )
                .await
            }
            Language::Cpp => {
                let compiler = Compiler {
                    program: self.settings.cxx.clone(),
                    flags: self.settings.cxx_flags.clone(),
                    timeout: self.settings.compile_timeout,
                };
                let built = compiler
                    .compile(&source_path, &workspace.artifact_path("main"))
                    .await;
                if !built.success {
                    return Ok(self.finish(request, RawRunResult {
                        stdout: String::new(),
                        stderr: built.diagnostics,
                    }));
                }
                runner::run(
                    &built.artifact,
                    &[] as &[&str],
                    stdin.as_deref(),
                    self.settings.run_timeout,
                )
                .await
            }
        };

        Ok(self.finish(request, raw))
    }

    fn finish(&self, request: &ExecutionRequest, raw: RawRunResult) -> ExecutionResult {
        let analysis = analysis::analyze(&request.source, request.language);
        ExecutionResult::new(raw.stdout, raw.stderr, request.language, &request.source, analysis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stdin_normalization() {
        let req = ExecutionRequest::new(Language::Python, "");
        assert_eq!(req.stdin_payload(), None);
        assert_eq!(req.clone().with_stdin("   \n ").stdin_payload(), None);
        assert_eq!(req.with_stdin("  3 4 \n\n").stdin_payload().as_deref(), Some("3 4\n"));
    }

    #[test]
    fn language_parsing() {
        assert_eq!("Python".parse::<Language>().unwrap(), Language::Python);
        assert_eq!("c++".parse::<Language>().unwrap(), Language::Cpp);
        assert!("rust".parse::<Language>().is_err());
        assert_eq!(Language::from_extension("CC"), Some(Language::Cpp));
        assert_eq!(Language::from_extension("rs"), None);
    }

    #[test]
    fn diagnostic_present_iff_stderr() {
        let ok = ExecutionResult::new(
            "1\n".into(),
            String::new(),
            Language::Python,
            "print(1)",
            analysis::analyze("print(1)", Language::Python),
        );
        assert!(ok.diagnostic.is_none());

        let bad = ExecutionResult::new(
            String::new(),
            "ZeroDivisionError: division by zero".into(),
            Language::Python,
            "1/0",
            analysis::analyze("1/0", Language::Python),
        );
        assert_eq!(bad.diagnostic.unwrap().kind, "Zero Division Error");

        let fault = ExecutionResult::fault("disk full");
        assert!(fault.diagnostic.is_some());
        assert_eq!(fault.analysis, AnalysisSummary::not_applicable());
    }

    #[tokio::test]
    async fn unwritable_work_dir_becomes_fault_result() {
        let file = tempfile::NamedTempFile::new().unwrap();
        // A regular file cannot host a scratch directory.
        let settings = ExecutionSettings {
            work_dir: file.path().join("nested"),
            ..ExecutionSettings::default()
        };
        let res = Executor::new(settings)
            .execute(&ExecutionRequest::new(Language::Python, "print(1)"))
            .await;
        assert!(res.stdout.is_empty());
        assert!(!res.stderr.is_empty());
        assert!(res.diagnostic.is_some());
        assert_eq!(res.analysis.time_complexity, "N/A");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn silent_compiler_failure_is_not_a_clean_run() {
        let dir = tempfile::tempdir().unwrap();
        let settings = ExecutionSettings {
            cxx: "false".into(),
            work_dir: dir.path().to_path_buf(),
            ..ExecutionSettings::default()
        };
        let res = Executor::new(settings)
            .execute(&ExecutionRequest::new(Language::Cpp, "int main(){return 0;}"))
            .await;
        assert_eq!(res.stdout, "");
        assert_eq!(res.stderr, "Compilation failed: false exited with code 1");
        assert!(res.diagnostic.is_some());
    }

    #[tokio::test]
    async fn missing_interpreter_is_reported_as_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let settings = ExecutionSettings {
            python: "no-such-python-xyz".into(),
            work_dir: dir.path().to_path_buf(),
            ..ExecutionSettings::default()
        };
        let res = Executor::new(settings)
            .execute(&ExecutionRequest::new(Language::Python, "print(1)"))
            .await;
        assert!(!res.stderr.is_empty());
        assert!(res.diagnostic.is_some());
        assert_eq!(res.analysis.line_count, 1);
    }
}
