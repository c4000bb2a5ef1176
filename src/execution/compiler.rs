//! Compile step for C++ sources.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use super::runner::run_process;

pub const MISSING_ARTIFACT: &str = "Compilation failed: executable not created";

#[derive(Debug, Clone)]
pub struct CompileOutput {
    pub success: bool,
    pub artifact: PathBuf,
    /// Combined toolchain output; the failure text when `success` is false.
    pub diagnostics: String,
}

#[derive(Debug, Clone)]
pub struct Compiler {
    pub program: String,
    pub flags: Vec<String>,
    pub timeout: Duration,
}

impl Compiler {
    pub async fn compile(&self, source: &Path, artifact: &Path) -> CompileOutput {
        let mut args: Vec<String> = self.flags.clone();
        args.push(source.to_string_lossy().into_owned());
        args.push("-o".into());
        args.push(artifact.to_string_lossy().into_owned());

        log::debug!("compiling {} with {}", source.display(), self.program);
        let outcome = run_process(&self.program, args.as_slice(), None, self.timeout).await;

        let mut combined = outcome.stdout.clone();
        combined.push_str(&outcome.stderr);

        // Any mention of "error" fails the build, even on a zero exit.
        // Known to misfire on warnings that quote the word.
        let mentions_error = combined.to_lowercase().contains("error");
        if !outcome.success() || mentions_error {
            log::debug!(
                "compile failed (status {:?}, timed out {}, spawn failed {})",
                outcome.status,
                outcome.timed_out,
                outcome.spawn_failed
            );
            // A silent failure still has to surface as stderr.
            let diagnostics = if combined.trim().is_empty() {
                match outcome.status.and_then(|s| s.code()) {
                    Some(code) => format!("Compilation failed: {} exited with code {}", self.program, code),
                    None => format!("Compilation failed: {} was terminated", self.program),
                }
            } else {
                combined
            };
            return CompileOutput { success: false, artifact: artifact.to_path_buf(), diagnostics };
        }

        if tokio::fs::metadata(artifact).await.is_err() {
            return CompileOutput {
                success: false,
                artifact: artifact.to_path_buf(),
                diagnostics: MISSING_ARTIFACT.to_string(),
            };
        }

        if let Err(e) = mark_executable(artifact).await {
            log::warn!("could not chmod {}: {}", artifact.display(), e);
        }

        CompileOutput { success: true, artifact: artifact.to_path_buf(), diagnostics: combined }
    }
}

#[cfg(unix)]
async fn mark_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).await
}

#[cfg(not(unix))]
async fn mark_executable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
