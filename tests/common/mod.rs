use std::{path::Path, process::Command, time::Duration};

use code_debugger::{ExecutionSettings, Executor};

pub fn tool_available(program: &str) -> bool {
    Command::new(program)
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

pub fn python_cmd() -> &'static str {
    if cfg!(windows) { "python" } else { "python3" }
}

/// Executor whose scratch dirs land in `work_dir`.
pub fn executor(work_dir: &Path, run_timeout: Duration) -> Executor {
    Executor::new(ExecutionSettings {
        python: python_cmd().into(),
        run_timeout,
        work_dir: work_dir.to_path_buf(),
        ..ExecutionSettings::default()
    })
}
