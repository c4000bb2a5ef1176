use std::time::Duration;

use anyhow::Result;
use code_debugger::{ExecutionRequest, Language};

mod common;

macro_rules! require_python {
    () => {
        if !common::tool_available(common::python_cmd()) {
            println!("{} not found; skipping", common::python_cmd());
            return Ok(());
        }
    };
}

const LIMIT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn clean_program_has_no_diagnostic() -> Result<()> {
    require_python!();
    let work = tempfile::tempdir()?;
    let res = common::executor(work.path(), LIMIT)
        .execute(&ExecutionRequest::new(Language::Python, "print('hi')"))
        .await;
    assert_eq!(res.stdout, "hi\n");
    assert_eq!(res.stderr, "");
    assert!(res.diagnostic.is_none());
    assert_eq!(res.analysis.time_complexity, "O(1)");
    Ok(())
}

#[tokio::test]
async fn both_streams_are_captured() -> Result<()> {
    require_python!();
    let work = tempfile::tempdir()?;
    let src = "import sys\nfor i in range(200):\n    print('line', i)\nsys.stderr.write('boom\\n')\n";
    let res = common::executor(work.path(), LIMIT)
        .execute(&ExecutionRequest::new(Language::Python, src))
        .await;
    assert_eq!(res.stdout.lines().count(), 200);
    assert!(res.stdout.ends_with("line 199\n"));
    assert_eq!(res.stderr, "boom\n");
    assert!(res.diagnostic.is_some());
    assert!(res.analysis.has_loops);
    Ok(())
}

#[tokio::test]
async fn runaway_loop_is_killed_with_partial_output() -> Result<()> {
    require_python!();
    let work = tempfile::tempdir()?;
    let src = "import sys\nprint('started')\nsys.stdout.flush()\nwhile True:\n    pass\n";
    let res = common::executor(work.path(), Duration::from_millis(1500))
        .execute(&ExecutionRequest::new(Language::Python, src))
        .await;
    assert_eq!(res.stdout, "started\n");
    assert_eq!(res.stderr, "Execution timed out (1500 ms)");
    assert!(res.diagnostic.as_ref().is_some_and(|d| d.is_unrecognized()));
    Ok(())
}

#[tokio::test]
async fn unterminated_string_is_classified() -> Result<()> {
    require_python!();
    let work = tempfile::tempdir()?;
    let res = common::executor(work.path(), LIMIT)
        .execute(&ExecutionRequest::new(Language::Python, "print(\"hello)\n"))
        .await;
    let diag = res.diagnostic.expect("stderr should be classified");
    assert_eq!(diag.kind, "Syntax Error");
    assert_eq!(diag.message, "Unterminated string");
    assert_eq!(diag.line, Some(1));
    Ok(())
}

#[tokio::test]
async fn stdin_is_fed_and_absent_stdin_never_blocks() -> Result<()> {
    require_python!();
    let work = tempfile::tempdir()?;
    let exec = common::executor(work.path(), LIMIT);

    let summing = "a, b = map(int, input().split())\nprint(a + b)";
    let res = exec
        .execute(&ExecutionRequest::new(Language::Python, summing).with_stdin("  2 40  "))
        .await;
    assert_eq!(res.stdout, "42\n");

    let ignores_input = "print('no input needed')";
    let res = exec
        .execute(&ExecutionRequest::new(Language::Python, ignores_input).with_stdin(""))
        .await;
    assert_eq!(res.stdout, "no input needed\n");

    // Reading from a closed stdin fails fast instead of hanging.
    let res = exec.execute(&ExecutionRequest::new(Language::Python, "input()")).await;
    assert!(res.stderr.contains("EOFError"));
    assert_ne!(res.stderr, "Execution timed out (5 seconds)");
    Ok(())
}

#[tokio::test]
async fn scratch_files_do_not_accumulate() -> Result<()> {
    require_python!();
    let work = tempfile::tempdir()?;
    let exec = common::executor(work.path(), Duration::from_millis(800));
    exec.execute(&ExecutionRequest::new(Language::Python, "print(1)")).await;
    exec.execute(&ExecutionRequest::new(Language::Python, "1/0")).await;
    exec.execute(&ExecutionRequest::new(Language::Python, "while True: pass")).await;
    assert_eq!(std::fs::read_dir(work.path())?.count(), 0);
    Ok(())
}

#[tokio::test]
async fn concurrent_requests_stay_isolated() -> Result<()> {
    require_python!();
    let work = tempfile::tempdir()?;
    let exec = common::executor(work.path(), LIMIT);
    let a = ExecutionRequest::new(Language::Python, "print('a')");
    let b = ExecutionRequest::new(Language::Python, "print('b')");
    let (ra, rb) = tokio::join!(exec.execute(&a), exec.execute(&b));
    assert_eq!(ra.stdout, "a\n");
    assert_eq!(rb.stdout, "b\n");
    Ok(())
}
