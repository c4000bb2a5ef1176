//! Boundary-facing `run-code` request: loosely typed JSON in, `ExecutionResult` out.

use serde::{Deserialize, Serialize};

use super::{ExecutionRequest, ExecutionResult, Executor, Language};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunCodeRequest {
    pub language: String,
    pub code: String,
    #[serde(default)]
    pub input: Option<String>,
}

impl RunCodeRequest {
    /// Only the exact wire names are accepted; CLI aliases such as `py` are not.
    pub fn into_request(self) -> Result<ExecutionRequest, String> {
        let language = match self.language.as_str() {
            "python" => Language::Python,
            "cpp" => Language::Cpp,
            _ => return Err("Unsupported language".to_string()),
        };
        Ok(ExecutionRequest { language, source: self.code, stdin: self.input })
    }
}

/// Handles one request; unknown languages become an error result, not a failure.
pub async fn handle_run_code(executor: &Executor, req: RunCodeRequest) -> ExecutionResult {
    match req.into_request() {
        Ok(request) => executor.execute(&request).await,
        Err(message) => ExecutionResult::fault(message),
    }
}

/// JSON-in/JSON-out variant; malformed payloads are reported the same way.
pub async fn handle_run_code_json(executor: &Executor, payload: &str) -> serde_json::Value {
    let result = match serde_json::from_str::<RunCodeRequest>(payload) {
        Ok(req) => handle_run_code(executor, req).await,
        Err(e) => ExecutionResult::fault(format!("Invalid request: {e}")),
    };
    serde_json::to_value(&result).unwrap_or_else(|e| serde_json::json!({ "stdout": "", "stderr": e.to_string() }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::ExecutionSettings;

    #[tokio::test]
    async fn unsupported_language() {
        let exec = Executor::new(ExecutionSettings::default());
        let res = handle_run_code(
            &exec,
            RunCodeRequest { language: "cobol".into(), code: "DISPLAY 'HI'".into(), input: None },
        )
        .await;
        assert_eq!(res.stdout, "");
        assert_eq!(res.stderr, "Unsupported language");
        assert_eq!(res.analysis.line_count, 0);
        assert_eq!(res.analysis.time_complexity, "N/A");
    }

    #[tokio::test]
    async fn aliases_are_not_wire_names() {
        let exec = Executor::new(ExecutionSettings::default());
        for alias in ["py", "c++", "Python", "CPP"] {
            let payload = serde_json::json!({ "language": alias, "code": "print(1)" }).to_string();
            let v = handle_run_code_json(&exec, &payload).await;
            assert_eq!(v["stderr"], "Unsupported language", "{alias}");
            assert_eq!(v["stdout"], "");
        }
    }

    #[tokio::test]
    async fn malformed_json_is_a_result() {
        let exec = Executor::new(ExecutionSettings::default());
        let v = handle_run_code_json(&exec, "{not json").await;
        assert!(v["stderr"].as_str().unwrap().starts_with("Invalid request"));
        assert_eq!(v["analysis"]["complexity"], "N/A");
    }

    #[test]
    fn input_is_optional() {
        let req: RunCodeRequest =
            serde_json::from_str(r#"{"language":"python","code":"print(1)"}"#).unwrap();
        let exec_req = req.into_request().unwrap();
        assert_eq!(exec_req.language, Language::Python);
        assert_eq!(exec_req.stdin, None);
    }
}
