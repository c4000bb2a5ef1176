//! Run Python and C++ snippets, explain their failures, and keep projects in sync.

pub mod analysis;
pub mod assist;
pub mod cache;
pub mod config;
pub mod diagnostics;
pub mod execution;
pub mod llm;
pub mod printer;
pub mod role;
pub mod store;

pub use analysis::{analyze, AnalysisSummary};
pub use diagnostics::{classify, DiagnosticRecord};
pub use execution::{ExecutionRequest, ExecutionResult, ExecutionSettings, Executor, Language, RawRunResult};
