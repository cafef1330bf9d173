//! Analyzer engine: HTTP client, background submission engine and report rendering.
mod client;
mod engine;
mod render;
mod types;

pub use client::{
    AnalysisApi, ClientSettings, ReqwestAnalysisClient, ANALYZE_PATH, DEFAULT_API_BASE_URL,
    JOB_DESCRIPTION_FIELD, RESUME_FIELD,
};
pub use engine::{EngineError, EngineHandle};
pub use render::{
    Block, BlockKind, MarkdownRenderer, ReportRenderer, RichText, Span, TerminalRenderer,
};
pub use types::{
    AnalysisResponse, AnalysisUpload, ClientError, EngineEvent, FailureKind, HealthStatus,
    ResumeUpload, SubmissionId,
};
