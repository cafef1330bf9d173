//! Analyzer core: pure submission state machine and view-model helpers.
mod effect;
mod error;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::{AnalysisRequest, Effect};
pub use error::{SubmissionError, ValidationError, NETWORK_FALLBACK_MESSAGE};
pub use msg::Msg;
pub use state::{AnalysisResult, ResumeFile, SubmissionId, SubmissionState};
pub use update::update;
pub use view_model::{SubmissionViewModel, SUBMITTING_LABEL, SUBMIT_LABEL};
