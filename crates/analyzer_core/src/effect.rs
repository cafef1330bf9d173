use crate::{ResumeFile, SubmissionId};

/// Side effects requested by [`crate::update`]; executed by the front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SendAnalysis {
        submission_id: SubmissionId,
        request: AnalysisRequest,
    },
}

/// Payload of a single analysis submission.
///
/// `job_description` is `None` when the user left the text empty, in which
/// case the field is omitted from the request body altogether.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub resume: ResumeFile,
    pub job_description: Option<String>,
}
