#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User picked a resume file.
    FileSelected(crate::ResumeFile),
    /// User removed the selected file.
    FileCleared,
    /// User edited the job description text.
    JobDescriptionChanged(String),
    /// User pressed the submit control.
    SubmitClicked,
    /// Engine completion for a submission that returned a report.
    AnalysisSucceeded {
        submission_id: crate::SubmissionId,
        result: crate::AnalysisResult,
    },
    /// Engine completion for a submission that failed.
    AnalysisFailed {
        submission_id: crate::SubmissionId,
        error: crate::SubmissionError,
    },
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
