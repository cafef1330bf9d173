pub const SUBMIT_LABEL: &str = "Analyze Resume";
pub const SUBMITTING_LABEL: &str = "Analyzing...";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubmissionViewModel {
    pub file_name: Option<String>,
    pub file_size: Option<usize>,
    pub job_description: String,
    pub is_submitting: bool,
    /// Submit is offered only with a file selected and nothing in flight.
    pub submit_enabled: bool,
    pub submit_label: &'static str,
    pub error_message: Option<String>,
    /// Markdown report of the last successful submission.
    pub report: Option<String>,
    pub dirty: bool,
}
