use std::sync::Arc;

use crate::view_model::{SubmissionViewModel, SUBMITTING_LABEL, SUBMIT_LABEL};
use crate::SubmissionError;

pub type SubmissionId = u64;

/// A resume blob held in memory together with the name it was picked under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeFile {
    file_name: String,
    bytes: Arc<[u8]>,
}

impl ResumeFile {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The blob as a shared handle, for handing to an upload without copying.
    pub fn shared_bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn is_pdf(&self) -> bool {
        self.file_name.to_ascii_lowercase().ends_with(".pdf")
    }
}

/// Report returned by the analysis API; markdown, never inspected here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisResult {
    pub analysis_text: String,
}

impl AnalysisResult {
    pub fn new(analysis_text: impl Into<String>) -> Self {
        Self {
            analysis_text: analysis_text.into(),
        }
    }
}

// A single slot keeps "result and error never both set" structural.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Outcome {
    Analyzed(AnalysisResult),
    Failed(SubmissionError),
}

/// The request currently on the wire. An abandoned request still blocks new
/// submissions until it completes; its payload is then discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct InFlight {
    submission_id: SubmissionId,
    abandoned: bool,
}

/// What `settle` did with a completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Settlement {
    Applied,
    /// The request completed after its file was replaced; payload dropped.
    Abandoned,
    /// Not the request in flight.
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubmissionState {
    resume: Option<ResumeFile>,
    job_description: String,
    in_flight: Option<InFlight>,
    last_submission_id: SubmissionId,
    outcome: Option<Outcome>,
    dirty: bool,
}

impl SubmissionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> SubmissionViewModel {
        let is_submitting = self.is_submitting();
        SubmissionViewModel {
            file_name: self.resume.as_ref().map(|file| file.file_name().to_string()),
            file_size: self.resume.as_ref().map(ResumeFile::len),
            job_description: self.job_description.clone(),
            is_submitting,
            submit_enabled: self.resume.is_some() && !is_submitting,
            submit_label: if is_submitting {
                SUBMITTING_LABEL
            } else {
                SUBMIT_LABEL
            },
            error_message: self.error().map(ToString::to_string),
            report: self.result().map(|result| result.analysis_text.clone()),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything visible changed since the last call, and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn resume(&self) -> Option<&ResumeFile> {
        self.resume.as_ref()
    }

    pub fn job_description(&self) -> &str {
        &self.job_description
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Id of the request still outstanding, abandoned or not.
    pub fn in_flight(&self) -> Option<SubmissionId> {
        self.in_flight.map(|in_flight| in_flight.submission_id)
    }

    /// Whether the outstanding request belongs to a file that was since replaced.
    pub fn is_abandoned(&self) -> bool {
        self.in_flight.is_some_and(|in_flight| in_flight.abandoned)
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match &self.outcome {
            Some(Outcome::Analyzed(result)) => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&SubmissionError> {
        match &self.outcome {
            Some(Outcome::Failed(err)) => Some(err),
            _ => None,
        }
    }

    /// Swaps the selected file and resets the view.
    ///
    /// Returns the id of an in-flight submission newly abandoned by the swap. It
    /// keeps the controller submitting until its completion arrives.
    pub(crate) fn replace_resume(&mut self, resume: Option<ResumeFile>) -> Option<SubmissionId> {
        self.resume = resume;
        self.outcome = None;
        self.dirty = true;
        match &mut self.in_flight {
            Some(in_flight) if !in_flight.abandoned => {
                in_flight.abandoned = true;
                Some(in_flight.submission_id)
            }
            _ => None,
        }
    }

    pub(crate) fn set_job_description(&mut self, text: String) {
        if self.job_description != text {
            self.job_description = text;
            self.dirty = true;
        }
    }

    /// Marks a new submission as in flight. A prior report stays visible until
    /// the new one settles; a prior error is cleared.
    pub(crate) fn begin_submission(&mut self) -> SubmissionId {
        self.last_submission_id += 1;
        let submission_id = self.last_submission_id;
        self.in_flight = Some(InFlight {
            submission_id,
            abandoned: false,
        });
        if matches!(self.outcome, Some(Outcome::Failed(_))) {
            self.outcome = None;
        }
        self.dirty = true;
        submission_id
    }

    pub(crate) fn reject(&mut self, err: SubmissionError) {
        self.outcome = Some(Outcome::Failed(err));
        self.dirty = true;
    }

    /// Applies a completion for the request in flight. An abandoned request
    /// only releases the submitting flag.
    pub(crate) fn settle(
        &mut self,
        submission_id: SubmissionId,
        outcome: Result<AnalysisResult, SubmissionError>,
    ) -> Settlement {
        let Some(in_flight) = self.in_flight else {
            return Settlement::Stale;
        };
        if in_flight.submission_id != submission_id {
            return Settlement::Stale;
        }
        self.in_flight = None;
        self.dirty = true;
        if in_flight.abandoned {
            return Settlement::Abandoned;
        }
        self.outcome = Some(match outcome {
            Ok(result) => Outcome::Analyzed(result),
            Err(err) => Outcome::Failed(err),
        });
        Settlement::Applied
    }
}
