use analyzer_logging::analyzer_debug;

use crate::state::Settlement;
use crate::{
    AnalysisRequest, AnalysisResult, Effect, Msg, SubmissionError, SubmissionId,
    SubmissionState, ValidationError,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: SubmissionState, msg: Msg) -> (SubmissionState, Vec<Effect>) {
    let effects = match msg {
        Msg::FileSelected(file) => {
            if let Some(abandoned) = state.replace_resume(Some(file)) {
                analyzer_debug!("File changed; abandoning submission {}", abandoned);
            }
            Vec::new()
        }
        Msg::FileCleared => {
            if let Some(abandoned) = state.replace_resume(None) {
                analyzer_debug!("File cleared; abandoning submission {}", abandoned);
            }
            Vec::new()
        }
        Msg::JobDescriptionChanged(text) => {
            state.set_job_description(text);
            Vec::new()
        }
        Msg::SubmitClicked => submit(&mut state),
        Msg::AnalysisSucceeded {
            submission_id,
            result,
        } => {
            settle(&mut state, submission_id, Ok(result));
            Vec::new()
        }
        Msg::AnalysisFailed {
            submission_id,
            error,
        } => {
            settle(&mut state, submission_id, Err(error));
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn settle(
    state: &mut SubmissionState,
    submission_id: SubmissionId,
    outcome: Result<AnalysisResult, SubmissionError>,
) {
    match state.settle(submission_id, outcome) {
        Settlement::Applied => {}
        Settlement::Abandoned => {
            analyzer_debug!("Abandoned submission {} finished; outcome dropped", submission_id)
        }
        Settlement::Stale => {
            analyzer_debug!("Dropping stale completion for submission {}", submission_id)
        }
    }
}

fn submit(state: &mut SubmissionState) -> Vec<Effect> {
    // One request on the wire at a time, including one abandoned by a file change.
    if let Some(in_flight) = state.in_flight() {
        analyzer_debug!("Submit ignored; submission {} still in flight", in_flight);
        return Vec::new();
    }

    let request = match build_request(state) {
        Ok(request) => request,
        Err(err) => {
            analyzer_debug!("Submit rejected: {}", err);
            state.reject(SubmissionError::from(err));
            return Vec::new();
        }
    };

    let submission_id = state.begin_submission();
    vec![Effect::SendAnalysis {
        submission_id,
        request,
    }]
}

fn build_request(state: &SubmissionState) -> Result<AnalysisRequest, ValidationError> {
    let resume = state.resume().ok_or(ValidationError::MissingResume)?;
    if !resume.is_pdf() {
        return Err(ValidationError::NotPdf);
    }
    let job_description = Some(state.job_description())
        .filter(|text| !text.is_empty())
        .map(ToOwned::to_owned);

    Ok(AnalysisRequest {
        resume: resume.clone(),
        job_description,
    })
}
