use std::collections::VecDeque;
use std::time::Duration;

use analyzer_core::{AnalysisRequest, AnalysisResult, Effect, Msg, SubmissionError, SubmissionId};
use analyzer_engine::{
    AnalysisResponse, AnalysisUpload, ClientError, EngineError, EngineEvent, EngineHandle,
    FailureKind, ResumeUpload,
};
use analyzer_logging::{analyzer_debug, analyzer_info, analyzer_warn};
use bytes::Bytes;

/// Executes reducer effects on the engine and turns engine events back into messages.
///
/// Every submission handed to the engine is answered exactly once: by its
/// completion, or by a failure when the engine stops first.
pub struct EffectRunner {
    engine: EngineHandle,
    outstanding: Vec<SubmissionId>,
    backlog: VecDeque<Msg>,
    stopped: bool,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle) -> Self {
        Self {
            engine,
            outstanding: Vec::new(),
            backlog: VecDeque::new(),
            stopped: false,
        }
    }

    /// True once the engine is gone and every failure it caused has been handed out.
    pub fn is_stopped(&self) -> bool {
        self.stopped && self.backlog.is_empty()
    }

    pub fn shutdown(&self) {
        self.engine.shutdown();
    }

    pub fn enqueue(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::SendAnalysis {
                    submission_id,
                    request,
                } => {
                    analyzer_info!(
                        "SendAnalysis submission_id={} file={} job_description_len={}",
                        submission_id,
                        request.resume.file_name(),
                        request.job_description.as_ref().map_or(0, String::len)
                    );
                    match self.engine.submit(submission_id, to_upload(request)) {
                        Ok(()) => self.outstanding.push(submission_id),
                        Err(err) => {
                            analyzer_warn!("Submission {} not sent: {}", submission_id, err);
                            self.backlog.push_back(engine_failure(submission_id, &err));
                        }
                    }
                }
            }
        }
    }

    /// Waits up to `timeout` for the next engine event that maps to a message.
    pub fn next_msg(&mut self, timeout: Duration) -> Option<Msg> {
        if let Some(msg) = self.backlog.pop_front() {
            return Some(msg);
        }
        if self.stopped {
            return None;
        }
        match self.engine.recv_timeout(timeout) {
            Ok(Some(EngineEvent::SubmissionCompleted {
                submission_id,
                result,
            })) => {
                self.outstanding.retain(|id| *id != submission_id);
                Some(completion_msg(submission_id, result))
            }
            Ok(Some(EngineEvent::HealthChecked { result })) => {
                analyzer_debug!("Ignoring health check result: {:?}", result);
                None
            }
            Ok(None) => None,
            Err(err) => {
                analyzer_warn!(
                    "Engine stopped with {} submission(s) outstanding",
                    self.outstanding.len()
                );
                self.stopped = true;
                self.backlog.extend(
                    self.outstanding
                        .drain(..)
                        .map(|submission_id| engine_failure(submission_id, &err)),
                );
                self.backlog.pop_front()
            }
        }
    }
}

fn engine_failure(submission_id: SubmissionId, err: &EngineError) -> Msg {
    Msg::AnalysisFailed {
        submission_id,
        error: SubmissionError::network(err.to_string()),
    }
}

fn to_upload(request: AnalysisRequest) -> AnalysisUpload {
    AnalysisUpload {
        resume: ResumeUpload {
            file_name: request.resume.file_name().to_string(),
            content: Bytes::from_owner(request.resume.shared_bytes()),
        },
        job_description: request.job_description,
    }
}

fn completion_msg(
    submission_id: SubmissionId,
    result: Result<AnalysisResponse, ClientError>,
) -> Msg {
    match result {
        Ok(response) => Msg::AnalysisSucceeded {
            submission_id,
            result: AnalysisResult::new(response.analysis),
        },
        Err(err) => Msg::AnalysisFailed {
            submission_id,
            error: submission_error(err),
        },
    }
}

fn submission_error(err: ClientError) -> SubmissionError {
    match err.kind {
        FailureKind::HttpStatus(status) => SubmissionError::transport(status, err.message),
        _ => SubmissionError::network(err.message),
    }
}
