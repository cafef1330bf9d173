use std::sync::{Arc, Mutex};
use std::time::Duration;

use analyzer_engine::{
    AnalysisApi, AnalysisResponse, AnalysisUpload, ClientError, ClientSettings, EngineError,
    EngineEvent, EngineHandle, FailureKind, HealthStatus, ResumeUpload,
};
use bytes::Bytes;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const WAIT: Duration = Duration::from_secs(5);

/// Records uploads and answers from a canned result.
struct FakeApi {
    seen: Mutex<Vec<AnalysisUpload>>,
    reply: Result<AnalysisResponse, ClientError>,
}

impl FakeApi {
    fn new(reply: Result<AnalysisResponse, ClientError>) -> Arc<Self> {
        Arc::new(Self {
            seen: Mutex::new(Vec::new()),
            reply,
        })
    }
}

#[async_trait::async_trait]
impl AnalysisApi for FakeApi {
    async fn analyze(&self, upload: AnalysisUpload) -> Result<AnalysisResponse, ClientError> {
        self.seen.lock().unwrap().push(upload);
        self.reply.clone()
    }

    async fn health(&self) -> Result<HealthStatus, ClientError> {
        Ok(HealthStatus {
            status: "online".to_string(),
            message: String::new(),
        })
    }
}

/// Panics mid-call, as a buggy client implementation would.
struct PanickingApi;

#[async_trait::async_trait]
impl AnalysisApi for PanickingApi {
    async fn analyze(&self, _upload: AnalysisUpload) -> Result<AnalysisResponse, ClientError> {
        panic!("analysis client bug");
    }

    async fn health(&self) -> Result<HealthStatus, ClientError> {
        panic!("health client bug");
    }
}

/// Never answers.
struct StalledApi;

#[async_trait::async_trait]
impl AnalysisApi for StalledApi {
    async fn analyze(&self, _upload: AnalysisUpload) -> Result<AnalysisResponse, ClientError> {
        std::future::pending().await
    }

    async fn health(&self) -> Result<HealthStatus, ClientError> {
        std::future::pending().await
    }
}

fn next_event(engine: &EngineHandle) -> EngineEvent {
    engine
        .recv_timeout(WAIT)
        .expect("engine running")
        .expect("event")
}

fn upload() -> AnalysisUpload {
    AnalysisUpload {
        resume: ResumeUpload {
            file_name: "cv.pdf".to_string(),
            content: Bytes::from_static(b"%PDF"),
        },
        job_description: None,
    }
}

#[test]
fn submission_completion_carries_its_id() {
    let api = FakeApi::new(Ok(AnalysisResponse {
        analysis: "report".to_string(),
    }));
    let engine = EngineHandle::with_api(api.clone()).expect("engine");

    engine.submit(42, upload()).expect("submit");
    let event = next_event(&engine);

    assert_eq!(
        event,
        EngineEvent::SubmissionCompleted {
            submission_id: 42,
            result: Ok(AnalysisResponse {
                analysis: "report".to_string()
            }),
        }
    );
    assert_eq!(api.seen.lock().unwrap().as_slice(), &[upload()]);
    assert!(engine.try_recv().is_none());
}

#[test]
fn failures_are_reported_not_swallowed() {
    let failure = ClientError {
        kind: FailureKind::HttpStatus(503),
        message: "Service Unavailable".to_string(),
        detail: None,
    };
    let engine = EngineHandle::with_api(FakeApi::new(Err(failure.clone()))).expect("engine");

    engine.submit(1, upload()).expect("submit");

    match next_event(&engine) {
        EngineEvent::SubmissionCompleted {
            submission_id,
            result,
        } => {
            assert_eq!(submission_id, 1);
            assert_eq!(result, Err(failure));
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[test]
fn health_check_emits_event() {
    let engine = EngineHandle::with_api(FakeApi::new(Ok(AnalysisResponse {
        analysis: String::new(),
    })))
    .expect("engine");

    engine.check_health().expect("check health");

    match next_event(&engine) {
        EngineEvent::HealthChecked { result } => assert!(result.expect("online").is_online()),
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn engine_drives_real_http_client() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze-resume/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "analysis": "# Fit" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let engine = EngineHandle::new(ClientSettings::with_base_url(server.uri())).expect("engine");
    engine.submit(7, upload()).expect("submit");

    // The engine answers on its own thread; poll without blocking this runtime.
    let mut event = None;
    for _ in 0..100 {
        if let Some(received) = engine.try_recv() {
            event = Some(received);
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    assert_eq!(
        event,
        Some(EngineEvent::SubmissionCompleted {
            submission_id: 7,
            result: Ok(AnalysisResponse {
                analysis: "# Fit".to_string()
            }),
        })
    );
}

#[test]
fn panicking_client_still_completes_the_submission() {
    let engine = EngineHandle::with_api(Arc::new(PanickingApi)).expect("engine");

    engine.submit(3, upload()).expect("submit");

    match next_event(&engine) {
        EngineEvent::SubmissionCompleted {
            submission_id,
            result: Err(err),
        } => {
            assert_eq!(submission_id, 3);
            assert_eq!(err.kind, FailureKind::Network);
            assert!(err.message.contains("analysis task failed"), "{}", err.message);
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[test]
fn shutdown_drops_pending_work_and_reports_stopped() {
    let engine = EngineHandle::with_api(Arc::new(StalledApi)).expect("engine");
    engine.submit(1, upload()).expect("submit");

    engine.shutdown();

    assert!(matches!(
        engine.recv_timeout(WAIT),
        Err(EngineError::Stopped)
    ));
    assert!(matches!(
        engine.submit(2, upload()),
        Err(EngineError::Stopped)
    ));
}

#[test]
fn engine_rejects_bad_base_url() {
    let err = EngineHandle::new(ClientSettings::with_base_url("::not-a-url::"));
    assert!(err.is_err());
}
