use std::process::ExitCode;
use std::time::Duration;

use analyzer_core::{update, Msg, SubmissionState};
use analyzer_engine::{EngineEvent, EngineHandle};
use analyzer_logging::{analyzer_info, analyzer_warn, level_for_verbosity};
use anyhow::{bail, Context, Result};

use super::effects::EffectRunner;
use super::ui::console::Console;
use super::ui::render::render;
use super::{files, logging};
use crate::cli::Cli;

const POLL_INTERVAL: Duration = Duration::from_millis(75);
const HEALTH_WAIT: Duration = Duration::from_secs(30);

pub fn run_app(args: Cli) -> Result<ExitCode> {
    logging::initialize(level_for_verbosity(args.verbose), args.log_file.as_deref());

    let engine = EngineHandle::new(args.client_settings())
        .context("failed to start the analysis engine")?;
    if args.check {
        return check_health(&engine);
    }

    // Replay the form interaction: pick the file, type the text, press submit.
    let mut script = Vec::new();
    if let Some(path) = &args.resume {
        script.push(Msg::FileSelected(files::load_resume(path)?));
    }
    if let Some(text) = args.job_description_text()? {
        script.push(Msg::JobDescriptionChanged(text));
    }
    script.push(Msg::SubmitClicked);

    let mut session = Session::new(EffectRunner::new(engine), Console::new(args.report_style()));
    for msg in script {
        session.dispatch(msg);
    }
    session.wait_until_settled();
    session.runner.shutdown();

    Ok(if session.state.error().is_some() || session.state.is_submitting() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

struct Session {
    state: SubmissionState,
    runner: EffectRunner,
    console: Console,
}

impl Session {
    fn new(runner: EffectRunner, console: Console) -> Self {
        Self {
            state: SubmissionState::new(),
            runner,
            console,
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        if state.consume_dirty() {
            self.console.apply(render(&state.view()));
        }
        self.state = state;
        self.runner.enqueue(effects);
    }

    fn wait_until_settled(&mut self) {
        while self.state.is_submitting() {
            match self.runner.next_msg(POLL_INTERVAL) {
                Some(msg) => self.dispatch(msg),
                None if self.runner.is_stopped() => {
                    analyzer_warn!("Engine stopped before the submission settled");
                    break;
                }
                None => self.dispatch(Msg::Tick),
            }
        }
    }
}

fn check_health(engine: &EngineHandle) -> Result<ExitCode> {
    engine.check_health()?;
    match engine.recv_timeout(HEALTH_WAIT)? {
        Some(EngineEvent::HealthChecked { result: Ok(status) }) => {
            analyzer_info!("Health check answered: {:?}", status);
            println!("{}: {}", status.status, status.message);
            Ok(if status.is_online() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Some(EngineEvent::HealthChecked { result: Err(err) }) => {
            analyzer_warn!("Health check failed ({}): {}", err.kind, err.message);
            eprintln!("API unreachable: {err}");
            Ok(ExitCode::FAILURE)
        }
        Some(other) => bail!("unexpected engine event during health check: {other:?}"),
        None => bail!(
            "no answer from the analysis API within {}s",
            HEALTH_WAIT.as_secs()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ReportStyle;
    use analyzer_core::{AnalysisResult, ResumeFile};
    use analyzer_engine::ClientSettings;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn session_for(server: &MockServer) -> Session {
        session_at(server.uri())
    }

    fn session_at(base_url: String) -> Session {
        let engine = EngineHandle::new(ClientSettings::with_base_url(base_url)).unwrap();
        Session::new(EffectRunner::new(engine), Console::new(ReportStyle::Raw))
    }

    fn start_submission(session: &mut Session) {
        session.dispatch(Msg::FileSelected(ResumeFile::new(
            "cv.pdf",
            b"%PDF-1.4".to_vec(),
        )));
        session.dispatch(Msg::SubmitClicked);
        assert!(session.state.is_submitting());
    }

    fn submit_resume(mut session: Session) -> Session {
        start_submission(&mut session);
        session.wait_until_settled();
        session
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn full_cycle_stores_report() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/analyze-resume/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(r#"{"analysis":"**Hello**"}"#, "application/json"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let session = session_for(&server);
        let session = tokio::task::spawn_blocking(move || submit_resume(session))
            .await
            .unwrap();

        assert!(!session.state.is_submitting());
        assert_eq!(session.state.result(), Some(&AnalysisResult::new("**Hello**")));
        assert_eq!(session.state.error(), None);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn server_error_surfaces_status_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/analyze-resume/"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let session = session_for(&server);
        let session = tokio::task::spawn_blocking(move || submit_resume(session))
            .await
            .unwrap();

        assert!(!session.state.is_submitting());
        assert_eq!(session.state.result(), None);
        let message = session.state.view().error_message.unwrap();
        assert!(message.contains("Internal Server Error"), "{message}");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn submit_without_resume_never_reaches_the_api() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut session = session_for(&server);
        session.dispatch(Msg::SubmitClicked);
        session.wait_until_settled();

        assert_eq!(
            session.state.view().error_message.as_deref(),
            Some("Please upload a resume PDF file")
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn unreachable_api_settles_with_network_error() {
        // Bind then drop to get a local port with nothing listening.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let session = session_at(format!("http://127.0.0.1:{port}"));
        let session = tokio::task::spawn_blocking(move || submit_resume(session))
            .await
            .unwrap();

        assert!(!session.state.is_submitting());
        assert_eq!(session.state.result(), None);
        let message = session.state.view().error_message.unwrap();
        assert!(!message.trim().is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn engine_stopping_mid_flight_settles_with_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/analyze-resume/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_secs(30))
                    .set_body_raw(r#"{"analysis":"late"}"#, "application/json"),
            )
            .mount(&server)
            .await;

        let mut session = session_for(&server);
        let session = tokio::task::spawn_blocking(move || {
            start_submission(&mut session);
            session.runner.shutdown();
            session.wait_until_settled();
            session
        })
        .await
        .unwrap();

        assert!(!session.state.is_submitting());
        assert_eq!(session.state.result(), None);
        assert_eq!(
            session.state.view().error_message.as_deref(),
            Some("analysis engine has stopped")
        );
        assert!(session.runner.is_stopped());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn submit_after_engine_stopped_fails_without_hanging() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut session = session_for(&server);
        let session = tokio::task::spawn_blocking(move || {
            session.runner.shutdown();
            // Drain until the engine reports it is gone.
            while !session.runner.is_stopped() {
                assert_eq!(session.runner.next_msg(POLL_INTERVAL), None);
            }
            start_submission(&mut session);
            session.wait_until_settled();
            session
        })
        .await
        .unwrap();

        assert!(!session.state.is_submitting());
        assert!(session.state.error().is_some());
    }
}
