use std::io;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use analyzer_logging::analyzer_debug;
use thiserror::Error;

use crate::client::{AnalysisApi, ClientSettings, ReqwestAnalysisClient};
use crate::{AnalysisUpload, ClientError, EngineEvent, FailureKind, SubmissionId};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to start engine runtime: {0}")]
    Runtime(#[from] io::Error),
    #[error("failed to configure http client: {0}")]
    Client(#[from] ClientError),
    #[error("analysis engine has stopped")]
    Stopped,
}

enum EngineCommand {
    Submit {
        submission_id: SubmissionId,
        upload: AnalysisUpload,
    },
    CheckHealth,
    Shutdown,
}

/// Runs API calls on a background thread with its own tokio runtime.
///
/// Requests are never aborted while the engine runs. Dropping the handle stops
/// accepting commands and any completion that arrives afterwards has nowhere
/// to go. `shutdown` tears the runtime down, dropping requests still pending.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: ClientSettings) -> Result<Self, EngineError> {
        let api = Arc::new(ReqwestAnalysisClient::new(settings)?);
        Self::with_api(api)
    }

    pub fn with_api(api: Arc<dyn AnalysisApi>) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Runtime::new()?;

        thread::Builder::new()
            .name("analyzer-engine".to_string())
            .spawn(move || {
                while let Ok(command) = cmd_rx.recv() {
                    if matches!(command, EngineCommand::Shutdown) {
                        analyzer_debug!("Engine shutdown requested");
                        break;
                    }
                    let api = api.clone();
                    let event_tx = event_tx.clone();
                    runtime.spawn(async move {
                        handle_command(api, command, event_tx).await;
                    });
                }
                // Refuse commands, cancel pending tasks, then release the last sender.
                drop(cmd_rx);
                drop(runtime);
                drop(event_tx);
                analyzer_debug!("Engine stopped");
            })?;

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn submit(
        &self,
        submission_id: SubmissionId,
        upload: AnalysisUpload,
    ) -> Result<(), EngineError> {
        self.send(EngineCommand::Submit {
            submission_id,
            upload,
        })
    }

    pub fn check_health(&self) -> Result<(), EngineError> {
        self.send(EngineCommand::CheckHealth)
    }

    /// Stops the engine thread. Pending requests are dropped without an event,
    /// after which receiving reports `EngineError::Stopped`.
    pub fn shutdown(&self) {
        if self.send(EngineCommand::Shutdown).is_err() {
            analyzer_debug!("Engine already stopped");
        }
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Waits for the next event. `Ok(None)` means the wait timed out; an error
    /// means no event can ever arrive.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<EngineEvent>, EngineError> {
        match self.event_rx.recv_timeout(timeout) {
            Ok(event) => Ok(Some(event)),
            Err(mpsc::RecvTimeoutError::Timeout) => Ok(None),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(EngineError::Stopped),
        }
    }

    fn send(&self, command: EngineCommand) -> Result<(), EngineError> {
        self.cmd_tx.send(command).map_err(|_| EngineError::Stopped)
    }
}

async fn handle_command(
    api: Arc<dyn AnalysisApi>,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let event = match command {
        EngineCommand::Submit {
            submission_id,
            upload,
        } => {
            analyzer_debug!("Submission {} started", submission_id);
            // A panicking call still has to answer, or the caller waits forever.
            let call = tokio::spawn(async move { api.analyze(upload).await });
            let result = call.await.unwrap_or_else(|err| Err(task_failure(err)));
            EngineEvent::SubmissionCompleted {
                submission_id,
                result,
            }
        }
        EngineCommand::CheckHealth => {
            let call = tokio::spawn(async move { api.health().await });
            EngineEvent::HealthChecked {
                result: call.await.unwrap_or_else(|err| Err(task_failure(err))),
            }
        }
        EngineCommand::Shutdown => return,
    };
    if event_tx.send(event).is_err() {
        analyzer_debug!("Engine event dropped; handle is gone");
    }
}

fn task_failure(err: tokio::task::JoinError) -> ClientError {
    ClientError::new(FailureKind::Network, format!("analysis task failed: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dead_channels_report_stopped() {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel::<EngineEvent>();
        drop(cmd_rx);
        drop(event_tx);
        let engine = EngineHandle { cmd_tx, event_rx };

        assert!(matches!(engine.check_health(), Err(EngineError::Stopped)));
        assert!(matches!(
            engine.recv_timeout(Duration::from_millis(10)),
            Err(EngineError::Stopped)
        ));
        engine.shutdown();
    }
}
