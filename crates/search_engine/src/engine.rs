use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use page_logging::page_info;
use thiserror::Error;
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;

use crate::sets::{add_claims, create_permanode, search, ChannelEventSink};
use crate::{
    AttrQuery, ClaimRequest, ConnectionError, ConnectionSettings, EngineEvent, HttpConnection,
    JobId, RequestId, ServerConnection,
};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to start runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("failed to connect: {0}")]
    Connection(#[from] ConnectionError),
}

enum EngineCommand {
    Search {
        request_id: RequestId,
        query: AttrQuery,
    },
    CreatePermanode {
        job_id: JobId,
    },
    AddClaims {
        job_id: JobId,
        permanode: String,
        claims: Vec<ClaimRequest>,
    },
}

/// Runs server operations on a background runtime.
///
/// Commands are fire-and-forget; results come back as [`EngineEvent`]s.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Arc<Mutex<mpsc::Receiver<EngineEvent>>>,
    cancel: CancellationToken,
}

impl EngineHandle {
    /// Discovers the server described by `settings` and starts the engine.
    pub fn connect(settings: &ConnectionSettings) -> Result<Self, EngineError> {
        let runtime = Runtime::new()?;
        let connection = runtime.block_on(HttpConnection::discover(settings))?;
        page_info!("Connected to {}", settings.server_url);
        Ok(Self::spawn(
            runtime,
            Arc::new(connection),
            settings.operation_timeout,
        ))
    }

    pub fn with_connection(
        connection: Arc<dyn ServerConnection>,
        operation_timeout: Duration,
    ) -> Result<Self, EngineError> {
        let runtime = Runtime::new()?;
        Ok(Self::spawn(runtime, connection, operation_timeout))
    }

    fn spawn(
        runtime: Runtime,
        connection: Arc<dyn ServerConnection>,
        operation_timeout: Duration,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let cancel = CancellationToken::new();
        let worker_cancel = cancel.clone();

        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                let connection = connection.clone();
                let event_tx = event_tx.clone();
                let cancel = worker_cancel.clone();
                runtime.spawn(async move {
                    handle_command(
                        connection.as_ref(),
                        command,
                        operation_timeout,
                        &cancel,
                        event_tx,
                    )
                    .await;
                });
            }
        });

        Self {
            cmd_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
            cancel,
        }
    }

    pub fn search(&self, request_id: RequestId, query: AttrQuery) {
        let _ = self
            .cmd_tx
            .send(EngineCommand::Search { request_id, query });
    }

    pub fn create_permanode(&self, job_id: JobId) {
        let _ = self.cmd_tx.send(EngineCommand::CreatePermanode { job_id });
    }

    pub fn add_claims(&self, job_id: JobId, permanode: impl Into<String>, claims: Vec<ClaimRequest>) {
        let _ = self.cmd_tx.send(EngineCommand::AddClaims {
            job_id,
            permanode: permanode.into(),
            claims,
        });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.recv_timeout(timeout).ok()
    }

    /// Cancels all in-flight operations; they settle as cancelled.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

async fn handle_command(
    connection: &dyn ServerConnection,
    command: EngineCommand,
    limit: Duration,
    cancel: &CancellationToken,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let sink = ChannelEventSink::new(event_tx);
    match command {
        EngineCommand::Search { request_id, query } => {
            search(connection, request_id, &query, limit, cancel, &sink).await;
        }
        EngineCommand::CreatePermanode { job_id } => {
            create_permanode(connection, job_id, limit, cancel, &sink).await;
        }
        EngineCommand::AddClaims {
            job_id,
            permanode,
            claims,
        } => {
            add_claims(connection, job_id, &permanode, &claims, limit, cancel, &sink).await;
        }
    }
}
