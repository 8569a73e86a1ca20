use crate::state::WorkflowState;
use crate::translation::{
    TranslationClient, TranslationTransport, UploadResult, GENERIC_FAILURE_MESSAGE,
};
use crate::utils::{Result, UploadConfig, UploadError};
use crate::validation::{CandidateFile, FileValidator, ValidationVerdict};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, info, warn};

/// Drives one image at a time through validate -> upload -> settle.
///
/// Policy for overlapping submits is last-submit-wins: every `submit` takes a
/// fresh sequence number, and a settlement is applied only while its number is
/// still the latest one. A superseded request is aborted, and any outcome it
/// still produces is dropped.
#[derive(Clone)]
pub struct UploadWorkflow {
    validator: FileValidator,
    transport: Arc<dyn TranslationTransport>,
    timeout: Option<Duration>,
    shared: Arc<Shared>,
}

struct Shared {
    inner: Mutex<Inner>,
    state_tx: watch::Sender<WorkflowState>,
}

#[derive(Default)]
struct Inner {
    latest_seq: u64,
    in_flight: Option<AbortHandle>,
}

/// Handle for a single `submit` call.
#[derive(Debug)]
pub struct Submission {
    seq: u64,
    settle: Option<JoinHandle<()>>,
}

impl Submission {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Waits until this request has settled, whether or not its outcome was applied.
    pub async fn settled(self) {
        if let Some(handle) = self.settle {
            let _ = handle.await;
        }
    }
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn settle(&self, seq: u64, outcome: Result<UploadResult>) -> bool {
        let mut inner = self.lock();
        if inner.latest_seq != seq {
            debug!(seq, latest = inner.latest_seq, "Discarding stale settlement");
            return false;
        }
        inner.in_flight = None;

        let next = match outcome {
            Ok(result) => {
                info!(seq, "Upload succeeded");
                WorkflowState::Succeeded(result)
            }
            Err(e) => {
                warn!(seq, kind = e.kind(), error = %e, "Upload failed");
                WorkflowState::Failed(e)
            }
        };
        self.state_tx.send_replace(next);
        true
    }
}

impl UploadWorkflow {
    pub fn new(
        validator: FileValidator,
        transport: Arc<dyn TranslationTransport>,
        timeout: Option<Duration>,
    ) -> Self {
        let (state_tx, _) = watch::channel(WorkflowState::Idle);

        Self {
            validator,
            transport,
            timeout,
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner::default()),
                state_tx,
            }),
        }
    }

    pub fn from_config(config: &UploadConfig) -> Result<Self> {
        let client = TranslationClient::new(config)?;
        Ok(Self::with_transport(config, Arc::new(client)))
    }

    pub fn with_transport(config: &UploadConfig, transport: Arc<dyn TranslationTransport>) -> Self {
        Self::new(
            FileValidator::from_config(config),
            transport,
            config.timeout_ms.map(Duration::from_millis),
        )
    }

    pub fn validator(&self) -> &FileValidator {
        &self.validator
    }

    pub fn validate(&self, file: &CandidateFile) -> ValidationVerdict {
        self.validator.validate(file)
    }

    pub fn current_state(&self) -> WorkflowState {
        self.shared.state_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<WorkflowState> {
        self.shared.state_tx.subscribe()
    }

    pub fn latest_seq(&self) -> u64 {
        self.shared.lock().latest_seq
    }

    /// Starts an upload and returns immediately.
    ///
    /// A rejected file moves straight to `Failed` without touching the network.
    /// An accepted file moves to `Loading` and is sent from a spawned task on the
    /// current tokio runtime.
    pub fn submit(&self, file: CandidateFile) -> Submission {
        let verdict = self.validator.validate(&file);

        let mut inner = self.shared.lock();
        inner.latest_seq += 1;
        let seq = inner.latest_seq;
        if let Some(superseded) = inner.in_flight.take() {
            debug!(seq, "Aborting superseded upload");
            superseded.abort();
        }

        if let ValidationVerdict::Rejected(reason) = verdict {
            info!(seq, media_type = %file.media_type, size = file.size, reason = %reason, "File rejected");
            self.shared
                .state_tx
                .send_replace(WorkflowState::Failed(reason.into()));
            return Submission { seq, settle: None };
        }

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                warn!(seq, error = %e, "No async runtime to run the upload on");
                self.shared
                    .state_tx
                    .send_replace(WorkflowState::Failed(UploadError::transport(
                        GENERIC_FAILURE_MESSAGE,
                    )));
                return Submission { seq, settle: None };
            }
        };

        info!(seq, media_type = %file.media_type, size = file.size, "Submitting upload");
        self.shared.state_tx.send_replace(WorkflowState::Loading);

        let transport = Arc::clone(&self.transport);
        let timeout = self.timeout;
        let request = runtime.spawn(async move {
            let call = transport.upload(file);
            match timeout {
                Some(limit) => tokio::time::timeout(limit, call).await.unwrap_or_else(|_| {
                    warn!(seq, timeout_ms = limit.as_millis() as u64, "Upload timed out");
                    Err(UploadError::transport(GENERIC_FAILURE_MESSAGE))
                }),
                None => call.await,
            }
        });
        inner.in_flight = Some(request.abort_handle());
        drop(inner);

        let shared = Arc::clone(&self.shared);
        let settle = runtime.spawn(async move {
            let outcome = match request.await {
                Ok(outcome) => outcome,
                Err(e) if e.is_cancelled() => {
                    debug!(seq, "Upload task cancelled");
                    return;
                }
                Err(e) => {
                    warn!(seq, error = %e, "Upload task failed");
                    Err(UploadError::transport(GENERIC_FAILURE_MESSAGE))
                }
            };
            shared.settle(seq, outcome);
        });

        Submission {
            seq,
            settle: Some(settle),
        }
    }

    /// Abandons the in-flight request, if any, and returns to `Idle`.
    pub fn cancel(&self) -> bool {
        let mut inner = self.shared.lock();
        if !self.shared.state_tx.borrow().is_loading() {
            return false;
        }

        inner.latest_seq += 1;
        if let Some(handle) = inner.in_flight.take() {
            handle.abort();
        }
        info!(seq = inner.latest_seq, "Upload cancelled");
        self.shared.state_tx.send_replace(WorkflowState::Idle);
        true
    }
}
