use async_trait::async_trait;
use image_translate_client::{
    CandidateFile, RejectionReason, Result, TranslationTransport, UploadConfig, UploadError,
    UploadResult, UploadWorkflow, WorkflowState,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

const MIB: usize = 1024 * 1024;

/// Transport whose responses are released by the test, keyed by file name.
#[derive(Default)]
struct ScriptedTransport {
    gates: Mutex<HashMap<String, oneshot::Receiver<Result<UploadResult>>>>,
    calls: AtomicUsize,
}

impl ScriptedTransport {
    fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn gate(&self, file_name: &str) -> oneshot::Sender<Result<UploadResult>> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(file_name.to_string(), rx);
        tx
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranslationTransport for ScriptedTransport {
    async fn upload(&self, file: CandidateFile) -> Result<UploadResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.gates.lock().unwrap().remove(&file.file_name);
        match gate {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(UploadError::transport("gate dropped"))),
            None => Err(UploadError::transport("no scripted response")),
        }
    }
}

fn workflow(transport: &Arc<ScriptedTransport>) -> UploadWorkflow {
    UploadWorkflow::with_transport(&UploadConfig::default(), transport.clone())
}

fn jpeg(name: &str, size: usize) -> CandidateFile {
    CandidateFile::new(name, "image/jpeg", vec![0u8; size])
}

#[tokio::test]
async fn accepted_upload_succeeds_with_fields_intact() {
    let transport = ScriptedTransport::new();
    let workflow = workflow(&transport);
    let gate = transport.gate("scan.jpg");

    let file = jpeg("scan.jpg", 2 * MIB);
    assert!(workflow.validate(&file).is_accepted());

    let submission = workflow.submit(file);
    assert_eq!(workflow.current_state(), WorkflowState::Loading);

    gate.send(Ok(UploadResult::new("ব্যাখ্যা", "explanation"))).unwrap();
    submission.settled().await;

    let state = workflow.current_state();
    let result = state.result().expect("succeeded");
    assert_eq!(result.source_text.as_bytes(), "ব্যাখ্যা".as_bytes());
    assert_eq!(result.translated_text, "explanation");
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn rejected_type_fails_without_network() {
    let transport = ScriptedTransport::new();
    let workflow = workflow(&transport);

    let file = CandidateFile::new("notes.txt", "text/plain", vec![b'a'; 10 * 1024]);
    let submission = workflow.submit(file);

    let state = workflow.current_state();
    assert!(!state.is_loading());
    assert!(matches!(
        state,
        WorkflowState::Failed(UploadError::Validation {
            reason: RejectionReason::InvalidType { .. }
        })
    ));

    submission.settled().await;
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn oversized_image_fails_as_too_large() {
    let transport = ScriptedTransport::new();
    let workflow = workflow(&transport);

    workflow.submit(jpeg("big.jpg", 6 * MIB)).settled().await;

    assert!(matches!(
        workflow.current_state(),
        WorkflowState::Failed(UploadError::Validation {
            reason: RejectionReason::TooLarge { .. }
        })
    ));
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn server_error_message_becomes_failure() {
    let transport = ScriptedTransport::new();
    let workflow = workflow(&transport);
    let gate = transport.gate("scan.jpg");

    let submission = workflow.submit(jpeg("scan.jpg", 1024));
    gate.send(Err(UploadError::transport("server busy"))).unwrap();
    submission.settled().await;

    let state = workflow.current_state();
    assert_eq!(state.error_message().as_deref(), Some("server busy"));
    assert!(state.result().is_none());
}

#[tokio::test]
async fn malformed_response_does_not_succeed() {
    let transport = ScriptedTransport::new();
    let workflow = workflow(&transport);
    let gate = transport.gate("scan.jpg");

    let submission = workflow.submit(jpeg("scan.jpg", 1024));
    gate.send(Err(UploadError::malformed("missing field 'translatedText'")))
        .unwrap();
    submission.settled().await;

    assert!(matches!(
        workflow.current_state(),
        WorkflowState::Failed(UploadError::MalformedResponse { .. })
    ));
}

#[tokio::test]
async fn resubmitting_clears_previous_result() {
    let transport = ScriptedTransport::new();
    let workflow = workflow(&transport);

    let first = transport.gate("one.jpg");
    let submission = workflow.submit(jpeg("one.jpg", 10));
    first.send(Ok(UploadResult::new("a", "b"))).unwrap();
    submission.settled().await;
    assert!(workflow.current_state().result().is_some());

    let _second = transport.gate("two.jpg");
    workflow.submit(jpeg("two.jpg", 10));
    let state = workflow.current_state();
    assert!(state.is_loading());
    assert!(state.result().is_none());
    assert!(state.error().is_none());
}

#[tokio::test]
async fn failure_is_recoverable_by_next_submit() {
    let transport = ScriptedTransport::new();
    let workflow = workflow(&transport);

    let failing = transport.gate("one.jpg");
    let submission = workflow.submit(jpeg("one.jpg", 10));
    failing.send(Err(UploadError::transport("Upload failed"))).unwrap();
    submission.settled().await;
    assert!(workflow.current_state().error().is_some());

    let ok = transport.gate("two.jpg");
    let submission = workflow.submit(jpeg("two.jpg", 10));
    ok.send(Ok(UploadResult::new("x", "y"))).unwrap();
    submission.settled().await;
    assert_eq!(
        workflow.current_state(),
        WorkflowState::Succeeded(UploadResult::new("x", "y"))
    );
}

#[tokio::test]
async fn late_response_from_superseded_request_is_discarded() {
    let transport = ScriptedTransport::new();
    let workflow = workflow(&transport);
    let gate_a = transport.gate("a.jpg");
    let gate_b = transport.gate("b.jpg");

    let a = workflow.submit(jpeg("a.jpg", 10));
    let b = workflow.submit(jpeg("b.jpg", 10));
    assert!(b.seq() > a.seq());

    gate_b.send(Ok(UploadResult::new("from b", "B"))).unwrap();
    b.settled().await;
    let _ = gate_a.send(Ok(UploadResult::new("from a", "A")));
    a.settled().await;

    assert_eq!(
        workflow.current_state(),
        WorkflowState::Succeeded(UploadResult::new("from b", "B"))
    );
}

#[tokio::test]
async fn early_response_from_superseded_request_keeps_loading() {
    let transport = ScriptedTransport::new();
    let workflow = workflow(&transport);
    let gate_a = transport.gate("a.jpg");
    let gate_b = transport.gate("b.jpg");

    let a = workflow.submit(jpeg("a.jpg", 10));
    let b = workflow.submit(jpeg("b.jpg", 10));

    let _ = gate_a.send(Err(UploadError::transport("stale failure")));
    a.settled().await;
    assert_eq!(workflow.current_state(), WorkflowState::Loading);

    gate_b.send(Err(UploadError::transport("server busy"))).unwrap();
    b.settled().await;
    assert_eq!(
        workflow.current_state().error_message().as_deref(),
        Some("server busy")
    );
}

#[tokio::test]
async fn superseded_request_is_aborted() {
    let transport = ScriptedTransport::new();
    let workflow = workflow(&transport);
    let gate_a = transport.gate("a.jpg");
    let gate_b = transport.gate("b.jpg");

    let a = workflow.submit(jpeg("a.jpg", 10));
    while transport.calls() < 1 {
        tokio::task::yield_now().await;
    }
    assert!(!gate_a.is_closed());

    let b = workflow.submit(jpeg("b.jpg", 10));
    a.settled().await;
    assert!(gate_a.is_closed());
    assert_eq!(workflow.current_state(), WorkflowState::Loading);

    gate_b.send(Ok(UploadResult::new("s", "t"))).unwrap();
    b.settled().await;
    assert_eq!(
        workflow.current_state(),
        WorkflowState::Succeeded(UploadResult::new("s", "t"))
    );
}

#[tokio::test]
async fn rejected_submit_supersedes_pending_request() {
    let transport = ScriptedTransport::new();
    let workflow = workflow(&transport);
    let gate = transport.gate("a.jpg");

    let a = workflow.submit(jpeg("a.jpg", 10));
    workflow.submit(CandidateFile::declared("image/gif", 10));

    let _ = gate.send(Ok(UploadResult::new("late", "late")));
    a.settled().await;

    assert!(matches!(
        workflow.current_state(),
        WorkflowState::Failed(UploadError::Validation { .. })
    ));
}

#[tokio::test]
async fn cancel_returns_to_idle_and_ignores_settlement() {
    let transport = ScriptedTransport::new();
    let workflow = workflow(&transport);
    let gate = transport.gate("a.jpg");

    let submission = workflow.submit(jpeg("a.jpg", 10));
    let seq_before = workflow.latest_seq();
    assert!(workflow.cancel());
    assert_eq!(workflow.current_state(), WorkflowState::Idle);
    assert!(workflow.latest_seq() > seq_before);

    let _ = gate.send(Ok(UploadResult::new("late", "late")));
    submission.settled().await;
    assert_eq!(workflow.current_state(), WorkflowState::Idle);
}

#[tokio::test]
async fn cancel_outside_loading_is_a_no_op() {
    let transport = ScriptedTransport::new();
    let workflow = workflow(&transport);

    assert!(!workflow.cancel());
    assert_eq!(workflow.current_state(), WorkflowState::Idle);

    workflow.submit(CandidateFile::declared("text/plain", 1));
    assert!(!workflow.cancel());
    assert!(workflow.current_state().error().is_some());
}

#[tokio::test]
async fn timeout_is_reported_as_transport_failure() {
    let transport = ScriptedTransport::new();
    let config = UploadConfig::default().with_timeout_ms(Some(50));
    let workflow = UploadWorkflow::with_transport(&config, transport.clone());
    let _held_open = transport.gate("slow.jpg");

    workflow.submit(jpeg("slow.jpg", 10)).settled().await;

    assert_eq!(
        workflow.current_state(),
        WorkflowState::Failed(UploadError::transport("Upload failed"))
    );
}

#[tokio::test]
async fn subscribers_observe_transitions() {
    let transport = ScriptedTransport::new();
    let workflow = workflow(&transport);
    let mut rx = workflow.subscribe();
    let gate = transport.gate("a.jpg");

    let submission = workflow.submit(jpeg("a.jpg", 10));
    rx.changed().await.unwrap();
    assert!(rx.borrow_and_update().is_loading());

    gate.send(Ok(UploadResult::new("s", "t"))).unwrap();
    submission.settled().await;
    rx.changed().await.unwrap();
    assert_eq!(rx.borrow().label(), "succeeded");
}

#[test]
fn submit_without_runtime_fails_instead_of_hanging() {
    let transport = ScriptedTransport::new();
    let workflow = workflow(&transport);

    workflow.submit(jpeg("a.jpg", 10));

    let state = workflow.current_state();
    assert!(!state.is_loading());
    assert!(matches!(state, WorkflowState::Failed(UploadError::Transport { .. })));
    assert_eq!(transport.calls(), 0);
}
