pub mod workflow;

pub use workflow::{Submission, UploadWorkflow};

use crate::translation::UploadResult;
use crate::utils::UploadError;

/// Phase of an upload as seen by whoever renders it.
///
/// Exactly one phase holds at a time, so a result and an error can never
/// coexist and neither terminal phase is ever "still loading".
#[derive(Debug, Clone, PartialEq, Default)]
pub enum WorkflowState {
    #[default]
    Idle,
    Loading,
    Succeeded(UploadResult),
    Failed(UploadError),
}

impl WorkflowState {
    pub fn label(&self) -> &'static str {
        match self {
            WorkflowState::Idle => "idle",
            WorkflowState::Loading => "loading",
            WorkflowState::Succeeded(_) => "succeeded",
            WorkflowState::Failed(_) => "failed",
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, WorkflowState::Loading)
    }

    pub fn is_settled(&self) -> bool {
        matches!(self, WorkflowState::Succeeded(_) | WorkflowState::Failed(_))
    }

    pub fn result(&self) -> Option<&UploadResult> {
        match self {
            WorkflowState::Succeeded(result) => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&UploadError> {
        match self {
            WorkflowState::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<String> {
        self.error().map(ToString::to_string)
    }
}
