pub mod state;
pub mod translation;
pub mod utils;
pub mod validation;

pub use state::{Submission, UploadWorkflow, WorkflowState};
pub use translation::{CopyTarget, TranslationClient, TranslationTransport, UploadResult};
pub use utils::{AppConfig, Result, UploadConfig, UploadError};
pub use validation::{CandidateFile, FileValidator, RejectionReason, ValidationVerdict};
