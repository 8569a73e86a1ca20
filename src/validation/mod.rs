pub mod file;
pub mod validator;

pub use file::{media_type_for_path, CandidateFile};
pub use validator::{FileValidator, RejectionReason, ValidationVerdict};
