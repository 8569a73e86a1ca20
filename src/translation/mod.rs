pub mod client;
pub mod response;

pub use client::{TranslationClient, TranslationTransport};
pub use response::{
    extract_error_message, failure_message, parse_upload_result, CopyTarget, UploadResult,
    GENERIC_FAILURE_MESSAGE,
};
