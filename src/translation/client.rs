use crate::translation::response::{
    failure_message, parse_upload_result, UploadResult, GENERIC_FAILURE_MESSAGE,
};
use crate::utils::{Result, UploadConfig, UploadError};
use crate::validation::CandidateFile;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tracing::{debug, warn};

pub const FILE_FIELD: &str = "file";

/// The outbound half of the workflow: one request per call, no retries.
#[async_trait]
pub trait TranslationTransport: Send + Sync {
    async fn upload(&self, file: CandidateFile) -> Result<UploadResult>;
}

pub struct TranslationClient {
    client: Client,
    endpoint_url: String,
}

impl TranslationClient {
    pub fn new(config: &UploadConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .user_agent(concat!("image-translate-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| UploadError::Config(e.to_string()))?;

        Ok(Self {
            client,
            endpoint_url: config.endpoint_url.clone(),
        })
    }

    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }

    fn build_form(file: CandidateFile) -> Result<Form> {
        let part = Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str(&file.media_type)
            .map_err(|e| {
                warn!(error = %e, "Invalid media type for upload part");
                UploadError::transport(GENERIC_FAILURE_MESSAGE)
            })?;

        Ok(Form::new().part(FILE_FIELD, part))
    }
}

#[async_trait]
impl TranslationTransport for TranslationClient {
    async fn upload(&self, file: CandidateFile) -> Result<UploadResult> {
        debug!(
            endpoint = %self.endpoint_url,
            file_name = %file.file_name,
            media_type = %file.media_type,
            size = file.size,
            "Sending upload request"
        );

        let form = Self::build_form(file)?;

        let response = self
            .client
            .post(&self.endpoint_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| request_failed(&e, "Upload request could not be sent"))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| request_failed(&e, "Upload response could not be read"))?;

        if !status.is_success() {
            let message = failure_message(&body);
            warn!(status = status.as_u16(), error = %message, "Upload request rejected");
            return Err(UploadError::Transport { message });
        }

        parse_upload_result(&body)
    }
}

// reqwest's text names the endpoint URL; it goes to the log, the user sees the generic message.
fn request_failed(err: &reqwest::Error, context: &'static str) -> UploadError {
    warn!(error = %err, timeout = err.is_timeout(), "{}", context);
    UploadError::transport(GENERIC_FAILURE_MESSAGE)
}
