use crate::utils::Result;
use std::path::Path;

pub const OCTET_STREAM: &str = "application/octet-stream";

/// A file offered for upload: its declared media type, size and (optionally) its bytes.
///
/// Validation only ever looks at `media_type` and `size`; the bytes are what the
/// transport sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub file_name: String,
    pub media_type: String,
    pub size: u64,
    pub bytes: Vec<u8>,
}

impl CandidateFile {
    pub fn new(file_name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            media_type: media_type.into(),
            size: bytes.len() as u64,
            bytes,
        }
    }

    /// A file known only by its declared type and size.
    pub fn declared(media_type: impl Into<String>, size: u64) -> Self {
        Self {
            file_name: "upload".to_string(),
            media_type: media_type.into(),
            size,
            bytes: Vec::new(),
        }
    }

    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let media_type = media_type_for_path(path);

        Ok(Self::new(file_name, media_type, bytes))
    }
}

/// Maps a file extension onto the media type the remote service expects.
pub fn media_type_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        _ => OCTET_STREAM,
    }
}
