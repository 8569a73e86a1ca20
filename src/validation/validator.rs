use crate::utils::{format_megabytes, UploadConfig};
use crate::validation::CandidateFile;
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    InvalidType { media_type: String, accepted: Vec<String> },
    TooLarge { size: u64, max_bytes: u64 },
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::InvalidType { accepted, .. } => {
                let labels: Vec<String> = accepted
                    .iter()
                    .map(|t| {
                        t.rsplit('/')
                            .next()
                            .unwrap_or(t)
                            .replace("jpeg", "jpg")
                            .to_uppercase()
                    })
                    .collect();
                write!(f, "Invalid file type. Only {} allowed.", labels.join("/"))
            }
            RejectionReason::TooLarge { max_bytes, .. } => {
                write!(f, "File too large (max {}).", format_megabytes(*max_bytes))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationVerdict {
    Accepted,
    Rejected(RejectionReason),
}

impl ValidationVerdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ValidationVerdict::Accepted)
    }

    pub fn rejection(&self) -> Option<&RejectionReason> {
        match self {
            ValidationVerdict::Accepted => None,
            ValidationVerdict::Rejected(reason) => Some(reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileValidator {
    image_mime_types: BTreeSet<String>,
    max_bytes: u64,
}

impl FileValidator {
    pub fn new(image_mime_types: BTreeSet<String>, max_bytes: u64) -> Self {
        Self {
            image_mime_types,
            max_bytes,
        }
    }

    pub fn from_config(config: &UploadConfig) -> Self {
        Self::new(config.image_mime_types.clone(), config.max_bytes)
    }

    pub fn image_mime_types(&self) -> impl Iterator<Item = &str> {
        self.image_mime_types.iter().map(String::as_str)
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    pub fn validate(&self, file: &CandidateFile) -> ValidationVerdict {
        self.validate_declared(&file.media_type, file.size)
    }

    /// Type is checked before size; the first failing rule is the one reported.
    pub fn validate_declared(&self, media_type: &str, size: u64) -> ValidationVerdict {
        if !self.image_mime_types.contains(media_type) {
            return ValidationVerdict::Rejected(RejectionReason::InvalidType {
                media_type: media_type.to_string(),
                accepted: self.image_mime_types.iter().cloned().collect(),
            });
        }

        if size > self.max_bytes {
            return ValidationVerdict::Rejected(RejectionReason::TooLarge {
                size,
                max_bytes: self.max_bytes,
            });
        }

        ValidationVerdict::Accepted
    }
}

impl Default for FileValidator {
    fn default() -> Self {
        Self::from_config(&UploadConfig::default())
    }
}
