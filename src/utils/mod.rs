pub mod config;
pub mod errors;

pub use config::{AppConfig, LoggingConfig, UploadConfig};
pub use errors::{Result, UploadError};

/// Formats a byte count in whole mebibytes, as shown in size-limit messages.
pub fn format_megabytes(bytes: u64) -> String {
    let mb = bytes as f64 / (1024.0 * 1024.0);
    if mb.fract() == 0.0 {
        format!("{}MB", mb as u64)
    } else {
        format!("{:.1}MB", mb)
    }
}
