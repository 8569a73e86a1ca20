use crate::utils::{Result, UploadError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

pub const GENERIC_FAILURE_MESSAGE: &str = "Upload failed";

// First key present wins. The legacy names are what the OCR service emits today.
const SOURCE_TEXT_KEYS: [&str; 3] = ["sourceText", "source_text", "assamese_text"];
const TRANSLATED_TEXT_KEYS: [&str; 3] = ["translatedText", "translated_text", "translation"];
const ERROR_MESSAGE_KEYS: [&str; 3] = ["error", "detail", "message"];

/// Recognized text and its translation, plus whatever else the service sent back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResult {
    #[serde(rename = "sourceText")]
    pub source_text: String,
    #[serde(rename = "translatedText")]
    pub translated_text: String,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyTarget {
    Source,
    Translation,
}

impl UploadResult {
    pub fn new(source_text: impl Into<String>, translated_text: impl Into<String>) -> Self {
        Self {
            source_text: source_text.into(),
            translated_text: translated_text.into(),
            extra: Map::new(),
        }
    }

    /// The verbatim string a caller should put on the clipboard.
    pub fn text(&self, target: CopyTarget) -> &str {
        match target {
            CopyTarget::Source => &self.source_text,
            CopyTarget::Translation => &self.translated_text,
        }
    }
}

pub fn parse_upload_result(body: &str) -> Result<UploadResult> {
    let value: JsonValue = serde_json::from_str(body)?;
    let JsonValue::Object(mut fields) = value else {
        return Err(UploadError::malformed("response body is not a JSON object"));
    };

    let source_text = take_text_field(&mut fields, &SOURCE_TEXT_KEYS)?;
    let translated_text = take_text_field(&mut fields, &TRANSLATED_TEXT_KEYS)?;

    Ok(UploadResult {
        source_text,
        translated_text,
        extra: fields,
    })
}

fn take_text_field(fields: &mut Map<String, JsonValue>, keys: &[&str]) -> Result<String> {
    let Some(key) = keys.iter().find(|k| fields.contains_key(**k)) else {
        return Err(UploadError::malformed(format!("missing field '{}'", keys[0])));
    };

    match fields.remove(*key) {
        Some(JsonValue::String(text)) => Ok(text),
        Some(other) => Err(UploadError::malformed(format!(
            "field '{}' must be a string, got {}",
            key,
            json_type_name(&other)
        ))),
        None => Err(UploadError::malformed(format!("missing field '{}'", key))),
    }
}

fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

/// Pulls a human-readable message out of an error body, if it carries one.
pub fn extract_error_message(body: &str) -> Option<String> {
    let value: JsonValue = serde_json::from_str(body).ok()?;

    ERROR_MESSAGE_KEYS.iter().find_map(|key| {
        value
            .get(*key)
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
    })
}

pub fn failure_message(body: &str) -> String {
    extract_error_message(body).unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string())
}
