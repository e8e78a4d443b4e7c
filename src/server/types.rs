use crate::pipeline::{INVALID_JSON_MESSAGE, ProcessedInvoice, Structured};
use serde::Serialize;
use serde_json::{Map, Value};

/// Either `structured_data` is present, or `error` and `raw_response` are.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessImageResponse {
    pub extracted_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structured_data: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

impl From<ProcessedInvoice> for ProcessImageResponse {
    fn from(processed: ProcessedInvoice) -> Self {
        match processed.structured {
            Structured::Parsed(object) => Self {
                extracted_text: processed.extracted_text,
                structured_data: Some(object),
                error: None,
                raw_response: None,
            },
            Structured::Unparsed { raw, .. } => Self {
                extracted_text: processed.extracted_text,
                structured_data: None,
                error: Some(INVALID_JSON_MESSAGE.to_string()),
                raw_response: Some(raw),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
