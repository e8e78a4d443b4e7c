use axum::body::Bytes;
use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One uploaded image, held in memory for the lifetime of a single request.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub bytes: Bytes,
    pub content_type: Option<String>,
    pub file_name: Option<String>,
}

impl UploadedImage {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: None,
            file_name: None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }
}

/// Outcome of interpreting the model output.
#[derive(Debug, Clone, PartialEq)]
pub enum Structured {
    Parsed(Map<String, Value>),
    Unparsed { raw: String, reason: String },
}

impl Structured {
    pub fn is_parsed(&self) -> bool {
        matches!(self, Self::Parsed(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedInvoice {
    pub extracted_text: String,
    pub structured: Structured,
}

/// Typed view of the schema the prompt asks for. The pipeline passes the
/// model's JSON through untouched; this view is lenient and only used to
/// read well-known fields out of it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InvoiceRecord {
    pub vendor: String,
    pub vendor_address: String,
    pub client: String,
    pub client_address: String,
    pub invoice_number: String,
    pub date: String,
    pub due_date: String,
    pub items: Vec<LineItem>,
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LineItem {
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub total: f64,
}

impl InvoiceRecord {
    /// Returns `None` when a present field has the wrong JSON type.
    pub fn from_object(object: &Map<String, Value>) -> Option<Self> {
        serde_json::from_value(Value::Object(object.clone())).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_uploaded_image_base64() {
        let image = UploadedImage::new(&b"hello"[..]).with_content_type("image/png");
        assert_eq!(image.base64(), "aGVsbG8=");
        assert_eq!(image.len(), 5);
        assert_eq!(image.content_type.as_deref(), Some("image/png"));
    }

    #[test]
    fn test_invoice_record_defaults_missing_fields() {
        let record =
            InvoiceRecord::from_object(&object(json!({"vendor": "Acme", "total": 100}))).unwrap();

        assert_eq!(record.vendor, "Acme");
        assert_eq!(record.total, 100.0);
        assert_eq!(record.client, "");
        assert_eq!(record.subtotal, 0.0);
        assert!(record.items.is_empty());
    }

    #[test]
    fn test_invoice_record_reads_line_items() {
        let record = InvoiceRecord::from_object(&object(json!({
            "invoiceNumber": "INV-7",
            "dueDate": "2024-02-01",
            "items": [
                {"description": "Widget", "quantity": 2, "unitPrice": 5.5, "total": 11}
            ]
        })))
        .unwrap();

        assert_eq!(record.invoice_number, "INV-7");
        assert_eq!(record.due_date, "2024-02-01");
        assert_eq!(
            record.items,
            vec![LineItem {
                description: "Widget".to_string(),
                quantity: 2.0,
                unit_price: 5.5,
                total: 11.0,
            }]
        );
    }

    #[test]
    fn test_invoice_record_rejects_wrong_types() {
        assert!(InvoiceRecord::from_object(&object(json!({"total": "one hundred"}))).is_none());
    }
}
