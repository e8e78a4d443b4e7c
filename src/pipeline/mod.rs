mod parse;
mod prompt;
mod types;

pub use parse::{INVALID_JSON_MESSAGE, parse_model_output, strip_code_fence};
pub use prompt::{DEFAULT_INVOICE_TEMPLATE, PLACEHOLDER, PromptTemplate};
pub use types::{InvoiceRecord, LineItem, ProcessedInvoice, Structured, UploadedImage};

use crate::{Result, llm::TextGenerator, ocr::TextExtractor};
use std::sync::Arc;
use tracing::{debug, info, warn};

const PREVIEW_CHARS: usize = 200;

/// receive → extract → structure. Holds no per-request state, so one instance
/// serves every request concurrently.
#[derive(Clone)]
pub struct InvoicePipeline {
    extractor: Arc<dyn TextExtractor>,
    generator: Arc<dyn TextGenerator>,
    template: PromptTemplate,
}

impl InvoicePipeline {
    pub fn new(
        extractor: Arc<dyn TextExtractor>,
        generator: Arc<dyn TextGenerator>,
        template: PromptTemplate,
    ) -> Self {
        Self {
            extractor,
            generator,
            template,
        }
    }

    /// Errors from either collaborator abort the run. Unparsable model output
    /// does not; it comes back as `Structured::Unparsed`.
    pub async fn process(&self, image: &UploadedImage) -> Result<ProcessedInvoice> {
        let extracted_text = self.extractor.extract_text(image).await?;
        info!("Extracted text: {}", preview(&extracted_text));

        let prompt = self.template.render(&extracted_text);
        let raw_output = self.generator.generate(&prompt).await?;
        debug!("Model output: {}", raw_output);

        let structured = parse_model_output(&raw_output);
        match &structured {
            Structured::Parsed(object) => match InvoiceRecord::from_object(object) {
                Some(record) => info!(
                    "Structured invoice: vendor='{}', items={}, total={}",
                    record.vendor,
                    record.items.len(),
                    record.total
                ),
                None => info!("Structured output with {} keys", object.len()),
            },
            Structured::Unparsed { reason, .. } => {
                warn!("Model output is not a JSON object: {}", reason)
            }
        }

        Ok(ProcessedInvoice {
            extracted_text,
            structured,
        })
    }
}

fn preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}
