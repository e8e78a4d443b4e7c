use crate::{Error, Result};

pub const PLACEHOLDER: &str = "{EXTRACTED_TEXT}";

pub const DEFAULT_INVOICE_TEMPLATE: &str = r#"
Analyze the text and structure it as a JSON object for an invoice with keys:
vendor, vendorAddress, client, clientAddress, invoiceNumber, date, dueDate,
items, subtotal, tax, total.

Items must be an array with:
description, quantity, unitPrice, total.

Use "" for missing text and 0 for missing numbers.

Text: """{EXTRACTED_TEXT}"""
JSON Output:
"#;

/// Instruction template with a single `{EXTRACTED_TEXT}` substitution point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        match template.matches(PLACEHOLDER).count() {
            1 => Ok(Self { template }),
            0 => Err(Error::config(format!(
                "Prompt template must contain the {} placeholder",
                PLACEHOLDER
            ))),
            n => Err(Error::config(format!(
                "Prompt template must contain {} exactly once, found {} occurrences",
                PLACEHOLDER, n
            ))),
        }
    }

    /// Substitutes the text verbatim. Placeholder-like sequences inside the
    /// text itself are left alone.
    pub fn render(&self, extracted_text: &str) -> String {
        self.template.replacen(PLACEHOLDER, extracted_text, 1)
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            template: DEFAULT_INVOICE_TEMPLATE.to_string(),
        }
    }
}
