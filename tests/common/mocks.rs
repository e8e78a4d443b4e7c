use async_trait::async_trait;
use invoice_scanner::{
    Error, Result,
    llm::TextGenerator,
    ocr::TextExtractor,
    pipeline::UploadedImage,
};
use std::sync::{Arc, Mutex};

/// Mock OCR backend for testing
#[derive(Debug)]
pub struct MockTextExtractor {
    pub text: String,
    pub images: Arc<Mutex<Vec<Vec<u8>>>>,
    pub error: Option<String>,
}

impl MockTextExtractor {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            images: Arc::new(Mutex::new(Vec::new())),
            error: None,
        }
    }

    pub fn with_error(mut self, error: String) -> Self {
        self.error = Some(error);
        self
    }

    pub fn call_count(&self) -> usize {
        self.images.lock().unwrap().len()
    }

    pub fn get_images(&self) -> Vec<Vec<u8>> {
        self.images.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextExtractor for MockTextExtractor {
    async fn extract_text(&self, image: &UploadedImage) -> Result<String> {
        self.images.lock().unwrap().push(image.bytes.to_vec());

        if let Some(ref error) = self.error {
            return Err(Error::ocr(error.clone()));
        }

        Ok(self.text.clone())
    }
}

/// Mock text-generation backend for testing
#[derive(Debug)]
pub struct MockTextGenerator {
    pub response: String,
    pub prompts: Arc<Mutex<Vec<String>>>,
    pub error: Option<String>,
}

impl MockTextGenerator {
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            prompts: Arc::new(Mutex::new(Vec::new())),
            error: None,
        }
    }

    pub fn with_error(mut self, error: String) -> Self {
        self.error = Some(error);
        self
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn get_prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for MockTextGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());

        if let Some(ref error) = self.error {
            return Err(Error::llm(error.clone()));
        }

        Ok(self.response.clone())
    }
}
