pub mod config;
pub mod error;
pub mod llm;
pub mod ocr;
pub mod pipeline;
pub mod server;

pub use error::{Error, Result};
