mod client;
mod token;
mod types;

#[cfg(test)]
pub use client::MockTextExtractor;
pub use client::{GoogleVisionClient, TextExtractor};
pub use types::{ServiceAccountKey, VisionAuth, VisionCredentials};
