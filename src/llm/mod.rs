mod client;

#[cfg(test)]
pub use client::MockTextGenerator;
pub use client::{OpenAiClient, TextGenerator};
