//! HTTP client module with retry logic and error classification.

mod client;
mod retry;

pub use client::HttpClient;
pub use retry::NonRetryableError;
