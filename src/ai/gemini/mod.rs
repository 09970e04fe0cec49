pub mod client;
pub mod content;
pub mod types;

pub use client::GeminiHttpClient;
pub use content::GeminiContentClient;
