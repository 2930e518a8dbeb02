pub mod duckduckgo;
pub mod openai;
pub mod serper;

pub use duckduckgo::DuckDuckGoClient;
pub use openai::OpenAiClient;
pub use serper::SerperClient;
