pub mod payload;
pub mod coerce;
pub mod schema;
pub mod aggregate;
pub mod output_sanitize;
pub mod parser;
pub mod prompt;
pub mod llm;
pub mod gemini;
pub mod openai;
pub mod fallback;
pub mod orchestrator;

pub use payload::*;
pub use schema::*;
pub use aggregate::*;
pub use parser::*;
pub use prompt::*;
pub use llm::*;
pub use gemini::*;
pub use openai::*;
pub use orchestrator::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StructuringError {
    #[error("Model service unreachable at {0}")]
    ServiceConnection(String),

    #[error("Model service returned error (status {status}): {body}")]
    ServiceError { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("Model returned an empty response")]
    EmptyResponse,

    #[error("No JSON object found in model response")]
    PayloadNotFound,

    #[error("JSON parsing error after {passes} extraction pass(es): {message}")]
    JsonParsing { message: String, passes: usize },

    #[error("Offline generator failed: {0}")]
    Fallback(String),
}
