pub mod client;
pub mod models;
pub mod response;

pub use client::{ChatModel, OpenAiCompatModel};
pub use models::{ModelResponse, RequestBody};
pub use response::parse_model_response;
