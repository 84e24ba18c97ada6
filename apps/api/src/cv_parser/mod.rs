// CV Parser
// Document → text → LLM extraction → normalized ParsedCv, with a structured
// fallback whenever the model reply is unusable.

pub mod extractors;
pub mod handlers;
pub mod models;
pub mod normalizers;
pub mod parser;
pub mod prompts;

pub use models::ParsedCv;
pub use parser::CvParser;
