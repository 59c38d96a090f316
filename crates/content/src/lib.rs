//! Questionnaire schema for service listings.
//! - Declarations live in per-framework TOML files, read once at startup.
//! - The schema drives form building, payload translation and diffing;
//!   it is never written at runtime.

pub mod schema;
pub mod store;

pub use schema::{AssuranceApproach, FrameworkContent, Question, QuestionType, Section};
pub use store::ContentStore;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("content root not readable: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid section declaration in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("unknown framework: {0}")]
    UnknownFramework(String),
    #[error("unknown section: {0}")]
    UnknownSection(String),
    #[error("unknown question: {0}")]
    UnknownQuestion(String),
}
