use thiserror::Error;

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("Unknown layout: {0}")]
    UnknownLayout(String),
    #[error("Layout {name} failed validation: {}", errors.join("; "))]
    InvalidDocument { name: String, errors: Vec<String> },
    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("I/O failed: {0}")]
    Io(#[from] std::io::Error),
}
