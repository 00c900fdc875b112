use thiserror::Error;

/// Delivery and templating failures, reported asynchronously to callers.
#[derive(Debug, Error)]
pub enum EmailError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("template error: {0}")]
    Template(String),
    #[error("provider rejected message: status {status}: {message}")]
    Rejected { status: u16, message: String },
}
