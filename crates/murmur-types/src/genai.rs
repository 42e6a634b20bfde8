use futures_util::future::BoxFuture;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenAiError {
    #[error("generative AI is not configured")]
    NotConfigured,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("provider reply had no text")]
    EmptyReply,
}

/// A single-shot text completion backend.
///
/// The server implements this against the provider's REST API; the client
/// implements it against the server's `/messages-check` pass-through. Tests
/// use canned replies.
pub trait TextGenerator: Send + Sync {
    fn generate<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String, GenAiError>>;
}
