use thiserror::Error;

use crate::bot::conversation_state::MessageId;

/// Failure of a single completion request.
///
/// Never propagated past the relay: the handler renders it into the reply text.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("MISTRAL_API_KEY is not configured")]
    MissingApiKey,

    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API returned {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Failure reported by the messaging platform.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error(transparent)]
    Request(#[from] teloxide::RequestError),

    #[cfg(test)]
    #[error("{0}")]
    Rejected(String),
}

#[derive(Debug, Error)]
#[error("failed to delete message {message_id}: {source}")]
pub struct DeleteError {
    pub message_id: MessageId,
    #[source]
    pub source: TransportError,
}
