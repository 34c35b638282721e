pub mod slack;

use crate::model::chat_event::ChatEvent;
use crate::model::persona::SpecialSubject;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{method} failed: {error}")]
    Api { method: &'static str, error: String },
}

/// Slack error codes that will not go away by retrying.
const FATAL_API_ERRORS: [&str; 6] = [
    "invalid_auth",
    "not_authed",
    "account_inactive",
    "token_revoked",
    "channel_not_found",
    "not_in_channel",
];

impl TransportError {
    pub fn is_fatal(&self) -> bool {
        match self {
            TransportError::Api { error, .. } => FATAL_API_ERRORS.contains(&error.as_str()),
            TransportError::Http(_) => false,
        }
    }
}

/// The chat backend, as far as the bot is concerned.
pub trait ChatTransport {
    /// Messages that arrived since the previous poll, oldest first.
    fn poll(&mut self) -> Result<Vec<ChatEvent>, TransportError>;

    /// Post to a channel, optionally dressed up as a persona.
    fn post(
        &self,
        channel: &str,
        text: &str,
        persona: Option<&SpecialSubject>,
    ) -> Result<(), TransportError>;
}
