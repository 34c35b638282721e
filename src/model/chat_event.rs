/// A message as seen by the engine, independent of the chat backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEvent {
    pub channel: String,
    pub user: Option<String>,
    pub text: Option<String>,
    pub is_bot: bool,
}

impl ChatEvent {
    pub fn new(channel: &str, user: &str, text: &str) -> Self {
        Self {
            channel: channel.into(),
            user: Some(user.into()),
            text: Some(text.into()),
            is_bot: false,
        }
    }
}
