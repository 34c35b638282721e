use crate::model::chat_event::ChatEvent;
use crate::model::outcome::AwardOutcome;

pub enum EngineCommand {
    Chat(ChatEvent),
    /// End of a poll batch: draw the cup if scores moved, then persist.
    Tick,
    Shutdown,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineResponse {
    Post {
        channel: String,
        outcome: AwardOutcome,
    },

    Chart {
        channel: String,
        chart: String,
    },

    Standings {
        channel: String,
        lines: Vec<String>,
    },
}
