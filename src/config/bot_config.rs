use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::model::persona::SpecialSubject;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    pub slack_token: String,

    /// Channel id the bot listens and posts in.
    pub channel: String,

    /// User names (not ids) allowed to move more than one point at a time.
    pub prefects: Vec<String>,

    /// User names allowed to ask for the standings. Empty means the prefects.
    pub announcers: Vec<String>,

    /// Where the tally is persisted. Unset disables persistence.
    pub points_file: Option<PathBuf>,

    pub special_subjects: Vec<SpecialSubject>,

    pub poll_interval_secs: u64,
    pub announce_startup: bool,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            slack_token: String::new(),
            channel: String::new(),
            prefects: Vec::new(),
            announcers: Vec::new(),
            points_file: None,
            special_subjects: SpecialSubject::defaults(),
            poll_interval_secs: 1,
            announce_startup: true,
        }
    }
}

impl BotConfig {
    pub fn announcer_names(&self) -> &[String] {
        if self.announcers.is_empty() {
            &self.prefects
        } else {
            &self.announcers
        }
    }
}
