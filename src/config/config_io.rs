use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::bot_config::BotConfig;

pub const TOKEN_ENV: &str = "SLACK_TOKEN";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("config {path} is not valid: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no Slack token: set `slack_token` in the config or the SLACK_TOKEN variable")]
    MissingToken,

    #[error("no channel configured")]
    MissingChannel,
}

pub fn default_config_path() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("house_points");
    path.push("config.json");
    path
}

/// Reads the config file, then lets the environment override the token.
pub fn load_config(path: &Path) -> Result<BotConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let config = parse_config(&raw, std::env::var(TOKEN_ENV).ok()).map_err(|e| match e {
        ParseFailure::Json(source) => ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        },
        ParseFailure::Invalid(e) => e,
    })?;

    info!(path = %path.display(), channel = %config.channel, "config loaded");
    Ok(config)
}

enum ParseFailure {
    Json(serde_json::Error),
    Invalid(ConfigError),
}

fn parse_config(raw: &str, env_token: Option<String>) -> Result<BotConfig, ParseFailure> {
    let mut config: BotConfig = serde_json::from_str(raw).map_err(ParseFailure::Json)?;

    if let Some(token) = env_token.filter(|t| !t.trim().is_empty()) {
        config.slack_token = token;
    }
    if config.slack_token.trim().is_empty() {
        return Err(ParseFailure::Invalid(ConfigError::MissingToken));
    }
    if config.channel.trim().is_empty() {
        return Err(ParseFailure::Invalid(ConfigError::MissingChannel));
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_defaults() {
        let raw = r#"{ "slack_token": "xoxb-1", "channel": "C1", "prefects": ["minerva"] }"#;
        let config = parse_config(raw, None).ok().unwrap();

        assert_eq!(config.poll_interval_secs, 1);
        assert!(config.points_file.is_none());
        assert_eq!(config.announcer_names(), ["minerva".to_string()]);
        assert!(config.special_subjects.iter().any(|s| s.key == "dumbledore"));
    }

    #[test]
    fn env_token_wins() {
        let raw = r#"{ "slack_token": "xoxb-file", "channel": "C1" }"#;
        let config = parse_config(raw, Some("xoxb-env".into())).ok().unwrap();
        assert_eq!(config.slack_token, "xoxb-env");
    }

    #[test]
    fn token_and_channel_are_required() {
        let missing_token = parse_config(r#"{ "channel": "C1" }"#, None);
        assert!(matches!(
            missing_token,
            Err(ParseFailure::Invalid(ConfigError::MissingToken))
        ));

        let missing_channel = parse_config(r#"{ "slack_token": "x" }"#, None);
        assert!(matches!(
            missing_channel,
            Err(ParseFailure::Invalid(ConfigError::MissingChannel))
        ));
    }

    #[test]
    fn bad_json_is_reported() {
        assert!(matches!(parse_config("{", None), Err(ParseFailure::Json(_))));
    }
}
