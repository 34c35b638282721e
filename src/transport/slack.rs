use std::collections::HashSet;
use std::time::{SystemTime, UNIX_EPOCH};

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::model::chat_event::ChatEvent;
use crate::model::persona::SpecialSubject;
use crate::transport::{ChatTransport, TransportError};

const SLACK_API: &str = "https://slack.com/api";
const PAGE_LIMIT: &str = "200";

#[derive(Serialize)]
pub struct PostMessageRequest<'a> {
    pub channel: &'a str,
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_emoji: Option<&'a str>,
}

#[derive(Deserialize)]
pub struct ApiStatus {
    pub ok: bool,
    pub error: Option<String>,
}

/// Cursor-paginated methods put the next page token here; empty on the last page.
#[derive(Deserialize, Default)]
pub struct ResponseMetadata {
    #[serde(default)]
    pub next_cursor: String,
}

fn next_cursor(meta: Option<ResponseMetadata>) -> Option<String> {
    meta.map(|m| m.next_cursor)
        .filter(|c| !c.trim().is_empty())
}

#[derive(Deserialize)]
pub struct HistoryResponse {
    pub ok: bool,
    pub error: Option<String>,
    #[serde(default)]
    pub messages: Vec<HistoryMessage>,
    #[serde(default)]
    pub has_more: bool,
    pub response_metadata: Option<ResponseMetadata>,
}

#[derive(Deserialize)]
pub struct HistoryMessage {
    pub ts: String,
    pub user: Option<String>,
    pub text: Option<String>,
    pub subtype: Option<String>,
    pub bot_id: Option<String>,
}

#[derive(Deserialize)]
pub struct MembersResponse {
    pub ok: bool,
    pub error: Option<String>,
    #[serde(default)]
    pub members: Vec<String>,
    pub response_metadata: Option<ResponseMetadata>,
}

#[derive(Deserialize)]
pub struct UserInfoResponse {
    pub ok: bool,
    pub error: Option<String>,
    pub user: Option<UserProfile>,
}

#[derive(Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
}

/// Channel members as `(id, user name)`, fetched once at startup.
#[derive(Debug, Default)]
pub struct MemberDirectory {
    members: Vec<(String, String)>,
}

impl MemberDirectory {
    pub fn new(members: Vec<(String, String)>) -> Self {
        Self { members }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Ids of the members whose user name is in `names`.
    pub fn resolve(&self, names: &[String]) -> Vec<String> {
        let wanted: HashSet<&str> = names.iter().map(|n| n.as_str()).collect();
        self.members
            .iter()
            .filter(|(_, name)| wanted.contains(name.as_str()))
            .map(|(id, _)| id.clone())
            .collect()
    }
}

fn check(method: &'static str, ok: bool, error: Option<String>) -> Result<(), TransportError> {
    if ok {
        Ok(())
    } else {
        Err(TransportError::Api {
            method,
            error: error.unwrap_or_else(|| "unknown_error".into()),
        })
    }
}

/// Slack Web API client polling a single channel.
#[derive(Clone)]
pub struct SlackClient {
    client: Client,
    token: String,
    channel: String,
    /// Timestamp of the newest message seen; history is read after it.
    cursor: String,
}

impl SlackClient {
    pub fn new(token: &str, channel: &str) -> Self {
        Self {
            client: Client::new(),
            token: token.into(),
            channel: channel.into(),
            cursor: slack_now(),
        }
    }

    fn get<T: DeserializeOwned>(
        &self,
        method: &'static str,
        query: &[(&str, &str)],
    ) -> Result<T, TransportError> {
        let resp = self
            .client
            .get(format!("{}/{}", SLACK_API, method))
            .bearer_auth(&self.token)
            .query(query)
            .send()?
            .error_for_status()?
            .json::<T>()?;
        Ok(resp)
    }

    /// Every member of the channel with their user name. Follows the member
    /// list cursor to the last page, then looks each member up once.
    pub fn member_directory(&self) -> Result<MemberDirectory, TransportError> {
        let mut ids = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let mut query = vec![("channel", self.channel.as_str()), ("limit", PAGE_LIMIT)];
            if let Some(c) = cursor.as_deref() {
                query.push(("cursor", c));
            }

            let page: MembersResponse = self.get("conversations.members", &query)?;
            check("conversations.members", page.ok, page.error)?;
            ids.extend(page.members);

            cursor = next_cursor(page.response_metadata);
            if cursor.is_none() {
                break;
            }
        }

        let mut members = Vec::with_capacity(ids.len());
        for user_id in ids {
            let info: UserInfoResponse = self.get("users.info", &[("user", user_id.as_str())])?;
            check("users.info", info.ok, info.error)?;

            if let Some(profile) = info.user {
                members.push((profile.id, profile.name));
            }
        }

        info!(count = members.len(), "fetched channel members");
        Ok(MemberDirectory::new(members))
    }
}

impl ChatTransport for SlackClient {
    fn poll(&mut self) -> Result<Vec<ChatEvent>, TransportError> {
        // pages run newest to oldest, so `messages` stays newest first
        let mut messages = Vec::new();
        let mut page_cursor: Option<String> = None;
        loop {
            let mut query = vec![
                ("channel", self.channel.as_str()),
                ("oldest", self.cursor.as_str()),
                ("limit", PAGE_LIMIT),
            ];
            if let Some(c) = page_cursor.as_deref() {
                query.push(("cursor", c));
            }

            let page: HistoryResponse = self.get("conversations.history", &query)?;
            check("conversations.history", page.ok, page.error)?;
            messages.extend(page.messages);

            page_cursor = if page.has_more {
                next_cursor(page.response_metadata)
            } else {
                None
            };
            if page_cursor.is_none() {
                break;
            }
        }

        if let Some(newest) = messages.first() {
            self.cursor = newest.ts.clone();
        }

        let events = into_events(&self.channel, messages);
        if !events.is_empty() {
            debug!(count = events.len(), "polled messages");
        }
        Ok(events)
    }

    fn post(
        &self,
        channel: &str,
        text: &str,
        persona: Option<&SpecialSubject>,
    ) -> Result<(), TransportError> {
        let req = PostMessageRequest {
            channel,
            text,
            username: persona.map(|p| p.display_name.as_str()),
            icon_emoji: persona.map(|p| p.marker.as_str()),
        };

        let status = self
            .client
            .post(format!("{}/chat.postMessage", SLACK_API))
            .bearer_auth(&self.token)
            .json(&req)
            .send()?
            .error_for_status()?
            .json::<ApiStatus>()?;
        check("chat.postMessage", status.ok, status.error)
    }
}

/// History comes newest first; the engine wants arrival order.
pub fn into_events(channel: &str, messages: Vec<HistoryMessage>) -> Vec<ChatEvent> {
    messages
        .into_iter()
        .rev()
        .map(|m| ChatEvent {
            channel: channel.to_string(),
            is_bot: m.bot_id.is_some() || m.subtype.as_deref() == Some("bot_message"),
            user: m.user,
            text: m.text,
        })
        .collect()
}

fn slack_now() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}.{:06}", now.as_secs(), now.subsec_micros())
}
