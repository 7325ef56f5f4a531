//! Fizzy notification source: wire model, the `NotificationSource` seam and
//! its HTTP implementation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ClientError;
use crate::http::{self, HttpTrace};

// ---------------------------------------------------------------------------
// Wire model
// ---------------------------------------------------------------------------

/// Identifier that Fizzy may send as either a JSON string or an integer.
/// Normalized to its string form so ids compare the same either way.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawId", into = "String")]
pub struct Id(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Str(String),
    Int(i64),
}

impl From<RawId> for Id {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Str(s) => Self(s),
            RawId::Int(n) => Self(n.to_string()),
        }
    }
}

impl From<Id> for String {
    fn from(id: Id) -> Self {
        id.0
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<i64> for Id {
    fn from(n: i64) -> Self {
        Self(n.to_string())
    }
}

impl Id {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Identity {
    #[serde(default)]
    pub accounts: Vec<Account>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    /// URL path segment of the workspace, including its leading `/`.
    pub slug: String,
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: Id,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Notification {
    pub id: Id,
    pub read: bool,
    /// `None` for system notifications, which are never forwarded.
    #[serde(default)]
    pub creator: Option<Creator>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub card: Option<Card>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Creator {
    pub id: Id,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Card {
    #[serde(default)]
    pub url: String,
}

impl Card {
    /// The card number: last path segment of the card URL.
    pub fn number(&self) -> &str {
        self.url
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default()
    }
}

/// Decode a notification list entry by entry, dropping malformed entries
/// rather than the whole list. Source order is preserved.
pub fn parse_notifications(body: &str) -> Result<Vec<Notification>, serde_json::Error> {
    let raw: Vec<serde_json::Value> = serde_json::from_str(body)?;
    let notifications = raw
        .into_iter()
        .enumerate()
        .filter_map(|(i, value)| match serde_json::from_value::<Notification>(value) {
            Ok(n) => Some(n),
            Err(e) => {
                tracing::warn!("skipping malformed notification at index {i}: {e}");
                None
            }
        })
        .collect();
    Ok(notifications)
}

// ---------------------------------------------------------------------------
// Source seam
// ---------------------------------------------------------------------------

/// Where notifications come from. One instance per agent token.
pub trait NotificationSource {
    fn fetch_identity(&self) -> Result<Identity, ClientError>;
    fn fetch_notifications(&self, slug: &str) -> Result<Vec<Notification>, ClientError>;
    fn mark_read(&self, slug: &str, id: &Id) -> Result<(), ClientError>;
}

/// Blocking Fizzy API client bound to one personal access token.
pub struct FizzyClient {
    base_url: String,
    authorization: String,
    agent: ureq::Agent,
    trace: HttpTrace,
}

impl FizzyClient {
    pub fn new(base_url: &str, token: &str, verbose: bool) -> Self {
        Self {
            base_url: base_url.to_string(),
            authorization: format!("Bearer {token}"),
            agent: http::agent(),
            trace: HttpTrace::new(verbose),
        }
    }

    fn headers(&self) -> [(&'static str, &str); 3] {
        [
            ("authorization", self.authorization.as_str()),
            ("accept", "application/json"),
            ("content-type", "application/json"),
        ]
    }

    fn get(&self, label: &'static str, url: &str) -> Result<String, ClientError> {
        let headers = self.headers();
        self.trace.request("GET", url, &headers, None);
        let mut req = self.agent.get(url);
        for (name, value) in headers {
            req = req.header(name, value);
        }
        self.trace.finish(label, req.call())
    }

    fn post_empty(&self, label: &'static str, url: &str) -> Result<String, ClientError> {
        let headers = self.headers();
        self.trace.request("POST", url, &headers, None);
        let mut req = self.agent.post(url);
        for (name, value) in headers {
            req = req.header(name, value);
        }
        self.trace.finish(label, req.send_empty())
    }
}

impl NotificationSource for FizzyClient {
    fn fetch_identity(&self) -> Result<Identity, ClientError> {
        const LABEL: &str = "Identity";
        let body = self.get(LABEL, &format!("{}/my/identity", self.base_url))?;
        serde_json::from_str(&body).map_err(|source| ClientError::Decode { label: LABEL, source })
    }

    fn fetch_notifications(&self, slug: &str) -> Result<Vec<Notification>, ClientError> {
        const LABEL: &str = "Notifications";
        let body = self.get(LABEL, &format!("{}{slug}/notifications", self.base_url))?;
        parse_notifications(&body).map_err(|source| ClientError::Decode { label: LABEL, source })
    }

    fn mark_read(&self, slug: &str, id: &Id) -> Result<(), ClientError> {
        let url = format!("{}{slug}/notifications/{id}/reading", self.base_url);
        self.post_empty("Mark read", &url).map(|_| ())
    }
}
