//! OpenClaw webhook sink.
//!
//! Docs: <https://docs.openclaw.ai/automation/webhook#post-/hooks/agent>

use serde::Serialize;

use crate::error::ClientError;
use crate::http::{self, HttpTrace};

/// Body of `POST /hooks/agent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentHookPayload<'a> {
    pub agent_id: &'a str,
    pub message: &'a str,
    pub mode: &'static str,
    pub deliver: bool,
}

impl<'a> AgentHookPayload<'a> {
    /// Run the agent immediately without delivering its reply to a channel.
    pub const fn now(agent_id: &'a str, message: &'a str) -> Self {
        Self {
            agent_id,
            message,
            mode: "now",
            deliver: false,
        }
    }

    pub fn to_json(&self) -> String {
        // Only string and bool fields; serialization cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Where rendered messages go.
pub trait WebhookSink {
    /// The URL requests are posted to, for dry-run and log output.
    fn endpoint(&self) -> String;
    fn send(&self, agent_name: &str, message: &str) -> Result<(), ClientError>;
}

pub struct OpenClawClient {
    base_url: String,
    authorization: String,
    agent: ureq::Agent,
    trace: HttpTrace,
}

impl OpenClawClient {
    pub fn new(base_url: &str, token: &str, verbose: bool) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            authorization: format!("Bearer {token}"),
            agent: http::agent(),
            trace: HttpTrace::new(verbose),
        }
    }
}

impl WebhookSink for OpenClawClient {
    fn endpoint(&self) -> String {
        format!("{}/hooks/agent", self.base_url)
    }

    fn send(&self, agent_name: &str, message: &str) -> Result<(), ClientError> {
        let url = self.endpoint();
        let payload = AgentHookPayload::now(agent_name, message).to_json();
        let headers = [
            ("authorization", self.authorization.as_str()),
            ("content-type", "application/json"),
        ];
        self.trace.request("POST", &url, &headers, Some(&payload));

        let mut req = self.agent.post(&url);
        for (name, value) in headers {
            req = req.header(name, value);
        }
        self.trace.finish("Webhook", req.send(payload.as_str()))?;
        tracing::info!(agent = %agent_name, "webhook delivered successfully");
        Ok(())
    }
}
