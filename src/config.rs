use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ExitError;

pub const DEFAULT_INTERVAL_POLLING: f64 = 10.0;
pub const DEFAULT_INTERVAL_WEBHOOK: f64 = 3.0;
pub const DEFAULT_INTERVAL_AGENT_POLL: f64 = 0.5;

/// Agent name used when a single `--token` is given without a config file.
pub const DEFAULT_AGENT_NAME: &str = "default";

/// Longest accepted interval, one week.
pub const MAX_INTERVAL_SECS: f64 = 604_800.0;

/// On-disk configuration for multi-agent mode.
///
/// Every field is optional here; [`Settings::resolve`] merges the file with
/// command-line flags and decides what is actually required.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct FileConfig {
    /// Fizzy base URL (e.g. `https://app.fizzy.do`)
    #[serde(default)]
    pub url: Option<String>,
    /// OpenClaw webhook base URL
    #[serde(default)]
    pub webhook_url: Option<String>,
    /// OpenClaw webhook token
    #[serde(default)]
    pub webhook_token: Option<String>,
    /// Deprecated single polling interval. Ignored in favor of `interval`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polling: Option<f64>,
    #[serde(default)]
    pub interval: Option<IntervalConfig>,
    #[serde(default)]
    pub agents: Vec<AgentConfig>,
}

/// Cadences in seconds. Fractions are allowed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct IntervalConfig {
    /// Pause between full passes over all agents
    #[serde(default)]
    pub polling: Option<f64>,
    /// Pause between delivery-queue drains
    #[serde(default)]
    pub webhook: Option<f64>,
    /// Pause between two agents within one pass
    #[serde(default)]
    pub agent_poll: Option<f64>,
}

/// One Fizzy identity to poll on behalf of.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AgentConfig {
    /// Display name and @mention token for this agent
    pub name: String,
    /// Fizzy personal access token
    pub token: String,
}

impl fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentConfig")
            .field("name", &self.name)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl FileConfig {
    /// Load a config file (TOML, YAML or JSON, picked by extension).
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Err(ExitError::Config(format!("config file not found: {}", path.display())).into());
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ExitError::Config(format!("reading {}: {e}", path.display())))?;
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        match ext {
            "toml" => Self::parse_toml(&contents),
            "yaml" | "yml" => Self::parse_yaml(&contents),
            "json" => Self::parse_json(&contents),
            _ => Self::parse_toml(&contents)
                .or_else(|_| Self::parse_yaml(&contents))
                .or_else(|_| Self::parse_json(&contents)),
        }
    }

    pub fn parse_toml(toml_str: &str) -> anyhow::Result<Self> {
        toml::from_str(toml_str)
            .map_err(|e| ExitError::Config(format!("invalid TOML config: {e}")).into())
    }

    pub fn parse_yaml(yaml: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| ExitError::Config(format!("invalid YAML config: {e}")).into())
    }

    pub fn parse_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| ExitError::Config(format!("invalid JSON config: {e}")).into())
    }
}

/// Values supplied on the command line. They win over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub url: Option<String>,
    pub token: Option<String>,
    pub config: Option<PathBuf>,
    pub webhook_url: Option<String>,
    pub webhook_token: Option<String>,
    pub dry_run: bool,
    pub verbose: bool,
}

#[derive(Clone, PartialEq, Eq)]
pub struct WebhookSettings {
    pub url: String,
    pub token: String,
}

impl fmt::Debug for WebhookSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookSettings")
            .field("url", &self.url)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Intervals {
    pub polling: Duration,
    pub webhook: Duration,
    pub agent_poll: Duration,
}

impl Default for Intervals {
    fn default() -> Self {
        Self {
            polling: Duration::from_secs_f64(DEFAULT_INTERVAL_POLLING),
            webhook: Duration::from_secs_f64(DEFAULT_INTERVAL_WEBHOOK),
            agent_poll: Duration::from_secs_f64(DEFAULT_INTERVAL_AGENT_POLL),
        }
    }
}

/// Validated runtime configuration consumed by the relay.
#[derive(Debug, Clone)]
pub struct Settings {
    pub url: String,
    pub agents: Vec<AgentConfig>,
    /// `None` only in dry-run mode, where nothing is ever posted.
    pub webhook: Option<WebhookSettings>,
    pub intervals: Intervals,
    pub dry_run: bool,
    pub verbose: bool,
}

impl Settings {
    /// Merge command-line overrides with the optional config file and validate.
    pub fn resolve(overrides: &Overrides) -> anyhow::Result<Self> {
        let file = match &overrides.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Ok(Self::from_parts(overrides, file)?)
    }

    /// Merge already-parsed config with overrides. Split out from
    /// [`Settings::resolve`] so validation can be exercised without files.
    pub fn from_parts(overrides: &Overrides, file: FileConfig) -> Result<Self, ExitError> {
        if file.polling.is_some() {
            tracing::warn!(
                "'polling' is deprecated. Use 'interval' instead. Defaulting to interval.polling: \
                 {DEFAULT_INTERVAL_POLLING}s, interval.webhook: {DEFAULT_INTERVAL_WEBHOOK}s, \
                 interval.agent_poll: {DEFAULT_INTERVAL_AGENT_POLL}s"
            );
        }

        let url = non_empty(overrides.url.clone())
            .or_else(|| non_empty(file.url))
            .ok_or_else(|| ExitError::Config("missing required --url".into()))?;

        let mut agents = file.agents;
        if agents.is_empty()
            && let Some(token) = non_empty(overrides.token.clone())
        {
            agents.push(AgentConfig {
                name: DEFAULT_AGENT_NAME.to_string(),
                token,
            });
        }
        validate_agents(&agents)?;

        let webhook_url = non_empty(overrides.webhook_url.clone()).or_else(|| non_empty(file.webhook_url));
        let webhook_token =
            non_empty(overrides.webhook_token.clone()).or_else(|| non_empty(file.webhook_token));
        let webhook = match (webhook_url, webhook_token) {
            (Some(url), Some(token)) => Some(WebhookSettings { url, token }),
            _ if overrides.dry_run => None,
            _ => {
                return Err(ExitError::Config(
                    "missing required --webhook-url and --webhook-token".into(),
                ));
            }
        };

        let interval = file.interval.unwrap_or_default();
        let intervals = Intervals {
            polling: seconds("interval.polling", interval.polling, DEFAULT_INTERVAL_POLLING)?,
            webhook: seconds("interval.webhook", interval.webhook, DEFAULT_INTERVAL_WEBHOOK)?,
            agent_poll: seconds(
                "interval.agent_poll",
                interval.agent_poll,
                DEFAULT_INTERVAL_AGENT_POLL,
            )?,
        };

        Ok(Self {
            url,
            agents,
            webhook,
            intervals,
            dry_run: overrides.dry_run,
            verbose: overrides.verbose,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn validate_agents(agents: &[AgentConfig]) -> Result<(), ExitError> {
    if agents.is_empty() {
        return Err(ExitError::Config(
            "no agents configured. Use --token or --config with an agents list".into(),
        ));
    }
    let mut seen = HashSet::new();
    for (i, agent) in agents.iter().enumerate() {
        if agent.name.trim().is_empty() {
            return Err(ExitError::Config(format!("agent #{} has an empty name", i + 1)));
        }
        if agent.token.trim().is_empty() {
            return Err(ExitError::Config(format!("agent {:?} has an empty token", agent.name)));
        }
        // Names double as @mention tokens, which are matched case-insensitively.
        if !seen.insert(agent.name.to_lowercase()) {
            return Err(ExitError::Config(format!("duplicate agent name {:?}", agent.name)));
        }
    }
    Ok(())
}

fn seconds(key: &str, value: Option<f64>, default: f64) -> Result<Duration, ExitError> {
    let secs = value.unwrap_or(default);
    if secs > MAX_INTERVAL_SECS {
        return Err(ExitError::Config(format!(
            "{key} must be at most {MAX_INTERVAL_SECS} seconds, got {secs}"
        )));
    }
    Duration::try_from_secs_f64(secs)
        .map_err(|_| ExitError::Config(format!("{key} must be a non-negative number of seconds, got {secs}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overrides() -> Overrides {
        Overrides {
            url: Some("https://app.fizzy.do".into()),
            webhook_url: Some("http://localhost:18789".into()),
            webhook_token: Some("hook-secret".into()),
            ..Overrides::default()
        }
    }

    fn config_err(result: Result<Settings, ExitError>) -> String {
        match result {
            Err(ExitError::Config(msg)) => msg,
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn parse_full_toml_config() {
        let toml_str = r#"
url = "https://app.fizzy.do"
webhook_url = "http://localhost:18789"
webhook_token = "hook-secret"

[interval]
polling = 20
webhook = 1.5
agent_poll = 0.25

[[agents]]
name = "alice"
token = "tok-a"

[[agents]]
name = "bob"
token = "tok-b"
"#;
        let file = FileConfig::parse_toml(toml_str).unwrap();
        let settings = Settings::from_parts(&Overrides::default(), file).unwrap();

        assert_eq!(settings.url, "https://app.fizzy.do");
        assert_eq!(settings.agents.len(), 2);
        assert_eq!(settings.agents[1].name, "bob");
        assert_eq!(settings.intervals.polling, Duration::from_secs(20));
        assert_eq!(settings.intervals.webhook, Duration::from_millis(1500));
        assert_eq!(settings.intervals.agent_poll, Duration::from_millis(250));
        assert_eq!(
            settings.webhook,
            Some(WebhookSettings {
                url: "http://localhost:18789".into(),
                token: "hook-secret".into(),
            })
        );
    }

    #[test]
    fn parse_yaml_config() {
        let yaml = r"
url: https://app.fizzy.do
interval:
  polling: 5
agents:
  - name: alice
    token: tok-a
";
        let file = FileConfig::parse_yaml(yaml).unwrap();
        assert_eq!(file.url.as_deref(), Some("https://app.fizzy.do"));
        assert_eq!(file.agents[0].name, "alice");
        assert_eq!(file.interval.unwrap().polling, Some(5.0));
    }

    #[test]
    fn parse_json_config() {
        let json = r#"{"url": "https://app.fizzy.do", "agents": [{"name": "alice", "token": "t"}]}"#;
        let file = FileConfig::parse_json(json).unwrap();
        assert_eq!(file.agents.len(), 1);
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let err = FileConfig::parse_toml("url = [").unwrap_err();
        assert!(matches!(err.downcast_ref::<ExitError>(), Some(ExitError::Config(_))));
    }

    #[test]
    fn defaults_apply_when_interval_missing() {
        let file = FileConfig {
            agents: vec![AgentConfig { name: "alice".into(), token: "t".into() }],
            ..FileConfig::default()
        };
        let settings = Settings::from_parts(&overrides(), file).unwrap();
        assert_eq!(settings.intervals, Intervals::default());
        assert_eq!(settings.intervals.agent_poll, Duration::from_millis(500));
    }

    #[test]
    fn single_token_creates_default_agent() {
        let o = Overrides { token: Some("tok".into()), ..overrides() };
        let settings = Settings::from_parts(&o, FileConfig::default()).unwrap();
        assert_eq!(settings.agents.len(), 1);
        assert_eq!(settings.agents[0].name, DEFAULT_AGENT_NAME);
        assert_eq!(settings.agents[0].token, "tok");
    }

    #[test]
    fn file_agents_win_over_single_token() {
        let o = Overrides { token: Some("tok".into()), ..overrides() };
        let file = FileConfig {
            agents: vec![AgentConfig { name: "alice".into(), token: "t".into() }],
            ..FileConfig::default()
        };
        let settings = Settings::from_parts(&o, file).unwrap();
        assert_eq!(settings.agents.len(), 1);
        assert_eq!(settings.agents[0].name, "alice");
    }

    #[test]
    fn cli_url_overrides_file_url() {
        let file = FileConfig {
            url: Some("https://file.example".into()),
            agents: vec![AgentConfig { name: "alice".into(), token: "t".into() }],
            ..FileConfig::default()
        };
        let settings = Settings::from_parts(&overrides(), file).unwrap();
        assert_eq!(settings.url, "https://app.fizzy.do");
    }

    #[test]
    fn rejects_missing_url() {
        let o = Overrides { url: None, token: Some("tok".into()), ..overrides() };
        let msg = config_err(Settings::from_parts(&o, FileConfig::default()));
        assert!(msg.contains("--url"));
    }

    #[test]
    fn rejects_zero_agents() {
        let msg = config_err(Settings::from_parts(&overrides(), FileConfig::default()));
        assert!(msg.contains("no agents configured"));
    }

    #[test]
    fn rejects_duplicate_names_case_insensitively() {
        let file = FileConfig {
            agents: vec![
                AgentConfig { name: "Alice".into(), token: "a".into() },
                AgentConfig { name: "alice".into(), token: "b".into() },
            ],
            ..FileConfig::default()
        };
        let msg = config_err(Settings::from_parts(&overrides(), file));
        assert!(msg.contains("duplicate agent name"));
    }

    #[test]
    fn rejects_negative_interval() {
        let file = FileConfig {
            interval: Some(IntervalConfig { webhook: Some(-1.0), ..IntervalConfig::default() }),
            agents: vec![AgentConfig { name: "alice".into(), token: "t".into() }],
            ..FileConfig::default()
        };
        let msg = config_err(Settings::from_parts(&overrides(), file));
        assert!(msg.contains("interval.webhook"));
    }

    #[test]
    fn rejects_interval_beyond_one_week() {
        let file = FileConfig {
            interval: Some(IntervalConfig { polling: Some(1e19), ..IntervalConfig::default() }),
            agents: vec![AgentConfig { name: "alice".into(), token: "t".into() }],
            ..FileConfig::default()
        };
        let msg = config_err(Settings::from_parts(&overrides(), file));
        assert!(msg.contains("interval.polling must be at most"));

        let file = FileConfig {
            interval: Some(IntervalConfig { polling: Some(MAX_INTERVAL_SECS), ..IntervalConfig::default() }),
            agents: vec![AgentConfig { name: "alice".into(), token: "t".into() }],
            ..FileConfig::default()
        };
        let settings = Settings::from_parts(&overrides(), file).unwrap();
        assert_eq!(settings.intervals.polling, Duration::from_secs(604_800));
    }

    #[test]
    fn webhook_required_unless_dry_run() {
        let o = Overrides {
            url: Some("https://app.fizzy.do".into()),
            token: Some("tok".into()),
            ..Overrides::default()
        };
        let msg = config_err(Settings::from_parts(&o, FileConfig::default()));
        assert!(msg.contains("--webhook-url"));

        let dry = Overrides { dry_run: true, ..o };
        let settings = Settings::from_parts(&dry, FileConfig::default()).unwrap();
        assert!(settings.webhook.is_none());
        assert!(settings.dry_run);
    }

    #[test]
    fn debug_output_redacts_tokens() {
        let agent = AgentConfig { name: "alice".into(), token: "super-secret".into() };
        let rendered = format!("{agent:?}");
        assert!(rendered.contains("alice"));
        assert!(!rendered.contains("super-secret"));
    }

    #[test]
    fn missing_config_file_is_config_error() {
        let err = FileConfig::load(Path::new("/nonexistent/fizzy-pop.toml")).unwrap_err();
        let exit = err.downcast_ref::<ExitError>().unwrap();
        assert!(exit.to_string().contains("config file not found"));
    }

    #[test]
    fn load_detects_format_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agents.yml");
        std::fs::write(&path, "url: https://app.fizzy.do\nagents: []\n").unwrap();
        let file = FileConfig::load(&path).unwrap();
        assert_eq!(file.url.as_deref(), Some("https://app.fizzy.do"));
    }
}
