use std::process::ExitCode;

/// Errors that stop fizzy-pop before (or instead of) entering the scheduler loop.
#[derive(Debug, thiserror::Error)]
pub enum ExitError {
    #[error("config error: {0}")]
    Config(String),

    #[error("no active agents: identity resolution failed for every configured agent")]
    NoActiveAgents,

    #[error("{0}")]
    Other(String),
}

impl ExitError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Config(_) => ExitCode::from(2),
            Self::NoActiveAgents => ExitCode::from(3),
            Self::Other(_) => ExitCode::from(1),
        }
    }
}

/// A single failed call to Fizzy or OpenClaw.
///
/// These never cross into the scheduler: the agent or dispatcher that made
/// the call logs it and moves on.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("{label} request failed: {source}")]
    Transport {
        label: &'static str,
        #[source]
        source: Box<ureq::Error>,
    },

    #[error("{label} returned HTTP {status}")]
    Status { label: &'static str, status: u16 },

    #[error("{label} returned an invalid body: {source}")]
    Decode {
        label: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl ClientError {
    pub fn transport(label: &'static str, source: ureq::Error) -> Self {
        Self::Transport {
            label,
            source: Box::new(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct_per_class() {
        assert_eq!(ExitError::Config("x".into()).exit_code(), ExitCode::from(2));
        assert_eq!(ExitError::NoActiveAgents.exit_code(), ExitCode::from(3));
        assert_eq!(ExitError::Other("x".into()).exit_code(), ExitCode::from(1));
    }

    #[test]
    fn status_error_names_label_and_code() {
        let err = ClientError::Status {
            label: "Notifications",
            status: 500,
        };
        assert_eq!(err.to_string(), "Notifications returned HTTP 500");
    }
}
