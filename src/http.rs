//! Request/response tracing shared by the Fizzy and OpenClaw clients.

use std::time::Duration;

use ureq::Body;
use ureq::http::Response;

use crate::error::ClientError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build a blocking agent that hands non-2xx responses back to us instead of
/// turning them into errors, so they can be traced before being classified.
pub fn agent() -> ureq::Agent {
    let config = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .timeout_global(Some(REQUEST_TIMEOUT))
        .build();
    ureq::Agent::new_with_config(config)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HttpTrace {
    verbose: bool,
}

impl HttpTrace {
    pub const fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    pub fn request(&self, method: &str, url: &str, headers: &[(&str, &str)], body: Option<&str>) {
        tracing::debug!("--> {method} {url}");
        if !self.verbose {
            return;
        }
        for (name, value) in headers {
            tracing::debug!("    {name}: {}", redact(name, value));
        }
        if let Some(body) = body {
            tracing::debug!("    Body:\n      {body}");
        }
    }

    /// Trace the outcome of a call and return the body of a 2xx response.
    pub fn finish(
        &self,
        label: &'static str,
        result: Result<Response<Body>, ureq::Error>,
    ) -> Result<String, ClientError> {
        let mut response = match result {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("<-- {label} error: {e}");
                return Err(ClientError::transport(label, e));
            }
        };

        let status = response.status();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| ClientError::transport(label, e))?;

        if status.is_success() {
            tracing::debug!("<-- {label} {} ({} bytes)", status.as_u16(), body.len());
        } else {
            tracing::warn!("<-- {label} {} ({} bytes)", status.as_u16(), body.len());
        }

        if self.verbose {
            for (name, value) in response.headers() {
                tracing::debug!("    {name}: {}", value.to_str().unwrap_or("<binary>"));
            }
            if !body.is_empty() {
                tracing::debug!("    Body:\n{}", pretty_body(&body));
            }
        }

        if status.is_success() {
            Ok(body)
        } else {
            Err(ClientError::Status {
                label,
                status: status.as_u16(),
            })
        }
    }
}

fn redact<'a>(name: &str, value: &'a str) -> &'a str {
    if name.eq_ignore_ascii_case("authorization") {
        "[REDACTED]"
    } else {
        value
    }
}

/// Pretty-print a JSON body indented under the response line. Non-JSON
/// bodies are passed through as-is.
fn pretty_body(body: &str) -> String {
    let text = serde_json::from_str::<serde_json::Value>(body)
        .and_then(|v| serde_json::to_string_pretty(&v))
        .unwrap_or_else(|_| body.to_string());
    text.lines()
        .map(|line| format!("      {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorization_is_redacted_case_insensitively() {
        assert_eq!(redact("Authorization", "Bearer abc"), "[REDACTED]");
        assert_eq!(redact("authorization", "Bearer abc"), "[REDACTED]");
        assert_eq!(redact("accept", "application/json"), "application/json");
    }

    #[test]
    fn pretty_body_indents_json() {
        let out = pretty_body(r#"{"a":1}"#);
        assert_eq!(out, "      {\n        \"a\": 1\n      }");
    }

    #[test]
    fn pretty_body_passes_through_plain_text() {
        assert_eq!(pretty_body("not json"), "      not json");
    }
}
