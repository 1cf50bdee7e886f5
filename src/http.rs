use std::fmt;
use std::time::Duration;

use serde_json::Value;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const READ_TIMEOUT: Duration = Duration::from_secs(20);
const MAX_ERROR_BODY_CHARS: usize = 240;

/// Why a request produced no usable body. Callers decide what a status means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum HttpFailure {
    Status { status: u16, body: String },
    Transport(String),
    Decode(String),
}

impl HttpFailure {
    pub(crate) fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for HttpFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status { status, body } if body.is_empty() => write!(f, "HTTP status {status}"),
            Self::Status { status, body } => write!(f, "HTTP status {status} ({body})"),
            Self::Transport(err) => write!(f, "transport error: {err}"),
            Self::Decode(err) => write!(f, "response decode failed: {err}"),
        }
    }
}

pub(crate) fn build_agent() -> ureq::Agent {
    build_agent_with_timeouts(CONNECT_TIMEOUT, READ_TIMEOUT)
}

pub(crate) fn build_agent_with_timeouts(connect: Duration, read: Duration) -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout_connect(connect)
        .timeout_read(read)
        .timeout_write(read)
        .build()
}

pub(crate) fn post_json(
    agent: &ureq::Agent,
    url: &str,
    bearer: Option<&str>,
    body: &Value,
) -> Result<String, HttpFailure> {
    let mut request = agent
        .post(url)
        .set("Content-Type", "application/json")
        .set("Accept", "application/json");
    if let Some(token) = bearer {
        request = request.set("Authorization", &format!("Bearer {token}"));
    }
    finish(request.send_string(&body.to_string()))
}

pub(crate) fn post_form(
    agent: &ureq::Agent,
    url: &str,
    fields: &[(&str, &str)],
) -> Result<String, HttpFailure> {
    finish(agent.post(url).send_form(fields))
}

pub(crate) fn get_text(agent: &ureq::Agent, url: &str) -> Result<String, HttpFailure> {
    finish(agent.get(url).call())
}

fn finish(result: Result<ureq::Response, ureq::Error>) -> Result<String, HttpFailure> {
    match result {
        Ok(response) => response
            .into_string()
            .map_err(|err| HttpFailure::Decode(err.to_string())),
        Err(ureq::Error::Status(status, response)) => {
            let response_body = response.into_string().ok().unwrap_or_default();
            let body = response_body
                .trim()
                .chars()
                .take(MAX_ERROR_BODY_CHARS)
                .collect::<String>();
            Err(HttpFailure::Status { status, body })
        }
        Err(ureq::Error::Transport(err)) => Err(HttpFailure::Transport(err.to_string())),
    }
}


#[cfg(test)]
mod tests {
    use super::test_server::{Behavior, TestServer};
    use super::*;

    fn quick_agent() -> ureq::Agent {
        build_agent_with_timeouts(Duration::from_millis(200), Duration::from_millis(200))
    }

    #[test]
    fn returns_body_on_success() {
        let server = TestServer::spawn(vec![Behavior::Respond(200, "{\"ok\":true}".to_string())]);

        let body = post_json(
            &quick_agent(),
            &server.base_url,
            Some("tok"),
            &serde_json::json!({"a": 1}),
        )
        .expect("request should succeed");

        assert_eq!(body, "{\"ok\":true}");
        let recorded = server.recorded();
        assert_eq!(recorded.len(), 1);
        assert!(recorded[0].request_line.starts_with("POST "));
        assert!(recorded[0].headers.contains("Bearer tok"));
        assert_eq!(recorded[0].body, "{\"a\":1}");
    }

    #[test]
    fn does_not_retry_server_errors() {
        let server = TestServer::spawn(vec![
            Behavior::Respond(503, "down".to_string()),
            Behavior::Respond(200, "ok".to_string()),
        ]);

        let err = get_text(&quick_agent(), &server.base_url).expect_err("503 is a failure");

        assert_eq!(err.status(), Some(503));
        assert_eq!(err.to_string(), "HTTP status 503 (down)");
        assert_eq!(server.request_count(), 1);
    }

    #[test]
    fn truncates_long_error_bodies() {
        let server = TestServer::spawn(vec![Behavior::Respond(400, "x".repeat(1000))]);

        let err = post_form(&quick_agent(), &server.base_url, &[("a", "b")])
            .expect_err("400 is a failure");

        match err {
            HttpFailure::Status { status, body } => {
                assert_eq!(status, 400);
                assert_eq!(body.len(), MAX_ERROR_BODY_CHARS);
            }
            other => panic!("unexpected failure: {other:?}"),
        }
    }

    #[test]
    fn slow_responses_surface_as_transport_errors() {
        let server = TestServer::spawn(vec![Behavior::DelayRespond(
            Duration::from_millis(400),
            200,
            "slow".to_string(),
        )]);
        let agent =
            build_agent_with_timeouts(Duration::from_millis(200), Duration::from_millis(50));

        let err = get_text(&agent, &server.base_url).expect_err("read should time out");

        assert!(matches!(err, HttpFailure::Transport(_)), "unexpected: {err:?}");
        assert_eq!(err.status(), None);
    }
}
