use async_trait::async_trait;
use reqwest::{
    Client,
    header::{ACCEPT, HeaderMap, HeaderValue},
};

use crate::{
    config::ClientContext,
    error::{ClientError, Problem},
};

use super::Fetch;

const ACCEPT_GEO_JSON: &str = "application/geo+json";

/// [`Fetch`] over HTTPS. Every request carries the configured user agent.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    http: Client,
}

impl HttpFetcher {
    pub fn new(context: &ClientContext) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_GEO_JSON));

        let http = Client::builder()
            .user_agent(context.user_agent.as_str())
            .default_headers(headers)
            .build()?;

        Ok(Self { http })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<serde_json::Value, ClientError> {
        log::debug!("GET {url}");

        let res = self.http.get(url).send().await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            log::warn!("Request to {url} failed with status {status}");
            return Err(failure(url, status.as_u16(), &body));
        }

        serde_json::from_str(&body)
            .map_err(|source| ClientError::Decode { endpoint: url.to_string(), source })
    }
}

/// Error for a non-success response. The API normally answers with problem
/// details; anything else is reported with a shortened body.
fn failure(url: &str, status: u16, body: &str) -> ClientError {
    match serde_json::from_str::<Problem>(body) {
        Ok(problem) if problem.title.is_some() || problem.detail.is_some() => {
            ClientError::Api { status, problem }
        }
        _ => ClientError::Status { url: url.to_string(), status, body: truncate_body(body) },
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((end, _)) => format!("{}...", &body[..end]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn problem_body_becomes_api_error() {
        let body = r#"{
            "type": "https://api.weather.gov/problems/InvalidParameter",
            "title": "Invalid Parameter",
            "status": 400,
            "detail": "Parameter \"area\" is invalid",
            "correlationId": "17b2a9"
        }"#;

        let err = failure("https://api.weather.gov/alerts/active?area=ZZ", 400, body);
        match err {
            ClientError::Api { status, problem } => {
                assert_eq!(status, 400);
                assert_eq!(problem.title.as_deref(), Some("Invalid Parameter"));
                assert_eq!(problem.correlation_id.as_deref(), Some("17b2a9"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn non_json_body_is_truncated() {
        let body = "x".repeat(500);

        let err = failure("https://api.weather.gov/", 502, &body);
        match err {
            ClientError::Status { status, body, .. } => {
                assert_eq!(status, 502);
                assert_eq!(body.len(), 203);
                assert!(body.ends_with("..."));
            }
            other => panic!("expected Status error, got {other:?}"),
        }
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let body = "é".repeat(300);
        let truncated = truncate_body(&body);
        assert_eq!(truncated.chars().count(), 203);
    }

    #[test]
    fn fetcher_builds_from_context() {
        let context = ClientContext {
            user_agent: "(storm-watch, ops@example.com)".into(),
            base_url: "https://api.weather.gov".into(),
        };
        assert!(HttpFetcher::new(&context).is_ok());
    }
}
