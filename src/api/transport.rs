use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;

use super::types::RemoteError;
use crate::config::Credential;

const OPERATION: &str = "request";

#[derive(Debug, Clone, PartialEq)]
pub struct GraphqlRequest {
    pub query: String,
    pub variables: serde_json::Value,
}

impl GraphqlRequest {
    pub fn new(query: impl Into<String>, variables: serde_json::Value) -> Self {
        Self {
            query: query.into(),
            variables,
        }
    }
}

/// Sends one GraphQL document and returns its `data` payload
#[async_trait]
pub trait GraphqlTransport: Send + Sync {
    async fn execute(&self, request: GraphqlRequest) -> Result<serde_json::Value, RemoteError>;
}

#[derive(Clone)]
pub struct ReqwestGraphqlTransport {
    endpoint: String,
    credential: Credential,
    client: reqwest::Client,
}

impl fmt::Debug for ReqwestGraphqlTransport {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ReqwestGraphqlTransport")
            .field("endpoint", &self.endpoint)
            .field("credential", &self.credential)
            .finish()
    }
}

impl ReqwestGraphqlTransport {
    pub fn new(
        endpoint: impl Into<String>,
        credential: Credential,
        timeout: Duration,
    ) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("timebook-deck/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|err| {
                RemoteError::new(OPERATION, format!("failed to initialize HTTP client: {err}"))
            })?;

        Ok(Self {
            endpoint: endpoint.into(),
            credential,
            client,
        })
    }
}

#[async_trait]
impl GraphqlTransport for ReqwestGraphqlTransport {
    async fn execute(&self, request: GraphqlRequest) -> Result<serde_json::Value, RemoteError> {
        let mut builder = self.client.post(&self.endpoint).json(&json!({
            "query": request.query,
            "variables": request.variables,
        }));
        if let Some(token) = self.credential.get() {
            builder = builder.header("Authorization", format!("ApiKey {}", token.expose()));
        }

        let response = builder.send().await.map_err(|err| {
            RemoteError::new(OPERATION, format!("failed to call Timebook API: {err}"))
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|err| {
            RemoteError::new(OPERATION, format!("failed to read Timebook response: {err}"))
        })?;

        parse_response(status, &body)
    }
}

#[derive(Debug, Deserialize)]
struct GraphqlResponseEnvelope {
    data: Option<serde_json::Value>,
    errors: Option<Vec<GraphqlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

/// Unwraps a GraphQL HTTP response into its `data` payload.
pub(crate) fn parse_response(status: StatusCode, body: &str) -> Result<serde_json::Value, RemoteError> {
    if !status.is_success() {
        return Err(RemoteError::new(
            OPERATION,
            format!("Timebook API returned HTTP {}: {}", status, truncate_for_error(body)),
        ));
    }

    let envelope: GraphqlResponseEnvelope = serde_json::from_str(body).map_err(|err| {
        RemoteError::new(OPERATION, format!("failed to parse Timebook response JSON: {err}"))
    })?;

    if let Some(errors) = envelope.errors.filter(|errors| !errors.is_empty()) {
        let message = errors
            .into_iter()
            .map(|error| error.message)
            .collect::<Vec<_>>()
            .join("; ");
        return Err(RemoteError::new(OPERATION, format!("GraphQL query failed: {message}")));
    }

    envelope.data.ok_or_else(|| {
        RemoteError::new(OPERATION, "Timebook response did not include a data payload")
    })
}

fn truncate_for_error(body: &str) -> String {
    const MAX_LEN: usize = 200;
    if body.chars().count() <= MAX_LEN {
        body.to_owned()
    } else {
        format!("{}...", body.chars().take(MAX_LEN).collect::<String>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_data_payload() {
        let data = parse_response(StatusCode::OK, r#"{"data":{"currentTracking":null}}"#).unwrap();
        assert_eq!(data, json!({ "currentTracking": null }));
    }

    #[test]
    fn test_http_error_status() {
        let err = parse_response(StatusCode::UNAUTHORIZED, "nope").unwrap_err();
        assert!(err.message.contains("401"));
        assert_eq!(err.operation, "request");
    }

    #[test]
    fn test_graphql_errors_are_joined() {
        let body = r#"{"data":null,"errors":[{"message":"Unauthorized"},{"message":"Bad task"}]}"#;
        let err = parse_response(StatusCode::OK, body).unwrap_err();
        assert!(err.message.contains("Unauthorized; Bad task"));
    }

    #[test]
    fn test_empty_errors_array_is_fine() {
        let body = r#"{"data":{"trackingStop":null},"errors":[]}"#;
        assert!(parse_response(StatusCode::OK, body).is_ok());
    }

    #[test]
    fn test_missing_data() {
        let err = parse_response(StatusCode::OK, "{}").unwrap_err();
        assert!(err.message.contains("data payload"));
    }

    #[test]
    fn test_invalid_json() {
        let err = parse_response(StatusCode::OK, "<html>").unwrap_err();
        assert!(err.message.contains("parse"));
    }

    #[test]
    fn test_truncate_for_error() {
        let long = "x".repeat(500);
        let truncated = truncate_for_error(&long);
        assert_eq!(truncated.len(), 203);
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn test_debug_redacts_token() {
        let credential = Credential::default();
        credential.set(Some("hunter2"));
        let transport = ReqwestGraphqlTransport::new(
            "http://localhost:3000/api/graphql",
            credential,
            Duration::from_secs(1),
        )
        .unwrap();
        let debug = format!("{:?}", transport);
        assert!(debug.contains("localhost:3000"));
        assert!(!debug.contains("hunter2"));
    }
}
