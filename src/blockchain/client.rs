// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Full node client for view-function calls.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default per-request timeout for node calls.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(15);

/// Body of a `POST /view` request.
#[derive(Debug, Serialize)]
struct ViewRequest<'a> {
    function: &'a str,
    type_arguments: Vec<String>,
    arguments: Vec<Value>,
}

/// Error body returned by the node on non-2xx responses.
#[derive(Debug, Default, Deserialize)]
struct NodeErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    error_code: String,
    #[serde(default)]
    vm_error_code: Option<u64>,
}

impl NodeErrorBody {
    /// Whether the node rejected the call because the function is not
    /// published on chain.
    fn is_missing_function(&self) -> bool {
        let message = self.message.to_ascii_lowercase();
        self.error_code == "function_not_found"
            || message.contains("function_resolution_failure")
            || message.contains("function not found")
            || message.contains("could not find entry function")
            || message.contains("linker_error")
    }
}

/// Full node REST client.
#[derive(Debug, Clone)]
pub struct NodeClient {
    /// Base URL, e.g. `https://api.mainnet.aptoslabs.com/v1`
    base_url: String,
    http: Client,
}

impl NodeClient {
    /// Create a new client against the given node base URL.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, NodeClientError> {
        let base_url: String = base_url.into();
        url::Url::parse(&base_url).map_err(|e| NodeClientError::InvalidUrl(e.to_string()))?;

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NodeClientError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Node base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Call a view function and return its raw JSON result values.
    pub async fn view(
        &self,
        function: &str,
        arguments: Vec<Value>,
    ) -> Result<Vec<Value>, NodeClientError> {
        let body = ViewRequest {
            function,
            type_arguments: Vec::new(),
            arguments,
        };

        let response = self
            .http
            .post(format!("{}/view", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| NodeClientError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let error: NodeErrorBody = serde_json::from_str(&text).unwrap_or_default();
            if error.is_missing_function() {
                return Err(NodeClientError::MissingFunction(function.to_string()));
            }
            return Err(NodeClientError::Status {
                status: status.as_u16(),
                message: if error.message.is_empty() {
                    text
                } else {
                    match error.vm_error_code {
                        Some(code) => format!("{} (vm error {code})", error.message),
                        None => error.message,
                    }
                },
            });
        }

        response
            .json::<Vec<Value>>()
            .await
            .map_err(|e| NodeClientError::Decode(e.to_string()))
    }
}

/// Errors that can occur during node calls.
#[derive(Debug, thiserror::Error)]
pub enum NodeClientError {
    #[error("Invalid node URL: {0}")]
    InvalidUrl(String),

    #[error("Node request failed: {0}")]
    Request(String),

    #[error("Node returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("View function not available: {0}")]
    MissingFunction(String),

    #[error("Malformed view response: {0}")]
    Decode(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_url() {
        let err = NodeClient::new("not a url", DEFAULT_HTTP_TIMEOUT).unwrap_err();
        assert!(matches!(err, NodeClientError::InvalidUrl(_)));
    }

    #[test]
    fn trims_trailing_slash() {
        let client = NodeClient::new("https://node.example/v1/", DEFAULT_HTTP_TIMEOUT).unwrap();
        assert_eq!(client.base_url(), "https://node.example/v1");
    }

    #[test]
    fn detects_missing_function_errors() {
        let body: NodeErrorBody = serde_json::from_str(
            r#"{"message":"FUNCTION_RESOLUTION_FAILURE: get_pending_withdrawal","error_code":"invalid_input","vm_error_code":null}"#,
        )
        .unwrap();
        assert!(body.is_missing_function());

        let body: NodeErrorBody =
            serde_json::from_str(r#"{"message":"rate limited","error_code":"web_framework_error"}"#)
                .unwrap();
        assert!(!body.is_missing_function());
    }
}
