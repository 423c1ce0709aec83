// SPDX-FileCopyrightText: 2026 Nido Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Reqwest-backed REST transport.
//!
//! Production implementation of [`RestTransport`] using a blocking reqwest
//! client with rustls.

use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::Value;

use super::transport::{
    ApiRequest, ApiResponse, Method, RestConfig, RestError, RestResult, RestTransport,
};

/// REST transport backed by `reqwest::blocking`.
pub struct ReqwestRestTransport {
    client: Client,
    base_url: String,
}

impl ReqwestRestTransport {
    /// Creates a transport from config.
    pub fn new(config: &RestConfig) -> Result<Self, RestError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(format!(
                "Nido/{}",
                option_env!("CARGO_PKG_VERSION").unwrap_or("0.1.0")
            ))
            .build()
            .map_err(|e| RestError::ConnectionFailed(e.to_string()))?;

        Ok(ReqwestRestTransport {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Returns the base URL this transport targets.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl RestTransport for ReqwestRestTransport {
    fn execute(&self, request: &ApiRequest) -> RestResult<ApiResponse> {
        let url = format!("{}{}", self.base_url, request.path);

        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
            Method::Delete => self.client.delete(&url),
        };

        if let Some(bearer) = &request.bearer {
            builder = builder.bearer_auth(bearer);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().map_err(|e| {
            if e.is_timeout() {
                RestError::Timeout
            } else {
                RestError::ConnectionFailed(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .map_err(|e| RestError::InvalidResponse(e.to_string()))?;

        // Empty and non-JSON bodies are carried as Null; the session layer
        // decides what a missing body means for each endpoint.
        let body = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::Null)
        };

        Ok(ApiResponse::new(status, body))
    }
}
