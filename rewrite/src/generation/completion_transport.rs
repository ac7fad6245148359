// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::pin::Pin;

use async_trait::async_trait;
use futures_core::Stream;
use futures_util::StreamExt;
use miette::IntoDiagnostic;
use serde::Serialize;

use crate::{ApiKey, DEBUG_GENERATION_MOD, StreamError};

mod constants {
    pub const USER_AGENT: &str = "r3bl-rewrite/0.1";
}

/// Raw response body chunks, as they arrive off the wire.
pub type ByteChunkStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>, StreamError>> + Send>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEndpoint {
    pub url: String,
    pub api_key: ApiKey,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Chat completion request body. Always streamed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub stream: bool,
}

impl CompletionRequest {
    #[must_use]
    pub fn new(model: &str, prompt: String, max_tokens: u32, temperature: f32) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt,
            }],
            max_tokens,
            temperature,
            stream: true,
        }
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        self.messages
            .first()
            .map_or("", |it| it.content.as_str())
    }
}

/// Opens one streaming completion request. Dropping the returned stream aborts the
/// transfer.
#[async_trait]
pub trait CompletionTransport: Send + Sync {
    async fn open_stream(
        &self,
        endpoint: &ProviderEndpoint,
        request: &CompletionRequest,
    ) -> Result<ByteChunkStream, StreamError>;
}

/// HTTPS transport: `POST` with a bearer token and a JSON body.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// # Errors
    ///
    /// Returns an error if the HTTP client can't be built (eg: TLS backend
    /// initialization fails).
    pub fn try_new() -> miette::Result<Self> {
        Ok(Self {
            client: create_client_with_user_agent(None)?,
        })
    }
}

/// # Errors
///
/// Returns an error if:
/// - The HTTP client builder fails to build
/// - TLS backend initialization fails
pub fn create_client_with_user_agent(
    user_agent: Option<&str>,
) -> miette::Result<reqwest::Client> {
    let it = reqwest::Client::builder()
        .user_agent(user_agent.map_or_else(
            /* none */ || constants::USER_AGENT.to_owned(),
            /* some */ ToOwned::to_owned,
        ))
        .build();
    it.into_diagnostic()
}

#[async_trait]
impl CompletionTransport for ReqwestTransport {
    async fn open_stream(
        &self,
        endpoint: &ProviderEndpoint,
        request: &CompletionRequest,
    ) -> Result<ByteChunkStream, StreamError> {
        let response = self
            .client
            .post(&endpoint.url)
            .bearer_auth(endpoint.api_key.expose())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // % is Display, ? is Debug.
            tracing::error!(
                message = "Completion request rejected",
                status = %status,
                body = %body
            );
            return Err(StreamError::Http {
                status: status.as_u16(),
            });
        }

        DEBUG_GENERATION_MOD.then(|| {
            // % is Display, ? is Debug.
            tracing::debug!(
                message = "Completion stream opened",
                model = %request.model,
                temperature = %request.temperature
            );
        });

        let stream = response
            .bytes_stream()
            .map(|it| it.map(|bytes| bytes.to_vec()).map_err(StreamError::from));
        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_request_body_shape() {
        let request = CompletionRequest::new("gpt-4.1-mini", "Fix:\n\n\"helo\"".into(), 500, 0.7);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4.1-mini");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "Fix:\n\n\"helo\"");
        assert_eq!(json["max_tokens"], 500);
        assert_eq!(json["stream"], true);
        assert!((json["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
        assert_eq!(request.prompt(), "Fix:\n\n\"helo\"");
    }

    #[test]
    fn test_client_builds() {
        assert!(ReqwestTransport::try_new().is_ok());
        assert!(create_client_with_user_agent(Some("test/1.0")).is_ok());
    }
}
