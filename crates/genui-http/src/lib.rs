// SPDX-License-Identifier: MIT OR Apache-2.0
//! HTTP access to a genui backend.
//!
//! [`BackendClient`] knows the three endpoints: the non-streaming basic
//! exchange, the streaming text exchange, and the structured dashboard
//! document. The streaming endpoint is exposed as an [`HttpSource`], a
//! [`ByteSource`] that a session pulls chunks from.
#![deny(unsafe_code)]
#![warn(missing_docs)]

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::BoxStream;
use genui_config::{EndpointsConfig, GenUiConfig};
use genui_core::{BasicResponse, ChatRequest};
use genui_error::{ErrorCode, GenUiError};
use genui_session::ByteSource;
use serde_json::Value;
use tracing::{debug, info, warn};

/// How much of an error response body is kept in the error context.
const BODY_EXCERPT_CHARS: usize = 512;

/// Client for the three backend endpoints.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
    endpoints: EndpointsConfig,
}

impl BackendClient {
    /// Client for `base_url` with the default endpoint paths.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            endpoints: EndpointsConfig::default(),
        }
    }

    /// Client configured from `config`.
    pub fn from_config(config: &GenUiConfig) -> Self {
        Self::new(config.backend_url()).with_endpoints(config.endpoints.clone())
    }

    /// Override the endpoint paths.
    #[must_use]
    pub fn with_endpoints(mut self, endpoints: EndpointsConfig) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL of `path`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// One message in, one complete response out.
    pub async fn basic(&self, message: &str) -> Result<BasicResponse, GenUiError> {
        let url = self.url(self.endpoints.basic());
        let resp = send(&self.http, &url, &ChatRequest::new(message)).await?;
        resp.json::<BasicResponse>().await.map_err(|e| {
            GenUiError::new(ErrorCode::DecodeMalformed, "basic response is not valid JSON")
                .with_context("url", &url)
                .with_source(e)
        })
    }

    /// Streaming text exchange. The request is sent when the session opens the source.
    pub fn stream(&self, message: &str) -> HttpSource {
        HttpSource::new(
            self.http.clone(),
            self.url(self.endpoints.stream()),
            ChatRequest::new(message),
        )
    }

    /// Structured exchange: fetch one JSON document for the dashboard.
    ///
    /// The document is returned as-is; apply it with the dashboard reducer.
    pub async fn ui_document(&self, message: &str) -> Result<Value, GenUiError> {
        let url = self.url(self.endpoints.ui());
        let resp = send(&self.http, &url, &ChatRequest::new(message)).await?;
        resp.json::<Value>().await.map_err(|e| {
            GenUiError::new(ErrorCode::DecodeMalformed, "ui response is not valid JSON")
                .with_context("url", &url)
                .with_source(e)
        })
    }
}

/// POST `body` to `url` and insist on a success status.
async fn send(
    http: &reqwest::Client,
    url: &str,
    body: &ChatRequest,
) -> Result<reqwest::Response, GenUiError> {
    info!(target: "genui.http", %url, "POST");
    let resp = http.post(url).json(body).send().await.map_err(|e| {
        GenUiError::new(ErrorCode::TransportConnect, format!("cannot reach {url}"))
            .with_context("url", url)
            .with_source(e)
    })?;

    let status = resp.status();
    if status.is_success() {
        debug!(target: "genui.http", %url, status = status.as_u16(), "response headers received");
        return Ok(resp);
    }

    let excerpt: String = resp
        .text()
        .await
        .unwrap_or_default()
        .chars()
        .take(BODY_EXCERPT_CHARS)
        .collect();
    warn!(target: "genui.http", %url, status = status.as_u16(), "backend returned an error status");
    Err(
        GenUiError::new(ErrorCode::TransportStatus, format!("backend answered {status}"))
            .with_context("url", url)
            .with_context("status", status.as_u16())
            .with_context("body", excerpt),
    )
}

/// Streaming response body as a [`ByteSource`].
pub struct HttpSource {
    http: reqwest::Client,
    url: String,
    body: ChatRequest,
    stream: Option<BoxStream<'static, reqwest::Result<Vec<u8>>>>,
}

impl HttpSource {
    /// Source that POSTs `body` to `url` when opened.
    pub fn new(http: reqwest::Client, url: impl Into<String>, body: ChatRequest) -> Self {
        Self {
            http,
            url: url.into(),
            body,
            stream: None,
        }
    }

    /// Target URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl std::fmt::Debug for HttpSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSource")
            .field("url", &self.url)
            .field("open", &self.stream.is_some())
            .finish()
    }
}

#[async_trait]
impl ByteSource for HttpSource {
    async fn open(&mut self) -> Result<(), GenUiError> {
        let resp = send(&self.http, &self.url, &self.body).await?;
        self.stream = Some(resp.bytes_stream().map(|r| r.map(|b| b.to_vec())).boxed());
        Ok(())
    }

    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, GenUiError> {
        let Some(stream) = self.stream.as_mut() else {
            return Err(GenUiError::new(
                ErrorCode::Internal,
                "HttpSource read before open",
            ));
        };
        match stream.next().await {
            Some(Ok(chunk)) => {
                debug!(target: "genui.http", bytes = chunk.len(), "chunk received");
                Ok(Some(chunk))
            }
            Some(Err(e)) => Err(GenUiError::new(
                ErrorCode::TransportRead,
                format!("reading {} failed", self.url),
            )
            .with_context("url", &self.url)
            .with_source(e)),
            None => {
                debug!(target: "genui.http", url = %self.url, "body finished");
                Ok(None)
            }
        }
    }
}
