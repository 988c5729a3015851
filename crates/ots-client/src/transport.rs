use async_trait::async_trait;
use ots::protocol::{RawResponse, SignedRequest};
use ots::{Error, Result};
use std::sync::Arc;

/// Moves a signed request to the service and returns the raw response.
///
/// Implementations report connection and I/O failures as
/// [`Error::Transport`]; any HTTP status, including errors, is a successful
/// exchange and comes back as a [`RawResponse`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: SignedRequest) -> Result<RawResponse>;
}

#[async_trait]
impl<T> Transport for Arc<T>
where
    T: Transport + ?Sized,
{
    async fn send(&self, request: SignedRequest) -> Result<RawResponse> {
        (**self).send(request).await
    }
}

#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a caller-configured client, e.g. one with timeouts or a proxy.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: SignedRequest) -> Result<RawResponse> {
        let mut builder = self.client.post(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let response = builder
            .body(request.body)
            .send()
            .await
            .map_err(|err| Error::Transport(format!("http post failed: {err}")))?;

        let status = response.status().as_u16();
        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|err| Error::Transport(format!("http read body failed: {err}")))?;

        Ok(RawResponse::new(status, headers, body.to_vec()))
    }
}
