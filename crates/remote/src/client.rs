//! One HTTP client against the game API, with bounded throttle retry.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use warmind_core::config::RemoteConfig;

use crate::error::ClientError;
use crate::request::{ApiRequest, Method};
use crate::response::{BaseResponse, StatusResponse};

/// Per-user authentication attached to every request.
#[derive(Clone, Debug)]
pub struct Credentials {
    pub api_key: SecretString,
    pub access_token: SecretString,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThrottlePolicy {
    /// Total sends per request, the first one included.
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for ThrottlePolicy {
    fn default() -> Self {
        Self { max_attempts: 5, backoff: Duration::from_secs(1) }
    }
}

impl ThrottlePolicy {
    pub fn from_config(config: &RemoteConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            backoff: Duration::from_millis(config.throttle_backoff_ms),
        }
    }
}

/// A fully resolved HTTP call, ready for a transport to send.
#[derive(Clone, Debug)]
pub struct HttpCall {
    pub method: Method,
    pub url: String,
    pub body: Option<Value>,
    pub api_key: SecretString,
    pub access_token: SecretString,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, call: &HttpCall) -> Result<HttpReply, ClientError>;
}

/// `reqwest` transport, optionally bound to one local outbound address.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(local_address: Option<IpAddr>, timeout: Duration) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .local_address(local_address)
            .timeout(timeout)
            .tcp_keepalive(Duration::from_secs(30))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, call: &HttpCall) -> Result<HttpReply, ClientError> {
        let builder = match call.method {
            Method::Get => self.client.get(&call.url),
            Method::Post => self.client.post(&call.url),
        };
        let mut builder = builder
            .header("X-Api-Key", call.api_key.expose_secret())
            .bearer_auth(call.access_token.expose_secret());
        if let Some(body) = &call.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(HttpReply { status, body })
    }
}

#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    policy: ThrottlePolicy,
    /// Local address or `default`, for logs.
    label: String,
}

impl Client {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        base_url: impl Into<String>,
        policy: ThrottlePolicy,
        label: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            policy,
            label: label.into(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    fn url(&self, request: &ApiRequest) -> String {
        match request.query() {
            Some(query) => format!("{}{}?{}", self.base_url, request.path, query),
            None => format!("{}{}", self.base_url, request.path),
        }
    }

    /// Sends the request and decodes the envelope. A throttled reply is
    /// retried after the backoff until the attempt cap; the last reply is
    /// returned as-is even if it is still throttled.
    pub async fn execute<T>(
        &self,
        request: &ApiRequest,
        credentials: &Credentials,
    ) -> Result<BaseResponse<T>, ClientError>
    where
        T: DeserializeOwned,
    {
        let call = HttpCall {
            method: request.method,
            url: self.url(request),
            body: request.body.clone(),
            api_key: credentials.api_key.clone(),
            access_token: credentials.access_token.clone(),
        };

        let mut attempt = 1;
        loop {
            debug!(client = %self.label, url = %call.url, attempt, "sending remote request");
            let reply = self.transport.send(&call).await?;
            let response = decode::<T>(&reply)?;

            if !response.is_throttled() {
                return Ok(response);
            }
            if attempt >= self.policy.max_attempts {
                warn!(
                    event_name = "remote.throttle.exhausted",
                    client = %self.label,
                    url = %call.url,
                    attempt,
                    "still throttled after the attempt cap, returning last response"
                );
                return Ok(response);
            }

            debug!(
                event_name = "remote.throttle.retry",
                client = %self.label,
                attempt,
                backoff_ms = self.policy.backoff.as_millis() as u64,
                "throttled, backing off"
            );
            tokio::time::sleep(self.policy.backoff).await;
            attempt += 1;
        }
    }
}

fn decode<T: DeserializeOwned>(reply: &HttpReply) -> Result<BaseResponse<T>, ClientError> {
    // error envelopes often come with non-2xx statuses; the body decides
    serde_json::from_str::<BaseResponse<T>>(&reply.body).map_err(|error| {
        if (200..300).contains(&reply.status) {
            ClientError::Decode(error.to_string())
        } else {
            ClientError::Status { status: reply.status, body: reply.body.clone() }
        }
    })
}
