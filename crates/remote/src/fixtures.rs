//! Scripted transports shared by the crate's tests.

use std::collections::VecDeque;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::Mutex;

use crate::client::{Credentials, HttpCall, HttpReply, HttpTransport};
use crate::error::ClientError;

pub fn credentials() -> Credentials {
    Credentials { api_key: "api-key".to_string().into(), access_token: "access-token".to_string().into() }
}

pub fn envelope(code: i64, status: &str, response: Value) -> HttpReply {
    HttpReply {
        status: 200,
        body: json!({
            "Response": response,
            "ErrorCode": code,
            "ThrottleSeconds": 0,
            "ErrorStatus": status,
            "Message": status,
            "MessageData": {},
        })
        .to_string(),
    }
}

pub fn throttled() -> HttpReply {
    envelope(36, "ThrottleLimitExceededMomentarily", Value::Null)
}

/// Replies in order, then fails every further call.
#[derive(Default)]
pub struct ScriptedTransport {
    state: Mutex<ScriptedState>,
}

#[derive(Default)]
struct ScriptedState {
    replies: VecDeque<HttpReply>,
    calls: Vec<HttpCall>,
}

impl ScriptedTransport {
    pub fn with_replies(replies: Vec<HttpReply>) -> Self {
        Self { state: Mutex::new(ScriptedState { replies: replies.into(), calls: Vec::new() }) }
    }

    pub fn with_raw(replies: Vec<(u16, String)>) -> Self {
        Self::with_replies(replies.into_iter().map(|(status, body)| HttpReply { status, body }).collect())
    }

    pub async fn calls(&self) -> Vec<HttpCall> {
        self.state.lock().await.calls.clone()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, call: &HttpCall) -> Result<HttpReply, ClientError> {
        let mut state = self.state.lock().await;
        state.calls.push(call.clone());
        state
            .replies
            .pop_front()
            .ok_or_else(|| ClientError::Transport("script exhausted".to_string()))
    }
}

/// Answers by the first route whose fragment appears in the URL.
pub struct RoutedTransport {
    routes: Vec<(String, HttpReply)>,
    calls: Mutex<Vec<HttpCall>>,
}

impl RoutedTransport {
    pub fn new(routes: Vec<(&str, HttpReply)>) -> Self {
        Self {
            routes: routes.into_iter().map(|(fragment, reply)| (fragment.to_string(), reply)).collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub async fn calls(&self) -> Vec<HttpCall> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl HttpTransport for RoutedTransport {
    async fn send(&self, call: &HttpCall) -> Result<HttpReply, ClientError> {
        self.calls.lock().await.push(call.clone());
        self.routes
            .iter()
            .find(|(fragment, _)| call.url.contains(fragment.as_str()))
            .map(|(_, reply)| reply.clone())
            .ok_or_else(|| ClientError::Transport(format!("no route for {}", call.url)))
    }
}
