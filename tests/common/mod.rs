#![allow(dead_code)]

use async_trait::async_trait;
use poloniex::core::config::ExchangeConfig;
use poloniex::core::kernel::{HttpClient, HttpRequest, HttpResponse};
use poloniex::ExchangeError;
use std::collections::VecDeque;
use std::env;
use std::sync::Mutex;

/// Test configuration utilities
pub struct TestConfig;

impl TestConfig {
    /// Live tests hit poloniex.com and only run when asked to
    pub fn should_run_live_tests() -> bool {
        env::var("RUN_LIVE_TESTS").unwrap_or_default() == "true"
    }

    pub fn test_timeout_seconds() -> u64 {
        env::var("TEST_TIMEOUT_SECONDS")
            .unwrap_or_default()
            .parse()
            .unwrap_or(30)
    }

    pub fn create_safe_config() -> ExchangeConfig {
        ExchangeConfig::new("test_api_key".to_string(), "test_secret_key".to_string())
            .start_nonce(100)
            .retry_delays(vec![0, 0, 0])
    }

    pub fn create_config_from_env(prefix: &str) -> ExchangeConfig {
        ExchangeConfig::from_env(prefix).unwrap_or_else(|_| ExchangeConfig::read_only())
    }
}

/// One scripted transport outcome
#[derive(Debug, Clone)]
pub enum Reply {
    Json(u16, String),
    NetworkFailure(String),
}

impl Reply {
    pub fn ok(body: &str) -> Self {
        Self::Json(200, body.to_string())
    }

    pub fn error(message: &str) -> Self {
        Self::Json(200, serde_json::json!({ "error": message }).to_string())
    }
}

/// Transport double: records requests, replays queued replies, then falls
/// back to a fixed reply.
pub struct ScriptedHttp {
    requests: Mutex<Vec<HttpRequest>>,
    replies: Mutex<VecDeque<Reply>>,
    fallback: Reply,
    yield_on_send: bool,
}

impl ScriptedHttp {
    pub fn new(fallback: Reply) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            replies: Mutex::new(VecDeque::new()),
            fallback,
            yield_on_send: false,
        }
    }

    pub fn with_replies(fallback: Reply, replies: Vec<Reply>) -> Self {
        let http = Self::new(fallback);
        http.replies.lock().unwrap().extend(replies);
        http
    }

    /// Give the scheduler a chance to interleave other callers mid-send
    pub fn yielding(mut self) -> Self {
        self.yield_on_send = true;
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl HttpClient for ScriptedHttp {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ExchangeError> {
        self.requests.lock().unwrap().push(request);
        if self.yield_on_send {
            tokio::task::yield_now().await;
        }

        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());

        match reply {
            Reply::Json(status, body) => Ok(HttpResponse::new(status, body)),
            Reply::NetworkFailure(message) => Err(ExchangeError::NetworkError(message)),
        }
    }
}

/// Extract a form field from a signed request body
pub fn form_field(request: &HttpRequest, key: &str) -> Option<String> {
    request.body.as_deref()?.split('&').find_map(|pair| {
        pair.split_once('=')
            .filter(|(k, _)| *k == key)
            .map(|(_, v)| v.to_string())
    })
}

pub fn header<'a>(request: &'a HttpRequest, name: &str) -> Option<&'a str> {
    request
        .headers
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}
