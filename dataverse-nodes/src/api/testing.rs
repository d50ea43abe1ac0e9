//! Test doubles for the transport and clock seams

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::Mutex;

use super::auth::Clock;
use super::transport::{HttpRequest, HttpResponse, Transport};
use crate::error::{DataverseError, Result};

/// Records every request; answers token requests with a fixed token and
/// everything else from a FIFO queue (falling back to `200 {}`)
#[derive(Debug)]
pub struct MockTransport {
    token_response: Mutex<Result<HttpResponse>>,
    responses: Mutex<VecDeque<Result<HttpResponse>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            token_response: Mutex::new(Ok(HttpResponse::json(
                200,
                &json!({"access_token": "token-1", "expires_in": 3600, "token_type": "Bearer"}),
            ))),
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn set_token_response(&self, response: HttpResponse) {
        *self.token_response.lock().unwrap() = Ok(response);
    }

    /// Fail every token request with `error`, as if the endpoint were unreachable
    pub fn set_token_error(&self, error: DataverseError) {
        *self.token_response.lock().unwrap() = Err(error);
    }

    pub fn push_json(&self, status: u16, body: Value) {
        self.push(Ok(HttpResponse::json(status, &body)));
    }

    pub fn push(&self, response: Result<HttpResponse>) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn token_requests(&self) -> Vec<HttpRequest> {
        self.requests()
            .into_iter()
            .filter(|r| is_token_request(r))
            .collect()
    }

    pub fn api_requests(&self) -> Vec<HttpRequest> {
        self.requests()
            .into_iter()
            .filter(|r| !is_token_request(r))
            .collect()
    }
}

fn is_token_request(request: &HttpRequest) -> bool {
    request.url.ends_with("/oauth2/v2.0/token")
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let token = is_token_request(&request);
        self.requests.lock().unwrap().push(request);
        if token {
            return self.token_response.lock().unwrap().clone();
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(HttpResponse::json(200, &json!({}))))
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()),
        }
    }

    pub fn advance_secs(&self, secs: i64) {
        let mut now = self.now.lock().unwrap();
        *now += Duration::seconds(secs);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}
