//! Mock REST Transport
//!
//! Scripted transport for testing: queue responses, record requests.

use std::collections::VecDeque;
use std::sync::Mutex;

use serde_json::Value;

use super::transport::{ApiRequest, ApiResponse, RestError, RestResult, RestTransport};

/// Mock REST transport backed by a response queue.
///
/// Each executed request pops the next scripted response. Executing with an
/// empty queue fails with a connection error, which doubles as a "server
/// unreachable" simulation.
#[derive(Default)]
pub struct MockRestTransport {
    inner: Mutex<MockInner>,
}

#[derive(Default)]
struct MockInner {
    responses: VecDeque<RestResult<ApiResponse>>,
    requests: Vec<ApiRequest>,
}

impl MockRestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response with the given status and JSON body.
    pub fn push_response(&self, status: u16, body: Value) {
        self.inner
            .lock()
            .expect("mock poisoned")
            .responses
            .push_back(Ok(ApiResponse::new(status, body)));
    }

    /// Queues a transport-level error.
    pub fn push_error(&self, error: RestError) {
        self.inner
            .lock()
            .expect("mock poisoned")
            .responses
            .push_back(Err(error));
    }

    /// Returns a copy of every request executed so far.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.inner.lock().expect("mock poisoned").requests.clone()
    }

    /// Returns the number of requests executed so far.
    pub fn request_count(&self) -> usize {
        self.inner.lock().expect("mock poisoned").requests.len()
    }
}

impl RestTransport for MockRestTransport {
    fn execute(&self, request: &ApiRequest) -> RestResult<ApiResponse> {
        let mut inner = self.inner.lock().expect("mock poisoned");
        inner.requests.push(request.clone());
        inner
            .responses
            .pop_front()
            .unwrap_or_else(|| Err(RestError::ConnectionFailed("no scripted response".into())))
    }
}
