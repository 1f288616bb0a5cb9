//! Scripted in-memory transport for tests
//!
//! A responder closure decides the response for each request. Every request
//! is recorded so tests can assert on what was sent and how often a given
//! endpoint was hit.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use crate::{HttpRequest, HttpResponse, Result, Transport};

type Responder = dyn Fn(&HttpRequest) -> Result<HttpResponse> + Send + Sync;

pub struct MockTransport {
    responder: Box<Responder>,
    latency: Option<Duration>,
    requests: Mutex<Vec<HttpRequest>>,
    calls: AtomicUsize,
}

impl MockTransport {
    pub fn new(
        responder: impl Fn(&HttpRequest) -> Result<HttpResponse> + Send + Sync + 'static,
    ) -> Self {
        Self {
            responder: Box::new(responder),
            latency: None,
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Delay every response, widening the window for concurrent callers.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Total number of executed requests.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of executed requests whose URL contains `fragment`.
    pub fn calls_matching(&self, fragment: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.url.contains(fragment))
            .count()
    }

    /// Snapshot of every request received so far, in arrival order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Transport for MockTransport {
    fn execute(
        &self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse>> + Send + '_>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(request.clone());

            if let Some(latency) = self.latency {
                tokio::time::sleep(latency).await;
            }

            (self.responder)(&request)
        })
    }
}
