use std::{
    collections::HashSet,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use prime_bench::{ClassifyClient, ClientError, Endpoint};

use super::is_prime;

/// Instrumented client that answers locally and records concurrency
pub struct FakeClient {
    delay: Duration,
    fail_values: HashSet<i64>,
    panic_values: HashSet<i64>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
    seen: Mutex<Vec<(Endpoint, i64)>>,
}

impl FakeClient {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            fail_values: HashSet::new(),
            panic_values: HashSet::new(),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Calls for `value` return a transport error
    pub fn failing_on(mut self, value: i64) -> Self {
        self.fail_values.insert(value);
        self
    }

    /// Calls for `value` panic inside the task
    pub fn panicking_on(mut self, value: i64) -> Self {
        self.panic_values.insert(value);
        self
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<(Endpoint, i64)> {
        self.seen.lock().unwrap().clone()
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ClassifyClient for FakeClient {
    async fn classify(&self, endpoint: &Endpoint, value: i64) -> Result<bool, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = InFlight(&self.in_flight);
        self.peak.fetch_max(current, Ordering::SeqCst);
        self.seen.lock().unwrap().push((endpoint.clone(), value));

        tokio::time::sleep(self.delay).await;

        if self.panic_values.contains(&value) {
            panic!("injected panic for {}", value);
        }
        if self.fail_values.contains(&value) {
            return Err(ClientError::Other(format!("injected failure for {}", value)));
        }
        Ok(is_prime(value))
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}
