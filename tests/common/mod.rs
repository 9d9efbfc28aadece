// These helpers are shared across integration tests
#![allow(dead_code)]

pub mod fake_client;
pub mod mock_server;

use prime_bench::{Endpoint, WorkloadItem};

pub fn endpoints(n: u16) -> Vec<Endpoint> {
    (0..n)
        .map(|i| Endpoint::new(format!("10.0.0.{}", i + 1), 9000))
        .collect()
}

pub fn items(values: &[i64]) -> Vec<WorkloadItem> {
    values
        .iter()
        .enumerate()
        .map(|(index, value)| WorkloadItem {
            index,
            value: *value,
        })
        .collect()
}

/// Trial division, good enough for the small values used in tests
pub fn is_prime(n: i64) -> bool {
    if n < 2 {
        return false;
    }
    let mut d = 2;
    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 1;
    }
    true
}
