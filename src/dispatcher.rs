//! Bounded-concurrency dispatch of one trial's workload
//!
//! Every item is spawned onto the multi-threaded runtime and waits for a
//! semaphore permit before calling out, so at most `max_concurrency` calls are
//! in flight. Each join handle travels together with the item and endpoint it
//! was created for; completions are drained in whatever order they finish.

use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::{sync::Semaphore, task::JoinHandle};
use tracing::{debug, error};

use crate::{
    client::{timed_classify, CallResult, ClassifyClient},
    endpoint::{Endpoint, RoundRobinSelector},
    outcome::{Classification, Outcome},
    workload::WorkloadItem,
};

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("max_concurrency must be at least 1")]
    InvalidConcurrency,

    #[error("Trial {trial} recorded {actual} outcomes for {expected} items")]
    Incomplete {
        trial: u32,
        expected: usize,
        actual: usize,
    },
}

/// A spawned call and the context it was created for
struct PendingCall {
    item: WorkloadItem,
    endpoint: Endpoint,
    handle: JoinHandle<Result<CallResult, String>>,
}

struct SettledCall {
    item: WorkloadItem,
    endpoint: Endpoint,
    result: Result<CallResult, String>,
}

impl PendingCall {
    async fn settle(self) -> SettledCall {
        let result = match self.handle.await {
            Ok(result) => result,
            Err(e) => Err(format!("call task failed: {}", e)),
        };
        SettledCall {
            item: self.item,
            endpoint: self.endpoint,
            result,
        }
    }
}

pub struct Dispatcher<C: ?Sized> {
    client: Arc<C>,
    selector: RoundRobinSelector,
    max_concurrency: usize,
}

impl<C> Dispatcher<C>
where
    C: ClassifyClient + ?Sized + 'static,
{
    pub fn new(
        client: Arc<C>,
        selector: RoundRobinSelector,
        max_concurrency: usize,
    ) -> Result<Self, DispatchError> {
        if max_concurrency == 0 {
            return Err(DispatchError::InvalidConcurrency);
        }
        Ok(Self {
            client,
            selector,
            max_concurrency,
        })
    }

    pub fn selector(&self) -> &RoundRobinSelector {
        &self.selector
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Dispatch every item of `trial` and return one outcome per item, in
    /// completion order.
    pub async fn dispatch(
        &self,
        trial: u32,
        items: &[WorkloadItem],
    ) -> Result<Vec<Outcome>, DispatchError> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut pending = FuturesUnordered::new();

        for item in items {
            let endpoint = self.selector.select(item.index).clone();
            let client = Arc::clone(&self.client);
            let semaphore = Arc::clone(&semaphore);
            let call_endpoint = endpoint.clone();
            let value = item.value;

            let handle = tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| format!("concurrency limiter closed: {}", e))?;
                Ok::<_, String>(timed_classify(client.as_ref(), &call_endpoint, value).await)
            });

            pending.push(
                PendingCall {
                    item: *item,
                    endpoint,
                    handle,
                }
                .settle(),
            );
        }

        let mut outcomes = Vec::with_capacity(items.len());
        while let Some(settled) = pending.next().await {
            outcomes.push(into_outcome(trial, settled));
        }

        if outcomes.len() != items.len() {
            return Err(DispatchError::Incomplete {
                trial,
                expected: items.len(),
                actual: outcomes.len(),
            });
        }

        Ok(outcomes)
    }
}

fn into_outcome(trial: u32, settled: SettledCall) -> Outcome {
    let SettledCall {
        item,
        endpoint,
        result,
    } = settled;

    let (classification, latency) = match result {
        Ok(call) => {
            debug!(
                "Trial {}, Number: {}, Prime: {}, Time: {:.4}s, Server: {}",
                trial,
                item.value,
                call.classification,
                call.latency.as_secs_f64(),
                endpoint
            );
            (call.classification, Some(call.latency))
        }
        Err(e) => {
            error!("Trial {}, Number: {}, Error: {}", trial, item.value, e);
            (Classification::Unavailable, None)
        }
    };

    Outcome {
        trial,
        index: item.index,
        value: item.value,
        classification,
        latency,
        endpoint,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::client::ClientError;

    struct EvenIsPrime;

    #[async_trait]
    impl ClassifyClient for EvenIsPrime {
        async fn classify(&self, _endpoint: &Endpoint, value: i64) -> Result<bool, ClientError> {
            tokio::time::sleep(Duration::from_millis(1)).await;
            Ok(value % 2 == 0)
        }

        fn name(&self) -> &'static str {
            "even"
        }
    }

    fn selector() -> RoundRobinSelector {
        RoundRobinSelector::new(vec![Endpoint::new("a", 1), Endpoint::new("b", 2)]).unwrap()
    }

    fn items(n: usize) -> Vec<WorkloadItem> {
        (0..n)
            .map(|index| WorkloadItem {
                index,
                value: index as i64 * 10 + 1,
            })
            .collect()
    }

    #[test]
    fn test_rejects_zero_concurrency() {
        let result = Dispatcher::new(Arc::new(EvenIsPrime), selector(), 0);
        assert!(matches!(result, Err(DispatchError::InvalidConcurrency)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_one_outcome_per_item() {
        let dispatcher = Dispatcher::new(Arc::new(EvenIsPrime), selector(), 3).unwrap();
        let items = items(25);
        let mut outcomes = dispatcher.dispatch(4, &items).await.unwrap();
        assert_eq!(outcomes.len(), 25);

        outcomes.sort_by_key(|o| o.index);
        for (outcome, item) in outcomes.iter().zip(&items) {
            assert_eq!(outcome.trial, 4);
            assert_eq!(outcome.value, item.value);
            assert_eq!(outcome.endpoint, *dispatcher.selector().select(item.index));
            assert_eq!(outcome.classification, Classification::False);
            assert!(outcome.latency.is_some());
        }
    }

    #[tokio::test]
    async fn test_empty_trial() {
        let dispatcher = Dispatcher::new(Arc::new(EvenIsPrime), selector(), 3).unwrap();
        assert!(dispatcher.dispatch(1, &[]).await.unwrap().is_empty());
    }
}
