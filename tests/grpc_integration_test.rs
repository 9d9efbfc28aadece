//! End-to-end runs against in-process gRPC servers

mod common;

use std::time::Duration;

use common::mock_server::{start_mock_server, unreachable_endpoint, MockPrimeServer};
use prime_bench::{
    client::timed_classify, Classification, ClassifyClient, ClientError, GrpcClassifyClient,
    RunConfig, Runner, WorkloadPolicy,
};

fn grpc_client() -> GrpcClassifyClient {
    GrpcClassifyClient::new(Duration::from_secs(2), Duration::from_secs(5))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_classify_against_mock_server() {
    let handle = start_mock_server(MockPrimeServer::new()).await;
    let client = grpc_client();

    assert!(client.classify(&handle.endpoint, 7919).await.unwrap());
    assert!(!client.classify(&handle.endpoint, 7917).await.unwrap());
    assert_eq!(handle.server.requests(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_remote_status_is_an_error() {
    let handle = start_mock_server(MockPrimeServer::rejecting(13)).await;
    let client = grpc_client();

    let err = client.classify(&handle.endpoint, 13).await.unwrap_err();
    assert!(matches!(err, ClientError::Rpc { code: tonic::Code::Internal, .. }));

    let result = timed_classify(&client, &handle.endpoint, 13).await;
    assert_eq!(result.classification, Classification::Error);
    assert!(result.latency > Duration::ZERO);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_run_across_servers_with_one_down() {
    let first = start_mock_server(MockPrimeServer::new()).await;
    let second = start_mock_server(MockPrimeServer::new()).await;
    let down = unreachable_endpoint();

    let config = RunConfig::builder()
        .trials(2)
        .numbers_per_trial(30)
        .endpoints(vec![
            first.endpoint.clone(),
            second.endpoint.clone(),
            down.clone(),
        ])
        .workload(WorkloadPolicy::Uniform {
            low: 2,
            high: 10_000,
            seed: Some(42),
            reseed_per_trial: true,
        })
        .max_concurrency(10)
        .connect_timeout_ms(1_000)
        .request_timeout_ms(5_000)
        .build()
        .unwrap();

    let runner = Runner::grpc(config).unwrap();
    let report = runner.run().await.unwrap();

    assert_eq!(report.outcomes.len(), 60);
    for outcome in &report.outcomes {
        if outcome.endpoint == down {
            assert_eq!(outcome.classification, Classification::Error);
            assert!(outcome.latency.is_some());
        } else {
            assert_eq!(
                outcome.classification,
                Classification::from_bool(common::is_prime(outcome.value))
            );
        }
    }

    // 10 items per trial land on each server
    assert_eq!(first.server.requests(), 20);
    assert_eq!(second.server.requests(), 20);

    // the unreachable endpoint contributes no aggregate rows
    assert_eq!(report.rows.len(), 4);
    assert!(report.rows.iter().all(|r| r.endpoint.as_ref() != Some(&down)));
    assert_eq!(report.summary.errors, 20);
}
