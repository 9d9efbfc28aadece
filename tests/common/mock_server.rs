use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use prime_bench::{
    client::proto::{
        is_prime_func_server::{IsPrimeFunc, IsPrimeFuncServer},
        IsPrimeReply, Value,
    },
    Endpoint,
};
use tokio::{net::TcpListener, sync::oneshot};
use tokio_stream::wrappers::TcpListenerStream;
use tonic::{transport::Server, Request, Response, Status};

use super::is_prime;

/// In-process `IsPrimeFunc` server
#[derive(Clone, Default)]
pub struct MockPrimeServer {
    requests: Arc<AtomicUsize>,
    /// Requests for this value are rejected with `INTERNAL`
    reject_value: Option<i64>,
}

impl MockPrimeServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting(value: i64) -> Self {
        Self {
            reject_value: Some(value),
            ..Default::default()
        }
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[tonic::async_trait]
impl IsPrimeFunc for MockPrimeServer {
    async fn check_prime(&self, request: Request<Value>) -> Result<Response<IsPrimeReply>, Status> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let value = request.into_inner().value;
        if self.reject_value == Some(value) {
            return Err(Status::internal(format!("rejected {}", value)));
        }
        Ok(Response::new(IsPrimeReply {
            is_prime: is_prime(value),
        }))
    }
}

/// A running mock server; dropping the handle shuts it down
pub struct MockServerHandle {
    pub endpoint: Endpoint,
    pub server: MockPrimeServer,
    _shutdown: oneshot::Sender<()>,
}

pub async fn start_mock_server(server: MockPrimeServer) -> MockServerHandle {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock server");
    let port = listener.local_addr().expect("No local addr").port();
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let service = IsPrimeFuncServer::new(server.clone());
    tokio::spawn(async move {
        let _ = Server::builder()
            .add_service(service)
            .serve_with_incoming_shutdown(TcpListenerStream::new(listener), async {
                shutdown_rx.await.ok();
            })
            .await;
    });

    MockServerHandle {
        endpoint: Endpoint::new("127.0.0.1", port),
        server,
        _shutdown: shutdown_tx,
    }
}

/// An endpoint nothing is listening on
pub fn unreachable_endpoint() -> Endpoint {
    let port = portpicker::pick_unused_port().expect("Failed to pick unused port");
    Endpoint::new("127.0.0.1", port)
}
