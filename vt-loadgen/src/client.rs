use crate::error::TaskError;
use bytes::Bytes;
use http_body_util::Full;
use hyper::header::CONTENT_LENGTH;
use hyper::{Request, StatusCode};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use item_api::drain::DrainBodyFuture;
use std::str::FromStr;
use std::time::Duration;

#[derive(Clone)]
pub struct HttpClient {
    client: Client<HttpConnector, Full<Bytes>>,
    timeout: Option<Duration>,
}

/// Status and fully drained body of one exchange.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl RawResponse {
    #[must_use]
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

impl HttpClient {
    /// `timeout` bounds connecting and the whole exchange. `None` waits forever.
    #[must_use]
    pub fn new(timeout: Option<Duration>) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(timeout);
        let client = Client::builder(TokioExecutor::new()).build(connector);
        Self { client, timeout }
    }

    pub async fn send_recv(&self, request: Request<Full<Bytes>>) -> Result<RawResponse, TaskError> {
        let exchange = async {
            let resp = self
                .client
                .request(request)
                .await
                .map_err(TaskError::Transport)?;
            let status = resp.status();
            let content_length: usize = resp
                .headers()
                .get(CONTENT_LENGTH)
                .and_then(|hv| hv.to_str().ok())
                .and_then(|hv| hv.parse().ok())
                .unwrap_or(1024);
            let body = DrainBodyFuture::new_trusted_length(resp.into_body(), content_length)
                .await
                .map_err(TaskError::ReadBody)?;
            Ok::<_, TaskError>(RawResponse { status, body })
        };
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, exchange)
                .await
                .unwrap_or(Err(TaskError::Timeout(limit))),
            None => exchange.await,
        }
    }
}

/// How a task obtains its HTTP client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// One client, and so one connection pool, for the whole process.
    Shared,
    /// A fresh client for every request.
    PerCall,
}

impl FromStr for TransportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "shared" => Ok(Self::Shared),
            "per-call" | "percall" => Ok(Self::PerCall),
            _ => Err(format!("expected 'shared' or 'per-call', got {s:?}")),
        }
    }
}

#[derive(Clone)]
pub enum Transport {
    Shared(HttpClient),
    PerCall { timeout: Option<Duration> },
}

impl Transport {
    #[must_use]
    pub fn new(kind: TransportKind, timeout: Option<Duration>) -> Self {
        match kind {
            TransportKind::Shared => Self::Shared(HttpClient::new(timeout)),
            TransportKind::PerCall => Self::PerCall { timeout },
        }
    }

    #[must_use]
    pub fn kind(&self) -> TransportKind {
        match self {
            Self::Shared(_) => TransportKind::Shared,
            Self::PerCall { .. } => TransportKind::PerCall,
        }
    }

    #[must_use]
    pub fn client(&self) -> HttpClient {
        match self {
            Self::Shared(client) => client.clone(),
            Self::PerCall { timeout } => HttpClient::new(*timeout),
        }
    }
}
