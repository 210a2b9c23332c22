//! In-process stand-in for the item service.
#![allow(dead_code)]

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One request as the stub saw it.
#[derive(Debug, Clone)]
pub struct Hit {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub body: serde_json::Value,
}

#[derive(Debug, Clone)]
pub struct Behavior {
    /// Key handed out by `POST /item/onlyoneclient`.
    pub create_key: String,
    /// Canned responses replacing the default 200 for a method and path.
    pub overrides: Vec<(Method, &'static str, StatusCode, &'static str)>,
    pub delay: Duration,
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            create_key: "abc123".to_owned(),
            overrides: Vec::new(),
            delay: Duration::ZERO,
        }
    }
}

impl Behavior {
    pub fn respond(mut self, method: Method, path: &'static str, status: StatusCode, body: &'static str) -> Self {
        self.overrides.push((method, path, status, body));
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[derive(Clone)]
pub struct Stub {
    behavior: Arc<Behavior>,
    hits: Arc<Mutex<Vec<Hit>>>,
    active: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl Stub {
    pub fn hits(&self) -> Vec<Hit> {
        self.hits.lock().unwrap().clone()
    }

    pub fn hits_for(&self, method: Method, path: &str) -> Vec<Hit> {
        self.hits()
            .into_iter()
            .filter(|hit| hit.method == method && hit.path == path)
            .collect()
    }

    /// Highest number of requests the stub was serving at the same time.
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::Acquire)
    }
}

pub async fn spawn_stub(behavior: Behavior) -> (String, Stub) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let stub = Stub {
        behavior: Arc::new(behavior),
        hits: Arc::new(Mutex::new(Vec::new())),
        active: Arc::new(AtomicUsize::new(0)),
        peak: Arc::new(AtomicUsize::new(0)),
    };
    let router = axum::Router::new()
        .fallback(handle)
        .with_state(stub.clone());
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
    (format!("http://{addr}"), stub)
}

/// An address nothing listens on.
pub async fn refused_uri() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

async fn handle(State(stub): State<Stub>, method: Method, uri: Uri, body: Bytes) -> (StatusCode, String) {
    let now = stub.active.fetch_add(1, Ordering::AcqRel) + 1;
    stub.peak.fetch_max(now, Ordering::AcqRel);

    let body_json = if body.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null)
    };
    stub.hits.lock().unwrap().push(Hit {
        method: method.clone(),
        path: uri.path().to_owned(),
        query: uri.query().map(str::to_owned),
        body: body_json.clone(),
    });
    if !stub.behavior.delay.is_zero() {
        tokio::time::sleep(stub.behavior.delay).await;
    }

    let canned = stub
        .behavior
        .overrides
        .iter()
        .find(|(m, p, _, _)| *m == method && *p == uri.path())
        .map(|(_, _, status, body)| (*status, (*body).to_owned()));
    let resp = canned.unwrap_or_else(|| match (&method, uri.path()) {
        (&Method::POST, "/item/onlyoneclient") => (
            StatusCode::OK,
            serde_json::json!({
                "key": stub.behavior.create_key,
                "contents": body_json["contents"],
                "createdAt": "2019-05-01T10:00:00Z",
                "updatedAt": "2019-05-01T10:00:00Z",
            })
            .to_string(),
        ),
        (&Method::POST, "/item" | "/item/createclienteverytimeretry")
        | (&Method::PUT | &Method::GET, "/item/onlyoneclient") => {
            (StatusCode::OK, body_json.to_string())
        }
        _ => (StatusCode::NOT_FOUND, String::new()),
    });

    stub.active.fetch_sub(1, Ordering::AcqRel);
    resp
}
