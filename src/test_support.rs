//! Test helpers: a local stand-in for the aircraft-tracking provider

use axum::extract::Request;
use axum::http::StatusCode;
use axum::Router;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

/// One request received by the mock provider
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub api_key: Option<String>,
    pub api_host: Option<String>,
}

/// Handle to a running mock provider
pub struct MockUpstream {
    pub base_url: String,
    recorded: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockUpstream {
    /// Requests received so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.recorded.lock().unwrap().clone()
    }
}

/// Start a provider that answers every request with `status` and `body`
pub async fn spawn_upstream(status: u16, body: String) -> MockUpstream {
    let recorded = Arc::new(Mutex::new(Vec::new()));
    let log = recorded.clone();

    let app = Router::new().fallback(move |req: Request| {
        let log = log.clone();
        let body = body.clone();
        async move {
            let header = |name: &str| {
                req.headers()
                    .get(name)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string)
            };
            log.lock().unwrap().push(RecordedRequest {
                path: req.uri().path().to_string(),
                api_key: header("x-rapidapi-key"),
                api_host: header("x-rapidapi-host"),
            });
            (StatusCode::from_u16(status).unwrap(), body)
        }
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockUpstream {
        base_url: format!("http://{}", addr),
        recorded,
    }
}

/// A base URL nothing is listening on
pub async fn unreachable_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
