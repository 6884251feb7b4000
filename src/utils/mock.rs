//! Throw-away upstream servers used by the tests

use crate::config::Config;
use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    Router,
};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

type Hits = Arc<Mutex<Vec<Hit>>>;

/// A request received by the upstream
struct Hit {
    /// "METHOD /path?query"
    line: String,
    body: String,
}

/// Upstream server bound to a random local port which records
/// the method, path and body of every request it receives
pub struct MockUpstream {
    pub base_url: String,
    hits: Hits,
}

impl MockUpstream {
    /// Serves the provided router in the background
    pub async fn spawn(router: Router) -> Self {
        let hits: Hits = Default::default();
        let router = router.layer(middleware::from_fn_with_state(hits.clone(), record));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            hits,
        }
    }

    /// Creates a base URL that nothing is listening on
    pub async fn unreachable() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}")
    }

    /// The requests received so far as "METHOD /path?query"
    pub fn hits(&self) -> Vec<String> {
        self.hits
            .lock()
            .unwrap()
            .iter()
            .map(|hit| hit.line.clone())
            .collect()
    }

    /// The bodies of the requests received so far, empty for
    /// requests without a body
    pub fn bodies(&self) -> Vec<String> {
        self.hits
            .lock()
            .unwrap()
            .iter()
            .map(|hit| hit.body.clone())
            .collect()
    }
}

async fn record(State(hits): State<Hits>, req: Request, next: Next) -> Response {
    let (parts, body) = req.into_parts();
    let body = to_bytes(body, usize::MAX).await.unwrap();

    hits.lock().unwrap().push(Hit {
        line: format!("{} {}", parts.method, parts.uri),
        body: String::from_utf8_lossy(&body).into_owned(),
    });

    next.run(Request::from_parts(parts, Body::from(body))).await
}

/// Creates a config pointing at the provided upstream with a single
/// allowed origin of http://localhost:5501
pub fn test_config(base_url: &str) -> Config {
    Config::from_vars(&|key: &str| match key {
        "LEADERBOARD_API_URL" => Some(base_url.to_string()),
        "ALLOWED_ORIGINS" => Some("http://localhost:5501".to_string()),
        _ => None,
    })
    .unwrap()
}
