//! In-process HTTP stub used by async tests
//!
//! An axum router on an ephemeral port serves canned JSON responses keyed by
//! method and path. A middleware layer records every request first, so tests
//! can assert on what was (or was not) sent.

use std::sync::{Arc, Mutex};

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{header::CONTENT_TYPE, HeaderName, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;

const NOT_FOUND_BODY: &str = r#"{"error": "Not found"}"#;

/// A canned response for one method + path
#[derive(Debug, Clone)]
pub struct StubRoute {
    method: &'static str,
    path: String,
    status: u16,
    body: String,
    headers: Vec<(String, String)>,
}

impl StubRoute {
    pub fn get(path: &str, status: u16, body: &str) -> Self {
        Self::new("GET", path, status, body)
    }

    pub fn post(path: &str, status: u16, body: &str) -> Self {
        Self::new("POST", path, status, body)
    }

    fn new(method: &'static str, path: &str, status: u16, body: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            status,
            body: body.to_string(),
            headers: Vec::new(),
        }
    }

    /// Adds an extra response header
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    fn response(&self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response =
            (status, [(CONTENT_TYPE, "application/json")], self.body.clone()).into_response();
        for (name, value) in &self.headers {
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                response.headers_mut().append(name, value);
            }
        }
        response
    }
}

/// A request as seen by the stub
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    /// Header names are lowercased
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == &name.to_ascii_lowercase())
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Clone)]
struct StubState {
    routes: Arc<Vec<StubRoute>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// A running stub server bound to an ephemeral local port
pub struct StubServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StubServer {
    pub async fn start(routes: Vec<StubRoute>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub server");
        let addr = listener.local_addr().expect("Stub server has no address");
        let state = StubState {
            routes: Arc::new(routes),
            requests: Arc::new(Mutex::new(Vec::new())),
        };
        let requests = Arc::clone(&state.requests);

        let app = Router::new()
            .fallback(respond)
            .layer(middleware::from_fn_with_state(state.clone(), record))
            .with_state(state);

        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base_url: format!("http://{}", addr),
            requests,
        }
    }

    /// All requests received so far, in arrival order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("stub lock poisoned").clone()
    }

    /// Number of requests received for a path
    pub fn hits(&self, path: &str) -> usize {
        self.requests().iter().filter(|r| r.path == path).count()
    }
}

/// Stores the request, then hands it on with its body restored
async fn record(State(state): State<StubState>, request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = to_bytes(body, usize::MAX).await.unwrap_or_default();

    let headers = parts
        .headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                value.to_str().unwrap_or_default().to_string(),
            )
        })
        .collect();
    state
        .requests
        .lock()
        .expect("stub lock poisoned")
        .push(RecordedRequest {
            method: parts.method.to_string(),
            path: parts.uri.path().to_string(),
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        });

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

async fn respond(State(state): State<StubState>, request: Request) -> Response {
    let method = request.method().as_str();
    let path = request.uri().path();
    match state
        .routes
        .iter()
        .find(|r| r.method == method && r.path == path)
    {
        Some(route) => route.response(),
        None => (
            StatusCode::NOT_FOUND,
            [(CONTENT_TYPE, "application/json")],
            NOT_FOUND_BODY,
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_requests_and_serves_routes() {
        let server = StubServer::start(vec![
            StubRoute::post("/echo", 201, r#"{"ok": true}"#).with_header("X-Stub", "yes")
        ])
        .await;
        let client = reqwest::Client::new();

        let created = client
            .post(format!("{}/echo", server.base_url))
            .body("hello")
            .send()
            .await
            .unwrap();
        assert_eq!(created.status().as_u16(), 201);
        assert_eq!(created.headers()["x-stub"], "yes");

        let missing = client
            .get(format!("{}/nowhere", server.base_url))
            .send()
            .await
            .unwrap();
        assert_eq!(missing.status().as_u16(), 404);

        let requests = server.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].body, "hello");
        assert_eq!(requests[1].method, "GET");
        assert_eq!(server.hits("/nowhere"), 1);
    }
}
