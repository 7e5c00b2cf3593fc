//! In-process mock of the generation service.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::routing::{get, post, MethodRouter};
use axum::{Json, Router};
use serde_json::Value;

use seqvid::{ImageUpload, JobClient};

/// One multipart part as the server saw it.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedPart {
    pub name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// Parts of every submit request received, one entry per request.
pub type Captured = Arc<Mutex<Vec<Vec<CapturedPart>>>>;

#[derive(Clone)]
struct SubmitState {
    status: StatusCode,
    body: Value,
    captured: Captured,
}

/// Serves `app` on an ephemeral port and returns the API base URL.
pub async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/api")
}

/// Builds a client pointed at `base_url`.
pub fn client(base_url: &str) -> JobClient {
    JobClient::builder().base_url(base_url).build().unwrap()
}

/// GET route answering every request with `status` and a JSON `body`.
pub fn json_reply(status: StatusCode, body: Value) -> MethodRouter {
    get(move || async move { (status, Json(body)) })
}

/// Submit endpoint that records multipart parts and answers with `body`.
pub fn submit_router(status: StatusCode, body: Value) -> (Router, Captured) {
    let captured = Captured::default();
    let state = SubmitState {
        status,
        body,
        captured: captured.clone(),
    };
    let router = Router::new()
        .route("/api/v1/generate-sequence", post(capture_submit))
        .with_state(state);
    (router, captured)
}

async fn capture_submit(
    State(state): State<SubmitState>,
    mut multipart: Multipart,
) -> (StatusCode, Json<Value>) {
    let mut parts = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.unwrap().to_vec();
        parts.push(CapturedPart {
            name,
            file_name,
            content_type,
            data,
        });
    }
    state.captured.lock().unwrap().push(parts);
    (state.status, Json(state.body))
}

/// `count` distinct small "images" named `frame{i}.png`.
pub fn images(count: usize) -> Vec<ImageUpload> {
    (0..count)
        .map(|i| ImageUpload::new(vec![i as u8; 8], format!("frame{i}.png")))
        .collect()
}
