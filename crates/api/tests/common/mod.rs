#![allow(dead_code)]

use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use bbm_engine::naming::output_path;
use bbm_engine::{EngineError, EngineInvocation, PassthroughEngine, TranslationEngine, UnitObserver};
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use bbm_api::config::ServerConfig;
use bbm_api::router::build_app_router;
use bbm_api::state::AppState;

pub const BOUNDARY: &str = "bbm-test-boundary";

/// A router plus the state and directories behind it.
///
/// The temp directory is removed when the `TestApp` is dropped.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub dir: TempDir,
}

/// Build a test `ServerConfig` rooted in `dir`.
pub fn test_config(dir: &TempDir, max_upload_bytes: usize) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        max_upload_bytes,
        upload_dir: dir.path().join("uploads"),
        output_dir: dir.path().join("outputs"),
    }
}

/// Full application router driving the passthrough engine.
pub fn build_test_app() -> TestApp {
    build_test_app_with(Arc::new(PassthroughEngine::new()), 1024 * 1024)
}

/// Full application router with a custom engine and upload ceiling.
pub fn build_test_app_with(engine: Arc<dyn TranslationEngine>, max_upload_bytes: usize) -> TestApp {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = test_config(&dir, max_upload_bytes);
    config.ensure_dirs().expect("create dirs");

    let state = AppState::new(config.clone(), engine);
    let router = build_app_router(state.clone(), &config);

    TestApp { router, state, dir }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn send(app: &Router, method: Method, uri: &str) -> Response {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response {
    send(app, Method::GET, uri).await
}

pub async fn post(app: &Router, uri: &str) -> Response {
    send(app, Method::POST, uri).await
}

pub async fn delete(app: &Router, uri: &str) -> Response {
    send(app, Method::DELETE, uri).await
}

pub enum Part<'a> {
    File {
        name: &'a str,
        filename: &'a str,
        data: &'a [u8],
    },
    Text {
        name: &'a str,
        value: &'a str,
    },
}

/// Encode `parts` as a `multipart/form-data` body delimited by [`BOUNDARY`].
pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::File {
                name,
                filename,
                data,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
            Part::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn post_multipart(app: &Router, uri: &str, parts: &[Part<'_>]) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

/// Submit `data` as `filename` with the given settings JSON.
pub async fn submit(app: &Router, filename: &str, data: &[u8], settings: &str) -> Response {
    post_multipart(
        app,
        "/api/translate",
        &[
            Part::File {
                name: "file",
                filename,
                data,
            },
            Part::Text {
                name: "settings",
                value: settings,
            },
        ],
    )
    .await
}

/// Submit and return the allocated translation id, asserting a 200.
pub async fn submit_ok(app: &Router, filename: &str, data: &[u8], settings: &str) -> String {
    let response = submit(app, filename, data, settings).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "started");
    json["translation_id"].as_str().unwrap().to_string()
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub async fn status_json(app: &Router, id: &str) -> Value {
    let response = get(app, &format!("/api/translate/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

/// Poll the status endpoint until `done` accepts the snapshot.
pub async fn wait_for(app: &Router, id: &str, done: impl Fn(&Value) -> bool) -> Value {
    for _ in 0..400 {
        let snapshot = status_json(app, id).await;
        if done(&snapshot) {
            return snapshot;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("job {id} did not reach the expected state in time");
}

pub async fn wait_for_terminal(app: &Router, id: &str) -> Value {
    wait_for(app, id, |s| {
        matches!(
            s["status"].as_str(),
            Some("completed" | "error" | "cancelled")
        )
    })
    .await
}

pub fn has_log(snapshot: &Value, needle: &str) -> bool {
    snapshot["logs"]
        .as_array()
        .map(|logs| {
            logs.iter()
                .any(|l| l["message"].as_str().is_some_and(|m| m.contains(needle)))
        })
        .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Engines
// ---------------------------------------------------------------------------

/// Manually released latch shared between a test and [`GatedEngine`].
#[derive(Clone, Default)]
pub struct Gate(Arc<(Mutex<bool>, Condvar)>);

impl Gate {
    pub fn open(&self) {
        let (lock, cvar) = &*self.0;
        *lock.lock().unwrap() = true;
        cvar.notify_all();
    }

    fn wait(&self) {
        let (lock, cvar) = &*self.0;
        let mut open = lock.lock().unwrap();
        while !*open {
            open = cvar.wait(open).unwrap();
        }
    }
}

/// Reports one of two units, blocks until its gate opens, then finishes
/// and writes `"gated output"` where the real engine would.
pub struct GatedEngine {
    pub gate: Gate,
}

impl TranslationEngine for GatedEngine {
    fn name(&self) -> &str {
        "gated"
    }

    fn make_bilingual_book(
        &self,
        invocation: &EngineInvocation,
        observer: Option<&dyn UnitObserver>,
    ) -> Result<(), EngineError> {
        if let Some(observer) = observer {
            observer.on_total(2);
            observer.on_unit_processed("first");
        }
        self.gate.wait();
        if let Some(observer) = observer {
            observer.on_unit_processed("second");
        }
        let out = output_path(&invocation.book_path, invocation.output_mode);
        std::fs::write(&out, "gated output").map_err(|e| EngineError::io(&out, e))
    }
}
