// In-process stand-in for the upload API and the object storage it
// hands out links to.
//
// The server runs on its own thread with a current-thread tokio runtime,
// so tests can drive the blocking client from the test thread.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header::CONTENT_TYPE, HeaderMap, StatusCode};
use axum::routing::{post, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

/// How the link endpoint answers for a given file name.
#[derive(Debug, Clone, Copy)]
#[allow(dead_code)]
pub enum LinkReply {
    Ok,
    ServerError,
    MissingUrl,
    NotJson,
}

#[derive(Debug, Clone)]
pub struct Behaviour {
    /// Replies keyed by `file_name`; unlisted files get `LinkReply::Ok`.
    pub link_replies: HashMap<String, LinkReply>,
    pub storage_status: StatusCode,
}

impl Default for Behaviour {
    fn default() -> Self {
        Behaviour {
            link_replies: HashMap::new(),
            storage_status: StatusCode::OK,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecordedLinkRequest {
    pub headers: HashMap<String, String>,
    pub body: Value,
}

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Default)]
struct Recorded {
    link_requests: Vec<RecordedLinkRequest>,
    objects: HashMap<String, StoredObject>,
    puts: usize,
}

#[derive(Clone)]
struct AppState {
    addr: SocketAddr,
    behaviour: Arc<Behaviour>,
    recorded: Arc<Mutex<Recorded>>,
}

pub struct MockApi {
    addr: SocketAddr,
    recorded: Arc<Mutex<Recorded>>,
}

#[allow(dead_code)]
impl MockApi {
    pub fn start() -> Self {
        Self::with_behaviour(Behaviour::default())
    }

    pub fn with_behaviour(behaviour: Behaviour) -> Self {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind mock API");
        listener
            .set_nonblocking(true)
            .expect("Failed to set listener non-blocking");
        let addr = listener.local_addr().expect("Failed to read mock API address");

        let recorded = Arc::new(Mutex::new(Recorded::default()));
        let state = AppState {
            addr,
            behaviour: Arc::new(behaviour),
            recorded: Arc::clone(&recorded),
        };
        let app = Router::new()
            .route("/apigw/api/v1/upload/data", post(upload_link))
            .route("/storage/:name", put(store_object))
            .with_state(state);

        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("Failed to build mock API runtime");
            rt.block_on(async move {
                let listener = tokio::net::TcpListener::from_std(listener)
                    .expect("Failed to adopt mock API listener");
                axum::serve(listener, app).await.expect("Mock API stopped");
            });
        });

        MockApi { addr, recorded }
    }

    /// Base URL to hand to `UploadConfig::with_api_url`.
    pub fn api_url(&self) -> String {
        format!("http://{}/apigw/api/v1/", self.addr)
    }

    pub fn link_requests(&self) -> Vec<RecordedLinkRequest> {
        self.recorded.lock().unwrap().link_requests.clone()
    }

    pub fn object(&self, name: &str) -> Option<StoredObject> {
        self.recorded.lock().unwrap().objects.get(name).cloned()
    }

    /// Link requests plus storage PUTs seen so far.
    pub fn request_count(&self) -> usize {
        let recorded = self.recorded.lock().unwrap();
        recorded.link_requests.len() + recorded.puts
    }
}

async fn upload_link(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, String) {
    let file_name = body["file_name"].as_str().unwrap_or_default().to_string();
    let headers = headers
        .iter()
        .map(|(k, v)| {
            (
                k.as_str().to_string(),
                v.to_str().unwrap_or_default().to_string(),
            )
        })
        .collect();
    state
        .recorded
        .lock()
        .unwrap()
        .link_requests
        .push(RecordedLinkRequest { headers, body });

    let reply = state
        .behaviour
        .link_replies
        .get(&file_name)
        .copied()
        .unwrap_or(LinkReply::Ok);
    match reply {
        LinkReply::Ok => (
            StatusCode::OK,
            json!({ "s3Url": format!("http://{}/storage/{}", state.addr, file_name) }).to_string(),
        ),
        LinkReply::ServerError => (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "message": "internal error" }).to_string(),
        ),
        LinkReply::MissingUrl => (StatusCode::OK, json!({ "status": "ok" }).to_string()),
        LinkReply::NotJson => (StatusCode::OK, "<html>gateway timeout</html>".to_string()),
    }
}

async fn store_object(
    State(state): State<AppState>,
    Path(name): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let mut recorded = state.recorded.lock().unwrap();
    recorded.puts += 1;
    if state.behaviour.storage_status.is_success() {
        recorded.objects.insert(
            name,
            StoredObject {
                content_type,
                bytes: body.to_vec(),
            },
        );
    }
    state.behaviour.storage_status
}
