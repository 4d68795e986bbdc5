//! Shared mock servers for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU16, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use floating_failover::config::AuthorityConfig;

/// A raw HTTP backend answering every request with a programmable status.
#[derive(Clone)]
pub struct MockBackend {
    pub addr: SocketAddr,
    status: Arc<AtomicU16>,
    hits: Arc<AtomicUsize>,
    hosts: Arc<Mutex<Vec<String>>>,
}

impl MockBackend {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn set_status(&self, status: u16) {
        self.status.store(status, Ordering::SeqCst);
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// `Host` header values seen so far, in arrival order.
    pub fn hosts(&self) -> Vec<String> {
        self.hosts.lock().unwrap().clone()
    }
}

/// Start a backend that replies with `status` until told otherwise.
pub async fn start_backend(status: u16) -> MockBackend {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let backend = MockBackend {
        addr: listener.local_addr().unwrap(),
        status: Arc::new(AtomicU16::new(status)),
        hits: Arc::new(AtomicUsize::new(0)),
        hosts: Arc::new(Mutex::new(Vec::new())),
    };

    let shared = backend.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let shared = shared.clone();
                    tokio::spawn(async move {
                        let head = read_head(&mut socket).await;
                        shared.hits.fetch_add(1, Ordering::SeqCst);
                        if let Some(host) = header_value(&head, "host") {
                            shared.hosts.lock().unwrap().push(host);
                        }

                        let status = shared.status.load(Ordering::SeqCst);
                        let body = "ok";
                        let response = format!(
                            "HTTP/1.1 {} Mock\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    backend
}

/// Start a backend that accepts connections and never answers.
pub async fn start_silent_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    addr
}

/// An address nothing listens on.
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

async fn read_head(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        match tokio::time::timeout(Duration::from_secs(5), socket.read(&mut chunk)).await {
            Ok(Ok(0)) | Ok(Err(_)) | Err(_) => break,
            Ok(Ok(n)) => {
                buf.extend_from_slice(&chunk[..n]);
                if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn header_value(head: &str, name: &str) -> Option<String> {
    head.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        key.trim()
            .eq_ignore_ascii_case(name)
            .then(|| value.trim().to_string())
    })
}

/// In-memory stand-in for the droplet metadata service and floating IP API.
pub struct MockAuthority {
    pub addr: SocketAddr,
    pub state: Arc<AuthorityState>,
}

pub struct AuthorityState {
    pub droplet_id: u64,
    pub holder: Mutex<Option<u64>>,
    pub assigns: Mutex<Vec<(String, Value)>>,
    pub authorizations: Mutex<Vec<String>>,
    pub metadata_hits: AtomicUsize,
    pub lookup_hits: AtomicUsize,
    pub lookup_status: AtomicU16,
    pub assign_status: AtomicU16,
    pub malformed_lookup: std::sync::atomic::AtomicBool,
}

impl MockAuthority {
    pub fn config(&self) -> AuthorityConfig {
        AuthorityConfig {
            api_base_url: format!("http://{}", self.addr),
            metadata_url: format!("http://{}/metadata/v1.json", self.addr),
            request_timeout_secs: 5,
        }
    }

    pub fn set_holder(&self, holder: Option<u64>) {
        *self.state.holder.lock().unwrap() = holder;
    }

    pub fn holder(&self) -> Option<u64> {
        *self.state.holder.lock().unwrap()
    }

    pub fn assigns(&self) -> Vec<(String, Value)> {
        self.state.assigns.lock().unwrap().clone()
    }

    pub fn lookup_hits(&self) -> usize {
        self.state.lookup_hits.load(Ordering::SeqCst)
    }

    pub fn metadata_hits(&self) -> usize {
        self.state.metadata_hits.load(Ordering::SeqCst)
    }
}

/// Start a mock authority for droplet `droplet_id` with the IP held by `holder`.
pub async fn start_authority(droplet_id: u64, holder: Option<u64>) -> MockAuthority {
    let state = Arc::new(AuthorityState {
        droplet_id,
        holder: Mutex::new(holder),
        assigns: Mutex::new(Vec::new()),
        authorizations: Mutex::new(Vec::new()),
        metadata_hits: AtomicUsize::new(0),
        lookup_hits: AtomicUsize::new(0),
        lookup_status: AtomicU16::new(200),
        assign_status: AtomicU16::new(201),
        malformed_lookup: std::sync::atomic::AtomicBool::new(false),
    });

    let app = Router::new()
        .route("/metadata/v1.json", get(metadata))
        .route("/v2/floating_ips/{ip}", get(lookup))
        .route("/v2/floating_ips/{ip}/actions", post(assign))
        .with_state(Arc::clone(&state));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockAuthority { addr, state }
}

async fn metadata(State(state): State<Arc<AuthorityState>>) -> Json<Value> {
    state.metadata_hits.fetch_add(1, Ordering::SeqCst);
    Json(json!({ "droplet_id": state.droplet_id, "hostname": "node", "region": "fra1" }))
}

async fn lookup(
    State(state): State<Arc<AuthorityState>>,
    Path(ip): Path<String>,
    headers: HeaderMap,
) -> (StatusCode, String) {
    state.lookup_hits.fetch_add(1, Ordering::SeqCst);
    record_authorization(&state, &headers);

    let status = StatusCode::from_u16(state.lookup_status.load(Ordering::SeqCst)).unwrap();
    if !status.is_success() {
        return (status, json!({ "id": "server_error" }).to_string());
    }
    if state.malformed_lookup.load(Ordering::SeqCst) {
        return (status, "{\"floating_ip\": ".to_string());
    }

    let droplet = state
        .holder
        .lock()
        .unwrap()
        .map(|id| json!({ "id": id, "name": format!("droplet-{}", id) }));
    let body = json!({ "floating_ip": { "ip": ip, "droplet": droplet, "locked": false } });
    (status, body.to_string())
}

async fn assign(
    State(state): State<Arc<AuthorityState>>,
    Path(ip): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    record_authorization(&state, &headers);
    state.assigns.lock().unwrap().push((ip, body.clone()));

    let status = StatusCode::from_u16(state.assign_status.load(Ordering::SeqCst)).unwrap();
    if status.is_success() {
        if let Some(id) = body.get("droplet_id").and_then(Value::as_u64) {
            *state.holder.lock().unwrap() = Some(id);
        }
        (status, Json(json!({ "action": { "id": 1, "status": "in-progress", "type": "assign_ip" } })))
    } else {
        (status, Json(json!({ "id": "unprocessable_entity", "message": "droplet already has a pending event" })))
    }
}

fn record_authorization(state: &AuthorityState, headers: &HeaderMap) {
    if let Some(value) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
        state.authorizations.lock().unwrap().push(value.to_string());
    }
}
