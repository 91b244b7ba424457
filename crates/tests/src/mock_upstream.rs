//! A scripted HTTP upstream for exercising the request executor.
//!
//! Responses are served in script order; every request increments a hit
//! counter. Once the script is exhausted the server answers 500 so a test
//! that over-calls fails loudly instead of hanging.

use std::{
    collections::VecDeque,
    net::SocketAddr,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use axum::{
    body::Body,
    extract::State,
    http::Response,
    Router,
};

pub struct ScriptedResponse {
    pub status: u16,
    pub headers: Vec<(&'static str, String)>,
    pub body: String,
}

impl ScriptedResponse {
    pub fn new(status: u16) -> Self {
        Self { status, headers: Vec::new(), body: String::new() }
    }

    pub fn with_header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }
}

#[derive(Clone)]
struct MockState {
    script: Arc<Mutex<VecDeque<ScriptedResponse>>>,
    hits: Arc<AtomicUsize>,
}

pub struct MockUpstream {
    addr: SocketAddr,
    hits: Arc<AtomicUsize>,
}

impl MockUpstream {
    pub async fn start(script: Vec<ScriptedResponse>) -> Self {
        let state = MockState {
            script: Arc::new(Mutex::new(VecDeque::from(script))),
            hits: Arc::new(AtomicUsize::new(0)),
        };
        let hits = Arc::clone(&state.hits);

        let app = Router::new().fallback(respond).with_state(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, hits }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

async fn respond(State(state): State<MockState>) -> Response<Body> {
    state.hits.fetch_add(1, Ordering::SeqCst);
    let next = state.script.lock().unwrap().pop_front();
    let scripted = next.unwrap_or_else(|| {
        ScriptedResponse::new(500).with_body("mock script exhausted")
    });

    let mut builder = Response::builder().status(scripted.status);
    for (name, value) in &scripted.headers {
        builder = builder.header(*name, value);
    }
    builder.body(Body::from(scripted.body)).unwrap()
}
