//! Shared fixtures: a scripted HTTP transport and an in-memory session

#![allow(dead_code)]

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};

use treectl::application::ApiClient;
use treectl::domain::{Session, TreeRef, UserInfo};
use treectl::infrastructure::traits::{HttpRequest, HttpResponse, HttpTransport, MemorySessionStore};

pub const BASE_URL: &str = "http://trees.test";

/// Replays queued responses in order and records every request it sees.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<io::Result<HttpResponse>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, status: u16, body: &str) -> &Self {
        self.responses.lock().unwrap().push_back(Ok(HttpResponse {
            status,
            body: body.to_string(),
        }));
        self
    }

    pub fn fail(&self, message: &str) -> &Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(io::Error::new(io::ErrorKind::ConnectionRefused, message.to_string())));
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request(&self, idx: usize) -> HttpRequest {
        self.requests()[idx].clone()
    }

    /// Parsed JSON body of the n-th request.
    pub fn body(&self, idx: usize) -> serde_json::Value {
        let body = self.request(idx).body.expect("request body");
        serde_json::from_str(&body).expect("json body")
    }
}

impl HttpTransport for MockTransport {
    fn send(&self, request: &HttpRequest) -> io::Result<HttpResponse> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("no scripted response for {} {}", request.method, request.url))
    }
}

pub fn logged_in_session() -> Session {
    Session {
        access_token: Some("access-1".into()),
        refresh_token: Some("refresh-1".into()),
        user: Some(UserInfo {
            email: "ada@example.com".into(),
            id: 1,
        }),
        current_tree: None,
    }
}

pub fn with_tree(mut session: Session, id: i64, name: &str) -> Session {
    session.current_tree = Some(TreeRef {
        id,
        name: name.into(),
    });
    session
}

/// Client wired to a fresh mock transport and an in-memory session.
pub fn client(session: Session) -> (Arc<ApiClient>, Arc<MockTransport>, Arc<MemorySessionStore>) {
    treectl::util::testing::init_test_setup();
    let transport = MockTransport::new();
    let store = Arc::new(MemorySessionStore::new(session));
    let api = Arc::new(ApiClient::new(BASE_URL, transport.clone(), store.clone()));
    (api, transport, store)
}
