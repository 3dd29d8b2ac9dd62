#![allow(dead_code)]

//! In-process stand-in for the measurement service: records every request
//! and answers with a canned response.

use std::{
    net::TcpListener,
    sync::{Arc, Mutex},
};

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, Method, StatusCode, Uri},
    Router,
};
use serde_json::Value;
use wsn_client::{ClientConfig, QueryClient};

pub const TOKEN: &str = "test-token";
pub const API_KEY: &str = "test-key";

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub pairs: Vec<(String, String)>,
    pub authorization: Option<String>,
    pub body: String,
}

struct Inner {
    status: StatusCode,
    body: String,
    requests: Vec<RecordedRequest>,
}

#[derive(Clone)]
pub struct MockService {
    inner: Arc<Mutex<Inner>>,
}

impl MockService {
    pub fn respond(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                status,
                body: body.into(),
                requests: vec![],
            })),
        }
    }

    pub fn json(body: Value) -> Self {
        Self::respond(StatusCode::OK, body.to_string())
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.inner.lock().unwrap().requests.clone()
    }

    pub fn only_request(&self) -> RecordedRequest {
        let requests = self.requests();
        assert_eq!(requests.len(), 1, "expected exactly one request: {requests:?}");
        requests.into_iter().next().unwrap()
    }

    /// Serves on an ephemeral port and returns a client pointed at it.
    pub fn start(&self) -> QueryClient {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new().fallback(record).with_state(self.clone());

        tokio::spawn(async move {
            axum::Server::from_tcp(listener)
                .unwrap()
                .serve(app.into_make_service())
                .await
                .unwrap();
        });

        let config = ClientConfig::new(format!("http://{}", addr))
            .with_token(TOKEN)
            .with_api_key(API_KEY);
        QueryClient::new(config).unwrap()
    }
}

async fn record(
    State(mock): State<MockService>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    let pairs = reqwest::Url::parse(&format!("http://mock{}", uri))
        .unwrap()
        .query_pairs()
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let mut inner = mock.inner.lock().unwrap();
    inner.requests.push(RecordedRequest {
        method,
        path: uri.path().to_owned(),
        pairs,
        authorization: headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned),
        body,
    });

    (inner.status, inner.body.clone())
}

pub fn pairs(expected: &[(&str, &str)]) -> Vec<(String, String)> {
    expected
        .iter()
        .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
        .collect()
}
