//! Shared fixtures for integration tests
//!
//! [`FakeGrid`] is a stateful wiremock responder standing in for a grid: it
//! stores the records it is sent and serves them back, so tests can check
//! create/read/update/delete behaviour end to end.

#![allow(dead_code)]

use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use synergos::{Driver, GridAddress};
use wiremock::matchers::any;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Body fields naming the id of a created record, most specific first
const ID_FIELDS: [&str; 5] = ["run_id", "expt_id", "project_id", "collab_id", "id"];

/// Trailing path segments addressing a collection rather than a record
const COLLECTIONS: [&str; 6] = [
    "collaborations",
    "projects",
    "experiments",
    "runs",
    "participants",
    "registrations",
];

/// In-memory grid keyed by record path
#[derive(Clone, Default)]
pub struct FakeGrid {
    records: Arc<Mutex<BTreeMap<String, Value>>>,
}

fn envelope(status: u16, data: Value) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({"status": status, "data": data}))
}

fn not_found(path: &str) -> ResponseTemplate {
    ResponseTemplate::new(404).set_body_json(json!({"status": 404, "message": format!("{} not found", path)}))
}

impl FakeGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a mock server answering every request from a fresh fake grid
    pub async fn start() -> (MockServer, FakeGrid) {
        let server = MockServer::start().await;
        let grid = FakeGrid::new();
        Mock::given(any())
            .respond_with(grid.clone())
            .mount(&server)
            .await;
        (server, grid)
    }

    /// Stored record at `path`, if any
    pub fn record(&self, path: &str) -> Option<Value> {
        self.records.lock().unwrap().get(path).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    fn is_collection(path: &str) -> bool {
        path.rsplit('/')
            .next()
            .map(|last| COLLECTIONS.contains(&last))
            .unwrap_or(false)
    }

    fn create(&self, path: &str, body: Value) -> ResponseTemplate {
        let id = ID_FIELDS
            .iter()
            .find_map(|field| body.get(*field).and_then(Value::as_str));
        let key = match id {
            Some(id) if Self::is_collection(path) => format!("{}/{}", path, urlencoding::encode(id)),
            _ => path.to_string(),
        };

        let mut records = self.records.lock().unwrap();
        if id.is_some() && records.contains_key(&key) {
            return ResponseTemplate::new(409).set_body_json(json!({"status": 409, "message": "exists"}));
        }
        records.insert(key, body.clone());
        envelope(201, body)
    }

    fn read(&self, path: &str) -> ResponseTemplate {
        let records = self.records.lock().unwrap();
        if let Some(record) = records.get(path) {
            return envelope(200, record.clone());
        }
        if !Self::is_collection(path) {
            return not_found(path);
        }

        let prefix = format!("{}/", path);
        let children: Vec<Value> = records
            .iter()
            .filter(|(key, _)| {
                key.strip_prefix(&prefix)
                    .map(|rest| !rest.is_empty() && !rest.contains('/'))
                    .unwrap_or(false)
            })
            .map(|(_, record)| record.clone())
            .collect();
        envelope(200, Value::Array(children))
    }

    fn update(&self, path: &str, body: Value) -> ResponseTemplate {
        let mut records = self.records.lock().unwrap();
        let Some(record) = records.get_mut(path) else {
            return not_found(path);
        };

        if let (Some(target), Value::Object(overrides)) = (record.as_object_mut(), body) {
            for (field, value) in overrides {
                target.insert(field, value);
            }
        }
        envelope(200, record.clone())
    }

    fn delete(&self, path: &str) -> ResponseTemplate {
        match self.records.lock().unwrap().remove(path) {
            Some(record) => envelope(200, record),
            None => not_found(path),
        }
    }
}

impl Respond for FakeGrid {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let path = request.url.path().trim_end_matches('/').to_string();
        let body = serde_json::from_slice::<Value>(&request.body).unwrap_or(Value::Object(Map::new()));

        match request.method.as_str() {
            "POST" => self.create(&path, body),
            "GET" => self.read(&path),
            "PUT" => self.update(&path, body),
            "DELETE" => self.delete(&path),
            _ => ResponseTemplate::new(405),
        }
    }
}

/// Driver pointed at a mock server
pub fn driver_for(server: &MockServer) -> Driver {
    let address = GridAddress::parse(&server.uri()).unwrap();
    Driver::with_address(address).unwrap()
}
