#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{request::Parts, Request, StatusCode},
    Router,
};
use roadwork::{
    AppError, Authentication, Caller, ModelDescriptor, Orm, Page, Roadwork, RoadworkError,
};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::util::ServiceExt;

// --- In-memory connection standing in for PostgreSQL ---

#[derive(Default)]
pub struct MemoryOrm {
    tables: Mutex<HashMap<String, Vec<Value>>>,
    next_id: AtomicU64,
    pub fail_ping: AtomicBool,
    pub pings: AtomicUsize,
}

fn id_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl MemoryOrm {
    pub fn new() -> Arc<Self> {
        Arc::new(MemoryOrm::default())
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.tables.lock().unwrap().get(table).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl Orm for MemoryOrm {
    async fn find_all(&self, model: &ModelDescriptor) -> Result<Vec<Value>, AppError> {
        Ok(self.rows(&model.table_name))
    }

    async fn find_page(&self, model: &ModelDescriptor, offset: u64, limit: u64) -> Result<Page, AppError> {
        let all = self.rows(&model.table_name);
        let total = all.len() as u64;
        let rows = all.into_iter().skip(offset as usize).take(limit as usize).collect();
        Ok(Page::new(rows, offset, limit, total))
    }

    async fn find_one(&self, model: &ModelDescriptor, id: &str) -> Result<Option<Value>, AppError> {
        Ok(self
            .rows(&model.table_name)
            .into_iter()
            .find(|r| r.get(&model.primary_key).map(id_text).as_deref() == Some(id)))
    }

    async fn create(&self, model: &ModelDescriptor, body: &Map<String, Value>) -> Result<Value, AppError> {
        let mut row = body.clone();
        if !row.contains_key(&model.primary_key) {
            let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
            row.insert(model.primary_key.clone(), Value::from(id));
        }
        let row = Value::Object(row);
        self.tables
            .lock()
            .unwrap()
            .entry(model.table_name.clone())
            .or_default()
            .push(row.clone());
        Ok(row)
    }

    async fn update(&self, model: &ModelDescriptor, id: &str, body: &Map<String, Value>) -> Result<Option<Value>, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let rows = tables.entry(model.table_name.clone()).or_default();
        let Some(row) = rows
            .iter_mut()
            .find(|r| r.get(&model.primary_key).map(id_text).as_deref() == Some(id))
        else {
            return Ok(None);
        };
        if let Value::Object(fields) = row {
            for (k, v) in body {
                if *k != model.primary_key {
                    fields.insert(k.clone(), v.clone());
                }
            }
        }
        Ok(Some(row.clone()))
    }

    async fn destroy(&self, model: &ModelDescriptor, id: &str) -> Result<Option<Value>, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let rows = tables.entry(model.table_name.clone()).or_default();
        let pos = rows
            .iter()
            .position(|r| r.get(&model.primary_key).map(id_text).as_deref() == Some(id));
        Ok(pos.map(|i| rows.remove(i)))
    }

    async fn count(&self, model: &ModelDescriptor) -> Result<u64, AppError> {
        Ok(self.rows(&model.table_name).len() as u64)
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.pings.fetch_add(1, Ordering::SeqCst);
        if self.fail_ping.load(Ordering::SeqCst) {
            return Err(AppError::Db(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

// --- Header based plugin: `x-user` names the caller, `x-roles` lists roles ---

pub struct HeaderAuth {
    pub inits: Arc<AtomicUsize>,
}

#[async_trait]
impl Authentication for HeaderAuth {
    fn name(&self) -> &str {
        "header"
    }

    async fn init(&self) -> Result<(), RoadworkError> {
        self.inits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn authenticate(&self, parts: &Parts) -> Result<Caller, AppError> {
        let subject = parts
            .headers
            .get("x-user")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("missing x-user".into()))?;
        let roles = parts
            .headers
            .get("x-roles")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.split(',').map(|r| r.trim().to_string()).collect())
            .unwrap_or_default();
        Ok(Caller {
            subject: subject.to_string(),
            roles,
        })
    }
}

/// A library closure building `HeaderAuth`; counts builds and inits.
pub fn header_library(
    builds: Arc<AtomicUsize>,
    inits: Arc<AtomicUsize>,
) -> impl FnOnce(Arc<dyn Orm>) -> Result<Arc<dyn Authentication>, RoadworkError> {
    move |_connection| {
        builds.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(HeaderAuth { inits }) as Arc<dyn Authentication>)
    }
}

// --- Helpers ---

pub fn roadwork(orm: &Arc<MemoryOrm>) -> Roadwork {
    Roadwork::builder()
        .server(Router::new())
        .connection(orm.clone())
        .build()
        .expect("server and connection given")
}

pub async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}
