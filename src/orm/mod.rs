//! Persistence seam: the connection every generated route delegates to.

mod pg;

pub use pg::PgOrm;

use crate::error::AppError;
use crate::model::ModelDescriptor;
use crate::response::Pagination;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// One page of rows plus the totals needed for pagination metadata.
#[derive(Clone, Debug, PartialEq)]
pub struct Page {
    pub rows: Vec<Value>,
    pub offset: u64,
    pub limit: u64,
    pub row_count: u64,
    pub page_count: u64,
}

impl Page {
    pub fn new(rows: Vec<Value>, offset: u64, limit: u64, row_count: u64) -> Self {
        let page_count = if limit == 0 { 0 } else { row_count.div_ceil(limit) };
        Page {
            rows,
            offset,
            limit,
            row_count,
            page_count,
        }
    }

    pub fn pagination(&self) -> Pagination {
        Pagination {
            offset: self.offset,
            limit: self.limit,
            row_count: self.row_count,
            page_count: self.page_count,
        }
    }
}

/// CRUD over a model table. Rows are JSON objects keyed by column name; ids arrive as path text.
#[async_trait]
pub trait Orm: Send + Sync {
    async fn find_all(&self, model: &ModelDescriptor) -> Result<Vec<Value>, AppError>;

    async fn find_page(&self, model: &ModelDescriptor, offset: u64, limit: u64) -> Result<Page, AppError>;

    async fn find_one(&self, model: &ModelDescriptor, id: &str) -> Result<Option<Value>, AppError>;

    async fn create(&self, model: &ModelDescriptor, body: &Map<String, Value>) -> Result<Value, AppError>;

    /// Returns None when no row has that id.
    async fn update(&self, model: &ModelDescriptor, id: &str, body: &Map<String, Value>) -> Result<Option<Value>, AppError>;

    /// Returns the deleted row, or None when no row has that id.
    async fn destroy(&self, model: &ModelDescriptor, id: &str) -> Result<Option<Value>, AppError>;

    async fn count(&self, model: &ModelDescriptor) -> Result<u64, AppError>;

    /// Cheap round trip used by readiness checks and plugin setup.
    async fn ping(&self) -> Result<(), AppError>;
}
