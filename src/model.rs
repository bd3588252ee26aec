//! Model wrapper: derives route metadata from a base model and delegates CRUD to the connection.

use crate::error::{AppError, RoadworkError};
use crate::inflect;
use crate::orm::{Orm, Page};
use crate::sql::is_identifier;
use serde_json::{Map, Value};
use std::sync::Arc;

/// The table definition supplied by the application.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BaseModel {
    pub table_name: String,
    /// Primary key column. Default `id`.
    pub id_attribute: String,
    pub schema: Option<String>,
    /// Maintain `created_at`/`updated_at` on create and update.
    pub has_timestamps: bool,
}

impl BaseModel {
    pub fn new(table_name: impl Into<String>) -> Self {
        BaseModel {
            table_name: table_name.into(),
            id_attribute: "id".into(),
            schema: None,
            has_timestamps: false,
        }
    }

    pub fn with_id_attribute(mut self, id_attribute: impl Into<String>) -> Self {
        self.id_attribute = id_attribute.into();
        self
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn with_timestamps(mut self) -> Self {
        self.has_timestamps = true;
        self
    }
}

/// Metadata derived once from a base model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelDescriptor {
    pub schema: Option<String>,
    pub table_name: String,
    /// Pluralized, lower-cased table name (e.g. "widgets").
    pub base_route: String,
    pub primary_key: String,
    pub has_timestamps: bool,
}

impl ModelDescriptor {
    pub fn from_base(base: &BaseModel) -> Result<Self, RoadworkError> {
        let table_name = base.table_name.trim();
        if table_name.is_empty() {
            return Err(RoadworkError::InvalidBaseModel);
        }
        check_identifier("table", table_name)?;
        check_identifier("id attribute", &base.id_attribute)?;
        if let Some(schema) = &base.schema {
            check_identifier("schema", schema)?;
        }
        Ok(ModelDescriptor {
            schema: base.schema.clone(),
            table_name: table_name.to_string(),
            base_route: inflect::route_name(table_name),
            primary_key: base.id_attribute.clone(),
            has_timestamps: base.has_timestamps,
        })
    }
}

fn check_identifier(kind: &'static str, value: &str) -> Result<(), RoadworkError> {
    if is_identifier(value) {
        Ok(())
    } else {
        Err(RoadworkError::InvalidIdentifier {
            kind,
            value: value.to_string(),
        })
    }
}

/// A wrapped model bound to the shared connection. Cheap to clone.
#[derive(Clone)]
pub struct Model {
    descriptor: Arc<ModelDescriptor>,
    connection: Arc<dyn Orm>,
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model").field("descriptor", &self.descriptor).finish_non_exhaustive()
    }
}

impl Model {
    /// Wrap a base model. The base model is not modified.
    pub fn wrap(base: &BaseModel, connection: Arc<dyn Orm>) -> Result<Self, RoadworkError> {
        Ok(Model {
            descriptor: Arc::new(ModelDescriptor::from_base(base)?),
            connection,
        })
    }

    pub fn descriptor(&self) -> &ModelDescriptor {
        &self.descriptor
    }

    pub fn table_name(&self) -> &str {
        &self.descriptor.table_name
    }

    pub fn base_route(&self) -> &str {
        &self.descriptor.base_route
    }

    pub fn primary_key(&self) -> &str {
        &self.descriptor.primary_key
    }

    pub async fn find_all(&self) -> Result<Vec<Value>, AppError> {
        self.connection.find_all(&self.descriptor).await
    }

    pub async fn find_page(&self, offset: u64, limit: u64) -> Result<Page, AppError> {
        self.connection.find_page(&self.descriptor, offset, limit).await
    }

    pub async fn find_one(&self, id: &str) -> Result<Option<Value>, AppError> {
        self.connection.find_one(&self.descriptor, id).await
    }

    pub async fn create(&self, body: &Map<String, Value>) -> Result<Value, AppError> {
        self.connection.create(&self.descriptor, body).await
    }

    pub async fn update(&self, id: &str, body: &Map<String, Value>) -> Result<Option<Value>, AppError> {
        self.connection.update(&self.descriptor, id, body).await
    }

    pub async fn destroy(&self, id: &str) -> Result<Option<Value>, AppError> {
        self.connection.destroy(&self.descriptor, id).await
    }

    pub async fn count(&self) -> Result<u64, AppError> {
        self.connection.count(&self.descriptor).await
    }
}
