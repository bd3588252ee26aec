//! PostgreSQL connection over a sqlx pool.

use crate::error::AppError;
use crate::model::ModelDescriptor;
use crate::orm::{Orm, Page};
use crate::sql::{self, Param, QueryBuf};
use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::postgres::{PgArguments, Postgres};
use sqlx::query::QueryScalar;
use sqlx::PgPool;

#[derive(Clone)]
pub struct PgOrm {
    pool: PgPool,
}

impl PgOrm {
    pub fn new(pool: PgPool) -> Self {
        PgOrm { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Query returning one jsonb column per row, with params bound in order.
fn json_query(q: &QueryBuf) -> QueryScalar<'_, Postgres, Value, PgArguments> {
    tracing::debug!(sql = %q.sql, params = ?q.params, "query");
    let mut query = sqlx::query_scalar::<_, Value>(&q.sql);
    for p in &q.params {
        query = match p {
            Param::Text(s) => query.bind(s.clone()),
            Param::Json(v) => query.bind(v.clone()),
        };
    }
    query
}

#[async_trait]
impl Orm for PgOrm {
    async fn find_all(&self, model: &ModelDescriptor) -> Result<Vec<Value>, AppError> {
        let q = sql::select_all(model);
        Ok(json_query(&q).fetch_all(&self.pool).await?)
    }

    async fn find_page(&self, model: &ModelDescriptor, offset: u64, limit: u64) -> Result<Page, AppError> {
        let q = sql::select_page(model, offset, limit);
        let rows = json_query(&q).fetch_all(&self.pool).await?;
        let row_count = self.count(model).await?;
        Ok(Page::new(rows, offset, limit, row_count))
    }

    async fn find_one(&self, model: &ModelDescriptor, id: &str) -> Result<Option<Value>, AppError> {
        let q = sql::select_by_id(model, id);
        Ok(json_query(&q).fetch_optional(&self.pool).await?)
    }

    async fn create(&self, model: &ModelDescriptor, body: &Map<String, Value>) -> Result<Value, AppError> {
        let q = sql::insert(model, body)?;
        json_query(&q)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::Db(sqlx::Error::RowNotFound))
    }

    async fn update(&self, model: &ModelDescriptor, id: &str, body: &Map<String, Value>) -> Result<Option<Value>, AppError> {
        let q = sql::update(model, id, body)?;
        Ok(json_query(&q).fetch_optional(&self.pool).await?)
    }

    async fn destroy(&self, model: &ModelDescriptor, id: &str) -> Result<Option<Value>, AppError> {
        let q = sql::delete(model, id);
        Ok(json_query(&q).fetch_optional(&self.pool).await?)
    }

    async fn count(&self, model: &ModelDescriptor) -> Result<u64, AppError> {
        let q = sql::count(model);
        tracing::debug!(sql = %q.sql, "query");
        let n: i64 = sqlx::query_scalar(&q.sql).fetch_one(&self.pool).await?;
        Ok(u64::try_from(n).unwrap_or(0))
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }
}
