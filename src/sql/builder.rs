//! Builds parameterized SELECT, INSERT, UPDATE, DELETE for a model table.
//! Rows come back as one `jsonb` column; payloads go in as one `jsonb` parameter expanded with
//! `jsonb_populate_record`, so PostgreSQL does the type conversion per column.

use crate::error::AppError;
use crate::model::ModelDescriptor;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

/// Alias used for the model table in every statement.
const ALIAS: &str = "t";
const TIMESTAMP_COLUMNS: [&str; 2] = ["created_at", "updated_at"];

/// Plain SQL identifier: letters, digits, underscore; not starting with a digit.
pub fn is_identifier(s: &str) -> bool {
    static IDENT: OnceLock<Regex> = OnceLock::new();
    IDENT
        .get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("static identifier pattern"))
        .is_match(s)
}

/// Quote identifier for PostgreSQL.
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Schema-qualified table name when the model has a schema.
fn qualified_table(model: &ModelDescriptor) -> String {
    match &model.schema {
        Some(schema) => format!("{}.{}", quoted(schema), quoted(&model.table_name)),
        None => quoted(&model.table_name),
    }
}

/// A bind parameter. Ids are compared as text; payloads are bound as jsonb.
#[derive(Clone, Debug, PartialEq)]
pub enum Param {
    Text(String),
    Json(Value),
}

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Param>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, p: Param) -> u32 {
        self.params.push(p);
        self.params.len() as u32
    }
}

fn pk_match(model: &ModelDescriptor, param_num: u32) -> String {
    format!("{}.{}::text = ${}", ALIAS, quoted(&model.primary_key), param_num)
}

/// Columns named by the payload, validated. Timestamp columns are managed by the builder when enabled.
fn payload_columns<'a>(model: &ModelDescriptor, body: &'a Map<String, Value>, skip_pk: bool) -> Result<Vec<&'a str>, AppError> {
    let mut cols = Vec::with_capacity(body.len());
    for key in body.keys() {
        if !is_identifier(key) {
            return Err(AppError::Validation(format!("invalid field name '{}'", key)));
        }
        if skip_pk && *key == model.primary_key {
            continue;
        }
        if model.has_timestamps && TIMESTAMP_COLUMNS.contains(&key.as_str()) {
            continue;
        }
        cols.push(key.as_str());
    }
    Ok(cols)
}

/// The part of body that is bound: only the columns that are written.
fn payload(body: &Map<String, Value>, cols: &[&str]) -> Value {
    Value::Object(
        cols.iter()
            .filter_map(|c| body.get(*c).map(|v| (c.to_string(), v.clone())))
            .collect(),
    )
}

/// SELECT every row ordered by primary key.
pub fn select_all(model: &ModelDescriptor) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!(
        "SELECT to_jsonb({a}) AS row FROM {} AS {a} ORDER BY {a}.{}",
        qualified_table(model),
        quoted(&model.primary_key),
        a = ALIAS
    );
    q
}

/// SELECT one page ordered by primary key.
pub fn select_page(model: &ModelDescriptor, offset: u64, limit: u64) -> QueryBuf {
    let mut q = select_all(model);
    q.sql.push_str(&format!(" LIMIT {} OFFSET {}", limit, offset));
    q
}

/// SELECT by primary key.
pub fn select_by_id(model: &ModelDescriptor, id: &str) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(Param::Text(id.to_string()));
    q.sql = format!(
        "SELECT to_jsonb({a}) AS row FROM {} AS {a} WHERE {}",
        qualified_table(model),
        pk_match(model, n),
        a = ALIAS
    );
    q
}

/// SELECT COUNT(*).
pub fn count(model: &ModelDescriptor) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!("SELECT COUNT(*) AS count FROM {}", qualified_table(model));
    q
}

/// INSERT the columns present in body; omitted columns take their DB default.
pub fn insert(model: &ModelDescriptor, body: &Map<String, Value>) -> Result<QueryBuf, AppError> {
    let mut q = QueryBuf::new();
    let table = qualified_table(model);
    let cols = payload_columns(model, body, false)?;

    let mut names: Vec<String> = cols.iter().map(|c| quoted(c)).collect();
    let mut values = names.clone();
    if model.has_timestamps {
        for ts in TIMESTAMP_COLUMNS {
            names.push(quoted(ts));
            values.push("NOW()".into());
        }
    }

    if names.is_empty() {
        q.sql = format!(
            "INSERT INTO {} AS {a} DEFAULT VALUES RETURNING to_jsonb({a}) AS row",
            table,
            a = ALIAS
        );
        return Ok(q);
    }

    let source = if cols.is_empty() {
        String::new()
    } else {
        let n = q.push_param(Param::Json(payload(body, &cols)));
        format!(" FROM jsonb_populate_record(NULL::{}, ${}::jsonb)", table, n)
    };
    q.sql = format!(
        "INSERT INTO {} AS {a} ({}) SELECT {}{} RETURNING to_jsonb({a}) AS row",
        table,
        names.join(", "),
        values.join(", "),
        source,
        a = ALIAS
    );
    Ok(q)
}

/// UPDATE by primary key: SET only columns present in body. The primary key itself is never updated.
/// With nothing to set, falls back to SELECT by id.
pub fn update(model: &ModelDescriptor, id: &str, body: &Map<String, Value>) -> Result<QueryBuf, AppError> {
    let table = qualified_table(model);
    let cols = payload_columns(model, body, true)?;

    let mut sets = Vec::new();
    let mut q = QueryBuf::new();
    if !cols.is_empty() {
        let n = q.push_param(Param::Json(payload(body, &cols)));
        let names: Vec<String> = cols.iter().map(|c| quoted(c)).collect();
        let source = format!("jsonb_populate_record(NULL::{}, ${}::jsonb)", table, n);
        if names.len() == 1 {
            sets.push(format!("{} = (SELECT {} FROM {})", names[0], names[0], source));
        } else {
            let list = names.join(", ");
            sets.push(format!("({}) = (SELECT {} FROM {})", list, list, source));
        }
    }
    if model.has_timestamps {
        sets.push(format!("{} = NOW()", quoted("updated_at")));
    }
    if sets.is_empty() {
        return Ok(select_by_id(model, id));
    }

    let id_param = q.push_param(Param::Text(id.to_string()));
    q.sql = format!(
        "UPDATE {} AS {a} SET {} WHERE {} RETURNING to_jsonb({a}) AS row",
        table,
        sets.join(", "),
        pk_match(model, id_param),
        a = ALIAS
    );
    Ok(q)
}

/// DELETE by primary key, returning the deleted row.
pub fn delete(model: &ModelDescriptor, id: &str) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(Param::Text(id.to_string()));
    q.sql = format!(
        "DELETE FROM {} AS {a} WHERE {} RETURNING to_jsonb({a}) AS row",
        qualified_table(model),
        pk_match(model, n),
        a = ALIAS
    );
    q
}
