//! Options validation: reject unknown keys, apply conversions and defaults.

use crate::config::{GenerateOptions, RouteKind, RouteOptions};
use crate::error::RoadworkError;
use serde_json::{Map, Value};

const TOP_LEVEL_KEYS: &[&str] = &["routes"];
const ROUTE_KEYS: &[&str] = &["isEnabled", "allowedRoles"];

/// Validate raw `generate` options and normalize them. `None` and `null` yield the defaults
/// (every route enabled, no role restriction).
pub fn validate_options(raw: Option<&Value>) -> Result<GenerateOptions, RoadworkError> {
    let mut options = GenerateOptions::default();
    let top = match raw {
        None | Some(Value::Null) => return Ok(options),
        Some(Value::Object(m)) => m,
        Some(_) => return Err(invalid("value", "must be an object")),
    };
    reject_unknown(top, TOP_LEVEL_KEYS)?;

    let routes = match top.get("routes") {
        None | Some(Value::Null) => return Ok(options),
        Some(Value::Object(m)) => m,
        Some(_) => return Err(invalid("routes", "must be an object")),
    };
    if let Some(key) = routes.keys().find(|k| RouteKind::from_key(k).is_none()) {
        return Err(not_allowed(key));
    }

    for kind in RouteKind::ALL {
        if let Some(v) = routes.get(kind.key()) {
            *options.routes.get_mut(kind) = route_options(kind, v)?;
        }
    }
    Ok(options)
}

fn route_options(kind: RouteKind, value: &Value) -> Result<RouteOptions, RoadworkError> {
    let obj = match value {
        Value::Null => return Ok(RouteOptions::default()),
        Value::Object(m) => m,
        _ => return Err(invalid(&format!("routes.{}", kind), "must be an object")),
    };
    reject_unknown(obj, ROUTE_KEYS)?;

    let is_enabled = match obj.get("isEnabled") {
        None | Some(Value::Null) => true,
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) if s.eq_ignore_ascii_case("true") => true,
        Some(Value::String(s)) if s.eq_ignore_ascii_case("false") => false,
        Some(_) => {
            return Err(invalid(&format!("routes.{}.isEnabled", kind), "must be a boolean"));
        }
    };

    let label = format!("routes.{}.allowedRoles", kind);
    let raw_roles: Vec<&str> = match obj.get("allowedRoles") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::String(s)) => vec![s.as_str()],
        Some(Value::Array(items)) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                let s = item
                    .as_str()
                    .ok_or_else(|| invalid(&label, "must be an array of strings"))?;
                out.push(s);
            }
            out
        }
        Some(_) => return Err(invalid(&label, "must be an array of strings")),
    };

    let mut allowed_roles: Vec<String> = Vec::with_capacity(raw_roles.len());
    for role in raw_roles {
        let role = role.trim();
        if role.is_empty() {
            return Err(invalid(&label, "must not contain empty roles"));
        }
        if !allowed_roles.iter().any(|r| r == role) {
            allowed_roles.push(role.to_string());
        }
    }

    Ok(RouteOptions {
        is_enabled,
        allowed_roles,
    })
}

fn reject_unknown(obj: &Map<String, Value>, allowed: &[&str]) -> Result<(), RoadworkError> {
    match obj.keys().find(|k| !allowed.contains(&k.as_str())) {
        Some(key) => Err(not_allowed(key)),
        None => Ok(()),
    }
}

fn not_allowed(key: &str) -> RoadworkError {
    RoadworkError::Validation(format!("\"{}\" is not allowed", key))
}

fn invalid(label: &str, reason: &str) -> RoadworkError {
    RoadworkError::Validation(format!("\"{}\" {}", label, reason))
}
