//! Process settings read from the environment. Binaries load `.env` before calling `Settings::from_env`.

use std::str::FromStr;

/// Default number of rows returned by the pagination route when `?limit=` is absent.
pub const DEFAULT_PAGE_LIMIT: u64 = 100;
/// Upper bound for `?limit=`.
pub const MAX_PAGE_LIMIT: u64 = 1000;
/// Default request body limit in bytes.
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

#[derive(Clone, Debug)]
pub struct Settings {
    pub database_url: String,
    pub bind_addr: String,
    pub database_max_connections: u32,
    /// Enables bearer authentication in binaries when set.
    pub jwt_secret: Option<String>,
    pub default_page_limit: u64,
    pub body_limit: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            database_url: "postgres://localhost/roadwork".into(),
            bind_addr: "127.0.0.1:3000".into(),
            database_max_connections: 5,
            jwt_secret: None,
            default_page_limit: DEFAULT_PAGE_LIMIT,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

impl Settings {
    /// Read settings from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Settings::default();
        let default_page_limit = parse_or("ROADWORK_DEFAULT_PAGE_LIMIT", lookup("ROADWORK_DEFAULT_PAGE_LIMIT"), defaults.default_page_limit)
            .clamp(1, MAX_PAGE_LIMIT);
        Settings {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            database_max_connections: parse_or(
                "DATABASE_MAX_CONNECTIONS",
                lookup("DATABASE_MAX_CONNECTIONS"),
                defaults.database_max_connections,
            ),
            jwt_secret: lookup("JWT_SECRET").filter(|s| !s.trim().is_empty()),
            default_page_limit,
            body_limit: parse_or("ROADWORK_BODY_LIMIT", lookup("ROADWORK_BODY_LIMIT"), defaults.body_limit),
        }
    }
}

fn parse_or<T: FromStr + Copy + std::fmt::Display>(key: &str, raw: Option<String>, default: T) -> T {
    match raw {
        None => default,
        Some(s) => match s.trim().parse() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!("{}: invalid value '{}', using {}", key, s, default);
                default
            }
        },
    }
}
