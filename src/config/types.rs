//! Route configuration types accepted by `Roadwork::generate`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The seven routes generated per model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RouteKind {
    FindAll,
    FindAllWithPagination,
    FindOne,
    Create,
    Update,
    Delete,
    Count,
}

impl RouteKind {
    /// Registration order.
    pub const ALL: [RouteKind; 7] = [
        RouteKind::FindAll,
        RouteKind::FindAllWithPagination,
        RouteKind::FindOne,
        RouteKind::Create,
        RouteKind::Update,
        RouteKind::Delete,
        RouteKind::Count,
    ];

    /// Key used in the options object (`routes.<key>`).
    pub fn key(&self) -> &'static str {
        match self {
            RouteKind::FindAll => "findAll",
            RouteKind::FindAllWithPagination => "findAllWithPagination",
            RouteKind::FindOne => "findOne",
            RouteKind::Create => "create",
            RouteKind::Update => "update",
            RouteKind::Delete => "delete",
            RouteKind::Count => "count",
        }
    }

    pub fn from_key(key: &str) -> Option<RouteKind> {
        RouteKind::ALL.into_iter().find(|k| k.key() == key)
    }
}

impl fmt::Display for RouteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RouteOptions {
    #[serde(default = "default_true")]
    pub is_enabled: bool,
    /// Empty means no role restriction.
    #[serde(default)]
    pub allowed_roles: Vec<String>,
}

fn default_true() -> bool {
    true
}

impl Default for RouteOptions {
    fn default() -> Self {
        RouteOptions {
            is_enabled: true,
            allowed_roles: Vec::new(),
        }
    }
}

impl RouteOptions {
    pub fn disabled() -> Self {
        RouteOptions {
            is_enabled: false,
            allowed_roles: Vec::new(),
        }
    }

    pub fn with_roles<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RouteOptions {
            is_enabled: true,
            allowed_roles: roles.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RoutesOptions {
    #[serde(default)]
    pub find_all: RouteOptions,
    #[serde(default)]
    pub find_all_with_pagination: RouteOptions,
    #[serde(default)]
    pub find_one: RouteOptions,
    #[serde(default)]
    pub create: RouteOptions,
    #[serde(default)]
    pub update: RouteOptions,
    #[serde(default)]
    pub delete: RouteOptions,
    #[serde(default)]
    pub count: RouteOptions,
}

impl RoutesOptions {
    pub fn get(&self, kind: RouteKind) -> &RouteOptions {
        match kind {
            RouteKind::FindAll => &self.find_all,
            RouteKind::FindAllWithPagination => &self.find_all_with_pagination,
            RouteKind::FindOne => &self.find_one,
            RouteKind::Create => &self.create,
            RouteKind::Update => &self.update,
            RouteKind::Delete => &self.delete,
            RouteKind::Count => &self.count,
        }
    }

    pub fn get_mut(&mut self, kind: RouteKind) -> &mut RouteOptions {
        match kind {
            RouteKind::FindAll => &mut self.find_all,
            RouteKind::FindAllWithPagination => &mut self.find_all_with_pagination,
            RouteKind::FindOne => &mut self.find_one,
            RouteKind::Create => &mut self.create,
            RouteKind::Update => &mut self.update,
            RouteKind::Delete => &mut self.delete,
            RouteKind::Count => &mut self.count,
        }
    }

    /// Enabled kinds in registration order, with their options.
    pub fn enabled(&self) -> impl Iterator<Item = (RouteKind, &RouteOptions)> + '_ {
        RouteKind::ALL
            .into_iter()
            .map(move |k| (k, self.get(k)))
            .filter(|(_, o)| o.is_enabled)
    }
}

/// Normalized options for one `generate` call. Every route kind is present.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GenerateOptions {
    #[serde(default)]
    pub routes: RoutesOptions,
}

impl GenerateOptions {
    /// Set one route kind's options, keeping the rest.
    pub fn route(mut self, kind: RouteKind, options: RouteOptions) -> Self {
        *self.routes.get_mut(kind) = options;
        self
    }
}
