//! Maps a model and its route options to route descriptors.

use crate::auth::Authentication;
use crate::config::{RouteKind, RoutesOptions, DEFAULT_PAGE_LIMIT};
use crate::handlers;
use crate::model::Model;
use crate::state::RouteContext;
use axum::http::Method;
use axum::routing::{delete, get, post, put, MethodRouter};
use std::fmt;
use std::sync::Arc;

/// One route ready for registration. Paths use `{param}` placeholders.
pub struct RouteDescriptor {
    pub kind: RouteKind,
    pub method: Method,
    pub path: String,
    pub allowed_roles: Vec<String>,
    pub handler: MethodRouter,
}

impl fmt::Debug for RouteDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteDescriptor")
            .field("kind", &self.kind)
            .field("method", &self.method)
            .field("path", &self.path)
            .field("allowed_roles", &self.allowed_roles)
            .finish_non_exhaustive()
    }
}

pub fn method_for(kind: RouteKind) -> Method {
    match kind {
        RouteKind::FindAll | RouteKind::FindAllWithPagination | RouteKind::FindOne | RouteKind::Count => Method::GET,
        RouteKind::Create => Method::POST,
        RouteKind::Update => Method::PUT,
        RouteKind::Delete => Method::DELETE,
    }
}

pub fn path_for(kind: RouteKind, base_route: &str) -> String {
    match kind {
        RouteKind::FindAll | RouteKind::Create => format!("/{}", base_route),
        RouteKind::FindAllWithPagination => format!("/{}/pagination/{{offset}}", base_route),
        RouteKind::FindOne | RouteKind::Update | RouteKind::Delete => format!("/{}/{{id}}", base_route),
        RouteKind::Count => format!("/{}/count", base_route),
    }
}

#[derive(Clone)]
pub struct RouteGenerator {
    authentication: Option<Arc<dyn Authentication>>,
    default_page_limit: u64,
}

impl Default for RouteGenerator {
    fn default() -> Self {
        RouteGenerator::new(DEFAULT_PAGE_LIMIT)
    }
}

impl RouteGenerator {
    pub fn new(default_page_limit: u64) -> Self {
        RouteGenerator {
            authentication: None,
            default_page_limit,
        }
    }

    /// Share a plugin with every route generated from now on. The first plugin set is kept:
    /// returns false, leaving the current plugin in place, when one is already set.
    pub fn set_authentication(&mut self, authentication: Arc<dyn Authentication>) -> bool {
        if self.authentication.is_some() {
            return false;
        }
        self.authentication = Some(authentication);
        true
    }

    pub fn authentication(&self) -> Option<&Arc<dyn Authentication>> {
        self.authentication.as_ref()
    }

    pub fn generate(&self, model: &Model, kind: RouteKind, allowed_roles: &[String]) -> RouteDescriptor {
        let ctx = RouteContext {
            model: model.clone(),
            allowed_roles: allowed_roles.into(),
            authentication: self.authentication.clone(),
            default_page_limit: self.default_page_limit,
        };
        let handler: MethodRouter = match kind {
            RouteKind::FindAll => get(handlers::find_all).with_state(ctx),
            RouteKind::FindAllWithPagination => get(handlers::find_all_with_pagination).with_state(ctx),
            RouteKind::FindOne => get(handlers::find_one).with_state(ctx),
            RouteKind::Create => post(handlers::create).with_state(ctx),
            RouteKind::Update => put(handlers::update).with_state(ctx),
            RouteKind::Delete => delete(handlers::delete).with_state(ctx),
            RouteKind::Count => get(handlers::count).with_state(ctx),
        };
        RouteDescriptor {
            kind,
            method: method_for(kind),
            path: path_for(kind, model.base_route()),
            allowed_roles: allowed_roles.to_vec(),
            handler,
        }
    }

    /// Descriptors for every enabled route kind, in registration order.
    pub fn generate_all(&self, model: &Model, routes: &RoutesOptions) -> Vec<RouteDescriptor> {
        routes
            .enabled()
            .map(|(kind, options)| self.generate(model, kind, &options.allowed_roles))
            .collect()
    }
}
