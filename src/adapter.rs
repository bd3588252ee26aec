//! Registers route descriptors and authentication plugins into an axum router.

use crate::auth::Authentication;
use crate::config::DEFAULT_BODY_LIMIT;
use crate::error::RoadworkError;
use crate::routes::RouteDescriptor;
use axum::http::Method;
use axum::routing::MethodRouter;
use axum::Router;
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;

/// A registered method + path pair, with the path in `{param}` form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteEntry {
    pub method: Method,
    pub path: String,
}

/// Generated routes are kept apart from the application router. `router()` serves them first;
/// every other method or path falls through to the application router, so a generated route
/// shadows an application route on the same method + path.
pub struct AxumAdapter {
    server: Router,
    paths: Vec<(String, MethodRouter)>,
    table: Vec<RouteEntry>,
    plugins: Vec<Arc<dyn Authentication>>,
    body_limit: usize,
}

impl AxumAdapter {
    pub fn new(server: Router) -> Self {
        AxumAdapter {
            server,
            paths: Vec::new(),
            table: Vec::new(),
            plugins: Vec::new(),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    pub fn with_body_limit(mut self, body_limit: usize) -> Self {
        self.body_limit = body_limit;
        self
    }

    pub fn contains(&self, method: &Method, path: &str) -> bool {
        self.table.iter().any(|e| e.method == *method && e.path == path)
    }

    /// Add the route to the generated routes. A method + path pair can be registered once.
    pub fn register_route(&mut self, descriptor: RouteDescriptor) -> Result<(), RoadworkError> {
        if self.contains(&descriptor.method, &descriptor.path) {
            return Err(RoadworkError::DuplicateRoute {
                method: descriptor.method.to_string(),
                path: descriptor.path,
            });
        }
        let axum_path = to_axum_path(&descriptor.path);
        match self.paths.iter_mut().find(|(p, _)| *p == axum_path) {
            Some((_, existing)) => *existing = existing.clone().merge(descriptor.handler),
            None => self.paths.push((axum_path, descriptor.handler)),
        }
        self.table.push(RouteEntry {
            method: descriptor.method,
            path: descriptor.path,
        });
        Ok(())
    }

    /// Install an authentication plugin. Returns false when a plugin with that name is already installed.
    pub fn register_plugin(&mut self, plugin: Arc<dyn Authentication>) -> bool {
        if self.plugins.iter().any(|p| p.name() == plugin.name()) {
            tracing::debug!(plugin = plugin.name(), "plugin already registered");
            return false;
        }
        tracing::info!(plugin = plugin.name(), "registered authentication plugin");
        self.plugins.push(plugin);
        true
    }

    /// Remove the plugin named `name`. Returns false when no such plugin is installed.
    pub fn unregister_plugin(&mut self, name: &str) -> bool {
        let before = self.plugins.len();
        self.plugins.retain(|p| p.name() != name);
        self.plugins.len() != before
    }

    pub fn routes(&self) -> &[RouteEntry] {
        &self.table
    }

    pub fn plugin_names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    /// The generated routes in front of the application router, with the request body limit applied.
    pub fn router(&self) -> Router {
        let mut router = Router::new();
        for (path, handler) in &self.paths {
            router = router.route(path, handler.clone().fallback_service(self.server.clone()));
        }
        router
            .fallback_service(self.server.clone())
            .layer(RequestBodyLimitLayer::new(self.body_limit))
    }
}

/// `/widgets/{id}` -> `/widgets/:id`
fn to_axum_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut in_param = false;
    for c in path.chars() {
        match c {
            '{' if !in_param => {
                in_param = true;
                out.push(':');
            }
            '}' if in_param => in_param = false,
            _ => out.push(c),
        }
    }
    out
}
