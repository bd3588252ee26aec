//! Per-route state handed to every generated handler.

use crate::auth::Authentication;
use crate::model::Model;
use std::sync::Arc;

#[derive(Clone)]
pub struct RouteContext {
    pub model: Model,
    /// Empty means the route is public.
    pub allowed_roles: Arc<[String]>,
    /// Captured when the route was generated; later plugin changes do not affect it.
    pub authentication: Option<Arc<dyn Authentication>>,
    pub default_page_limit: u64,
}
