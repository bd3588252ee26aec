//! The facade: owns the adapter, the route generator and the shared connection.

use crate::adapter::AxumAdapter;
use crate::auth::{Authentication, AuthenticationLibrary};
use crate::config::{validate_options, GenerateOptions, RouteKind, Settings, DEFAULT_BODY_LIMIT, DEFAULT_PAGE_LIMIT};
use crate::error::RoadworkError;
use crate::model::{BaseModel, Model};
use crate::orm::Orm;
use crate::routes::RouteGenerator;
use axum::Router;
use serde_json::Value;
use std::sync::Arc;

pub struct RoadworkBuilder {
    server: Option<Router>,
    connection: Option<Arc<dyn Orm>>,
    default_page_limit: u64,
    body_limit: usize,
}

impl Default for RoadworkBuilder {
    fn default() -> Self {
        RoadworkBuilder {
            server: None,
            connection: None,
            default_page_limit: DEFAULT_PAGE_LIMIT,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

impl RoadworkBuilder {
    /// The application router. Generated routes are served in front of it.
    pub fn server(mut self, server: Router) -> Self {
        self.server = Some(server);
        self
    }

    pub fn connection(mut self, connection: Arc<dyn Orm>) -> Self {
        self.connection = Some(connection);
        self
    }

    /// Page limit and body limit from settings.
    pub fn settings(mut self, settings: &Settings) -> Self {
        self.default_page_limit = settings.default_page_limit;
        self.body_limit = settings.body_limit;
        self
    }

    pub fn build(self) -> Result<Roadwork, RoadworkError> {
        let server = self.server.ok_or(RoadworkError::NoHttpEngine)?;
        let connection = self.connection.ok_or(RoadworkError::MissingConnection)?;
        Ok(Roadwork {
            adapter: AxumAdapter::new(server).with_body_limit(self.body_limit),
            connection,
            route_generator: RouteGenerator::new(self.default_page_limit),
            authentication: None,
            models: Vec::new(),
        })
    }
}

pub struct Roadwork {
    adapter: AxumAdapter,
    connection: Arc<dyn Orm>,
    route_generator: RouteGenerator,
    authentication: Option<Arc<dyn Authentication>>,
    models: Vec<Model>,
}

impl Roadwork {
    pub fn builder() -> RoadworkBuilder {
        RoadworkBuilder::default()
    }

    pub fn new(server: Router, connection: Arc<dyn Orm>) -> Self {
        Roadwork {
            adapter: AxumAdapter::new(server),
            connection,
            route_generator: RouteGenerator::default(),
            authentication: None,
            models: Vec::new(),
        }
    }

    /// Validate raw options, then generate and register routes for `base_model`.
    /// See [`Roadwork::generate_with`].
    pub fn generate(&mut self, base_model: &BaseModel, options: Option<&Value>) -> Result<Model, RoadworkError> {
        let model = Model::wrap(base_model, self.connection.clone())?;
        let options = validate_options(options)?;
        self.register(model, &options)
    }

    /// Generate and register every enabled route for `base_model`. Nothing is registered when any
    /// of the routes is already taken.
    pub fn generate_with(&mut self, base_model: &BaseModel, options: &GenerateOptions) -> Result<Model, RoadworkError> {
        let model = Model::wrap(base_model, self.connection.clone())?;
        self.register(model, options)
    }

    fn register(&mut self, model: Model, options: &GenerateOptions) -> Result<Model, RoadworkError> {
        let descriptors = self.route_generator.generate_all(&model, &options.routes);
        if let Some(taken) = descriptors.iter().find(|d| self.adapter.contains(&d.method, &d.path)) {
            return Err(RoadworkError::DuplicateRoute {
                method: taken.method.to_string(),
                path: taken.path.clone(),
            });
        }

        tracing::info!("creating REST routes for {}:", model.table_name());
        for descriptor in descriptors {
            let path = if descriptor.kind == RouteKind::FindAllWithPagination {
                format!("{}?limit={{limit}}", descriptor.path)
            } else {
                descriptor.path.clone()
            };
            let roles = if descriptor.allowed_roles.is_empty() {
                "everyone".to_string()
            } else {
                descriptor.allowed_roles.join(", ")
            };
            let method = descriptor.method.clone();
            self.adapter.register_route(descriptor)?;
            tracing::info!("--> created {} {} for: {}", method, path, roles);
        }

        self.models.push(model.clone());
        Ok(model)
    }

    /// Build the plugin from `library`, register it, run its one-time setup and share it with the
    /// route generator. Routes generated afterwards enforce their allowed roles. When setup fails
    /// the plugin is unregistered again, so the call can be retried.
    ///
    /// Once a plugin is installed, later calls succeed without building or initializing anything.
    pub async fn add_authentication<L: AuthenticationLibrary>(&mut self, library: Option<L>) -> Result<(), RoadworkError> {
        let library = library.ok_or(RoadworkError::MissingAuthenticationLibrary)?;
        if let Some(installed) = &self.authentication {
            tracing::warn!(plugin = installed.name(), "authentication already added, reusing the installed plugin");
            return Ok(());
        }

        let plugin = library.build(self.connection.clone())?;
        if !self.adapter.register_plugin(plugin.clone()) {
            return Err(RoadworkError::Authentication(format!(
                "plugin '{}' is already registered",
                plugin.name()
            )));
        }
        if let Err(e) = plugin.init().await {
            self.adapter.unregister_plugin(plugin.name());
            return Err(e);
        }
        self.route_generator.set_authentication(plugin.clone());
        self.authentication = Some(plugin);
        Ok(())
    }

    /// The HTTP adapter holding the router and route table.
    pub fn server(&self) -> &AxumAdapter {
        &self.adapter
    }

    pub fn router(&self) -> Router {
        self.adapter.router()
    }

    pub fn models(&self) -> &[Model] {
        &self.models
    }

    pub fn route_generator(&self) -> &RouteGenerator {
        &self.route_generator
    }

    pub fn authentication(&self) -> Option<&Arc<dyn Authentication>> {
        self.authentication.as_ref()
    }

    pub fn connection(&self) -> &Arc<dyn Orm> {
        &self.connection
    }
}
