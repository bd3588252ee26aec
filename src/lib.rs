//! Roadwork: generated REST CRUD routes for axum over PostgreSQL, with role-based access.

pub mod adapter;
pub mod auth;
pub mod config;
pub mod error;
pub mod extractors;
pub mod facade;
pub mod handlers;
pub mod inflect;
pub mod model;
pub mod orm;
pub mod response;
pub mod routes;
pub mod sql;
pub mod state;

pub use adapter::{AxumAdapter, RouteEntry};
pub use auth::{issue_token, Authentication, AuthenticationLibrary, BearerLibrary, Caller};
pub use config::{validate_options, GenerateOptions, RouteKind, RouteOptions, Settings};
pub use error::{AppError, RoadworkError};
pub use model::{BaseModel, Model, ModelDescriptor};
pub use orm::{Orm, Page, PgOrm};
pub use facade::{Roadwork, RoadworkBuilder};
pub use routes::{common_routes, RouteDescriptor, RouteGenerator};
pub use state::RouteContext;
