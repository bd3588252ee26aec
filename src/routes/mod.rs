mod common;
pub mod generator;

pub use common::common_routes;
pub use generator::{method_for, path_for, RouteDescriptor, RouteGenerator};
