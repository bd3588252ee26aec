//! HTTP handlers for generated CRUD routes.

pub mod crud;
pub use crud::*;
