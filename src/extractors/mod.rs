//! Request extractors shared by generated handlers.

mod authorized;
pub use authorized::Authorized;
