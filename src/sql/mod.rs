//! Safe SQL builder: identifiers validated and quoted, values as parameters.

mod builder;
pub use builder::*;
