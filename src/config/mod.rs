//! Configuration module
//!
//! Loading and validation of the optional YAML file that selects the
//! outcome, tunes phase timing, and points at the audio tracks.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{ConfigLoader, LoadResult, LoadWarning, LoaderOptions};
pub use schema::*;
pub use validation::{ValidationResult, Validator};
