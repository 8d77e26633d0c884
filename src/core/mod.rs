//! Core module - shared types, errors, and the leaf services every
//! provider builds on

pub mod archive;
mod error;
pub mod http;
pub mod paths;
pub mod platform;
mod types;

pub use error::{TinyenvError, format_error_with_suggestion};
pub use types::Language;
