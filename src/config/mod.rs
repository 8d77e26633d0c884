//! Configuration loading

mod settings;

pub use settings::{HttpSettings, RehashFilter, Settings};
