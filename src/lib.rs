//! tinyenv library - everything behind the `tinyenv` binary
//!
//! Version providers, the install pipeline, per-language directory
//! management and shims, plus the command-line layer that drives them.

#![warn(clippy::pedantic)]
#![warn(clippy::perf)]
#![warn(clippy::suspicious)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::similar_names)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]

pub mod cli;
pub mod config;
pub mod core;
pub mod runtimes;
pub mod shims;
