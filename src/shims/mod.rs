//! Ownership-tagged shims in `<root>/bin`
//!
//! A shim is a tiny POSIX script that execs one executable of a language's
//! active version.

mod generator;

pub use generator::{
    RehashReport, find_executables, rehash, remove_owned, shim_content, shim_header,
};
