//! protolink-linker
//!
//! This crate implements:
//!  1) The descriptor loader (`parse` / `try_parse`, descriptor-set files,
//!     and the newline-delimited reference catalog),
//!  2) Structural validation of unlinked file descriptors,
//!  3) The four-phase linker resolving a flat file list into `resolved`,
//!     `partially_resolved`, and `unresolved` tiers,
//!  4) Comment lookup over source-position metadata, and
//!  5) Error types (`LinkError`).

pub mod catalog;
pub mod comments;
pub mod error;
pub mod linker;
pub mod loader;
pub mod validate;

pub use error::LinkError;
pub use linker::{link, LinkedSet};
pub use loader::{parse, try_parse};
