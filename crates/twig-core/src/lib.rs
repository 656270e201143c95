//! twig-core library.
//!
//! Projects hold trees of tasks; the whole collection lives in one JSON
//! file. [`store::Store`] is the entry point: it loads the file, exposes
//! read accessors, and performs every mutation followed by a full rewrite.
//!
//! # Conventions
//!
//! - **Errors**: `thiserror` enums surfaced through [`TwigError`];
//!   `anyhow::Result` only for configuration loading.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod clock;
pub mod config;
pub mod error;
pub mod model;
pub mod storage;
pub mod store;
pub mod tree;

pub use error::{ErrorCode, TwigError};
pub use store::{Store, WritePolicy};
