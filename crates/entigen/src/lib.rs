//! ## Crate layout
//! - `build`: the synthesis engine and the `build!` build-script macro.
//! - `config`: `entigen.toml` loading.
//! - `runtime`: the store contract generated entities are written against.
//! - `schema`: entity/component declarations, loading and validation.
//!
//! Generated code refers to `::entigen::runtime` unless the configured
//! `runtime_path` says otherwise.

pub use entigen_build as build;
pub use entigen_config as config;
pub use entigen_schema as schema;

pub mod runtime;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//
// Macros
//

pub use entigen_build::build;

///
/// Prelude
///

pub mod prelude {
    pub use crate::runtime::{Component, ComponentStore, ComponentType, EntityId, MemoryStore};
}
