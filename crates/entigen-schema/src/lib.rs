//! Symbol graph for entigen: entity and component declarations, their
//! loading from TOML/JSON, a declarative builder and structural validation.

pub mod builder;
pub mod error;
pub mod load;
pub mod node;
pub mod types;
pub mod validate;

/// Maximum length for a single identifier (member, parameter, path segment).
pub const MAX_IDENT_LEN: usize = 64;

/// Maximum length for a qualified schema path.
pub const MAX_PATH_LEN: usize = 256;

use crate::{error::ErrorTree, load::LoadError, node::NodeError};
use thiserror::Error as ThisError;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        err,
        error::ErrorTree,
        node::*,
        types::{Arg, Shape, Visibility},
    };
    pub use serde::{Deserialize, Serialize};
}

///
/// Error
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    LoadError(#[from] LoadError),

    #[error(transparent)]
    NodeError(#[from] NodeError),

    #[error("validation failed: {0}")]
    Validation(ErrorTree),
}

/// Load a schema file and validate it.
pub fn load_validated(path: impl AsRef<std::path::Path>) -> Result<node::Schema, Error> {
    let schema = node::Schema::load(path)?;
    validate::validate_schema(&schema).map_err(Error::Validation)?;

    Ok(schema)
}
