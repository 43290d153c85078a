//! Validation steps for path/query, payload and header input.
//!
//! An endpoint may declare a schema several times. Only the first declaration
//! of each kind validates: it holds a cell the endpoint fills at build time
//! with the combined schema. Later declarations only contribute their
//! fragment, so input is resolved once per kind.
//!
//! Used on its own (outside an endpoint builder), a validation step resolves
//! against its own fragment.

mod header;
mod payload;
mod query;

use std::sync::{Arc, OnceLock};

use sluice_core::schema::Schema;

pub use header::HeaderValidation;
pub use payload::PayloadValidation;
pub use query::QueryValidation;

/// Cell holding the combined schema of one kind.
pub(crate) type SchemaCell = Arc<OnceLock<Schema>>;

#[derive(Debug, Clone)]
enum Role {
    /// Resolves against its own fragment
    Standalone,
    /// Resolves against the combined schema once the cell is filled
    Primary(SchemaCell),
    /// Contributes its fragment, validates nothing
    Contributor,
}

impl Role {
    fn active<'a>(&'a self, fragment: &'a Schema) -> Option<&'a Schema> {
        match self {
            Self::Standalone => Some(fragment),
            Self::Primary(cell) => Some(cell.get().unwrap_or(fragment)),
            Self::Contributor => None,
        }
    }
}
