//! Loading role/relation snapshots exported by the editing front end.

mod catalog;
mod parse;

use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::graph::{RelationRecord, RoleRecord};

pub use catalog::{RelationCatalog, RelationTypeInfo, StrengthBand};
pub use parse::parse_snapshot;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read snapshot {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid snapshot JSON")]
    Json(#[from] serde_json::Error),

    #[error("snapshot must be a JSON object, found {0}")]
    NotAnObject(&'static str),
}

/// One consistent set of roles and relations.
#[derive(Clone, Debug, Default)]
pub struct Snapshot {
    pub roles: Vec<RoleRecord>,
    pub relations: Vec<RelationRecord>,
    pub catalog: RelationCatalog,
}

pub fn load_snapshot(path: &Path) -> Result<Snapshot, DataError> {
    let raw = std::fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let snapshot = parse_snapshot(&raw)?;
    info!(
        path = %path.display(),
        roles = snapshot.roles.len(),
        relations = snapshot.relations.len(),
        "loaded snapshot"
    );
    Ok(snapshot)
}
