//! Seed data merged into the persisted collection on load.

use std::path::Path;

use itertools::Itertools;
use serde_json::Value;
use tracing::{debug, error};

use crate::application::error_ext::IoResultExt;
use crate::application::migration::migrate_collection;
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::EntityData;
use crate::infrastructure::traits::FileSystem;

const GLOBALCORP: &str = include_str!("globalcorp.json");

/// Built-in example forests: GlobalCorp with its North America and Europe branches.
pub fn sample_forests() -> Vec<EntityData> {
    match serde_json::from_str::<EntityData>(GLOBALCORP) {
        Ok(forest) => vec![forest],
        Err(e) => {
            error!("built-in sample forest is unreadable: {}", e);
            Vec::new()
        }
    }
}

/// Forests from a user-supplied JSON seed file (one forest or a list).
pub fn load_seed_file(fs: &dyn FileSystem, path: &Path) -> ApplicationResult<Vec<EntityData>> {
    let content = fs
        .read_to_string(path)
        .with_path_context("read seed file", path)?;
    let raw: Value =
        serde_json::from_str(&content).map_err(|e| ApplicationError::OperationFailed {
            context: format!("parse seed file {}", path.display()),
            source: Box::new(e),
        })?;
    if !(raw.is_array() || raw.is_object()) {
        return Err(ApplicationError::InvalidSeed(path.to_path_buf()));
    }
    let forests = migrate_collection(&raw);
    debug!("seed file {}: {} forests", path.display(), forests.len());
    Ok(forests)
}

/// Persisted forests first, then seed forests; the first occurrence of a company name wins.
pub fn merge_with_seed(persisted: Vec<EntityData>, seed: Vec<EntityData>) -> Vec<EntityData> {
    persisted
        .into_iter()
        .chain(seed)
        .unique_by(|forest| forest.company_name().to_string())
        .collect()
}
