//! Hierarchy service
//!
//! Owns the authoritative forest collection. Every mutation computes a new
//! collection with the domain mutation engine and commits it to the store
//! before the call returns.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::application::error_ext::IoResultExt;
use crate::application::migration::split_collection;
use crate::application::seed::merge_with_seed;
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::validation::{validate_company, validate_unit};
use crate::domain::{
    build_tree, mutation, validate_collection, validate_forest, BusinessUnitInfo, CompanyInfo,
    DomainError, EntityData, EntityNode, Level, LockView, ValidationIssue,
};
use crate::infrastructure::traits::ForestStore;

/// Issues of one forest, keyed by its company name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForestReport {
    pub company: String,
    pub issues: Vec<String>,
}

/// Result of validating the whole collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Issues spanning forests, such as repeated company names
    pub collection: Vec<String>,
    pub forests: Vec<ForestReport>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.collection.is_empty() && self.forests.iter().all(|f| f.issues.is_empty())
    }

    pub fn issue_count(&self) -> usize {
        self.collection.len() + self.forests.iter().map(|f| f.issues.len()).sum::<usize>()
    }
}

fn render(issues: Vec<ValidationIssue>) -> Vec<String> {
    issues.into_iter().map(|i| i.to_string()).collect()
}

/// Field issues of every settled record in a forest.
fn field_issues(forest: &EntityData) -> Vec<ValidationIssue> {
    let mut issues = validate_company(&forest.company_info);
    for level in Level::UNITS {
        for unit in forest.units(level).iter().filter(|u| u.status.is_submitted()) {
            issues.extend(validate_unit(level, unit));
        }
    }
    issues
}

/// Service owning the forest collection and its store.
pub struct HierarchyService {
    store: Arc<dyn ForestStore>,
    forests: Vec<EntityData>,
    /// Stored entries that could not be migrated, written back on every commit
    retained: Vec<Value>,
}

impl HierarchyService {
    /// Load the stored collection, migrate it and merge in `seed` forests.
    #[instrument(level = "debug", skip_all, fields(seed = seed.len()))]
    pub fn load(store: Arc<dyn ForestStore>, seed: Vec<EntityData>) -> ApplicationResult<Self> {
        let (persisted, retained) = store
            .load()
            .with_context("load stored forests")?
            .map(|raw| split_collection(&raw))
            .unwrap_or_default();
        debug!("loaded {} persisted forests", persisted.len());
        if !retained.is_empty() {
            warn!("{} stored entries are unreadable and kept as is", retained.len());
        }

        let forests = merge_with_seed(persisted, seed);
        let duplicates = validate_collection(&forests);
        if !duplicates.is_empty() {
            warn!("collection has {} repeated company names", duplicates.len());
        }
        Ok(Self {
            store,
            forests,
            retained,
        })
    }

    pub fn forests(&self) -> &[EntityData] {
        &self.forests
    }

    /// Raw stored entries that could not be read as forests.
    pub fn unreadable(&self) -> &[Value] {
        &self.retained
    }

    pub fn forest(&self, forest_index: usize) -> ApplicationResult<&EntityData> {
        self.forests
            .get(forest_index)
            .ok_or(ApplicationError::Domain(DomainError::ForestNotFound(
                forest_index,
            )))
    }

    /// Position of the forest whose company is `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.forests.iter().position(|f| f.company_name() == name)
    }

    /// One tree per forest, in collection order.
    pub fn trees(&self) -> Vec<EntityNode> {
        self.forests.iter().map(build_tree).collect()
    }

    pub fn tree(&self, forest_index: usize) -> ApplicationResult<EntityNode> {
        self.forest(forest_index).map(build_tree)
    }

    pub fn lock_view(&self, forest_index: usize) -> ApplicationResult<LockView> {
        self.forest(forest_index).map(LockView::of)
    }

    /// Referential issues of every forest; with `strict`, form field issues too.
    pub fn validate(&self, strict: bool) -> ValidationReport {
        let forests = self
            .forests
            .iter()
            .map(|forest| {
                let mut issues = validate_forest(forest);
                if strict {
                    issues.extend(field_issues(forest));
                }
                ForestReport {
                    company: forest.company_name().to_string(),
                    issues: render(issues),
                }
            })
            .collect();

        ValidationReport {
            collection: render(validate_collection(&self.forests)),
            forests,
        }
    }

    /// Write `next` to the store and make it the current collection.
    fn commit(&mut self, next: Vec<EntityData>) -> ApplicationResult<()> {
        self.store
            .save(&next, &self.retained)
            .with_context("save forests")?;
        debug!("committed {} forests", next.len());
        self.forests = next;
        Ok(())
    }

    pub fn rename(
        &mut self,
        forest_index: usize,
        level: Level,
        old_name: &str,
        new_name: &str,
    ) -> ApplicationResult<()> {
        let next = mutation::rename(&self.forests, forest_index, level, old_name, new_name)?;
        self.commit(next)
    }

    pub fn delete(&mut self, forest_index: usize, level: Level, name: &str) -> ApplicationResult<()> {
        let next = mutation::delete(&self.forests, forest_index, level, name)?;
        self.commit(next)
    }

    /// Add a pending row and return its index within the level.
    pub fn add(&mut self, forest_index: usize, level: Level) -> ApplicationResult<usize> {
        let (next, row) = mutation::add(&self.forests, forest_index, level)?;
        self.commit(next)?;
        Ok(row)
    }

    /// Create a forest and return its index.
    pub fn create_forest(&mut self, company: CompanyInfo) -> ApplicationResult<usize> {
        let next = mutation::create_forest(&self.forests, company)?;
        self.commit(next)?;
        Ok(self.forests.len() - 1)
    }

    pub fn submit(
        &mut self,
        forest_index: usize,
        level: Level,
        row: usize,
        details: BusinessUnitInfo,
    ) -> ApplicationResult<()> {
        let next = mutation::submit(&self.forests, forest_index, level, row, details)?;
        self.commit(next)
    }

    pub fn discard(&mut self, forest_index: usize, level: Level, row: usize) -> ApplicationResult<()> {
        let next = mutation::discard(&self.forests, forest_index, level, row)?;
        self.commit(next)
    }

    pub fn begin_edit(&mut self, forest_index: usize, level: Level, name: &str) -> ApplicationResult<()> {
        let next = mutation::begin_edit(&self.forests, forest_index, level, name)?;
        self.commit(next)
    }

    pub fn cancel_edit(&mut self, forest_index: usize, level: Level, name: &str) -> ApplicationResult<()> {
        let next = mutation::cancel_edit(&self.forests, forest_index, level, name)?;
        self.commit(next)
    }

    pub fn update_details(
        &mut self,
        forest_index: usize,
        level: Level,
        name: &str,
        details: BusinessUnitInfo,
    ) -> ApplicationResult<()> {
        let next = mutation::update_details(&self.forests, forest_index, level, name, details)?;
        self.commit(next)
    }

    pub fn update_company(&mut self, forest_index: usize, details: CompanyInfo) -> ApplicationResult<()> {
        let next = mutation::update_company(&self.forests, forest_index, details)?;
        self.commit(next)
    }
}
