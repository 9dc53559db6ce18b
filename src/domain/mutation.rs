//! Mutation engine: rename, delete, add and form submission over a forest collection.
//!
//! Every operation takes the current collection and returns a new one; the
//! input is never modified. Forests other than the target are carried over
//! unchanged.

use std::collections::HashSet;

use tracing::debug;

use crate::domain::entities::{BusinessUnitInfo, CompanyInfo, EntityData, Level};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::lock::{self, SubmissionState};
use crate::domain::validation::{validate_company, validate_unit};

fn forest_at(forests: &[EntityData], forest_index: usize) -> DomainResult<&EntityData> {
    forests
        .get(forest_index)
        .ok_or(DomainError::ForestNotFound(forest_index))
}

fn replace(forests: &[EntityData], forest_index: usize, forest: EntityData) -> Vec<EntityData> {
    let mut next = forests.to_vec();
    next[forest_index] = forest;
    next
}

fn unit_level(level: Level, action: &'static str) -> DomainResult<Level> {
    match level {
        Level::Company => Err(DomainError::UnsupportedLevel { level, action }),
        _ => Ok(level),
    }
}

fn units_mut<'a>(
    forest: &'a mut EntityData,
    level: Level,
    action: &'static str,
) -> DomainResult<&'a mut Vec<BusinessUnitInfo>> {
    forest
        .units_mut(level)
        .ok_or(DomainError::UnsupportedLevel { level, action })
}

/// Submitted (or editing) record named `name`. Pending rows have no identity yet.
fn settled(forest: &EntityData, level: Level, name: &str) -> DomainResult<()> {
    let found = !name.trim().is_empty()
        && match level {
            Level::Company => forest.company_name() == name,
            _ => forest
                .units(level)
                .iter()
                .any(|u| u.entity_name == name && u.status.is_submitted()),
        };
    if found {
        Ok(())
    } else {
        Err(DomainError::RecordNotFound {
            level,
            name: name.to_string(),
        })
    }
}

fn relink(units: &mut [BusinessUnitInfo], old_name: &str, new_name: &str) -> usize {
    let mut relinked = 0;
    for unit in units.iter_mut().filter(|u| u.parent == old_name) {
        unit.parent = new_name.to_string();
        relinked += 1;
    }
    relinked
}

/// Rename a record and point its children at the new name.
///
/// Returns the collection unchanged when `new_name` is blank or equal to
/// `old_name`. Children are relinked on the level directly below the renamed
/// record only: deeper `parent` fields hold names of intermediate records.
pub fn rename(
    forests: &[EntityData],
    forest_index: usize,
    level: Level,
    old_name: &str,
    new_name: &str,
) -> DomainResult<Vec<EntityData>> {
    let new_name = new_name.trim();
    if new_name.is_empty() || new_name == old_name {
        debug!("rename: nothing to do for '{}'", old_name);
        return Ok(forests.to_vec());
    }

    let mut forest = forest_at(forests, forest_index)?.clone();
    settled(&forest, level, old_name)?;

    match level {
        Level::Company => {
            let taken = forests
                .iter()
                .enumerate()
                .any(|(i, f)| i != forest_index && f.company_name() == new_name);
            if taken {
                return Err(DomainError::DuplicateCompany(new_name.to_string()));
            }
            forest.company_info.company_name = new_name.to_string();
        }
        _ => {
            if forest.contains(level, new_name) {
                return Err(DomainError::DuplicateName {
                    level,
                    name: new_name.to_string(),
                });
            }
            let units = units_mut(&mut forest, level, "rename")?;
            for unit in units
                .iter_mut()
                .filter(|u| u.entity_name == old_name && u.status.is_submitted())
            {
                unit.entity_name = new_name.to_string();
            }
        }
    }

    let relinked = match level.child() {
        Some(child) => units_mut(&mut forest, child, "rename")
            .map(|children| relink(children, old_name, new_name))?,
        None => 0,
    };
    debug!(
        "rename {} '{}' -> '{}': {} children relinked",
        level, old_name, new_name, relinked
    );

    Ok(replace(forests, forest_index, forest))
}

/// Delete a record together with its whole subtree.
///
/// Deleting the company removes the forest from the collection.
pub fn delete(
    forests: &[EntityData],
    forest_index: usize,
    level: Level,
    name: &str,
) -> DomainResult<Vec<EntityData>> {
    let forest = forest_at(forests, forest_index)?;
    settled(forest, level, name)?;

    if level == Level::Company {
        debug!("delete forest {} at index {}", name, forest_index);
        let mut next = forests.to_vec();
        next.remove(forest_index);
        return Ok(next);
    }

    let mut forest = forest.clone();
    let before = forest.unit_count();
    let mut removed: HashSet<String> = HashSet::from([name.to_string()]);
    units_mut(&mut forest, level, "delete")?
        .retain(|u| !(u.entity_name == name && u.status.is_submitted()));

    let mut current = level;
    while let Some(child) = current.child() {
        let children = units_mut(&mut forest, child, "delete")?;
        let next_removed: HashSet<String> = children
            .iter()
            .filter(|u| removed.contains(&u.parent))
            .map(|u| u.entity_name.clone())
            .collect();
        children.retain(|u| !removed.contains(&u.parent));
        removed = next_removed;
        current = child;
    }

    debug!(
        "delete {} '{}': {} records removed",
        level,
        name,
        before - forest.unit_count()
    );
    Ok(replace(forests, forest_index, forest))
}

/// Append an empty pending row at `level`. Returns the new collection and the row index.
pub fn add(
    forests: &[EntityData],
    forest_index: usize,
    level: Level,
) -> DomainResult<(Vec<EntityData>, usize)> {
    let level = unit_level(level, "add a row")?;
    let mut forest = forest_at(forests, forest_index)?.clone();
    if !lock::can_add(&forest, level) {
        return Err(DomainError::LevelLocked(level));
    }

    let units = units_mut(&mut forest, level, "add a row")?;
    units.push(BusinessUnitInfo::pending());
    let row = units.len() - 1;
    debug!("add pending {} row {} to {}", level, row, forest.company_name());

    Ok((replace(forests, forest_index, forest), row))
}

/// Create a new forest from a completed company form.
pub fn create_forest(forests: &[EntityData], company: CompanyInfo) -> DomainResult<Vec<EntityData>> {
    let issues = validate_company(&company);
    if !issues.is_empty() {
        return Err(DomainError::Validation(issues));
    }
    let name = company.company_name.trim().to_string();
    if forests.iter().any(|f| f.company_name() == name) {
        return Err(DomainError::DuplicateCompany(name));
    }

    debug!("create forest {}", name);
    let mut next = forests.to_vec();
    next.push(EntityData::new(CompanyInfo {
        company_name: name,
        status: SubmissionState::Submitted,
        ..company
    }));
    Ok(next)
}

/// Resolve and check the parent named on a detail form.
///
/// Divisions default to the company; lower levels must name a submitted
/// record on the level above.
fn resolve_parent(forest: &EntityData, level: Level, requested: &str) -> DomainResult<String> {
    let requested = requested.trim();
    let parent = match (level, requested.is_empty()) {
        (Level::Division, true) => forest.company_name().to_string(),
        _ => requested.to_string(),
    };
    let parent_level = level.parent().ok_or(DomainError::UnsupportedLevel {
        level,
        action: "choose a parent",
    })?;
    if parent.is_empty() || !lock::is_submitted(forest, parent_level, &parent) {
        return Err(DomainError::InvalidParent { level, parent });
    }
    Ok(parent)
}

/// Materialize pending row `row` at `level` from its detail form.
pub fn submit(
    forests: &[EntityData],
    forest_index: usize,
    level: Level,
    row: usize,
    details: BusinessUnitInfo,
) -> DomainResult<Vec<EntityData>> {
    let level = unit_level(level, "submit a row")?;
    let mut forest = forest_at(forests, forest_index)?.clone();
    let current = forest
        .units(level)
        .get(row)
        .ok_or(DomainError::RowNotFound { level, index: row })?;
    let status = current.status.submit()?;

    if !lock::can_add(&forest, level) {
        return Err(DomainError::LevelLocked(level));
    }
    let parent = resolve_parent(&forest, level, &details.parent)?;

    let record = BusinessUnitInfo {
        entity_name: details.entity_name.trim().to_string(),
        parent,
        status,
        ..details
    };
    let issues = validate_unit(level, &record);
    if !issues.is_empty() {
        return Err(DomainError::Validation(issues));
    }
    let clash = forest
        .units(level)
        .iter()
        .enumerate()
        .any(|(i, u)| i != row && u.entity_name == record.entity_name);
    if clash {
        return Err(DomainError::DuplicateName {
            level,
            name: record.entity_name,
        });
    }

    debug!(
        "submit {} '{}' under '{}'",
        level, record.entity_name, record.parent
    );
    units_mut(&mut forest, level, "submit a row")?[row] = record;
    Ok(replace(forests, forest_index, forest))
}

/// Remove a still-pending row. Submitted records are removed with `delete`.
pub fn discard(
    forests: &[EntityData],
    forest_index: usize,
    level: Level,
    row: usize,
) -> DomainResult<Vec<EntityData>> {
    let level = unit_level(level, "discard a row")?;
    let mut forest = forest_at(forests, forest_index)?.clone();
    let units = units_mut(&mut forest, level, "discard a row")?;
    let state = units
        .get(row)
        .map(|u| u.status)
        .ok_or(DomainError::RowNotFound { level, index: row })?;
    if state != SubmissionState::Pending {
        return Err(DomainError::InvalidState {
            state,
            action: "discard",
        });
    }
    units.remove(row);
    debug!("discard pending {} row {}", level, row);
    Ok(replace(forests, forest_index, forest))
}

fn transition(
    forests: &[EntityData],
    forest_index: usize,
    level: Level,
    name: &str,
    step: fn(SubmissionState) -> DomainResult<SubmissionState>,
) -> DomainResult<Vec<EntityData>> {
    let mut forest = forest_at(forests, forest_index)?.clone();
    let not_found = || DomainError::RecordNotFound {
        level,
        name: name.to_string(),
    };
    match level {
        Level::Company => {
            if forest.company_name() != name {
                return Err(not_found());
            }
            forest.company_info.status = step(forest.company_info.status)?;
        }
        _ => {
            let unit = units_mut(&mut forest, level, "edit")?
                .iter_mut()
                .find(|u| u.entity_name == name)
                .ok_or_else(not_found)?;
            unit.status = step(unit.status)?;
        }
    }
    Ok(replace(forests, forest_index, forest))
}

/// Reopen the detail form of a submitted record.
pub fn begin_edit(
    forests: &[EntityData],
    forest_index: usize,
    level: Level,
    name: &str,
) -> DomainResult<Vec<EntityData>> {
    debug!("begin edit {} '{}'", level, name);
    transition(forests, forest_index, level, name, SubmissionState::begin_edit)
}

/// Close a detail form without saving.
pub fn cancel_edit(
    forests: &[EntityData],
    forest_index: usize,
    level: Level,
    name: &str,
) -> DomainResult<Vec<EntityData>> {
    debug!("cancel edit {} '{}'", level, name);
    transition(forests, forest_index, level, name, SubmissionState::finish_edit)
}

/// Save the reopened detail form of a business unit.
///
/// The name stays read-only here: a blank name in `details` keeps the current
/// one, a different name is rejected. A new parent must be a submitted record
/// on the level above.
pub fn update_details(
    forests: &[EntityData],
    forest_index: usize,
    level: Level,
    name: &str,
    details: BusinessUnitInfo,
) -> DomainResult<Vec<EntityData>> {
    let level = unit_level(level, "edit details")?;
    let mut forest = forest_at(forests, forest_index)?.clone();
    let position = forest
        .units(level)
        .iter()
        .position(|u| u.entity_name == name)
        .ok_or_else(|| DomainError::RecordNotFound {
            level,
            name: name.to_string(),
        })?;
    let current = &forest.units(level)[position];
    if !details.entity_name.trim().is_empty() && details.entity_name.trim() != name {
        return Err(DomainError::NameReadOnly {
            level,
            name: name.to_string(),
        });
    }
    let status = current.status.finish_edit()?;
    let parent = if details.parent.trim().is_empty() || details.parent == current.parent {
        current.parent.clone()
    } else {
        resolve_parent(&forest, level, &details.parent)?
    };

    let record = BusinessUnitInfo {
        entity_name: name.to_string(),
        parent,
        status,
        ..details
    };
    let issues = validate_unit(level, &record);
    if !issues.is_empty() {
        return Err(DomainError::Validation(issues));
    }

    debug!("update details of {} '{}'", level, name);
    units_mut(&mut forest, level, "edit details")?[position] = record;
    Ok(replace(forests, forest_index, forest))
}

/// Save the reopened company form. The company name is changed with `rename`.
pub fn update_company(
    forests: &[EntityData],
    forest_index: usize,
    details: CompanyInfo,
) -> DomainResult<Vec<EntityData>> {
    let mut forest = forest_at(forests, forest_index)?.clone();
    let name = forest.company_name().to_string();
    if !details.company_name.trim().is_empty() && details.company_name.trim() != name {
        return Err(DomainError::NameReadOnly {
            level: Level::Company,
            name,
        });
    }
    let status = forest.company_info.status.finish_edit()?;
    let company = CompanyInfo {
        company_name: name,
        status,
        ..details
    };
    let issues = validate_company(&company);
    if !issues.is_empty() {
        return Err(DomainError::Validation(issues));
    }

    debug!("update company details of {}", company.company_name);
    forest.company_info = company;
    Ok(replace(forests, forest_index, forest))
}
