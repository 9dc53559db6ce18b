//! Submission lock state machine
//!
//! Each record carries its own `SubmissionState`. A level accepts new rows
//! only once at least one record on the level above has been submitted.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::entities::{EntityData, Level};
use crate::domain::error::{DomainError, DomainResult};

/// Lock state of a single record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionState {
    /// Row added, detail form not yet submitted: all fields editable, no children
    Pending,
    /// Detail form submitted: name read-only, children may be added
    #[default]
    Submitted,
    /// Submitted record whose detail form is reopened for editing
    Editing,
}

impl SubmissionState {
    /// Whether the record unlocks the level below it.
    pub fn is_submitted(self) -> bool {
        matches!(self, SubmissionState::Submitted | SubmissionState::Editing)
    }

    /// Alias used by serde to skip writing settled states.
    pub fn is_locked(&self) -> bool {
        self.is_submitted()
    }

    pub fn name_editable(self) -> bool {
        self == SubmissionState::Pending
    }

    pub fn details_editable(self) -> bool {
        matches!(self, SubmissionState::Pending | SubmissionState::Editing)
    }

    pub fn submit(self) -> DomainResult<Self> {
        match self {
            SubmissionState::Pending => Ok(SubmissionState::Submitted),
            state => Err(DomainError::InvalidState {
                state,
                action: "submit",
            }),
        }
    }

    pub fn begin_edit(self) -> DomainResult<Self> {
        match self {
            SubmissionState::Submitted => Ok(SubmissionState::Editing),
            state => Err(DomainError::InvalidState {
                state,
                action: "edit",
            }),
        }
    }

    /// Editing -> Submitted, used both for saving and cancelling a detail edit.
    pub fn finish_edit(self) -> DomainResult<Self> {
        match self {
            SubmissionState::Editing => Ok(SubmissionState::Submitted),
            state => Err(DomainError::InvalidState {
                state,
                action: "finish editing",
            }),
        }
    }
}

impl fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SubmissionState::Pending => "pending",
            SubmissionState::Submitted => "submitted",
            SubmissionState::Editing => "being edited",
        };
        f.write_str(label)
    }
}

/// Whether a new row may be added at `level` of `forest`.
///
/// Adding a company creates a new forest and is always allowed.
pub fn can_add(forest: &EntityData, level: Level) -> bool {
    match level.parent() {
        None => true,
        Some(Level::Company) => forest.company_info.status.is_submitted(),
        Some(parent) => forest.units(parent).iter().any(|u| u.status.is_submitted()),
    }
}

/// Whether `name` is a submitted record at `level`.
pub fn is_submitted(forest: &EntityData, level: Level, name: &str) -> bool {
    match level {
        Level::Company => {
            forest.company_name() == name && forest.company_info.status.is_submitted()
        }
        _ => forest
            .units(level)
            .iter()
            .any(|u| u.entity_name == name && u.status.is_submitted()),
    }
}

/// Names of submitted records at `level`, i.e. the parent choices for `level.child()`.
pub fn submitted_names(forest: &EntityData, level: Level) -> Vec<&str> {
    match level {
        Level::Company => {
            if forest.company_info.status.is_submitted() {
                vec![forest.company_name()]
            } else {
                Vec::new()
            }
        }
        _ => forest
            .units(level)
            .iter()
            .filter(|u| u.status.is_submitted())
            .map(|u| u.entity_name.as_str())
            .collect(),
    }
}

/// Per-level lock summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelStatus {
    pub level: Level,
    pub pending: usize,
    pub submitted: usize,
    pub addable: bool,
}

/// Lock summary of one forest, as shown next to the creation form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LockView {
    pub company: String,
    pub levels: Vec<LevelStatus>,
}

impl LockView {
    pub fn of(forest: &EntityData) -> Self {
        let levels = Level::ALL
            .iter()
            .map(|&level| {
                let (pending, submitted) = match level {
                    Level::Company => {
                        if forest.company_info.status.is_submitted() {
                            (0, 1)
                        } else {
                            (1, 0)
                        }
                    }
                    _ => {
                        let units = forest.units(level);
                        let submitted = units.iter().filter(|u| u.status.is_submitted()).count();
                        (units.len() - submitted, submitted)
                    }
                };
                LevelStatus {
                    level,
                    pending,
                    submitted,
                    addable: can_add(forest, level),
                }
            })
            .collect();

        Self {
            company: forest.company_name().to_string(),
            levels,
        }
    }

    pub fn level(&self, level: Level) -> Option<&LevelStatus> {
        self.levels.iter().find(|s| s.level == level)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::domain::entities::{BusinessUnitInfo, CompanyInfo};

    #[rstest]
    #[case(SubmissionState::Pending, Ok(SubmissionState::Submitted))]
    #[case(
        SubmissionState::Submitted,
        Err(DomainError::InvalidState { state: SubmissionState::Submitted, action: "submit" })
    )]
    #[case(
        SubmissionState::Editing,
        Err(DomainError::InvalidState { state: SubmissionState::Editing, action: "submit" })
    )]
    fn given_state_when_submitting_then_only_pending_moves(
        #[case] from: SubmissionState,
        #[case] expected: DomainResult<SubmissionState>,
    ) {
        assert_eq!(from.submit(), expected);
    }

    #[test]
    fn given_submitted_record_when_editing_then_stays_submitted_for_gating() {
        let editing = SubmissionState::Submitted.begin_edit().unwrap();
        assert_eq!(editing, SubmissionState::Editing);
        assert!(editing.is_submitted());
        assert!(editing.details_editable());
        assert!(!editing.name_editable());
        assert_eq!(editing.finish_edit(), Ok(SubmissionState::Submitted));
    }

    #[test]
    fn given_pending_record_when_editing_then_rejected() {
        assert!(SubmissionState::Pending.begin_edit().is_err());
        assert!(SubmissionState::Submitted.finish_edit().is_err());
    }

    #[test]
    fn given_forest_when_gating_then_follows_parent_level_submissions() {
        let mut forest = EntityData::new(CompanyInfo {
            status: SubmissionState::Pending,
            ..CompanyInfo::named("Acme")
        });
        assert!(!can_add(&forest, Level::Division));

        forest.company_info.status = SubmissionState::Submitted;
        assert!(can_add(&forest, Level::Division));
        assert!(!can_add(&forest, Level::BusinessUnit));

        forest.level2.push(BusinessUnitInfo::pending());
        assert!(!can_add(&forest, Level::BusinessUnit));

        forest.level2.push(BusinessUnitInfo::named("APAC", "Acme"));
        assert!(can_add(&forest, Level::BusinessUnit));
        assert!(!can_add(&forest, Level::Plant));
        assert!(can_add(&forest, Level::Company));
    }

    #[test]
    fn given_mixed_rows_when_building_lock_view_then_counts_per_level() {
        let mut forest = EntityData::new(CompanyInfo::named("Acme"));
        forest.level2.push(BusinessUnitInfo::named("APAC", "Acme"));
        forest.level2.push(BusinessUnitInfo::pending());

        let view = LockView::of(&forest);
        let divisions = view.level(Level::Division).unwrap();
        assert_eq!((divisions.pending, divisions.submitted), (1, 1));
        assert!(divisions.addable);
        assert!(view.level(Level::BusinessUnit).unwrap().addable);
        assert!(!view.level(Level::Plant).unwrap().addable);
        assert_eq!(submitted_names(&forest, Level::Division), vec!["APAC"]);
    }
}
