//! Domain entities: core data structures
//!
//! The persisted shape is the camelCase JSON produced by the treasury console:
//! one `EntityData` forest per company, with levels 2-4 stored as flat arrays
//! whose `parent` field names the owning record.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;
use crate::domain::lenient;
use crate::domain::lock::SubmissionState;

/// Depth of a record in a forest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Level {
    Company = 1,
    Division = 2,
    BusinessUnit = 3,
    Plant = 4,
}

impl Level {
    /// All levels, root first.
    pub const ALL: [Level; 4] = [
        Level::Company,
        Level::Division,
        Level::BusinessUnit,
        Level::Plant,
    ];

    /// Levels stored as flat `BusinessUnitInfo` arrays.
    pub const UNITS: [Level; 3] = [Level::Division, Level::BusinessUnit, Level::Plant];

    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn parent(self) -> Option<Level> {
        match self {
            Level::Company => None,
            Level::Division => Some(Level::Company),
            Level::BusinessUnit => Some(Level::Division),
            Level::Plant => Some(Level::BusinessUnit),
        }
    }

    pub fn child(self) -> Option<Level> {
        match self {
            Level::Company => Some(Level::Division),
            Level::Division => Some(Level::BusinessUnit),
            Level::BusinessUnit => Some(Level::Plant),
            Level::Plant => None,
        }
    }

    /// Panel title used by the console for this level's detail form.
    pub fn title(self) -> &'static str {
        match self {
            Level::Company => "Company Info",
            Level::Division => "Division Info",
            Level::BusinessUnit => "Business Unit Info",
            Level::Plant => "Plant Info",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Level::Company => "company",
            Level::Division => "division",
            Level::BusinessUnit => "business unit",
            Level::Plant => "plant",
        };
        f.write_str(label)
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> Self {
        level.number()
    }
}

impl TryFrom<u8> for Level {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Level::Company),
            2 => Ok(Level::Division),
            3 => Ok(Level::BusinessUnit),
            4 => Ok(Level::Plant),
            other => Err(DomainError::InvalidLevel(other)),
        }
    }
}

/// Business units listed on the company form.
///
/// Older payloads store a comma-separated string, the form submits a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BusinessUnits {
    List(Vec<String>),
    Text(String),
}

impl Default for BusinessUnits {
    fn default() -> Self {
        BusinessUnits::Text(String::new())
    }
}

impl BusinessUnits {
    /// Parse comma-separated form input: entries are trimmed, blanks dropped.
    pub fn parse_input(input: &str) -> Self {
        BusinessUnits::List(split_units(input))
    }

    pub fn names(&self) -> Vec<String> {
        match self {
            BusinessUnits::List(items) => items
                .iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            BusinessUnits::Text(text) => split_units(text),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.names().is_empty()
    }
}

impl fmt::Display for BusinessUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.names().join(", "))
    }
}

fn split_units(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Level 1 record: the company at the root of a forest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CompanyInfo {
    /// Unique key of the forest within the collection
    #[serde(deserialize_with = "lenient::text")]
    pub company_name: String,
    #[serde(deserialize_with = "lenient::text")]
    pub address: String,
    #[serde(deserialize_with = "lenient::text")]
    pub contact_number: String,
    #[serde(deserialize_with = "lenient::text")]
    pub contact_email: String,
    #[serde(deserialize_with = "lenient::text")]
    pub registration_number: String,
    #[serde(deserialize_with = "lenient::text")]
    pub pan_or_gst: String,
    #[serde(deserialize_with = "lenient::text")]
    pub lei: String,
    #[serde(deserialize_with = "lenient::text")]
    pub tin: String,
    #[serde(deserialize_with = "lenient::text")]
    pub default_currency: String,
    #[serde(deserialize_with = "lenient::or_default")]
    pub business_units: BusinessUnits,
    #[serde(deserialize_with = "lenient::text")]
    pub reporting_currency: String,
    /// Lock state; only `pending` is ever written back
    #[serde(
        skip_serializing_if = "SubmissionState::is_locked",
        deserialize_with = "lenient::or_default"
    )]
    pub status: SubmissionState,
}

impl CompanyInfo {
    pub fn named(company_name: impl Into<String>) -> Self {
        Self {
            company_name: company_name.into(),
            ..Self::default()
        }
    }
}

/// Level 2-4 record. The same shape is reused for divisions, business units and plants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct BusinessUnitInfo {
    /// Identity and display name, unique within its level array
    #[serde(deserialize_with = "lenient::text")]
    pub entity_name: String,
    /// Name of the owning record one level up
    #[serde(deserialize_with = "lenient::text")]
    pub parent: String,
    #[serde(deserialize_with = "lenient::text")]
    pub address: String,
    #[serde(deserialize_with = "lenient::text")]
    pub contact_number: String,
    #[serde(deserialize_with = "lenient::text")]
    pub contact_email: String,
    #[serde(deserialize_with = "lenient::text")]
    pub unique_identifier: String,
    #[serde(deserialize_with = "lenient::text")]
    pub legal_entity_type: String,
    #[serde(deserialize_with = "lenient::text")]
    pub reporting_currency: String,
    #[serde(deserialize_with = "lenient::text")]
    pub fx_authority: String,
    #[serde(with = "crate::domain::amount")]
    pub fx_limit: Decimal,
    #[serde(deserialize_with = "lenient::text")]
    pub treasury_contact: String,
    #[serde(
        skip_serializing_if = "SubmissionState::is_locked",
        deserialize_with = "lenient::or_default"
    )]
    pub status: SubmissionState,
}

impl BusinessUnitInfo {
    /// Empty row added at a level, awaiting its detail form.
    pub fn pending() -> Self {
        Self {
            status: SubmissionState::Pending,
            ..Self::default()
        }
    }

    pub fn named(entity_name: impl Into<String>, parent: impl Into<String>) -> Self {
        Self {
            entity_name: entity_name.into(),
            parent: parent.into(),
            ..Self::default()
        }
    }
}

/// One forest: a company and its full descendant hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityData {
    pub company_info: CompanyInfo,
    #[serde(default)]
    pub level2: Vec<BusinessUnitInfo>,
    #[serde(default)]
    pub level3: Vec<BusinessUnitInfo>,
    #[serde(default)]
    pub level4: Vec<BusinessUnitInfo>,
}

impl EntityData {
    pub fn new(company_info: CompanyInfo) -> Self {
        Self {
            company_info,
            level2: Vec::new(),
            level3: Vec::new(),
            level4: Vec::new(),
        }
    }

    pub fn company_name(&self) -> &str {
        &self.company_info.company_name
    }

    /// Records stored at `level`. The company level has no unit array.
    pub fn units(&self, level: Level) -> &[BusinessUnitInfo] {
        match level {
            Level::Company => &[],
            Level::Division => &self.level2,
            Level::BusinessUnit => &self.level3,
            Level::Plant => &self.level4,
        }
    }

    pub fn units_mut(&mut self, level: Level) -> Option<&mut Vec<BusinessUnitInfo>> {
        match level {
            Level::Company => None,
            Level::Division => Some(&mut self.level2),
            Level::BusinessUnit => Some(&mut self.level3),
            Level::Plant => Some(&mut self.level4),
        }
    }

    /// First record named `name` at `level`.
    pub fn find(&self, level: Level, name: &str) -> Option<&BusinessUnitInfo> {
        self.units(level).iter().find(|u| u.entity_name == name)
    }

    pub fn contains(&self, level: Level, name: &str) -> bool {
        match level {
            Level::Company => self.company_name() == name,
            _ => self.find(level, name).is_some(),
        }
    }

    /// Lock state of the record named `name` at `level`.
    pub fn state_of(&self, level: Level, name: &str) -> Option<SubmissionState> {
        match level {
            Level::Company => {
                (self.company_name() == name).then_some(self.company_info.status)
            }
            _ => self.find(level, name).map(|u| u.status),
        }
    }

    /// Number of records below the company.
    pub fn unit_count(&self) -> usize {
        self.level2.len() + self.level3.len() + self.level4.len()
    }
}

/// Navigable tree node derived from an `EntityData` forest.
///
/// `index` is the node's position in its source array and only serves to tell
/// same-named nodes apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityNode {
    pub name: String,
    pub children: Vec<EntityNode>,
    pub level: Level,
    pub index: usize,
    /// Set only on the placeholder returned when a forest cannot be built
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fault: Option<String>,
}

impl EntityNode {
    pub const ERROR_LABEL: &'static str = "Error";

    pub fn new(name: impl Into<String>, level: Level, index: usize) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
            level,
            index,
            fault: None,
        }
    }

    /// Single-node tree standing in for a forest that could not be built.
    pub fn error(fault: impl Into<String>) -> Self {
        Self {
            fault: Some(fault.into()),
            ..Self::new(Self::ERROR_LABEL, Level::Company, 0)
        }
    }

    pub fn is_error(&self) -> bool {
        self.fault.is_some()
    }

    pub fn child(&self, name: &str) -> Option<&EntityNode> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn child_names(&self) -> Vec<&str> {
        self.children.iter().map(|c| c.name.as_str()).collect()
    }

    /// Number of nodes in this subtree, including self.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(EntityNode::count).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_level_numbers_when_converting_then_round_trips_valid_range() {
        for level in Level::ALL {
            assert_eq!(Level::try_from(level.number()), Ok(level));
        }
        assert_eq!(Level::try_from(0), Err(DomainError::InvalidLevel(0)));
        assert_eq!(Level::try_from(5), Err(DomainError::InvalidLevel(5)));
    }

    #[test]
    fn given_levels_when_walking_parents_then_chain_ends_at_company() {
        assert_eq!(Level::Plant.parent(), Some(Level::BusinessUnit));
        assert_eq!(Level::Division.parent(), Some(Level::Company));
        assert_eq!(Level::Company.parent(), None);
        assert_eq!(Level::Plant.child(), None);
    }

    #[test]
    fn given_comma_input_when_parsing_business_units_then_trims_and_drops_blanks() {
        let units = BusinessUnits::parse_input(" Treasury, , FX Desk ,");
        assert_eq!(
            units,
            BusinessUnits::List(vec!["Treasury".into(), "FX Desk".into()])
        );
        assert_eq!(units.to_string(), "Treasury, FX Desk");
    }

    #[test]
    fn given_text_or_list_json_when_deserializing_business_units_then_accepts_both() {
        let text: BusinessUnits = serde_json::from_str(r#""A, B""#).unwrap();
        let list: BusinessUnits = serde_json::from_str(r#"["A","B"]"#).unwrap();
        assert_eq!(text.names(), list.names());
    }

    #[test]
    fn given_record_without_status_when_deserializing_then_is_submitted() {
        let unit: BusinessUnitInfo =
            serde_json::from_str(r#"{"entityName":"APAC","parent":"Acme","fxLimit":5}"#).unwrap();
        assert_eq!(unit.status, SubmissionState::Submitted);
        assert_eq!(unit.address, "");
    }

    #[test]
    fn given_submitted_record_when_serializing_then_status_is_omitted() {
        let unit = BusinessUnitInfo::named("APAC", "Acme");
        let json = serde_json::to_value(&unit).unwrap();
        assert!(json.get("status").is_none());
        assert_eq!(json["entityName"], "APAC");
        assert_eq!(json["fxLimit"], 0);

        let pending = serde_json::to_value(BusinessUnitInfo::pending()).unwrap();
        assert_eq!(pending["status"], "pending");
    }

    #[test]
    fn given_level_when_serializing_then_uses_number() {
        let node = EntityNode::new("Acme", Level::Company, 0);
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["level"], 1);
        assert!(json.get("fault").is_none());
    }
}
