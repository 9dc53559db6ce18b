//! Referential and form validation for entity forests.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::entities::{BusinessUnitInfo, CompanyInfo, EntityData, Level};

pub const CURRENCIES: [&str; 6] = ["INR", "USD", "EUR", "GBP", "JPY", "CNY"];

pub const LEGAL_ENTITY_TYPES: [&str; 6] = [
    "Private Limited",
    "Public Limited",
    "LLP",
    "Partnership",
    "Sole Proprietorship",
    "Government Entity",
];

pub const FX_AUTHORITIES: [&str; 3] = ["Allowed", "Not Allowed", "Limited"];

static CONTACT_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{10}$").expect("valid contact number pattern"));
static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\S+@\S+\.\S+$").expect("valid email pattern"));
static PAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{5}[0-9]{4}[A-Z]$").expect("valid PAN pattern"));
static LEI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9]{20}$").expect("valid LEI pattern"));
static TIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{9}$").expect("valid TIN pattern"));

/// A problem found in a forest or a submitted form.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    #[error("company name is empty")]
    EmptyCompanyName,

    #[error("company '{0}' appears more than once")]
    DuplicateCompany(String),

    #[error("{level} '{name}' points at missing parent '{parent}'")]
    Orphan {
        level: Level,
        name: String,
        parent: String,
    },

    #[error("{level} name '{name}' is used by more than one record")]
    DuplicateName { level: Level, name: String },

    #[error("{level} '{name}': {field} {message}")]
    Field {
        level: Level,
        name: String,
        field: &'static str,
        message: String,
    },
}

impl ValidationIssue {
    /// Issues that break the tree shape, as opposed to form-field complaints.
    pub fn is_referential(&self) -> bool {
        !matches!(self, ValidationIssue::Field { .. })
    }
}

struct FieldCheck<'a> {
    level: Level,
    name: &'a str,
    issues: Vec<ValidationIssue>,
}

impl<'a> FieldCheck<'a> {
    fn new(level: Level, name: &'a str) -> Self {
        Self {
            level,
            name,
            issues: Vec::new(),
        }
    }

    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.issues.push(ValidationIssue::Field {
            level: self.level,
            name: self.name.to_string(),
            field,
            message: message.into(),
        });
    }

    fn min_len(&mut self, field: &'static str, value: &str, min: usize) {
        if value.trim().chars().count() < min {
            if min <= 1 {
                self.push(field, "is required");
            } else {
                self.push(field, format!("must be at least {min} characters"));
            }
        }
    }

    fn pattern(&mut self, field: &'static str, value: &str, re: &Regex, message: &str) {
        if !re.is_match(value.trim()) {
            self.push(field, message);
        }
    }

    fn one_of(&mut self, field: &'static str, value: &str, allowed: &[&str]) {
        if !allowed.contains(&value.trim()) {
            self.push(field, format!("must be one of: {}", allowed.join(", ")));
        }
    }
}

/// Check the level 1 company form.
pub fn validate_company(company: &CompanyInfo) -> Vec<ValidationIssue> {
    let mut check = FieldCheck::new(Level::Company, &company.company_name);
    check.min_len("companyName", &company.company_name, 2);
    check.min_len("address", &company.address, 10);
    check.pattern(
        "contactNumber",
        &company.contact_number,
        &CONTACT_NUMBER,
        "must be 10 digits",
    );
    check.pattern("contactEmail", &company.contact_email, &EMAIL, "is not a valid email");
    check.min_len("registrationNumber", &company.registration_number, 5);
    check.pattern("panOrGst", &company.pan_or_gst, &PAN, "is not a valid PAN");
    check.pattern(
        "lei",
        &company.lei,
        &LEI,
        "must be 20 alphanumeric characters",
    );
    check.pattern("tin", &company.tin, &TIN, "must be a 9-digit number");
    check.one_of("defaultCurrency", &company.default_currency, &CURRENCIES);
    if company.business_units.is_empty() {
        check.push("businessUnits", "must list at least one unit");
    }
    check.one_of("reportingCurrency", &company.reporting_currency, &CURRENCIES);
    check.issues
}

/// Check a level 2-4 detail form.
pub fn validate_unit(level: Level, unit: &BusinessUnitInfo) -> Vec<ValidationIssue> {
    let mut check = FieldCheck::new(level, &unit.entity_name);
    check.min_len("entityName", &unit.entity_name, 1);
    check.min_len("address", &unit.address, 10);
    check.pattern(
        "contactNumber",
        &unit.contact_number,
        &CONTACT_NUMBER,
        "must be 10 digits",
    );
    check.pattern("contactEmail", &unit.contact_email, &EMAIL, "is not a valid email");
    check.min_len("uniqueIdentifier", &unit.unique_identifier, 3);
    check.one_of("legalEntityType", &unit.legal_entity_type, &LEGAL_ENTITY_TYPES);
    check.one_of("reportingCurrency", &unit.reporting_currency, &CURRENCIES);
    check.one_of("fxAuthority", &unit.fx_authority, &FX_AUTHORITIES);
    if unit.fx_limit < Decimal::ZERO {
        check.push("fxLimit", "must be positive");
    }
    check.min_len("treasuryContact", &unit.treasury_contact, 3);
    check.issues
}

/// Referential issues of one forest: empty company name, duplicate names
/// within a level, and records whose parent is missing at the level above.
///
/// Pending rows are ignored: they have no name or parent yet.
pub fn validate_forest(forest: &EntityData) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    if forest.company_name().trim().is_empty() {
        issues.push(ValidationIssue::EmptyCompanyName);
    }

    let mut reachable: HashSet<&str> = HashSet::from([forest.company_name()]);
    for level in Level::UNITS {
        let mut seen = HashSet::new();
        let mut reported = HashSet::new();
        let mut next = HashSet::new();
        for unit in forest.units(level).iter().filter(|u| u.status.is_submitted()) {
            let name = unit.entity_name.as_str();
            if !seen.insert(name) && reported.insert(name) {
                issues.push(ValidationIssue::DuplicateName {
                    level,
                    name: name.to_string(),
                });
            }
            if reachable.contains(unit.parent.as_str()) {
                next.insert(name);
            } else {
                issues.push(ValidationIssue::Orphan {
                    level,
                    name: name.to_string(),
                    parent: unit.parent.clone(),
                });
            }
        }
        reachable = next;
    }
    issues
}

/// Issues spanning the whole collection: company names must be unique.
pub fn validate_collection(forests: &[EntityData]) -> Vec<ValidationIssue> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    forests
        .iter()
        .map(EntityData::company_name)
        .filter(|name| !seen.insert(*name) && reported.insert(*name))
        .map(|name| ValidationIssue::DuplicateCompany(name.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::domain::entities::BusinessUnits;

    fn valid_company() -> CompanyInfo {
        CompanyInfo {
            company_name: "Acme".into(),
            address: "1 Harbour Road, Mumbai".into(),
            contact_number: "9876543210".into(),
            contact_email: "treasury@acme.example".into(),
            registration_number: "REG-00042".into(),
            pan_or_gst: "ABCDE1234F".into(),
            lei: "5493001KJTIIGC8Y1R12".into(),
            tin: "123456789".into(),
            default_currency: "INR".into(),
            business_units: BusinessUnits::parse_input("Treasury"),
            reporting_currency: "USD".into(),
            ..CompanyInfo::default()
        }
    }

    fn valid_unit() -> BusinessUnitInfo {
        BusinessUnitInfo {
            address: "Level 5, Marina Bay".into(),
            contact_number: "6512345678".into(),
            contact_email: "apac@acme.example".into(),
            unique_identifier: "APAC01".into(),
            legal_entity_type: "Private Limited".into(),
            reporting_currency: "USD".into(),
            fx_authority: "Allowed".into(),
            fx_limit: dec!(250000),
            treasury_contact: "R. Iyer".into(),
            ..BusinessUnitInfo::named("APAC", "Acme")
        }
    }

    #[test]
    fn given_complete_company_form_when_validating_then_no_issues() {
        assert_eq!(validate_company(&valid_company()), vec![]);
    }

    #[test]
    fn given_bad_company_fields_when_validating_then_reports_each_field() {
        let company = CompanyInfo {
            contact_number: "12345".into(),
            pan_or_gst: "abcde1234f".into(),
            lei: "SHORT".into(),
            business_units: BusinessUnits::default(),
            ..valid_company()
        };
        let fields: Vec<_> = validate_company(&company)
            .into_iter()
            .filter_map(|i| match i {
                ValidationIssue::Field { field, .. } => Some(field),
                _ => None,
            })
            .collect();
        assert_eq!(fields, vec!["contactNumber", "panOrGst", "lei", "businessUnits"]);
    }

    #[test]
    fn given_negative_limit_and_unknown_authority_when_validating_unit_then_reports() {
        let unit = BusinessUnitInfo {
            fx_limit: dec!(-1),
            fx_authority: "Sometimes".into(),
            ..valid_unit()
        };
        let issues = validate_unit(Level::Division, &unit);
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(|i| !i.is_referential()));
    }

    #[test]
    fn given_orphan_and_duplicate_when_validating_forest_then_both_reported() {
        let mut forest = EntityData::new(CompanyInfo::named("Acme"));
        forest.level2.push(BusinessUnitInfo::named("APAC", "Acme"));
        forest.level2.push(BusinessUnitInfo::named("APAC", "Acme"));
        forest.level3.push(BusinessUnitInfo::named("India", "EMEA"));
        forest.level3.push(BusinessUnitInfo::pending());

        let issues = validate_forest(&forest);
        assert_eq!(
            issues,
            vec![
                ValidationIssue::DuplicateName {
                    level: Level::Division,
                    name: "APAC".into()
                },
                ValidationIssue::Orphan {
                    level: Level::BusinessUnit,
                    name: "India".into(),
                    parent: "EMEA".into()
                },
            ]
        );
    }

    #[test]
    fn given_cross_level_name_when_validating_then_parent_must_be_one_level_up() {
        let mut forest = EntityData::new(CompanyInfo::named("Acme"));
        forest.level2.push(BusinessUnitInfo::named("APAC", "Acme"));
        // names the company, which is two levels up
        forest.level3.push(BusinessUnitInfo::named("India", "Acme"));

        let issues = validate_forest(&forest);
        assert!(matches!(
            issues.as_slice(),
            [ValidationIssue::Orphan { level: Level::BusinessUnit, .. }]
        ));
    }

    #[test]
    fn given_repeated_company_when_validating_collection_then_reported_once() {
        let forests = vec![
            EntityData::new(CompanyInfo::named("Acme")),
            EntityData::new(CompanyInfo::named("Acme")),
            EntityData::new(CompanyInfo::named("Acme")),
        ];
        assert_eq!(
            validate_collection(&forests),
            vec![ValidationIssue::DuplicateCompany("Acme".into())]
        );
    }
}
