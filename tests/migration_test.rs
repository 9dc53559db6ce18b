//! Tests for migrating persisted payloads into the current forest shape.

use rust_decimal_macros::dec;
use serde_json::json;

use entitree::application::{migrate, migrate_collection};
use entitree::domain::{BusinessUnits, CompanyInfo, EntityData, SubmissionState};

#[test]
fn given_legacy_company_only_when_migrating_then_wrapped_with_empty_levels() {
    // Act
    let data = migrate(&json!({"companyName": "Acme"})).unwrap();

    // Assert
    assert_eq!(data, EntityData::new(CompanyInfo::named("Acme")));
    assert_eq!(
        serde_json::to_value(&data).unwrap(),
        json!({
            "companyInfo": {
                "companyName": "Acme",
                "address": "",
                "contactNumber": "",
                "contactEmail": "",
                "registrationNumber": "",
                "panOrGst": "",
                "lei": "",
                "tin": "",
                "defaultCurrency": "",
                "businessUnits": "",
                "reportingCurrency": ""
            },
            "level2": [],
            "level3": [],
            "level4": []
        })
    );
}

#[test]
fn given_legacy_company_with_fields_when_migrating_then_fields_kept() {
    let raw = json!({
        "companyName": "Acme",
        "address": "1 Harbour Road",
        "businessUnits": "Treasury, FX Desk",
        "reportingCurrency": "USD"
    });

    let company = migrate(&raw).unwrap().company_info;

    assert_eq!(company.address, "1 Harbour Road");
    assert_eq!(company.reporting_currency, "USD");
    assert_eq!(company.business_units.names(), vec!["Treasury", "FX Desk"]);
    assert_eq!(company.lei, "");
}

#[test]
fn given_current_shape_with_partial_records_when_migrating_then_defaults_fill_in() {
    let raw = json!({
        "companyInfo": {"companyName": "Acme", "businessUnits": ["Treasury"]},
        "level2": [{"entityName": "APAC", "parent": "Acme", "fxLimit": "250,000"}],
        "level3": [{"entityName": "India", "parent": "APAC", "fxLimit": ""}],
        "level4": [{"entityName": "Pune Plant", "parent": "India", "fxLimit": 1200.5}]
    });

    let data = migrate(&raw).unwrap();

    assert_eq!(
        data.company_info.business_units,
        BusinessUnits::List(vec!["Treasury".into()])
    );
    assert_eq!(data.level2[0].fx_limit, dec!(250000));
    assert_eq!(data.level3[0].fx_limit, dec!(0));
    assert_eq!(data.level4[0].fx_limit, dec!(1200.5));
    assert_eq!(data.level2[0].treasury_contact, "");
    assert_eq!(data.level2[0].status, SubmissionState::Submitted);
}

#[test]
fn given_pending_status_when_round_tripping_then_preserved() {
    let raw = json!({
        "companyInfo": {"companyName": "Acme"},
        "level2": [{"entityName": "", "parent": "", "status": "pending"}],
        "level3": [],
        "level4": []
    });

    let data = migrate(&raw).unwrap();
    assert_eq!(data.level2[0].status, SubmissionState::Pending);

    let again = migrate(&serde_json::to_value(&data).unwrap()).unwrap();
    assert_eq!(again, data);
}

#[test]
fn given_unknown_shapes_when_migrating_then_none() {
    assert!(migrate(&json!(null)).is_none());
    assert!(migrate(&json!("Acme")).is_none());
    assert!(migrate(&json!({"name": "Acme"})).is_none());
    assert!(migrate(&json!({"companyName": 7})).is_none());
}

#[test]
fn given_current_shape_with_null_and_odd_fields_when_migrating_then_passes_through() {
    let raw = json!({
        "companyInfo": {"companyName": "Acme", "tin": null, "businessUnits": null},
        "level2": [{"entityName": "APAC", "parent": "Acme", "fxLimit": null}],
        "level3": [{"entityName": "India", "parent": null, "fxLimit": "lots", "status": null}],
        "level4": []
    });

    let data = migrate(&raw).unwrap();

    assert_eq!(data.company_info.tin, "");
    assert!(data.company_info.business_units.is_empty());
    assert_eq!(data.level2[0].fx_limit, dec!(0));
    assert_eq!(data.level3[0].parent, "");
    assert_eq!(data.level3[0].fx_limit, dec!(0));
    assert_eq!(data.level3[0].status, SubmissionState::Submitted);
}

#[test]
fn given_mixed_array_when_migrating_collection_then_unusable_entries_skipped() {
    let raw = json!([
        {"companyName": "Legacy Ltd"},
        null,
        {"companyInfo": {"companyName": "Acme"}, "level2": [], "level3": [], "level4": []},
        42
    ]);

    let forests = migrate_collection(&raw);

    let names: Vec<_> = forests.iter().map(|f| f.company_name()).collect();
    assert_eq!(names, vec!["Legacy Ltd", "Acme"]);
}

#[test]
fn given_single_forest_when_migrating_collection_then_one_entry() {
    assert_eq!(migrate_collection(&json!({"companyName": "Acme"})).len(), 1);
    assert!(migrate_collection(&json!(null)).is_empty());
}
