//! Migration of persisted payloads into the current `EntityData` shape.
//!
//! Two shapes are recognised: the current one (`companyInfo` plus the three
//! level arrays) and the legacy flat company record, which is wrapped into a
//! forest with empty levels.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::domain::{BusinessUnits, CompanyInfo, EntityData};

fn is_current(obj: &Map<String, Value>) -> bool {
    obj.get("companyInfo").is_some_and(Value::is_object)
        && ["level2", "level3", "level4"]
            .iter()
            .all(|key| obj.get(*key).is_some_and(Value::is_array))
}

fn text(obj: &Map<String, Value>, key: &str) -> String {
    obj.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn legacy_company(obj: &Map<String, Value>) -> CompanyInfo {
    let business_units = obj
        .get("businessUnits")
        .cloned()
        .and_then(|v| serde_json::from_value::<BusinessUnits>(v).ok())
        .unwrap_or_default();

    CompanyInfo {
        company_name: text(obj, "companyName"),
        address: text(obj, "address"),
        contact_number: text(obj, "contactNumber"),
        contact_email: text(obj, "contactEmail"),
        registration_number: text(obj, "registrationNumber"),
        pan_or_gst: text(obj, "panOrGst"),
        lei: text(obj, "lei"),
        tin: text(obj, "tin"),
        default_currency: text(obj, "defaultCurrency"),
        business_units,
        reporting_currency: text(obj, "reportingCurrency"),
        ..CompanyInfo::default()
    }
}

/// Convert one persisted forest value into `EntityData`.
///
/// Returns `None` for `null`, non-objects and unrecognised shapes.
pub fn migrate(raw: &Value) -> Option<EntityData> {
    let obj = raw.as_object()?;

    if is_current(obj) {
        return match serde_json::from_value::<EntityData>(raw.clone()) {
            Ok(data) => Some(data),
            Err(e) => {
                warn!("skipping unreadable forest: {}", e);
                None
            }
        };
    }

    if obj.get("companyName").is_some_and(Value::is_string) {
        let company = legacy_company(obj);
        debug!("migrated legacy company record '{}'", company.company_name);
        return Some(EntityData::new(company));
    }

    debug!("unrecognised forest shape, skipping");
    None
}

/// Convert a persisted collection: a list of forests or a single forest.
///
/// Entries that cannot be migrated are dropped; use [`split_collection`]
/// when they have to be written back.
pub fn migrate_collection(raw: &Value) -> Vec<EntityData> {
    split_collection(raw).0
}

/// Like [`migrate_collection`], but also hands back every non-null entry that
/// could not be migrated, so that a later save can keep it untouched.
pub fn split_collection(raw: &Value) -> (Vec<EntityData>, Vec<Value>) {
    let items = match raw {
        Value::Array(items) => items.as_slice(),
        other => std::slice::from_ref(other),
    };

    let mut forests = Vec::new();
    let mut unreadable = Vec::new();
    for (i, item) in items.iter().enumerate() {
        match migrate(item) {
            Some(forest) => forests.push(forest),
            None if item.is_null() => {}
            None => {
                warn!("keeping unreadable forest at position {} as is", i);
                unreadable.push(item.clone());
            }
        }
    }
    (forests, unreadable)
}
