//! Flattening of raw company payloads into fixed tabular rows
//!
//! The OpenAPI response nests address, classification, balance sheet and
//! contact data. A single declarative field table (target column, base
//! object, access path, optional transform) maps each payload to the flat
//! column set used for tabular export. Extraction never fails: a missing
//! intermediate at any level degrades to null, favoring a complete row over
//! a failed record.

use chrono::DateTime;
use serde_json::Value;

/// Base object a field path is resolved against, computed once per record
#[derive(Clone, Copy, Debug)]
enum Base {
    /// The record itself
    Record,
    /// The `address.registeredOffice` block
    Office,
    /// The `atecoClassification` block
    Classification,
    /// `balanceSheets.last` when it is a non-empty object, else the legacy
    /// `ecofin` block
    Ecofin,
    /// The `employees` block
    Employees,
}

#[derive(Clone, Copy, Debug)]
enum Transform {
    /// Numeric epoch seconds become an ISO-8601 UTC string; non-numeric
    /// values and out-of-range epochs pass through unchanged
    EpochToIso,
    /// Element of the `gps.coordinates` pair (longitude first, latitude
    /// second)
    Coordinate(usize),
}

struct FieldSpec {
    name: &'static str,
    base: Base,
    path: &'static [&'static str],
    fallback: Option<(Base, &'static [&'static str])>,
    transform: Option<Transform>,
}

const fn field(name: &'static str, base: Base, path: &'static [&'static str]) -> FieldSpec {
    FieldSpec {
        name,
        base,
        path,
        fallback: None,
        transform: None,
    }
}

const fn timestamp(name: &'static str, path: &'static [&'static str]) -> FieldSpec {
    FieldSpec {
        name,
        base: Base::Record,
        path,
        fallback: None,
        transform: Some(Transform::EpochToIso),
    }
}

const fn coordinate(name: &'static str, index: usize) -> FieldSpec {
    FieldSpec {
        name,
        base: Base::Office,
        path: &["gps", "coordinates"],
        fallback: None,
        transform: Some(Transform::Coordinate(index)),
    }
}

/// Field table; its order is the column order of the output workbook.
const FIELDS: &[FieldSpec] = &[
    field("id", Base::Record, &["id"]),
    field("company_name", Base::Record, &["companyName"]),
    field("vat_code", Base::Record, &["vatCode"]),
    field("tax_code", Base::Record, &["taxCode"]),
    field("activity_status", Base::Record, &["activityStatus"]),
    field("cciaa", Base::Record, &["cciaa"]),
    field("rea_code", Base::Record, &["reaCode"]),
    field("start_date", Base::Record, &["startDate"]),
    field("registration_date", Base::Record, &["registrationDate"]),
    field("address", Base::Office, &["streetName"]),
    field("street_number", Base::Office, &["streetNumber"]),
    field("toponym", Base::Office, &["toponym"]),
    field("town", Base::Office, &["town"]),
    field("province", Base::Office, &["province"]),
    field("zip_code", Base::Office, &["zipCode"]),
    field("town_code", Base::Office, &["townCode"]),
    field("region", Base::Office, &["region", "description"]),
    coordinate("latitude", 1),
    coordinate("longitude", 0),
    field("ateco_code", Base::Classification, &["ateco", "code"]),
    field("ateco_description", Base::Classification, &["ateco", "description"]),
    field("ateco_secondary", Base::Classification, &["secondaryAteco"]),
    field("ateco2022_code", Base::Classification, &["ateco2022", "code"]),
    field(
        "ateco2022_description",
        Base::Classification,
        &["ateco2022", "description"],
    ),
    field("pec", Base::Record, &["pec"]),
    field("sdi_code", Base::Record, &["sdiCode"]),
    timestamp("sdi_code_updated_at", &["sdiCodeTimestamp"]),
    timestamp("last_update_timestamp", &["lastUpdateTimestamp"]),
    timestamp("creation_timestamp", &["creationTimestamp"]),
    field("turnover", Base::Ecofin, &["turnover"]),
    field("turnover_year", Base::Ecofin, &["turnoverYear"]),
    field("turnover_range", Base::Ecofin, &["turnoverRange", "description"]),
    field("share_capital", Base::Ecofin, &["shareCapital"]),
    field("net_worth", Base::Ecofin, &["netWorth"]),
    field("enterprise_size", Base::Ecofin, &["enterpriseSize", "description"]),
    FieldSpec {
        name: "employees",
        base: Base::Employees,
        path: &["employee"],
        fallback: Some((Base::Ecofin, &["employees"])),
        transform: None,
    },
    field("employee_range", Base::Employees, &["employeeRange", "description"]),
    field("employee_trend", Base::Employees, &["employeeTrend"]),
    field("website", Base::Record, &["webAndSocial", "website"]),
    field("email", Base::Record, &["mail", "email"]),
    field("telephone", Base::Record, &["contacts", "telephoneNumber"]),
    field("fax", Base::Record, &["contacts", "fax"]),
];

/// Column names in output order
pub fn field_names() -> impl Iterator<Item = &'static str> {
    FIELDS.iter().map(|spec| spec.name)
}

/// One flattened company record
///
/// Values are parallel to [`field_names`]; null stands for an absent field.
/// The record is immutable after creation.
#[derive(Clone, Debug)]
pub struct FlatRecord {
    values: Vec<Value>,
}

impl FlatRecord {
    /// Values in column order
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Value of a named column
    pub fn get(&self, name: &str) -> Option<&Value> {
        FIELDS
            .iter()
            .position(|spec| spec.name == name)
            .map(|index| &self.values[index])
    }
}

/// Flatten a raw company payload into the fixed column set.
pub fn flatten_record(record: &Value) -> FlatRecord {
    let values = FIELDS.iter().map(|spec| spec.extract(record)).collect();
    FlatRecord { values }
}

impl FieldSpec {
    fn extract(&self, record: &Value) -> Value {
        let primary = lookup(base_object(record, self.base), self.path)
            .filter(|value| !value.is_null());
        let value = primary.or_else(|| {
            self.fallback
                .and_then(|(base, path)| lookup(base_object(record, base), path))
        });

        let Some(value) = value else {
            return Value::Null;
        };

        match self.transform {
            None => value.clone(),
            Some(Transform::EpochToIso) => epoch_to_iso(value),
            Some(Transform::Coordinate(index)) => coordinate_at(value, index),
        }
    }
}

fn base_object(record: &Value, base: Base) -> Option<&Value> {
    match base {
        Base::Record => Some(record),
        Base::Office => lookup(Some(record), &["address", "registeredOffice"]),
        Base::Classification => record.get("atecoClassification"),
        Base::Ecofin => lookup(Some(record), &["balanceSheets", "last"])
            .filter(|value| value.as_object().is_some_and(|map| !map.is_empty()))
            .or_else(|| record.get("ecofin")),
        Base::Employees => record.get("employees"),
    }
}

/// Chain of optional lookups; any missing or non-object intermediate yields
/// `None`.
fn lookup<'a>(value: Option<&'a Value>, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value?, |current, key| current.get(*key))
}

fn epoch_to_iso(value: &Value) -> Value {
    let Value::Number(number) = value else {
        return value.clone();
    };

    let parsed = if let Some(secs) = number.as_i64() {
        DateTime::from_timestamp(secs, 0)
    } else {
        number.as_f64().and_then(|secs| {
            let whole = secs.floor();
            if whole < i64::MIN as f64 || whole > i64::MAX as f64 {
                return None;
            }
            let nanos = ((secs - whole) * 1e9).round() as u32;
            DateTime::from_timestamp(whole as i64, nanos)
        })
    };

    match parsed {
        Some(datetime) => Value::String(datetime.to_rfc3339()),
        // Out-of-range epochs keep the raw value rather than failing the row.
        None => value.clone(),
    }
}

fn coordinate_at(value: &Value, index: usize) -> Value {
    match value {
        Value::Array(items) if items.len() > index => items[index].clone(),
        _ => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_record() -> Value {
        json!({
            "id": "123",
            "companyName": "Example SRL",
            "vatCode": "01234567890",
            "taxCode": "01234567890",
            "activityStatus": "ATTIVA",
            "cciaa": "VR",
            "reaCode": "123456",
            "address": {
                "registeredOffice": {
                    "streetName": "Via Roma 1",
                    "town": "Verona",
                    "province": "VR",
                    "zipCode": "37100",
                    "gps": {"coordinates": [10.0, 45.0]},
                    "region": {"description": "Veneto"},
                }
            },
            "atecoClassification": {
                "ateco": {"code": "1071", "description": "Produzione di pane"},
                "secondaryAteco": "107200",
                "ateco2022": {"code": "1071", "description": "Pane"},
            },
            "balanceSheets": {
                "last": {
                    "turnover": 1000000,
                    "turnoverYear": 2023,
                    "turnoverRange": {"description": "500k-1M"},
                    "shareCapital": 50000,
                    "netWorth": 120000,
                    "enterpriseSize": {"description": "Piccola"},
                }
            },
            "employees": {
                "employee": 12,
                "employeeRange": {"description": "11-20"},
                "employeeTrend": 5.0,
            },
            "pec": "example@pec.it",
            "sdiCode": "ABCDE12",
        })
    }

    #[test]
    fn field_table_matches_export_schema() {
        assert_eq!(field_names().count(), 42);
        assert_eq!(field_names().next(), Some("id"));
        assert_eq!(field_names().last(), Some("fax"));
    }

    #[test]
    fn extracts_nested_fields() {
        let flat = flatten_record(&sample_record());

        assert_eq!(flat.get("company_name"), Some(&json!("Example SRL")));
        assert_eq!(flat.get("province"), Some(&json!("VR")));
        assert_eq!(flat.get("region"), Some(&json!("Veneto")));
        assert_eq!(flat.get("ateco_code"), Some(&json!("1071")));
        assert_eq!(flat.get("turnover"), Some(&json!(1000000)));
        assert_eq!(flat.get("enterprise_size"), Some(&json!("Piccola")));
        assert_eq!(flat.get("employees"), Some(&json!(12)));
    }

    #[test]
    fn swaps_gps_coordinates_into_latitude_and_longitude() {
        let flat = flatten_record(&sample_record());

        assert_eq!(flat.get("latitude"), Some(&json!(45.0)));
        assert_eq!(flat.get("longitude"), Some(&json!(10.0)));
    }

    #[test]
    fn missing_address_degrades_to_null_without_failing() {
        let flat = flatten_record(&json!({"id": "1"}));

        assert_eq!(flat.get("id"), Some(&json!("1")));
        assert_eq!(flat.get("address"), Some(&Value::Null));
        assert_eq!(flat.get("latitude"), Some(&Value::Null));
        assert_eq!(flat.get("region"), Some(&Value::Null));
        assert_eq!(flat.values().len(), field_names().count());
    }

    #[test]
    fn converts_numeric_epoch_to_iso_utc() {
        let flat = flatten_record(&json!({"lastUpdateTimestamp": 1684108800}));

        assert_eq!(
            flat.get("last_update_timestamp"),
            Some(&json!("2023-05-15T00:00:00+00:00"))
        );
    }

    #[test]
    fn passes_non_numeric_timestamp_through() {
        let flat = flatten_record(&json!({"creationTimestamp": "2023-05-15"}));

        assert_eq!(flat.get("creation_timestamp"), Some(&json!("2023-05-15")));
    }

    #[test]
    fn out_of_range_epoch_falls_back_to_raw_value() {
        let flat = flatten_record(&json!({"creationTimestamp": 999_999_999_999_999_999_i64}));

        assert_eq!(
            flat.get("creation_timestamp"),
            Some(&json!(999_999_999_999_999_999_i64))
        );
    }

    #[test]
    fn employees_falls_back_to_ecofin_block() {
        let flat = flatten_record(&json!({"ecofin": {"employees": 7}}));

        assert_eq!(flat.get("employees"), Some(&json!(7)));
    }

    #[test]
    fn empty_balance_sheet_defers_to_ecofin() {
        let flat = flatten_record(&json!({
            "balanceSheets": {"last": {}},
            "ecofin": {"turnover": 5000},
        }));

        assert_eq!(flat.get("turnover"), Some(&json!(5000)));
    }

    #[test]
    fn malformed_coordinates_degrade_to_null() {
        let flat = flatten_record(&json!({
            "address": {"registeredOffice": {"gps": {"coordinates": [10.0]}}}
        }));

        assert_eq!(flat.get("longitude"), Some(&json!(10.0)));
        assert_eq!(flat.get("latitude"), Some(&Value::Null));
    }
}
