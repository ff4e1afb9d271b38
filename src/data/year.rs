//! Property accessors for N05 feature attributes.
//! Year fields fail open: anything that is not a usable year is "no bound".

use serde_json::{Map, Number, Value};

/// Start-of-service year (`N05_005b`).
pub const START_YEAR_KEY: &str = "N05_005b";
/// End-of-service year (`N05_005e`). `9999` means still in service.
pub const END_YEAR_KEY: &str = "N05_005e";
/// Line name shared by rail segments and stations.
pub const LINE_NAME_KEY: &str = "N05_002";

/// Placeholder for an unknown year.
const UNKNOWN_YEAR: i64 = 999;
/// Years at or above this are "open ended" placeholders.
const OPEN_ENDED_FLOOR: i64 = 9000;

/// Normalize a raw attribute value into a concrete year, or `None` for "no bound".
pub fn parse_year_value(value: &Value) -> Option<i32> {
    let year = match value {
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() || trimmed == "999" || trimmed == "9999" {
                return None;
            }
            trimmed.parse::<i64>().ok()?
        }
        Value::Number(number) => truncate_number(number)?,
        _ => return None,
    };

    if year == UNKNOWN_YEAR || year >= OPEN_ENDED_FLOOR {
        return None;
    }
    i32::try_from(year).ok()
}

fn truncate_number(number: &Number) -> Option<i64> {
    if let Some(int) = number.as_i64() {
        return Some(int);
    }
    if number.is_u64() {
        // Larger than i64::MAX, certainly past the open-ended floor.
        return None;
    }
    number
        .as_f64()
        .filter(|float| float.is_finite())
        .map(|float| float.trunc() as i64)
}

/// Read a year bound from a feature's property set.
pub fn year_field(properties: Option<&Map<String, Value>>, key: &str) -> Option<i32> {
    properties?.get(key).and_then(parse_year_value)
}

/// Read a trimmed string property. Absent or non-string values read as `""`.
pub fn property_string<'a>(properties: Option<&'a Map<String, Value>>, key: &str) -> &'a str {
    properties
        .and_then(|props| props.get(key))
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn props(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn plain_years_parse_from_text_and_numbers() {
        assert_eq!(parse_year_value(&json!("1872")), Some(1872));
        assert_eq!(parse_year_value(&json!("  1964 ")), Some(1964));
        assert_eq!(parse_year_value(&json!(1987)), Some(1987));
        assert_eq!(parse_year_value(&json!(1987.9)), Some(1987));
    }

    #[test]
    fn sentinels_mean_no_bound() {
        for value in [
            json!("999"),
            json!("9999"),
            json!("9000"),
            json!("12345"),
            json!(999),
            json!(9999),
            json!(9000.5),
            json!(u64::MAX),
        ] {
            assert_eq!(parse_year_value(&value), None, "{value} should be unbounded");
        }
    }

    #[test]
    fn blank_and_malformed_values_fail_open() {
        for value in [
            json!(""),
            json!("   "),
            json!("unknown"),
            json!("19xx"),
            json!(null),
            json!(true),
            json!([1990]),
            json!({"year": 1990}),
        ] {
            assert_eq!(parse_year_value(&value), None, "{value} should be unbounded");
        }
    }

    #[test]
    fn year_field_handles_missing_properties() {
        assert_eq!(year_field(None, START_YEAR_KEY), None);

        let map = props(json!({ "N05_005b": "1900", "N05_005e": "9999" }));
        assert_eq!(year_field(Some(&map), START_YEAR_KEY), Some(1900));
        assert_eq!(year_field(Some(&map), END_YEAR_KEY), None);
        assert_eq!(year_field(Some(&map), "N05_999"), None);
    }

    #[test]
    fn property_string_trims_and_ignores_non_strings() {
        let map = props(json!({ "N05_002": "  Main Line ", "other": 12 }));
        assert_eq!(property_string(Some(&map), LINE_NAME_KEY), "Main Line");
        assert_eq!(property_string(Some(&map), "other"), "");
        assert_eq!(property_string(Some(&map), "missing"), "");
        assert_eq!(property_string(None, LINE_NAME_KEY), "");
    }
}
