//! CLI input parsers.
//!
//! These are used by clap's `value_parser` attribute so malformed flags are
//! rejected at parse time with a message naming the expected form.

use super::types::{EqualityArg, SortArg};
use serde_json::Value;
use tabula_query::Circle;

/// Parse a sort argument of the form `field:asc` or `field:desc`.
///
/// A bare `field` sorts ascending.
pub fn parse_sort(s: &str) -> Result<SortArg, String> {
    let s = s.trim();
    let (field, direction) = match s.rsplit_once(':') {
        Some((field, direction)) => (field, direction),
        None => (s, "asc"),
    };
    if field.is_empty() {
        return Err(format!("Invalid sort '{s}': field name cannot be empty"));
    }
    let descending = match direction.to_ascii_lowercase().as_str() {
        "asc" => false,
        "desc" => true,
        other => {
            return Err(format!(
                "Invalid sort direction '{other}'. Expected 'asc' or 'desc'"
            ));
        }
    };
    Ok(SortArg {
        field: field.to_string(),
        descending,
    })
}

/// Parse an equality filter of the form `field=value`.
///
/// Values that read as a JSON number, boolean or `null` are sent typed;
/// anything else is sent as a string.
pub fn parse_equality(s: &str) -> Result<EqualityArg, String> {
    let Some((field, raw)) = s.split_once('=') else {
        return Err(format!("Invalid filter '{s}'. Expected format: field=value"));
    };
    let field = field.trim();
    if field.is_empty() {
        return Err(format!("Invalid filter '{s}': field name cannot be empty"));
    }
    let value = match serde_json::from_str::<Value>(raw) {
        Ok(scalar @ (Value::Number(_) | Value::Bool(_) | Value::Null)) => scalar,
        _ => Value::String(raw.to_string()),
    };
    Ok(EqualityArg {
        field: field.to_string(),
        value,
    })
}

/// Parse a geo circle of the form `lat,lon,meters`.
pub fn parse_circle(s: &str) -> Result<Circle, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let [lat, lon, meters] = parts.as_slice() else {
        return Err(format!(
            "Invalid circle '{s}'. Expected format: lat,lon,meters"
        ));
    };
    let latitude: f64 = lat
        .parse()
        .map_err(|_| format!("Invalid latitude '{lat}'"))?;
    let longitude: f64 = lon
        .parse()
        .map_err(|_| format!("Invalid longitude '{lon}'"))?;
    let meters: u32 = meters
        .parse()
        .map_err(|_| format!("Invalid radius '{meters}': expected whole meters"))?;
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(format!("Latitude {latitude} is out of range [-90, 90]"));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(format!("Longitude {longitude} is out of range [-180, 180]"));
    }
    Ok(Circle::new(latitude, longitude, meters))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case::ascending("name:asc", "name", false)]
    #[case::descending("$distance:desc", "$distance", true)]
    #[case::bare("name", "name", false)]
    #[case::upper_case("rating:DESC", "rating", true)]
    fn sort_specs_parse(#[case] input: &str, #[case] field: &str, #[case] descending: bool) {
        let sort = parse_sort(input).unwrap();
        assert_eq!(sort.field, field);
        assert_eq!(sort.descending, descending);
    }

    #[rstest]
    #[case::bad_direction("name:sideways")]
    #[case::empty_field(":asc")]
    fn bad_sort_specs_are_rejected(#[case] input: &str) {
        assert!(parse_sort(input).is_err());
    }

    #[rstest]
    #[case::string("region=CA", json!("CA"))]
    #[case::number("rating=4.5", json!(4.5))]
    #[case::boolean("open=true", json!(true))]
    #[case::keeps_later_equals("name=a=b", json!("a=b"))]
    #[case::array_stays_string("tags=[1]", json!("[1]"))]
    fn equality_values_are_typed(#[case] input: &str, #[case] value: Value) {
        assert_eq!(parse_equality(input).unwrap().value, value);
    }

    #[test]
    fn equality_requires_separator() {
        assert!(parse_equality("region").is_err());
        assert!(parse_equality("=CA").is_err());
    }

    #[test]
    fn circle_parses_three_parts() {
        let circle = parse_circle("34.06018, -118.41835, 5000").unwrap();
        assert_eq!(circle, Circle::new(34.06018, -118.41835, 5000));
    }

    #[rstest]
    #[case::too_few("34.0,-118.4")]
    #[case::not_a_number("north,-118.4,10")]
    #[case::fractional_meters("34.0,-118.4,10.5")]
    #[case::latitude_range("91,0,10")]
    #[case::longitude_range("0,181,10")]
    fn bad_circles_are_rejected(#[case] input: &str) {
        assert!(parse_circle(input).is_err());
    }
}
