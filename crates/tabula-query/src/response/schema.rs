use super::{Envelope, Response, parse_root, payload};
use crate::error::{Error, Result};
use serde::Deserialize;
use serde_json::Value;

/// Description of one column of a table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ColumnSchema {
    /// Column name as used in filters and `select`.
    pub name: String,
    /// Free-text description.
    #[serde(default)]
    pub description: Option<String>,
    /// Human readable label.
    #[serde(default)]
    pub label: Option<String>,
    /// Server-side datatype, e.g. `"String"` or `"Decimal"`.
    #[serde(default)]
    pub datatype: Option<String>,
    /// Whether facet counts can be requested for this column.
    #[serde(default)]
    pub faceted: bool,
    /// Whether results can be sorted by this column.
    #[serde(default)]
    pub sortable: bool,
    /// Whether the column takes part in full text search.
    #[serde(default)]
    pub searchable: bool,
}

#[derive(Default, Deserialize)]
struct View {
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    search_enabled: bool,
    #[serde(default)]
    geo_enabled: bool,
    fields: Vec<ColumnSchema>,
}

/// The schema of a table: its view metadata and column descriptions.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaResponse {
    json: String,
    envelope: Envelope,
    title: String,
    description: String,
    search_enabled: bool,
    geo_enabled: bool,
    columns: Vec<ColumnSchema>,
}

impl SchemaResponse {
    /// Parses a schema payload from `response.view`.
    ///
    /// # Errors
    ///
    /// Fails on invalid JSON, a missing envelope field, a missing `view`, or
    /// a view without `title` / `fields`. A non-ok payload without a `view`
    /// parses to an untitled schema with no columns.
    pub fn parse(json: impl Into<String>) -> Result<Self> {
        let json = json.into();
        let root = parse_root(&json)?;
        let envelope = Envelope::from_root(&root)?;
        let view = match payload(&root, &envelope)?.and_then(|response| response.get("view")) {
            Some(view @ Value::Object(_)) => serde_json::from_value(view.clone())?,
            Some(_) => return Err(Error::unexpected("response.view", "object")),
            None if !envelope.is_ok() => View::default(),
            None => return Err(Error::missing("response.view")),
        };

        Ok(Self {
            json,
            envelope,
            title: view.title,
            description: view.description,
            search_enabled: view.search_enabled,
            geo_enabled: view.geo_enabled,
            columns: view.fields,
        })
    }

    /// Table title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Table description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Whether the table supports full text search.
    #[must_use]
    pub fn is_search_enabled(&self) -> bool {
        self.search_enabled
    }

    /// Whether the table supports geo filters.
    #[must_use]
    pub fn is_geo_enabled(&self) -> bool {
        self.geo_enabled
    }

    /// Columns in server order.
    #[must_use]
    pub fn columns(&self) -> &[ColumnSchema] {
        &self.columns
    }

    /// Looks up a column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|column| column.name == name)
    }
}

impl Response for SchemaResponse {
    fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    fn json(&self) -> &str {
        &self.json
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = r#"{
        "version": "3",
        "status": "ok",
        "response": {
            "view": {
                "title": "Restaurants",
                "description": "US restaurants",
                "search_enabled": true,
                "geo_enabled": true,
                "fields": [
                    {"name": "name", "label": "Name", "datatype": "String",
                     "faceted": false, "sortable": true, "searchable": true},
                    {"name": "cuisine", "datatype": "String", "faceted": true}
                ]
            }
        }
    }"#;

    #[test]
    fn parses_view_and_columns() {
        let schema = SchemaResponse::parse(SCHEMA).unwrap();
        assert_eq!(schema.title(), "Restaurants");
        assert_eq!(schema.description(), "US restaurants");
        assert!(schema.is_search_enabled());
        assert!(schema.is_geo_enabled());
        assert_eq!(schema.columns().len(), 2);

        let name = schema.column("name").unwrap();
        assert!(name.sortable);
        assert_eq!(name.label.as_deref(), Some("Name"));

        let cuisine = schema.column("cuisine").unwrap();
        assert!(cuisine.faceted);
        assert!(!cuisine.searchable);
        assert!(cuisine.description.is_none());
    }

    #[test]
    fn missing_view_is_an_error() {
        let err = SchemaResponse::parse(r#"{"version":"3","status":"ok","response":{}}"#)
            .unwrap_err();
        assert!(matches!(err, Error::MissingField { ref path } if path == "response.view"));
    }

    #[test]
    fn rejected_schema_has_no_columns() {
        let schema =
            SchemaResponse::parse(r#"{"version":"3","status":"error","message":"no table"}"#)
                .unwrap();
        assert_eq!(schema.status(), "error");
        assert_eq!(schema.title(), "");
        assert!(schema.columns().is_empty());
    }

    #[test]
    fn view_without_fields_is_an_error() {
        let err = SchemaResponse::parse(
            r#"{"version":"3","status":"ok","response":{"view":{"title":"t"}}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }
}
