//! Arrow schema definitions for the wide review-rating tables.
//!
//! The attribute → column mapping is fixed up front and validated against
//! the configured attribute list; stores never grow columns at runtime.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("duplicate attribute column: {0}")]
    DuplicateAttribute(String),

    #[error("attribute name collides with a base column: {0}")]
    ReservedColumn(String),

    #[error("empty attribute name")]
    EmptyAttribute,
}

/// Wide tables: one row per comment, one cell per attribute.
pub mod wide {
    use arrow::datatypes::{DataType, Field, Schema};

    use super::SchemaError;

    /// Base columns present in every wide table, in order.
    pub const BASE_COLUMNS: [&str; 3] = ["id", "title", "body"];

    /// Schema for the raw wide table: nullable Utf8 cells holding the raw
    /// model reply. A null cell means "not yet scored".
    pub fn raw_schema(attributes: &[String]) -> Result<Schema, SchemaError> {
        build(attributes, DataType::Utf8)
    }

    /// Schema for the score-only export: nullable Int64 cells. A null cell
    /// means "not applicable" or "not yet scored".
    pub fn score_schema(attributes: &[String]) -> Result<Schema, SchemaError> {
        build(attributes, DataType::Int64)
    }

    fn build(attributes: &[String], cell_type: DataType) -> Result<Schema, SchemaError> {
        let mut fields: Vec<Field> = BASE_COLUMNS
            .iter()
            .map(|name| Field::new(*name, DataType::Utf8, false))
            .collect();
        for (i, name) in attributes.iter().enumerate() {
            if name.is_empty() {
                return Err(SchemaError::EmptyAttribute);
            }
            if BASE_COLUMNS.contains(&name.as_str()) {
                return Err(SchemaError::ReservedColumn(name.clone()));
            }
            if attributes[..i].contains(name) {
                return Err(SchemaError::DuplicateAttribute(name.clone()));
            }
            fields.push(Field::new(name, cell_type.clone(), true));
        }
        Ok(Schema::new(fields))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::datatypes::DataType;

    fn attrs(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn raw_schema_has_base_and_attribute_columns() {
        let schema = wide::raw_schema(&attrs(&["balance", "durability"])).unwrap();
        assert_eq!(schema.fields().len(), 5);
        assert!(schema.field_with_name("id").is_ok());
        assert!(schema.field_with_name("balance").is_ok());
        let field = schema.field_with_name("durability").unwrap();
        assert_eq!(field.data_type(), &DataType::Utf8);
        assert!(field.is_nullable());
    }

    #[test]
    fn score_schema_cells_are_int64() {
        let schema = wide::score_schema(&attrs(&["balance"])).unwrap();
        let field = schema.field_with_name("balance").unwrap();
        assert_eq!(field.data_type(), &DataType::Int64);
    }

    #[test]
    fn duplicate_attribute_rejected() {
        let err = wide::raw_schema(&attrs(&["balance", "balance"])).unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateAttribute(name) if name == "balance"));
    }

    #[test]
    fn reserved_column_rejected() {
        let err = wide::raw_schema(&attrs(&["title"])).unwrap_err();
        assert!(matches!(err, SchemaError::ReservedColumn(name) if name == "title"));
    }

    #[test]
    fn empty_attribute_rejected() {
        let err = wide::raw_schema(&attrs(&[""])).unwrap_err();
        assert!(matches!(err, SchemaError::EmptyAttribute));
    }
}
