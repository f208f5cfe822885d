//! Field/value collections shared by parameters, RPC payloads and records.

/// Key-value tuple representing a field and its value.
pub type FieldValue = (String, String);

/// Ordered collection of field-value pairs. A field may repeat.
pub type FieldValues = Vec<FieldValue>;

/// Helper trait for working with field-value collections.
pub trait FieldValuesExt {
    /// Gets the first value for a field, if present.
    fn get_field(&self, field: &str) -> Option<&str>;

    /// Gets every value recorded for a repeated field.
    fn get_all(&self, field: &str) -> Vec<&str>;

    /// Returns true if every pair of `other` is present in `self`.
    fn contains_all(&self, other: &FieldValues) -> bool;
}

impl FieldValuesExt for FieldValues {
    fn get_field(&self, field: &str) -> Option<&str> {
        self.iter()
            .find(|(f, _)| f == field)
            .map(|(_, v)| v.as_str())
    }

    fn get_all(&self, field: &str) -> Vec<&str> {
        self.iter()
            .filter(|(f, _)| f == field)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    fn contains_all(&self, other: &FieldValues) -> bool {
        other.iter().all(|pair| self.contains(pair))
    }
}

/// Builds a FieldValues collection from key-value pairs.
#[macro_export]
macro_rules! field_values {
    ($($field:expr => $value:expr),* $(,)?) => {
        vec![
            $(($field.to_string(), $value.to_string()),)*
        ]
    };
}
