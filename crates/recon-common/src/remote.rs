//! Remote state as read back from the managed system.

use crate::fields::{FieldValues, FieldValuesExt};

/// One record observed on the remote system.
///
/// Absence of the resource is expressed as `Option<RemoteState>::None`.
/// Records are fetched fresh on every run and dropped after planning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteState {
    fields: FieldValues,
}

impl RemoteState {
    /// Wraps a fetched record.
    pub fn new(fields: FieldValues) -> Self {
        Self { fields }
    }

    /// Gets the first value of a field.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get_field(field)
    }
}

impl From<FieldValues> for RemoteState {
    fn from(fields: FieldValues) -> Self {
        Self::new(fields)
    }
}
