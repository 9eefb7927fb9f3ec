use std::fmt::{Display, Formatter};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strata_error::{StrataResult, strata_err};

use crate::{DType, Nullability};

/// The name, logical type and nullability of one column of a table.
///
/// Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnDetails {
    name: Arc<str>,
    dtype: DType,
    nullable: bool,
}

impl ColumnDetails {
    /// Describe a column. The nullability of `dtype` is overridden by `nullable`.
    pub fn new(name: impl Into<Arc<str>>, dtype: DType, nullable: bool) -> Self {
        Self {
            name: name.into(),
            dtype: dtype.with_nullability(Nullability::from(nullable)),
            nullable,
        }
    }

    /// The column name, unique within a schema.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The logical type of the column's values.
    pub fn dtype(&self) -> &DType {
        &self.dtype
    }

    /// Whether the column may contain nulls.
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }
}

impl Display for ColumnDetails {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.name, self.dtype)
    }
}

/// The ordered columns of a table.
///
/// Created once when a source is opened and fixed for the lifetime of the table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    columns: Vec<ColumnDetails>,
}

impl Schema {
    /// Create a schema from its ordered columns.
    pub fn new(columns: Vec<ColumnDetails>) -> Self {
        Self { columns }
    }

    /// The number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the schema has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// The columns in order.
    pub fn columns(&self) -> &[ColumnDetails] {
        &self.columns
    }

    /// Iterate the columns in order.
    pub fn iter(&self) -> impl Iterator<Item = &ColumnDetails> {
        self.columns.iter()
    }

    /// The column at `index`, or an out-of-bounds error.
    pub fn column(&self, index: usize) -> StrataResult<&ColumnDetails> {
        self.columns
            .get(index)
            .ok_or_else(|| strata_err!(OutOfBounds: index, 0, self.columns.len()))
    }

    /// The position of the column named `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name() == name)
    }
}

impl FromIterator<ColumnDetails> for Schema {
    fn from_iter<T: IntoIterator<Item = ColumnDetails>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Schema {
    type Item = &'a ColumnDetails;
    type IntoIter = std::slice::Iter<'a, ColumnDetails>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PType;

    fn schema() -> Schema {
        Schema::from_iter([
            ColumnDetails::new("id", PType::I32.into(), false),
            ColumnDetails::new("title", DType::Utf8(Nullability::NonNullable), true),
        ])
    }

    #[test]
    fn nullable_flag_overrides_dtype() {
        let schema = schema();
        let title = schema.column(1).unwrap();
        assert!(title.is_nullable());
        assert_eq!(title.dtype(), &DType::Utf8(Nullability::Nullable));
    }

    #[test]
    fn lookup_by_name_and_index() {
        let schema = schema();
        assert_eq!(schema.index_of("title"), Some(1));
        assert_eq!(schema.index_of("missing"), None);
        assert!(schema.column(2).is_err());
    }

    #[test]
    fn json_keeps_column_order() {
        let schema = schema();
        let json = serde_json::to_string(&schema).unwrap();
        assert!(json.starts_with(r#"[{"name":"id""#));
        let restored: Schema = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, schema);
    }
}
