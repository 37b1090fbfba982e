//! Table mutation descriptors consumed by ALTER TABLE synthesis.

use std::collections::BTreeSet;

use crate::error::{PlatformError, Result};

use super::column::Column;
use super::foreign_key::ForeignKey;
use super::index::Index;
use super::table::Table;

/// A column attribute that changed between two snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ColumnProperty {
    /// Logical type.
    Type,
    /// Length.
    Length,
    /// Precision.
    Precision,
    /// Scale.
    Scale,
    /// Default value.
    Default,
    /// Nullability.
    NotNull,
    /// Autoincrement flag.
    Autoincrement,
    /// Comment.
    Comment,
    /// Fixed-length flag.
    Fixed,
    /// Unsigned flag.
    Unsigned,
    /// Collation.
    Collation,
}

impl ColumnProperty {
    /// Properties that change the column's type declaration.
    pub const DECLARATION: [Self; 7] = [
        Self::Type,
        Self::Length,
        Self::Precision,
        Self::Scale,
        Self::Fixed,
        Self::Unsigned,
        Self::Collation,
    ];
}

/// A changed column: the new definition plus which attributes moved.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDiff {
    /// Column name before the change.
    pub old_name: String,
    /// New column definition.
    pub column: Column,
    /// Previous definition, when known.
    pub from_column: Option<Column>,
    /// Attributes that changed.
    pub changed_properties: BTreeSet<ColumnProperty>,
}

impl ColumnDiff {
    /// Creates a column diff with an explicit property set.
    #[must_use]
    pub fn new<I>(old_name: impl Into<String>, column: Column, properties: I) -> Self
    where
        I: IntoIterator<Item = ColumnProperty>,
    {
        Self {
            old_name: old_name.into(),
            column,
            from_column: None,
            changed_properties: properties.into_iter().collect(),
        }
    }

    /// Compares two definitions of the same column.
    ///
    /// Returns `None` when nothing relevant changed.
    #[must_use]
    pub fn between(from: &Column, to: &Column) -> Option<Self> {
        let mut changed = BTreeSet::new();
        if from.logical_type != to.logical_type {
            changed.insert(ColumnProperty::Type);
        }
        if from.length != to.length {
            changed.insert(ColumnProperty::Length);
        }
        if from.precision != to.precision {
            changed.insert(ColumnProperty::Precision);
        }
        if from.scale != to.scale {
            changed.insert(ColumnProperty::Scale);
        }
        if from.default != to.default {
            changed.insert(ColumnProperty::Default);
        }
        if from.notnull != to.notnull {
            changed.insert(ColumnProperty::NotNull);
        }
        if from.autoincrement != to.autoincrement {
            changed.insert(ColumnProperty::Autoincrement);
        }
        if from.comment_text() != to.comment_text() {
            changed.insert(ColumnProperty::Comment);
        }
        if from.fixed != to.fixed {
            changed.insert(ColumnProperty::Fixed);
        }
        if from.unsigned != to.unsigned {
            changed.insert(ColumnProperty::Unsigned);
        }
        if from.collation != to.collation {
            changed.insert(ColumnProperty::Collation);
        }
        if changed.is_empty() {
            return None;
        }
        Some(Self {
            old_name: from.name.clone(),
            column: to.clone(),
            from_column: Some(from.clone()),
            changed_properties: changed,
        })
    }

    /// Attaches the previous definition.
    #[must_use]
    pub fn with_from_column(mut self, from: Column) -> Self {
        self.from_column = Some(from);
        self
    }

    /// Returns true if the property changed.
    #[must_use]
    pub fn has_changed(&self, property: ColumnProperty) -> bool {
        self.changed_properties.contains(&property)
    }

    /// Returns true if any property affecting the type declaration changed.
    #[must_use]
    pub fn declaration_changed(&self) -> bool {
        ColumnProperty::DECLARATION
            .iter()
            .any(|p| self.changed_properties.contains(p))
    }

    /// Returns true if only the comment changed.
    #[must_use]
    pub fn only_comment_changed(&self) -> bool {
        self.changed_properties.len() == 1 && self.has_changed(ColumnProperty::Comment)
    }

    /// True when the previous definition is known and had a default.
    #[must_use]
    pub fn old_default_exists(&self) -> bool {
        self.from_column
            .as_ref()
            .is_some_and(|c| c.default.is_some())
    }
}

/// A column renamed (and possibly redefined).
#[derive(Debug, Clone, PartialEq)]
pub struct RenamedColumn {
    /// Name before the rename.
    pub old_name: String,
    /// Definition under the new name.
    pub column: Column,
}

/// An index renamed without changing its definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamedIndex {
    /// Name before the rename.
    pub old_name: String,
    /// Index under its new name.
    pub index: Index,
}

/// Mutation descriptor for ALTER TABLE.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableDiff {
    /// Current table name.
    pub name: String,
    /// New table name, if the table is renamed.
    pub new_name: Option<String>,
    /// Columns to add.
    pub added_columns: Vec<Column>,
    /// Columns to redefine.
    pub changed_columns: Vec<ColumnDiff>,
    /// Columns to drop.
    pub removed_columns: Vec<Column>,
    /// Columns to rename.
    pub renamed_columns: Vec<RenamedColumn>,
    /// Indexes to create.
    pub added_indexes: Vec<Index>,
    /// Indexes to drop and recreate.
    pub changed_indexes: Vec<Index>,
    /// Indexes to drop.
    pub removed_indexes: Vec<Index>,
    /// Indexes to rename.
    pub renamed_indexes: Vec<RenamedIndex>,
    /// Foreign keys to add.
    pub added_foreign_keys: Vec<ForeignKey>,
    /// Foreign keys to drop and re-add.
    pub changed_foreign_keys: Vec<ForeignKey>,
    /// Foreign keys to drop.
    pub removed_foreign_keys: Vec<ForeignKey>,
    /// The table before the change, when known.
    pub from_table: Option<Table>,
}

impl TableDiff {
    /// Creates an empty diff for `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Creates an empty diff for `table`, remembering its definition.
    #[must_use]
    pub fn for_table(table: &Table) -> Self {
        Self {
            name: table.name.clone(),
            from_table: Some(table.clone()),
            ..Self::default()
        }
    }

    /// Renames the table.
    #[must_use]
    pub fn rename_to(mut self, new_name: impl Into<String>) -> Self {
        self.new_name = Some(new_name.into());
        self
    }

    /// Adds a column.
    #[must_use]
    pub fn add_column(mut self, column: Column) -> Self {
        self.added_columns.push(column);
        self
    }

    /// Changes a column.
    #[must_use]
    pub fn change_column(mut self, diff: ColumnDiff) -> Self {
        self.changed_columns.push(diff);
        self
    }

    /// Removes a column.
    #[must_use]
    pub fn remove_column(mut self, column: Column) -> Self {
        self.removed_columns.push(column);
        self
    }

    /// Renames a column.
    #[must_use]
    pub fn rename_column(mut self, old_name: impl Into<String>, column: Column) -> Self {
        self.renamed_columns.push(RenamedColumn {
            old_name: old_name.into(),
            column,
        });
        self
    }

    /// Adds an index.
    #[must_use]
    pub fn add_index(mut self, index: Index) -> Self {
        self.added_indexes.push(index);
        self
    }

    /// Changes an index.
    #[must_use]
    pub fn change_index(mut self, index: Index) -> Self {
        self.changed_indexes.push(index);
        self
    }

    /// Removes an index.
    #[must_use]
    pub fn remove_index(mut self, index: Index) -> Self {
        self.removed_indexes.push(index);
        self
    }

    /// Renames an index.
    #[must_use]
    pub fn rename_index(mut self, old_name: impl Into<String>, index: Index) -> Self {
        self.renamed_indexes.push(RenamedIndex {
            old_name: old_name.into(),
            index,
        });
        self
    }

    /// Adds a foreign key.
    #[must_use]
    pub fn add_foreign_key(mut self, fk: ForeignKey) -> Self {
        self.added_foreign_keys.push(fk);
        self
    }

    /// Changes a foreign key.
    #[must_use]
    pub fn change_foreign_key(mut self, fk: ForeignKey) -> Self {
        self.changed_foreign_keys.push(fk);
        self
    }

    /// Removes a foreign key.
    #[must_use]
    pub fn remove_foreign_key(mut self, fk: ForeignKey) -> Self {
        self.removed_foreign_keys.push(fk);
        self
    }

    /// Name of the table once the diff is applied.
    #[must_use]
    pub fn effective_name(&self) -> &str {
        self.new_name.as_deref().unwrap_or(&self.name)
    }

    /// Returns true if the diff carries no change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.new_name.is_none()
            && self.added_columns.is_empty()
            && self.changed_columns.is_empty()
            && self.removed_columns.is_empty()
            && self.renamed_columns.is_empty()
            && self.added_indexes.is_empty()
            && self.changed_indexes.is_empty()
            && self.removed_indexes.is_empty()
            && self.renamed_indexes.is_empty()
            && self.added_foreign_keys.is_empty()
            && self.changed_foreign_keys.is_empty()
            && self.removed_foreign_keys.is_empty()
    }

    /// Checks every descriptor the diff carries.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for an empty table name or any invalid
    /// column, index or foreign key.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(PlatformError::invalid("table diff has no table name"));
        }
        if let Some(ref new_name) = self.new_name {
            if new_name.trim().is_empty() {
                return Err(PlatformError::invalid("new table name must not be empty"));
            }
        }
        for column in self
            .added_columns
            .iter()
            .chain(self.changed_columns.iter().map(|c| &c.column))
            .chain(self.renamed_columns.iter().map(|c| &c.column))
        {
            column.validate()?;
        }
        for index in self
            .added_indexes
            .iter()
            .chain(&self.changed_indexes)
            .chain(self.renamed_indexes.iter().map(|r| &r.index))
        {
            index.validate()?;
        }
        for fk in self.added_foreign_keys.iter().chain(&self.changed_foreign_keys) {
            fk.validate()?;
        }
        for fk in self.removed_foreign_keys.iter().chain(&self.changed_foreign_keys) {
            fk.require_name()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::DefaultValue;
    use crate::types::LogicalType;

    #[test]
    fn test_column_diff_between() {
        let from = Column::new("qty", LogicalType::Integer);
        let to = Column::new("qty", LogicalType::BigInt)
            .not_null()
            .default_value(DefaultValue::Integer(1));
        let diff = ColumnDiff::between(&from, &to).unwrap();
        assert!(diff.has_changed(ColumnProperty::Type));
        assert!(diff.has_changed(ColumnProperty::NotNull));
        assert!(diff.has_changed(ColumnProperty::Default));
        assert!(!diff.has_changed(ColumnProperty::Comment));
        assert!(diff.declaration_changed());
        assert!(!diff.old_default_exists());
    }

    #[test]
    fn test_column_diff_between_identical() {
        let col = Column::new("qty", LogicalType::Integer);
        assert!(ColumnDiff::between(&col, &col).is_none());
    }

    #[test]
    fn test_only_comment_changed() {
        let diff = ColumnDiff::new(
            "a",
            Column::new("a", LogicalType::Integer).comment("x"),
            [ColumnProperty::Comment],
        );
        assert!(diff.only_comment_changed());
        assert!(!diff.declaration_changed());
    }

    #[test]
    fn test_validate_rejects_unnamed_fk_drop() {
        let diff = TableDiff::new("orders")
            .remove_foreign_key(ForeignKey::new(["user_id"], "users", ["id"]));
        assert!(diff.validate().is_err());
    }

    #[test]
    fn test_effective_name() {
        let diff = TableDiff::new("a");
        assert_eq!(diff.effective_name(), "a");
        assert!(diff.is_empty());
        let diff = diff.rename_to("b");
        assert_eq!(diff.effective_name(), "b");
        assert!(!diff.is_empty());
    }
}
