//! Table descriptors.

use std::collections::BTreeMap;

use crate::error::{PlatformError, Result};

use super::column::Column;
use super::diff::TableDiff;
use super::foreign_key::ForeignKey;
use super::index::{CheckConstraint, Index, UniqueConstraint};

/// A table definition as handed down by the schema model.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Table name, optionally schema-qualified (`schema.table`).
    pub name: String,
    /// Columns in declaration order.
    pub columns: Vec<Column>,
    /// Indexes, the primary key included.
    pub indexes: Vec<Index>,
    /// Foreign keys.
    pub foreign_keys: Vec<ForeignKey>,
    /// Table-level unique constraints.
    pub unique_constraints: Vec<UniqueConstraint>,
    /// Table-level check constraints.
    pub checks: Vec<CheckConstraint>,
    /// Table comment.
    pub comment: Option<String>,
    /// Vendor options such as `engine`, `charset` or `collate`.
    pub options: BTreeMap<String, String>,
}

impl Table {
    /// Creates an empty table.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            indexes: Vec::new(),
            foreign_keys: Vec::new(),
            unique_constraints: Vec::new(),
            checks: Vec::new(),
            comment: None,
            options: BTreeMap::new(),
        }
    }

    /// Adds a column.
    #[must_use]
    pub fn column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Sets the primary key.
    #[must_use]
    pub fn primary_key<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.indexes.retain(|i| !i.primary);
        self.indexes.push(Index::primary_key(columns));
        self
    }

    /// Adds an index.
    #[must_use]
    pub fn index(mut self, index: Index) -> Self {
        self.indexes.push(index);
        self
    }

    /// Adds a foreign key.
    #[must_use]
    pub fn foreign_key(mut self, foreign_key: ForeignKey) -> Self {
        self.foreign_keys.push(foreign_key);
        self
    }

    /// Adds a table-level unique constraint.
    #[must_use]
    pub fn unique<I, S>(mut self, name: Option<&str>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.unique_constraints.push(UniqueConstraint {
            name: name.map(ToString::to_string),
            columns: columns.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Adds a table-level check constraint.
    #[must_use]
    pub fn check(mut self, name: Option<&str>, expression: impl Into<String>) -> Self {
        self.checks.push(CheckConstraint {
            name: name.map(ToString::to_string),
            expression: expression.into(),
        });
        self
    }

    /// Sets a vendor option.
    #[must_use]
    pub fn option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Returns the primary key index.
    #[must_use]
    pub fn primary_key_index(&self) -> Option<&Index> {
        self.indexes.iter().find(|i| i.primary)
    }

    /// Returns true if `column` belongs to the primary key.
    #[must_use]
    pub fn is_primary_key_column(&self, column: &str) -> bool {
        self.primary_key_index()
            .is_some_and(|pk| pk.columns.iter().any(|c| c == column))
    }

    /// Looks up a column by name.
    #[must_use]
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Checks the table and everything it owns.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for an empty name, no columns, or any
    /// invalid column, index or foreign key.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(PlatformError::invalid("table name must not be empty"));
        }
        if self.columns.is_empty() {
            return Err(PlatformError::invalid(format!(
                "table '{}' has no columns",
                self.name
            )));
        }
        for column in &self.columns {
            column.validate()?;
        }
        for index in &self.indexes {
            index.validate()?;
        }
        for fk in &self.foreign_keys {
            fk.validate()?;
        }
        for unique in &self.unique_constraints {
            if unique.columns.is_empty() {
                return Err(PlatformError::invalid(format!(
                    "unique constraint on table '{}' has no columns",
                    self.name
                )));
            }
        }
        Ok(())
    }

    /// Returns the table as it looks after `diff` has been applied.
    ///
    /// Changed columns are addressed by their name before any rename.
    #[must_use]
    pub fn apply(&self, diff: &TableDiff) -> Self {
        let mut table = self.clone();
        if let Some(ref new_name) = diff.new_name {
            table.name.clone_from(new_name);
        }

        table
            .columns
            .retain(|c| !diff.removed_columns.iter().any(|r| r.name == c.name));
        for change in &diff.changed_columns {
            if let Some(slot) = table.columns.iter_mut().find(|c| c.name == change.old_name) {
                *slot = Column {
                    name: slot.name.clone(),
                    ..change.column.clone()
                };
            }
        }
        for renamed in &diff.renamed_columns {
            if let Some(slot) = table.columns.iter_mut().find(|c| c.name == renamed.old_name) {
                *slot = renamed.column.clone();
            }
            rename_references(&mut table, &renamed.old_name, &renamed.column.name);
        }
        table.columns.extend(diff.added_columns.iter().cloned());

        let dropped_indexes: Vec<&str> = diff
            .removed_indexes
            .iter()
            .chain(&diff.changed_indexes)
            .map(|i| i.name.as_str())
            .collect();
        table
            .indexes
            .retain(|i| !dropped_indexes.contains(&i.name.as_str()));
        for renamed in &diff.renamed_indexes {
            if let Some(slot) = table.indexes.iter_mut().find(|i| i.name == renamed.old_name) {
                *slot = renamed.index.clone();
            }
        }
        table
            .indexes
            .extend(diff.added_indexes.iter().chain(&diff.changed_indexes).cloned());

        let dropped_fks: Vec<Option<&str>> = diff
            .removed_foreign_keys
            .iter()
            .chain(&diff.changed_foreign_keys)
            .map(|f| f.name.as_deref())
            .collect();
        table
            .foreign_keys
            .retain(|f| f.name.is_none() || !dropped_fks.contains(&f.name.as_deref()));
        table.foreign_keys.extend(
            diff.added_foreign_keys
                .iter()
                .chain(&diff.changed_foreign_keys)
                .cloned(),
        );

        table
    }
}

fn rename_references(table: &mut Table, old: &str, new: &str) {
    let rename = |cols: &mut Vec<String>| {
        for c in cols.iter_mut().filter(|c| *c == old) {
            *c = new.to_string();
        }
    };
    for index in &mut table.indexes {
        rename(&mut index.columns);
    }
    for fk in &mut table.foreign_keys {
        rename(&mut fk.local_columns);
    }
    for unique in &mut table.unique_constraints {
        rename(&mut unique.columns);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ColumnDiff, ColumnProperty};
    use crate::types::LogicalType;

    fn users() -> Table {
        Table::new("users")
            .column(Column::new("id", LogicalType::Integer).not_null())
            .column(Column::new("name", LogicalType::String).length(100))
            .column(Column::new("legacy", LogicalType::Text))
            .primary_key(["id"])
            .index(Index::new("idx_name", ["name"]))
    }

    #[test]
    fn test_primary_key_lookup() {
        let table = users();
        assert!(table.is_primary_key_column("id"));
        assert!(!table.is_primary_key_column("name"));
    }

    #[test]
    fn test_validate_requires_columns() {
        assert!(Table::new("empty").validate().is_err());
        assert!(users().validate().is_ok());
    }

    #[test]
    fn test_apply_diff() {
        let diff = TableDiff::new("users")
            .remove_column(Column::new("legacy", LogicalType::Text))
            .rename_column("name", Column::new("full_name", LogicalType::String).length(100))
            .change_column(ColumnDiff::new(
                "id",
                Column::new("id", LogicalType::BigInt).not_null(),
                [ColumnProperty::Type],
            ))
            .add_column(Column::new("email", LogicalType::String))
            .rename_to("accounts");

        let after = users().apply(&diff);
        assert_eq!(after.name, "accounts");
        let names: Vec<&str> = after.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["id", "full_name", "email"]);
        assert_eq!(after.columns[0].logical_type, LogicalType::BigInt);
        assert_eq!(after.indexes[1].columns, ["full_name"]);
    }
}
