//! Index, unique and check constraint descriptors.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{PlatformError, Result};

/// An index on a table, including the primary key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Index {
    /// Index name.
    pub name: String,
    /// Indexed columns, in order.
    pub columns: Vec<String>,
    /// Whether the index enforces uniqueness.
    pub unique: bool,
    /// Whether this is the primary key.
    pub primary: bool,
    /// Free-form flags such as `clustered`, `nonclustered` or `fulltext`.
    pub flags: BTreeSet<String>,
    /// Vendor options such as `where` (partial index predicate).
    pub options: BTreeMap<String, String>,
}

impl Index {
    /// Creates a plain, non-unique index.
    #[must_use]
    pub fn new<I, S>(name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            unique: false,
            primary: false,
            flags: BTreeSet::new(),
            options: BTreeMap::new(),
        }
    }

    /// Creates a primary key index named `primary`.
    #[must_use]
    pub fn primary_key<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut index = Self::new("primary", columns);
        index.primary = true;
        index.unique = true;
        index
    }

    /// Makes the index unique.
    #[must_use]
    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Adds a flag.
    #[must_use]
    pub fn flag(mut self, flag: impl Into<String>) -> Self {
        self.flags.insert(flag.into().to_lowercase());
        self
    }

    /// Sets a vendor option.
    #[must_use]
    pub fn option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Returns true if the flag is set.
    #[must_use]
    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.contains(&flag.to_lowercase())
    }

    /// Partial index predicate, if any.
    #[must_use]
    pub fn where_clause(&self) -> Option<&str> {
        self.options.get("where").map(String::as_str)
    }

    /// Checks the descriptor is usable for synthesis.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` when the name or the column list is empty.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(PlatformError::invalid("index name must not be empty"));
        }
        if self.columns.is_empty() {
            return Err(PlatformError::invalid(format!(
                "index '{}' has no columns",
                self.name
            )));
        }
        Ok(())
    }
}

/// A table-level UNIQUE constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueConstraint {
    /// Optional constraint name.
    pub name: Option<String>,
    /// Constrained columns.
    pub columns: Vec<String>,
}

/// A table-level CHECK constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckConstraint {
    /// Optional constraint name.
    pub name: Option<String>,
    /// Boolean SQL expression.
    pub expression: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_key_is_unique() {
        let pk = Index::primary_key(["id"]);
        assert!(pk.primary);
        assert!(pk.unique);
        assert_eq!(pk.name, "primary");
    }

    #[test]
    fn test_flags_are_case_insensitive() {
        let idx = Index::new("idx_a", ["a"]).flag("CLUSTERED");
        assert!(idx.has_flag("clustered"));
        assert!(idx.has_flag("Clustered"));
    }

    #[test]
    fn test_validate_rejects_empty_columns() {
        let idx = Index::new("idx_empty", Vec::<String>::new());
        assert!(idx.validate().is_err());
    }
}
