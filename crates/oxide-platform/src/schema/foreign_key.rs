//! Foreign key descriptors.

use crate::error::{PlatformError, Result};

/// Referential action for ON DELETE / ON UPDATE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferentialAction {
    /// Propagate the change.
    Cascade,
    /// Set referencing columns to NULL.
    SetNull,
    /// Defer the check to the end of the statement.
    NoAction,
    /// Reject the change immediately.
    Restrict,
    /// Set referencing columns to their default.
    SetDefault,
}

impl ReferentialAction {
    /// Returns the SQL keyword(s) for this action.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Cascade => "CASCADE",
            Self::SetNull => "SET NULL",
            Self::NoAction => "NO ACTION",
            Self::Restrict => "RESTRICT",
            Self::SetDefault => "SET DEFAULT",
        }
    }
}

/// MATCH option of a foreign key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchType {
    /// `MATCH SIMPLE`.
    Simple,
    /// `MATCH FULL`.
    Full,
    /// `MATCH PARTIAL`.
    Partial,
}

impl MatchType {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Simple => "SIMPLE",
            Self::Full => "FULL",
            Self::Partial => "PARTIAL",
        }
    }
}

/// A foreign key constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    /// Constraint name; unnamed keys get a system-generated name.
    pub name: Option<String>,
    /// Referencing columns in the local table.
    pub local_columns: Vec<String>,
    /// Referenced table.
    pub foreign_table: String,
    /// Referenced columns.
    pub foreign_columns: Vec<String>,
    /// ON UPDATE action.
    pub on_update: Option<ReferentialAction>,
    /// ON DELETE action.
    pub on_delete: Option<ReferentialAction>,
    /// MATCH option.
    pub match_type: Option<MatchType>,
    /// DEFERRABLE constraint.
    pub deferrable: bool,
    /// INITIALLY DEFERRED constraint.
    pub initially_deferred: bool,
}

impl ForeignKey {
    /// Creates a foreign key.
    #[must_use]
    pub fn new<L, F, S, T>(
        local_columns: L,
        foreign_table: impl Into<String>,
        foreign_columns: F,
    ) -> Self
    where
        L: IntoIterator<Item = S>,
        F: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            name: None,
            local_columns: local_columns.into_iter().map(Into::into).collect(),
            foreign_table: foreign_table.into(),
            foreign_columns: foreign_columns.into_iter().map(Into::into).collect(),
            on_update: None,
            on_delete: None,
            match_type: None,
            deferrable: false,
            initially_deferred: false,
        }
    }

    /// Sets the constraint name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the ON DELETE action.
    #[must_use]
    pub const fn on_delete(mut self, action: ReferentialAction) -> Self {
        self.on_delete = Some(action);
        self
    }

    /// Sets the ON UPDATE action.
    #[must_use]
    pub const fn on_update(mut self, action: ReferentialAction) -> Self {
        self.on_update = Some(action);
        self
    }

    /// Sets the MATCH option.
    #[must_use]
    pub const fn match_type(mut self, match_type: MatchType) -> Self {
        self.match_type = Some(match_type);
        self
    }

    /// Makes the constraint deferrable.
    #[must_use]
    pub const fn deferrable(mut self, initially_deferred: bool) -> Self {
        self.deferrable = true;
        self.initially_deferred = initially_deferred;
        self
    }

    /// Checks the descriptor is usable for synthesis.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for empty or mismatched column lists, or a
    /// missing referenced table.
    pub fn validate(&self) -> Result<()> {
        let label = self.name.as_deref().unwrap_or("<unnamed>");
        if self.local_columns.is_empty() {
            return Err(PlatformError::invalid(format!(
                "foreign key '{label}' has no local columns"
            )));
        }
        if self.foreign_columns.is_empty() {
            return Err(PlatformError::invalid(format!(
                "foreign key '{label}' has no foreign columns"
            )));
        }
        if self.local_columns.len() != self.foreign_columns.len() {
            return Err(PlatformError::invalid(format!(
                "foreign key '{label}' maps {} local columns to {} foreign columns",
                self.local_columns.len(),
                self.foreign_columns.len()
            )));
        }
        if self.foreign_table.trim().is_empty() {
            return Err(PlatformError::invalid(format!(
                "foreign key '{label}' has no referenced table"
            )));
        }
        Ok(())
    }

    /// Returns the name, failing for unnamed keys.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` when the key has no name (it cannot be
    /// addressed by a DROP).
    pub fn require_name(&self) -> Result<&str> {
        self.name.as_deref().ok_or_else(|| {
            PlatformError::invalid(format!(
                "foreign key on ({}) referencing '{}' has no name",
                self.local_columns.join(", "),
                self.foreign_table
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_mismatched_columns() {
        let fk = ForeignKey::new(["a", "b"], "other", ["id"]);
        let err = fk.validate().unwrap_err();
        assert!(err.to_string().contains("2 local columns to 1 foreign columns"));
    }

    #[test]
    fn test_validate_empty() {
        let fk = ForeignKey::new(Vec::<String>::new(), "other", Vec::<String>::new());
        assert!(fk.validate().is_err());
    }

    #[test]
    fn test_require_name() {
        let fk = ForeignKey::new(["user_id"], "users", ["id"]);
        assert!(fk.require_name().is_err());
        let fk = fk.named("fk_user");
        assert_eq!(fk.require_name().unwrap(), "fk_user");
    }
}
