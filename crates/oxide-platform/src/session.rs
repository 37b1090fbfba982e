//! Session and transaction SQL.

use std::fmt;

use crate::error::{PlatformError, Result};
use crate::platform::Vendor;

/// Transaction isolation level, as handed down by the connection layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionIsolation {
    /// Dirty reads allowed.
    ReadUncommitted,
    /// Only committed rows are visible.
    ReadCommitted,
    /// Rows read stay stable for the transaction.
    RepeatableRead,
    /// Full serializability.
    Serializable,
}

impl TransactionIsolation {
    /// ANSI keyword for the level.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::ReadUncommitted => "READ UNCOMMITTED",
            Self::ReadCommitted => "READ COMMITTED",
            Self::RepeatableRead => "REPEATABLE READ",
            Self::Serializable => "SERIALIZABLE",
        }
    }
}

impl fmt::Display for TransactionIsolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl TryFrom<i32> for TransactionIsolation {
    type Error = PlatformError;

    fn try_from(level: i32) -> Result<Self> {
        match level {
            1 => Ok(Self::ReadUncommitted),
            2 => Ok(Self::ReadCommitted),
            3 => Ok(Self::RepeatableRead),
            4 => Ok(Self::Serializable),
            other => Err(PlatformError::invalid(format!(
                "invalid transaction isolation level {other}"
            ))),
        }
    }
}

/// Vendor spelling of session-level statements.
pub trait SessionSql: Vendor {
    /// Statement setting the isolation level of the session.
    fn transaction_isolation_sql(&self, level: TransactionIsolation) -> String {
        format!("SET TRANSACTION ISOLATION LEVEL {}", level.as_sql())
    }

    /// SELECT evaluating a single expression without a table.
    fn dummy_select_sql(&self, expression: &str) -> String {
        format!("SELECT {expression}")
    }

    /// Row locking clause appended to SELECT; empty when unsupported.
    fn for_update_sql(&self) -> &'static str {
        "FOR UPDATE"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_isolation_from_int() {
        assert_eq!(
            TransactionIsolation::try_from(2).unwrap(),
            TransactionIsolation::ReadCommitted
        );
        assert!(TransactionIsolation::try_from(0).is_err());
        assert!(TransactionIsolation::try_from(5).is_err());
    }

    #[test]
    fn test_isolation_display() {
        assert_eq!(TransactionIsolation::RepeatableRead.to_string(), "REPEATABLE READ");
    }
}
