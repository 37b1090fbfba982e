//! Firebird.

use crate::capabilities::{Capabilities, IdentifierOverflow};
use crate::ddl::{standard_change_column_pieces, AlterPiece, DdlDialect};
use crate::error::{PlatformError, Result};
use crate::expression::{DateIntervalUnit, DateOperator, ExpressionTranslator};
use crate::limit::LimitStrategy;
use crate::platform::{Platform, Vendor};
use crate::schema::{Column, ColumnDiff, ColumnProperty, Sequence, TableDiff};
use crate::session::{SessionSql, TransactionIsolation};
use crate::types::{LogicalType, TypeMapper};

const VARCHAR_MAX: u32 = 32_765;

/// Firebird dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FirebirdDialect;

impl FirebirdDialect {
    /// Capability flags.
    #[must_use]
    pub const fn capabilities(&self) -> Capabilities {
        Capabilities {
            supports_sequences: true,
            prefers_sequences: true,
            supports_comment_on_statement: true,
            supports_rename_table: false,
            max_identifier_length: 31,
            identifier_overflow: IdentifierOverflow::Reject,
            varchar_max_length: VARCHAR_MAX,
            binary_max_length: VARCHAR_MAX,
            ..Capabilities::ansi()
        }
    }

    /// Assembles the platform.
    #[must_use]
    pub fn platform(self) -> Platform {
        Platform::new(self, self.capabilities(), LimitStrategy::RowsRange)
    }

    fn bare_table(table: &str) -> String {
        table.rsplit('.').next().unwrap_or(table).to_uppercase()
    }

    fn sequence_name(platform: &Platform, table: &str) -> Result<String> {
        platform.fix_schema_element_name(&format!("{}_D2IS", Self::bare_table(table)))
    }

    fn trigger_name(platform: &Platform, table: &str) -> Result<String> {
        platform.fix_schema_element_name(&format!("{}_D2IT", Self::bare_table(table)))
    }
}

impl Vendor for FirebirdDialect {
    fn name(&self) -> &'static str {
        "firebird"
    }
}

impl TypeMapper for FirebirdDialect {
    fn integer_declaration(&self, _column: &Column) -> String {
        "INTEGER".to_string()
    }

    fn clob_declaration(&self, _column: &Column) -> String {
        "BLOB SUB_TYPE TEXT".to_string()
    }

    fn binary_declaration(&self, length: u32, fixed: bool) -> String {
        if fixed {
            format!("CHAR({length}) CHARACTER SET OCTETS")
        } else {
            format!("VARCHAR({length}) CHARACTER SET OCTETS")
        }
    }

    fn boolean_declaration(&self, _column: &Column) -> String {
        "SMALLINT".to_string()
    }

    fn datetimetz_declaration(&self, _column: &Column) -> String {
        "TIMESTAMP".to_string()
    }

    fn boolean_literal(&self, value: bool) -> &'static str {
        if value {
            "1"
        } else {
            "0"
        }
    }

    fn native_type_names(&self) -> Vec<(&'static str, LogicalType)> {
        vec![
            ("boolean", LogicalType::Boolean),
            ("smallint", LogicalType::SmallInt),
            ("short", LogicalType::SmallInt),
            ("integer", LogicalType::Integer),
            ("long", LogicalType::Integer),
            ("bigint", LogicalType::BigInt),
            ("int64", LogicalType::BigInt),
            ("numeric", LogicalType::Decimal),
            ("decimal", LogicalType::Decimal),
            ("double precision", LogicalType::Float),
            ("double", LogicalType::Float),
            ("float", LogicalType::SmallFloat),
            ("char", LogicalType::String),
            ("varchar", LogicalType::String),
            ("varying", LogicalType::String),
            ("cstring", LogicalType::String),
            ("blob", LogicalType::Blob),
            ("date", LogicalType::Date),
            ("time", LogicalType::Time),
            ("timestamp", LogicalType::DateTime),
        ]
    }
}

impl ExpressionTranslator for FirebirdDialect {
    fn locate_expression(
        &self,
        string: &str,
        substring: &str,
        start: Option<&str>,
    ) -> Result<String> {
        Ok(match start {
            Some(start) => format!("POSITION({substring}, {string}, {start})"),
            None => format!("POSITION({substring}, {string})"),
        })
    }

    fn length_expression(&self, string: &str) -> String {
        format!("CHAR_LENGTH({string})")
    }

    fn date_diff_expression(&self, date1: &str, date2: &str) -> Result<String> {
        Ok(format!("DATEDIFF(day, {date2}, {date1})"))
    }

    fn date_arithmetic_expression(
        &self,
        date: &str,
        operator: DateOperator,
        interval: &str,
        unit: DateIntervalUnit,
    ) -> Result<String> {
        let (unit, interval) = unit.fold_quarter(interval);
        let interval = match operator {
            DateOperator::Add => interval,
            DateOperator::Sub => format!("-{interval}"),
        };
        Ok(format!("DATEADD({interval} {} TO {date})", unit.as_sql()))
    }

    fn bit_and_expression(&self, a: &str, b: &str) -> String {
        format!("BIN_AND({a}, {b})")
    }

    fn bit_or_expression(&self, a: &str, b: &str) -> String {
        format!("BIN_OR({a}, {b})")
    }

    fn guid_expression(&self) -> Result<String> {
        Ok("UUID_TO_CHAR(GEN_UUID())".to_string())
    }

    fn md5_expression(&self, _string: &str) -> Result<String> {
        Err(PlatformError::unsupported(self.name(), "MD5"))
    }
}

impl DdlDialect for FirebirdDialect {
    fn identity_emulation_sql(
        &self,
        platform: &Platform,
        table: &str,
        column: &Column,
    ) -> Result<Vec<String>> {
        let sequence = Self::sequence_name(platform, table)?;
        let trigger = Self::trigger_name(platform, table)?;
        let col = &column.name;
        Ok(vec![
            format!("CREATE SEQUENCE {sequence}"),
            format!(
                "CREATE TRIGGER {trigger} FOR {table} ACTIVE BEFORE INSERT POSITION 0 AS \
                 BEGIN IF ((NEW.{col} IS NULL) OR (NEW.{col} = 0)) THEN \
                 NEW.{col} = NEXT VALUE FOR {sequence}; END"
            ),
        ])
    }

    fn truncate_table_sql(&self, _platform: &Platform, table: &str, _cascade: bool) -> String {
        format!("DELETE FROM {table}")
    }

    fn combines_alter_clauses(&self) -> bool {
        true
    }

    fn drop_column_clause(&self, _platform: &Platform, column: &str) -> String {
        format!("DROP {column}")
    }

    fn change_column_pieces(
        &self,
        platform: &Platform,
        diff: &TableDiff,
        change: &ColumnDiff,
    ) -> Result<Vec<AlterPiece>> {
        let mut pieces = standard_change_column_pieces(platform, change)?;
        if change.has_changed(ColumnProperty::Autoincrement) {
            let table = platform.table_name(&diff.name);
            if change.column.autoincrement {
                let column = Column {
                    name: change.old_name.clone(),
                    ..change.column.clone()
                };
                for stmt in self.identity_emulation_sql(platform, &table, &column)? {
                    pieces.push(AlterPiece::Statement(stmt));
                }
            } else {
                pieces.push(AlterPiece::Statement(format!(
                    "DROP TRIGGER {}",
                    Self::trigger_name(platform, &table)?
                )));
                pieces.push(AlterPiece::Statement(format!(
                    "DROP SEQUENCE {}",
                    Self::sequence_name(platform, &table)?
                )));
            }
        }
        Ok(pieces)
    }

    fn rename_column_pieces(
        &self,
        _platform: &Platform,
        _diff: &TableDiff,
        old_name: &str,
        column: &Column,
    ) -> Result<Vec<AlterPiece>> {
        Ok(vec![AlterPiece::Clause(format!(
            "ALTER COLUMN {old_name} TO {}",
            column.name
        ))])
    }

    fn create_sequence_sql(&self, _platform: &Platform, sequence: &Sequence) -> String {
        format!(
            "CREATE SEQUENCE {} START WITH {} INCREMENT BY {}",
            sequence.name, sequence.initial_value, sequence.allocation_size
        )
    }

    fn alter_sequence_sql(&self, _platform: &Platform, sequence: &Sequence) -> String {
        format!(
            "ALTER SEQUENCE {} INCREMENT BY {}",
            sequence.name, sequence.allocation_size
        )
    }

    fn sequence_next_val_sql(&self, _platform: &Platform, name: &str) -> String {
        format!("SELECT NEXT VALUE FOR {name} FROM RDB$DATABASE")
    }

    fn create_database_sql(&self, _platform: &Platform, _name: &str) -> Result<String> {
        Err(PlatformError::unsupported(self.name(), "CREATE DATABASE"))
    }

    fn drop_database_sql(&self, _platform: &Platform, _name: &str) -> Result<String> {
        Err(PlatformError::unsupported(self.name(), "DROP DATABASE"))
    }
}

impl SessionSql for FirebirdDialect {
    fn transaction_isolation_sql(&self, level: TransactionIsolation) -> String {
        let level = match level {
            TransactionIsolation::ReadUncommitted | TransactionIsolation::ReadCommitted => {
                "READ COMMITTED"
            }
            TransactionIsolation::RepeatableRead => "SNAPSHOT",
            TransactionIsolation::Serializable => "SNAPSHOT TABLE STABILITY",
        };
        format!("SET TRANSACTION ISOLATION LEVEL {level}")
    }

    fn dummy_select_sql(&self, expression: &str) -> String {
        format!("SELECT {expression} FROM RDB$DATABASE")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ddl::CreateFlags;
    use crate::limit::ROWS_RANGE_MAX;
    use crate::schema::{ColumnDiff, ColumnProperty, Table};

    fn firebird() -> Platform {
        FirebirdDialect.platform()
    }

    #[test]
    fn test_rows_range() {
        let platform = firebird();
        assert_eq!(
            platform.modify_limit_query("SELECT * FROM t", Some(10), Some(20)).unwrap(),
            "SELECT * FROM t ROWS 21 TO 30"
        );
        assert_eq!(
            platform.modify_limit_query("SELECT * FROM t", None, Some(20)).unwrap(),
            format!("SELECT * FROM t ROWS 21 TO {ROWS_RANGE_MAX}")
        );
        assert_eq!(
            platform.modify_limit_query("SELECT * FROM t", Some(5), None).unwrap(),
            "SELECT * FROM t ROWS 1 TO 5"
        );
    }

    #[test]
    fn test_long_identifiers_rejected() {
        let table = Table::new("users").column(Column::new("c".repeat(32), LogicalType::Integer));
        assert!(matches!(
            firebird().create_table_sql(&table, CreateFlags::default()),
            Err(PlatformError::UnsupportedFeature { .. })
        ));
    }

    #[test]
    fn test_rename_table_unsupported() {
        let diff = TableDiff::new("users").rename_to("members");
        assert!(matches!(
            firebird().alter_table_sql(&diff),
            Err(PlatformError::UnsupportedFeature { .. })
        ));
    }

    #[test]
    fn test_combined_alter() {
        let diff = TableDiff::new("users")
            .add_column(Column::new("age", LogicalType::SmallInt))
            .change_column(ColumnDiff::new(
                "name",
                Column::new("name", LogicalType::String).length(80),
                [ColumnProperty::Length],
            ))
            .rename_column("nick", Column::new("alias", LogicalType::String));
        assert_eq!(
            firebird().alter_table_sql(&diff).unwrap(),
            ["ALTER TABLE users ADD age SMALLINT, ALTER COLUMN name TYPE VARCHAR(80), \
              ALTER COLUMN nick TO alias"]
        );
    }

    #[test]
    fn test_identity_emulation() {
        let table = Table::new("users")
            .column(Column::new("id", LogicalType::Integer).autoincrement())
            .primary_key(["id"]);
        let sql = firebird().create_table_sql(&table, CreateFlags::default()).unwrap();
        assert_eq!(
            sql,
            [
                "CREATE TABLE users (id INTEGER NOT NULL, PRIMARY KEY (id))",
                "CREATE SEQUENCE USERS_D2IS",
                "CREATE TRIGGER USERS_D2IT FOR users ACTIVE BEFORE INSERT POSITION 0 AS \
                 BEGIN IF ((NEW.id IS NULL) OR (NEW.id = 0)) \
                 THEN NEW.id = NEXT VALUE FOR USERS_D2IS; END",
            ]
        );
    }

    #[test]
    fn test_autoincrement_change_manages_emulation() {
        let plain = Column::new("id", LogicalType::Integer).not_null();
        let serial = plain.clone().autoincrement();

        let enable =
            TableDiff::new("users").change_column(ColumnDiff::between(&plain, &serial).unwrap());
        assert_eq!(
            firebird().alter_table_sql(&enable).unwrap(),
            [
                "CREATE SEQUENCE USERS_D2IS",
                "CREATE TRIGGER USERS_D2IT FOR users ACTIVE BEFORE INSERT POSITION 0 AS \
                 BEGIN IF ((NEW.id IS NULL) OR (NEW.id = 0)) \
                 THEN NEW.id = NEXT VALUE FOR USERS_D2IS; END",
            ]
        );

        let disable =
            TableDiff::new("users").change_column(ColumnDiff::between(&serial, &plain).unwrap());
        assert_eq!(
            firebird().alter_table_sql(&disable).unwrap(),
            ["DROP TRIGGER USERS_D2IT", "DROP SEQUENCE USERS_D2IS"]
        );
    }

    #[test]
    fn test_session_statements() {
        let platform = firebird();
        assert_eq!(platform.dummy_select_sql("1"), "SELECT 1 FROM RDB$DATABASE");
        assert_eq!(
            platform.sequence_next_val_sql("s").unwrap(),
            "SELECT NEXT VALUE FOR s FROM RDB$DATABASE"
        );
        assert_eq!(
            platform.transaction_isolation_sql(3).unwrap(),
            "SET TRANSACTION ISOLATION LEVEL SNAPSHOT"
        );
    }
}
