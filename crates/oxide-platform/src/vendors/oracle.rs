//! Oracle.

use crate::capabilities::{Capabilities, IdentifierOverflow};
use crate::ddl::{AlterPiece, DdlDialect};
use crate::error::{PlatformError, Result};
use crate::expression::{scale_interval, DateIntervalUnit, DateOperator, ExpressionTranslator};
use crate::limit::LimitStrategy;
use crate::platform::{DateFormats, Platform, Vendor};
use crate::schema::{Column, ColumnDiff, ColumnProperty, Index, TableDiff};
use crate::session::{SessionSql, TransactionIsolation};
use crate::types::{LogicalType, TypeMapper};

/// Oracle dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OracleDialect;

impl OracleDialect {
    /// Capability flags.
    #[must_use]
    pub const fn capabilities(&self) -> Capabilities {
        Capabilities {
            supports_sequences: true,
            prefers_sequences: true,
            supports_release_savepoints: false,
            supports_foreign_key_on_update: false,
            supports_comment_on_statement: true,
            supports_rename_index: true,
            max_identifier_length: 30,
            identifier_overflow: IdentifierOverflow::Truncate,
            binary_max_length: 2000,
            ..Capabilities::ansi()
        }
    }

    /// Assembles the platform.
    #[must_use]
    pub fn platform(self) -> Platform {
        Platform::new(self, self.capabilities(), LimitStrategy::Rownum)
    }

    fn bare_table(table: &str) -> String {
        table.rsplit('.').next().unwrap_or(table).to_uppercase()
    }

    /// Name of the sequence backing an emulated identity column.
    fn sequence_name(platform: &Platform, table: &str) -> Result<String> {
        platform.fix_schema_element_name(&format!("{}_SEQ", Self::bare_table(table)))
    }

    /// Name of the insert trigger backing an emulated identity column.
    fn trigger_name(platform: &Platform, table: &str) -> Result<String> {
        platform.fix_schema_element_name(&format!("{}_AI_PK", Self::bare_table(table)))
    }
}

impl Vendor for OracleDialect {
    fn name(&self) -> &'static str {
        "oracle"
    }
}

impl TypeMapper for OracleDialect {
    fn smallint_declaration(&self, _column: &Column) -> String {
        "NUMBER(5)".to_string()
    }

    fn integer_declaration(&self, _column: &Column) -> String {
        "NUMBER(10)".to_string()
    }

    fn bigint_declaration(&self, _column: &Column) -> String {
        "NUMBER(20)".to_string()
    }

    fn decimal_declaration(&self, precision: u32, scale: u32) -> String {
        format!("NUMBER({precision}, {scale})")
    }

    fn varchar_declaration(&self, length: u32, fixed: bool) -> String {
        if fixed {
            format!("CHAR({length})")
        } else {
            format!("VARCHAR2({length})")
        }
    }

    fn binary_declaration(&self, length: u32, _fixed: bool) -> String {
        format!("RAW({length})")
    }

    fn boolean_declaration(&self, _column: &Column) -> String {
        "NUMBER(1)".to_string()
    }

    fn time_declaration(&self, _column: &Column) -> String {
        "DATE".to_string()
    }

    fn datetime_declaration(&self, _column: &Column) -> String {
        "TIMESTAMP(0)".to_string()
    }

    fn datetimetz_declaration(&self, _column: &Column) -> String {
        "TIMESTAMP(0) WITH TIME ZONE".to_string()
    }

    fn boolean_literal(&self, value: bool) -> &'static str {
        if value {
            "1"
        } else {
            "0"
        }
    }

    fn date_formats(&self) -> DateFormats {
        DateFormats {
            date_time_tz: "%Y-%m-%d %H:%M:%S%:z".to_string(),
            time: "1900-01-01 %H:%M:%S".to_string(),
            ..DateFormats::default()
        }
    }

    fn native_type_names(&self) -> Vec<(&'static str, LogicalType)> {
        vec![
            ("number", LogicalType::Integer),
            ("integer", LogicalType::Integer),
            ("pls_integer", LogicalType::Boolean),
            ("binary_integer", LogicalType::Boolean),
            ("float", LogicalType::Float),
            ("binary_double", LogicalType::Float),
            ("binary_float", LogicalType::SmallFloat),
            ("real", LogicalType::SmallFloat),
            ("double", LogicalType::Float),
            ("char", LogicalType::String),
            ("nchar", LogicalType::String),
            ("varchar", LogicalType::String),
            ("varchar2", LogicalType::String),
            ("nvarchar2", LogicalType::String),
            ("long", LogicalType::String),
            ("clob", LogicalType::Text),
            ("nclob", LogicalType::Text),
            ("raw", LogicalType::Binary),
            ("long raw", LogicalType::Blob),
            ("rowid", LogicalType::String),
            ("urowid", LogicalType::String),
            ("blob", LogicalType::Blob),
            ("date", LogicalType::Date),
            ("timestamp", LogicalType::DateTime),
            ("timestamptz", LogicalType::DateTimeTz),
        ]
    }
}

impl ExpressionTranslator for OracleDialect {
    fn substring_expression(&self, string: &str, start: &str, length: Option<&str>) -> String {
        match length {
            Some(length) => format!("SUBSTR({string}, {start}, {length})"),
            None => format!("SUBSTR({string}, {start})"),
        }
    }

    fn locate_expression(
        &self,
        string: &str,
        substring: &str,
        start: Option<&str>,
    ) -> Result<String> {
        Ok(match start {
            Some(start) => format!("INSTR({string}, {substring}, {start})"),
            None => format!("INSTR({string}, {substring})"),
        })
    }

    fn date_diff_expression(&self, date1: &str, date2: &str) -> Result<String> {
        Ok(format!("TRUNC({date1}) - TRUNC({date2})"))
    }

    fn date_arithmetic_expression(
        &self,
        date: &str,
        operator: DateOperator,
        interval: &str,
        unit: DateIntervalUnit,
    ) -> Result<String> {
        let (unit, interval) = unit.fold_week(interval);
        let op = operator.as_sql();
        Ok(match unit {
            DateIntervalUnit::Month | DateIntervalUnit::Quarter | DateIntervalUnit::Year => {
                let months = match unit {
                    DateIntervalUnit::Quarter => scale_interval(&interval, 3),
                    DateIntervalUnit::Year => scale_interval(&interval, 12),
                    _ => interval,
                };
                let months = match operator {
                    DateOperator::Add => months,
                    DateOperator::Sub => format!("-{months}"),
                };
                format!("ADD_MONTHS({date}, {months})")
            }
            DateIntervalUnit::Day | DateIntervalUnit::Week => format!("{date} {op} {interval}"),
            DateIntervalUnit::Second | DateIntervalUnit::Minute | DateIntervalUnit::Hour => {
                format!("{date} {op} NUMTODSINTERVAL({interval}, '{}')", unit.as_sql())
            }
        })
    }

    fn bit_and_expression(&self, a: &str, b: &str) -> String {
        format!("BITAND({a}, {b})")
    }

    fn bit_or_expression(&self, a: &str, b: &str) -> String {
        format!("({a} - BITAND({a}, {b}) + {b})")
    }

    fn guid_expression(&self) -> Result<String> {
        Ok("SYS_GUID()".to_string())
    }

    fn md5_expression(&self, string: &str) -> Result<String> {
        Ok(format!("LOWER(RAWTOHEX(STANDARD_HASH({string}, 'MD5')))"))
    }

    fn pi_expression(&self) -> Result<String> {
        Err(PlatformError::unsupported(self.name(), "PI()"))
    }

    fn current_time_sql(&self) -> &'static str {
        "CURRENT_TIMESTAMP"
    }
}

impl DdlDialect for OracleDialect {
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
            format!("CREATE SEQUENCE {sequence} START WITH 1 MINVALUE 1 INCREMENT BY 1"),
            format!(
                "CREATE TRIGGER {trigger}\n\
                 BEFORE INSERT ON {table}\n\
                 FOR EACH ROW\n\
                 DECLARE\n\
                 \x20  last_Sequence NUMBER;\n\
                 \x20  last_InsertID NUMBER;\n\
                 BEGIN\n\
                 \x20  IF (:NEW.{col} IS NULL OR :NEW.{col} = 0) THEN\n\
                 \x20     SELECT {sequence}.NEXTVAL INTO :NEW.{col} FROM DUAL;\n\
                 \x20  ELSE\n\
                 \x20     SELECT NVL(Last_Number, 0) INTO last_Sequence FROM User_Sequences \
                 WHERE Sequence_Name = '{sequence}';\n\
                 \x20     SELECT :NEW.{col} INTO last_InsertID FROM DUAL;\n\
                 \x20     WHILE (last_InsertID > last_Sequence) LOOP\n\
                 \x20        SELECT {sequence}.NEXTVAL INTO last_Sequence FROM DUAL;\n\
                 \x20     END LOOP;\n\
                 \x20  END IF;\n\
                 END;"
            ),
        ])
    }

    fn drop_index_sql(&self, _platform: &Platform, table: &str, index: &Index) -> String {
        match (index.primary, index.name.as_str()) {
            (true, "primary") => format!("ALTER TABLE {table} DROP PRIMARY KEY"),
            (true, name) => format!("ALTER TABLE {table} DROP CONSTRAINT {name}"),
            (false, name) => format!("DROP INDEX {name}"),
        }
    }

    fn add_column_clause(&self, platform: &Platform, column: &Column) -> Result<String> {
        Ok(format!("ADD ({})", self.column_declaration(platform, column)?))
    }

    fn drop_column_clause(&self, _platform: &Platform, column: &str) -> String {
        format!("DROP ({column})")
    }

    fn change_column_pieces(
        &self,
        platform: &Platform,
        diff: &TableDiff,
        change: &ColumnDiff,
    ) -> Result<Vec<AlterPiece>> {
        let name = &change.old_name;
        let column = &change.column;
        let mut pieces = Vec::new();

        let mut modify = String::new();
        if change.declaration_changed() {
            modify.push_str(&format!(" {}", platform.declare_column(column)?));
        }
        if change.has_changed(ColumnProperty::Default) {
            let default = column
                .default
                .as_ref()
                .map_or_else(|| "NULL".to_string(), |d| platform.default_value_sql(d));
            modify.push_str(&format!(" DEFAULT {default}"));
        }
        if change.has_changed(ColumnProperty::NotNull) {
            modify.push_str(if column.notnull { " NOT NULL" } else { " NULL" });
        }
        if !modify.is_empty() {
            pieces.push(AlterPiece::Clause(format!("MODIFY ({name}{modify})")));
        }

        if change.has_changed(ColumnProperty::Autoincrement) {
            let table = platform.table_name(&diff.name);
            if column.autoincrement {
                let renamed = Column {
                    name: name.clone(),
                    ..column.clone()
                };
                for stmt in self.identity_emulation_sql(platform, &table, &renamed)? {
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

    fn sequence_next_val_sql(&self, _platform: &Platform, name: &str) -> String {
        format!("SELECT {name}.NEXTVAL FROM DUAL")
    }

    fn create_database_sql(&self, _platform: &Platform, name: &str) -> Result<String> {
        Ok(format!("CREATE USER {name} IDENTIFIED BY {name}"))
    }

    fn drop_database_sql(&self, _platform: &Platform, name: &str) -> Result<String> {
        Ok(format!("DROP USER {name} CASCADE"))
    }
}

impl SessionSql for OracleDialect {
    fn transaction_isolation_sql(&self, level: TransactionIsolation) -> String {
        let level = match level {
            TransactionIsolation::ReadUncommitted | TransactionIsolation::ReadCommitted => {
                TransactionIsolation::ReadCommitted
            }
            TransactionIsolation::RepeatableRead | TransactionIsolation::Serializable => {
                TransactionIsolation::Serializable
            }
        };
        format!("SET TRANSACTION ISOLATION LEVEL {}", level.as_sql())
    }

    fn dummy_select_sql(&self, expression: &str) -> String {
        format!("SELECT {expression} FROM DUAL")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ddl::CreateFlags;
    use crate::schema::{DefaultValue, ForeignKey, ReferentialAction, Table};

    fn oracle() -> Platform {
        OracleDialect.platform()
    }

    #[test]
    fn test_boolean_is_number() {
        assert_eq!(oracle().declare_type(LogicalType::Boolean).unwrap(), "NUMBER(1)");
        assert_eq!(oracle().declare_type(LogicalType::String).unwrap(), "VARCHAR2(255)");
    }

    #[test]
    fn test_identity_is_emulated() {
        let table = Table::new("users")
            .column(Column::new("id", LogicalType::Integer).autoincrement())
            .primary_key(["id"]);
        let sql = oracle().create_table_sql(&table, CreateFlags::default()).unwrap();
        assert_eq!(sql.len(), 3);
        assert_eq!(sql[0], "CREATE TABLE users (id NUMBER(10) NOT NULL, PRIMARY KEY (id))");
        assert_eq!(sql[1], "CREATE SEQUENCE USERS_SEQ START WITH 1 MINVALUE 1 INCREMENT BY 1");
        assert!(sql[2].starts_with("CREATE TRIGGER USERS_AI_PK\nBEFORE INSERT ON users"));
        assert!(sql[2].contains("SELECT USERS_SEQ.NEXTVAL INTO :NEW.id FROM DUAL;"));
    }

    #[test]
    fn test_emulation_names_are_truncated() {
        let table = format!("{}_table", "x".repeat(30));
        let sequence = OracleDialect::sequence_name(&oracle(), &table).unwrap();
        assert_eq!(sequence.len(), 30);
    }

    #[test]
    fn test_alter_uses_parenthesized_clauses() {
        let diff = TableDiff::new("users")
            .add_column(Column::new("age", LogicalType::SmallInt))
            .remove_column(Column::new("legacy", LogicalType::Integer))
            .change_column(ColumnDiff::new(
                "name",
                Column::new("name", LogicalType::String)
                    .length(100)
                    .default_value(DefaultValue::String("n/a".to_string())),
                [ColumnProperty::Length, ColumnProperty::Default],
            ));
        assert_eq!(
            oracle().alter_table_sql(&diff).unwrap(),
            [
                "ALTER TABLE users ADD (age NUMBER(5))",
                "ALTER TABLE users DROP (legacy)",
                "ALTER TABLE users MODIFY (name VARCHAR2(100) DEFAULT 'n/a')",
            ]
        );
    }

    #[test]
    fn test_foreign_key_drops_on_update() {
        let fk = ForeignKey::new(["user_id"], "users", ["id"])
            .named("fk_user")
            .on_update(ReferentialAction::Cascade)
            .on_delete(ReferentialAction::SetNull);
        assert_eq!(
            oracle().create_foreign_key_sql("posts", &fk).unwrap(),
            "ALTER TABLE posts ADD CONSTRAINT fk_user FOREIGN KEY (user_id) REFERENCES users (id) \
             ON DELETE SET NULL"
        );
    }

    #[test]
    fn test_expressions() {
        let dialect = OracleDialect;
        assert!(dialect.pi_expression().is_err());
        assert_eq!(
            dialect
                .date_sub_expression("d", "2", DateIntervalUnit::Quarter)
                .unwrap(),
            "ADD_MONTHS(d, -6)"
        );
        assert_eq!(
            dialect
                .date_add_expression("d", "2", DateIntervalUnit::Week)
                .unwrap(),
            "d + 14"
        );
        assert_eq!(dialect.bit_and_expression("a", "b"), "BITAND(a, b)");
        assert_eq!(oracle().dummy_select_sql("1"), "SELECT 1 FROM DUAL");
    }

    #[test]
    fn test_rownum_limit() {
        assert_eq!(
            oracle()
                .modify_limit_query("SELECT * FROM t", Some(10), Some(20))
                .unwrap(),
            "SELECT * FROM (SELECT a.*, ROWNUM AS doctrine_rownum FROM (SELECT * FROM t) a \
             WHERE ROWNUM <= 30) WHERE doctrine_rownum >= 21"
        );
    }
}
