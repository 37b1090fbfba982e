//! Informix.

use crate::capabilities::Capabilities;
use crate::ddl::{AlterPiece, DdlDialect};
use crate::error::{PlatformError, Result};
use crate::expression::{DateIntervalUnit, DateOperator, ExpressionTranslator};
use crate::limit::LimitStrategy;
use crate::platform::{DateFormats, Platform, Vendor};
use crate::schema::{Column, ColumnDiff, ColumnProperty, ForeignKey, Index, TableDiff};
use crate::session::{SessionSql, TransactionIsolation};
use crate::types::{LogicalType, TypeMapper};

const VARCHAR_LIMIT: u32 = 255;
const ONE_ROW: &str = "systables WHERE tabid = 1";

/// Informix dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InformixDialect;

impl InformixDialect {
    /// Capability flags.
    #[must_use]
    pub const fn capabilities(&self) -> Capabilities {
        Capabilities {
            supports_sequences: true,
            supports_identity_columns: true,
            prefers_identity_columns: true,
            supports_foreign_key_on_update: false,
            supports_rename_index: true,
            max_identifier_length: 128,
            varchar_max_length: 32_739,
            ..Capabilities::ansi()
        }
    }

    /// Assembles the platform.
    #[must_use]
    pub fn platform(self) -> Platform {
        Platform::new(self, self.capabilities(), LimitStrategy::SkipLimit)
    }
}

impl Vendor for InformixDialect {
    fn name(&self) -> &'static str {
        "informix"
    }
}

impl TypeMapper for InformixDialect {
    fn smallint_declaration(&self, column: &Column) -> String {
        if column.autoincrement {
            "SERIAL".to_string()
        } else {
            "SMALLINT".to_string()
        }
    }

    fn integer_declaration(&self, column: &Column) -> String {
        if column.autoincrement {
            "SERIAL".to_string()
        } else {
            "INTEGER".to_string()
        }
    }

    fn bigint_declaration(&self, column: &Column) -> String {
        if column.autoincrement {
            "BIGSERIAL".to_string()
        } else {
            "BIGINT".to_string()
        }
    }

    fn decimal_declaration(&self, precision: u32, scale: u32) -> String {
        format!("DECIMAL({precision}, {scale})")
    }

    fn float_declaration(&self, _column: &Column) -> String {
        "FLOAT".to_string()
    }

    fn small_float_declaration(&self, _column: &Column) -> String {
        "SMALLFLOAT".to_string()
    }

    fn varchar_declaration(&self, length: u32, fixed: bool) -> String {
        if fixed {
            format!("CHAR({length})")
        } else if length <= VARCHAR_LIMIT {
            format!("VARCHAR({length})")
        } else {
            format!("LVARCHAR({length})")
        }
    }

    fn binary_declaration(&self, _length: u32, _fixed: bool) -> String {
        "BYTE".to_string()
    }

    fn time_declaration(&self, _column: &Column) -> String {
        "DATETIME HOUR TO SECOND".to_string()
    }

    fn datetime_declaration(&self, _column: &Column) -> String {
        "DATETIME YEAR TO SECOND".to_string()
    }

    fn datetimetz_declaration(&self, _column: &Column) -> String {
        "DATETIME YEAR TO SECOND".to_string()
    }

    fn boolean_literal(&self, value: bool) -> &'static str {
        if value {
            "'t'"
        } else {
            "'f'"
        }
    }

    fn date_formats(&self) -> DateFormats {
        DateFormats {
            date_time_tz: "%Y-%m-%d %H:%M:%S".to_string(),
            ..DateFormats::default()
        }
    }

    fn native_type_names(&self) -> Vec<(&'static str, LogicalType)> {
        vec![
            ("boolean", LogicalType::Boolean),
            ("smallint", LogicalType::SmallInt),
            ("integer", LogicalType::Integer),
            ("int", LogicalType::Integer),
            ("serial", LogicalType::Integer),
            ("bigint", LogicalType::BigInt),
            ("int8", LogicalType::BigInt),
            ("serial8", LogicalType::BigInt),
            ("bigserial", LogicalType::BigInt),
            ("decimal", LogicalType::Decimal),
            ("money", LogicalType::Decimal),
            ("float", LogicalType::Float),
            ("smallfloat", LogicalType::SmallFloat),
            ("char", LogicalType::String),
            ("nchar", LogicalType::String),
            ("varchar", LogicalType::String),
            ("nvarchar", LogicalType::String),
            ("lvarchar", LogicalType::String),
            ("text", LogicalType::Text),
            ("clob", LogicalType::Text),
            ("byte", LogicalType::Blob),
            ("blob", LogicalType::Blob),
            ("date", LogicalType::Date),
            ("datetime", LogicalType::DateTime),
        ]
    }
}

impl ExpressionTranslator for InformixDialect {
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

    fn length_expression(&self, string: &str) -> String {
        format!("CHAR_LENGTH({string})")
    }

    fn date_diff_expression(&self, date1: &str, date2: &str) -> Result<String> {
        Ok(format!("(DATE({date1}) - DATE({date2}))"))
    }

    fn date_arithmetic_expression(
        &self,
        date: &str,
        operator: DateOperator,
        interval: &str,
        unit: DateIntervalUnit,
    ) -> Result<String> {
        let (unit, interval) = unit.fold_quarter(interval);
        let (unit, interval) = unit.fold_week(&interval);
        Ok(format!(
            "({date} {} ({interval}) UNITS {})",
            operator.as_sql(),
            unit.as_sql()
        ))
    }

    fn bit_and_expression(&self, a: &str, b: &str) -> String {
        format!("BITAND({a}, {b})")
    }

    fn bit_or_expression(&self, a: &str, b: &str) -> String {
        format!("BITOR({a}, {b})")
    }

    fn md5_expression(&self, _string: &str) -> Result<String> {
        Err(PlatformError::unsupported(self.name(), "MD5"))
    }

    fn pi_expression(&self) -> Result<String> {
        Err(PlatformError::unsupported(self.name(), "PI()"))
    }

    fn current_timestamp_sql(&self) -> &'static str {
        "CURRENT YEAR TO SECOND"
    }

    fn current_date_sql(&self) -> &'static str {
        "TODAY"
    }

    fn current_time_sql(&self) -> &'static str {
        "CURRENT HOUR TO SECOND"
    }
}

impl DdlDialect for InformixDialect {
    fn foreign_key_declaration(&self, platform: &Platform, fk: &ForeignKey) -> String {
        let mut sql = format!(
            "FOREIGN KEY ({}) REFERENCES {} ({})",
            fk.local_columns.join(", "),
            platform.table_name(&fk.foreign_table),
            fk.foreign_columns.join(", ")
        );
        sql.push_str(&self.foreign_key_options_sql(platform, fk));
        if let Some(ref name) = fk.name {
            sql.push_str(&format!(" CONSTRAINT {name}"));
        }
        sql
    }

    fn create_foreign_key_sql(&self, platform: &Platform, table: &str, fk: &ForeignKey) -> String {
        format!(
            "ALTER TABLE {table} ADD CONSTRAINT {}",
            self.foreign_key_declaration(platform, fk)
        )
    }

    fn rename_index_sql(
        &self,
        _platform: &Platform,
        _table: &str,
        old_name: &str,
        index: &Index,
    ) -> Result<Vec<String>> {
        Ok(vec![format!("RENAME INDEX {old_name} TO {}", index.name)])
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
        _diff: &TableDiff,
        change: &ColumnDiff,
    ) -> Result<Vec<AlterPiece>> {
        let redefines = change
            .changed_properties
            .iter()
            .any(|p| *p != ColumnProperty::Comment);
        if !redefines {
            return Ok(Vec::new());
        }
        let column = Column {
            name: change.old_name.clone(),
            ..change.column.clone()
        };
        Ok(vec![AlterPiece::Clause(format!(
            "MODIFY ({})",
            self.column_declaration(platform, &column)?
        ))])
    }

    fn rename_column_pieces(
        &self,
        platform: &Platform,
        diff: &TableDiff,
        old_name: &str,
        column: &Column,
    ) -> Result<Vec<AlterPiece>> {
        Ok(vec![AlterPiece::Statement(format!(
            "RENAME COLUMN {}.{old_name} TO {}",
            platform.table_name(&diff.name),
            column.name
        ))])
    }

    fn rename_table_sql(
        &self,
        platform: &Platform,
        diff: &TableDiff,
        new_name: &str,
    ) -> Result<Vec<String>> {
        Ok(vec![format!(
            "RENAME TABLE {} TO {new_name}",
            platform.table_name(&diff.name)
        )])
    }

    fn sequence_next_val_sql(&self, _platform: &Platform, name: &str) -> String {
        format!("SELECT {name}.NEXTVAL FROM {ONE_ROW}")
    }
}

impl SessionSql for InformixDialect {
    fn transaction_isolation_sql(&self, level: TransactionIsolation) -> String {
        let level = match level {
            TransactionIsolation::ReadUncommitted => "DIRTY READ",
            TransactionIsolation::ReadCommitted => "COMMITTED READ",
            TransactionIsolation::RepeatableRead | TransactionIsolation::Serializable => {
                "REPEATABLE READ"
            }
        };
        format!("SET ISOLATION TO {level}")
    }

    fn dummy_select_sql(&self, expression: &str) -> String {
        format!("SELECT {expression} FROM {ONE_ROW}")
    }
}
