//! Sybase Adaptive Server Enterprise.

use crate::capabilities::{Capabilities, SavepointSyntax};
use crate::ddl::{AlterPiece, DdlDialect};
use crate::error::{PlatformError, Result};
use crate::expression::{
    pattern_trim_expression, DateIntervalUnit, DateOperator, ExpressionTranslator, TrimMode,
};
use crate::limit::LimitStrategy;
use crate::platform::{Platform, Vendor};
use crate::schema::{Column, ColumnDiff, ColumnProperty, ForeignKey, Index, TableDiff};
use crate::session::{SessionSql, TransactionIsolation};
use crate::types::{LogicalType, TypeMapper};

/// Sybase ASE dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SybaseDialect;

impl SybaseDialect {
    /// Capability flags.
    #[must_use]
    pub const fn capabilities(&self) -> Capabilities {
        Capabilities {
            supports_identity_columns: true,
            prefers_identity_columns: true,
            supports_limit_offset: false,
            supports_release_savepoints: false,
            supports_foreign_key_on_update: false,
            supports_rename_index: true,
            max_identifier_length: 255,
            savepoint_syntax: SavepointSyntax::Transaction,
            ..Capabilities::ansi()
        }
    }

    /// Assembles the platform.
    #[must_use]
    pub fn platform(self) -> Platform {
        Platform::new(self, self.capabilities(), LimitStrategy::TopOnly)
    }
}

fn quoted(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn sp_rename(object: &str, new_name: &str, kind: Option<&str>) -> String {
    match kind {
        Some(kind) => format!("EXEC sp_rename {}, {}, '{kind}'", quoted(object), quoted(new_name)),
        None => format!("EXEC sp_rename {}, {}", quoted(object), quoted(new_name)),
    }
}

impl Vendor for SybaseDialect {
    fn name(&self) -> &'static str {
        "sybase"
    }
}

impl TypeMapper for SybaseDialect {
    fn supports_type(&self, logical_type: LogicalType) -> bool {
        !matches!(logical_type, LogicalType::Enum | LogicalType::DateTimeTz)
    }

    fn integer_modifiers(&self, column: &Column) -> String {
        if column.autoincrement {
            " IDENTITY".to_string()
        } else {
            String::new()
        }
    }

    fn float_declaration(&self, _column: &Column) -> String {
        "FLOAT".to_string()
    }

    fn clob_declaration(&self, _column: &Column) -> String {
        "TEXT".to_string()
    }

    fn blob_declaration(&self, _column: &Column) -> String {
        "IMAGE".to_string()
    }

    fn boolean_declaration(&self, _column: &Column) -> String {
        "BIT".to_string()
    }

    fn datetime_declaration(&self, _column: &Column) -> String {
        "DATETIME".to_string()
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
            ("bit", LogicalType::Boolean),
            ("tinyint", LogicalType::SmallInt),
            ("smallint", LogicalType::SmallInt),
            ("int", LogicalType::Integer),
            ("integer", LogicalType::Integer),
            ("bigint", LogicalType::BigInt),
            ("numeric", LogicalType::Decimal),
            ("decimal", LogicalType::Decimal),
            ("money", LogicalType::Decimal),
            ("float", LogicalType::Float),
            ("real", LogicalType::SmallFloat),
            ("char", LogicalType::String),
            ("varchar", LogicalType::String),
            ("univarchar", LogicalType::String),
            ("text", LogicalType::Text),
            ("unitext", LogicalType::Text),
            ("binary", LogicalType::Binary),
            ("varbinary", LogicalType::Binary),
            ("image", LogicalType::Blob),
            ("date", LogicalType::Date),
            ("time", LogicalType::Time),
            ("datetime", LogicalType::DateTime),
            ("smalldatetime", LogicalType::DateTime),
        ]
    }
}

impl ExpressionTranslator for SybaseDialect {
    fn substring_expression(&self, string: &str, start: &str, length: Option<&str>) -> String {
        match length {
            Some(length) => format!("SUBSTRING({string}, {start}, {length})"),
            None => format!("SUBSTRING({string}, {start}, CHAR_LENGTH({string}))"),
        }
    }

    fn locate_expression(
        &self,
        string: &str,
        substring: &str,
        start: Option<&str>,
    ) -> Result<String> {
        Ok(match start {
            None => format!("CHARINDEX({substring}, {string})"),
            Some(start) => {
                let found = format!(
                    "CHARINDEX({substring}, {})",
                    self.substring_expression(string, start, None)
                );
                format!("CASE WHEN {found} = 0 THEN 0 ELSE {found} + {start} - 1 END")
            }
        })
    }

    fn concat_expression(&self, parts: &[&str]) -> String {
        parts.join(" + ")
    }

    fn trim_expression(&self, string: &str, mode: TrimMode, chars: Option<&str>) -> String {
        pattern_trim_expression(string, mode, chars)
    }

    fn length_expression(&self, string: &str) -> String {
        format!("CHAR_LENGTH({string})")
    }

    fn mod_expression(&self, dividend: &str, divisor: &str) -> String {
        format!("{dividend} % {divisor}")
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
        let interval = match operator {
            DateOperator::Add => interval.to_string(),
            DateOperator::Sub => format!("-{interval}"),
        };
        Ok(format!(
            "DATEADD({}, {interval}, {date})",
            unit.as_sql().to_ascii_lowercase()
        ))
    }

    fn guid_expression(&self) -> Result<String> {
        Ok("NEWID()".to_string())
    }

    fn md5_expression(&self, string: &str) -> Result<String> {
        Ok(format!("HASH({string}, 'md5')"))
    }

    fn current_timestamp_sql(&self) -> &'static str {
        "GETDATE()"
    }

    fn current_date_sql(&self) -> &'static str {
        "CURRENT_DATE()"
    }

    fn current_time_sql(&self) -> &'static str {
        "CURRENT_TIME()"
    }
}

impl DdlDialect for SybaseDialect {
    /// Columns are NOT NULL unless declared otherwise, so nullability is
    /// always spelled out.
    fn column_declaration(&self, platform: &Platform, column: &Column) -> Result<String> {
        let mut sql = format!("{} {}", column.name, platform.declare_column(column)?);
        if let Some(default) = self.default_clause(platform, column) {
            sql.push_str(&default);
        }
        if !column.autoincrement {
            sql.push_str(if column.notnull { " NOT NULL" } else { " NULL" });
        }
        if let Some(ref check) = column.check {
            sql.push_str(&format!(" CHECK ({check})"));
        }
        Ok(sql)
    }

    fn foreign_key_options_sql(&self, _platform: &Platform, _fk: &ForeignKey) -> String {
        String::new()
    }

    fn drop_index_sql(&self, _platform: &Platform, table: &str, index: &Index) -> String {
        if index.primary {
            format!("ALTER TABLE {table} DROP CONSTRAINT {}", index.name)
        } else {
            format!("DROP INDEX {table}.{}", index.name)
        }
    }

    fn rename_index_sql(
        &self,
        _platform: &Platform,
        table: &str,
        old_name: &str,
        index: &Index,
    ) -> Result<Vec<String>> {
        Ok(vec![sp_rename(
            &format!("{table}.{old_name}"),
            &index.name,
            Some("index"),
        )])
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
        if change.has_changed(ColumnProperty::Autoincrement) {
            return Err(PlatformError::unsupported(
                self.name(),
                "changing IDENTITY on an existing column",
            ));
        }
        let name = &change.old_name;
        let column = &change.column;
        let mut pieces = Vec::new();
        if change.declaration_changed() || change.has_changed(ColumnProperty::NotNull) {
            let nullability = if column.notnull { "NOT NULL" } else { "NULL" };
            pieces.push(AlterPiece::Clause(format!(
                "MODIFY {name} {} {nullability}",
                platform.declare_column(column)?
            )));
        }
        if change.has_changed(ColumnProperty::Default) {
            let default = column
                .default
                .as_ref()
                .map_or_else(|| "NULL".to_string(), |d| platform.default_value_sql(d));
            pieces.push(AlterPiece::Clause(format!("REPLACE {name} DEFAULT {default}")));
        }
        Ok(pieces)
    }

    fn rename_column_pieces(
        &self,
        platform: &Platform,
        diff: &TableDiff,
        old_name: &str,
        column: &Column,
    ) -> Result<Vec<AlterPiece>> {
        Ok(vec![AlterPiece::Statement(sp_rename(
            &format!("{}.{old_name}", platform.table_name(&diff.name)),
            &column.name,
            None,
        ))])
    }

    fn rename_table_sql(
        &self,
        platform: &Platform,
        diff: &TableDiff,
        new_name: &str,
    ) -> Result<Vec<String>> {
        Ok(vec![sp_rename(&platform.table_name(&diff.name), new_name, None)])
    }
}

impl SessionSql for SybaseDialect {
    fn transaction_isolation_sql(&self, level: TransactionIsolation) -> String {
        let level = match level {
            TransactionIsolation::ReadUncommitted => 0,
            TransactionIsolation::ReadCommitted => 1,
            TransactionIsolation::RepeatableRead => 2,
            TransactionIsolation::Serializable => 3,
        };
        format!("SET TRANSACTION ISOLATION LEVEL {level}")
    }
}
