//! SQLite 3.

use tracing::debug;

use crate::capabilities::Capabilities;
use crate::ddl::{alter_table_statements, CreateFlags, DdlDialect};
use crate::error::{PlatformError, Result};
use crate::expression::{DateIntervalUnit, DateOperator, ExpressionTranslator, TrimMode};
use crate::limit::{LimitStrategy, OffsetOnly};
use crate::platform::{Platform, Vendor};
use crate::schema::{Column, Index, Table, TableDiff};
use crate::session::{SessionSql, TransactionIsolation};
use crate::types::{LogicalType, TypeMapper};

/// SQLite dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SqliteDialect;

impl SqliteDialect {
    /// Capability flags.
    #[must_use]
    pub const fn capabilities(&self) -> Capabilities {
        Capabilities {
            supports_identity_columns: true,
            prefers_identity_columns: true,
            supports_alter_foreign_keys: false,
            can_emulate_schemas: true,
            supports_partial_indexes: true,
            max_identifier_length: 1024,
            ..Capabilities::ansi()
        }
    }

    /// Assembles the platform.
    #[must_use]
    pub fn platform(self) -> Platform {
        Platform::new(
            self,
            self.capabilities(),
            LimitStrategy::Native(OffsetOnly::MaxRows("-1")),
        )
    }

    fn integer(column: &Column, plain: &str) -> String {
        if column.autoincrement {
            "INTEGER PRIMARY KEY AUTOINCREMENT".to_string()
        } else {
            plain.to_string()
        }
    }

    /// Whether `ALTER TABLE` can express the diff without rebuilding the table.
    fn is_simple_alter(diff: &TableDiff) -> bool {
        diff.changed_columns.is_empty()
            && diff.removed_columns.is_empty()
            && diff.renamed_columns.is_empty()
            && diff.added_indexes.is_empty()
            && diff.changed_indexes.is_empty()
            && diff.removed_indexes.is_empty()
            && diff.renamed_indexes.is_empty()
            && diff.added_foreign_keys.is_empty()
            && diff.changed_foreign_keys.is_empty()
            && diff.removed_foreign_keys.is_empty()
            && diff
                .added_columns
                .iter()
                .all(|c| !c.autoincrement && !(c.notnull && c.default.is_none()))
    }

    /// Rebuilds the table: copy rows aside, recreate, copy back.
    fn recreate_table_sql(
        &self,
        platform: &Platform,
        diff: &TableDiff,
        from: &Table,
    ) -> Result<Vec<String>> {
        let table = platform.table_name(&diff.name);
        let temp = format!("__temp__{}", table.replace('.', "_"));
        let target = from.apply(diff);

        let mut old_columns = Vec::new();
        let mut new_columns = Vec::new();
        for column in &from.columns {
            if diff.removed_columns.iter().any(|r| r.name == column.name) {
                continue;
            }
            let new_name = diff
                .renamed_columns
                .iter()
                .find(|r| r.old_name == column.name)
                .map_or(column.name.as_str(), |r| r.column.name.as_str());
            if target.get_column(new_name).is_some() {
                old_columns.push(column.name.as_str());
                new_columns.push(new_name);
            }
        }

        let mut sql: Vec<String> = from
            .indexes
            .iter()
            .filter(|i| !i.primary)
            .map(|i| self.drop_index_sql(platform, &table, i))
            .collect();
        sql.push(format!(
            "CREATE TEMPORARY TABLE {temp} AS SELECT {} FROM {table}",
            old_columns.join(", ")
        ));
        sql.push(format!("DROP TABLE {table}"));

        let staged = Table {
            name: diff.name.clone(),
            ..target.clone()
        };
        sql.extend(
            platform
                .without_events()
                .create_table_sql(&staged, CreateFlags::CREATE_FOREIGNKEYS)?,
        );
        sql.push(format!(
            "INSERT INTO {table} ({}) SELECT {} FROM {temp}",
            new_columns.join(", "),
            old_columns.join(", ")
        ));
        sql.push(format!("DROP TABLE {temp}"));

        let final_name = platform.table_name(&target.name);
        if diff.new_name.is_some() {
            sql.extend(self.rename_table_sql(platform, diff, &final_name)?);
        }
        for index in target.indexes.iter().filter(|i| !i.primary) {
            sql.push(self.create_index_sql(platform, &final_name, index)?);
        }

        debug!(table = %table, statements = sql.len(), "rebuilt sqlite table");
        Ok(sql)
    }
}

impl Vendor for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }
}

impl TypeMapper for SqliteDialect {
    fn smallint_declaration(&self, column: &Column) -> String {
        Self::integer(column, "SMALLINT")
    }

    fn integer_declaration(&self, column: &Column) -> String {
        Self::integer(column, "INTEGER")
    }

    fn bigint_declaration(&self, column: &Column) -> String {
        Self::integer(column, "BIGINT")
    }

    fn datetime_declaration(&self, _column: &Column) -> String {
        "DATETIME".to_string()
    }

    fn datetimetz_declaration(&self, _column: &Column) -> String {
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
            ("boolean", LogicalType::Boolean),
            ("tinyint", LogicalType::Boolean),
            ("smallint", LogicalType::SmallInt),
            ("int", LogicalType::Integer),
            ("integer", LogicalType::Integer),
            ("mediumint", LogicalType::Integer),
            ("bigint", LogicalType::BigInt),
            ("numeric", LogicalType::Decimal),
            ("decimal", LogicalType::Decimal),
            ("double", LogicalType::Float),
            ("double precision", LogicalType::Float),
            ("float", LogicalType::Float),
            ("real", LogicalType::SmallFloat),
            ("char", LogicalType::String),
            ("varchar", LogicalType::String),
            ("nvarchar", LogicalType::String),
            ("text", LogicalType::Text),
            ("clob", LogicalType::Text),
            ("blob", LogicalType::Blob),
            ("date", LogicalType::Date),
            ("time", LogicalType::Time),
            ("datetime", LogicalType::DateTime),
            ("timestamp", LogicalType::DateTime),
        ]
    }
}

impl ExpressionTranslator for SqliteDialect {
    fn substring_expression(&self, string: &str, start: &str, length: Option<&str>) -> String {
        match length {
            Some(length) => format!("SUBSTR({string}, {start}, {length})"),
            None => format!("SUBSTR({string}, {start}, LENGTH({string}))"),
        }
    }

    fn locate_expression(
        &self,
        string: &str,
        substring: &str,
        start: Option<&str>,
    ) -> Result<String> {
        match start {
            None => Ok(format!("INSTR({string}, {substring})")),
            Some(start) => {
                let found = format!("INSTR(SUBSTR({string}, {start}), {substring})");
                Ok(format!(
                    "CASE WHEN {found} = 0 THEN 0 ELSE {found} + {start} - 1 END"
                ))
            }
        }
    }

    fn trim_expression(&self, string: &str, mode: TrimMode, chars: Option<&str>) -> String {
        let function = match mode {
            TrimMode::Leading => "LTRIM",
            TrimMode::Trailing => "RTRIM",
            TrimMode::Unspecified | TrimMode::Both => "TRIM",
        };
        match chars {
            Some(chars) => format!("{function}({string}, {chars})"),
            None => format!("{function}({string})"),
        }
    }

    fn mod_expression(&self, dividend: &str, divisor: &str) -> String {
        format!("({dividend} % {divisor})")
    }

    fn date_diff_expression(&self, date1: &str, date2: &str) -> Result<String> {
        Ok(format!(
            "JULIANDAY({date1}, 'start of day') - JULIANDAY({date2}, 'start of day')"
        ))
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
            "DATETIME({date}, '{}' || {interval} || ' {}')",
            operator.as_sql(),
            unit.as_sql().to_ascii_lowercase()
        ))
    }

    fn md5_expression(&self, _string: &str) -> Result<String> {
        Err(PlatformError::unsupported(self.name(), "MD5"))
    }
}

impl DdlDialect for SqliteDialect {
    fn primary_key_clause(
        &self,
        _platform: &Platform,
        table: &Table,
        primary: &Index,
    ) -> Option<String> {
        let inline = primary.columns.iter().any(|name| {
            table
                .get_column(name)
                .is_some_and(|c| c.autoincrement)
        });
        if inline {
            None
        } else {
            Some(format!("PRIMARY KEY ({})", primary.columns.join(", ")))
        }
    }

    fn truncate_table_sql(&self, _platform: &Platform, table: &str, _cascade: bool) -> String {
        format!("DELETE FROM {table}")
    }

    fn add_column_clause(&self, platform: &Platform, column: &Column) -> Result<String> {
        Ok(format!("ADD COLUMN {}", self.column_declaration(platform, column)?))
    }

    fn alter_table_sql(&self, platform: &Platform, diff: &TableDiff) -> Result<Vec<String>> {
        if Self::is_simple_alter(diff) {
            return alter_table_statements(self, platform, diff);
        }
        let from = diff.from_table.as_ref().ok_or_else(|| {
            PlatformError::unsupported(
                self.name(),
                "ALTER TABLE beyond ADD COLUMN without the current table definition",
            )
        })?;
        self.recreate_table_sql(platform, diff, from)
    }

    fn create_database_sql(&self, _platform: &Platform, _name: &str) -> Result<String> {
        Err(PlatformError::unsupported(self.name(), "CREATE DATABASE"))
    }

    fn drop_database_sql(&self, _platform: &Platform, _name: &str) -> Result<String> {
        Err(PlatformError::unsupported(self.name(), "DROP DATABASE"))
    }
}

impl SessionSql for SqliteDialect {
    fn transaction_isolation_sql(&self, level: TransactionIsolation) -> String {
        let uncommitted = u8::from(level == TransactionIsolation::ReadUncommitted);
        format!("PRAGMA read_uncommitted = {uncommitted}")
    }

    fn for_update_sql(&self) -> &'static str {
        ""
    }
}
