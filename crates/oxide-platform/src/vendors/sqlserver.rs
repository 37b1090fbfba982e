//! SQL Server 2008 and 2012+.

use crate::capabilities::{Capabilities, IdentifierQuote, SavepointSyntax};
use crate::ddl::{AlterPiece, DdlDialect};
use crate::error::{PlatformError, Result};
use crate::expression::{
    pattern_trim_expression, DateIntervalUnit, DateOperator, ExpressionTranslator, TrimMode,
};
use crate::limit::LimitStrategy;
use crate::platform::{DateFormats, Platform, Vendor};
use crate::schema::{Column, ColumnDiff, ColumnProperty, Index, Table, TableDiff};
use crate::session::SessionSql;
use crate::types::{LogicalType, TypeMapper};

const DEFAULT_SCHEMA: &str = "dbo";

/// SQL Server dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SqlServerDialect {
    name: &'static str,
    offset_fetch: bool,
}

impl SqlServerDialect {
    /// SQL Server 2008: TOP with a ROW_NUMBER() CTE.
    pub const MSSQL2008: Self = Self {
        name: "mssql2008",
        offset_fetch: false,
    };

    /// SQL Server 2012+: OFFSET ... FETCH and sequences.
    pub const MSSQL2012: Self = Self {
        name: "mssql2012",
        offset_fetch: true,
    };

    /// Capability flags of this version.
    #[must_use]
    pub const fn capabilities(&self) -> Capabilities {
        Capabilities {
            supports_sequences: self.offset_fetch,
            supports_identity_columns: true,
            prefers_identity_columns: true,
            supports_release_savepoints: false,
            supports_comment_on_statement: true,
            supports_schemas: true,
            supports_partial_indexes: true,
            supports_column_collation: true,
            supports_rename_index: true,
            uses_named_default_constraints: true,
            max_identifier_length: 128,
            binary_max_length: 8000,
            identifier_quote: IdentifierQuote::BRACKET,
            savepoint_syntax: SavepointSyntax::Transaction,
            ..Capabilities::ansi()
        }
    }

    /// Assembles the platform.
    #[must_use]
    pub fn platform(self) -> Platform {
        let limit = if self.offset_fetch {
            LimitStrategy::OffsetFetch
        } else {
            LimitStrategy::TopRowNumber
        };
        Platform::new(self, self.capabilities(), limit)
    }
}

/// `N'...'` literal.
fn unicode_literal(value: &str) -> String {
    format!("N'{}'", value.replace('\'', "''"))
}

/// Splits `schema.table`, defaulting the schema to `dbo`.
fn split_schema(table: &str) -> (&str, &str) {
    table.split_once('.').unwrap_or((DEFAULT_SCHEMA, table))
}

fn extended_property_sql(
    procedure: &str,
    table: &str,
    column: Option<&str>,
    comment: Option<&str>,
) -> String {
    let (schema, table) = split_schema(table);
    let mut sql = format!("EXEC {procedure} N'MS_Description', ");
    if let Some(comment) = comment {
        sql.push_str(&format!("{}, ", unicode_literal(comment)));
    }
    sql.push_str(&format!(
        "N'SCHEMA', {}, N'TABLE', {}",
        unicode_literal(schema),
        unicode_literal(table)
    ));
    if let Some(column) = column {
        sql.push_str(&format!(", N'COLUMN', {}", unicode_literal(column)));
    }
    sql
}

fn sp_rename(object: &str, new_name: &str, kind: Option<&str>) -> String {
    let mut sql = format!(
        "EXEC sp_rename {}, {}",
        unicode_literal(object),
        unicode_literal(new_name)
    );
    if let Some(kind) = kind {
        sql.push_str(&format!(", N'{kind}'"));
    }
    sql
}

impl Vendor for SqlServerDialect {
    fn name(&self) -> &'static str {
        self.name
    }
}

impl TypeMapper for SqlServerDialect {
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

    fn varchar_declaration(&self, length: u32, fixed: bool) -> String {
        if fixed {
            format!("NCHAR({length})")
        } else {
            format!("NVARCHAR({length})")
        }
    }

    fn ascii_string_declaration(&self, length: u32, fixed: bool) -> String {
        if fixed {
            format!("CHAR({length})")
        } else {
            format!("VARCHAR({length})")
        }
    }

    fn clob_declaration(&self, _column: &Column) -> String {
        "VARCHAR(MAX)".to_string()
    }

    fn blob_declaration(&self, _column: &Column) -> String {
        "VARBINARY(MAX)".to_string()
    }

    fn boolean_declaration(&self, _column: &Column) -> String {
        "BIT".to_string()
    }

    fn time_declaration(&self, _column: &Column) -> String {
        "TIME(0)".to_string()
    }

    fn datetime_declaration(&self, _column: &Column) -> String {
        "DATETIME2(6)".to_string()
    }

    fn datetimetz_declaration(&self, _column: &Column) -> String {
        "DATETIMEOFFSET(6)".to_string()
    }

    fn guid_declaration(&self, _column: &Column) -> String {
        "UNIQUEIDENTIFIER".to_string()
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
            date_time: "%Y-%m-%d %H:%M:%S%.6f".to_string(),
            date_time_tz: "%Y-%m-%d %H:%M:%S%.6f %:z".to_string(),
            ..DateFormats::default()
        }
    }

    fn native_type_names(&self) -> Vec<(&'static str, LogicalType)> {
        vec![
            ("bit", LogicalType::Boolean),
            ("tinyint", LogicalType::SmallInt),
            ("smallint", LogicalType::SmallInt),
            ("int", LogicalType::Integer),
            ("bigint", LogicalType::BigInt),
            ("numeric", LogicalType::Decimal),
            ("decimal", LogicalType::Decimal),
            ("money", LogicalType::Decimal),
            ("smallmoney", LogicalType::Decimal),
            ("float", LogicalType::Float),
            ("real", LogicalType::SmallFloat),
            ("char", LogicalType::AsciiString),
            ("varchar", LogicalType::AsciiString),
            ("nchar", LogicalType::String),
            ("nvarchar", LogicalType::String),
            ("text", LogicalType::Text),
            ("ntext", LogicalType::Text),
            ("binary", LogicalType::Binary),
            ("varbinary", LogicalType::Binary),
            ("image", LogicalType::Blob),
            ("date", LogicalType::Date),
            ("time", LogicalType::Time),
            ("datetime", LogicalType::DateTime),
            ("datetime2", LogicalType::DateTime),
            ("smalldatetime", LogicalType::DateTime),
            ("datetimeoffset", LogicalType::DateTimeTz),
            ("uniqueidentifier", LogicalType::Guid),
        ]
    }
}

impl ExpressionTranslator for SqlServerDialect {
    fn substring_expression(&self, string: &str, start: &str, length: Option<&str>) -> String {
        match length {
            Some(length) => format!("SUBSTRING({string}, {start}, {length})"),
            None => format!("SUBSTRING({string}, {start}, LEN({string}) - {start} + 1)"),
        }
    }

    fn locate_expression(
        &self,
        string: &str,
        substring: &str,
        start: Option<&str>,
    ) -> Result<String> {
        Ok(match start {
            Some(start) => format!("CHARINDEX({substring}, {string}, {start})"),
            None => format!("CHARINDEX({substring}, {string})"),
        })
    }

    fn concat_expression(&self, parts: &[&str]) -> String {
        if self.offset_fetch {
            format!("CONCAT({})", parts.join(", "))
        } else {
            parts.join(" + ")
        }
    }

    fn trim_expression(&self, string: &str, mode: TrimMode, chars: Option<&str>) -> String {
        pattern_trim_expression(string, mode, chars)
    }

    fn length_expression(&self, string: &str) -> String {
        format!("LEN({string})")
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
            DateOperator::Sub => match interval.trim().parse::<i64>() {
                Ok(n) => n.saturating_neg().to_string(),
                Err(_) => format!("-({interval})"),
            },
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
        Ok(format!(
            "LOWER(CONVERT(VARCHAR(32), HASHBYTES('MD5', {string}), 2))"
        ))
    }

    fn current_date_sql(&self) -> &'static str {
        "CONVERT(date, GETDATE())"
    }

    fn current_time_sql(&self) -> &'static str {
        "CONVERT(time, GETDATE())"
    }
}

impl SqlServerDialect {
    /// Columns that carry a named default constraint once the diff's
    /// column changes have run.
    fn columns_with_defaults(from: &Table, diff: &TableDiff) -> Vec<Column> {
        from.apply(diff)
            .columns
            .into_iter()
            .filter(|c| c.default.is_some() && !c.autoincrement)
            .collect()
    }
}

impl DdlDialect for SqlServerDialect {
    fn primary_key_clause(
        &self,
        _platform: &Platform,
        _table: &Table,
        primary: &Index,
    ) -> Option<String> {
        let kind = if primary.has_flag("nonclustered") {
            " NONCLUSTERED"
        } else {
            ""
        };
        Some(format!("PRIMARY KEY{kind} ({})", primary.columns.join(", ")))
    }

    fn comment_on_table_sql(&self, _platform: &Platform, table: &str, comment: &str) -> String {
        extended_property_sql("sp_addextendedproperty", table, None, Some(comment))
    }

    fn comment_on_column_sql(
        &self,
        _platform: &Platform,
        table: &str,
        column: &str,
        comment: Option<&str>,
    ) -> String {
        match comment {
            Some(comment) => {
                extended_property_sql("sp_addextendedproperty", table, Some(column), Some(comment))
            }
            None => extended_property_sql("sp_dropextendedproperty", table, Some(column), None),
        }
    }

    fn alter_column_comment_sql(
        &self,
        platform: &Platform,
        table: &str,
        change: &ColumnDiff,
    ) -> String {
        let had_comment = change
            .from_column
            .as_ref()
            .is_some_and(|c| c.comment_text().is_some());
        match change.column.comment_text() {
            Some(comment) if had_comment => extended_property_sql(
                "sp_updateextendedproperty",
                table,
                Some(&change.old_name),
                Some(comment),
            ),
            comment => self.comment_on_column_sql(platform, table, &change.old_name, comment),
        }
    }

    fn index_kind_sql(&self, index: &Index) -> String {
        let mut sql = String::new();
        if index.unique {
            sql.push_str("UNIQUE ");
        }
        if index.has_flag("clustered") {
            sql.push_str("CLUSTERED ");
        } else if index.has_flag("nonclustered") {
            sql.push_str("NONCLUSTERED ");
        }
        sql
    }

    fn drop_index_sql(&self, _platform: &Platform, table: &str, index: &Index) -> String {
        if index.primary {
            format!("ALTER TABLE {table} DROP CONSTRAINT {}", index.name)
        } else {
            format!("DROP INDEX {} ON {table}", index.name)
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
            Some("INDEX"),
        )])
    }

    fn truncate_table_sql(&self, _platform: &Platform, table: &str, _cascade: bool) -> String {
        format!("TRUNCATE TABLE {table}")
    }

    fn change_column_pieces(
        &self,
        platform: &Platform,
        diff: &TableDiff,
        change: &ColumnDiff,
    ) -> Result<Vec<AlterPiece>> {
        if change.has_changed(ColumnProperty::Autoincrement) {
            return Err(PlatformError::unsupported(
                self.name(),
                "changing IDENTITY on an existing column",
            ));
        }

        let table = platform.table_name(&diff.name);
        let column = Column {
            name: change.old_name.clone(),
            autoincrement: false,
            ..change.column.clone()
        };
        let default_changed = change.has_changed(ColumnProperty::Default);
        let retyped = change.declaration_changed() || change.has_changed(ColumnProperty::NotNull);
        let old_default =
            change.old_default_exists() || (change.from_column.is_none() && default_changed);

        let mut pieces = Vec::new();
        if (default_changed || retyped) && old_default {
            pieces.push(AlterPiece::Statement(self.drop_default_constraint_sql(
                platform,
                &table,
                &column.name,
            )));
        }
        if retyped {
            let nullability = if column.notnull { " NOT NULL" } else { " NULL" };
            pieces.push(AlterPiece::Clause(format!(
                "ALTER COLUMN {} {}{nullability}",
                column.name,
                platform.declare_column(&column)?
            )));
        }
        if default_changed || (retyped && old_default) {
            if let Some(stmt) = self.add_default_constraint_sql(platform, &table, &column) {
                pieces.push(AlterPiece::Statement(stmt));
            }
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
        let table = platform.table_name(&diff.name);
        let old_default = diff
            .from_table
            .as_ref()
            .and_then(|t| t.get_column(old_name))
            .map_or(column.default.is_some(), |c| c.default.is_some());

        let mut pieces = Vec::new();
        if old_default {
            pieces.push(AlterPiece::Statement(
                self.drop_default_constraint_sql(platform, &table, old_name),
            ));
        }
        pieces.push(AlterPiece::Statement(sp_rename(
            &format!("{table}.{old_name}"),
            &column.name,
            Some("COLUMN"),
        )));
        if !column.autoincrement {
            if let Some(stmt) = self.add_default_constraint_sql(platform, &table, column) {
                pieces.push(AlterPiece::Statement(stmt));
            }
        }
        Ok(pieces)
    }

    fn rename_table_sql(
        &self,
        platform: &Platform,
        diff: &TableDiff,
        new_name: &str,
    ) -> Result<Vec<String>> {
        let from = diff.from_table.as_ref().ok_or_else(|| {
            PlatformError::unsupported(
                self.name(),
                "renaming a table without the current table definition",
            )
        })?;
        let old_name = platform.table_name(&diff.name);
        let (_, bare_new) = split_schema(new_name);
        let mut sql = vec![sp_rename(&old_name, bare_new, None)];
        for column in Self::columns_with_defaults(from, diff) {
            sql.push(sp_rename(
                &self.default_constraint_name(platform, &old_name, &column.name),
                &self.default_constraint_name(platform, new_name, &column.name),
                Some("OBJECT"),
            ));
        }
        Ok(sql)
    }
}

impl SessionSql for SqlServerDialect {
    fn for_update_sql(&self) -> &'static str {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ddl::CreateFlags;
    use crate::schema::DefaultValue;

    fn mssql() -> Platform {
        SqlServerDialect::MSSQL2012.platform()
    }

    fn df(platform: &Platform, table: &str, column: &str) -> String {
        format!(
            "DF_{}_{}",
            platform.generate_identifier_name(table),
            platform.generate_identifier_name(column)
        )
    }

    #[test]
    fn test_types() {
        let platform = mssql();
        assert_eq!(platform.declare_type(LogicalType::Boolean).unwrap(), "BIT");
        assert_eq!(platform.declare_type(LogicalType::String).unwrap(), "NVARCHAR(255)");
        assert_eq!(
            platform
                .declare_column(&Column::new("n", LogicalType::String).length(4001))
                .unwrap(),
            "VARCHAR(MAX)"
        );
        assert_eq!(platform.declare_type(LogicalType::Guid).unwrap(), "UNIQUEIDENTIFIER");
        assert_eq!(
            platform
                .declare_column(&Column::new("id", LogicalType::Integer).autoincrement())
                .unwrap(),
            "INT IDENTITY"
        );
    }

    #[test]
    fn test_create_table_with_named_defaults() {
        let platform = mssql();
        let table = Table::new("users")
            .column(Column::new("id", LogicalType::Integer).autoincrement())
            .column(
                Column::new("active", LogicalType::Boolean)
                    .not_null()
                    .default_value(DefaultValue::Boolean(true)),
            )
            .primary_key(["id"])
            .index(Index::new("idx_active", ["active"]).flag("nonclustered"));
        let sql = platform.create_table_sql(&table, CreateFlags::default()).unwrap();
        assert_eq!(
            sql,
            [
                "CREATE TABLE users (id INT IDENTITY NOT NULL, active BIT NOT NULL, \
                 PRIMARY KEY (id))"
                    .to_string(),
                format!(
                    "ALTER TABLE users ADD CONSTRAINT {} DEFAULT 1 FOR active",
                    df(&platform, "users", "active")
                ),
                "CREATE NONCLUSTERED INDEX idx_active ON users (active)".to_string(),
            ]
        );
    }

    #[test]
    fn test_rename_column_moves_default_constraint() {
        let platform = mssql();
        let diff = TableDiff::new("users").rename_column(
            "a",
            Column::new("b", LogicalType::Integer).default_value(DefaultValue::Integer(0)),
        );
        assert_eq!(
            platform.alter_table_sql(&diff).unwrap(),
            [
                format!("ALTER TABLE users DROP CONSTRAINT {}", df(&platform, "users", "a")),
                "EXEC sp_rename N'users.a', N'b', N'COLUMN'".to_string(),
                format!(
                    "ALTER TABLE users ADD CONSTRAINT {} DEFAULT 0 FOR b",
                    df(&platform, "users", "b")
                ),
            ]
        );
    }

    #[test]
    fn test_change_column_rebinds_default() {
        let platform = mssql();
        let from = Column::new("qty", LogicalType::Integer).default_value(DefaultValue::Integer(1));
        let to = Column::new("qty", LogicalType::BigInt)
            .not_null()
            .default_value(DefaultValue::Integer(1));
        let change = ColumnDiff::between(&from, &to).unwrap();
        let diff = TableDiff::new("items").change_column(change);
        let name = df(&platform, "items", "qty");
        assert_eq!(
            platform.alter_table_sql(&diff).unwrap(),
            [
                format!("ALTER TABLE items DROP CONSTRAINT {name}"),
                "ALTER TABLE items ALTER COLUMN qty BIGINT NOT NULL".to_string(),
                format!("ALTER TABLE items ADD CONSTRAINT {name} DEFAULT 1 FOR qty"),
            ]
        );
    }

    #[test]
    fn test_rename_table_renames_default_constraints() {
        let platform = mssql();
        let table = Table::new("users").column(
            Column::new("status", LogicalType::String)
                .length(10)
                .default_value(DefaultValue::String("new".to_string())),
        );
        let diff = TableDiff::for_table(&table).rename_to("members");
        assert_eq!(
            platform.alter_table_sql(&diff).unwrap(),
            [
                "EXEC sp_rename N'users', N'members'".to_string(),
                format!(
                    "EXEC sp_rename N'{}', N'{}', N'OBJECT'",
                    df(&platform, "users", "status"),
                    df(&platform, "members", "status")
                ),
            ]
        );
    }

    #[test]
    fn test_rename_table_needs_current_definition() {
        let diff = TableDiff::new("users").rename_to("members");
        assert!(matches!(
            mssql().alter_table_sql(&diff),
            Err(PlatformError::UnsupportedFeature { .. })
        ));
    }

    #[test]
    fn test_comments_use_extended_properties() {
        let platform = mssql();
        let table = Table::new("users")
            .column(Column::new("id", LogicalType::Integer).comment("Key"));
        let sql = platform.create_table_sql(&table, CreateFlags::NONE).unwrap();
        assert_eq!(
            sql[1],
            "EXEC sp_addextendedproperty N'MS_Description', N'Key', N'SCHEMA', N'dbo', \
             N'TABLE', N'users', N'COLUMN', N'id'"
        );
    }

    #[test]
    fn test_expressions() {
        let dialect = SqlServerDialect::MSSQL2012;
        assert_eq!(dialect.length_expression("name"), "LEN(name)");
        assert_eq!(dialect.mod_expression("a", "b"), "a % b");
        assert_eq!(
            dialect
                .date_sub_expression("d", "3", DateIntervalUnit::Month)
                .unwrap(),
            "DATEADD(month, -3, d)"
        );
        assert_eq!(dialect.guid_expression().unwrap(), "NEWID()");
        assert_eq!(
            dialect.locate_expression("s", "'x'", Some("2")).unwrap(),
            "CHARINDEX('x', s, 2)"
        );
    }

    #[test]
    fn test_index_statements() {
        let platform = mssql();
        let index = Index::new("idx_a", ["a"]);
        assert_eq!(platform.drop_index_sql("t", &index), "DROP INDEX idx_a ON t");
        let diff = TableDiff::new("t").rename_index("idx_old", index);
        assert_eq!(
            platform.alter_table_sql(&diff).unwrap(),
            ["EXEC sp_rename N't.idx_old', N'idx_a', N'INDEX'"]
        );
    }

    #[test]
    fn test_limit_per_version() {
        let query = "SELECT * FROM t ORDER BY id";
        assert_eq!(
            mssql().modify_limit_query(query, Some(5), Some(10)).unwrap(),
            "SELECT * FROM t ORDER BY id OFFSET 10 ROWS FETCH NEXT 5 ROWS ONLY"
        );
        let legacy = SqlServerDialect::MSSQL2008.platform();
        assert!(legacy
            .modify_limit_query(query, Some(5), Some(10))
            .unwrap()
            .contains("doctrine_rownum BETWEEN 11 AND 15"));
        assert!(!legacy.capabilities().supports_sequences());
    }
}
