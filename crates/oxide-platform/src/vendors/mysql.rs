//! MySQL 5.6, 5.7 and 8.0.

use crate::capabilities::{Capabilities, IdentifierQuote};
use crate::ddl::{AlterPiece, DdlDialect};
use crate::error::Result;
use crate::expression::{DateIntervalUnit, DateOperator, ExpressionTranslator};
use crate::limit::{LimitStrategy, OffsetOnly, MYSQL_MAX_ROWS};
use crate::platform::{Platform, Vendor};
use crate::schema::{Column, ColumnDiff, ForeignKey, Index, Table, TableDiff};
use crate::session::{SessionSql, TransactionIsolation};
use crate::types::{LogicalType, TypeMapper};

const TINY: u32 = 255;
const SMALL: u32 = 65_535;
const MEDIUM: u32 = 16_777_215;

/// MySQL dialect; versions differ by flags, not by type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MySqlDialect {
    name: &'static str,
    native_json: bool,
    rename_index: bool,
    default_charset: &'static str,
    default_collation: &'static str,
}

impl MySqlDialect {
    /// MySQL 5.6.
    pub const MYSQL56: Self = Self {
        name: "mysql",
        native_json: false,
        rename_index: false,
        default_charset: "utf8",
        default_collation: "utf8_unicode_ci",
    };

    /// MySQL 5.7: native JSON and RENAME INDEX.
    pub const MYSQL57: Self = Self {
        name: "mysql57",
        native_json: true,
        rename_index: true,
        ..Self::MYSQL56
    };

    /// MySQL 8.0: utf8mb4 by default.
    pub const MYSQL80: Self = Self {
        name: "mysql80",
        default_charset: "utf8mb4",
        default_collation: "utf8mb4_unicode_ci",
        ..Self::MYSQL57
    };

    /// Capability flags of this version.
    #[must_use]
    pub const fn capabilities(&self) -> Capabilities {
        Capabilities {
            supports_identity_columns: true,
            prefers_identity_columns: true,
            supports_inline_column_comments: true,
            supports_column_collation: true,
            supports_rename_index: self.rename_index,
            max_identifier_length: 64,
            varchar_max_length: SMALL,
            binary_max_length: SMALL,
            identifier_quote: IdentifierQuote::BACKTICK,
            ..Capabilities::ansi()
        }
    }

    /// Assembles the platform.
    #[must_use]
    pub fn platform(self) -> Platform {
        Platform::new(
            self,
            self.capabilities(),
            LimitStrategy::Native(OffsetOnly::MaxRows(MYSQL_MAX_ROWS)),
        )
    }
}

fn sized_text(prefix: &str, length: Option<u32>) -> String {
    match length {
        Some(n) if n > 0 && n <= TINY => format!("TINY{prefix}"),
        Some(n) if n > 0 && n <= SMALL => prefix.to_string(),
        Some(n) if n > 0 && n <= MEDIUM => format!("MEDIUM{prefix}"),
        _ => format!("LONG{prefix}"),
    }
}

impl Vendor for MySqlDialect {
    fn name(&self) -> &'static str {
        self.name
    }
}

impl TypeMapper for MySqlDialect {
    fn supports_type(&self, _logical_type: LogicalType) -> bool {
        true
    }

    fn integer_modifiers(&self, column: &Column) -> String {
        let mut sql = String::new();
        if column.unsigned {
            sql.push_str(" UNSIGNED");
        }
        if column.autoincrement {
            sql.push_str(" AUTO_INCREMENT");
        }
        sql
    }

    fn small_float_declaration(&self, _column: &Column) -> String {
        "FLOAT".to_string()
    }

    fn clob_declaration(&self, column: &Column) -> String {
        sized_text("TEXT", column.length)
    }

    fn blob_declaration(&self, column: &Column) -> String {
        sized_text("BLOB", column.length)
    }

    fn boolean_declaration(&self, _column: &Column) -> String {
        "TINYINT(1)".to_string()
    }

    fn datetime_declaration(&self, _column: &Column) -> String {
        "DATETIME".to_string()
    }

    fn datetimetz_declaration(&self, _column: &Column) -> String {
        "DATETIME".to_string()
    }

    fn json_declaration(&self, column: &Column) -> String {
        if self.native_json {
            "JSON".to_string()
        } else {
            self.clob_declaration(column)
        }
    }

    fn boolean_literal(&self, value: bool) -> &'static str {
        if value {
            "1"
        } else {
            "0"
        }
    }

    fn native_type_names(&self) -> Vec<(&'static str, LogicalType)> {
        let mut names = vec![
            ("tinyint", LogicalType::Boolean),
            ("smallint", LogicalType::SmallInt),
            ("mediumint", LogicalType::Integer),
            ("int", LogicalType::Integer),
            ("integer", LogicalType::Integer),
            ("bigint", LogicalType::BigInt),
            ("decimal", LogicalType::Decimal),
            ("numeric", LogicalType::Decimal),
            ("double", LogicalType::Float),
            ("double precision", LogicalType::Float),
            ("real", LogicalType::Float),
            ("float", LogicalType::SmallFloat),
            ("char", LogicalType::String),
            ("varchar", LogicalType::String),
            ("tinytext", LogicalType::Text),
            ("text", LogicalType::Text),
            ("mediumtext", LogicalType::Text),
            ("longtext", LogicalType::Text),
            ("binary", LogicalType::Binary),
            ("varbinary", LogicalType::Binary),
            ("tinyblob", LogicalType::Blob),
            ("blob", LogicalType::Blob),
            ("mediumblob", LogicalType::Blob),
            ("longblob", LogicalType::Blob),
            ("date", LogicalType::Date),
            ("time", LogicalType::Time),
            ("datetime", LogicalType::DateTime),
            ("timestamp", LogicalType::DateTime),
            ("year", LogicalType::Date),
            ("enum", LogicalType::Enum),
        ];
        if self.native_json {
            names.push(("json", LogicalType::Json));
        }
        names
    }
}

impl ExpressionTranslator for MySqlDialect {
    fn substring_expression(&self, string: &str, start: &str, length: Option<&str>) -> String {
        match length {
            Some(length) => format!("SUBSTRING({string}, {start}, {length})"),
            None => format!("SUBSTRING({string}, {start})"),
        }
    }

    fn locate_expression(
        &self,
        string: &str,
        substring: &str,
        start: Option<&str>,
    ) -> Result<String> {
        Ok(match start {
            Some(start) => format!("LOCATE({substring}, {string}, {start})"),
            None => format!("LOCATE({substring}, {string})"),
        })
    }

    fn concat_expression(&self, parts: &[&str]) -> String {
        format!("CONCAT({})", parts.join(", "))
    }

    fn date_diff_expression(&self, date1: &str, date2: &str) -> Result<String> {
        Ok(format!("DATEDIFF({date1}, {date2})"))
    }

    fn date_arithmetic_expression(
        &self,
        date: &str,
        operator: DateOperator,
        interval: &str,
        unit: DateIntervalUnit,
    ) -> Result<String> {
        let function = match operator {
            DateOperator::Add => "DATE_ADD",
            DateOperator::Sub => "DATE_SUB",
        };
        Ok(format!("{function}({date}, INTERVAL {interval} {})", unit.as_sql()))
    }

    fn guid_expression(&self) -> Result<String> {
        Ok("UUID()".to_string())
    }

    fn quote_string_literal(&self, value: &str) -> String {
        format!("'{}'", value.replace('\\', "\\\\").replace('\'', "''"))
    }
}

impl DdlDialect for MySqlDialect {
    fn column_collation_sql(&self, column: &Column) -> String {
        let mut sql = String::new();
        if let Some(ref charset) = column.charset {
            sql.push_str(&format!(" CHARACTER SET {charset}"));
        }
        if let Some(ref collation) = column.collation {
            sql.push_str(&format!(" COLLATE {collation}"));
        }
        sql
    }

    fn table_options_sql(&self, platform: &Platform, table: &Table) -> String {
        let option = |key: &str, default: &'static str| {
            table
                .options
                .get(key)
                .map_or(default, String::as_str)
                .to_string()
        };
        let mut sql = format!(
            " DEFAULT CHARACTER SET {} COLLATE {} ENGINE = {}",
            option("charset", self.default_charset),
            option("collate", self.default_collation),
            option("engine", "InnoDB")
        );
        if let Some(comment) = table.comment.as_deref().filter(|c| !c.is_empty()) {
            sql.push_str(&format!(" COMMENT = {}", platform.quote_string_literal(comment)));
        }
        sql
    }

    fn index_kind_sql(&self, index: &Index) -> String {
        if index.has_flag("fulltext") {
            "FULLTEXT ".to_string()
        } else if index.has_flag("spatial") {
            "SPATIAL ".to_string()
        } else if index.unique {
            "UNIQUE ".to_string()
        } else {
            String::new()
        }
    }

    fn drop_index_sql(&self, _platform: &Platform, table: &str, index: &Index) -> String {
        if index.primary {
            format!("ALTER TABLE {table} DROP PRIMARY KEY")
        } else {
            format!("DROP INDEX {} ON {table}", index.name)
        }
    }

    fn rename_index_sql(
        &self,
        platform: &Platform,
        table: &str,
        old_name: &str,
        index: &Index,
    ) -> Result<Vec<String>> {
        if self.rename_index && !index.primary {
            return Ok(vec![format!(
                "ALTER TABLE {table} RENAME INDEX {old_name} TO {}",
                index.name
            )]);
        }
        let old = Index {
            name: old_name.to_string(),
            ..index.clone()
        };
        Ok(vec![
            self.drop_index_sql(platform, table, &old),
            self.create_index_sql(platform, table, index)?,
        ])
    }

    fn drop_foreign_key_sql(
        &self,
        _platform: &Platform,
        table: &str,
        fk: &ForeignKey,
    ) -> Result<String> {
        Ok(format!("ALTER TABLE {table} DROP FOREIGN KEY {}", fk.require_name()?))
    }

    fn truncate_table_sql(&self, _platform: &Platform, table: &str, _cascade: bool) -> String {
        format!("TRUNCATE TABLE {table}")
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
        let column = Column {
            name: change.old_name.clone(),
            ..change.column.clone()
        };
        Ok(vec![AlterPiece::Clause(format!(
            "CHANGE {} {}",
            change.old_name,
            self.column_declaration(platform, &column)?
        ))])
    }

    fn rename_column_pieces(
        &self,
        platform: &Platform,
        _diff: &TableDiff,
        old_name: &str,
        column: &Column,
    ) -> Result<Vec<AlterPiece>> {
        Ok(vec![AlterPiece::Clause(format!(
            "CHANGE {old_name} {}",
            self.column_declaration(platform, column)?
        ))])
    }

    fn drop_database_sql(&self, _platform: &Platform, name: &str) -> Result<String> {
        Ok(format!("DROP DATABASE {name}"))
    }
}

impl SessionSql for MySqlDialect {
    fn transaction_isolation_sql(&self, level: TransactionIsolation) -> String {
        format!("SET SESSION TRANSACTION ISOLATION LEVEL {}", level.as_sql())
    }
}
