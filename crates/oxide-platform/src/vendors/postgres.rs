//! PostgreSQL 9.x and 10+.

use crate::capabilities::Capabilities;
use crate::ddl::{AlterPiece, DdlDialect};
use crate::error::Result;
use crate::expression::{DateIntervalUnit, DateOperator, ExpressionTranslator};
use crate::limit::{LimitStrategy, OffsetOnly};
use crate::platform::{Platform, Vendor};
use crate::schema::{Column, ColumnDiff, ColumnProperty, ForeignKey, Index, Sequence, TableDiff};
use crate::session::{SessionSql, TransactionIsolation};
use crate::types::{LogicalType, TypeMapper};

/// PostgreSQL dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostgresDialect {
    name: &'static str,
    identity_columns: bool,
}

impl PostgresDialect {
    /// PostgreSQL 9.x: SERIAL columns.
    pub const POSTGRESQL: Self = Self {
        name: "postgresql",
        identity_columns: false,
    };

    /// PostgreSQL 10+: GENERATED BY DEFAULT AS IDENTITY.
    pub const POSTGRESQL10: Self = Self {
        name: "postgresql10",
        identity_columns: true,
    };

    /// Capability flags of this version.
    #[must_use]
    pub const fn capabilities(&self) -> Capabilities {
        Capabilities {
            supports_sequences: true,
            supports_identity_columns: true,
            prefers_identity_columns: true,
            supports_comment_on_statement: true,
            supports_schemas: true,
            supports_partial_indexes: true,
            supports_rename_index: true,
            max_identifier_length: 63,
            varchar_max_length: 10_485_760,
            binary_max_length: u32::MAX,
            ..Capabilities::ansi()
        }
    }

    /// Assembles the platform.
    #[must_use]
    pub fn platform(self) -> Platform {
        Platform::new(
            self,
            self.capabilities(),
            LimitStrategy::Native(OffsetOnly::OffsetClause),
        )
    }

    fn serial_sequence_name(table: &str, column: &str) -> String {
        let table = table.rsplit('.').next().unwrap_or(table);
        format!("{table}_{column}_seq")
    }
}

impl Vendor for PostgresDialect {
    fn name(&self) -> &'static str {
        self.name
    }
}

impl TypeMapper for PostgresDialect {
    fn smallint_declaration(&self, column: &Column) -> String {
        if column.autoincrement && !self.identity_columns {
            "SMALLSERIAL".to_string()
        } else {
            format!("SMALLINT{}", self.integer_modifiers(column))
        }
    }

    fn integer_declaration(&self, column: &Column) -> String {
        if column.autoincrement && !self.identity_columns {
            "SERIAL".to_string()
        } else {
            format!("INT{}", self.integer_modifiers(column))
        }
    }

    fn bigint_declaration(&self, column: &Column) -> String {
        if column.autoincrement && !self.identity_columns {
            "BIGSERIAL".to_string()
        } else {
            format!("BIGINT{}", self.integer_modifiers(column))
        }
    }

    fn integer_modifiers(&self, column: &Column) -> String {
        if column.autoincrement && self.identity_columns {
            " GENERATED BY DEFAULT AS IDENTITY".to_string()
        } else {
            String::new()
        }
    }

    fn clob_declaration(&self, _column: &Column) -> String {
        "TEXT".to_string()
    }

    fn binary_declaration(&self, _length: u32, _fixed: bool) -> String {
        "BYTEA".to_string()
    }

    fn blob_declaration(&self, _column: &Column) -> String {
        "BYTEA".to_string()
    }

    fn datetime_declaration(&self, _column: &Column) -> String {
        "TIMESTAMP(0) WITHOUT TIME ZONE".to_string()
    }

    fn datetimetz_declaration(&self, _column: &Column) -> String {
        "TIMESTAMP(0) WITH TIME ZONE".to_string()
    }

    fn time_declaration(&self, _column: &Column) -> String {
        "TIME(0) WITHOUT TIME ZONE".to_string()
    }

    fn guid_declaration(&self, _column: &Column) -> String {
        "UUID".to_string()
    }

    fn json_declaration(&self, column: &Column) -> String {
        if column.has_platform_option("jsonb") {
            "JSONB".to_string()
        } else {
            "JSON".to_string()
        }
    }

    fn native_type_names(&self) -> Vec<(&'static str, LogicalType)> {
        vec![
            ("smallint", LogicalType::SmallInt),
            ("int2", LogicalType::SmallInt),
            ("smallserial", LogicalType::SmallInt),
            ("int", LogicalType::Integer),
            ("int4", LogicalType::Integer),
            ("integer", LogicalType::Integer),
            ("serial", LogicalType::Integer),
            ("serial4", LogicalType::Integer),
            ("bigint", LogicalType::BigInt),
            ("int8", LogicalType::BigInt),
            ("bigserial", LogicalType::BigInt),
            ("serial8", LogicalType::BigInt),
            ("decimal", LogicalType::Decimal),
            ("numeric", LogicalType::Decimal),
            ("money", LogicalType::Decimal),
            ("double precision", LogicalType::Float),
            ("float8", LogicalType::Float),
            ("real", LogicalType::SmallFloat),
            ("float4", LogicalType::SmallFloat),
            ("char", LogicalType::String),
            ("bpchar", LogicalType::String),
            ("varchar", LogicalType::String),
            ("character varying", LogicalType::String),
            ("text", LogicalType::Text),
            ("bytea", LogicalType::Blob),
            ("boolean", LogicalType::Boolean),
            ("bool", LogicalType::Boolean),
            ("date", LogicalType::Date),
            ("time", LogicalType::Time),
            ("time without time zone", LogicalType::Time),
            ("timestamp", LogicalType::DateTime),
            ("timestamp without time zone", LogicalType::DateTime),
            ("timestamptz", LogicalType::DateTimeTz),
            ("timestamp with time zone", LogicalType::DateTimeTz),
            ("uuid", LogicalType::Guid),
            ("json", LogicalType::Json),
            ("jsonb", LogicalType::Json),
        ]
    }
}

impl ExpressionTranslator for PostgresDialect {
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
        Ok(format!(
            "({date} {} ({interval} || ' {}')::interval)",
            operator.as_sql(),
            unit.as_sql()
        ))
    }

    fn guid_expression(&self) -> Result<String> {
        Ok("UUID_GENERATE_V4()".to_string())
    }
}

impl DdlDialect for PostgresDialect {
    fn foreign_key_options_sql(&self, platform: &Platform, fk: &ForeignKey) -> String {
        let mut sql = String::new();
        if let Some(match_type) = fk.match_type {
            sql.push_str(&format!(" MATCH {}", match_type.as_sql()));
        }
        if let Some(action) = fk.on_update {
            if platform.capabilities().supports_foreign_key_on_update() {
                sql.push_str(&format!(" ON UPDATE {}", action.as_sql()));
            }
        }
        if let Some(action) = fk.on_delete {
            sql.push_str(&format!(" ON DELETE {}", action.as_sql()));
        }
        if fk.deferrable {
            sql.push_str(" DEFERRABLE");
            if fk.initially_deferred {
                sql.push_str(" INITIALLY DEFERRED");
            } else {
                sql.push_str(" INITIALLY IMMEDIATE");
            }
        }
        sql
    }

    fn drop_index_sql(&self, _platform: &Platform, table: &str, index: &Index) -> String {
        if index.primary {
            let constraint = if index.name == "primary" {
                let bare = table.rsplit('.').next().unwrap_or(table);
                format!("{bare}_pkey")
            } else {
                index.name.clone()
            };
            format!("ALTER TABLE {table} DROP CONSTRAINT {constraint}")
        } else {
            format!("DROP INDEX {}", index.name)
        }
    }

    fn add_column_clause(&self, platform: &Platform, column: &Column) -> Result<String> {
        Ok(format!("ADD COLUMN {}", self.column_declaration(platform, column)?))
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

        if change.declaration_changed() {
            let plain = Column {
                autoincrement: false,
                ..column.clone()
            };
            pieces.push(AlterPiece::Clause(format!(
                "ALTER {name} TYPE {}",
                platform.declare_column(&plain)?
            )));
        }

        if change.has_changed(ColumnProperty::Default) && !column.autoincrement {
            let clause = match column.default {
                Some(ref default) => format!(
                    "ALTER {name} SET DEFAULT {}",
                    platform.default_value_sql(default)
                ),
                None => format!("ALTER {name} DROP DEFAULT"),
            };
            pieces.push(AlterPiece::Clause(clause));
        }

        if change.has_changed(ColumnProperty::NotNull) {
            let action = if column.notnull { "SET" } else { "DROP" };
            pieces.push(AlterPiece::Clause(format!("ALTER {name} {action} NOT NULL")));
        }

        if change.has_changed(ColumnProperty::Autoincrement) {
            let table = platform.table_name(&diff.name);
            if self.identity_columns {
                let clause = if column.autoincrement {
                    format!("ALTER {name} ADD GENERATED BY DEFAULT AS IDENTITY")
                } else {
                    format!("ALTER {name} DROP IDENTITY")
                };
                pieces.push(AlterPiece::Clause(clause));
            } else if column.autoincrement {
                let sequence = Self::serial_sequence_name(&table, name);
                pieces.push(AlterPiece::Statement(format!("CREATE SEQUENCE {sequence}")));
                pieces.push(AlterPiece::Statement(format!(
                    "SELECT setval('{sequence}', (SELECT MAX({name}) FROM {table}))"
                )));
                pieces.push(AlterPiece::Clause(format!(
                    "ALTER {name} SET DEFAULT nextval('{sequence}')"
                )));
            } else {
                pieces.push(AlterPiece::Clause(format!("ALTER {name} DROP DEFAULT")));
            }
        }

        Ok(pieces)
    }

    fn truncate_table_sql(&self, _platform: &Platform, table: &str, cascade: bool) -> String {
        if cascade {
            format!("TRUNCATE {table} CASCADE")
        } else {
            format!("TRUNCATE {table}")
        }
    }

    fn create_sequence_sql(&self, _platform: &Platform, sequence: &Sequence) -> String {
        format!(
            "CREATE SEQUENCE {} INCREMENT BY {} MINVALUE {} START {}{}",
            sequence.name,
            sequence.allocation_size,
            sequence.initial_value,
            sequence.initial_value,
            sequence
                .cache
                .map(|c| format!(" CACHE {c}"))
                .unwrap_or_default()
        )
    }

    fn sequence_next_val_sql(&self, _platform: &Platform, name: &str) -> String {
        format!("SELECT NEXTVAL('{name}')")
    }
}

impl SessionSql for PostgresDialect {
    fn transaction_isolation_sql(&self, level: TransactionIsolation) -> String {
        format!(
            "SET SESSION CHARACTERISTICS AS TRANSACTION ISOLATION LEVEL {}",
            level.as_sql()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ddl::CreateFlags;
    use crate::schema::{ReferentialAction, Table};

    fn postgres() -> Platform {
        PostgresDialect::POSTGRESQL.platform()
    }

    #[test]
    fn test_serial_and_identity() {
        let col = Column::new("id", LogicalType::Integer).autoincrement();
        assert_eq!(postgres().declare_column(&col).unwrap(), "SERIAL");
        assert_eq!(
            PostgresDialect::POSTGRESQL10.platform().declare_column(&col).unwrap(),
            "INT GENERATED BY DEFAULT AS IDENTITY"
        );
    }

    #[test]
    fn test_json_option() {
        let col = Column::new("doc", LogicalType::Json).platform_option("jsonb", "1");
        assert_eq!(postgres().declare_column(&col).unwrap(), "JSONB");
        assert_eq!(postgres().declare_type(LogicalType::Json).unwrap(), "JSON");
    }

    #[test]
    fn test_create_table_with_comments_and_fks() {
        let table = Table::new("orders")
            .column(Column::new("id", LogicalType::Integer).autoincrement())
            .column(Column::new("user_id", LogicalType::Integer).comment("Owner"))
            .primary_key(["id"])
            .foreign_key(
                ForeignKey::new(["user_id"], "users", ["id"])
                    .named("fk_orders_user")
                    .on_delete(ReferentialAction::Cascade),
            );
        let sql = postgres().create_table_sql(&table, CreateFlags::ALL).unwrap();
        assert_eq!(
            sql,
            [
                "CREATE TABLE orders (id SERIAL NOT NULL, user_id INT, PRIMARY KEY (id))",
                "ALTER TABLE orders ADD CONSTRAINT fk_orders_user FOREIGN KEY (user_id) \
                 REFERENCES users (id) ON DELETE CASCADE",
                "COMMENT ON COLUMN orders.user_id IS 'Owner'",
            ]
        );
    }

    #[test]
    fn test_alter_per_change_statements() {
        let diff = TableDiff::new("orders")
            .change_column(ColumnDiff::new(
                "total",
                Column::new("total", LogicalType::Decimal).precision(12, 2).not_null(),
                [ColumnProperty::Precision, ColumnProperty::NotNull],
            ))
            .rename_column("note", Column::new("remark", LogicalType::Text))
            .rename_index("idx_a", Index::new("idx_b", ["a"]));
        assert_eq!(
            postgres().alter_table_sql(&diff).unwrap(),
            [
                "ALTER TABLE orders ALTER total TYPE NUMERIC(12, 2)",
                "ALTER TABLE orders ALTER total SET NOT NULL",
                "ALTER TABLE orders RENAME COLUMN note TO remark",
                "ALTER INDEX idx_a RENAME TO idx_b",
            ]
        );
    }

    #[test]
    fn test_offset_only() {
        assert_eq!(
            postgres().modify_limit_query("SELECT * FROM t", None, Some(20)).unwrap(),
            "SELECT * FROM t OFFSET 20"
        );
    }

    #[test]
    fn test_sequences() {
        let platform = postgres();
        assert_eq!(
            platform.create_sequence_sql(&Sequence::new("s").cache(5)).unwrap(),
            "CREATE SEQUENCE s INCREMENT BY 1 MINVALUE 1 START 1 CACHE 5"
        );
        assert_eq!(platform.sequence_next_val_sql("s").unwrap(), "SELECT NEXTVAL('s')");
    }

    #[test]
    fn test_drop_primary_key() {
        let diff = TableDiff::new("orders").remove_index(Index::primary_key(["id"]));
        assert_eq!(
            postgres().alter_table_sql(&diff).unwrap(),
            ["ALTER TABLE orders DROP CONSTRAINT orders_pkey"]
        );
    }
}
