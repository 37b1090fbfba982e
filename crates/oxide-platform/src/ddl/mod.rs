//! DDL statement synthesis.
//!
//! [`DdlDialect`] holds the per-vendor spelling of each DDL fragment. The
//! statement ordering lives on [`Platform`](crate::Platform) (CREATE/DROP)
//! and in [`alter_table_statements`] (ALTER), shared by every vendor.

mod alter;
mod create;

pub use alter::{alter_table_statements, AlterPiece};

use std::ops::BitOr;

use crate::error::{PlatformError, Result};
use crate::platform::{Platform, Vendor};
use crate::schema::{
    Column, ColumnDiff, ColumnProperty, ForeignKey, Index, Sequence, Table, TableDiff,
};

/// Which dependent objects CREATE TABLE synthesizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CreateFlags(u8);

impl CreateFlags {
    /// Only the table.
    pub const NONE: Self = Self(0);
    /// Emit CREATE INDEX statements.
    pub const CREATE_INDEXES: Self = Self(1);
    /// Emit foreign key statements.
    pub const CREATE_FOREIGNKEYS: Self = Self(2);
    /// Indexes and foreign keys.
    pub const ALL: Self = Self(3);

    /// Builds flags from a caller-supplied bit set.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for negative values or unknown bits.
    pub fn from_bits(bits: i64) -> Result<Self> {
        u8::try_from(bits)
            .ok()
            .filter(|b| b & !Self::ALL.0 == 0)
            .map(Self)
            .ok_or_else(|| PlatformError::invalid(format!("invalid create flags {bits}")))
    }

    /// Raw bits.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// True when every bit of `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl Default for CreateFlags {
    fn default() -> Self {
        Self::CREATE_INDEXES
    }
}

impl BitOr for CreateFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

fn column_list(columns: &[String]) -> String {
    columns.join(", ")
}

/// `ALTER COLUMN` clauses for type, default and nullability changes.
///
/// # Errors
///
/// Returns `UnsupportedType` for an unmapped logical type.
pub(crate) fn standard_change_column_pieces(
    platform: &Platform,
    change: &ColumnDiff,
) -> Result<Vec<AlterPiece>> {
    let name = &change.old_name;
    let column = &change.column;
    let mut pieces = Vec::new();
    if change.declaration_changed() {
        pieces.push(AlterPiece::Clause(format!(
            "ALTER COLUMN {name} TYPE {}",
            platform.declare_column(column)?
        )));
    }
    if change.has_changed(ColumnProperty::Default) {
        let clause = match column.default {
            Some(ref default) => format!(
                "ALTER COLUMN {name} SET DEFAULT {}",
                platform.default_value_sql(default)
            ),
            None => format!("ALTER COLUMN {name} DROP DEFAULT"),
        };
        pieces.push(AlterPiece::Clause(clause));
    }
    if change.has_changed(ColumnProperty::NotNull) {
        let action = if column.notnull { "SET" } else { "DROP" };
        pieces.push(AlterPiece::Clause(format!("ALTER COLUMN {name} {action} NOT NULL")));
    }
    Ok(pieces)
}

/// Per-vendor spelling of DDL fragments.
///
/// Defaults follow ANSI SQL. Table names handed in are already folded by
/// [`Platform::table_name`].
pub trait DdlDialect: Vendor {
    /// Column declaration inside CREATE TABLE or ADD COLUMN.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedType` for an unmapped logical type.
    fn column_declaration(&self, platform: &Platform, column: &Column) -> Result<String> {
        let caps = platform.capabilities();
        let mut sql = format!("{} {}", column.name, platform.declare_column(column)?);
        if caps.supports_column_collation() {
            sql.push_str(&self.column_collation_sql(column));
        }
        if let Some(default) = self.default_clause(platform, column) {
            sql.push_str(&default);
        }
        if column.notnull {
            sql.push_str(" NOT NULL");
        }
        if let Some(ref check) = column.check {
            sql.push_str(&format!(" CHECK ({check})"));
        }
        sql.push_str(&self.inline_comment_sql(platform, column));
        Ok(sql)
    }

    /// ` COLLATE x` for a column with a collation.
    fn column_collation_sql(&self, column: &Column) -> String {
        column
            .collation
            .as_ref()
            .map(|c| format!(" COLLATE {c}"))
            .unwrap_or_default()
    }

    /// ` DEFAULT x` inside the declaration; `None` when the default is
    /// emitted out of line or the column has none.
    fn default_clause(&self, platform: &Platform, column: &Column) -> Option<String> {
        if platform.capabilities().uses_named_default_constraints() || column.autoincrement {
            return None;
        }
        column
            .default
            .as_ref()
            .map(|d| format!(" DEFAULT {}", platform.default_value_sql(d)))
    }

    /// Inline comment clause; empty unless the vendor stores comments inline.
    fn inline_comment_sql(&self, platform: &Platform, column: &Column) -> String {
        if !platform.capabilities().supports_inline_column_comments() {
            return String::new();
        }
        column
            .comment_text()
            .map(|c| format!(" COMMENT {}", platform.quote_string_literal(c)))
            .unwrap_or_default()
    }

    /// PRIMARY KEY clause inside CREATE TABLE.
    fn primary_key_clause(
        &self,
        _platform: &Platform,
        _table: &Table,
        primary: &Index,
    ) -> Option<String> {
        Some(format!("PRIMARY KEY ({})", column_list(&primary.columns)))
    }

    /// The CREATE TABLE statement around the already rendered parts.
    fn create_table_statement(
        &self,
        platform: &Platform,
        name: &str,
        table: &Table,
        parts: &[String],
    ) -> String {
        format!(
            "CREATE TABLE {name} ({}){}",
            parts.join(", "),
            self.table_options_sql(platform, table)
        )
    }

    /// Trailing table options; empty by default.
    fn table_options_sql(&self, _platform: &Platform, _table: &Table) -> String {
        String::new()
    }

    /// Statements emulating an identity column; empty where identity is native.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedFeature` when a generated name does not fit.
    fn identity_emulation_sql(
        &self,
        _platform: &Platform,
        _table: &str,
        _column: &Column,
    ) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    /// Statement storing a table comment out of line.
    fn comment_on_table_sql(&self, platform: &Platform, table: &str, comment: &str) -> String {
        format!(
            "COMMENT ON TABLE {table} IS {}",
            platform.quote_string_literal(comment)
        )
    }

    /// Statement storing (or clearing) a column comment out of line.
    fn comment_on_column_sql(
        &self,
        platform: &Platform,
        table: &str,
        column: &str,
        comment: Option<&str>,
    ) -> String {
        let value =
            comment.map_or_else(|| "NULL".to_string(), |c| platform.quote_string_literal(c));
        format!("COMMENT ON COLUMN {table}.{column} IS {value}")
    }

    /// Statement replacing the comment of a changed column.
    fn alter_column_comment_sql(
        &self,
        platform: &Platform,
        table: &str,
        change: &ColumnDiff,
    ) -> String {
        self.comment_on_column_sql(platform, table, &change.old_name, change.column.comment_text())
    }

    /// Name of the out-of-line default constraint of a column.
    fn default_constraint_name(&self, platform: &Platform, table: &str, column: &str) -> String {
        format!(
            "DF_{}_{}",
            platform.generate_identifier_name(table),
            platform.generate_identifier_name(column)
        )
    }

    /// Statement adding an out-of-line default constraint.
    fn add_default_constraint_sql(
        &self,
        platform: &Platform,
        table: &str,
        column: &Column,
    ) -> Option<String> {
        let default = column.default.as_ref()?;
        Some(format!(
            "ALTER TABLE {table} ADD CONSTRAINT {} DEFAULT {} FOR {}",
            self.default_constraint_name(platform, table, &column.name),
            platform.default_value_sql(default),
            column.name
        ))
    }

    /// Statement dropping an out-of-line default constraint.
    fn drop_default_constraint_sql(
        &self,
        platform: &Platform,
        table: &str,
        column: &str,
    ) -> String {
        format!(
            "ALTER TABLE {table} DROP CONSTRAINT {}",
            self.default_constraint_name(platform, table, column)
        )
    }

    /// Keywords between CREATE and INDEX, e.g. `UNIQUE `.
    fn index_kind_sql(&self, index: &Index) -> String {
        if index.unique {
            "UNIQUE ".to_string()
        } else {
            String::new()
        }
    }

    /// CREATE INDEX, or ADD PRIMARY KEY for the primary index.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedFeature` when the index has more columns than the
    /// vendor allows or a partial predicate the vendor cannot express.
    fn create_index_sql(&self, platform: &Platform, table: &str, index: &Index) -> Result<String> {
        let caps = platform.capabilities();
        if index.columns.len() > caps.max_index_fields() {
            return Err(PlatformError::unsupported(
                platform.name(),
                format!(
                    "index '{}' on {} columns (at most {})",
                    index.name,
                    index.columns.len(),
                    caps.max_index_fields()
                ),
            ));
        }
        if index.primary {
            return Ok(format!(
                "ALTER TABLE {table} ADD PRIMARY KEY ({})",
                column_list(&index.columns)
            ));
        }
        let mut sql = format!(
            "CREATE {}INDEX {} ON {table} ({})",
            self.index_kind_sql(index),
            index.name,
            column_list(&index.columns)
        );
        if let Some(predicate) = index.where_clause() {
            if !caps.supports_partial_indexes() {
                return Err(PlatformError::unsupported(platform.name(), "partial indexes"));
            }
            sql.push_str(&format!(" WHERE {predicate}"));
        }
        Ok(sql)
    }

    /// DROP INDEX, or DROP CONSTRAINT for the primary index.
    fn drop_index_sql(&self, _platform: &Platform, table: &str, index: &Index) -> String {
        if index.primary {
            format!("ALTER TABLE {table} DROP CONSTRAINT {}", index.name)
        } else {
            format!("DROP INDEX {}", index.name)
        }
    }

    /// Native index rename, or drop and recreate.
    ///
    /// # Errors
    ///
    /// Propagates errors of [`DdlDialect::create_index_sql`].
    fn rename_index_sql(
        &self,
        platform: &Platform,
        table: &str,
        old_name: &str,
        index: &Index,
    ) -> Result<Vec<String>> {
        if platform.capabilities().supports_rename_index() {
            return Ok(vec![format!("ALTER INDEX {old_name} RENAME TO {}", index.name)]);
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

    /// `[CONSTRAINT n] FOREIGN KEY (..) REFERENCES t (..)` plus options.
    fn foreign_key_declaration(&self, platform: &Platform, fk: &ForeignKey) -> String {
        let mut sql = String::new();
        if let Some(ref name) = fk.name {
            sql.push_str(&format!("CONSTRAINT {name} "));
        }
        sql.push_str(&format!(
            "FOREIGN KEY ({}) REFERENCES {} ({})",
            column_list(&fk.local_columns),
            platform.table_name(&fk.foreign_table),
            column_list(&fk.foreign_columns)
        ));
        sql.push_str(&self.foreign_key_options_sql(platform, fk));
        sql
    }

    /// Referential actions and other trailing foreign key options.
    fn foreign_key_options_sql(&self, platform: &Platform, fk: &ForeignKey) -> String {
        let mut sql = String::new();
        if platform.capabilities().supports_foreign_key_on_update() {
            if let Some(action) = fk.on_update {
                sql.push_str(&format!(" ON UPDATE {}", action.as_sql()));
            }
        }
        if let Some(action) = fk.on_delete {
            sql.push_str(&format!(" ON DELETE {}", action.as_sql()));
        }
        sql
    }

    /// ALTER TABLE ... ADD foreign key.
    fn create_foreign_key_sql(&self, platform: &Platform, table: &str, fk: &ForeignKey) -> String {
        format!(
            "ALTER TABLE {table} ADD {}",
            self.foreign_key_declaration(platform, fk)
        )
    }

    /// ALTER TABLE ... DROP foreign key.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for an unnamed key.
    fn drop_foreign_key_sql(
        &self,
        _platform: &Platform,
        table: &str,
        fk: &ForeignKey,
    ) -> Result<String> {
        Ok(format!("ALTER TABLE {table} DROP CONSTRAINT {}", fk.require_name()?))
    }

    /// DROP TABLE.
    fn drop_table_sql(&self, _platform: &Platform, table: &str) -> String {
        format!("DROP TABLE {table}")
    }

    /// TRUNCATE TABLE.
    fn truncate_table_sql(&self, _platform: &Platform, table: &str, cascade: bool) -> String {
        if cascade {
            format!("TRUNCATE TABLE {table} CASCADE")
        } else {
            format!("TRUNCATE TABLE {table}")
        }
    }

    /// Full ALTER TABLE statement list for the diff.
    ///
    /// # Errors
    ///
    /// See [`alter_table_statements`].
    fn alter_table_sql(&self, platform: &Platform, diff: &TableDiff) -> Result<Vec<String>> {
        alter_table_statements(self, platform, diff)
    }

    /// True when several column clauses share one ALTER TABLE statement.
    fn combines_alter_clauses(&self) -> bool {
        false
    }

    /// Clause adding a column.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedType` for an unmapped logical type.
    fn add_column_clause(&self, platform: &Platform, column: &Column) -> Result<String> {
        Ok(format!("ADD {}", self.column_declaration(platform, column)?))
    }

    /// Clause dropping a column.
    fn drop_column_clause(&self, _platform: &Platform, column: &str) -> String {
        format!("DROP COLUMN {column}")
    }

    /// Pieces redefining a column, addressed by its name before any rename.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedType` for an unmapped logical type.
    fn change_column_pieces(
        &self,
        platform: &Platform,
        _diff: &TableDiff,
        change: &ColumnDiff,
    ) -> Result<Vec<AlterPiece>> {
        standard_change_column_pieces(platform, change)
    }

    /// Pieces renaming a column.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedFeature` when the vendor cannot rename columns.
    fn rename_column_pieces(
        &self,
        _platform: &Platform,
        _diff: &TableDiff,
        old_name: &str,
        column: &Column,
    ) -> Result<Vec<AlterPiece>> {
        Ok(vec![AlterPiece::Clause(format!(
            "RENAME COLUMN {old_name} TO {}",
            column.name
        ))])
    }

    /// Statements renaming the table and fixing up names derived from it.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedFeature` when the vendor cannot rename tables.
    fn rename_table_sql(
        &self,
        platform: &Platform,
        diff: &TableDiff,
        new_name: &str,
    ) -> Result<Vec<String>> {
        Ok(vec![format!(
            "ALTER TABLE {} RENAME TO {new_name}",
            platform.table_name(&diff.name)
        )])
    }

    /// CREATE SEQUENCE.
    fn create_sequence_sql(&self, _platform: &Platform, sequence: &Sequence) -> String {
        let mut sql = format!(
            "CREATE SEQUENCE {} START WITH {} INCREMENT BY {}",
            sequence.name, sequence.initial_value, sequence.allocation_size
        );
        if let Some(cache) = sequence.cache {
            sql.push_str(&format!(" CACHE {cache}"));
        }
        sql
    }

    /// ALTER SEQUENCE.
    fn alter_sequence_sql(&self, _platform: &Platform, sequence: &Sequence) -> String {
        let mut sql = format!(
            "ALTER SEQUENCE {} INCREMENT BY {}",
            sequence.name, sequence.allocation_size
        );
        if let Some(cache) = sequence.cache {
            sql.push_str(&format!(" CACHE {cache}"));
        }
        sql
    }

    /// DROP SEQUENCE.
    fn drop_sequence_sql(&self, _platform: &Platform, name: &str) -> String {
        format!("DROP SEQUENCE {name}")
    }

    /// SELECT returning the next value of a sequence.
    fn sequence_next_val_sql(&self, _platform: &Platform, name: &str) -> String {
        format!("SELECT NEXT VALUE FOR {name}")
    }

    /// CREATE DATABASE.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedFeature` where databases are not created by SQL.
    fn create_database_sql(&self, _platform: &Platform, name: &str) -> Result<String> {
        Ok(format!("CREATE DATABASE {name}"))
    }

    /// DROP DATABASE.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedFeature` where databases are not dropped by SQL.
    fn drop_database_sql(&self, _platform: &Platform, name: &str) -> Result<String> {
        Ok(format!("DROP DATABASE {name}"))
    }

    /// CREATE SCHEMA.
    fn create_schema_sql(&self, _platform: &Platform, name: &str) -> String {
        format!("CREATE SCHEMA {name}")
    }
}
