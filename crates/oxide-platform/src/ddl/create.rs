//! Statement-list entry points on [`Platform`].

use tracing::debug;

use crate::error::{PlatformError, Result};
use crate::platform::Platform;
use crate::schema::{Column, ForeignKey, Index, Sequence, Table, TableDiff};

use super::CreateFlags;

impl Platform {
    /// CREATE TABLE and its dependent statements.
    ///
    /// Order: the CREATE TABLE statement (columns, unique constraints,
    /// primary key, checks), out-of-line defaults, indexes, foreign keys,
    /// identity emulation, comments, then listener SQL. Primary key columns
    /// are always declared NOT NULL.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for an invalid descriptor, `UnsupportedType`
    /// for an unmapped column type and `UnsupportedFeature` for names or
    /// indexes the vendor cannot handle.
    pub fn create_table_sql(&self, table: &Table, flags: CreateFlags) -> Result<Vec<String>> {
        table.validate()?;
        self.check_table_identifiers(table)?;

        let dialect = self.dialect();
        let caps = self.capabilities();
        let name = self.table_name(&table.name);

        let mut hook_sql = Vec::new();
        if let Some(events) = self.events() {
            let dispatch = events.create_table(self.name(), table);
            if dispatch.default_prevented {
                return Ok(dispatch.sql);
            }
            hook_sql.extend(dispatch.sql);
        }

        let columns: Vec<Column> = table
            .columns
            .iter()
            .map(|c| {
                let mut column = c.clone();
                if table.is_primary_key_column(&c.name) {
                    column.notnull = true;
                }
                column
            })
            .collect();

        let mut column_hook_sql = Vec::new();
        let mut parts = Vec::new();
        for column in &columns {
            if let Some(events) = self.events() {
                let dispatch = events.create_table_column(self.name(), table, column);
                column_hook_sql.extend(dispatch.sql);
                if dispatch.default_prevented {
                    continue;
                }
            }
            parts.push(dialect.column_declaration(self, column)?);
        }

        for unique in &table.unique_constraints {
            let mut part = String::new();
            if let Some(ref constraint) = unique.name {
                part.push_str(&format!("CONSTRAINT {constraint} "));
            }
            part.push_str(&format!("UNIQUE ({})", unique.columns.join(", ")));
            parts.push(part);
        }
        if let Some(primary) = table.primary_key_index() {
            if let Some(clause) = dialect.primary_key_clause(self, table, primary) {
                parts.push(clause);
            }
        }
        for check in &table.checks {
            let mut part = String::new();
            if let Some(ref constraint) = check.name {
                part.push_str(&format!("CONSTRAINT {constraint} "));
            }
            part.push_str(&format!("CHECK ({})", check.expression));
            parts.push(part);
        }

        let create_fks = flags.contains(CreateFlags::CREATE_FOREIGNKEYS)
            && caps.supports_foreign_key_constraints();
        if create_fks && !caps.supports_alter_foreign_keys() {
            for fk in &table.foreign_keys {
                parts.push(dialect.foreign_key_declaration(self, fk));
            }
        }

        let mut sql = vec![dialect.create_table_statement(self, &name, table, &parts)];

        if caps.uses_named_default_constraints() {
            for column in columns.iter().filter(|c| !c.autoincrement) {
                if let Some(stmt) = dialect.add_default_constraint_sql(self, &name, column) {
                    sql.push(stmt);
                }
            }
        }

        if flags.contains(CreateFlags::CREATE_INDEXES) {
            for index in table.indexes.iter().filter(|i| !i.primary) {
                sql.push(dialect.create_index_sql(self, &name, index)?);
            }
        }

        if create_fks && caps.supports_alter_foreign_keys() {
            for fk in &table.foreign_keys {
                sql.push(dialect.create_foreign_key_sql(self, &name, fk));
            }
        }

        for column in columns.iter().filter(|c| c.autoincrement) {
            sql.extend(dialect.identity_emulation_sql(self, &name, column)?);
        }

        if caps.supports_comment_on_statement() {
            if let Some(comment) = table.comment.as_deref().filter(|c| !c.is_empty()) {
                sql.push(dialect.comment_on_table_sql(self, &name, comment));
            }
            if !caps.supports_inline_column_comments() {
                for column in &columns {
                    if let Some(comment) = column.comment_text() {
                        sql.push(dialect.comment_on_column_sql(
                            self,
                            &name,
                            &column.name,
                            Some(comment),
                        ));
                    }
                }
            }
        }

        sql.extend(column_hook_sql);
        sql.extend(hook_sql);
        debug!(
            platform = self.name(),
            table = %name,
            statements = sql.len(),
            "synthesized CREATE TABLE"
        );
        Ok(sql)
    }

    /// ALTER TABLE statements for a diff, with listener SQL around them.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for an invalid diff and `UnsupportedFeature`
    /// for changes the vendor cannot express.
    pub fn alter_table_sql(&self, diff: &TableDiff) -> Result<Vec<String>> {
        diff.validate()?;
        self.check_identifier(&diff.name)?;
        if let Some(ref new_name) = diff.new_name {
            self.check_identifier(new_name)?;
        }
        for column in diff
            .added_columns
            .iter()
            .chain(diff.renamed_columns.iter().map(|r| &r.column))
        {
            self.check_identifier(&column.name)?;
        }
        for index in diff
            .added_indexes
            .iter()
            .chain(&diff.changed_indexes)
            .chain(diff.renamed_indexes.iter().map(|r| &r.index))
        {
            self.check_identifier(&index.name)?;
        }

        let mut sql = Vec::new();
        if let Some(events) = self.events() {
            let dispatch = events.alter_table(self.name(), diff);
            if dispatch.default_prevented {
                return Ok(dispatch.sql);
            }
            sql.extend(dispatch.sql);
        }

        sql.extend(self.dialect().alter_table_sql(self, diff)?);

        if let Some(events) = self.events() {
            sql.extend(events.after_alter_table(self.name(), diff).sql);
        }

        debug!(
            platform = self.name(),
            table = %diff.name,
            statements = sql.len(),
            "synthesized ALTER TABLE"
        );
        Ok(sql)
    }

    /// DROP TABLE, unless a listener replaces it.
    #[must_use]
    pub fn drop_table_sql(&self, table: &str) -> Vec<String> {
        let mut sql = Vec::new();
        if let Some(events) = self.events() {
            let dispatch = events.drop_table(self.name(), table);
            if dispatch.default_prevented {
                return dispatch.sql;
            }
            sql.extend(dispatch.sql);
        }
        sql.insert(0, self.dialect().drop_table_sql(self, &self.table_name(table)));
        sql
    }

    /// TRUNCATE TABLE (or the vendor's equivalent).
    #[must_use]
    pub fn truncate_table_sql(&self, table: &str, cascade: bool) -> String {
        self.dialect()
            .truncate_table_sql(self, &self.table_name(table), cascade)
    }

    /// CREATE INDEX on `table`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for an invalid index and `UnsupportedFeature`
    /// for options the vendor cannot express.
    pub fn create_index_sql(&self, table: &str, index: &Index) -> Result<String> {
        index.validate()?;
        self.check_identifier(&index.name)?;
        self.dialect()
            .create_index_sql(self, &self.table_name(table), index)
    }

    /// DROP INDEX on `table`.
    #[must_use]
    pub fn drop_index_sql(&self, table: &str, index: &Index) -> String {
        self.dialect().drop_index_sql(self, &self.table_name(table), index)
    }

    /// Adds a foreign key to `table`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for an invalid key and `UnsupportedFeature`
    /// where foreign keys cannot be added to an existing table.
    pub fn create_foreign_key_sql(&self, table: &str, fk: &ForeignKey) -> Result<String> {
        fk.validate()?;
        self.require_alter_foreign_keys()?;
        Ok(self
            .dialect()
            .create_foreign_key_sql(self, &self.table_name(table), fk))
    }

    /// Drops a foreign key from `table`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for an unnamed key and `UnsupportedFeature`
    /// where foreign keys cannot be dropped from an existing table.
    pub fn drop_foreign_key_sql(&self, table: &str, fk: &ForeignKey) -> Result<String> {
        self.require_alter_foreign_keys()?;
        self.dialect()
            .drop_foreign_key_sql(self, &self.table_name(table), fk)
    }

    fn require_alter_foreign_keys(&self) -> Result<()> {
        let caps = self.capabilities();
        if !caps.supports_foreign_key_constraints() || !caps.supports_alter_foreign_keys() {
            return Err(PlatformError::unsupported(self.name(), "ALTER TABLE foreign keys"));
        }
        Ok(())
    }

    /// CREATE SEQUENCE.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedFeature` without sequence support.
    pub fn create_sequence_sql(&self, sequence: &Sequence) -> Result<String> {
        self.require_sequences()?;
        sequence.validate()?;
        self.check_identifier(&sequence.name)?;
        Ok(self.dialect().create_sequence_sql(self, sequence))
    }

    /// ALTER SEQUENCE.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedFeature` without sequence support.
    pub fn alter_sequence_sql(&self, sequence: &Sequence) -> Result<String> {
        self.require_sequences()?;
        sequence.validate()?;
        Ok(self.dialect().alter_sequence_sql(self, sequence))
    }

    /// DROP SEQUENCE.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedFeature` without sequence support.
    pub fn drop_sequence_sql(&self, name: &str) -> Result<String> {
        self.require_sequences()?;
        Ok(self.dialect().drop_sequence_sql(self, name))
    }

    /// SELECT returning the next sequence value.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedFeature` without sequence support.
    pub fn sequence_next_val_sql(&self, name: &str) -> Result<String> {
        self.require_sequences()?;
        Ok(self.dialect().sequence_next_val_sql(self, name))
    }

    fn require_sequences(&self) -> Result<()> {
        if !self.capabilities().supports_sequences() {
            return Err(PlatformError::unsupported(self.name(), "sequences"));
        }
        Ok(())
    }

    /// CREATE DATABASE.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedFeature` where the vendor has no such statement.
    pub fn create_database_sql(&self, name: &str) -> Result<String> {
        self.dialect().create_database_sql(self, name)
    }

    /// DROP DATABASE.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedFeature` where the vendor has no such statement.
    pub fn drop_database_sql(&self, name: &str) -> Result<String> {
        self.dialect().drop_database_sql(self, name)
    }

    /// CREATE SCHEMA.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedFeature` without schema support.
    pub fn create_schema_sql(&self, name: &str) -> Result<String> {
        if !self.capabilities().supports_schemas() {
            return Err(PlatformError::unsupported(self.name(), "schemas"));
        }
        Ok(self.dialect().create_schema_sql(self, name))
    }

    fn check_table_identifiers(&self, table: &Table) -> Result<()> {
        self.check_identifier(&table.name)?;
        for column in &table.columns {
            self.check_identifier(&column.name)?;
        }
        for index in table.indexes.iter().filter(|i| !i.primary) {
            self.check_identifier(&index.name)?;
        }
        for name in table.foreign_keys.iter().filter_map(|fk| fk.name.as_deref()) {
            self.check_identifier(name)?;
        }
        Ok(())
    }
}
