//! ALTER TABLE statement ordering.

use crate::error::{PlatformError, Result};
use crate::events::Dispatch;
use crate::platform::Platform;
use crate::schema::TableDiff;

use super::DdlDialect;

/// One unit of column-level ALTER output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlterPiece {
    /// Fragment following `ALTER TABLE <name> `; vendors that combine
    /// clauses join all of them into a single statement.
    Clause(String),
    /// Standalone statement, emitted in sequence.
    Statement(String),
}

/// Builds the ordered ALTER TABLE statement list for `diff`:
///
/// 1. drop removed and changed foreign keys, then removed and changed indexes
/// 2. column additions, removals, changes and renames
/// 3. table rename with its dependent name fixups
/// 4. index renames
/// 5. add added and changed foreign keys, then added and changed indexes
/// 6. SQL appended by per-column event listeners
///
/// Steps 1 and 2 address the table by its current name, steps 3 to 5 by the
/// name it has once the diff is applied.
///
/// # Errors
///
/// Returns `UnsupportedFeature` for a rename the vendor cannot perform and
/// propagates errors from the vendor's fragment builders.
pub fn alter_table_statements<D>(
    dialect: &D,
    platform: &Platform,
    diff: &TableDiff,
) -> Result<Vec<String>>
where
    D: DdlDialect + ?Sized,
{
    let caps = platform.capabilities();
    let table = platform.table_name(&diff.name);
    let new_table = platform.table_name(diff.effective_name());
    let events = platform.events();
    let comments_out_of_line =
        !caps.supports_inline_column_comments() && caps.supports_comment_on_statement();

    let mut sql = Vec::new();

    if caps.supports_foreign_key_constraints() {
        for fk in diff.removed_foreign_keys.iter().chain(&diff.changed_foreign_keys) {
            sql.push(dialect.drop_foreign_key_sql(platform, &table, fk)?);
        }
    }
    for index in diff.removed_indexes.iter().chain(&diff.changed_indexes) {
        sql.push(dialect.drop_index_sql(platform, &table, index));
    }

    let mut pieces = Vec::new();
    let mut column_hook_sql = Vec::new();

    for column in &diff.added_columns {
        let dispatch = events
            .map(|e| e.add_column(platform.name(), diff, column))
            .unwrap_or_default();
        if take_prevented(dispatch, &mut column_hook_sql) {
            continue;
        }
        pieces.push(AlterPiece::Clause(dialect.add_column_clause(platform, column)?));
        if caps.uses_named_default_constraints() && !column.autoincrement {
            if let Some(stmt) = dialect.add_default_constraint_sql(platform, &table, column) {
                pieces.push(AlterPiece::Statement(stmt));
            }
        }
        if column.autoincrement {
            for stmt in dialect.identity_emulation_sql(platform, &table, column)? {
                pieces.push(AlterPiece::Statement(stmt));
            }
        }
        if comments_out_of_line {
            if let Some(comment) = column.comment_text() {
                pieces.push(AlterPiece::Statement(dialect.comment_on_column_sql(
                    platform,
                    &table,
                    &column.name,
                    Some(comment),
                )));
            }
        }
    }

    for column in &diff.removed_columns {
        let dispatch = events
            .map(|e| e.remove_column(platform.name(), diff, column))
            .unwrap_or_default();
        if take_prevented(dispatch, &mut column_hook_sql) {
            continue;
        }
        if caps.uses_named_default_constraints() && column.default.is_some() {
            pieces.push(AlterPiece::Statement(dialect.drop_default_constraint_sql(
                platform,
                &table,
                &column.name,
            )));
        }
        pieces.push(AlterPiece::Clause(dialect.drop_column_clause(platform, &column.name)));
    }

    for change in &diff.changed_columns {
        let dispatch = events
            .map(|e| e.change_column(platform.name(), diff, change))
            .unwrap_or_default();
        if take_prevented(dispatch, &mut column_hook_sql) {
            continue;
        }
        pieces.extend(dialect.change_column_pieces(platform, diff, change)?);
        if comments_out_of_line && change.has_changed(crate::schema::ColumnProperty::Comment) {
            pieces.push(AlterPiece::Statement(
                dialect.alter_column_comment_sql(platform, &table, change),
            ));
        }
    }

    for renamed in &diff.renamed_columns {
        let dispatch = events
            .map(|e| e.rename_column(platform.name(), diff, &renamed.old_name, &renamed.column))
            .unwrap_or_default();
        if take_prevented(dispatch, &mut column_hook_sql) {
            continue;
        }
        pieces.extend(dialect.rename_column_pieces(
            platform,
            diff,
            &renamed.old_name,
            &renamed.column,
        )?);
    }

    sql.extend(assemble(dialect.combines_alter_clauses(), &table, pieces));

    if diff.new_name.is_some() {
        if !caps.supports_rename_table() {
            return Err(PlatformError::unsupported(platform.name(), "RENAME TABLE"));
        }
        sql.extend(dialect.rename_table_sql(platform, diff, &new_table)?);
    }

    for renamed in &diff.renamed_indexes {
        sql.extend(dialect.rename_index_sql(
            platform,
            &new_table,
            &renamed.old_name,
            &renamed.index,
        )?);
    }

    if caps.supports_foreign_key_constraints() {
        for fk in diff.added_foreign_keys.iter().chain(&diff.changed_foreign_keys) {
            sql.push(dialect.create_foreign_key_sql(platform, &new_table, fk));
        }
    }
    for index in diff.added_indexes.iter().chain(&diff.changed_indexes) {
        sql.push(dialect.create_index_sql(platform, &new_table, index)?);
    }

    sql.extend(column_hook_sql);
    Ok(sql)
}

/// Moves listener SQL into `hook_sql` and reports a veto.
fn take_prevented(dispatch: Dispatch, hook_sql: &mut Vec<String>) -> bool {
    hook_sql.extend(dispatch.sql);
    dispatch.default_prevented
}

/// Turns pieces into statements. Combined clauses land where the first
/// clause was; statements keep their position relative to it.
fn assemble(combine: bool, table: &str, pieces: Vec<AlterPiece>) -> Vec<String> {
    if !combine {
        return pieces
            .into_iter()
            .map(|piece| match piece {
                AlterPiece::Clause(clause) => format!("ALTER TABLE {table} {clause}"),
                AlterPiece::Statement(stmt) => stmt,
            })
            .collect();
    }

    let mut before = Vec::new();
    let mut clauses = Vec::new();
    let mut after = Vec::new();
    for piece in pieces {
        match piece {
            AlterPiece::Clause(clause) => clauses.push(clause),
            AlterPiece::Statement(stmt) if clauses.is_empty() => before.push(stmt),
            AlterPiece::Statement(stmt) => after.push(stmt),
        }
    }
    if !clauses.is_empty() {
        before.push(format!("ALTER TABLE {table} {}", clauses.join(", ")));
    }
    before.extend(after);
    before
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_per_statement() {
        let pieces = vec![
            AlterPiece::Statement("DROP X".to_string()),
            AlterPiece::Clause("DROP COLUMN a".to_string()),
            AlterPiece::Clause("ADD b INT".to_string()),
        ];
        assert_eq!(
            assemble(false, "t", pieces),
            ["DROP X", "ALTER TABLE t DROP COLUMN a", "ALTER TABLE t ADD b INT"]
        );
    }

    #[test]
    fn test_assemble_combined() {
        let pieces = vec![
            AlterPiece::Statement("BEFORE".to_string()),
            AlterPiece::Clause("ADD a INT".to_string()),
            AlterPiece::Statement("AFTER".to_string()),
            AlterPiece::Clause("DROP b".to_string()),
        ];
        assert_eq!(
            assemble(true, "t", pieces),
            ["BEFORE", "ALTER TABLE t ADD a INT, DROP b", "AFTER"]
        );
    }
}
