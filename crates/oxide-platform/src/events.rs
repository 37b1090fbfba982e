//! Schema event hooks.
//!
//! Listeners run while CREATE/ALTER/DROP TABLE statements are synthesized.
//! They can append SQL of their own and veto the statement the platform
//! would otherwise emit for the event.

use std::sync::Arc;

use crate::schema::{Column, ColumnDiff, Table, TableDiff};

/// Hook result: keep the default SQL or suppress it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    /// Emit the platform's default SQL.
    Continue,
    /// Suppress the platform's default SQL for this event.
    Veto,
}

/// Schema lifecycle events.
///
/// Every hook receives the platform name and a buffer for extra SQL.
pub trait SchemaEvents: Send + Sync {
    /// Before CREATE TABLE is synthesized.
    fn on_create_table(
        &self,
        _platform: &str,
        _table: &Table,
        _sql: &mut Vec<String>,
    ) -> EventResult {
        EventResult::Continue
    }

    /// For each column declared in CREATE TABLE.
    fn on_create_table_column(
        &self,
        _platform: &str,
        _table: &Table,
        _column: &Column,
        _sql: &mut Vec<String>,
    ) -> EventResult {
        EventResult::Continue
    }

    /// Before DROP TABLE is synthesized.
    fn on_drop_table(&self, _platform: &str, _table: &str, _sql: &mut Vec<String>) -> EventResult {
        EventResult::Continue
    }

    /// Before ALTER TABLE is synthesized.
    fn on_alter_table(
        &self,
        _platform: &str,
        _diff: &TableDiff,
        _sql: &mut Vec<String>,
    ) -> EventResult {
        EventResult::Continue
    }

    /// After ALTER TABLE has been synthesized.
    fn after_alter_table(&self, _platform: &str, _diff: &TableDiff, _sql: &mut Vec<String>) {}

    /// For each added column.
    fn on_add_column(
        &self,
        _platform: &str,
        _diff: &TableDiff,
        _column: &Column,
        _sql: &mut Vec<String>,
    ) -> EventResult {
        EventResult::Continue
    }

    /// For each removed column.
    fn on_remove_column(
        &self,
        _platform: &str,
        _diff: &TableDiff,
        _column: &Column,
        _sql: &mut Vec<String>,
    ) -> EventResult {
        EventResult::Continue
    }

    /// For each changed column.
    fn on_change_column(
        &self,
        _platform: &str,
        _diff: &TableDiff,
        _column: &ColumnDiff,
        _sql: &mut Vec<String>,
    ) -> EventResult {
        EventResult::Continue
    }

    /// For each renamed column.
    fn on_rename_column(
        &self,
        _platform: &str,
        _diff: &TableDiff,
        _old_name: &str,
        _column: &Column,
        _sql: &mut Vec<String>,
    ) -> EventResult {
        EventResult::Continue
    }
}

/// Collected outcome of one dispatched event.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Dispatch {
    /// SQL appended by listeners.
    pub sql: Vec<String>,
    /// True when any listener vetoed the default SQL.
    pub default_prevented: bool,
}

impl Dispatch {
    fn record(&mut self, result: EventResult) {
        if result == EventResult::Veto {
            self.default_prevented = true;
        }
    }
}

/// Ordered set of schema listeners.
///
/// Every listener sees every event; a veto from one does not stop the rest.
#[derive(Clone, Default)]
pub struct SchemaEventRegistry {
    listeners: Vec<Arc<dyn SchemaEvents>>,
}

impl std::fmt::Debug for SchemaEventRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaEventRegistry")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl SchemaEventRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a listener.
    pub fn register(&mut self, listener: Arc<dyn SchemaEvents>) {
        self.listeners.push(listener);
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn dispatch<F>(&self, mut f: F) -> Dispatch
    where
        F: FnMut(&dyn SchemaEvents, &mut Vec<String>) -> EventResult,
    {
        let mut dispatch = Dispatch::default();
        for listener in &self.listeners {
            let result = f(listener.as_ref(), &mut dispatch.sql);
            dispatch.record(result);
        }
        dispatch
    }

    pub(crate) fn create_table(&self, platform: &str, table: &Table) -> Dispatch {
        self.dispatch(|l, sql| l.on_create_table(platform, table, sql))
    }

    pub(crate) fn create_table_column(
        &self,
        platform: &str,
        table: &Table,
        column: &Column,
    ) -> Dispatch {
        self.dispatch(|l, sql| l.on_create_table_column(platform, table, column, sql))
    }

    pub(crate) fn drop_table(&self, platform: &str, table: &str) -> Dispatch {
        self.dispatch(|l, sql| l.on_drop_table(platform, table, sql))
    }

    pub(crate) fn alter_table(&self, platform: &str, diff: &TableDiff) -> Dispatch {
        self.dispatch(|l, sql| l.on_alter_table(platform, diff, sql))
    }

    pub(crate) fn after_alter_table(&self, platform: &str, diff: &TableDiff) -> Dispatch {
        self.dispatch(|l, sql| {
            l.after_alter_table(platform, diff, sql);
            EventResult::Continue
        })
    }

    pub(crate) fn add_column(&self, platform: &str, diff: &TableDiff, column: &Column) -> Dispatch {
        self.dispatch(|l, sql| l.on_add_column(platform, diff, column, sql))
    }

    pub(crate) fn remove_column(
        &self,
        platform: &str,
        diff: &TableDiff,
        column: &Column,
    ) -> Dispatch {
        self.dispatch(|l, sql| l.on_remove_column(platform, diff, column, sql))
    }

    pub(crate) fn change_column(
        &self,
        platform: &str,
        diff: &TableDiff,
        column: &ColumnDiff,
    ) -> Dispatch {
        self.dispatch(|l, sql| l.on_change_column(platform, diff, column, sql))
    }

    pub(crate) fn rename_column(
        &self,
        platform: &str,
        diff: &TableDiff,
        old_name: &str,
        column: &Column,
    ) -> Dispatch {
        self.dispatch(|l, sql| l.on_rename_column(platform, diff, old_name, column, sql))
    }
}
