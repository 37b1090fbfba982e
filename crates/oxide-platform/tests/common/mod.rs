#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use oxide_platform::{
    Column, EventResult, Platform, PlatformVariant, SchemaEventRegistry, SchemaEvents, Table,
    TableDiff,
};

pub fn platform(name: &str) -> Platform {
    name.parse::<PlatformVariant>()
        .unwrap_or_else(|e| panic!("Unknown platform {name}: {e}"))
        .platform()
}

/// Index of the first statement containing `needle`.
pub fn position(sql: &[String], needle: &str) -> usize {
    sql.iter()
        .position(|stmt| stmt.contains(needle))
        .unwrap_or_else(|| panic!("No statement contains {needle:?} in {sql:#?}"))
}

/// Listener that appends fixed SQL and optionally vetoes.
pub struct Hook {
    pub sql: &'static str,
    pub veto: bool,
    pub seen: Mutex<Vec<String>>,
}

impl Hook {
    pub fn new(sql: &'static str, veto: bool) -> Arc<Self> {
        Arc::new(Self {
            sql,
            veto,
            seen: Mutex::new(Vec::new()),
        })
    }

    fn respond(&self, event: String, sql: &mut Vec<String>) -> EventResult {
        self.seen.lock().unwrap().push(event);
        sql.push(self.sql.to_string());
        if self.veto {
            EventResult::Veto
        } else {
            EventResult::Continue
        }
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

impl SchemaEvents for Hook {
    fn on_create_table(
        &self,
        _platform: &str,
        table: &Table,
        sql: &mut Vec<String>,
    ) -> EventResult {
        self.respond(format!("create {}", table.name), sql)
    }

    fn on_drop_table(&self, _platform: &str, table: &str, sql: &mut Vec<String>) -> EventResult {
        self.respond(format!("drop {table}"), sql)
    }

    fn on_add_column(
        &self,
        _platform: &str,
        _diff: &TableDiff,
        column: &Column,
        sql: &mut Vec<String>,
    ) -> EventResult {
        self.respond(format!("add {}", column.name), sql)
    }
}

pub fn with_hooks(platform: Platform, hooks: &[Arc<Hook>]) -> Platform {
    let mut registry = SchemaEventRegistry::new();
    for hook in hooks {
        registry.register(hook.clone());
    }
    platform.with_events(Arc::new(registry))
}
