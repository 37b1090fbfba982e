//! Vendor dialects.
//!
//! Each vendor is a small value type implementing the strategy traits, with
//! one constant per supported version where versions differ. Versions are
//! data, not subclasses: a newer version is the older constant with a few
//! fields changed.

mod firebird;
mod informix;
mod mysql;
mod oracle;
mod postgres;
mod sqlite;
mod sqlserver;
mod sybase;

pub use firebird::FirebirdDialect;
pub use informix::InformixDialect;
pub use mysql::MySqlDialect;
pub use oracle::OracleDialect;
pub use postgres::PostgresDialect;
pub use sqlite::SqliteDialect;
pub use sqlserver::SqlServerDialect;
pub use sybase::SybaseDialect;
