//! # oxide-platform
//!
//! Database platform dialects: the layer that turns portable schema
//! descriptors and finished queries into vendor-specific SQL text.
//!
//! This crate provides:
//! - Capability flags describing what each vendor and version supports
//! - Logical column types mapped to native type declarations
//! - Portable expressions (substring, locate, date arithmetic, ...)
//! - Limit/offset rewriting for seven pagination families
//! - CREATE/ALTER/DROP statement synthesis with a fixed ALTER ordering
//!
//! Nothing here talks to a database. Every call is a pure function of the
//! platform and its input.
//!
//! ## Picking a platform
//!
//! ```rust
//! use oxide_platform::{LogicalType, PlatformVariant};
//!
//! let mysql = PlatformVariant::MySql.platform();
//! let oracle = PlatformVariant::Oracle.platform();
//!
//! assert_eq!(mysql.declare_type(LogicalType::Boolean).unwrap(), "TINYINT(1)");
//! assert_eq!(oracle.declare_type(LogicalType::Boolean).unwrap(), "NUMBER(1)");
//! ```
//!
//! ## Limit and offset
//!
//! ```rust
//! use oxide_platform::PlatformVariant;
//!
//! let mysql = PlatformVariant::MySql.platform();
//! assert_eq!(
//!     mysql.modify_limit_query("SELECT * FROM t", Some(10), None).unwrap(),
//!     "SELECT * FROM t LIMIT 10"
//! );
//!
//! let sybase = PlatformVariant::Sybase.platform();
//! assert!(sybase.modify_limit_query("SELECT * FROM t", Some(10), Some(5)).is_err());
//! ```
//!
//! ## Schema changes
//!
//! ```rust
//! use oxide_platform::{Column, LogicalType, PlatformVariant, TableDiff};
//!
//! let diff = TableDiff::new("users").add_column(Column::new("age", LogicalType::SmallInt));
//! let sql = PlatformVariant::PostgreSql.platform().alter_table_sql(&diff).unwrap();
//! assert_eq!(sql, ["ALTER TABLE users ADD COLUMN age SMALLINT"]);
//! ```

pub mod capabilities;
pub mod ddl;
pub mod error;
pub mod events;
pub mod expression;
pub mod limit;
pub mod platform;
pub mod registry;
pub mod schema;
pub mod session;
pub mod types;
pub mod vendors;

pub use capabilities::{
    Capabilities, CapabilityOverrides, IdentifierOverflow, IdentifierQuote, SavepointSyntax,
};
pub use ddl::{AlterPiece, CreateFlags, DdlDialect};
pub use error::{PlatformError, Result};
pub use events::{EventResult, SchemaEventRegistry, SchemaEvents};
pub use expression::{DateIntervalUnit, DateOperator, ExpressionTranslator, TrimMode};
pub use limit::{LimitRewriter, LimitSpec, LimitStrategy};
pub use platform::{DateFormats, Dialect, Platform, Vendor};
pub use registry::{PlatformConfig, PlatformVariant};
pub use schema::{
    CheckConstraint, Column, ColumnDiff, ColumnProperty, DefaultValue, ForeignKey, Index, MatchType,
    ReferentialAction, Sequence, Table, TableDiff, UniqueConstraint,
};
pub use session::{SessionSql, TransactionIsolation};
pub use types::{LogicalType, TypeMapper};
pub use vendors::{
    FirebirdDialect, InformixDialect, MySqlDialect, OracleDialect, PostgresDialect,
    SqlServerDialect, SqliteDialect, SybaseDialect,
};
