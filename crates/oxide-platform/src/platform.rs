//! The assembled platform value.
//!
//! A [`Platform`] is a vendor+version bundle: capability flags plus the
//! strategies that turn schema descriptors and queries into SQL text. It is
//! immutable once built and can be shared across threads.

use std::collections::HashMap;
use std::fmt::{self, Write as _};
use std::sync::Arc;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::capabilities::{CapabilityOverrides, Capabilities, IdentifierOverflow, SavepointSyntax};
use crate::ddl::DdlDialect;
use crate::error::{PlatformError, Result};
use crate::events::SchemaEventRegistry;
use crate::expression::ExpressionTranslator;
use crate::limit::{LimitRewriter, LimitSpec, LimitStrategy};
use crate::schema::{Column, DefaultValue};
use crate::session::{SessionSql, TransactionIsolation};
use crate::types::{self, LogicalType, TypeMapper};

/// Identifies the vendor a strategy belongs to.
pub trait Vendor: Send + Sync {
    /// Stable platform identifier, e.g. `mysql` or `mssql2012`.
    fn name(&self) -> &'static str;
}

/// Every per-vendor strategy a platform needs.
pub trait Dialect: TypeMapper + ExpressionTranslator + DdlDialect + SessionSql + fmt::Debug {}

impl<T> Dialect for T where
    T: TypeMapper + ExpressionTranslator + DdlDialect + SessionSql + fmt::Debug
{
}

/// chrono patterns for date and time literals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DateFormats {
    /// Timestamp without zone.
    pub date_time: String,
    /// Timestamp with zone.
    pub date_time_tz: String,
    /// Date.
    pub date: String,
    /// Time of day.
    pub time: String,
}

impl Default for DateFormats {
    fn default() -> Self {
        Self {
            date_time: "%Y-%m-%d %H:%M:%S".to_string(),
            date_time_tz: "%Y-%m-%d %H:%M:%S%z".to_string(),
            date: "%Y-%m-%d".to_string(),
            time: "%H:%M:%S".to_string(),
        }
    }
}

impl DateFormats {
    /// Checks every pattern parses.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` naming the first invalid pattern.
    pub fn validate(&self) -> Result<()> {
        for (label, pattern) in [
            ("date_time", &self.date_time),
            ("date_time_tz", &self.date_time_tz),
            ("date", &self.date),
            ("time", &self.time),
        ] {
            if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
                return Err(PlatformError::Configuration(format!(
                    "invalid {label} format '{pattern}'"
                )));
            }
        }
        Ok(())
    }
}

fn format_with(value: impl fmt::Display) -> Result<String> {
    let mut out = String::new();
    write!(out, "{value}").map_err(|_| PlatformError::invalid("value cannot be formatted"))?;
    Ok(out)
}

/// A vendor+version platform.
#[derive(Debug, Clone)]
pub struct Platform {
    dialect: Arc<dyn Dialect>,
    capabilities: Capabilities,
    limit: Arc<dyn LimitRewriter>,
    events: Option<Arc<SchemaEventRegistry>>,
    date_formats: DateFormats,
    type_names: OnceCell<HashMap<String, LogicalType>>,
}

impl Platform {
    /// Assembles a platform from its strategies.
    pub fn new<D>(dialect: D, capabilities: Capabilities, limit: LimitStrategy) -> Self
    where
        D: Dialect + 'static,
    {
        let date_formats = dialect.date_formats();
        Self {
            dialect: Arc::new(dialect),
            capabilities,
            limit: Arc::new(limit),
            events: None,
            date_formats,
            type_names: OnceCell::new(),
        }
    }

    /// Replaces the limit rewriter.
    #[must_use]
    pub fn with_limit_rewriter(mut self, rewriter: Arc<dyn LimitRewriter>) -> Self {
        self.limit = rewriter;
        self
    }

    /// Attaches schema event listeners.
    #[must_use]
    pub fn with_events(mut self, events: Arc<SchemaEventRegistry>) -> Self {
        self.events = Some(events);
        self
    }

    /// Replaces the date literal formats.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` for an unparsable pattern.
    pub fn with_date_formats(mut self, formats: DateFormats) -> Result<Self> {
        formats.validate()?;
        self.date_formats = formats;
        Ok(self)
    }

    /// Applies configured capability overrides.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` when the result is inconsistent.
    pub fn with_capability_overrides(mut self, overrides: &CapabilityOverrides) -> Result<Self> {
        self.capabilities = self.capabilities.with_overrides(overrides)?;
        Ok(self)
    }

    /// Stable platform identifier.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.dialect.name()
    }

    /// Capability flags.
    #[must_use]
    pub const fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Vendor strategies, for expressions and fine-grained DDL.
    #[must_use]
    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    /// Date literal formats.
    #[must_use]
    pub const fn date_formats(&self) -> &DateFormats {
        &self.date_formats
    }

    /// Copy of this platform with listeners detached.
    pub(crate) fn without_events(&self) -> Self {
        Self {
            events: None,
            ..self.clone()
        }
    }

    pub(crate) fn events(&self) -> Option<&SchemaEventRegistry> {
        self.events.as_deref()
    }

    /// Native declaration of a column's type.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedType` when the vendor has no rule for the type.
    pub fn declare_column(&self, column: &Column) -> Result<String> {
        types::declare(self.dialect.as_ref(), &self.capabilities, column)
    }

    /// Native declaration of a bare logical type with default modifiers.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedType` when the vendor has no rule for the type.
    pub fn declare_type(&self, logical_type: LogicalType) -> Result<String> {
        self.declare_column(&Column::new("", logical_type))
    }

    /// Reads a native type name back as a logical type.
    ///
    /// The lookup table is built on first use and shared afterwards.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedType` for a name the vendor does not map.
    pub fn resolve_type_name(&self, db_type: &str) -> Result<LogicalType> {
        let names = self.type_names.get_or_init(|| {
            trace!(platform = self.name(), "building type name cache");
            self.dialect
                .native_type_names()
                .into_iter()
                .map(|(name, logical)| (name.to_string(), logical))
                .collect()
        });
        names
            .get(&db_type.trim().to_ascii_lowercase())
            .copied()
            .ok_or_else(|| PlatformError::unsupported_type(self.name(), db_type))
    }

    /// SQL literal for a boolean.
    #[must_use]
    pub fn convert_boolean(&self, value: bool) -> &'static str {
        self.dialect.boolean_literal(value)
    }

    /// Quotes a possibly dotted identifier part by part.
    #[must_use]
    pub fn quote_identifier(&self, name: &str) -> String {
        name.split('.')
            .map(|part| self.quote_single_identifier(part))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Quotes one identifier, doubling embedded close quotes.
    #[must_use]
    pub fn quote_single_identifier(&self, name: &str) -> String {
        let quote = self.capabilities.identifier_quote();
        let escaped = name.replace(quote.close, &format!("{0}{0}", quote.close));
        format!("{}{escaped}{}", quote.open, quote.close)
    }

    /// Quotes a string literal.
    #[must_use]
    pub fn quote_string_literal(&self, value: &str) -> String {
        self.dialect.quote_string_literal(value)
    }

    /// Short deterministic name derived from `name`: the upper-case hex
    /// CRC32 of the name with dots replaced by underscores.
    #[must_use]
    pub fn generate_identifier_name(&self, name: &str) -> String {
        let normalized = name.replace('.', "_");
        format!("{:X}", crc32fast::hash(normalized.as_bytes()))
    }

    /// Fits a generated name within the identifier length limit.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedFeature` on platforms that reject long names.
    pub fn fix_schema_element_name(&self, name: &str) -> Result<String> {
        let max = self.capabilities.max_identifier_length();
        if name.chars().count() <= max {
            return Ok(name.to_string());
        }
        match self.capabilities.identifier_overflow() {
            IdentifierOverflow::Keep => Ok(name.to_string()),
            IdentifierOverflow::Truncate => Ok(name.chars().take(max).collect()),
            IdentifierOverflow::Reject => Err(self.identifier_too_long(name)),
        }
    }

    /// Rejects caller-supplied names over the limit on rejecting platforms.
    pub(crate) fn check_identifier(&self, name: &str) -> Result<()> {
        if self.capabilities.identifier_overflow() == IdentifierOverflow::Reject
            && name.chars().count() > self.capabilities.max_identifier_length()
        {
            return Err(self.identifier_too_long(name));
        }
        Ok(())
    }

    fn identifier_too_long(&self, name: &str) -> PlatformError {
        PlatformError::unsupported(
            self.name(),
            format!(
                "identifier '{name}' longer than {} characters",
                self.capabilities.max_identifier_length()
            ),
        )
    }

    /// Table name as emitted, with `schema.table` folded to
    /// `schema__table` where schemas are emulated.
    #[must_use]
    pub fn table_name(&self, name: &str) -> String {
        if !self.capabilities.supports_schemas() && self.capabilities.can_emulate_schemas() {
            name.replacen('.', "__", 1)
        } else {
            name.to_string()
        }
    }

    /// SQL for a default value.
    #[must_use]
    pub fn default_value_sql(&self, value: &DefaultValue) -> String {
        match value {
            DefaultValue::Null => "NULL".to_string(),
            DefaultValue::Boolean(b) => self.convert_boolean(*b).to_string(),
            DefaultValue::Integer(i) => i.to_string(),
            DefaultValue::Float(f) => f.to_string(),
            DefaultValue::String(s) => self.quote_string_literal(s),
            DefaultValue::Expression(e) => e.clone(),
            DefaultValue::CurrentTimestamp => self.dialect.current_timestamp_sql().to_string(),
            DefaultValue::CurrentDate => self.dialect.current_date_sql().to_string(),
            DefaultValue::CurrentTime => self.dialect.current_time_sql().to_string(),
        }
    }

    /// Applies LIMIT/OFFSET to a SELECT statement.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for negative values and `UnsupportedFeature`
    /// for an offset on a platform without offset support.
    pub fn modify_limit_query(
        &self,
        query: &str,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<String> {
        let spec = LimitSpec::new(limit, offset)?;
        if spec.offset() > 0 && !self.capabilities.supports_limit_offset() {
            return Err(PlatformError::unsupported(self.name(), "LIMIT with an OFFSET"));
        }
        self.limit.rewrite(self.name(), query, spec)
    }

    /// Statement setting the session isolation level.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for an unknown level.
    pub fn transaction_isolation_sql(&self, level: i32) -> Result<String> {
        let level = TransactionIsolation::try_from(level)?;
        Ok(self.dialect.transaction_isolation_sql(level))
    }

    /// Statement creating a savepoint.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedFeature` without savepoint support.
    pub fn create_savepoint_sql(&self, name: &str) -> Result<String> {
        if !self.capabilities.supports_savepoints() {
            return Err(PlatformError::unsupported(self.name(), "SAVEPOINT"));
        }
        Ok(match self.capabilities.savepoint_syntax() {
            SavepointSyntax::Standard => format!("SAVEPOINT {name}"),
            SavepointSyntax::Transaction => format!("SAVE TRANSACTION {name}"),
        })
    }

    /// Statement releasing a savepoint.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedFeature` without release support.
    pub fn release_savepoint_sql(&self, name: &str) -> Result<String> {
        if !self.capabilities.supports_release_savepoints() {
            return Err(PlatformError::unsupported(self.name(), "RELEASE SAVEPOINT"));
        }
        Ok(format!("RELEASE SAVEPOINT {name}"))
    }

    /// Statement rolling back to a savepoint.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedFeature` without savepoint support.
    pub fn rollback_savepoint_sql(&self, name: &str) -> Result<String> {
        if !self.capabilities.supports_savepoints() {
            return Err(PlatformError::unsupported(self.name(), "SAVEPOINT"));
        }
        Ok(match self.capabilities.savepoint_syntax() {
            SavepointSyntax::Standard => format!("ROLLBACK TO SAVEPOINT {name}"),
            SavepointSyntax::Transaction => format!("ROLLBACK TRANSACTION {name}"),
        })
    }

    /// SELECT of one expression without a table.
    #[must_use]
    pub fn dummy_select_sql(&self, expression: &str) -> String {
        self.dialect.dummy_select_sql(expression)
    }

    /// Row locking clause; empty when the vendor locks differently.
    #[must_use]
    pub fn for_update_sql(&self) -> &'static str {
        self.dialect.for_update_sql()
    }

    /// Timestamp literal text, unquoted.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the configured pattern cannot format the value.
    pub fn format_date_time(&self, value: &NaiveDateTime) -> Result<String> {
        format_with(value.format(&self.date_formats.date_time))
    }

    /// Timestamp with zone literal text, unquoted.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the configured pattern cannot format the value.
    pub fn format_date_time_tz(&self, value: &DateTime<FixedOffset>) -> Result<String> {
        format_with(value.format(&self.date_formats.date_time_tz))
    }

    /// Date literal text, unquoted.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the configured pattern cannot format the value.
    pub fn format_date(&self, value: &NaiveDate) -> Result<String> {
        format_with(value.format(&self.date_formats.date))
    }

    /// Time literal text, unquoted.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the configured pattern cannot format the value.
    pub fn format_time(&self, value: &NaiveTime) -> Result<String> {
        format_with(value.format(&self.date_formats.time))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::PlatformVariant;

    #[test]
    fn test_generate_identifier_name_is_deterministic() {
        let platform = PlatformVariant::SqlServer2012.platform();
        let a = platform.generate_identifier_name("orders");
        assert_eq!(a, platform.generate_identifier_name("orders"));
        assert_ne!(a, platform.generate_identifier_name("customers"));
        assert_eq!(a, a.to_uppercase());
        assert_eq!(
            platform.generate_identifier_name("s.orders"),
            platform.generate_identifier_name("s_orders")
        );
    }

    #[test]
    fn test_fix_schema_element_name() {
        let long = "a".repeat(40);
        let oracle = PlatformVariant::Oracle.platform();
        assert_eq!(oracle.fix_schema_element_name(&long).unwrap().len(), 30);

        let firebird = PlatformVariant::Firebird.platform();
        assert!(matches!(
            firebird.fix_schema_element_name(&long),
            Err(PlatformError::UnsupportedFeature { .. })
        ));

        let postgres = PlatformVariant::PostgreSql.platform();
        assert_eq!(postgres.fix_schema_element_name(&long).unwrap(), long);
    }

    #[test]
    fn test_quote_identifier() {
        let mysql = PlatformVariant::MySql.platform();
        assert_eq!(mysql.quote_identifier("db.t`x"), "`db`.`t``x`");
        let mssql = PlatformVariant::SqlServer2008.platform();
        assert_eq!(mssql.quote_identifier("dbo.users"), "[dbo].[users]");
    }

    #[test]
    fn test_resolve_type_name() {
        let postgres = PlatformVariant::PostgreSql.platform();
        assert_eq!(postgres.resolve_type_name("JSONB").unwrap(), LogicalType::Json);
        assert_eq!(postgres.resolve_type_name("int4").unwrap(), LogicalType::Integer);
        assert!(matches!(
            postgres.resolve_type_name("geometry"),
            Err(PlatformError::UnsupportedType { .. })
        ));
    }

    #[test]
    fn test_savepoints() {
        let mssql = PlatformVariant::SqlServer2008.platform();
        assert_eq!(mssql.create_savepoint_sql("sp1").unwrap(), "SAVE TRANSACTION sp1");
        assert!(mssql.release_savepoint_sql("sp1").is_err());

        let postgres = PlatformVariant::PostgreSql.platform();
        assert_eq!(postgres.release_savepoint_sql("sp1").unwrap(), "RELEASE SAVEPOINT sp1");
        assert_eq!(
            postgres.rollback_savepoint_sql("sp1").unwrap(),
            "ROLLBACK TO SAVEPOINT sp1"
        );
    }

    #[test]
    fn test_date_formats() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let time = NaiveTime::from_hms_opt(13, 5, 9).unwrap();
        let platform = PlatformVariant::MySql.platform();
        assert_eq!(platform.format_date(&date).unwrap(), "2024-02-29");
        assert_eq!(
            platform.format_date_time(&date.and_time(time)).unwrap(),
            "2024-02-29 13:05:09"
        );

        let bad = DateFormats {
            date: "%Q".to_string(),
            ..DateFormats::default()
        };
        assert!(platform.with_date_formats(bad).is_err());
    }

    #[test]
    fn test_offset_rejected_without_support() {
        let sybase = PlatformVariant::Sybase.platform();
        assert!(matches!(
            sybase.modify_limit_query("SELECT * FROM t", Some(10), Some(5)),
            Err(PlatformError::UnsupportedFeature { .. })
        ));
        assert_eq!(
            sybase.modify_limit_query("SELECT * FROM t", Some(10), None).unwrap(),
            "SELECT TOP 10 * FROM t"
        );
    }
}
