//! Logical column types and their per-vendor declarations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::capabilities::Capabilities;
use crate::error::{PlatformError, Result};
use crate::platform::{DateFormats, Vendor};
use crate::schema::Column;

/// Portable column type, independent of any vendor's native type names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalType {
    /// 16-bit integer.
    SmallInt,
    /// 32-bit integer.
    Integer,
    /// 64-bit integer.
    BigInt,
    /// Exact numeric with precision and scale.
    Decimal,
    /// Double precision float.
    Float,
    /// Single precision float.
    SmallFloat,
    /// Variable or fixed length character data.
    String,
    /// Character data restricted to single-byte encodings.
    AsciiString,
    /// Large character data.
    Text,
    /// Variable or fixed length binary data.
    Binary,
    /// Large binary data.
    Blob,
    /// Boolean.
    Boolean,
    /// Calendar date.
    Date,
    /// Time of day.
    Time,
    /// Date and time without time zone.
    DateTime,
    /// Date and time with time zone.
    DateTimeTz,
    /// Globally unique identifier.
    Guid,
    /// JSON document.
    Json,
    /// Enumeration of string values.
    Enum,
}

impl LogicalType {
    /// Every logical type.
    pub const ALL: [Self; 19] = [
        Self::SmallInt,
        Self::Integer,
        Self::BigInt,
        Self::Decimal,
        Self::Float,
        Self::SmallFloat,
        Self::String,
        Self::AsciiString,
        Self::Text,
        Self::Binary,
        Self::Blob,
        Self::Boolean,
        Self::Date,
        Self::Time,
        Self::DateTime,
        Self::DateTimeTz,
        Self::Guid,
        Self::Json,
        Self::Enum,
    ];

    /// Returns the canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SmallInt => "smallint",
            Self::Integer => "integer",
            Self::BigInt => "bigint",
            Self::Decimal => "decimal",
            Self::Float => "float",
            Self::SmallFloat => "smallfloat",
            Self::String => "string",
            Self::AsciiString => "ascii_string",
            Self::Text => "text",
            Self::Binary => "binary",
            Self::Blob => "blob",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Time => "time",
            Self::DateTime => "datetime",
            Self::DateTimeTz => "datetimetz",
            Self::Guid => "guid",
            Self::Json => "json",
            Self::Enum => "enum",
        }
    }

    /// Returns true for the integer family.
    #[must_use]
    pub const fn is_integer(self) -> bool {
        matches!(self, Self::SmallInt | Self::Integer | Self::BigInt)
    }
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogicalType {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == lower)
            .ok_or_else(|| PlatformError::unsupported_type("any", s))
    }
}

/// Per-vendor declaration rules for each logical type.
///
/// Every method has an ANSI default; vendors override the ones their
/// engine spells differently. The length fallbacks (VARCHAR to CLOB,
/// BINARY to BLOB) live in [`declare`] and are shared by all vendors.
pub trait TypeMapper: Vendor {
    /// Returns false for logical types this vendor has no rule for.
    fn supports_type(&self, logical_type: LogicalType) -> bool {
        logical_type != LogicalType::Enum
    }

    /// Clause appended to integer declarations (autoincrement, unsigned).
    fn integer_modifiers(&self, _column: &Column) -> String {
        String::new()
    }

    /// SMALLINT declaration.
    fn smallint_declaration(&self, column: &Column) -> String {
        format!("SMALLINT{}", self.integer_modifiers(column))
    }

    /// INTEGER declaration.
    fn integer_declaration(&self, column: &Column) -> String {
        format!("INT{}", self.integer_modifiers(column))
    }

    /// BIGINT declaration.
    fn bigint_declaration(&self, column: &Column) -> String {
        format!("BIGINT{}", self.integer_modifiers(column))
    }

    /// Exact numeric declaration.
    fn decimal_declaration(&self, precision: u32, scale: u32) -> String {
        format!("NUMERIC({precision}, {scale})")
    }

    /// Double precision declaration.
    fn float_declaration(&self, _column: &Column) -> String {
        "DOUBLE PRECISION".to_string()
    }

    /// Single precision declaration.
    fn small_float_declaration(&self, _column: &Column) -> String {
        "REAL".to_string()
    }

    /// Character declaration for a length within the varchar ceiling.
    fn varchar_declaration(&self, length: u32, fixed: bool) -> String {
        if fixed {
            format!("CHAR({length})")
        } else {
            format!("VARCHAR({length})")
        }
    }

    /// Single-byte character declaration.
    fn ascii_string_declaration(&self, length: u32, fixed: bool) -> String {
        self.varchar_declaration(length, fixed)
    }

    /// Large character declaration.
    fn clob_declaration(&self, _column: &Column) -> String {
        "CLOB".to_string()
    }

    /// Binary declaration for a length within the binary ceiling.
    fn binary_declaration(&self, length: u32, fixed: bool) -> String {
        if fixed {
            format!("BINARY({length})")
        } else {
            format!("VARBINARY({length})")
        }
    }

    /// Large binary declaration.
    fn blob_declaration(&self, _column: &Column) -> String {
        "BLOB".to_string()
    }

    /// Boolean declaration.
    fn boolean_declaration(&self, _column: &Column) -> String {
        "BOOLEAN".to_string()
    }

    /// Date declaration.
    fn date_declaration(&self, _column: &Column) -> String {
        "DATE".to_string()
    }

    /// Time declaration.
    fn time_declaration(&self, _column: &Column) -> String {
        "TIME".to_string()
    }

    /// Timestamp declaration.
    fn datetime_declaration(&self, _column: &Column) -> String {
        "TIMESTAMP".to_string()
    }

    /// Timestamp with time zone declaration.
    fn datetimetz_declaration(&self, _column: &Column) -> String {
        "TIMESTAMP WITH TIME ZONE".to_string()
    }

    /// GUID declaration.
    fn guid_declaration(&self, _column: &Column) -> String {
        "CHAR(36)".to_string()
    }

    /// JSON declaration; large character data where there is no native type.
    fn json_declaration(&self, column: &Column) -> String {
        self.clob_declaration(column)
    }

    /// Enumeration declaration.
    fn enum_declaration(&self, column: &Column) -> String {
        let values: Vec<String> = column
            .values
            .iter()
            .map(|v| format!("'{}'", v.replace('\'', "''")))
            .collect();
        format!("ENUM({})", values.join(", "))
    }

    /// SQL literal for a boolean value.
    fn boolean_literal(&self, value: bool) -> &'static str {
        if value {
            "true"
        } else {
            "false"
        }
    }

    /// Date and time literal formats.
    fn date_formats(&self) -> DateFormats {
        DateFormats::default()
    }

    /// Native type names and the logical types they read back as.
    fn native_type_names(&self) -> Vec<(&'static str, LogicalType)> {
        vec![
            ("smallint", LogicalType::SmallInt),
            ("int", LogicalType::Integer),
            ("integer", LogicalType::Integer),
            ("bigint", LogicalType::BigInt),
            ("numeric", LogicalType::Decimal),
            ("decimal", LogicalType::Decimal),
            ("double precision", LogicalType::Float),
            ("real", LogicalType::SmallFloat),
            ("char", LogicalType::String),
            ("varchar", LogicalType::String),
            ("clob", LogicalType::Text),
            ("binary", LogicalType::Binary),
            ("varbinary", LogicalType::Binary),
            ("blob", LogicalType::Blob),
            ("boolean", LogicalType::Boolean),
            ("date", LogicalType::Date),
            ("time", LogicalType::Time),
            ("timestamp", LogicalType::DateTime),
            ("timestamp with time zone", LogicalType::DateTimeTz),
        ]
    }
}

/// Returns the native declaration for `column`.
///
/// A custom `column_definition` replaces the generated declaration.
/// Character and binary lengths above the platform ceiling fall back to
/// the CLOB and BLOB declarations.
///
/// # Errors
///
/// Returns `UnsupportedType` when the vendor has no rule for the column's
/// logical type.
pub fn declare<M>(mapper: &M, capabilities: &Capabilities, column: &Column) -> Result<String>
where
    M: TypeMapper + ?Sized,
{
    if let Some(ref definition) = column.column_definition {
        return Ok(definition.clone());
    }

    let logical_type = column.logical_type;
    if !mapper.supports_type(logical_type) {
        return Err(PlatformError::unsupported_type(
            mapper.name(),
            logical_type.as_str(),
        ));
    }

    let declaration = match logical_type {
        LogicalType::SmallInt => mapper.smallint_declaration(column),
        LogicalType::Integer => mapper.integer_declaration(column),
        LogicalType::BigInt => mapper.bigint_declaration(column),
        LogicalType::Decimal => {
            let precision = column.precision.filter(|p| *p > 0).unwrap_or(10);
            let scale = column.scale.unwrap_or(0);
            mapper.decimal_declaration(precision, scale)
        }
        LogicalType::Float => mapper.float_declaration(column),
        LogicalType::SmallFloat => mapper.small_float_declaration(column),
        LogicalType::String | LogicalType::AsciiString => {
            let length = effective_length(column.length, capabilities.varchar_default_length());
            if length > capabilities.varchar_max_length() {
                mapper.clob_declaration(column)
            } else if logical_type == LogicalType::AsciiString {
                mapper.ascii_string_declaration(length, column.fixed)
            } else {
                mapper.varchar_declaration(length, column.fixed)
            }
        }
        LogicalType::Text => mapper.clob_declaration(column),
        LogicalType::Binary => {
            let length = effective_length(column.length, capabilities.binary_default_length());
            if length > capabilities.binary_max_length() {
                mapper.blob_declaration(column)
            } else {
                mapper.binary_declaration(length, column.fixed)
            }
        }
        LogicalType::Blob => mapper.blob_declaration(column),
        LogicalType::Boolean => mapper.boolean_declaration(column),
        LogicalType::Date => mapper.date_declaration(column),
        LogicalType::Time => mapper.time_declaration(column),
        LogicalType::DateTime => mapper.datetime_declaration(column),
        LogicalType::DateTimeTz => mapper.datetimetz_declaration(column),
        LogicalType::Guid => mapper.guid_declaration(column),
        LogicalType::Json => mapper.json_declaration(column),
        LogicalType::Enum => {
            if column.values.is_empty() {
                return Err(PlatformError::invalid(format!(
                    "enum column '{}' declares no values",
                    column.name
                )));
            }
            mapper.enum_declaration(column)
        }
    };
    Ok(declaration)
}

fn effective_length(length: Option<u32>, default: u32) -> u32 {
    match length {
        None | Some(0) => default,
        Some(n) => n,
    }
}
