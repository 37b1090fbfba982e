//! Column descriptors.

use std::collections::BTreeMap;

use crate::error::{PlatformError, Result};
use crate::types::LogicalType;

/// Default value of a column.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    /// `DEFAULT NULL`.
    Null,
    /// Boolean literal, rendered through the platform's boolean conversion.
    Boolean(bool),
    /// Integer literal.
    Integer(i64),
    /// Floating point literal.
    Float(f64),
    /// String literal, quoted and escaped by the platform.
    String(String),
    /// Raw SQL expression, emitted verbatim.
    Expression(String),
    /// The platform's current timestamp expression.
    CurrentTimestamp,
    /// The platform's current date expression.
    CurrentDate,
    /// The platform's current time expression.
    CurrentTime,
}

/// Semantic definition of a table column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Logical (portable) type.
    pub logical_type: LogicalType,
    /// Length for character and binary types.
    pub length: Option<u32>,
    /// Precision for decimal types.
    pub precision: Option<u32>,
    /// Scale for decimal types.
    pub scale: Option<u32>,
    /// Unsigned numeric column.
    pub unsigned: bool,
    /// Fixed-length character or binary column.
    pub fixed: bool,
    /// Whether the column rejects NULL.
    pub notnull: bool,
    /// Default value.
    pub default: Option<DefaultValue>,
    /// Engine-generated value on insert.
    pub autoincrement: bool,
    /// Column comment.
    pub comment: Option<String>,
    /// Full custom declaration replacing the generated one.
    pub column_definition: Option<String>,
    /// Collation name.
    pub collation: Option<String>,
    /// Character set name.
    pub charset: Option<String>,
    /// Allowed values for enumeration columns.
    pub values: Vec<String>,
    /// Column-level CHECK expression.
    pub check: Option<String>,
    /// Vendor-specific options (for example `jsonb` on PostgreSQL).
    pub platform_options: BTreeMap<String, String>,
}

impl Column {
    /// Creates a nullable column with no modifiers.
    #[must_use]
    pub fn new(name: impl Into<String>, logical_type: LogicalType) -> Self {
        Self {
            name: name.into(),
            logical_type,
            length: None,
            precision: None,
            scale: None,
            unsigned: false,
            fixed: false,
            notnull: false,
            default: None,
            autoincrement: false,
            comment: None,
            column_definition: None,
            collation: None,
            charset: None,
            values: Vec::new(),
            check: None,
            platform_options: BTreeMap::new(),
        }
    }

    /// Sets the length.
    #[must_use]
    pub const fn length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    /// Sets precision and scale.
    #[must_use]
    pub const fn precision(mut self, precision: u32, scale: u32) -> Self {
        self.precision = Some(precision);
        self.scale = Some(scale);
        self
    }

    /// Marks the column unsigned.
    #[must_use]
    pub const fn unsigned(mut self) -> Self {
        self.unsigned = true;
        self
    }

    /// Marks the column fixed-length.
    #[must_use]
    pub const fn fixed(mut self) -> Self {
        self.fixed = true;
        self
    }

    /// Marks the column NOT NULL.
    #[must_use]
    pub const fn not_null(mut self) -> Self {
        self.notnull = true;
        self
    }

    /// Marks the column auto-incrementing.
    #[must_use]
    pub const fn autoincrement(mut self) -> Self {
        self.autoincrement = true;
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn default_value(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }

    /// Sets the comment.
    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Replaces the generated declaration with a custom one.
    #[must_use]
    pub fn column_definition(mut self, definition: impl Into<String>) -> Self {
        self.column_definition = Some(definition.into());
        self
    }

    /// Sets the collation.
    #[must_use]
    pub fn collation(mut self, collation: impl Into<String>) -> Self {
        self.collation = Some(collation.into());
        self
    }

    /// Sets the character set.
    #[must_use]
    pub fn charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into());
        self
    }

    /// Sets the enumeration values.
    #[must_use]
    pub fn values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values = values.into_iter().map(Into::into).collect();
        self
    }

    /// Sets a column-level CHECK expression.
    #[must_use]
    pub fn check(mut self, expression: impl Into<String>) -> Self {
        self.check = Some(expression.into());
        self
    }

    /// Sets a vendor-specific option.
    #[must_use]
    pub fn platform_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.platform_options.insert(key.into(), value.into());
        self
    }

    /// Returns true if the vendor option is set to a truthy value.
    #[must_use]
    pub fn has_platform_option(&self, key: &str) -> bool {
        self.platform_options
            .get(key)
            .is_some_and(|v| !matches!(v.as_str(), "" | "0" | "false"))
    }

    /// Returns the comment if it is non-empty.
    #[must_use]
    pub fn comment_text(&self) -> Option<&str> {
        self.comment.as_deref().filter(|c| !c.is_empty())
    }

    /// Checks the descriptor is usable for synthesis.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for an empty name or an enumeration without
    /// values.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(PlatformError::invalid("column name must not be empty"));
        }
        if self.logical_type == LogicalType::Enum && self.values.is_empty() {
            return Err(PlatformError::invalid(format!(
                "enum column '{}' declares no values",
                self.name
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_modifiers() {
        let col = Column::new("price", LogicalType::Decimal)
            .precision(12, 2)
            .unsigned()
            .not_null()
            .default_value(DefaultValue::Integer(0));
        assert_eq!(col.precision, Some(12));
        assert_eq!(col.scale, Some(2));
        assert!(col.unsigned);
        assert!(col.notnull);
        assert_eq!(col.default, Some(DefaultValue::Integer(0)));
    }

    #[test]
    fn test_platform_option_truthiness() {
        let col = Column::new("doc", LogicalType::Json).platform_option("jsonb", "true");
        assert!(col.has_platform_option("jsonb"));
        let col = Column::new("doc", LogicalType::Json).platform_option("jsonb", "false");
        assert!(!col.has_platform_option("jsonb"));
    }

    #[test]
    fn test_validate() {
        assert!(Column::new("", LogicalType::Integer).validate().is_err());
        assert!(Column::new("state", LogicalType::Enum).validate().is_err());
        assert!(Column::new("state", LogicalType::Enum)
            .values(["open", "closed"])
            .validate()
            .is_ok());
    }

    #[test]
    fn test_empty_comment_is_ignored() {
        let col = Column::new("a", LogicalType::Integer).comment("");
        assert_eq!(col.comment_text(), None);
    }
}
