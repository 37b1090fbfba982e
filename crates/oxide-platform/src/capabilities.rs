//! Capability flags describing what a target engine supports.
//!
//! Defaults follow conservative ANSI behavior. Every vendor starts from
//! [`Capabilities::ansi`] and flips the flags it differs on. A subset of the
//! flags may be overridden through configuration with
//! [`CapabilityOverrides`].

use serde::{Deserialize, Serialize};

use crate::error::{PlatformError, Result};

/// What to do with a generated identifier that exceeds
/// [`Capabilities::max_identifier_length`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierOverflow {
    /// Leave the name untouched and let the engine decide.
    #[default]
    Keep,
    /// Silently cut the name down to the maximum length.
    Truncate,
    /// Refuse the name with an `UnsupportedFeature` error.
    Reject,
}

/// Savepoint statement family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SavepointSyntax {
    /// `SAVEPOINT x` / `RELEASE SAVEPOINT x` / `ROLLBACK TO SAVEPOINT x`.
    #[default]
    Standard,
    /// `SAVE TRANSACTION x` / `ROLLBACK TRANSACTION x`.
    Transaction,
}

/// Opening and closing identifier quote characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentifierQuote {
    /// Opening quote.
    pub open: char,
    /// Closing quote, doubled when it appears inside a name.
    pub close: char,
}

impl IdentifierQuote {
    /// ANSI double quotes.
    pub const DOUBLE: Self = Self {
        open: '"',
        close: '"',
    };
    /// MySQL backticks.
    pub const BACKTICK: Self = Self {
        open: '`',
        close: '`',
    };
    /// T-SQL square brackets.
    pub const BRACKET: Self = Self {
        open: '[',
        close: ']',
    };
}

/// The capability set of one platform.
///
/// Values are fixed once the platform is built; every getter is a plain
/// field read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capabilities {
    pub(crate) supports_sequences: bool,
    pub(crate) supports_identity_columns: bool,
    pub(crate) prefers_sequences: bool,
    pub(crate) prefers_identity_columns: bool,
    pub(crate) supports_savepoints: bool,
    pub(crate) supports_release_savepoints: bool,
    pub(crate) supports_foreign_key_constraints: bool,
    pub(crate) supports_foreign_key_on_update: bool,
    pub(crate) supports_alter_foreign_keys: bool,
    pub(crate) supports_limit_offset: bool,
    pub(crate) supports_inline_column_comments: bool,
    pub(crate) supports_comment_on_statement: bool,
    pub(crate) supports_schemas: bool,
    pub(crate) can_emulate_schemas: bool,
    pub(crate) supports_partial_indexes: bool,
    pub(crate) supports_column_collation: bool,
    pub(crate) supports_rename_table: bool,
    pub(crate) supports_rename_index: bool,
    pub(crate) uses_named_default_constraints: bool,
    pub(crate) max_identifier_length: usize,
    pub(crate) varchar_max_length: u32,
    pub(crate) varchar_default_length: u32,
    pub(crate) binary_max_length: u32,
    pub(crate) binary_default_length: u32,
    pub(crate) max_index_fields: usize,
    pub(crate) identifier_overflow: IdentifierOverflow,
    pub(crate) identifier_quote: IdentifierQuote,
    pub(crate) savepoint_syntax: SavepointSyntax,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::ansi()
    }
}

impl Capabilities {
    /// The conservative ANSI baseline every vendor starts from.
    #[must_use]
    pub const fn ansi() -> Self {
        Self {
            supports_sequences: false,
            supports_identity_columns: false,
            prefers_sequences: false,
            prefers_identity_columns: false,
            supports_savepoints: true,
            supports_release_savepoints: true,
            supports_foreign_key_constraints: true,
            supports_foreign_key_on_update: true,
            supports_alter_foreign_keys: true,
            supports_limit_offset: true,
            supports_inline_column_comments: false,
            supports_comment_on_statement: false,
            supports_schemas: false,
            can_emulate_schemas: false,
            supports_partial_indexes: false,
            supports_column_collation: false,
            supports_rename_table: true,
            supports_rename_index: false,
            uses_named_default_constraints: false,
            max_identifier_length: 63,
            varchar_max_length: 4000,
            varchar_default_length: 255,
            binary_max_length: 4000,
            binary_default_length: 255,
            max_index_fields: 16,
            identifier_overflow: IdentifierOverflow::Keep,
            identifier_quote: IdentifierQuote::DOUBLE,
            savepoint_syntax: SavepointSyntax::Standard,
        }
    }

    /// Whether the platform has sequence objects.
    #[must_use]
    pub const fn supports_sequences(&self) -> bool {
        self.supports_sequences
    }

    /// Whether the platform has native identity/autoincrement columns.
    #[must_use]
    pub const fn supports_identity_columns(&self) -> bool {
        self.supports_identity_columns
    }

    /// Whether sequences are the preferred ID-generation strategy.
    #[must_use]
    pub const fn prefers_sequences(&self) -> bool {
        self.prefers_sequences
    }

    /// Whether identity columns are the preferred ID-generation strategy.
    #[must_use]
    pub const fn prefers_identity_columns(&self) -> bool {
        self.prefers_identity_columns
    }

    /// Whether savepoints can be created.
    #[must_use]
    pub const fn supports_savepoints(&self) -> bool {
        self.supports_savepoints
    }

    /// Whether savepoints can be released explicitly.
    #[must_use]
    pub const fn supports_release_savepoints(&self) -> bool {
        self.supports_release_savepoints
    }

    /// Whether foreign key constraints are emitted at all.
    #[must_use]
    pub const fn supports_foreign_key_constraints(&self) -> bool {
        self.supports_foreign_key_constraints
    }

    /// Whether `ON UPDATE` referential actions are emitted.
    #[must_use]
    pub const fn supports_foreign_key_on_update(&self) -> bool {
        self.supports_foreign_key_on_update
    }

    /// Whether foreign keys can be added and dropped with `ALTER TABLE`.
    ///
    /// When false, foreign keys are declared inline in `CREATE TABLE`.
    #[must_use]
    pub const fn supports_alter_foreign_keys(&self) -> bool {
        self.supports_alter_foreign_keys
    }

    /// Whether an offset can be applied to a limited query.
    #[must_use]
    pub const fn supports_limit_offset(&self) -> bool {
        self.supports_limit_offset
    }

    /// Whether column comments are written inside the column declaration.
    #[must_use]
    pub const fn supports_inline_column_comments(&self) -> bool {
        self.supports_inline_column_comments
    }

    /// Whether column comments are written with `COMMENT ON COLUMN`.
    #[must_use]
    pub const fn supports_comment_on_statement(&self) -> bool {
        self.supports_comment_on_statement
    }

    /// Whether names may be schema-qualified.
    #[must_use]
    pub const fn supports_schemas(&self) -> bool {
        self.supports_schemas
    }

    /// Whether schemas are emulated through name munging.
    #[must_use]
    pub const fn can_emulate_schemas(&self) -> bool {
        self.can_emulate_schemas
    }

    /// Whether indexes may carry a `WHERE` predicate.
    #[must_use]
    pub const fn supports_partial_indexes(&self) -> bool {
        self.supports_partial_indexes
    }

    /// Whether per-column collations are emitted.
    #[must_use]
    pub const fn supports_column_collation(&self) -> bool {
        self.supports_column_collation
    }

    /// Whether tables can be renamed in place.
    #[must_use]
    pub const fn supports_rename_table(&self) -> bool {
        self.supports_rename_table
    }

    /// Whether indexes can be renamed in place.
    #[must_use]
    pub const fn supports_rename_index(&self) -> bool {
        self.supports_rename_index
    }

    /// Whether column defaults live in separately named constraints.
    #[must_use]
    pub const fn uses_named_default_constraints(&self) -> bool {
        self.uses_named_default_constraints
    }

    /// Maximum identifier length.
    #[must_use]
    pub const fn max_identifier_length(&self) -> usize {
        self.max_identifier_length
    }

    /// Maximum length of a variable-length character column.
    #[must_use]
    pub const fn varchar_max_length(&self) -> u32 {
        self.varchar_max_length
    }

    /// Length used when a character column declares none.
    #[must_use]
    pub const fn varchar_default_length(&self) -> u32 {
        self.varchar_default_length
    }

    /// Maximum length of a variable-length binary column.
    #[must_use]
    pub const fn binary_max_length(&self) -> u32 {
        self.binary_max_length
    }

    /// Length used when a binary column declares none.
    #[must_use]
    pub const fn binary_default_length(&self) -> u32 {
        self.binary_default_length
    }

    /// Maximum number of columns in one index.
    #[must_use]
    pub const fn max_index_fields(&self) -> usize {
        self.max_index_fields
    }

    /// Behavior for over-long generated identifiers.
    #[must_use]
    pub const fn identifier_overflow(&self) -> IdentifierOverflow {
        self.identifier_overflow
    }

    /// Identifier quote characters.
    #[must_use]
    pub const fn identifier_quote(&self) -> IdentifierQuote {
        self.identifier_quote
    }

    /// Savepoint statement family.
    #[must_use]
    pub const fn savepoint_syntax(&self) -> SavepointSyntax {
        self.savepoint_syntax
    }

    /// Applies configuration overrides and re-checks the flag invariants.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` when the result enables release-savepoints
    /// without savepoints, or `ON UPDATE` without foreign keys.
    pub fn with_overrides(mut self, overrides: &CapabilityOverrides) -> Result<Self> {
        if let Some(v) = overrides.supports_savepoints {
            self.supports_savepoints = v;
        }
        if let Some(v) = overrides.supports_release_savepoints {
            self.supports_release_savepoints = v;
        }
        if let Some(v) = overrides.supports_foreign_key_constraints {
            self.supports_foreign_key_constraints = v;
        }
        if let Some(v) = overrides.supports_foreign_key_on_update {
            self.supports_foreign_key_on_update = v;
        }
        if let Some(v) = overrides.supports_inline_column_comments {
            self.supports_inline_column_comments = v;
        }
        if let Some(v) = overrides.supports_comment_on_statement {
            self.supports_comment_on_statement = v;
        }
        if let Some(v) = overrides.max_identifier_length {
            self.max_identifier_length = v;
        }
        if let Some(v) = overrides.identifier_overflow {
            self.identifier_overflow = v;
        }
        self.validate()?;
        Ok(self)
    }

    /// Checks the implications between flags.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` describing the first violated implication.
    pub fn validate(&self) -> Result<()> {
        if self.supports_release_savepoints && !self.supports_savepoints {
            return Err(PlatformError::Configuration(
                "release savepoints requires savepoint support".to_string(),
            ));
        }
        if self.supports_foreign_key_on_update && !self.supports_foreign_key_constraints {
            return Err(PlatformError::Configuration(
                "foreign key ON UPDATE requires foreign key support".to_string(),
            ));
        }
        if self.max_identifier_length == 0 {
            return Err(PlatformError::Configuration(
                "max identifier length must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Capability flags that configuration may override.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CapabilityOverrides {
    /// Override for [`Capabilities::supports_savepoints`].
    pub supports_savepoints: Option<bool>,
    /// Override for [`Capabilities::supports_release_savepoints`].
    pub supports_release_savepoints: Option<bool>,
    /// Override for [`Capabilities::supports_foreign_key_constraints`].
    pub supports_foreign_key_constraints: Option<bool>,
    /// Override for [`Capabilities::supports_foreign_key_on_update`].
    pub supports_foreign_key_on_update: Option<bool>,
    /// Override for [`Capabilities::supports_inline_column_comments`].
    pub supports_inline_column_comments: Option<bool>,
    /// Override for [`Capabilities::supports_comment_on_statement`].
    pub supports_comment_on_statement: Option<bool>,
    /// Override for [`Capabilities::max_identifier_length`].
    pub max_identifier_length: Option<usize>,
    /// Override for [`Capabilities::identifier_overflow`].
    pub identifier_overflow: Option<IdentifierOverflow>,
}

impl CapabilityOverrides {
    /// Returns true if nothing is overridden.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
