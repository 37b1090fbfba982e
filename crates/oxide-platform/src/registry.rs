//! Platform lookup by name or by vendor and server version.
//!
//! ```
//! use oxide_platform::{PlatformConfig, PlatformVariant};
//!
//! let variant = PlatformVariant::from_version("postgresql", "13.4").unwrap();
//! assert_eq!(variant, PlatformVariant::PostgreSql10);
//!
//! let platform = PlatformConfig::from_json(r#"{"platform": "mysql80"}"#)
//!     .unwrap()
//!     .build()
//!     .unwrap();
//! assert_eq!(platform.name(), "mysql80");
//! ```

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::capabilities::CapabilityOverrides;
use crate::error::{PlatformError, Result};
use crate::platform::{DateFormats, Platform};
use crate::vendors::{
    FirebirdDialect, InformixDialect, MySqlDialect, OracleDialect, PostgresDialect,
    SqlServerDialect, SqliteDialect, SybaseDialect,
};

static VERSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d+)(?:\.(\d+))?(?:\.(\d+))?").expect("valid regex"));

/// Every platform this crate can assemble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformVariant {
    /// MySQL 5.6 and earlier.
    MySql,
    /// MySQL 5.7.
    MySql57,
    /// MySQL 8.0 and later.
    MySql80,
    /// PostgreSQL 9.x.
    PostgreSql,
    /// PostgreSQL 10 and later.
    PostgreSql10,
    /// SQLite 3.
    Sqlite,
    /// SQL Server 2008.
    SqlServer2008,
    /// SQL Server 2012 and later.
    SqlServer2012,
    /// Oracle.
    Oracle,
    /// Firebird.
    Firebird,
    /// Informix.
    Informix,
    /// Sybase ASE.
    Sybase,
}

impl PlatformVariant {
    /// All variants, oldest version first within a vendor.
    pub const ALL: [Self; 12] = [
        Self::MySql,
        Self::MySql57,
        Self::MySql80,
        Self::PostgreSql,
        Self::PostgreSql10,
        Self::Sqlite,
        Self::SqlServer2008,
        Self::SqlServer2012,
        Self::Oracle,
        Self::Firebird,
        Self::Informix,
        Self::Sybase,
    ];

    /// Stable platform identifier, identical to [`Platform::name`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::MySql => "mysql",
            Self::MySql57 => "mysql57",
            Self::MySql80 => "mysql80",
            Self::PostgreSql => "postgresql",
            Self::PostgreSql10 => "postgresql10",
            Self::Sqlite => "sqlite",
            Self::SqlServer2008 => "mssql2008",
            Self::SqlServer2012 => "mssql2012",
            Self::Oracle => "oracle",
            Self::Firebird => "firebird",
            Self::Informix => "informix",
            Self::Sybase => "sybase",
        }
    }

    /// Assembles the platform with default capabilities.
    #[must_use]
    pub fn platform(self) -> Platform {
        match self {
            Self::MySql => MySqlDialect::MYSQL56.platform(),
            Self::MySql57 => MySqlDialect::MYSQL57.platform(),
            Self::MySql80 => MySqlDialect::MYSQL80.platform(),
            Self::PostgreSql => PostgresDialect::POSTGRESQL.platform(),
            Self::PostgreSql10 => PostgresDialect::POSTGRESQL10.platform(),
            Self::Sqlite => SqliteDialect.platform(),
            Self::SqlServer2008 => SqlServerDialect::MSSQL2008.platform(),
            Self::SqlServer2012 => SqlServerDialect::MSSQL2012.platform(),
            Self::Oracle => OracleDialect.platform(),
            Self::Firebird => FirebirdDialect.platform(),
            Self::Informix => InformixDialect.platform(),
            Self::Sybase => SybaseDialect.platform(),
        }
    }

    /// Picks the variant for a vendor and its reported server version.
    ///
    /// The vendor accepts common aliases (`postgres`, `pgsql`, `sqlserver`,
    /// `sqlite3`, ...). MariaDB version strings resolve to the MySQL 5.7
    /// feature set.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for an unknown vendor or a version string
    /// without a leading major number.
    pub fn from_version(vendor: &str, version: &str) -> Result<Self> {
        let vendor = vendor.trim().to_ascii_lowercase();
        let (major, minor) = parse_version(version)?;
        let variant = match vendor.as_str() {
            "mysql" | "mariadb" => {
                if vendor == "mariadb" || version.to_ascii_lowercase().contains("mariadb") {
                    Self::MySql57
                } else if major >= 8 {
                    Self::MySql80
                } else if major == 5 && minor >= 7 {
                    Self::MySql57
                } else {
                    Self::MySql
                }
            }
            "postgresql" | "postgres" | "pgsql" => {
                if major >= 10 {
                    Self::PostgreSql10
                } else {
                    Self::PostgreSql
                }
            }
            "mssql" | "sqlserver" | "sqlsrv" => {
                if major >= 11 {
                    Self::SqlServer2012
                } else {
                    Self::SqlServer2008
                }
            }
            "sqlite" | "sqlite3" => Self::Sqlite,
            "oracle" | "oci" => Self::Oracle,
            "firebird" => Self::Firebird,
            "informix" => Self::Informix,
            "sybase" | "ase" => Self::Sybase,
            other => return Err(PlatformError::invalid(format!("unknown vendor '{other}'"))),
        };
        debug!(vendor = %vendor, version, platform = variant.name(), "resolved platform");
        Ok(variant)
    }
}

fn parse_version(version: &str) -> Result<(u32, u32)> {
    let captures = VERSION
        .captures(version)
        .ok_or_else(|| PlatformError::invalid(format!("unparsable version '{version}'")))?;
    let number = |index: usize| -> Result<u32> {
        captures.get(index).map_or(Ok(0), |m| {
            m.as_str()
                .parse()
                .map_err(|_| PlatformError::invalid(format!("unparsable version '{version}'")))
        })
    };
    Ok((number(1)?, number(2)?))
}

impl fmt::Display for PlatformVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PlatformVariant {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|variant| variant.name() == wanted)
            .ok_or_else(|| PlatformError::invalid(format!("unknown platform '{s}'")))
    }
}

/// Serialized platform selection.
///
/// Either `platform` names a variant directly (`"mssql2012"`), or it names a
/// vendor and `version` picks the variant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlatformConfig {
    /// Platform name, or vendor name when `version` is set.
    pub platform: String,
    /// Reported server version.
    #[serde(default)]
    pub version: Option<String>,
    /// Capability overrides.
    #[serde(default)]
    pub capabilities: CapabilityOverrides,
    /// Date literal formats; vendor defaults when absent.
    #[serde(default)]
    pub date_formats: Option<DateFormats>,
}

impl PlatformConfig {
    /// Parses a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns `Json` when the document does not deserialize.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Resolves the variant this configuration selects.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for an unknown platform or vendor.
    pub fn variant(&self) -> Result<PlatformVariant> {
        match &self.version {
            Some(version) => PlatformVariant::from_version(&self.platform, version),
            None => self.platform.parse(),
        }
    }

    /// Builds the configured platform.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for an unknown platform, or `Configuration`
    /// when overrides or date formats are invalid.
    pub fn build(&self) -> Result<Platform> {
        let mut platform = self.variant()?.platform();
        if !self.capabilities.is_empty() {
            platform = platform.with_capability_overrides(&self.capabilities)?;
        }
        if let Some(formats) = &self.date_formats {
            platform = platform.with_date_formats(formats.clone())?;
        }
        Ok(platform)
    }
}
