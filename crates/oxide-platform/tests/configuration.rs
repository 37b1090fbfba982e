//! Platform selection and configuration overrides.

use chrono::NaiveDate;
use oxide_platform::{PlatformConfig, PlatformError, PlatformVariant};

#[test]
fn test_overrides_change_capabilities() {
    let config = PlatformConfig::from_json(
        r#"{
            "platform": "postgresql",
            "capabilities": {
                "supports_release_savepoints": false,
                "max_identifier_length": 20,
                "identifier_overflow": "truncate"
            }
        }"#,
    )
    .unwrap();
    let platform = config.build().unwrap();

    assert!(platform.capabilities().supports_savepoints());
    assert!(matches!(
        platform.release_savepoint_sql("sp1"),
        Err(PlatformError::UnsupportedFeature { .. })
    ));
    assert_eq!(
        platform.fix_schema_element_name("a_very_long_generated_name").unwrap(),
        "a_very_long_generate"
    );

    let defaults = PlatformVariant::PostgreSql.platform();
    assert!(defaults.capabilities().supports_release_savepoints());
}

#[test]
fn test_inconsistent_overrides_rejected() {
    let config = PlatformConfig::from_json(
        r#"{"platform": "mysql", "capabilities": {"supports_savepoints": false}}"#,
    )
    .unwrap();
    assert!(matches!(config.build(), Err(PlatformError::Configuration(_))));
}

#[test]
fn test_date_formats_from_config() {
    let config = PlatformConfig::from_json(
        r#"{"platform": "oracle", "date_formats": {"date": "%d.%m.%Y"}}"#,
    )
    .unwrap();
    let platform = config.build().unwrap();
    let date = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
    assert_eq!(platform.format_date(&date).unwrap(), "01.07.2024");
}

#[test]
fn test_invalid_date_format_rejected() {
    let config = PlatformConfig::from_json(
        r#"{"platform": "sqlite", "date_formats": {"time": "%Q"}}"#,
    )
    .unwrap();
    assert!(matches!(config.build(), Err(PlatformError::Configuration(_))));
}

#[test]
fn test_vendor_and_version() {
    let config =
        PlatformConfig::from_json(r#"{"platform": "sqlserver", "version": "10.50"}"#).unwrap();
    assert_eq!(config.variant().unwrap(), PlatformVariant::SqlServer2008);
    assert_eq!(config.build().unwrap().name(), "mssql2008");
}

#[test]
fn test_unknown_platform() {
    let config = PlatformConfig::from_json(r#"{"platform": "access"}"#).unwrap();
    assert!(matches!(config.build(), Err(PlatformError::InvalidArgument(_))));
    assert!(matches!(
        PlatformConfig::from_json("{not json"),
        Err(PlatformError::Json(_))
    ));
}

#[test]
fn test_isolation_levels() {
    let mysql = PlatformVariant::MySql.platform();
    assert!(mysql.transaction_isolation_sql(2).is_ok());
    assert!(matches!(
        mysql.transaction_isolation_sql(7),
        Err(PlatformError::InvalidArgument(_))
    ));
}
