//! Type declarations, capability getters and generated names.

mod common;

use common::platform;
use oxide_platform::{Column, LogicalType, PlatformError, PlatformVariant};

// =============================================================================
// Declarations
// =============================================================================

#[test]
fn test_boolean_declarations() {
    assert_eq!(platform("mysql").declare_type(LogicalType::Boolean).unwrap(), "TINYINT(1)");
    assert_eq!(platform("oracle").declare_type(LogicalType::Boolean).unwrap(), "NUMBER(1)");
    assert_eq!(platform("mssql2012").declare_type(LogicalType::Boolean).unwrap(), "BIT");
    assert_eq!(platform("postgresql").declare_type(LogicalType::Boolean).unwrap(), "BOOLEAN");
}

#[test]
fn test_varchar_boundary_is_inclusive() {
    let postgres = platform("postgresql");
    let max = postgres.capabilities().varchar_max_length();
    let at_max = Column::new("c", LogicalType::String).length(max);
    let above_max = Column::new("c", LogicalType::String).length(max + 1);
    assert_eq!(postgres.declare_column(&at_max).unwrap(), format!("VARCHAR({max})"));
    assert_eq!(postgres.declare_column(&above_max).unwrap(), "TEXT");

    let oracle = platform("oracle");
    let max = oracle.capabilities().varchar_max_length();
    assert_eq!(
        oracle.declare_column(&Column::new("c", LogicalType::String).length(max)).unwrap(),
        format!("VARCHAR2({max})")
    );
    assert_eq!(
        oracle.declare_column(&Column::new("c", LogicalType::String).length(max + 1)).unwrap(),
        "CLOB"
    );
}

#[test]
fn test_json_follows_version() {
    assert_eq!(platform("mysql").declare_type(LogicalType::Json).unwrap(), "LONGTEXT");
    assert_eq!(platform("mysql57").declare_type(LogicalType::Json).unwrap(), "JSON");
    let jsonb = Column::new("doc", LogicalType::Json).platform_option("jsonb", "true");
    assert_eq!(platform("postgresql").declare_column(&jsonb).unwrap(), "JSONB");
}

#[test]
fn test_unmapped_type_is_an_error() {
    assert!(matches!(
        platform("sybase").declare_type(LogicalType::DateTimeTz),
        Err(PlatformError::UnsupportedType { .. })
    ));
}

#[test]
fn test_every_platform_declares_core_types() {
    let core = [
        LogicalType::SmallInt,
        LogicalType::Integer,
        LogicalType::BigInt,
        LogicalType::Decimal,
        LogicalType::String,
        LogicalType::Text,
        LogicalType::Blob,
        LogicalType::Boolean,
        LogicalType::Date,
        LogicalType::DateTime,
    ];
    for variant in PlatformVariant::ALL {
        let platform = variant.platform();
        for logical in core {
            let declared = platform.declare_type(logical).unwrap();
            assert!(!declared.is_empty(), "{variant} {logical:?}");
        }
    }
}

// =============================================================================
// Capabilities and names
// =============================================================================

#[test]
fn test_capability_getters_are_idempotent() {
    for variant in PlatformVariant::ALL {
        let platform = variant.platform();
        let caps = platform.capabilities();
        assert_eq!(caps.supports_sequences(), caps.supports_sequences());
        assert_eq!(caps.supports_identity_columns(), caps.supports_identity_columns());
        assert_eq!(caps.supports_release_savepoints(), caps.supports_release_savepoints());
        assert_eq!(caps.max_identifier_length(), caps.max_identifier_length());
        assert_eq!(platform.capabilities(), variant.platform().capabilities());
        assert!(caps.validate().is_ok(), "{variant}");
    }
}

#[test]
fn test_identifier_name_hashing_is_deterministic() {
    let mssql = platform("mssql2012");
    let first = mssql.generate_identifier_name("orders");
    assert_eq!(first, mssql.generate_identifier_name("orders"));
    assert_ne!(first, mssql.generate_identifier_name("order_lines"));
    assert_eq!(first, platform("oracle").generate_identifier_name("orders"));
}

#[test]
fn test_resolve_type_names_is_case_insensitive() {
    let firebird = platform("firebird");
    assert_eq!(firebird.resolve_type_name("INT64").unwrap(), LogicalType::BigInt);
    assert_eq!(firebird.resolve_type_name("int64").unwrap(), LogicalType::BigInt);
    assert!(matches!(
        firebird.resolve_type_name("xml"),
        Err(PlatformError::UnsupportedType { .. })
    ));
}
