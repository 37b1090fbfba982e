//! LIMIT/OFFSET rewriting across pagination families.

mod common;

use common::platform;
use oxide_platform::limit::MYSQL_MAX_ROWS;
use oxide_platform::PlatformError;

const QUERY: &str = "SELECT * FROM t";

// =============================================================================
// Native LIMIT
// =============================================================================

#[test]
fn test_native_limit_without_offset() {
    for name in ["mysql", "postgresql", "sqlite"] {
        assert_eq!(
            platform(name).modify_limit_query(QUERY, Some(10), Some(0)).unwrap(),
            "SELECT * FROM t LIMIT 10",
            "{name}"
        );
    }
}

#[test]
fn test_native_offset_only_uses_vendor_sentinel() {
    assert_eq!(
        platform("mysql").modify_limit_query(QUERY, None, Some(20)).unwrap(),
        format!("SELECT * FROM t LIMIT {MYSQL_MAX_ROWS} OFFSET 20")
    );
    assert_eq!(
        platform("mysql").modify_limit_query(QUERY, None, Some(20)).unwrap(),
        "SELECT * FROM t LIMIT 18446744073709551615 OFFSET 20"
    );
    assert_eq!(
        platform("sqlite").modify_limit_query(QUERY, None, Some(20)).unwrap(),
        "SELECT * FROM t LIMIT -1 OFFSET 20"
    );
    assert_eq!(
        platform("postgresql").modify_limit_query(QUERY, None, Some(20)).unwrap(),
        "SELECT * FROM t OFFSET 20"
    );
}

// =============================================================================
// Emulated families
// =============================================================================

#[test]
fn test_row_number_cte_window() {
    let sql = platform("mssql2008")
        .modify_limit_query("SELECT * FROM t ORDER BY id", Some(5), Some(10))
        .unwrap();
    assert!(sql.starts_with("WITH dctrn_cte AS ("), "{sql}");
    assert!(sql.contains("ROW_NUMBER() OVER (ORDER BY id) AS doctrine_rownum"), "{sql}");
    assert!(sql.contains("doctrine_rownum BETWEEN 11 AND 15"), "{sql}");
}

#[test]
fn test_row_number_without_offset_is_top() {
    assert_eq!(
        platform("mssql2008").modify_limit_query(QUERY, Some(5), None).unwrap(),
        "SELECT TOP 5 * FROM t"
    );
}

#[test]
fn test_offset_fetch_adds_order_by() {
    assert_eq!(
        platform("mssql2012").modify_limit_query(QUERY, Some(10), Some(20)).unwrap(),
        "SELECT * FROM t ORDER BY (SELECT 0) OFFSET 20 ROWS FETCH NEXT 10 ROWS ONLY"
    );
}

#[test]
fn test_rownum_double_wrap() {
    assert_eq!(
        platform("oracle").modify_limit_query(QUERY, Some(10), Some(20)).unwrap(),
        "SELECT * FROM (SELECT a.*, ROWNUM AS doctrine_rownum FROM (SELECT * FROM t) a \
         WHERE ROWNUM <= 30) WHERE doctrine_rownum >= 21"
    );
}

#[test]
fn test_skip_limit() {
    assert_eq!(
        platform("informix").modify_limit_query(QUERY, Some(10), Some(20)).unwrap(),
        "SELECT SKIP 20 LIMIT 10 * FROM t"
    );
}

#[test]
fn test_rows_range() {
    assert_eq!(
        platform("firebird").modify_limit_query(QUERY, Some(10), Some(20)).unwrap(),
        "SELECT * FROM t ROWS 21 TO 30"
    );
}

// =============================================================================
// Errors and no-ops
// =============================================================================

#[test]
fn test_top_only_rejects_offset() {
    let sybase = platform("sybase");
    assert_eq!(
        sybase.modify_limit_query(QUERY, Some(10), None).unwrap(),
        "SELECT TOP 10 * FROM t"
    );
    assert!(matches!(
        sybase.modify_limit_query(QUERY, Some(10), Some(5)),
        Err(PlatformError::UnsupportedFeature { .. })
    ));
}

#[test]
fn test_negative_values_rejected() {
    for name in ["mysql", "oracle", "mssql2012"] {
        assert!(matches!(
            platform(name).modify_limit_query(QUERY, Some(10), Some(-1)),
            Err(PlatformError::InvalidArgument(_))
        ));
        assert!(matches!(
            platform(name).modify_limit_query(QUERY, Some(-5), None),
            Err(PlatformError::InvalidArgument(_))
        ));
    }
}

#[test]
fn test_nothing_requested_leaves_query_alone() {
    for name in ["mysql", "postgresql", "sqlite", "mssql2008", "oracle", "informix", "sybase"] {
        assert_eq!(
            platform(name).modify_limit_query(QUERY, None, None).unwrap(),
            QUERY,
            "{name}"
        );
    }
}
