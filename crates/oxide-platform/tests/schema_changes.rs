//! CREATE/ALTER/DROP synthesis through the public platform API.

mod common;

use common::{platform, position, with_hooks, Hook};
use oxide_platform::{
    Column, ColumnDiff, CreateFlags, DefaultValue, ForeignKey, Index, LogicalType, PlatformError,
    PlatformVariant, Table, TableDiff,
};

fn orders_diff() -> TableDiff {
    let from = Column::new("customer_id", LogicalType::Integer);
    let to = Column::new("customer_id", LogicalType::BigInt);
    TableDiff::new("orders")
        .change_index(Index::new("idx_customer", ["customer_id"]))
        .change_column(ColumnDiff::between(&from, &to).unwrap())
        .add_foreign_key(
            ForeignKey::new(["customer_id"], "customers", ["id"]).named("fk_orders_customer"),
        )
}

// =============================================================================
// ALTER ordering
// =============================================================================

#[test]
fn test_alter_drops_before_retype_and_adds_after() {
    for name in ["postgresql", "mysql", "mssql2012", "oracle"] {
        let sql = platform(name).alter_table_sql(&orders_diff()).unwrap();
        let drop_index = position(&sql, "idx_customer");
        let retype = sql
            .iter()
            .position(|stmt| {
                stmt.contains("customer_id")
                    && (stmt.contains("BIGINT") || stmt.contains("NUMBER(20)"))
            })
            .unwrap_or_else(|| panic!("{name}: no retype in {sql:#?}"));
        let add_fk = position(&sql, "fk_orders_customer");
        assert!(drop_index < retype, "{name}: {sql:#?}");
        assert!(retype < add_fk, "{name}: {sql:#?}");
    }
}

#[test]
fn test_postgres_alter_statements() {
    assert_eq!(
        platform("postgresql").alter_table_sql(&orders_diff()).unwrap(),
        [
            "DROP INDEX idx_customer",
            "ALTER TABLE orders ALTER customer_id TYPE BIGINT",
            "ALTER TABLE orders ADD CONSTRAINT fk_orders_customer FOREIGN KEY (customer_id) \
             REFERENCES customers (id)",
            "CREATE INDEX idx_customer ON orders (customer_id)",
        ]
    );
}

#[test]
fn test_rename_column_with_named_default_constraint() {
    let mssql = platform("mssql2012");
    let diff = TableDiff::new("users").rename_column(
        "a",
        Column::new("b", LogicalType::Integer).default_value(DefaultValue::Integer(0)),
    );
    let sql = mssql.alter_table_sql(&diff).unwrap();
    assert_eq!(sql.len(), 3, "{sql:#?}");
    let old_df = format!(
        "DF_{}_{}",
        mssql.generate_identifier_name("users"),
        mssql.generate_identifier_name("a")
    );
    let new_df = format!(
        "DF_{}_{}",
        mssql.generate_identifier_name("users"),
        mssql.generate_identifier_name("b")
    );
    assert_eq!(sql[0], format!("ALTER TABLE users DROP CONSTRAINT {old_df}"));
    assert_eq!(sql[1], "EXEC sp_rename N'users.a', N'b', N'COLUMN'");
    assert_eq!(sql[2], format!("ALTER TABLE users ADD CONSTRAINT {new_df} DEFAULT 0 FOR b"));
}

#[test]
fn test_rename_table_unsupported_on_firebird() {
    let diff = TableDiff::new("users").rename_to("members");
    assert!(matches!(
        platform("firebird").alter_table_sql(&diff),
        Err(PlatformError::UnsupportedFeature { .. })
    ));
    assert!(platform("postgresql").alter_table_sql(&diff).is_ok());
}

#[test]
fn test_autoincrement_change_is_never_silent() {
    let plain = Column::new("id", LogicalType::Integer).not_null();
    let serial = plain.clone().autoincrement();
    for variant in PlatformVariant::ALL {
        for (from, to) in [(&plain, &serial), (&serial, &plain)] {
            let diff =
                TableDiff::new("users").change_column(ColumnDiff::between(from, to).unwrap());
            match variant.platform().alter_table_sql(&diff) {
                Ok(sql) => assert!(!sql.is_empty(), "{variant}"),
                Err(err) => assert!(
                    matches!(err, PlatformError::UnsupportedFeature { .. }),
                    "{variant}: {err}"
                ),
            }
        }
    }
}

// =============================================================================
// CREATE and flags
// =============================================================================

#[test]
fn test_create_flags_from_bits() {
    assert_eq!(CreateFlags::from_bits(3).unwrap(), CreateFlags::ALL);
    assert!(CreateFlags::from_bits(3).unwrap().contains(CreateFlags::CREATE_FOREIGNKEYS));
    assert!(matches!(CreateFlags::from_bits(8), Err(PlatformError::InvalidArgument(_))));
    assert!(matches!(CreateFlags::from_bits(-1), Err(PlatformError::InvalidArgument(_))));
}

#[test]
fn test_create_table_without_indexes() {
    let table = Table::new("tags")
        .column(Column::new("id", LogicalType::Integer))
        .column(Column::new("label", LogicalType::String).length(40))
        .primary_key(["id"])
        .index(Index::new("idx_label", ["label"]));
    let postgres = platform("postgresql");
    let with_indexes = postgres.create_table_sql(&table, CreateFlags::default()).unwrap();
    let bare = postgres.create_table_sql(&table, CreateFlags::NONE).unwrap();
    assert_eq!(with_indexes.len(), bare.len() + 1);
    assert!(with_indexes.iter().any(|stmt| stmt.contains("CREATE INDEX idx_label")));
    assert!(!bare.iter().any(|stmt| stmt.contains("idx_label")));
}

#[test]
fn test_index_without_columns_is_invalid() {
    let index = Index::new("idx_empty", Vec::<String>::new());
    assert!(matches!(
        platform("mysql").create_index_sql("t", &index),
        Err(PlatformError::InvalidArgument(_))
    ));
}

// =============================================================================
// Events
// =============================================================================

#[test]
fn test_veto_replaces_create_table() {
    let hook = Hook::new("CREATE VIEW tags AS SELECT 1", true);
    let postgres = with_hooks(platform("postgresql"), &[hook.clone()]);
    let table = Table::new("tags").column(Column::new("id", LogicalType::Integer));
    assert_eq!(
        postgres.create_table_sql(&table, CreateFlags::default()).unwrap(),
        ["CREATE VIEW tags AS SELECT 1"]
    );
    assert_eq!(hook.seen(), ["create tags"]);
}

#[test]
fn test_every_listener_runs_after_a_veto() {
    let vetoing = Hook::new("-- first", true);
    let observing = Hook::new("-- second", false);
    let postgres = with_hooks(platform("postgresql"), &[vetoing.clone(), observing.clone()]);
    assert_eq!(postgres.drop_table_sql("tags"), ["-- first", "-- second"]);
    assert_eq!(vetoing.seen(), ["drop tags"]);
    assert_eq!(observing.seen(), ["drop tags"]);
}

#[test]
fn test_listener_sql_follows_default_drop() {
    let hook = Hook::new("DROP SEQUENCE tags_seq", false);
    let postgres = with_hooks(platform("postgresql"), &[hook]);
    assert_eq!(postgres.drop_table_sql("tags"), ["DROP TABLE tags", "DROP SEQUENCE tags_seq"]);
}

#[test]
fn test_vetoed_column_keeps_hook_sql_only() {
    let hook = Hook::new("SELECT 1", true);
    let postgres = with_hooks(platform("postgresql"), &[hook.clone()]);
    let diff = TableDiff::new("users")
        .add_column(Column::new("age", LogicalType::SmallInt))
        .add_column(Column::new("nick", LogicalType::String).length(20));
    assert_eq!(postgres.alter_table_sql(&diff).unwrap(), ["SELECT 1", "SELECT 1"]);
    assert_eq!(hook.seen(), ["add age", "add nick"]);
}
