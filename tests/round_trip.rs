//! Round-trip tests for catalog-ddl
//!
//! Each test creates tables in an `InMemoryCatalog`, regenerates their DDL,
//! drops them, executes the DDL again and compares the descriptions.

use catalog_ddl::command::{show_create_table, verify_round_trip};
use catalog_ddl::properties::filter_properties;
use catalog_ddl::{
    Catalog, Column, DataType, DdlConfig, DdlError, DdlExecutor, Dialect, InMemoryCatalog,
    SortColumn, TableDescription, TableIdentifier, TableKind, equivalent,
};
use rstest::rstest;
use std::collections::BTreeMap;

fn ident(name: &str) -> TableIdentifier {
    TableIdentifier::new("default", name)
}

/// Create a catalog and run each statement in order
fn catalog_with(statements: &[&str]) -> InMemoryCatalog {
    let catalog = InMemoryCatalog::default();
    for sql in statements {
        catalog
            .execute(sql)
            .unwrap_or_else(|e| panic!("failed to execute {}: {}", sql, e));
    }
    catalog
}

fn assert_round_trip(catalog: &InMemoryCatalog, name: &str, dialect: Dialect) {
    let report = verify_round_trip(catalog, &ident(name), dialect, catalog.config())
        .unwrap_or_else(|e| panic!("round trip of {} failed: {}", name, e));
    assert!(
        report.equivalent,
        "{} is not equivalent after {} round trip:\n{}\n{:?}",
        name, dialect, report.ddl, report.differences
    );
}

// ==================== Round-Trip Idempotence ====================

#[rstest]
#[case::plain("CREATE TABLE t (a INT, b STRING) USING parquet")]
#[case::no_columns("CREATE TABLE t USING json")]
#[case::options("CREATE TABLE t (a INT) USING csv OPTIONS (header 'true', sep ';')")]
#[case::partitioned("CREATE TABLE t (p1 INT, a STRING, p2 DATE) USING orc PARTITIONED BY (p1, p2)")]
#[case::external("CREATE TABLE t (a INT) USING parquet LOCATION 's3://bucket/it\\'s here'")]
#[case::commented(
    "CREATE TABLE t (a INT COMMENT 'line\\nbreak', b DECIMAL(12,3) COMMENT 'it\\'s') USING parquet COMMENT 'tab\\there'"
)]
#[case::properties("CREATE TABLE t (a INT) USING parquet TBLPROPERTIES ('k1' = 'v1', 'k.2' = '')")]
#[case::nested(
    "CREATE TABLE t (s STRUCT<Inner: STRUCT<`x y`: ARRAY<MAP<STRING, BIGINT>>>, `c``d`: CHAR(3)>, `Weird Name` VARCHAR(10)) USING avro"
)]
#[case::bucketed(
    "CREATE TABLE t (a INT, b STRING) USING parquet CLUSTERED BY (a, b) SORTED BY (b DESC, a) INTO 8 BUCKETS"
)]
fn test_native_round_trip(#[case] sql: &str) {
    let catalog = catalog_with(&[sql]);
    assert_round_trip(&catalog, "t", Dialect::Native);
}

#[rstest]
#[case::textfile("CREATE TABLE t (a INT, b STRING) STORED AS TEXTFILE")]
#[case::orc_partitioned("CREATE TABLE t (a INT) PARTITIONED BY (p STRING COMMENT 'part', q INT) STORED AS ORC")]
#[case::sequencefile("CREATE TABLE t (a INT) STORED AS SEQUENCEFILE")]
#[case::rcfile("CREATE TABLE t (a BINARY) STORED AS RCFILE")]
#[case::custom_serde(
    "CREATE TABLE t (a INT) ROW FORMAT SERDE 'org.example.JsonSerDe' WITH SERDEPROPERTIES ('k' = 'v') \
     STORED AS INPUTFORMAT 'org.example.In' OUTPUTFORMAT 'org.example.Out'"
)]
#[case::delimited(
    "CREATE TABLE t (a INT, m MAP<STRING, INT>) ROW FORMAT DELIMITED FIELDS TERMINATED BY ',' \
     COLLECTION ITEMS TERMINATED BY '|' MAP KEYS TERMINATED BY ':' LINES TERMINATED BY '\\n' \
     NULL DEFINED AS '\\001' STORED AS TEXTFILE"
)]
#[case::external("CREATE EXTERNAL TABLE t (a INT) STORED AS PARQUET LOCATION '/data/t'")]
#[case::bucketed(
    "CREATE TABLE t (a INT, b STRING) CLUSTERED BY (a) SORTED BY (a ASC) INTO 4 BUCKETS STORED AS ORC"
)]
#[case::using_hive("CREATE TABLE t (a INT) USING hive COMMENT 'legacy' TBLPROPERTIES ('k' = 'v')")]
fn test_serde_round_trip(#[case] sql: &str) {
    let catalog = catalog_with(&[sql]);
    assert_round_trip(&catalog, "t", Dialect::SerdeCompatible);
}

#[rstest]
#[case::parquet("PARQUET", "parquet")]
#[case::orc("ORC", "orc")]
#[case::avro("AVRO", "avro")]
fn test_hive_table_round_trips_natively(#[case] stored_as: &str, #[case] provider: &str) {
    let catalog = catalog_with(&[format!(
        "CREATE TABLE t (a INT, p STRING) PARTITIONED BY (p) STORED AS {}",
        stored_as
    ).as_str()]);

    let report = verify_round_trip(&catalog, &ident("t"), Dialect::Native, catalog.config()).unwrap();

    assert!(report.ddl.contains(&format!("USING {}", provider)));
    assert_eq!(report.recreated.provider.as_deref(), Some(provider));
    assert!(report.equivalent, "{:?}", report.differences);
    assert!(!equivalent(&report.original, &report.recreated));
}

#[test]
fn test_views_round_trip_in_both_dialects() {
    let catalog = catalog_with(&[
        "CREATE TABLE t1 (a INT) USING parquet",
        "CREATE VIEW v1 (b COMMENT 'renamed') COMMENT 'view' TBLPROPERTIES ('k' = 'v') AS SELECT a FROM t1",
    ]);

    assert_round_trip(&catalog, "v1", Dialect::Native);
    assert_round_trip(&catalog, "v1", Dialect::SerdeCompatible);
}

#[test]
fn test_qualified_provider_round_trips() {
    let catalog = catalog_with(&["CREATE TABLE t (a INT, p STRING) USING parquet PARTITIONED BY (p)"]);
    let table = catalog
        .get_table(&ident("t"))
        .unwrap()
        .with_provider("org.apache.spark.sql.parquet");
    catalog.register_table(table).unwrap();

    let report = verify_round_trip(&catalog, &ident("t"), Dialect::Native, catalog.config()).unwrap();

    assert!(report.ddl.contains("USING org.apache.spark.sql.parquet\n"));
    assert_eq!(
        report.recreated.provider.as_deref(),
        Some("org.apache.spark.sql.parquet")
    );
    assert!(report.equivalent, "{:?}", report.differences);
}

#[rstest]
#[case::native(Dialect::Native)]
#[case::serde(Dialect::SerdeCompatible)]
fn test_legacy_table_without_provider_round_trips(#[case] dialect: Dialect) {
    let catalog = catalog_with(&["CREATE TABLE t (a INT, b STRING) STORED AS ORC COMMENT 'legacy'"]);
    let mut table = catalog.get_table(&ident("t")).unwrap();
    table.provider = None;
    catalog.register_table(table).unwrap();

    let report = verify_round_trip(&catalog, &ident("t"), dialect, catalog.config()).unwrap();

    assert!(report.original.provider.is_none());
    assert!(report.equivalent, "{:?}", report.differences);
}

// ==================== Dialect Rejection ====================

#[rstest]
#[case::parquet("parquet")]
#[case::json("json")]
#[case::delta("delta")]
fn test_serde_dialect_rejects_data_source_tables(#[case] provider: &str) {
    let catalog = catalog_with(&[format!("CREATE TABLE t (a INT) USING {}", provider).as_str()]);

    let err = show_create_table(&catalog, &ident("t"), Dialect::SerdeCompatible, catalog.config())
        .unwrap_err();

    assert!(matches!(err, DdlError::DialectMismatch(_)));
    assert!(err.to_string().contains("use the native dialect instead"));
}

#[rstest]
#[case::textfile("TEXTFILE")]
#[case::sequencefile("SEQUENCEFILE")]
#[case::rcfile("RCFILE")]
fn test_native_dialect_rejects_legacy_only_formats(#[case] stored_as: &str) {
    let catalog = catalog_with(&[format!("CREATE TABLE t (a INT) STORED AS {}", stored_as).as_str()]);

    let err = show_create_table(&catalog, &ident("t"), Dialect::Native, catalog.config())
        .unwrap_err();

    assert!(matches!(err, DdlError::UnsupportedConstruct(_)));
    assert!(err.to_string().contains("unsupported serde configuration"));
}

#[test]
fn test_native_dialect_rejects_custom_serde_on_parquet() {
    let catalog = catalog_with(&[
        "CREATE TABLE t (a INT) ROW FORMAT SERDE 'org.example.SerDe' STORED AS PARQUET",
    ]);
    let err = show_create_table(&catalog, &ident("t"), Dialect::Native, catalog.config())
        .unwrap_err();
    assert!(matches!(err, DdlError::UnsupportedConstruct(_)));
}

// ==================== Transactional Rejection ====================

#[rstest]
#[case::native(Dialect::Native, "true")]
#[case::serde(Dialect::SerdeCompatible, "true")]
#[case::upper_case(Dialect::SerdeCompatible, "TRUE")]
fn test_transactional_table_rejected(#[case] dialect: Dialect, #[case] value: &str) {
    let catalog = catalog_with(&[format!(
        "CREATE TABLE t (a INT) STORED AS ORC TBLPROPERTIES ('transactional' = '{}')",
        value
    ).as_str()]);

    let err = show_create_table(&catalog, &ident("t"), dialect, catalog.config()).unwrap_err();

    assert!(matches!(err, DdlError::UnsupportedConstruct(_)));
    assert!(err.to_string().contains("transactional Hive table"));
}

#[test]
fn test_transactional_false_is_allowed() {
    let catalog = catalog_with(&[
        "CREATE TABLE t (a INT) STORED AS ORC TBLPROPERTIES ('transactional' = 'false')",
    ]);
    let ddl = show_create_table(&catalog, &ident("t"), Dialect::Native, catalog.config()).unwrap();
    assert!(ddl.contains("'transactional' = 'false'"));
}

// ==================== Partitioned View Rejection ====================

#[rstest]
#[case::native(Dialect::Native)]
#[case::serde(Dialect::SerdeCompatible)]
fn test_partitioned_view_rejected(#[case] dialect: Dialect) {
    let catalog = catalog_with(&[
        "CREATE TABLE t1 (a INT, p STRING) USING parquet PARTITIONED BY (p)",
        "CREATE VIEW v1 PARTITIONED ON (p) AS SELECT a, p FROM t1",
    ]);

    let err = show_create_table(&catalog, &ident("v1"), dialect, catalog.config()).unwrap_err();

    assert!(matches!(err, DdlError::UnsupportedConstruct(_)));
    assert!(err.to_string().contains("partitioned view not supported"));
}

// ==================== Unsupported Legacy Features ====================

#[test]
fn test_unsupported_features_rejected_without_dropping() {
    let catalog = InMemoryCatalog::default();
    let mut table = TableDescription::new(
        ident("skewed"),
        TableKind::ManagedTable,
        vec![Column::new("a", DataType::Int)],
    )
    .with_provider("hive");
    table.unsupported_features.push("skewed columns".to_string());
    catalog.register_table(table).unwrap();

    for dialect in [Dialect::Native, Dialect::SerdeCompatible] {
        let err = verify_round_trip(&catalog, &ident("skewed"), dialect, catalog.config())
            .unwrap_err();
        assert!(err.to_string().contains("skewed columns"));
    }
    assert!(catalog.table_exists(&ident("skewed")));
}

// ==================== Quoting Preservation ====================

#[test]
fn test_nested_struct_quoting() {
    let catalog = catalog_with(&["CREATE TABLE t1 (a STRUCT<b: STRING>) USING hive"]);
    let mut table = catalog.get_table(&ident("t1")).unwrap();
    table.storage = Default::default();
    table.properties.clear();

    let ddl = catalog_ddl::generate(&table, Dialect::SerdeCompatible).unwrap();
    assert_eq!(ddl, "CREATE TABLE `default`.`t1` (`a` STRUCT<`b`: STRING>)");
}

#[test]
fn test_mixed_case_names_survive() {
    let catalog = catalog_with(&["CREATE TABLE t (MyCol STRUCT<InnerField: INT>) USING parquet"]);
    let ddl = show_create_table(&catalog, &ident("t"), Dialect::Native, catalog.config()).unwrap();
    assert!(ddl.contains("`MyCol` STRUCT<`InnerField`: INT>"));
    assert_round_trip(&catalog, "t", Dialect::Native);
}

// ==================== Property Filtering ====================

#[test]
fn test_managed_properties_filtered() {
    let props = BTreeMap::from([
        ("CreateTime".to_string(), "123".to_string()),
        ("prop1".to_string(), "value1".to_string()),
    ]);
    assert_eq!(
        filter_properties(&props),
        BTreeMap::from([("prop1".to_string(), "value1".to_string())])
    );

    let catalog = catalog_with(&[
        "CREATE TABLE t (a INT) USING parquet TBLPROPERTIES ('CreateTime' = '123', 'prop1' = 'value1')",
    ]);
    let ddl = show_create_table(&catalog, &ident("t"), Dialect::Native, catalog.config()).unwrap();
    assert!(ddl.ends_with("TBLPROPERTIES ('prop1' = 'value1')"));
    assert!(!ddl.contains("CreateTime"));
}

#[test]
fn test_tables_differing_in_create_time_are_equivalent() {
    let catalog = catalog_with(&[
        "CREATE TABLE t (a INT) USING parquet TBLPROPERTIES ('CreateTime' = '1')",
    ]);
    let a = catalog.get_table(&ident("t")).unwrap();
    let b = a.clone().with_property("CreateTime", "2");
    assert!(equivalent(&a, &b));
}

#[test]
fn test_hive_tables_never_emit_last_ddl_time() {
    let catalog = catalog_with(&["CREATE TABLE t (a INT) STORED AS ORC"]);
    let table = catalog.get_table(&ident("t")).unwrap();
    assert!(table.properties.contains_key("transient_lastDdlTime"));

    let ddl = show_create_table(&catalog, &ident("t"), Dialect::SerdeCompatible, catalog.config())
        .unwrap();
    assert!(!ddl.contains("TBLPROPERTIES"));
}

// ==================== Bucket/Sort Preservation ====================

#[rstest]
#[case::data_source("USING parquet")]
#[case::hive("STORED AS ORC")]
fn test_bucket_spec_preserved(#[case] storage: &str) {
    let catalog = catalog_with(&[format!(
        "CREATE TABLE emp (emp_id INT, emp_name STRING, emp_sex STRING) {} \
         CLUSTERED BY (emp_sex) SORTED BY (emp_id ASC) INTO 10 BUCKETS",
        storage
    ).as_str()]);

    let report =
        verify_round_trip(&catalog, &ident("emp"), Dialect::Native, catalog.config()).unwrap();

    assert!(report.equivalent, "{:?}", report.differences);
    let spec = report.recreated.bucket_spec.unwrap();
    assert_eq!(spec.num_buckets, 10);
    assert_eq!(spec.bucket_column_names, vec!["emp_sex".to_string()]);
    assert_eq!(spec.sort_columns, vec![SortColumn::asc("emp_id")]);
}

// ==================== View Column Aliases ====================

#[test]
fn test_view_alias_list_preserved() {
    let catalog = catalog_with(&[
        "CREATE TABLE t1 (a INT) USING parquet",
        "CREATE VIEW v1 (b) AS SELECT a FROM t1",
    ]);

    let ddl = show_create_table(&catalog, &ident("v1"), Dialect::Native, catalog.config()).unwrap();
    assert_eq!(ddl, "CREATE VIEW `default`.`v1` (`b`)\nAS SELECT a FROM t1");
}

// ==================== Configuration ====================

#[test]
fn test_create_hive_table_by_default_is_per_catalog() {
    let hive = InMemoryCatalog::new(DdlConfig::builder().create_hive_table_by_default(true).build());
    let native = InMemoryCatalog::default();

    std::thread::scope(|s| {
        s.spawn(|| hive.execute("CREATE TABLE t (a INT)").unwrap());
        s.spawn(|| native.execute("CREATE TABLE t (a INT)").unwrap());
    });

    assert!(hive.get_table(&ident("t")).unwrap().is_hive_table());
    assert!(!native.get_table(&ident("t")).unwrap().is_hive_table());

    assert_round_trip(&hive, "t", Dialect::SerdeCompatible);
    assert_round_trip(&native, "t", Dialect::Native);
}

#[test]
fn test_current_namespace_qualifies_output() {
    let catalog = InMemoryCatalog::new(DdlConfig::builder().current_namespace("sales").build());
    catalog.execute("CREATE TABLE orders (id BIGINT) USING parquet").unwrap();

    let ddl = show_create_table(
        &catalog,
        &TableIdentifier::unqualified("orders"),
        Dialect::Native,
        catalog.config(),
    )
    .unwrap();
    assert!(ddl.starts_with("CREATE TABLE `sales`.`orders`"));
}

#[test]
fn test_concurrent_generation() {
    let catalog = catalog_with(&[
        "CREATE TABLE t (a INT, b STRING) USING parquet PARTITIONED BY (b)",
    ]);
    let expected =
        show_create_table(&catalog, &ident("t"), Dialect::Native, catalog.config()).unwrap();

    let catalog = &catalog;
    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                s.spawn(move || {
                    show_create_table(catalog, &ident("t"), Dialect::Native, catalog.config())
                        .unwrap()
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}
