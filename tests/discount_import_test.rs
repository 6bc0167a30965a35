// ==========================================
// DiscountImporter 集成测试
// ==========================================
// 测试目标: 验证 Excel → partners / cities / partners_discounts 的完整对账流程
// ==========================================


use tempfile::TempDir;
use union_discounts::config::{config_keys, ConfigManager, ImportConfigReader, ImportSettings};
use union_discounts::domain::MissingCityPolicy;
use union_discounts::importer::{load_discount_table, DiscountImporter, DiscountTable, ImportError};
use union_discounts::logging;
use union_discounts::repository::SqliteDiscountStore;
use union_discounts::ImportSummary;
use test_helpers::{
    count_rows, create_test_db, discount_description, open_conn, write_csv, write_discount_xlsx,
};

/// 使用默认配置导入一张表
fn import_with(db_path: &str, settings: &ImportSettings, table: &DiscountTable) -> ImportSummary {
    let store = SqliteDiscountStore::open(db_path).expect("Failed to open store");
    DiscountImporter::new(store, settings)
        .import_table(table)
        .expect("Import should succeed")
}

fn import_default(db_path: &str, table: &DiscountTable) -> ImportSummary {
    import_with(db_path, &ImportSettings::default(), table)
}

#[test]
fn test_import_partner_with_two_cities() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let dir = TempDir::new().unwrap();
    let path = write_discount_xlsx(
        &dir,
        &[vec!["Acme", "Springfield, Shelbyville", "10% off", "5%", "7%"]],
    );

    let table = load_discount_table(&path);
    assert_eq!(table.len(), 1);

    let summary = import_default(&db_path, &table);
    assert_eq!(summary.total_rows, 1);
    assert_eq!(summary.processed_rows, 1);
    assert_eq!(summary.partners_created, 1);
    assert_eq!(summary.cities_created, 2);
    assert_eq!(summary.discounts_created, 2);

    let conn = open_conn(&db_path);
    assert_eq!(count_rows(&conn, "partners"), 1);
    assert_eq!(count_rows(&conn, "cities"), 2);
    assert_eq!(count_rows(&conn, "partners_discounts"), 2);

    let (corpcard, union_discount): (Option<String>, Option<String>) = conn
        .query_row(
            "SELECT corpcard_discount, union_discount FROM partners_discounts ORDER BY id LIMIT 1",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(corpcard.as_deref(), Some("5%"));
    assert_eq!(union_discount.as_deref(), Some("7%"));
}

#[test]
fn test_import_is_idempotent() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let dir = TempDir::new().unwrap();
    let path = write_discount_xlsx(
        &dir,
        &[
            vec!["Acme", "Springfield, Shelbyville", "10% off", "", ""],
            vec!["Globex", "Capital City", "Free coffee", "", "3%"],
        ],
    );

    let first = import_default(&db_path, &load_discount_table(&path));
    assert_eq!(first.discounts_created, 3);

    let conn = open_conn(&db_path);
    let before = (
        count_rows(&conn, "partners"),
        count_rows(&conn, "cities"),
        count_rows(&conn, "partners_discounts"),
    );

    let second = import_default(&db_path, &load_discount_table(&path));
    assert_eq!(second.partners_created, 0);
    assert_eq!(second.cities_created, 0);
    assert_eq!(second.discounts_created, 0);
    assert_eq!(second.discounts_existing, 3);

    let after = (
        count_rows(&conn, "partners"),
        count_rows(&conn, "cities"),
        count_rows(&conn, "partners_discounts"),
    );
    assert_eq!(before, after);
    assert_eq!(after, (2, 3, 3));
}

#[test]
fn test_partner_reused_across_rows() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let dir = TempDir::new().unwrap();
    let path = write_discount_xlsx(
        &dir,
        &[
            vec!["Acme", "Springfield", "Row one", "", ""],
            vec!["Acme", "Shelbyville", "Row two", "", ""],
        ],
    );

    let summary = import_default(&db_path, &load_discount_table(&path));
    assert_eq!(summary.partners_created, 1);
    assert_eq!(summary.discounts_created, 2);

    let conn = open_conn(&db_path);
    assert_eq!(count_rows(&conn, "partners"), 1);

    // 合作伙伴描述取首次出现的行
    let description: Option<String> = conn
        .query_row("SELECT description FROM partners WHERE name = 'Acme'", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(description.as_deref(), Some("Row one"));
}

#[test]
fn test_existing_discount_keeps_first_description() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let dir = TempDir::new().unwrap();
    let path = write_discount_xlsx(
        &dir,
        &[
            vec!["Acme", "Springfield", "First terms", "", ""],
            vec!["Acme", "springfield", "Second terms", "", ""],
        ],
    );

    let summary = import_default(&db_path, &load_discount_table(&path));
    assert_eq!(summary.discounts_created, 1);
    assert_eq!(summary.discounts_existing, 1);

    let conn = open_conn(&db_path);
    assert_eq!(count_rows(&conn, "cities"), 1);
    assert_eq!(count_rows(&conn, "partners_discounts"), 1);
    assert_eq!(
        discount_description(&conn, "Acme", "springfield").as_deref(),
        Some("First terms")
    );
}

#[test]
fn test_empty_city_token_is_skipped() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let dir = TempDir::new().unwrap();
    let path = write_discount_xlsx(
        &dir,
        &[vec!["Acme", "Springfield, , Shelbyville", "10% off", "", ""]],
    );

    let summary = import_default(&db_path, &load_discount_table(&path));
    assert_eq!(summary.empty_city_tokens, 1);
    assert_eq!(summary.cities_created, 2);

    let conn = open_conn(&db_path);
    assert_eq!(count_rows(&conn, "cities"), 2);
    assert_eq!(count_rows(&conn, "partners_discounts"), 2);

    let blank_names: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM cities WHERE TRIM(name) = ''",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(blank_names, 0);
}

#[test]
fn test_city_names_merge_case_insensitively() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let dir = TempDir::new().unwrap();
    let path = write_discount_xlsx(
        &dir,
        &[
            vec!["Acme", "Springfield", "", "", ""],
            vec!["Globex", " SPRINGFIELD ", "", "", ""],
        ],
    );

    let summary = import_default(&db_path, &load_discount_table(&path));
    assert_eq!(summary.cities_created, 1);
    assert_eq!(summary.discounts_created, 2);

    let conn = open_conn(&db_path);
    let name: String = conn
        .query_row("SELECT name FROM cities", [], |row| row.get(0))
        .unwrap();
    assert_eq!(name, "Springfield");
}

#[test]
fn test_missing_file_is_noop() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let dir = TempDir::new().unwrap();

    let table = load_discount_table(dir.path().join("does_not_exist.xlsx"));
    assert!(table.is_empty());

    let summary = import_default(&db_path, &table);
    assert_eq!(summary.total_rows, 0);
    assert_eq!(summary.processed_rows, 0);
    assert_eq!(summary.discounts_created, 0);

    let conn = open_conn(&db_path);
    assert_eq!(count_rows(&conn, "partners"), 0);
    assert_eq!(count_rows(&conn, "cities"), 0);
    assert_eq!(count_rows(&conn, "partners_discounts"), 0);
}

#[test]
fn test_row_without_partner_or_city() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let dir = TempDir::new().unwrap();
    let path = write_discount_xlsx(
        &dir,
        &[
            vec!["", "Springfield", "Orphan terms", "", ""],
            vec!["Acme", "", "No city", "", ""],
        ],
    );

    let summary = import_default(&db_path, &load_discount_table(&path));
    assert_eq!(summary.total_rows, 2);
    assert_eq!(summary.skipped_rows, 1);
    assert_eq!(summary.partners_created, 1);
    assert_eq!(summary.discounts_created, 0);

    let conn = open_conn(&db_path);
    assert_eq!(count_rows(&conn, "partners"), 1);
    assert_eq!(count_rows(&conn, "cities"), 0);
}

#[test]
fn test_strict_policy_aborts_on_missing_city() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config = ConfigManager::new(&db_path).expect("Failed to create ConfigManager");
    config
        .set_global_config_value(config_keys::MISSING_CITY_POLICY, "STRICT")
        .unwrap();
    let settings = config.load_import_settings().unwrap();
    assert_eq!(settings.missing_city_policy, MissingCityPolicy::Strict);

    let dir = TempDir::new().unwrap();
    let path = write_discount_xlsx(
        &dir,
        &[
            vec!["Acme", "Springfield", "", "", ""],
            vec!["Globex", "", "", "", ""],
        ],
    );

    let store = SqliteDiscountStore::open(&db_path).unwrap();
    let result = DiscountImporter::new(store, &settings).import_table(&load_discount_table(&path));

    match result {
        Err(ImportError::MissingField { row, field }) => {
            assert_eq!(row, 3);
            assert_eq!(field, "Город");
        }
        other => panic!("Expected MissingField, got {:?}", other),
    }

    // 前一行已提交，失败行未落库
    let conn = open_conn(&db_path);
    assert_eq!(count_rows(&conn, "partners"), 1);
    assert_eq!(count_rows(&conn, "partners_discounts"), 1);
}

#[test]
fn test_column_overrides_from_config_with_csv() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config = ConfigManager::new(&db_path).expect("Failed to create ConfigManager");
    config
        .set_global_config_value(config_keys::COLUMN_PARTNER, "Partner")
        .unwrap();
    config
        .set_global_config_value(config_keys::COLUMN_CITY, "City")
        .unwrap();
    config
        .set_global_config_value(config_keys::COLUMN_DESCRIPTION, "Terms")
        .unwrap();
    let settings = config.load_import_settings().unwrap();

    let dir = TempDir::new().unwrap();
    let path = write_csv(
        dir.path(),
        "discounts.csv",
        "Partner,City,Terms\nAcme,\"Springfield, Shelbyville\",10% off\n",
    );

    let summary = import_with(&db_path, &settings, &load_discount_table(&path));
    assert_eq!(summary.discounts_created, 2);

    let conn = open_conn(&db_path);
    assert_eq!(
        discount_description(&conn, "Acme", "shelbyville").as_deref(),
        Some("10% off")
    );
}
