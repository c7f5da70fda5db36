use super::*;

fn stored_versions(conn: &Connection) -> Vec<i32> {
    let mut stmt = conn
        .prepare("SELECT version FROM hop_meta.schema_version ORDER BY version")
        .unwrap();
    stmt.query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<i32>, _>>()
        .unwrap()
}

#[test]
fn test_fresh_database_gets_current_schema() {
    let conn = Connection::open_in_memory().unwrap();
    ensure_schema(&conn).unwrap();
    assert_eq!(stored_versions(&conn), vec![SCHEMA_VERSION]);

    let tables: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM information_schema.tables \
             WHERE table_schema = 'hop_meta' AND table_name = 'ledger'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(tables, 1);
}

#[test]
fn test_second_open_changes_nothing() {
    let conn = Connection::open_in_memory().unwrap();
    ensure_schema(&conn).unwrap();
    ensure_schema(&conn).unwrap();
    assert_eq!(stored_versions(&conn), vec![SCHEMA_VERSION]);
}

#[test]
fn test_newer_schema_is_refused() {
    let conn = Connection::open_in_memory().unwrap();
    ensure_schema(&conn).unwrap();
    conn.execute(
        "INSERT INTO hop_meta.schema_version (version) VALUES (?)",
        duckdb::params![SCHEMA_VERSION + 1],
    )
    .unwrap();

    let err = ensure_schema(&conn).unwrap_err();
    assert!(matches!(err, LedgerError::SchemaError(_)));
    assert!(err.to_string().contains("newer"));
}
