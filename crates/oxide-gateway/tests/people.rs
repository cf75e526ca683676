//! End-to-end walk through the `people` table on in-memory SQLite.

mod common;

use common::{exec, memory_pool, people_gateway};
use oxide_gateway::{record, GatewayError, RecordGateway, SqlValue, SqliteDriver};

fn text(s: &str) -> Option<SqlValue> {
    Some(SqlValue::Text(s.to_string()))
}

#[tokio::test]
async fn test_people_walkthrough() {
    let gateway = people_gateway().await;

    let chad = gateway
        .insert("people", &record! { "first_name" => "Chad", "last_name" => "Burke" })
        .await
        .unwrap();
    assert_eq!(chad, 1);

    let sean = gateway
        .insert(
            "people",
            &record! {
                "first_name" => "Sean",
                "last_name" => "Burke",
                "field_that_doesnt_exist" => "Test",
            },
        )
        .await
        .unwrap();
    assert_eq!(sean, 2);

    gateway
        .update("people", &record! { "first_name" => "Brian" }, sean)
        .await
        .unwrap();

    assert_eq!(
        gateway
            .fetch_scalar("select first_name from people where id = 2")
            .await
            .unwrap(),
        text("Brian")
    );
    // absent columns are left alone
    assert_eq!(
        gateway
            .fetch_scalar("select last_name from people where id = 2")
            .await
            .unwrap(),
        text("Burke")
    );

    let rows = gateway
        .fetch_all("select id, first_name from people order by id")
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get("id"), Some(&SqlValue::Int(1)));
    assert_eq!(rows[0].get("first_name").cloned(), text("Chad"));
    assert_eq!(rows[1].get("first_name").cloned(), text("Brian"));

    let first = gateway
        .fetch_one("select * from people order by id desc")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first.columns(), ["id", "first_name", "last_name"]);
    assert_eq!(first.get("id"), Some(&SqlValue::Int(2)));

    assert_eq!(gateway.cache().len(), 1);
}

#[tokio::test]
async fn test_update_missing_id_changes_nothing() {
    let gateway = people_gateway().await;
    gateway
        .insert("people", &record! { "first_name" => "Chad" })
        .await
        .unwrap();

    gateway
        .update("people", &record! { "first_name" => "Nobody" }, 42_i64)
        .await
        .unwrap();

    assert_eq!(
        gateway
            .fetch_scalar("select count(*) from people where first_name = 'Nobody'")
            .await
            .unwrap(),
        Some(SqlValue::Int(0))
    );
}

#[tokio::test]
async fn test_null_and_empty_values() {
    let pool = memory_pool().await;
    exec(
        &pool,
        "CREATE TABLE accounts (
            id INTEGER PRIMARY KEY,
            email TEXT NOT NULL,
            nickname TEXT NULL
        )",
    )
    .await;
    let gateway = RecordGateway::new(SqliteDriver::new(pool));

    let id = gateway
        .insert("accounts", &record! { "email" => SqlValue::Null, "nickname" => "" })
        .await
        .unwrap();

    let row = gateway
        .fetch_one(&format!("select email, nickname from accounts where id = {id}"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.get("email").cloned(), text(""));
    assert_eq!(row.get("nickname"), Some(&SqlValue::Null));
}

#[tokio::test]
async fn test_blob_round_trip() {
    let pool = memory_pool().await;
    exec(&pool, "CREATE TABLE files (id INTEGER PRIMARY KEY, data BLOB NOT NULL)").await;
    let gateway = RecordGateway::new(SqliteDriver::new(pool));

    let id = gateway
        .insert("files", &record! { "data" => vec![0xff_u8, 0x00, 0xfe, 0x41] })
        .await
        .unwrap();

    gateway
        .update("files", &record! { "data" => vec![0x00_u8, 0x80] }, id)
        .await
        .unwrap();

    assert_eq!(
        gateway
            .fetch_scalar(&format!("select data from files where id = {id}"))
            .await
            .unwrap(),
        Some(SqlValue::Blob(vec![0x00, 0x80]))
    );
}

#[tokio::test]
async fn test_update_table_without_primary_key() {
    let pool = memory_pool().await;
    exec(&pool, "CREATE TABLE audit_log (message TEXT)").await;
    let gateway = RecordGateway::new(SqliteDriver::new(pool));

    gateway
        .insert("audit_log", &record! { "message" => "created" })
        .await
        .unwrap();

    let err = gateway
        .update("audit_log", &record! { "message" => "changed" }, 1_i64)
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::MissingPrimaryKey(ref table) if table == "audit_log"));

    assert_eq!(
        gateway
            .fetch_scalar("select message from audit_log")
            .await
            .unwrap(),
        text("created")
    );
}

#[tokio::test]
async fn test_unknown_table() {
    let gateway = people_gateway().await;

    let err = gateway
        .insert("ghosts", &record! { "name" => "Casper" })
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::SchemaFetch { ref table, .. } if table == "ghosts"));
    assert!(err.to_string().contains("ghosts"));

    let err = gateway
        .update("ghosts", &record! { "name" => "Casper" }, 1_i64)
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::SchemaFetch { .. }));
    assert!(gateway.cache().is_empty());
}

#[tokio::test]
async fn test_invalid_raw_query() {
    let gateway = people_gateway().await;
    let err = gateway.fetch_all("select * from nowhere").await.unwrap_err();
    assert!(err.is_execution());
}
