use sqlx::PgPool;

/// Full bootstrap test: connect, migrate, verify schema.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_full_bootstrap(pool: PgPool) {
    deskrelay_db::health_check(&pool).await.unwrap();

    let tables = [
        "users",
        "address_books",
        "peers",
        "address_book_tags",
        "tags",
        "devices",
        "audits",
        "file_transfers",
        "kb_categories",
        "kb_articles",
        "tickets",
        "ticket_comments",
    ];

    for table in tables {
        let count: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&pool)
            .await
            .unwrap_or_else(|e| panic!("{table} query failed: {e}"));
        assert_eq!(count.0, 0, "{table} should start empty");
    }
}

/// The updated_at trigger stamps rows unless the writer sets the column.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_updated_at_trigger_respects_explicit_value(pool: PgPool) {
    sqlx::query(
        "INSERT INTO devices (rustdesk_id, updated_at) VALUES ('t1', '2020-01-01T00:00:00Z')",
    )
    .execute(&pool)
    .await
    .unwrap();

    sqlx::query("UPDATE devices SET hostname = 'h' WHERE rustdesk_id = 't1'")
        .execute(&pool)
        .await
        .unwrap();
    let stamped: (chrono::DateTime<chrono::Utc>,) =
        sqlx::query_as("SELECT updated_at FROM devices WHERE rustdesk_id = 't1'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert!(stamped.0.timestamp() > 1_600_000_000);

    sqlx::query(
        "UPDATE devices SET updated_at = '2021-06-01T00:00:00Z' WHERE rustdesk_id = 't1'",
    )
    .execute(&pool)
    .await
    .unwrap();
    let explicit: (chrono::DateTime<chrono::Utc>,) =
        sqlx::query_as("SELECT updated_at FROM devices WHERE rustdesk_id = 't1'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(explicit.0.to_rfc3339(), "2021-06-01T00:00:00+00:00");
}
