use sqlx::SqlitePool;

// A single connection keeps every query on the same in-memory database.
pub async fn setup_test_db() -> SqlitePool {
    super::init_pool("sqlite::memory:", 1)
        .await
        .expect("Failed to create test db")
}
