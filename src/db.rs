use sea_orm::{DatabaseConnection, SqlxSqliteConnector};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::path::Path;

pub async fn init_db(db_path: &str) -> DatabaseConnection {
    let abs_path = std::fs::canonicalize(db_path)
        .unwrap_or_else(|_| std::path::PathBuf::from(db_path));
    tracing::info!("Database absolute path: {:?}", abs_path);

    // Ensure parent directory exists
    if let Some(parent) = Path::new(db_path).parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let url = format!("sqlite:{}?mode=rwc", db_path);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("Failed to connect to SQLite");

    run_migrations(&pool).await;

    SqlxSqliteConnector::from_sqlx_sqlite_pool(pool)
}

/// In-memory database for handler tests. One connection so the migrated
/// schema stays visible.
#[cfg(test)]
pub async fn test_db() -> DatabaseConnection {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory SQLite");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Database migration failed");
    SqlxSqliteConnector::from_sqlx_sqlite_pool(pool)
}

async fn run_migrations(pool: &SqlitePool) {
    if let Err(e) = sqlx::migrate!("./migrations").run(pool).await {
        tracing::error!("Database migration failed: {}", e);
        // We probably shouldn't continue if migrations failed
        panic!("Database migration failed: {}", e);
    }

    tracing::info!("Database migrations applied successfully");
}
