use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

/// Foreign keys must be on for the cascade deletes the schema relies on.
pub async fn create_pool(url: &str) -> SqlitePool {
    let options = SqliteConnectOptions::from_str(url)
        .expect("invalid database url")
        .create_if_missing(true)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .connect_with(options)
        .await
        .expect("error while connecting to db")
}

pub async fn migrate(pool: &SqlitePool) {
    sqlx::migrate!()
        .run(pool)
        .await
        .expect("error in migrations")
}
