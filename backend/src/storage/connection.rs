use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};
use std::str::FromStr;
use tracing::info;

/// DbConnection owns the SQLite pool and the schema
#[derive(Clone)]
pub struct DbConnection {
    pool: SqlitePool,
}

impl DbConnection {
    /// Open (creating if needed) the database at `url` and apply the schema
    pub async fn new(url: &str) -> Result<Self> {
        if !url.contains(":memory:") && !Sqlite::database_exists(url).await? {
            info!("Creating database {}", url);
            Sqlite::create_database(url).await?;
        }

        // Parent references are plain ids; deleting a parent must leave them dangling.
        let options = SqliteConnectOptions::from_str(url)?.foreign_keys(false);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;

        Self::setup_schema(&pool).await?;

        Ok(Self { pool })
    }

    /// Private in-memory database for a single test
    #[cfg(test)]
    pub async fn init_test() -> Result<Self> {
        // One connection that never expires, otherwise the in-memory database vanishes.
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(false);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Self::setup_schema(&pool).await?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Re-apply the schema. Every statement is idempotent.
    pub async fn run_migrations(&self) -> Result<()> {
        info!("Applying database schema");
        Self::setup_schema(&self.pool).await
    }

    /// Close the pool, waiting for checked-out connections to return
    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS sheep (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                tag_id TEXT NOT NULL UNIQUE,
                date_of_birth TEXT NOT NULL,
                gender TEXT NOT NULL CHECK (gender IN ('male', 'female')),
                is_pregnant BOOLEAN,
                weight REAL,
                weaning_weight REAL,
                breed TEXT,
                medical_records TEXT,
                image_reference TEXT,
                is_lamb BOOLEAN NOT NULL DEFAULT 0,
                mother_id INTEGER REFERENCES sheep (id),
                father_id INTEGER REFERENCES sheep (id),
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );
            "#,
        )
        .execute(pool)
        .await?;

        // Resolver lookups are case-insensitive; the UNIQUE index above is not.
        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_sheep_tag_nocase
            ON sheep (tag_id COLLATE NOCASE);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_sheep_mother ON sheep (mother_id);")
            .execute(pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_sheep_father ON sheep (father_id);")
            .execute(pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_sheep_is_lamb ON sheep (is_lamb);")
            .execute(pool)
            .await?;

        Ok(())
    }
}
