use anyhow::{Context, Result};
use rand::{distributions::Alphanumeric, Rng};
use sqlx::{postgres::PgPoolOptions, Executor, PgPool};

/// A throwaway schema on the database named by TEST_DATABASE_URL.
/// Every pooled connection has its search_path pinned to the schema, so the
/// migrations and the models only ever see this test's tables.
pub struct TestDb {
    pub pool: PgPool,
    admin: PgPool,
    schema: String,
}

impl TestDb {
    /// `None` when TEST_DATABASE_URL is unset; callers skip the test
    pub async fn new() -> Result<Option<Self>> {
        let _ = dotenvy::dotenv();
        let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
            eprintln!("TEST_DATABASE_URL not set, skipping");
            return Ok(None);
        };

        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(12)
            .map(char::from)
            .collect();
        let schema = format!("test_{}", suffix.to_lowercase());

        let admin = PgPoolOptions::new()
            .max_connections(1)
            .connect(&url)
            .await
            .context("failed to connect to TEST_DATABASE_URL")?;
        admin
            .execute(format!("CREATE SCHEMA {schema}").as_str())
            .await?;

        let search_path = format!("SET search_path TO {schema}");
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .after_connect(move |conn, _meta| {
                let search_path = search_path.clone();
                Box::pin(async move {
                    conn.execute(search_path.as_str()).await?;
                    Ok(())
                })
            })
            .connect(&url)
            .await?;

        snippetbox::database::manager::migrate(&pool).await?;

        Ok(Some(Self { pool, admin, schema }))
    }

    pub async fn teardown(self) -> Result<()> {
        self.pool.close().await;
        self.admin
            .execute(format!("DROP SCHEMA {} CASCADE", self.schema).as_str())
            .await?;
        Ok(())
    }
}
