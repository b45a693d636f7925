//! Test harness with testcontainers for integration testing.
//!
//! Uses one shared Postgres container across all tests in a binary.
//! The container starts and migrations run on the first test, then both are reused.

use anyhow::{Context, Result};
use assignment::{AssignmentEngine, PostgresStore};
use review_server::db::MIGRATOR;
use sqlx::PgPool;
use std::sync::atomic::{AtomicU64, Ordering};
use test_context::AsyncTestContext;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared test infrastructure that persists across all tests.
struct SharedTestInfra {
    db_url: String,
    // Keep the container alive for the entire test run
    _postgres: ContainerAsync<Postgres>,
}

/// Global shared infrastructure - initialized once, reused by all tests.
static SHARED_INFRA: OnceCell<SharedTestInfra> = OnceCell::const_new();

/// Source of per-test id prefixes; tests share one database.
static NEXT_PREFIX: AtomicU64 = AtomicU64::new(1);

impl SharedTestInfra {
    async fn init() -> Result<Self> {
        // Run tests with: RUST_LOG=debug cargo test -- --nocapture
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let postgres = Postgres::default()
            .with_tag("16")
            .start()
            .await
            .context("Failed to start Postgres container")?;

        let pg_host = postgres.get_host().await?;
        let pg_port = postgres.get_host_port_ipv4(5432).await?;
        let db_url = format!(
            "postgresql://postgres:postgres@{}:{}/postgres",
            pg_host, pg_port
        );

        // Run migrations once on the shared database
        let pool = PgPool::connect(&db_url)
            .await
            .context("Failed to connect to Postgres for migrations")?;

        MIGRATOR
            .run(&pool)
            .await
            .context("Failed to run migrations")?;

        Ok(Self {
            db_url,
            _postgres: postgres,
        })
    }

    async fn get() -> &'static Self {
        SHARED_INFRA
            .get_or_init(|| async {
                Self::init()
                    .await
                    .expect("Failed to initialize shared test infrastructure")
            })
            .await
    }
}

/// Test harness backed by a real PostgreSQL store.
///
/// # Example using test-context
///
/// ```ignore
/// use test_context::test_context;
///
/// #[test_context(TestHarness)]
/// #[tokio::test]
/// async fn my_test(ctx: &TestHarness) {
///     let team = ctx.id("backend");
///     // ... test code
/// }
/// ```
pub struct TestHarness {
    pub db_pool: PgPool,
    pub store: PostgresStore,
    prefix: String,
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::new().await.expect("Failed to create test harness")
    }

    async fn teardown(self) {
        self.db_pool.close().await;
    }
}

impl TestHarness {
    pub async fn new() -> Result<Self> {
        let infra = SharedTestInfra::get().await;

        let store = PostgresStore::new(&infra.db_url)
            .await
            .context("Failed to connect to test database")?;

        let prefix = format!("t{}", NEXT_PREFIX.fetch_add(1, Ordering::Relaxed));

        Ok(Self {
            db_pool: store.pool().clone(),
            store,
            prefix,
        })
    }

    /// An id unique to this test.
    pub fn id(&self, name: &str) -> String {
        format!("{}-{}", self.prefix, name)
    }

    pub fn engine(&self) -> AssignmentEngine<PostgresStore> {
        AssignmentEngine::new(self.store.clone())
    }
}
