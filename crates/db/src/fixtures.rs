use sqlx::Executor;

use crate::connection::DbPool;
use crate::repositories::RepositoryError;

/// Codes of the canonical demo catalog, in seed order.
pub const SEED_PRODUCT_CODES: &[&str] = &[
    "LAPTOP-001",
    "MOUSE-001",
    "TECLADO-001",
    "MONITOR-001",
    "SILLA-001",
    "ESCRITORIO-001",
    "CAMISA-001",
    "PANTALON-001",
    "AURICULAR-001",
    "TABLET-001",
    "IMPRESORA-001",
    "LAMPARA-001",
];

/// Deterministic demo catalog used by the `seed` command and local setups.
///
/// Seeding only happens when the table is empty, so re-running it against a
/// populated database is a no-op rather than a duplicate-code failure.
pub struct SeedDataset;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeedResult {
    pub loaded: bool,
    pub product_count: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}

impl SeedDataset {
    /// SQL fixture content for the demo catalog.
    pub const SQL: &str = include_str!("../../../config/fixtures/seed_productos.sql");

    /// Load the demo catalog if the table is empty.
    pub async fn load(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
        let existing: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM productos").fetch_one(pool).await?;
        if existing > 0 {
            return Ok(SeedResult { loaded: false, product_count: existing });
        }

        let mut tx = pool.begin().await?;
        tx.execute(sqlx::query(Self::SQL)).await?;
        tx.commit().await?;

        let product_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM productos").fetch_one(pool).await?;
        Ok(SeedResult { loaded: true, product_count })
    }

    /// Verify that every canonical code is present exactly once.
    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let mut checks = Vec::with_capacity(SEED_PRODUCT_CODES.len());

        for code in SEED_PRODUCT_CODES {
            let count: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM productos WHERE codigo = ?")
                    .bind(code)
                    .fetch_one(pool)
                    .await?;
            checks.push((*code, count == 1));
        }

        let all_present = checks.iter().all(|(_, passed)| *passed);
        Ok(VerificationResult { all_present, checks })
    }
}
