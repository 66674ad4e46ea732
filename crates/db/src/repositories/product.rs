use std::str::FromStr;

use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use inventario_core::domain::product::{Product, ProductId};

use super::{ProductRepository, RepositoryError};
use crate::DbPool;

/// sqlite-backed product store. `precio` is persisted as TEXT and parsed
/// into a `Decimal` on read so monetary values stay exact.
pub struct SqlProductRepository {
    pool: DbPool,
}

impl SqlProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn product_from_row(row: &SqliteRow) -> Result<Product, RepositoryError> {
    let price_raw: String = row.try_get("precio")?;
    let price = Decimal::from_str(&price_raw)
        .map_err(|err| RepositoryError::Decode(format!("invalid precio `{price_raw}`: {err}")))?;

    Ok(Product {
        id: Some(ProductId(row.try_get("id")?)),
        code: row.try_get("codigo")?,
        name: row.try_get("nombre")?,
        category: row.try_get("categoria")?,
        price,
        stock: row.try_get("stock")?,
        active: row.try_get("activo")?,
    })
}

fn map_write_error(error: sqlx::Error) -> RepositoryError {
    match &error {
        sqlx::Error::Database(db_error) if db_error.is_unique_violation() => {
            RepositoryError::Constraint(db_error.message().to_string())
        }
        _ => RepositoryError::Database(error),
    }
}

#[async_trait::async_trait]
impl ProductRepository for SqlProductRepository {
    async fn find_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, codigo, nombre, categoria, precio, stock, activo
             FROM productos ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(product_from_row).collect()
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, codigo, nombre, categoria, precio, stock, activo
             FROM productos WHERE id = ?",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(product_from_row).transpose()
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, codigo, nombre, categoria, precio, stock, activo
             FROM productos WHERE codigo = ?",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(product_from_row).transpose()
    }

    async fn save(&self, mut product: Product) -> Result<Product, RepositoryError> {
        match product.id {
            Some(id) => {
                sqlx::query(
                    "UPDATE productos
                     SET codigo = ?, nombre = ?, categoria = ?, precio = ?, stock = ?, activo = ?
                     WHERE id = ?",
                )
                .bind(&product.code)
                .bind(&product.name)
                .bind(&product.category)
                .bind(product.price.to_string())
                .bind(product.stock)
                .bind(product.active)
                .bind(id.0)
                .execute(&self.pool)
                .await
                .map_err(map_write_error)?;
            }
            None => {
                let result = sqlx::query(
                    "INSERT INTO productos (codigo, nombre, categoria, precio, stock, activo)
                     VALUES (?, ?, ?, ?, ?, ?)",
                )
                .bind(&product.code)
                .bind(&product.name)
                .bind(&product.category)
                .bind(product.price.to_string())
                .bind(product.stock)
                .bind(product.active)
                .execute(&self.pool)
                .await
                .map_err(map_write_error)?;

                product.id = Some(ProductId(result.last_insert_rowid()));
            }
        }

        Ok(product)
    }

    async fn exists_by_id(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM productos WHERE id = ?")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }

    async fn delete_by_id(&self, id: ProductId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM productos WHERE id = ?").bind(id.0).execute(&self.pool).await?;
        Ok(())
    }

    async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM productos").fetch_one(&self.pool).await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use inventario_core::domain::product::{Product, ProductId};

    use crate::repositories::{ProductRepository, RepositoryError, SqlProductRepository};
    use crate::{connect_with_settings, migrations};

    async fn repo() -> SqlProductRepository {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        SqlProductRepository::new(pool)
    }

    fn draft(code: &str) -> Product {
        Product {
            id: None,
            code: code.to_string(),
            name: "Monitor LG 27 pulgadas".to_string(),
            category: Some("Electronicos".to_string()),
            price: Decimal::new(1_200_000, 0),
            stock: 8,
            active: true,
        }
    }

    #[tokio::test]
    async fn insert_assigns_id_and_round_trips_exact_price() {
        let repo = repo().await;

        let mut expensive = draft("MONITOR-001");
        expensive.price = Decimal::new(1_200_000_55, 2);
        let stored = repo.save(expensive.clone()).await.expect("insert");

        let id = stored.id.expect("assigned id");
        let found = repo.find_by_id(id).await.expect("find").expect("present");
        assert_eq!(found.price, Decimal::new(1_200_000_55, 2));
        assert_eq!(found.code, "MONITOR-001");
    }

    #[tokio::test]
    async fn find_by_code_uses_the_secondary_index() {
        let repo = repo().await;
        repo.save(draft("MONITOR-001")).await.expect("insert");

        let found = repo.find_by_code("MONITOR-001").await.expect("find");
        assert!(found.is_some());
        assert!(repo.find_by_code("NO-EXISTE").await.expect("find").is_none());
    }

    #[tokio::test]
    async fn duplicate_code_maps_to_constraint_error() {
        let repo = repo().await;
        repo.save(draft("MONITOR-001")).await.expect("first insert");

        let result = repo.save(draft("MONITOR-001")).await;
        assert!(matches!(result, Err(RepositoryError::Constraint(_))));
    }

    #[tokio::test]
    async fn save_with_id_updates_in_place() {
        let repo = repo().await;
        let stored = repo.save(draft("MONITOR-001")).await.expect("insert");

        let mut updated = stored.clone();
        updated.stock = 2;
        updated.active = false;
        repo.save(updated).await.expect("update");

        let found = repo
            .find_by_id(stored.id.expect("assigned id"))
            .await
            .expect("find")
            .expect("present");
        assert_eq!(found.stock, 2);
        assert!(!found.active);
        assert_eq!(repo.count().await.expect("count"), 1);
    }

    #[tokio::test]
    async fn delete_and_exists_agree() {
        let repo = repo().await;
        let stored = repo.save(draft("MONITOR-001")).await.expect("insert");
        let id = stored.id.expect("assigned id");

        assert!(repo.exists_by_id(id).await.expect("exists"));
        repo.delete_by_id(id).await.expect("delete");
        assert!(!repo.exists_by_id(id).await.expect("exists"));
        assert!(!repo.exists_by_id(ProductId(999)).await.expect("exists"));
    }

    #[tokio::test]
    async fn find_all_orders_by_id() {
        let repo = repo().await;
        repo.save(draft("B-001")).await.expect("insert");
        repo.save(draft("A-001")).await.expect("insert");

        let all = repo.find_all().await.expect("find_all");
        let codes: Vec<&str> = all.iter().map(|p| p.code.as_str()).collect();
        assert_eq!(codes, ["B-001", "A-001"]);
    }
}
