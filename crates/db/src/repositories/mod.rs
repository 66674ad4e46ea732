use async_trait::async_trait;
use thiserror::Error;

use inventario_core::domain::product::{Product, ProductId};

pub mod memory;
pub mod product;

pub use memory::InMemoryProductRepository;
pub use product::SqlProductRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
    /// A storage-level constraint rejected the write. The unique index on
    /// `codigo` is the backstop for the service's read-then-write uniqueness
    /// check, so concurrent creates with the same code surface here.
    #[error("constraint violation: {0}")]
    Constraint(String),
}

/// Narrow persistence interface for the product collection. Backed by an
/// in-memory map in tests and by sqlite in production.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Every product, in storage iteration order (ascending id).
    async fn find_all(&self) -> Result<Vec<Product>, RepositoryError>;

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    async fn find_by_code(&self, code: &str) -> Result<Option<Product>, RepositoryError>;

    /// Insert when `product.id` is `None`, update otherwise. Returns the
    /// stored record with its assigned id.
    async fn save(&self, product: Product) -> Result<Product, RepositoryError>;

    async fn exists_by_id(&self, id: ProductId) -> Result<bool, RepositoryError>;

    async fn delete_by_id(&self, id: ProductId) -> Result<(), RepositoryError>;

    async fn count(&self) -> Result<i64, RepositoryError>;
}
