use std::collections::HashMap;

use tokio::sync::RwLock;

use inventario_core::domain::product::{Product, ProductId};

use super::{ProductRepository, RepositoryError};

/// Map-backed repository used by unit tests and local experiments. Mirrors
/// the sqlite adapter's behavior: ids are assigned from a sequence and the
/// code-uniqueness backstop rejects duplicate inserts.
#[derive(Default)]
pub struct InMemoryProductRepository {
    state: RwLock<Store>,
}

#[derive(Default)]
struct Store {
    products: HashMap<i64, Product>,
    next_id: i64,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate the store, assigning ids in input order.
    pub async fn with_products(products: Vec<Product>) -> Result<Self, RepositoryError> {
        let repo = Self::default();
        for product in products {
            repo.save(product).await?;
        }
        Ok(repo)
    }
}

#[async_trait::async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn find_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let state = self.state.read().await;
        let mut products: Vec<Product> = state.products.values().cloned().collect();
        products.sort_by_key(|p| p.id);
        Ok(products)
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.products.get(&id.0).cloned())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Product>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.products.values().find(|p| p.code == code).cloned())
    }

    async fn save(&self, mut product: Product) -> Result<Product, RepositoryError> {
        let mut state = self.state.write().await;

        let conflicting = state
            .products
            .values()
            .any(|existing| existing.code == product.code && existing.id != product.id);
        if conflicting {
            return Err(RepositoryError::Constraint(format!(
                "UNIQUE constraint failed: productos.codigo ({})",
                product.code
            )));
        }

        let id = match product.id {
            Some(id) => id.0,
            None => {
                state.next_id += 1;
                let id = state.next_id;
                product.id = Some(ProductId(id));
                id
            }
        };
        state.next_id = state.next_id.max(id);
        state.products.insert(id, product.clone());
        Ok(product)
    }

    async fn exists_by_id(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.products.contains_key(&id.0))
    }

    async fn delete_by_id(&self, id: ProductId) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        state.products.remove(&id.0);
        Ok(())
    }

    async fn count(&self) -> Result<i64, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.products.len() as i64)
    }
}
