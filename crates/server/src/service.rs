//! Application service for the product catalog.
//!
//! Sits between the HTTP handlers and the repository: validation and
//! catalog logic come from `inventario-core`, persistence goes through
//! the `ProductRepository` trait so handlers never touch SQL directly.

use std::sync::Arc;

use inventario_core::{
    catalog::{self, SortKey},
    domain::product::{Product, ProductDraft, ProductId, ProductPatch},
    errors::DomainError,
    stats::{self, InventoryStats},
    validate,
};
use inventario_db::repositories::{ProductRepository, RepositoryError};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("persistence failure: {0}")]
    Repository(#[from] RepositoryError),
}

impl ServiceError {
    /// Message safe to show to the person using the site. Storage
    /// failures are collapsed into a generic message; details go to
    /// the logs, not the browser.
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::Domain(err) => err.to_string(),
            ServiceError::Repository(_) => "Ocurrió un error inesperado. Intente de nuevo.".to_string(),
        }
    }
}

#[derive(Clone)]
pub struct ProductService {
    repo: Arc<dyn ProductRepository>,
}

impl ProductService {
    pub fn new(repo: Arc<dyn ProductRepository>) -> Self {
        Self { repo }
    }

    pub async fn list_all(&self) -> Result<Vec<Product>, ServiceError> {
        Ok(self.repo.find_all().await?)
    }

    /// Full listing pipeline: text search, category filter, then sort.
    pub async fn search_and_filter(
        &self,
        query: Option<&str>,
        category: Option<&str>,
        sort: SortKey,
    ) -> Result<Vec<Product>, ServiceError> {
        let products = self.repo.find_all().await?;
        Ok(catalog::search_and_filter(products, query, category, sort))
    }

    /// Distinct category labels across the whole catalog, for the
    /// listing filter dropdown. Unaffected by the current filters.
    pub async fn category_options(&self) -> Result<Vec<String>, ServiceError> {
        let products = self.repo.find_all().await?;
        Ok(catalog::category_options(&products))
    }

    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, ServiceError> {
        Ok(self.repo.find_by_id(id).await?)
    }

    pub async fn create(&self, draft: &ProductDraft) -> Result<Product, ServiceError> {
        let candidate = validate::validate_draft(draft)?;

        if self.repo.find_by_code(&candidate.code).await?.is_some() {
            warn!(
                event_name = "inventory.product.duplicate_code",
                codigo = %candidate.code,
                "create rejected, code already in use"
            );
            return Err(DomainError::DuplicateCode(candidate.code).into());
        }

        let code = candidate.code.clone();
        let saved = match self.repo.save(candidate).await {
            Ok(product) => product,
            // Unique-index backstop for the read-then-write race.
            Err(RepositoryError::Constraint(_)) => {
                return Err(DomainError::DuplicateCode(code).into());
            }
            Err(err) => return Err(err.into()),
        };

        info!(
            event_name = "inventory.product.created",
            producto_id = saved.id.map(|id| id.0).unwrap_or_default(),
            codigo = %saved.code,
            "product created"
        );
        Ok(saved)
    }

    /// Applies a partial update. The code is immutable after creation,
    /// so the patch has no code field to begin with.
    pub async fn update(&self, id: ProductId, patch: &ProductPatch) -> Result<Product, ServiceError> {
        validate::validate_patch(patch)?;

        let existing = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(DomainError::NotFound(id))?;

        let updated = patch.apply_to(existing);
        let saved = self.repo.save(updated).await?;

        info!(
            event_name = "inventory.product.updated",
            producto_id = id.0,
            codigo = %saved.code,
            "product updated"
        );
        Ok(saved)
    }

    pub async fn delete(&self, id: ProductId) -> Result<(), ServiceError> {
        if !self.repo.exists_by_id(id).await? {
            return Err(DomainError::NotFound(id).into());
        }
        self.repo.delete_by_id(id).await?;

        info!(event_name = "inventory.product.deleted", producto_id = id.0, "product deleted");
        Ok(())
    }

    pub async fn statistics(&self) -> Result<InventoryStats, ServiceError> {
        let products = self.repo.find_all().await?;
        Ok(stats::compute_stats(&products))
    }
}
