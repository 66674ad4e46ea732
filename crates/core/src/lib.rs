pub mod catalog;
pub mod config;
pub mod domain;
pub mod errors;
pub mod stats;
pub mod validate;

pub use catalog::{search_and_filter, SortKey, CATEGORY_ALL};
pub use domain::product::{Product, ProductDraft, ProductId, ProductPatch, UNCATEGORIZED};
pub use errors::DomainError;
pub use stats::{compute_stats, InventoryStats};
