use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Display bucket for products without a category.
pub const UNCATEGORIZED: &str = "Sin categoría";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProductId(pub i64);

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// An inventory record. `id` is `None` until the storage layer assigns one;
/// once set it is never reassigned. `code` is unique and immutable after
/// creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: Option<ProductId>,
    pub code: String,
    pub name: String,
    pub category: Option<String>,
    pub price: Decimal,
    pub stock: i64,
    pub active: bool,
}

impl Product {
    /// Category name used for grouping, with `None` mapped to the
    /// uncategorized bucket.
    pub fn category_label(&self) -> &str {
        self.category.as_deref().unwrap_or(UNCATEGORIZED)
    }
}

/// Creation candidate as submitted by a caller. Every field is optional so
/// the validation layer can report missing fields explicitly instead of
/// failing at deserialization.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub code: Option<String>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i64>,
    pub active: Option<bool>,
}

/// Partial update. The merge rule is explicit: `None` means "leave the
/// stored value unchanged". `code` is deliberately absent — it can never be
/// modified through an update.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i64>,
    pub active: Option<bool>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.price.is_none()
            && self.stock.is_none()
            && self.active.is_none()
    }

    /// Merge this patch into an existing product, returning the updated
    /// record. Supplied fields overwrite; absent fields are kept as-is.
    /// A supplied blank category clears the stored one.
    pub fn apply_to(&self, mut product: Product) -> Product {
        if let Some(name) = &self.name {
            product.name = name.trim().to_string();
        }
        if let Some(category) = &self.category {
            let category = category.trim();
            product.category =
                if category.is_empty() { None } else { Some(category.to_string()) };
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        if let Some(active) = self.active {
            product.active = active;
        }
        product
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{Product, ProductId, ProductPatch};

    fn stored_product() -> Product {
        Product {
            id: Some(ProductId(7)),
            code: "MOUSE-001".to_string(),
            name: "Mouse Logitech MX Master".to_string(),
            category: Some("Accesorios".to_string()),
            price: Decimal::new(320_000, 0),
            stock: 45,
            active: true,
        }
    }

    #[test]
    fn empty_patch_leaves_every_field_unchanged() {
        let product = stored_product();
        let merged = ProductPatch::default().apply_to(product.clone());
        assert_eq!(merged, product);
    }

    #[test]
    fn patch_overwrites_only_supplied_fields() {
        let patch = ProductPatch {
            stock: Some(3),
            active: Some(false),
            ..ProductPatch::default()
        };
        let merged = patch.apply_to(stored_product());

        assert_eq!(merged.stock, 3);
        assert!(!merged.active);
        assert_eq!(merged.name, "Mouse Logitech MX Master");
        assert_eq!(merged.category.as_deref(), Some("Accesorios"));
        assert_eq!(merged.code, "MOUSE-001");
    }

    #[test]
    fn blank_category_in_patch_clears_stored_value() {
        let patch = ProductPatch { category: Some("   ".to_string()), ..ProductPatch::default() };
        let merged = patch.apply_to(stored_product());
        assert_eq!(merged.category, None);
    }

    #[test]
    fn category_label_maps_none_to_uncategorized() {
        let mut product = stored_product();
        assert_eq!(product.category_label(), "Accesorios");

        product.category = None;
        assert_eq!(product.category_label(), super::UNCATEGORIZED);
    }
}
