//! In-memory search, filter, and ordering over the full product collection.
//!
//! The pipeline order is fixed: text filter, then category filter, then
//! sort. Every sort is stable so ties keep the incoming collection order.

use crate::domain::product::Product;

/// Sentinel category meaning "no category filter".
pub const CATEGORY_ALL: &str = "Todas";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortKey {
    /// Ascending by id; the fallback for unknown or absent sort values.
    #[default]
    Id,
    Name,
    PriceAsc,
    PriceDesc,
    StockAsc,
    StockDesc,
}

impl SortKey {
    /// Parse the raw request parameter. Unknown values normalize to the id
    /// ordering rather than failing.
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("nombre") => Self::Name,
            Some("precio_asc") => Self::PriceAsc,
            Some("precio_desc") => Self::PriceDesc,
            Some("stock_asc") => Self::StockAsc,
            Some("stock_desc") => Self::StockDesc,
            _ => Self::Id,
        }
    }

    /// The wire value the HTML form round-trips.
    pub fn as_raw(&self) -> &'static str {
        match self {
            Self::Id => "",
            Self::Name => "nombre",
            Self::PriceAsc => "precio_asc",
            Self::PriceDesc => "precio_desc",
            Self::StockAsc => "stock_asc",
            Self::StockDesc => "stock_desc",
        }
    }
}

/// Filter by free-text query (case-insensitive substring over code or name),
/// then by exact category (skipped for blank input or the `Todas` sentinel),
/// then sort.
pub fn search_and_filter(
    mut products: Vec<Product>,
    query: Option<&str>,
    category: Option<&str>,
    sort: SortKey,
) -> Vec<Product> {
    if let Some(query) = query.map(str::trim).filter(|q| !q.is_empty()) {
        let needle = query.to_lowercase();
        products.retain(|product| {
            product.code.to_lowercase().contains(&needle)
                || product.name.to_lowercase().contains(&needle)
        });
    }

    if let Some(category) = category.map(str::trim).filter(|c| !c.is_empty() && *c != CATEGORY_ALL)
    {
        // Exact, case-sensitive match; uncategorized products never match.
        products.retain(|product| product.category.as_deref() == Some(category));
    }

    match sort {
        SortKey::Id => products.sort_by_key(|p| p.id),
        SortKey::Name => products.sort_by(|a, b| a.name.cmp(&b.name)),
        SortKey::PriceAsc => products.sort_by(|a, b| a.price.cmp(&b.price)),
        SortKey::PriceDesc => products.sort_by(|a, b| b.price.cmp(&a.price)),
        SortKey::StockAsc => products.sort_by_key(|p| p.stock),
        SortKey::StockDesc => products.sort_by(|a, b| b.stock.cmp(&a.stock)),
    }

    products
}

/// Distinct category labels present in the collection, sorted, for the
/// filter dropdown. Uncategorized products contribute their display bucket.
pub fn category_options(products: &[Product]) -> Vec<String> {
    let mut categories: Vec<String> =
        products.iter().map(|p| p.category_label().to_string()).collect();
    categories.sort();
    categories.dedup();
    categories
}
