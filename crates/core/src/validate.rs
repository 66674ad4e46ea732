//! Field validation for product writes.
//!
//! The rules mirror the entity constraints and are enforced at the service
//! boundary regardless of what any front-end form already checked: code
//! 3–50 uppercase letters/digits/hyphens, name 5–120, category up to 50,
//! price in `[1, 999_999_999]`, stock in `[0, 999_999]`.

use rust_decimal::Decimal;

use crate::domain::product::{Product, ProductDraft, ProductPatch};
use crate::errors::DomainError;

pub const CODE_MIN_LEN: usize = 3;
pub const CODE_MAX_LEN: usize = 50;
pub const NAME_MIN_LEN: usize = 5;
pub const NAME_MAX_LEN: usize = 120;
pub const CATEGORY_MAX_LEN: usize = 50;
pub const PRICE_MAX: i64 = 999_999_999;
pub const STOCK_MAX: i64 = 999_999;

/// Validate a creation candidate and normalize it into a not-yet-persisted
/// product (trimmed strings, blank category collapsed to `None`, `active`
/// defaulting to true).
pub fn validate_draft(draft: &ProductDraft) -> Result<Product, DomainError> {
    let code = validate_code(draft.code.as_deref())?;
    let name = validate_name(draft.name.as_deref())?;
    let category = validate_category(draft.category.as_deref())?;
    let price = validate_price(draft.price)?;
    let stock = validate_stock(draft.stock)?;

    Ok(Product {
        id: None,
        code,
        name,
        category,
        price,
        stock,
        active: draft.active.unwrap_or(true),
    })
}

/// Validate the fields a patch actually carries. Absent fields are skipped;
/// the merge rule is `None` = unchanged, so there is nothing to check.
pub fn validate_patch(patch: &ProductPatch) -> Result<(), DomainError> {
    if let Some(name) = patch.name.as_deref() {
        validate_name(Some(name))?;
    }
    if let Some(category) = patch.category.as_deref() {
        validate_category(Some(category))?;
    }
    if patch.price.is_some() {
        validate_price(patch.price)?;
    }
    if patch.stock.is_some() {
        validate_stock(patch.stock)?;
    }
    Ok(())
}

fn validate_code(code: Option<&str>) -> Result<String, DomainError> {
    let code = code.map(str::trim).unwrap_or_default();
    if code.len() < CODE_MIN_LEN {
        return Err(DomainError::validation(
            "codigo",
            format!("el código debe tener al menos {CODE_MIN_LEN} caracteres"),
        ));
    }
    if code.len() > CODE_MAX_LEN {
        return Err(DomainError::validation(
            "codigo",
            format!("el código no puede exceder {CODE_MAX_LEN} caracteres"),
        ));
    }
    let well_formed =
        code.chars().all(|ch| ch.is_ascii_uppercase() || ch.is_ascii_digit() || ch == '-');
    if !well_formed {
        return Err(DomainError::validation(
            "codigo",
            "el código solo admite mayúsculas, dígitos y guiones",
        ));
    }
    Ok(code.to_string())
}

fn validate_name(name: Option<&str>) -> Result<String, DomainError> {
    let name = name.map(str::trim).unwrap_or_default();
    if name.chars().count() < NAME_MIN_LEN {
        return Err(DomainError::validation(
            "nombre",
            format!("el nombre debe tener al menos {NAME_MIN_LEN} caracteres"),
        ));
    }
    if name.chars().count() > NAME_MAX_LEN {
        return Err(DomainError::validation(
            "nombre",
            format!("el nombre no puede exceder {NAME_MAX_LEN} caracteres"),
        ));
    }
    Ok(name.to_string())
}

fn validate_category(category: Option<&str>) -> Result<Option<String>, DomainError> {
    let Some(category) = category.map(str::trim) else {
        return Ok(None);
    };
    if category.is_empty() {
        return Ok(None);
    }
    if category.chars().count() > CATEGORY_MAX_LEN {
        return Err(DomainError::validation(
            "categoria",
            format!("la categoría no puede exceder {CATEGORY_MAX_LEN} caracteres"),
        ));
    }
    Ok(Some(category.to_string()))
}

fn validate_price(price: Option<Decimal>) -> Result<Decimal, DomainError> {
    let Some(price) = price else {
        return Err(DomainError::validation("precio", "el precio es obligatorio"));
    };
    if price < Decimal::ONE {
        return Err(DomainError::validation("precio", "el precio debe ser mayor a 0"));
    }
    if price > Decimal::from(PRICE_MAX) {
        return Err(DomainError::validation(
            "precio",
            format!("el precio no puede exceder ${PRICE_MAX}"),
        ));
    }
    Ok(price)
}

fn validate_stock(stock: Option<i64>) -> Result<i64, DomainError> {
    let Some(stock) = stock else {
        return Err(DomainError::validation("stock", "el stock es obligatorio"));
    };
    if stock < 0 {
        return Err(DomainError::validation("stock", "el stock no puede ser negativo"));
    }
    if stock > STOCK_MAX {
        return Err(DomainError::validation(
            "stock",
            format!("el stock no puede exceder {STOCK_MAX} unidades"),
        ));
    }
    Ok(stock)
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::domain::product::{ProductDraft, ProductPatch};
    use crate::errors::DomainError;

    use super::{validate_draft, validate_patch};

    fn valid_draft() -> ProductDraft {
        ProductDraft {
            code: Some("LAPTOP-001".to_string()),
            name: Some("Laptop Dell Inspiron 15".to_string()),
            category: Some("Electronicos".to_string()),
            price: Some(Decimal::new(3_500_000, 0)),
            stock: Some(15),
            active: None,
        }
    }

    fn field_of(result: Result<impl std::fmt::Debug, DomainError>) -> &'static str {
        match result {
            Err(DomainError::Validation { field, .. }) => field,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn valid_draft_normalizes_into_product() {
        let product = validate_draft(&valid_draft()).expect("draft should validate");

        assert_eq!(product.id, None);
        assert_eq!(product.code, "LAPTOP-001");
        assert!(product.active, "active defaults to true");
    }

    #[test]
    fn draft_trims_fields_and_collapses_blank_category() {
        let draft = ProductDraft {
            code: Some("  SILLA-001  ".to_string()),
            name: Some("  Silla Ergonómica Oficina ".to_string()),
            category: Some("   ".to_string()),
            ..valid_draft()
        };

        let product = validate_draft(&draft).expect("draft should validate");
        assert_eq!(product.code, "SILLA-001");
        assert_eq!(product.name, "Silla Ergonómica Oficina");
        assert_eq!(product.category, None);
    }

    #[test]
    fn missing_or_short_code_is_rejected() {
        assert_eq!(field_of(validate_draft(&ProductDraft { code: None, ..valid_draft() })), "codigo");

        let short = ProductDraft { code: Some("AB".to_string()), ..valid_draft() };
        assert_eq!(field_of(validate_draft(&short)), "codigo");
    }

    #[test]
    fn lowercase_code_is_rejected() {
        let draft = ProductDraft { code: Some("laptop-001".to_string()), ..valid_draft() };
        assert_eq!(field_of(validate_draft(&draft)), "codigo");
    }

    #[test]
    fn short_name_is_rejected() {
        let draft = ProductDraft { name: Some("Ab c".to_string()), ..valid_draft() };
        assert_eq!(field_of(validate_draft(&draft)), "nombre");
    }

    #[test]
    fn price_must_be_at_least_one() {
        let missing = ProductDraft { price: None, ..valid_draft() };
        assert_eq!(field_of(validate_draft(&missing)), "precio");

        let zero = ProductDraft { price: Some(Decimal::ZERO), ..valid_draft() };
        assert_eq!(field_of(validate_draft(&zero)), "precio");

        let over = ProductDraft { price: Some(Decimal::from(1_000_000_000_i64)), ..valid_draft() };
        assert_eq!(field_of(validate_draft(&over)), "precio");
    }

    #[test]
    fn stock_bounds_are_enforced() {
        let negative = ProductDraft { stock: Some(-1), ..valid_draft() };
        assert_eq!(field_of(validate_draft(&negative)), "stock");

        let over = ProductDraft { stock: Some(1_000_000), ..valid_draft() };
        assert_eq!(field_of(validate_draft(&over)), "stock");
    }

    #[test]
    fn patch_skips_absent_fields_but_checks_present_ones() {
        assert!(validate_patch(&ProductPatch::default()).is_ok());

        let bad_name = ProductPatch { name: Some("ab".to_string()), ..ProductPatch::default() };
        assert_eq!(field_of(validate_patch(&bad_name).map(|_| ())), "nombre");

        let bad_stock = ProductPatch { stock: Some(-5), ..ProductPatch::default() };
        assert_eq!(field_of(validate_patch(&bad_stock).map(|_| ())), "stock");
    }
}
