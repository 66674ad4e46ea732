use thiserror::Error;

use crate::domain::product::ProductId;

/// Failures the product operations can report to their callers. All of these
/// are recoverable at the request boundary: handlers translate them into a
/// user-facing message plus a status flag, never an unhandled failure.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("{field}: {message}")]
    Validation { field: &'static str, message: String },
    #[error("el código `{0}` ya existe")]
    DuplicateCode(String),
    #[error("producto {0} no encontrado")]
    NotFound(ProductId),
}

impl DomainError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation { field, message: message.into() }
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::product::ProductId;

    use super::DomainError;

    #[test]
    fn messages_name_the_offending_input() {
        let validation = DomainError::validation("codigo", "debe tener al menos 3 caracteres");
        assert_eq!(validation.to_string(), "codigo: debe tener al menos 3 caracteres");

        let duplicate = DomainError::DuplicateCode("MOUSE-001".to_string());
        assert!(duplicate.to_string().contains("MOUSE-001"));

        let missing = DomainError::NotFound(ProductId(42));
        assert!(missing.to_string().contains("42"));
    }
}
