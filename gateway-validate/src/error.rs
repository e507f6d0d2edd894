pub use gateway_core::FieldError;

/// A non-empty document failed validation. Distinct from
/// `gateway_core::AppError::Validation` — this crate never talks HTTP,
/// the caller wraps this into a response at the boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldError { field: field.into(), message: message.into() });
    }
}

impl Default for ValidationErrors {
    fn default() -> Self {
        Self(Vec::new())
    }
}
