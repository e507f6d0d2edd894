/// Parse-time errors. These are fatal at startup (propagation
/// policy) — never serialized into a request/response envelope, so this
/// type deliberately does not implement `IntoResponse`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    InvalidIdentifier(String),
    UnresolvedRelation { model: String, field: String, target: String },
}

impl std::fmt::Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaError::InvalidIdentifier(msg) => write!(f, "InvalidIdentifier: {msg}"),
            SchemaError::UnresolvedRelation { model, field, target } => {
                write!(f, "UnresolvedRelation: {model}.{field} -> {target}")
            }
        }
    }
}

impl std::error::Error for SchemaError {}
