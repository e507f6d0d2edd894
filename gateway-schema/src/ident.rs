/// `^[A-Za-z][A-Za-z0-9_]*$` — the sole defence against injection when a
/// model or field name reaches a SQL-writing store.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_identifiers() {
        assert!(is_valid_identifier("Contact"));
        assert!(is_valid_identifier("user_profile"));
        assert!(is_valid_identifier("a1"));
    }

    #[test]
    fn rejects_injection_attempts() {
        assert!(!is_valid_identifier("users; DROP TABLE users--"));
        assert!(!is_valid_identifier("1leading"));
        assert!(!is_valid_identifier("_leading"));
        assert!(!is_valid_identifier("has space"));
        assert!(!is_valid_identifier("quote'd"));
        assert!(!is_valid_identifier(""));
    }
}
