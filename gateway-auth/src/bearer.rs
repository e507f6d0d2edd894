use gateway_core::AppError;
use gateway_web::HeaderMap;

/// Pull the token out of an `Authorization: Bearer <token>` header value.
/// The scheme check is case-insensitive per RFC 6750.
pub fn extract_bearer_token(header_value: &str) -> Result<&str, AppError> {
    let mut parts = header_value.splitn(2, ' ');
    let scheme = parts.next().unwrap_or("");
    let token = parts.next().unwrap_or("").trim();
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AppError::AuthRequired("expected a Bearer authorization header".into()));
    }
    if token.is_empty() {
        return Err(AppError::AuthRequired("empty bearer token".into()));
    }
    Ok(token)
}

/// Same, read straight off request headers. Returns `Ok(None)` when the
/// header is simply absent (not an error by itself — the caller decides
/// whether that's `AuthRequired` based on the configured auth mode).
pub fn bearer_token_from_headers(headers: &HeaderMap) -> Result<Option<&str>, AppError> {
    match headers.get(gateway_web::AUTHORIZATION) {
        None => Ok(None),
        Some(value) => {
            let s = value
                .to_str()
                .map_err(|_| AppError::InvalidToken("authorization header is not valid UTF-8".into()))?;
            extract_bearer_token(s).map(Some)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_token_case_insensitive_scheme() {
        assert_eq!(extract_bearer_token("Bearer abc.def.ghi").unwrap(), "abc.def.ghi");
        assert_eq!(extract_bearer_token("bearer abc").unwrap(), "abc");
        assert_eq!(extract_bearer_token("BEARER abc").unwrap(), "abc");
    }

    #[test]
    fn rejects_wrong_scheme() {
        let err = extract_bearer_token("Basic abc").unwrap_err();
        assert_eq!(err.code(), "AUTH_REQUIRED");
    }

    #[test]
    fn rejects_empty_token() {
        let err = extract_bearer_token("Bearer ").unwrap_err();
        assert_eq!(err.code(), "AUTH_REQUIRED");
    }

    #[test]
    fn missing_header_is_none_not_error() {
        let headers = HeaderMap::new();
        assert_eq!(bearer_token_from_headers(&headers).unwrap(), None);
    }
}
