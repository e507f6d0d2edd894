use gateway_web::{HeaderName, HeaderValue, Response};

/// A fixed set of response headers, grounded on
/// `r2e_core::secure_headers::SecureHeaders`'s defaults (the gateway has
/// no need for that plugin's builder surface — every response gets the
/// same conservative set).
pub fn default_headers() -> Vec<(HeaderName, HeaderValue)> {
    vec![
        (HeaderName::from_static("x-content-type-options"), HeaderValue::from_static("nosniff")),
        (HeaderName::from_static("x-frame-options"), HeaderValue::from_static("DENY")),
        (HeaderName::from_static("referrer-policy"), HeaderValue::from_static("strict-origin-when-cross-origin")),
    ]
}

/// Apply [`default_headers`] to a response in place.
pub fn apply(response: &mut Response) {
    for (name, value) in default_headers() {
        response.headers_mut().insert(name, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_headers_cover_the_documented_set() {
        let headers = default_headers();
        let names: Vec<&str> = headers.iter().map(|(n, _)| n.as_str()).collect();
        assert!(names.contains(&"x-content-type-options"));
        assert!(names.contains(&"x-frame-options"));
        assert!(names.contains(&"referrer-policy"));
    }
}
