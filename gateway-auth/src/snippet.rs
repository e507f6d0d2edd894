use gateway_web::{HeaderMap, HeaderName};

use crate::identity::Identity;

const AUTH_VALID: HeaderName = HeaderName::from_static("x-snippet-auth-valid");
const USER_ID: HeaderName = HeaderName::from_static("x-snippet-user-id");
const USER_EMAIL: HeaderName = HeaderName::from_static("x-snippet-user-email");
const USER_NAME: HeaderName = HeaderName::from_static("x-snippet-user-name");

fn header_str<'a>(headers: &'a HeaderMap, name: &HeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Read an identity out of the `x-snippet-*` headers a trusted upstream
/// (an edge function, a sidecar) attaches after doing its own
/// verification. Only consulted when `auth.trustSnippets` is on — the
/// gateway takes `x-snippet-auth-valid: true` entirely on faith, so this
/// must never be reachable from an untrusted network path.
///
/// Returns `None` when the headers aren't present or `auth-valid` isn't
/// `"true"`; a present-but-missing `user-id` with `auth-valid: true` is
/// malformed input from the trusted upstream, not absence, so that case
/// still yields `None` rather than panicking — callers fall through to
/// the next auth path.
pub fn extract_snippet_identity(headers: &HeaderMap) -> Option<Identity> {
    if header_str(headers, &AUTH_VALID) != Some("true") {
        return None;
    }
    let user_id = header_str(headers, &USER_ID)?;
    let email = header_str(headers, &USER_EMAIL).map(str::to_string);
    let name = header_str(headers, &USER_NAME).map(str::to_string);
    Some(Identity::new(user_id).with_email(email).with_name(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_web::HeaderValue;

    fn headers(pairs: &[(HeaderName, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(name.clone(), HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn reads_full_identity_when_valid() {
        let h = headers(&[
            (AUTH_VALID, "true"),
            (USER_ID, "u1"),
            (USER_EMAIL, "a@b.com"),
            (USER_NAME, "Ada"),
        ]);
        let id = extract_snippet_identity(&h).unwrap();
        assert_eq!(id.user_id, "u1");
        assert_eq!(id.email.as_deref(), Some("a@b.com"));
        assert_eq!(id.name.as_deref(), Some("Ada"));
    }

    #[test]
    fn none_when_not_marked_valid() {
        let h = headers(&[(USER_ID, "u1")]);
        assert!(extract_snippet_identity(&h).is_none());
    }

    #[test]
    fn none_when_valid_but_no_user_id() {
        let h = headers(&[(AUTH_VALID, "true")]);
        assert!(extract_snippet_identity(&h).is_none());
    }
}
