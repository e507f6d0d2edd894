/// Subdomains that are never a tenant slug even though they sit where
/// one would: the gateway's own surfaces.
pub const SYSTEM_SUBDOMAINS: &[&str] =
    &["api", "www", "platform", "dashboard", "docs", "agents", "db", "ch", "code", "crm", "build", "launch", "grow", "scale"];

/// Strip a leading `/~{slug}/` (or bare `/~{slug}`) tenant prefix off a
/// path. `extract_tenant_from_path("/~acme/contacts")` returns
/// `(Some("acme"), "/contacts")`; a bare `/~acme` normalises to `"/"`.
pub fn extract_tenant_from_path(path: &str) -> (Option<String>, String) {
    let Some(rest) = path.strip_prefix("/~") else {
        return (None, path.to_string());
    };
    let (slug, remainder) = match rest.find('/') {
        Some(idx) => (&rest[..idx], &rest[idx..]),
        None => (rest, ""),
    };
    if slug.is_empty() {
        return (None, path.to_string());
    }
    let normalized = if remainder.is_empty() { "/".to_string() } else { remainder.to_string() };
    (Some(slug.to_string()), normalized)
}

/// `{slug}.{baseDomain}` gives a tenant unless `slug` is a system
/// subdomain. Ports are stripped from `host` before comparison.
pub fn extract_tenant_from_host(host: &str, base_domain: &str) -> Option<String> {
    let host = host.split(':').next().unwrap_or(host);
    let suffix = format!(".{base_domain}");
    let slug = host.strip_suffix(&suffix)?;
    if slug.is_empty() || slug.contains('.') {
        return None;
    }
    if SYSTEM_SUBDOMAINS.iter().any(|s| s.eq_ignore_ascii_case(slug)) {
        return None;
    }
    Some(slug.to_string())
}

/// Resolve a request's tenant: path prefix first, then subdomain, else
/// root scope. Returns the tenant (if any) and the path with any `/~slug`
/// prefix already stripped.
pub fn resolve_tenant(path: &str, host: Option<&str>, base_domain: Option<&str>) -> (Option<String>, String) {
    let (tenant, path) = extract_tenant_from_path(path);
    if tenant.is_some() {
        return (tenant, path);
    }
    if let (Some(host), Some(base_domain)) = (host, base_domain) {
        if let Some(slug) = extract_tenant_from_host(host, base_domain) {
            return (Some(slug), path);
        }
    }
    (None, path)
}
