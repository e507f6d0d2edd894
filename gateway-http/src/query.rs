use gateway_core::{AppError, GatewayConfig};
use gateway_filter::parse_sort;
use indexmap::IndexMap;

/// Resolved `limit`/`offset` pagination window. `limit` is always clamped
/// into `[1, max_page_size]`; an absent `limit` falls back to the
/// configured page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub limit: u32,
    pub offset: u32,
}

/// Parse `limit`/`offset` (or `page`, one-indexed) query params against a
/// config's page-size defaults. Unparseable numeric params are treated as
/// absent rather than rejected outright — a gateway favors permissive
/// query parsing over hard 400s on cosmetic params.
pub fn parse_page_params(params: &IndexMap<String, String>, config: &GatewayConfig) -> PageParams {
    let max = config.max_page_size();
    let default = config.page_size().min(max).max(1);

    let limit = params
        .get("limit")
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(default)
        .clamp(1, max);

    let offset = match params.get("offset").and_then(|v| v.parse::<u32>().ok()) {
        Some(offset) => offset,
        None => params
            .get("page")
            .and_then(|v| v.parse::<u32>().ok())
            .map(|page| page.saturating_sub(1).saturating_mul(limit))
            .unwrap_or(0),
    };

    PageParams { limit, offset }
}

/// Parse the `sort` (or legacy `$sort`) query param into an ordered
/// field-to-direction map, per [`gateway_filter::parse_sort`].
pub fn parse_sort_param(params: &IndexMap<String, String>) -> Result<IndexMap<String, i8>, AppError> {
    let raw = match params.get("sort").or_else(|| params.get("$sort")) {
        Some(raw) => raw,
        None => return Ok(IndexMap::new()),
    };
    parse_sort(raw).map_err(|e| AppError::BadRequest(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn defaults_come_from_config() {
        let config = GatewayConfig::default();
        let page = parse_page_params(&IndexMap::new(), &config);
        assert_eq!(page.limit, 20);
        assert_eq!(page.offset, 0);
    }

    #[test]
    fn limit_is_clamped_to_max_page_size() {
        let config = GatewayConfig::default();
        let page = parse_page_params(&params(&[("limit", "9999")]), &config);
        assert_eq!(page.limit, 100);
    }

    #[test]
    fn limit_is_clamped_to_at_least_one() {
        let config = GatewayConfig::default();
        let page = parse_page_params(&params(&[("limit", "0")]), &config);
        assert_eq!(page.limit, 1);
    }

    #[test]
    fn page_param_is_converted_to_offset() {
        let config = GatewayConfig::default();
        let page = parse_page_params(&params(&[("limit", "10"), ("page", "3")]), &config);
        assert_eq!(page.offset, 20);
    }

    #[test]
    fn explicit_offset_wins_over_page() {
        let config = GatewayConfig::default();
        let page = parse_page_params(&params(&[("offset", "5"), ("page", "3")]), &config);
        assert_eq!(page.offset, 5);
    }

    #[test]
    fn sort_param_defaults_to_empty() {
        let sort = parse_sort_param(&IndexMap::new()).unwrap();
        assert!(sort.is_empty());
    }

    #[test]
    fn legacy_dollar_sort_is_read() {
        let sort = parse_sort_param(&params(&[("$sort", "-createdAt")])).unwrap();
        assert_eq!(sort.get("createdAt"), Some(&-1));
    }
}
