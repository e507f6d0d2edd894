use indexmap::IndexMap;

use crate::error::FilterError;

/// Parse a `sort=field,-other` parameter into an ordered map of field to
/// direction (`1` ascending, `-1` descending). Order is significant — it's
/// the tie-break precedence — so fields are kept in the order they appear,
/// not sorted alphabetically like filter canonicalisation.
pub fn parse_sort(raw: &str) -> Result<IndexMap<String, i8>, FilterError> {
    let mut out = IndexMap::new();
    for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let (field, direction) = match token.strip_prefix('-') {
            Some(field) => (field, -1),
            None => (token.strip_prefix('+').unwrap_or(token), 1),
        };
        if field.is_empty() {
            return Err(FilterError::InvalidField(token.to_string()));
        }
        out.insert(field.to_string(), direction);
    }
    Ok(out)
}

/// Render a sort map back to its canonical `field,-other` form.
pub fn canonicalize_sort(sort: &IndexMap<String, i8>) -> String {
    sort.iter()
        .map(|(field, dir)| if *dir < 0 { format!("-{field}") } else { field.clone() })
        .collect::<Vec<_>>()
        .join(",")
}
