use gateway_core::Value;

use crate::ast::{FilterAst, Op};
use crate::error::FilterError;

/// Render a flat `And`-of-`Leaf`s filter back to a canonical query string.
///
/// Adjacent `gte`/`lte` leaves on the same field collapse into a single
/// `field.between=lo,hi` token. Leaves are sorted by field then operator so
/// two ASTs built from differently-ordered query strings canonicalise to
/// the same string. `contains`/`starts`/`ends` sugar has already been
/// lowered to `Op::Regex` by the time it reaches the AST, so it
/// canonicalises as `field.regex=pattern` — round-tripping through
/// [`crate::parse_query`] reproduces an AST that matches the same
/// documents, not necessarily the original operator spelling.
///
/// Returns an error if `ast` contains `Or`/`Not`/`Nor` — those compose
/// leaves structurally and don't fit the flat query-string surface; use
/// the mongo-body JSON form for them instead.
pub fn canonicalize(ast: &FilterAst) -> Result<String, FilterError> {
    let leaves = flatten(ast)?;

    let mut used = vec![false; leaves.len()];
    let mut tokens: Vec<String> = Vec::new();

    for i in 0..leaves.len() {
        if used[i] || leaves[i].1 != Op::Gte {
            continue;
        }
        for j in (i + 1)..leaves.len() {
            if !used[j] && leaves[j].1 == Op::Lte && leaves[j].0 == leaves[i].0 {
                used[i] = true;
                used[j] = true;
                tokens.push(format!(
                    "{}.between={},{}",
                    leaves[i].0,
                    leaves[i].2.to_query_token(),
                    leaves[j].2.to_query_token()
                ));
                break;
            }
        }
    }

    for (idx, (field, op, value)) in leaves.iter().enumerate() {
        if used[idx] {
            continue;
        }
        tokens.push(format!("{field}.{}={}", op.as_str(), value.to_query_token()));
    }

    tokens.sort();
    Ok(tokens.join("&"))
}

fn flatten(ast: &FilterAst) -> Result<Vec<(String, Op, Value)>, FilterError> {
    match ast {
        FilterAst::Leaf { field, op, value } => Ok(vec![(field.clone(), *op, value.clone())]),
        FilterAst::And(items) => {
            let mut out = Vec::new();
            for item in items {
                out.extend(flatten(item)?);
            }
            Ok(out)
        }
        FilterAst::Or(_) | FilterAst::Not(_) | FilterAst::Nor(_) => {
            Err(FilterError::MalformedBody("cannot canonicalise Or/Not/Nor to a query string".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_query;

    #[test]
    fn sorts_fields_alphabetically() {
        let ast = FilterAst::And(vec![
            FilterAst::leaf("status", Op::Eq, Value::Str("active".into())),
            FilterAst::leaf("amount", Op::Gt, Value::Num(10.0)),
        ]);
        assert_eq!(canonicalize(&ast).unwrap(), "amount.gt=10&status.eq=active");
    }

    #[test]
    fn collapses_gte_lte_into_between() {
        let ast = FilterAst::And(vec![
            FilterAst::leaf("price", Op::Gte, Value::Num(10.0)),
            FilterAst::leaf("price", Op::Lte, Value::Num(20.0)),
        ]);
        assert_eq!(canonicalize(&ast).unwrap(), "price.between=10,20");
    }

    #[test]
    fn round_trips_semantically() {
        let parsed = parse_query("amount>10000&status=active").unwrap();
        let canonical = canonicalize(&parsed.filter).unwrap();
        let reparsed = parse_query(&canonical).unwrap();
        assert_eq!(parsed.filter, reparsed.filter);
    }

    #[test]
    fn rejects_or() {
        let ast = FilterAst::Or(vec![FilterAst::leaf("a", Op::Eq, Value::Num(1.0))]);
        assert!(canonicalize(&ast).is_err());
    }
}
