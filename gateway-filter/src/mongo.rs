use gateway_core::Value;

use crate::ast::{FilterAst, Op};
use crate::error::FilterError;

/// Build a `FilterAst` from a mongo-style filter body (the JSON surface
/// accepted by search/list endpoints alongside the query-string surface).
///
/// Supports `$and`/`$or`/`$not`/`$nor` composition, per-field operator
/// objects (`{"age": {"$gt": 18}}`), and plain `field: value` equality.
pub fn from_mongo_json(value: &Value) -> Result<FilterAst, FilterError> {
    let obj = value.as_obj().ok_or_else(|| FilterError::MalformedBody("filter body must be a JSON object".into()))?;

    let mut leaves = Vec::new();
    for (key, val) in obj {
        match key.as_str() {
            "$and" => leaves.push(FilterAst::And(parse_array(val)?)),
            "$or" => leaves.push(FilterAst::Or(parse_array(val)?)),
            "$nor" => leaves.push(FilterAst::Nor(parse_array(val)?)),
            "$not" => leaves.push(FilterAst::Not(Box::new(from_mongo_json(val)?))),
            field => leaves.push(parse_field_clause(field, val)?),
        }
    }
    Ok(FilterAst::And(leaves))
}

fn parse_array(value: &Value) -> Result<Vec<FilterAst>, FilterError> {
    let items = value.as_list().ok_or_else(|| FilterError::MalformedBody("expected an array of sub-filters".into()))?;
    items.iter().map(from_mongo_json).collect()
}

fn parse_field_clause(field: &str, value: &Value) -> Result<FilterAst, FilterError> {
    match value.as_obj() {
        Some(ops) if ops.keys().all(|k| k.starts_with('$')) && !ops.is_empty() => {
            let mut clauses = Vec::with_capacity(ops.len());
            for (op_token, operand) in ops {
                let op = op_from_mongo_token(field, op_token)?;
                clauses.push(FilterAst::leaf(field, op, operand.clone()));
            }
            Ok(if clauses.len() == 1 { clauses.remove(0) } else { FilterAst::And(clauses) })
        }
        _ => Ok(FilterAst::leaf(field, Op::Eq, value.clone())),
    }
}

fn op_from_mongo_token(field: &str, token: &str) -> Result<Op, FilterError> {
    Ok(match token {
        "$eq" => Op::Eq,
        "$ne" => Op::Ne,
        "$gt" => Op::Gt,
        "$gte" => Op::Gte,
        "$lt" => Op::Lt,
        "$lte" => Op::Lte,
        "$in" => Op::In,
        "$nin" => Op::Nin,
        "$regex" => Op::Regex,
        "$exists" => Op::Exists,
        other => return Err(FilterError::UnknownOperator { field: field.to_string(), op: other.to_string() }),
    })
}
