use gateway_core::Value;

/// A leaf comparison operator. `Regex` carries both real regex matches and
/// the `contains`/`starts`/`ends` sugar, which the parser lowers to a
/// regex pattern before the AST is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Op {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    Nin,
    Regex,
    Exists,
}

impl Op {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::In => "in",
            Self::Nin => "nin",
            Self::Regex => "regex",
            Self::Exists => "exists",
        }
    }
}

/// A parsed filter expression.
///
/// `Leaf` is a single field comparison; `And`/`Or`/`Nor` fan out over a
/// list of sub-expressions; `Not` negates a single sub-expression. An empty
/// `And` matches everything, an empty `Or` matches nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterAst {
    Leaf { field: String, op: Op, value: Value },
    And(Vec<FilterAst>),
    Or(Vec<FilterAst>),
    Not(Box<FilterAst>),
    Nor(Vec<FilterAst>),
}

impl FilterAst {
    pub fn leaf(field: impl Into<String>, op: Op, value: Value) -> Self {
        Self::Leaf { field: field.into(), op, value }
    }

    /// The conjunction of `self` and `other`, flattening nested `And`s so
    /// repeated `.and()` calls don't build deep right-leaning chains.
    pub fn and(self, other: Self) -> Self {
        match (self, other) {
            (Self::And(mut a), Self::And(b)) => {
                a.extend(b);
                Self::And(a)
            }
            (Self::And(mut a), b) => {
                a.push(b);
                Self::And(a)
            }
            (a, Self::And(mut b)) => {
                b.insert(0, a);
                Self::And(b)
            }
            (a, b) => Self::And(vec![a, b]),
        }
    }

    /// `true` for the canonical empty match-everything filter.
    pub fn is_empty_and(&self) -> bool {
        matches!(self, Self::And(v) if v.is_empty())
    }
}
