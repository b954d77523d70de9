use std::fmt;

/// Ordering operators usable in a [`Predicate::Comparison`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ComparisonOp {
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
}

impl ComparisonOp {
    /// Map an operator symbol as written in a flow document.
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "<" => Some(ComparisonOp::Less),
            "<=" => Some(ComparisonOp::LessOrEqual),
            ">" => Some(ComparisonOp::Greater),
            ">=" => Some(ComparisonOp::GreaterOrEqual),
            _ => None,
        }
    }
}

/// A boolean condition evaluated against session state.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Predicate {
    Equality {
        varname: String,
        expected_value: String,
    },
    SetMembership {
        varname: String,
        values: Vec<String>,
    },
    Comparison {
        varname: String,
        op: ComparisonOp,
        value: String,
    },
    /// Resolved through the registry at evaluation time.
    Named(String),
    /// Always true; the catch-all branch of a rule list.
    Otherwise,
    /// Logical AND of every member, left to right.
    Combined(Vec<Predicate>),
    Function {
        name: String,
        arguments: Vec<String>,
    },
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComparisonOp::Less => write!(f, "<"),
            ComparisonOp::LessOrEqual => write!(f, "<="),
            ComparisonOp::Greater => write!(f, ">"),
            ComparisonOp::GreaterOrEqual => write!(f, ">="),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Equality {
                varname,
                expected_value,
            } => write!(f, "{varname} is '{expected_value}'"),
            Predicate::SetMembership { varname, values } => {
                write!(f, "{varname} in ({})", values.join(", "))
            }
            Predicate::Comparison { varname, op, value } => write!(f, "{varname} {op} '{value}'"),
            Predicate::Named(name) => write!(f, "{name}"),
            Predicate::Otherwise => write!(f, "otherwise"),
            Predicate::Combined(preds) => {
                for (i, p) in preds.iter().enumerate() {
                    if i > 0 {
                        write!(f, " and ")?;
                    }
                    write!(f, "{p}")?;
                }
                Ok(())
            }
            Predicate::Function { name, arguments } => {
                write!(f, "{name}({})", arguments.join(", "))
            }
        }
    }
}

impl Predicate {
    #[must_use]
    pub fn and(self, other: Predicate) -> Predicate {
        match self {
            Predicate::Combined(mut preds) => {
                preds.push(other);
                Predicate::Combined(preds)
            }
            first => Predicate::Combined(vec![first, other]),
        }
    }
}
