use thiserror::Error;

/// Errors raised while turning a parse tree into typed elements.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    #[error("unknown rule type: comparison operator '{operator}' in node '{node}'")]
    UnknownRuleType { node: String, operator: String },

    #[error("unknown country table '{table}' for question '{question}' in node '{node}'")]
    UnknownCountryTable {
        node: String,
        question: String,
        table: String,
    },

    #[error("question '{question}' in node '{node}' is missing required option '{option}'")]
    MissingOption {
        node: String,
        question: String,
        option: String,
    },
}

/// Errors raised while assembling nodes into a flow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("duplicate node name '{name}'")]
    DuplicateNode { name: String },

    #[error("unknown snippet '{snippet}' referenced in node '{node}'")]
    UnknownSnippet { node: String, snippet: String },
}

/// Errors raised while evaluating predicates or moving a session forward.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("undefined value '{key}'")]
    UndefinedValue { key: String },

    #[error("indeterminate next node for '{node}': {reason}")]
    IndeterminateNextNode { node: String, reason: String },

    #[error("unknown predicate '{name}'")]
    UnknownPredicate { name: String },

    #[error("value '{value}' of '{varname}' is not a calendar date")]
    InvalidDate { varname: String, value: String },

    #[error("value '{key}' is not a {expected}")]
    TypeMismatch { key: String, expected: &'static str },

    #[error("state requires a 'current_node' value")]
    MissingCurrentNode,

    #[error("node '{name}' is not part of the flow")]
    UnknownNode { name: String },
}
