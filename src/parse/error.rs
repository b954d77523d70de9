use std::fmt;

/// A node document that does not match the flow grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    node: String,
    message: String,
}

impl ParseError {
    pub(crate) fn new(node: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            message: message.into(),
        }
    }

    /// Name of the node whose document failed to parse.
    #[must_use]
    pub fn node(&self) -> &str {
        &self.node
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "parse error in '{}': {}", self.node, self.message)
    }
}

impl std::error::Error for ParseError {}
