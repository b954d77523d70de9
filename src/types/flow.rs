use std::fmt;

use crate::compile::FlowInput;
use crate::registry::Registry;

use super::node::Node;

/// A compiled, immutable flow: the coversheet node followed by question and
/// outcome nodes. Thread-safe and designed to live behind `Arc`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Flow {
    pub name: String,
    pub nodes: Vec<Node>,
}

impl Flow {
    /// Assemble a flow from already-built nodes.
    ///
    /// No uniqueness check happens here; use [`compile`](crate::compile()) for
    /// validated construction from text.
    #[must_use]
    pub fn new(name: &str, nodes: Vec<Node>) -> Self {
        Self {
            name: name.to_owned(),
            nodes,
        }
    }

    /// Look up a node by name.
    #[must_use]
    pub fn node(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// The entry node.
    #[must_use]
    pub fn coversheet(&self) -> Option<&Node> {
        self.nodes.first()
    }

    /// Node names in flow order.
    #[must_use]
    pub fn node_names(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.name.as_str()).collect()
    }

    /// Compile a flow from in-memory sources.
    ///
    /// # Errors
    ///
    /// Returns [`FlowdownError`](crate::FlowdownError) on parse, transform or
    /// compile failure.
    pub fn from_input(
        input: &FlowInput,
        registry: &Registry,
    ) -> Result<Self, crate::FlowdownError> {
        crate::compile::compile(input, registry)
    }

    /// Read a flow directory and compile it.
    ///
    /// See [`FlowInput::from_directory`] for the expected layout.
    ///
    /// # Errors
    ///
    /// Returns [`FlowdownError`](crate::FlowdownError) on I/O, parse,
    /// transform or compile failure.
    pub fn from_directory(
        dir: impl AsRef<std::path::Path>,
        registry: &Registry,
    ) -> Result<Self, crate::FlowdownError> {
        let input = FlowInput::from_directory(dir)?;
        Self::from_input(&input, registry)
    }
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Flow({}, {} nodes)", self.name, self.nodes.len())
    }
}
