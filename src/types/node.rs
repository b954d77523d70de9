use std::fmt;

use super::element::{Element, Question};
use super::rule::RuleNode;

/// Document metadata declared at the top of a node, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrontMatter {
    entries: Vec<(String, String)>,
}

impl FrontMatter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a value. When a key is declared twice the last one wins.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FrontMatter {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// One step of a flow: its elements plus optional front matter.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    pub name: String,
    pub elements: Vec<Element>,
    pub front_matter: FrontMatter,
}

impl Node {
    #[must_use]
    pub fn new(name: &str, elements: Vec<Element>) -> Self {
        Self {
            name: name.to_owned(),
            elements,
            front_matter: FrontMatter::new(),
        }
    }

    #[must_use]
    pub fn with_front_matter(mut self, front_matter: FrontMatter) -> Self {
        self.front_matter = front_matter;
        self
    }

    /// The rule tree of the first top-level `NextNodeRules` element.
    #[must_use]
    pub fn next_node_rules(&self) -> Option<&[RuleNode]> {
        self.elements.iter().find_map(|e| match e {
            Element::NextNodeRules(rules) => Some(rules.as_slice()),
            _ => None,
        })
    }

    /// Target of the first top-level start button.
    #[must_use]
    pub fn start_button(&self) -> Option<&str> {
        self.elements.iter().find_map(|e| match e {
            Element::StartButton(target) => Some(target.as_str()),
            _ => None,
        })
    }

    /// Top-level questions in document order.
    pub fn questions(&self) -> impl Iterator<Item = &Question> {
        self.elements.iter().filter_map(|e| match e {
            Element::Question(q) => Some(q),
            _ => None,
        })
    }

    /// The first multiple-choice question on this node.
    #[must_use]
    pub fn multiple_choice(&self) -> Option<&Question> {
        self.questions()
            .find(|q| matches!(q, Question::MultipleChoice { .. }))
    }

    /// A node with neither rules nor a start button ends the flow.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.next_node_rules().is_none() && self.start_button().is_none()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({}, {} elements)", self.name, self.elements.len())
    }
}
