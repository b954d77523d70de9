use super::predicate::Predicate;
use super::rule::RuleNode;

/// A typed content or behavior unit within a [`Node`](super::Node).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Element {
    MarkdownHeading(String),
    MarkdownParagraph(String),
    /// Unconditional transition target used when a node has no rules.
    StartButton(String),
    Question(Question),
    Conditional(Conditional),
    NextSteps(String),
    NextNodeRules(Vec<RuleNode>),
}

/// A question asked on a node. The `name` is the state variable the answer is
/// recorded under; `alias` is an optional second name for it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Question {
    MultipleChoice {
        name: String,
        /// `(value, label)` pairs in document order.
        choices: Vec<(String, String)>,
        alias: Option<String>,
    },
    Text {
        name: String,
        alias: Option<String>,
    },
    Salary {
        name: String,
        alias: Option<String>,
    },
    Date {
        name: String,
        from: Option<String>,
        to: Option<String>,
        alias: Option<String>,
    },
    Country {
        name: String,
        /// `(code, label)` pairs supplied by the registry's country table.
        countries: Vec<(String, String)>,
        alias: Option<String>,
    },
}

impl Question {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Question::MultipleChoice { name, .. }
            | Question::Text { name, .. }
            | Question::Salary { name, .. }
            | Question::Date { name, .. }
            | Question::Country { name, .. } => name,
        }
    }

    #[must_use]
    pub fn alias(&self) -> Option<&str> {
        match self {
            Question::MultipleChoice { alias, .. }
            | Question::Text { alias, .. }
            | Question::Salary { alias, .. }
            | Question::Date { alias, .. }
            | Question::Country { alias, .. } => alias.as_deref(),
        }
    }

    /// The tag keyword used for this question kind in a flow document.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Question::MultipleChoice { .. } => "choice",
            Question::Text { .. } => "text",
            Question::Salary { .. } => "salary",
            Question::Date { .. } => "date",
            Question::Country { .. } => "country",
        }
    }
}

/// Content shown depending on a predicate. `false_case` may be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Conditional {
    pub predicate: Predicate,
    pub true_case: Vec<Element>,
    pub false_case: Vec<Element>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_accessors() {
        let q = Question::Date {
            name: "arrival".into(),
            from: Some("2020-1-1".into()),
            to: None,
            alias: Some("arrived_on".into()),
        };
        assert_eq!(q.name(), "arrival");
        assert_eq!(q.alias(), Some("arrived_on"));
        assert_eq!(q.kind(), "date");

        let q = Question::Text {
            name: "hometown".into(),
            alias: None,
        };
        assert_eq!(q.alias(), None);
        assert_eq!(q.kind(), "text");
    }
}
