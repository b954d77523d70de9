//! Structural parse tree for a single node document.
//!
//! Everything here is still raw text: operators are kept as written and
//! question options are uninterpreted key/value pairs. The
//! [`transform`](crate::transform) stage turns this tree into typed elements.

/// The result of parsing one node document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedNode {
    pub front_matter: Vec<(String, String)>,
    pub body: Vec<Block>,
}

/// One body block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading(String),
    Paragraph(String),
    Question {
        kind: QuestionKind,
        identifier: String,
        /// `key: value` pairs following the identifier inside the tag.
        options: Vec<(String, String)>,
        /// `(value, label)` bullets; only populated for `choice` tags.
        choices: Vec<(String, String)>,
    },
    StartButton(String),
    NextSteps(String),
    Conditional {
        predicate: RawPredicate,
        true_case: Vec<Block>,
        false_case: Vec<Block>,
    },
    Rules(Vec<RawRule>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
    Choice,
    Text,
    Salary,
    Date,
    Country,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawPredicate {
    /// `var OP value` where `OP` is any operator symbol or `is`.
    Comparison {
        varname: String,
        operator: String,
        value: String,
    },
    SetMembership {
        varname: String,
        values: Vec<String>,
    },
    Named(String),
    Otherwise,
    Combined(Vec<RawPredicate>),
    Function {
        name: String,
        arguments: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawRule {
    Rule {
        predicate: RawPredicate,
        outcome: String,
    },
    Nested {
        predicate: RawPredicate,
        children: Vec<RawRule>,
    },
}
