//! Guided-interview flows written as plain-text node documents.
//!
//! Each node document is parsed, transformed into typed [`Element`]s and
//! assembled into a [`Flow`]. A session's progress is an immutable [`State`];
//! [`Transition`] and [`Engine`] compute the next node and state from the
//! answer given on the current node.

pub mod compile;
mod error;
mod evaluate;
pub mod parse;
mod registry;
pub mod transform;
mod transition;
mod types;

pub use compile::{compile, FlowInput, NodeSource};
pub use error::FlowdownError;
pub use evaluate::evaluate;
pub use parse::ParseError;
pub use registry::Registry;
pub use transition::{Engine, Transition};
pub use types::{
    CompileError, ComparisonOp, Conditional, Element, EngineError, Flow, FrontMatter, Node,
    Predicate, Question, RuleNode, State, StateValue, TransformError,
};
