mod element;
mod error;
mod flow;
mod node;
mod predicate;
mod rule;
pub(crate) mod state;

pub use element::{Conditional, Element, Question};
pub use error::{CompileError, EngineError, TransformError};
pub use flow::Flow;
pub use node::{FrontMatter, Node};
pub use predicate::{ComparisonOp, Predicate};
pub use rule::RuleNode;
pub use state::{State, StateValue};
