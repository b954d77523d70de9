use thiserror::Error;

use crate::parse::ParseError;
use crate::{CompileError, EngineError, TransformError};

/// Unified error type covering every stage from reading documents to
/// running a session.
///
/// Returned by convenience entry points like [`compile`](crate::compile()) and
/// [`Flow::from_directory()`](crate::Flow::from_directory).
#[derive(Debug, Error)]
pub enum FlowdownError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
