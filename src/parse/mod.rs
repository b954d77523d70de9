mod error;
mod grammar;
mod tree;

pub use error::ParseError;
pub use tree::{Block, ParsedNode, QuestionKind, RawPredicate, RawRule};

/// Parse one node document into its raw [`ParsedNode`] tree.
///
/// `name` only labels the error; it does not affect parsing.
///
/// # Errors
///
/// Returns [`ParseError`] if the text is not a valid node document.
pub fn parse_node(name: &str, input: &str) -> Result<ParsedNode, ParseError> {
    use winnow::Parser;
    grammar::node_document
        .parse(input)
        .map_err(|e| ParseError::new(name, e.to_string()))
}
