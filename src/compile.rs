use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io;
use std::path::Path;

use tracing::debug;
use winnow::ascii::space0;
use winnow::combinator::{delimited, eof};
use winnow::error::ModalResult;
use winnow::prelude::*;
use winnow::token::take_while;

use crate::parse::parse_node;
use crate::registry::Registry;
use crate::transform::transform_node;
use crate::{CompileError, Flow, FlowdownError, Node};

/// The text of one node document and the name it is known by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSource {
    pub name: String,
    pub text: String,
}

impl NodeSource {
    #[must_use]
    pub fn new(name: &str, text: &str) -> Self {
        Self {
            name: name.to_owned(),
            text: text.to_owned(),
        }
    }
}

/// The uncompiled documents of a flow.
///
/// The coversheet names the flow and is its entry node; questions and
/// outcomes follow in the order given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowInput {
    pub coversheet: NodeSource,
    pub questions: Vec<NodeSource>,
    pub outcomes: Vec<NodeSource>,
    snippets: BTreeMap<String, String>,
}

impl FlowInput {
    #[must_use]
    pub fn new(coversheet: NodeSource) -> Self {
        Self {
            coversheet,
            questions: Vec::new(),
            outcomes: Vec::new(),
            snippets: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn question(mut self, source: NodeSource) -> Self {
        self.questions.push(source);
        self
    }

    #[must_use]
    pub fn outcome(mut self, source: NodeSource) -> Self {
        self.outcomes.push(source);
        self
    }

    /// Make `{{snippet: name}}` lines expand to `text`.
    #[must_use]
    pub fn with_snippet(mut self, name: &str, text: &str) -> Self {
        self.snippets.insert(name.to_owned(), text.to_owned());
        self
    }

    /// Every node source in flow order.
    pub fn sources(&self) -> impl Iterator<Item = &NodeSource> {
        std::iter::once(&self.coversheet)
            .chain(&self.questions)
            .chain(&self.outcomes)
    }

    /// Read a flow laid out on disk:
    ///
    /// ```text
    /// check-uk-visa/
    ///   check-uk-visa.txt        coversheet, named after the directory
    ///   questions/*.txt
    ///   outcomes/*.txt
    ///   snippets/*.txt           optional
    /// ```
    ///
    /// Node and snippet names are file stems. Files are read in file name
    /// order; missing `questions`, `outcomes` or `snippets` directories are
    /// treated as empty.
    ///
    /// # Errors
    ///
    /// Returns [`io::Error`] if the coversheet or any listed file cannot be read.
    pub fn from_directory(dir: impl AsRef<Path>) -> io::Result<Self> {
        let dir = dir.as_ref();
        let flow_name = dir
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("flow directory '{}' has no usable name", dir.display()),
                )
            })?;

        let coversheet_path = dir.join(format!("{flow_name}.txt"));
        let mut input = Self::new(NodeSource {
            name: flow_name.to_owned(),
            text: fs::read_to_string(&coversheet_path)?,
        });
        input.questions = read_sources(&dir.join("questions"))?;
        input.outcomes = read_sources(&dir.join("outcomes"))?;
        for snippet in read_sources(&dir.join("snippets"))? {
            input.snippets.insert(snippet.name, snippet.text);
        }
        Ok(input)
    }
}

fn read_sources(dir: &Path) -> io::Result<Vec<NodeSource>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "txt") {
            paths.push(path);
        }
    }
    paths.sort();

    paths
        .into_iter()
        .filter_map(|path| {
            let name = path.file_stem()?.to_str()?.to_owned();
            Some((name, path))
        })
        .map(|(name, path)| {
            Ok(NodeSource {
                name,
                text: fs::read_to_string(path)?,
            })
        })
        .collect()
}

/// Parse and transform every document of a flow.
///
/// Compilation stops at the first node that fails; the error names it.
///
/// # Errors
///
/// Returns [`FlowdownError::Compile`] for duplicate node names or unknown
/// snippets, [`FlowdownError::Parse`] for grammar failures, and
/// [`FlowdownError::Transform`] for documents that parse but cannot be typed.
pub fn compile(input: &FlowInput, registry: &Registry) -> Result<Flow, FlowdownError> {
    check_duplicates(input)?;

    let nodes = input
        .sources()
        .map(|source| compile_node(source, &input.snippets, registry))
        .collect::<Result<Vec<Node>, FlowdownError>>()?;

    debug!(
        flow = %input.coversheet.name,
        nodes = nodes.len(),
        "compiled flow"
    );
    Ok(Flow::new(&input.coversheet.name, nodes))
}

fn check_duplicates(input: &FlowInput) -> Result<(), CompileError> {
    let mut seen = HashSet::new();
    for source in input.sources() {
        if !seen.insert(source.name.as_str()) {
            return Err(CompileError::DuplicateNode {
                name: source.name.clone(),
            });
        }
    }
    Ok(())
}

fn compile_node(
    source: &NodeSource,
    snippets: &BTreeMap<String, String>,
    registry: &Registry,
) -> Result<Node, FlowdownError> {
    let text = expand_snippets(source, snippets)?;
    let parsed = parse_node(&source.name, &text)?;
    let node = transform_node(&source.name, parsed, registry)?;
    debug!(node = %node.name, elements = node.elements.len(), "compiled node");
    Ok(node)
}

fn expand_snippets(
    source: &NodeSource,
    snippets: &BTreeMap<String, String>,
) -> Result<String, CompileError> {
    let mut out = String::with_capacity(source.text.len());
    for line in source.text.split_inclusive('\n') {
        let Ok(name) = snippet_tag.parse(line.trim_end()) else {
            out.push_str(line);
            continue;
        };
        let text = snippets
            .get(name)
            .ok_or_else(|| CompileError::UnknownSnippet {
                node: source.name.clone(),
                snippet: name.to_owned(),
            })?;
        out.push_str(text.trim_end());
        out.push('\n');
    }
    Ok(out)
}

/// `{{snippet: name}}` on a line of its own.
fn snippet_tag<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    delimited(
        (space0, "{{", space0, "snippet:", space0),
        take_while(1.., |c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-'),
        (space0, "}}", space0, eof),
    )
    .parse_next(input)
}
