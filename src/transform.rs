//! Parse tree to typed node.
//!
//! Children are mapped before their parents, so every [`Element`] and
//! [`Predicate`] is built from already-typed parts.

use crate::parse::{Block, ParsedNode, QuestionKind, RawPredicate, RawRule};
use crate::registry::Registry;
use crate::{
    ComparisonOp, Conditional, Element, FrontMatter, Node, Predicate, Question, RuleNode,
    TransformError,
};

/// Turn the parse tree of one node document into a [`Node`].
///
/// # Errors
///
/// Returns [`TransformError::UnknownRuleType`] for comparison operators other
/// than `is`, `==`, `<`, `<=`, `>` and `>=`,
/// [`TransformError::MissingOption`] when a country question has no
/// `countries:` option, and [`TransformError::UnknownCountryTable`] when that
/// option names a table the registry does not know.
pub fn transform_node(
    name: &str,
    parsed: ParsedNode,
    registry: &Registry,
) -> Result<Node, TransformError> {
    let cx = Cx {
        node: name,
        registry,
    };
    let elements = cx.blocks(parsed.body)?;
    let front_matter: FrontMatter = parsed.front_matter.into_iter().collect();
    Ok(Node::new(name, elements).with_front_matter(front_matter))
}

struct Cx<'a> {
    node: &'a str,
    registry: &'a Registry,
}

impl Cx<'_> {
    fn blocks(&self, blocks: Vec<Block>) -> Result<Vec<Element>, TransformError> {
        blocks.into_iter().map(|b| self.block(b)).collect()
    }

    fn block(&self, block: Block) -> Result<Element, TransformError> {
        Ok(match block {
            Block::Heading(text) => Element::MarkdownHeading(text),
            Block::Paragraph(text) => Element::MarkdownParagraph(text),
            Block::StartButton(target) => Element::StartButton(target),
            Block::NextSteps(text) => Element::NextSteps(text),
            Block::Question {
                kind,
                identifier,
                options,
                choices,
            } => Element::Question(self.question(kind, identifier, &options, choices)?),
            Block::Conditional {
                predicate,
                true_case,
                false_case,
            } => {
                let true_case = self.blocks(true_case)?;
                let false_case = self.blocks(false_case)?;
                Element::Conditional(Conditional {
                    predicate: self.predicate(predicate)?,
                    true_case,
                    false_case,
                })
            }
            Block::Rules(rules) => Element::NextNodeRules(self.rules(rules)?),
        })
    }

    fn question(
        &self,
        kind: QuestionKind,
        name: String,
        options: &[(String, String)],
        choices: Vec<(String, String)>,
    ) -> Result<Question, TransformError> {
        let alias = option(options, "alias");
        Ok(match kind {
            QuestionKind::Choice => Question::MultipleChoice {
                name,
                choices,
                alias,
            },
            QuestionKind::Text => Question::Text { name, alias },
            QuestionKind::Salary => Question::Salary { name, alias },
            QuestionKind::Date => Question::Date {
                name,
                from: option(options, "from"),
                to: option(options, "to"),
                alias,
            },
            QuestionKind::Country => {
                let table =
                    option(options, "countries").ok_or_else(|| TransformError::MissingOption {
                        node: self.node.to_owned(),
                        question: name.clone(),
                        option: "countries".to_owned(),
                    })?;
                let countries = self.registry.countries(&table).ok_or_else(|| {
                    TransformError::UnknownCountryTable {
                        node: self.node.to_owned(),
                        question: name.clone(),
                        table,
                    }
                })?;
                Question::Country {
                    name,
                    countries,
                    alias,
                }
            }
        })
    }

    fn rules(&self, rules: Vec<RawRule>) -> Result<Vec<RuleNode>, TransformError> {
        rules.into_iter().map(|r| self.rule(r)).collect()
    }

    fn rule(&self, rule: RawRule) -> Result<RuleNode, TransformError> {
        match rule {
            RawRule::Rule { predicate, outcome } => Ok(RuleNode::Rule {
                predicate: self.predicate(predicate)?,
                outcome,
            }),
            RawRule::Nested {
                predicate,
                children,
            } => {
                let children = self.rules(children)?;
                Ok(RuleNode::NestedRule {
                    predicate: self.predicate(predicate)?,
                    children,
                })
            }
        }
    }

    fn predicate(&self, raw: RawPredicate) -> Result<Predicate, TransformError> {
        Ok(match raw {
            RawPredicate::Comparison {
                varname,
                operator,
                value,
            } => match operator.as_str() {
                "is" | "==" => Predicate::Equality {
                    varname,
                    expected_value: value,
                },
                symbol => {
                    let op = ComparisonOp::from_symbol(symbol).ok_or_else(|| {
                        TransformError::UnknownRuleType {
                            node: self.node.to_owned(),
                            operator: symbol.to_owned(),
                        }
                    })?;
                    Predicate::Comparison { varname, op, value }
                }
            },
            RawPredicate::SetMembership { varname, values } => {
                Predicate::SetMembership { varname, values }
            }
            RawPredicate::Named(name) => Predicate::Named(name),
            RawPredicate::Otherwise => Predicate::Otherwise,
            RawPredicate::Combined(members) => Predicate::Combined(
                members
                    .into_iter()
                    .map(|m| self.predicate(m))
                    .collect::<Result<_, _>>()?,
            ),
            RawPredicate::Function { name, arguments } => Predicate::Function { name, arguments },
        })
    }
}

/// Last declaration wins, matching front matter lookup.
fn option(options: &[(String, String)], key: &str) -> Option<String> {
    options
        .iter()
        .rev()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.clone())
}
