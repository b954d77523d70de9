use tracing::{debug, trace};

use crate::evaluate::evaluate;
use crate::registry::Registry;
use crate::types::state::{CURRENT_NODE, PATH, RESPONSES};
use crate::{EngineError, Flow, Node, RuleNode, State};

/// One step of a session: the answer `input` given on `node` while in `state`.
///
/// Nothing is computed until [`next_node`](Self::next_node) or
/// [`next_state`](Self::next_state) is called, and neither mutates `state`.
#[derive(Debug, Clone)]
pub struct Transition<'a> {
    state: &'a State,
    node: &'a Node,
    input: &'a str,
    registry: &'a Registry,
}

impl<'a> Transition<'a> {
    #[must_use]
    pub fn new(state: &'a State, node: &'a Node, input: &'a str, registry: &'a Registry) -> Self {
        Self {
            state,
            node,
            input,
            registry,
        }
    }

    /// Name of the node the session moves to.
    ///
    /// The input is first recorded under the node's name, so rules can
    /// refer to the answer just given. Next-node rules are searched depth
    /// first in document order and the first matching rule wins. Once a
    /// nested rule's predicate holds, only its children are searched; later
    /// rules are never consulted, even if no child matches. A node without
    /// rules falls back to its start button.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::IndeterminateNextNode`] when no target can be
    /// determined, or any error raised while evaluating a predicate.
    pub fn next_node(&self) -> Result<&'a str, EngineError> {
        let state = self.state_with_input();
        self.next_node_in(&state)
    }

    /// The state after accepting the input.
    ///
    /// Extends `path` with this node, `accepted_responses` with the input,
    /// records the input under the question's variable name and moves
    /// `current_node` to [`next_node`](Self::next_node).
    ///
    /// # Errors
    ///
    /// Fails whenever [`next_node`](Self::next_node) fails, or when the
    /// state's `path` or `accepted_responses` do not hold lists.
    pub fn next_state(&self) -> Result<State, EngineError> {
        let with_input = self.state_with_input();
        let next = self.next_node_in(&with_input)?;

        let mut path = self.state.path()?.to_vec();
        path.push(self.node.name.clone());
        let mut responses = self.state.responses()?.to_vec();
        responses.push(self.input.to_owned());

        debug!(from = %self.node.name, to = next, input = self.input, "transition");
        Ok(with_input
            .put(PATH, path)
            .put(RESPONSES, responses)
            .put(self.variable_name(), self.input)
            .put(CURRENT_NODE, next))
    }

    /// The state variable the answer is stored under: the multiple-choice
    /// question's name if the node has one, otherwise the node name.
    fn variable_name(&self) -> &'a str {
        self.node
            .multiple_choice()
            .map_or(self.node.name.as_str(), |q| q.name())
    }

    fn state_with_input(&self) -> State {
        self.state.put(&self.node.name, self.input)
    }

    fn next_node_in(&self, state: &State) -> Result<&'a str, EngineError> {
        if let Some(rules) = self.node.next_node_rules() {
            return self.first_match(rules, state)?.ok_or_else(|| {
                EngineError::IndeterminateNextNode {
                    node: self.node.name.clone(),
                    reason: "no next node rule matched".to_owned(),
                }
            });
        }
        self.node
            .start_button()
            .ok_or_else(|| EngineError::IndeterminateNextNode {
                node: self.node.name.clone(),
                reason: "node has no next node rules or start button".to_owned(),
            })
    }

    /// `Ok(None)` means no rule in `rules` matched and the caller may keep
    /// looking. A nested rule that matches but has no matching child is an
    /// error, which stops the whole search.
    fn first_match(
        &self,
        rules: &'a [RuleNode],
        state: &State,
    ) -> Result<Option<&'a str>, EngineError> {
        for rule in rules {
            match rule {
                RuleNode::Rule { predicate, outcome } => {
                    if evaluate(predicate, state, self.registry)? {
                        trace!(
                            node = %self.node.name,
                            %predicate,
                            outcome = %outcome,
                            "rule matched"
                        );
                        return Ok(Some(outcome.as_str()));
                    }
                }
                RuleNode::NestedRule {
                    predicate,
                    children,
                } => {
                    if evaluate(predicate, state, self.registry)? {
                        trace!(node = %self.node.name, %predicate, "nested rule matched");
                        return match self.first_match(children, state)? {
                            Some(outcome) => Ok(Some(outcome)),
                            None => Err(EngineError::IndeterminateNextNode {
                                node: self.node.name.clone(),
                                reason: format!("no rule nested under '{predicate}' matched"),
                            }),
                        };
                    }
                }
            }
        }
        Ok(None)
    }
}

/// A compiled flow bound to the registry its predicates resolve against.
///
/// Holds no session data; every call takes the caller's [`State`] and
/// returns a new one, so one engine can serve many sessions concurrently.
#[derive(Debug, Clone)]
pub struct Engine {
    flow: Flow,
    registry: Registry,
}

impl Engine {
    #[must_use]
    pub fn new(flow: Flow, registry: Registry) -> Self {
        Self { flow, registry }
    }

    #[must_use]
    pub fn flow(&self) -> &Flow {
        &self.flow
    }

    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// A fresh session positioned on the coversheet.
    #[must_use]
    pub fn start_state(&self) -> State {
        State::new(&self.flow.name)
    }

    /// Apply one answer to the node the session is on.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownNode`] if `current_node` is not part of
    /// the flow, or whatever [`Transition::next_state`] returns.
    pub fn transition(&self, state: &State, input: &str) -> Result<State, EngineError> {
        let name = state.current_node()?;
        let node = self
            .flow
            .node(name)
            .ok_or_else(|| EngineError::UnknownNode {
                name: name.to_owned(),
            })?;
        Transition::new(state, node, input, &self.registry).next_state()
    }

    /// Replay `responses` from the start state.
    ///
    /// Stops early, ignoring any remaining responses, once the session
    /// reaches a node without next node rules or a start button.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by [`transition`](Self::transition).
    pub fn process<I, S>(&self, responses: I) -> Result<State, EngineError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut state = self.start_state();
        for response in responses {
            let name = state.current_node()?;
            let terminal = self
                .flow
                .node(name)
                .ok_or_else(|| EngineError::UnknownNode {
                    name: name.to_owned(),
                })?
                .is_terminal();
            if terminal {
                break;
            }
            state = self.transition(&state, response.as_ref())?;
        }
        Ok(state)
    }
}
