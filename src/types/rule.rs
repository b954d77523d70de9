use super::predicate::Predicate;

/// One entry of a next-node rule tree.
///
/// A [`RuleNode::Rule`] maps a predicate to the name of the node the session
/// moves to. A [`RuleNode::NestedRule`] guards a list of further rules; once
/// its predicate holds, only its children are considered.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RuleNode {
    Rule {
        predicate: Predicate,
        outcome: String,
    },
    NestedRule {
        predicate: Predicate,
        children: Vec<RuleNode>,
    },
}

impl RuleNode {
    #[must_use]
    pub fn rule(predicate: Predicate, outcome: &str) -> Self {
        RuleNode::Rule {
            predicate,
            outcome: outcome.to_owned(),
        }
    }

    #[must_use]
    pub fn nested(predicate: Predicate, children: Vec<RuleNode>) -> Self {
        RuleNode::NestedRule {
            predicate,
            children,
        }
    }

    #[must_use]
    pub fn predicate(&self) -> &Predicate {
        match self {
            RuleNode::Rule { predicate, .. } | RuleNode::NestedRule { predicate, .. } => predicate,
        }
    }

    /// Every outcome reachable from this rule, in document order.
    #[must_use]
    pub fn outcomes(&self) -> Vec<&str> {
        let mut out = Vec::new();
        collect_outcomes(self, &mut out);
        out
    }
}

fn collect_outcomes<'a>(rule: &'a RuleNode, out: &mut Vec<&'a str>) {
    match rule {
        RuleNode::Rule { outcome, .. } => out.push(outcome),
        RuleNode::NestedRule { children, .. } => {
            for child in children {
                collect_outcomes(child, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcomes_in_document_order() {
        let tree = RuleNode::nested(
            Predicate::Named("a?".into()),
            vec![
                RuleNode::rule(Predicate::Named("b?".into()), "first"),
                RuleNode::nested(
                    Predicate::Otherwise,
                    vec![RuleNode::rule(Predicate::Otherwise, "second")],
                ),
            ],
        );
        assert_eq!(tree.outcomes(), vec!["first", "second"]);
        assert_eq!(tree.predicate(), &Predicate::Named("a?".into()));
    }
}
