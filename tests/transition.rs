
use flowdown::{Element, EngineError, Node, Predicate, Registry, RuleNode, State, Transition};
use fixtures::{visa_flow, visa_registry};

fn eea() -> Predicate {
    Predicate::Named("eea_passport?".into())
}

fn passport_registry() -> Registry {
    Registry::new().predicate("eea_passport?", |state| {
        state.get_text("passport").is_ok_and(|p| p == "greek")
    })
}

#[test]
fn named_rule_resolves_through_registry() {
    let node = Node::new(
        "what_passport_do_you_have?",
        vec![Element::NextNodeRules(vec![RuleNode::rule(
            eea(),
            "outcome_no_visa_needed",
        )])],
    );
    let registry = passport_registry();

    let state = State::new("what_passport_do_you_have?").put("passport", "greek");
    assert_eq!(
        Transition::new(&state, &node, "greek", &registry).next_node(),
        Ok("outcome_no_visa_needed")
    );

    let state = State::new("what_passport_do_you_have?").put("passport", "british");
    assert!(matches!(
        Transition::new(&state, &node, "british", &registry).next_node(),
        Err(EngineError::IndeterminateNextNode { .. })
    ));
}

#[test]
fn matched_nested_rule_does_not_backtrack() {
    let node = Node::new(
        "question",
        vec![Element::NextNodeRules(vec![
            RuleNode::nested(
                Predicate::Otherwise,
                vec![RuleNode::rule(eea(), "outcome_eea")],
            ),
            RuleNode::rule(Predicate::Otherwise, "outcome_fallback"),
        ])],
    );
    let registry = passport_registry();
    let state = State::new("question").put("passport", "british");
    assert!(matches!(
        Transition::new(&state, &node, "x", &registry).next_node(),
        Err(EngineError::IndeterminateNextNode { .. })
    ));
}

#[test]
fn bookkeeping_extends_path_and_responses() {
    let node = Node::new("b", vec![Element::StartButton("c".into())]);
    let state = State::new("b")
        .put("path", vec!["a"])
        .put("responses", vec!["yes"]);
    let registry = Registry::new();
    let next = Transition::new(&state, &node, "no", &registry)
        .next_state()
        .unwrap();
    assert_eq!(next.path().unwrap(), &["a".to_owned(), "b".to_owned()]);
    assert_eq!(next.responses().unwrap(), &["yes".to_owned(), "no".to_owned()]);
    assert_eq!(next.current_node(), Ok("c"));
}

#[test]
fn compiled_flow_step_by_step() {
    let flow = visa_flow();
    let registry = visa_registry();

    let start = State::new(&flow.name);
    let cover = flow.node("check-uk-visa").unwrap();
    let s1 = Transition::new(&start, cover, "y", &registry)
        .next_state()
        .unwrap();
    assert_eq!(s1.current_node(), Ok("what_passport_do_you_have"));

    let passport = flow.node("what_passport_do_you_have").unwrap();
    let s2 = Transition::new(&s1, passport, "us", &registry)
        .next_state()
        .unwrap();
    assert_eq!(s2.current_node(), Ok("purpose_of_visit"));
    assert_eq!(s2.get_text("what_passport_do_you_have"), Ok("us"));

    let purpose = flow.node("purpose_of_visit").unwrap();
    let s3 = Transition::new(&s2, purpose, "work", &registry)
        .next_state()
        .unwrap();
    assert_eq!(s3.current_node(), Ok("how_long_are_you_staying"));

    let stay = flow.node("how_long_are_you_staying").unwrap();
    let s4 = Transition::new(&s3, stay, "longer_than_six_months", &registry)
        .next_state()
        .unwrap();
    assert_eq!(s4.current_node(), Ok("outcome_work_visa"));
    assert_eq!(
        s4.path().unwrap(),
        &[
            "check-uk-visa".to_owned(),
            "what_passport_do_you_have".to_owned(),
            "purpose_of_visit".to_owned(),
            "how_long_are_you_staying".to_owned(),
        ]
    );
    assert_eq!(s4.responses().unwrap().len(), 4);
}

#[test]
fn nested_rule_in_compiled_flow_commits() {
    let flow = visa_flow();
    let registry = visa_registry();
    let stay = flow.node("how_long_are_you_staying").unwrap();
    // A long stay for tourism cannot reach this node through the flow, but
    // the nested rule still commits and never falls back to `otherwise`.
    let state = State::new("how_long_are_you_staying").put("purpose_of_visit", "tourism");
    assert!(matches!(
        Transition::new(&state, stay, "longer_than_six_months", &registry).next_node(),
        Err(EngineError::IndeterminateNextNode { .. })
    ));
    assert_eq!(
        Transition::new(&state, stay, "six_months_or_less", &registry).next_node(),
        Ok("outcome_visit_visa")
    );
}
