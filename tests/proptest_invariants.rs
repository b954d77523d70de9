
use flowdown::{
    evaluate, Element, EngineError, Node, Predicate, Registry, RuleNode, State, StateValue,
    Transition,
};
use proptest::prelude::*;
use strategies::{arb_key, arb_predicate, arb_rules, arb_state, arb_text};

fn next_node(rules: Vec<RuleNode>, state: &State, input: &str) -> Result<String, EngineError> {
    let node = Node::new("question", vec![Element::NextNodeRules(rules)]);
    let registry = Registry::new();
    Transition::new(state, &node, input, &registry)
        .next_node()
        .map(str::to_owned)
}

// ---------------------------------------------------------------------------
// Invariant 1: State is a persistent value
//
// The last `put` wins, and a `put` never changes the state it was called on.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn last_put_wins(state in arb_state(), key in arb_key(), v1 in arb_text(), v2 in arb_text()) {
        let updated = state.put(&key, v1.as_str()).put(&key, v2.as_str());
        prop_assert_eq!(updated.get(&key), Ok(&StateValue::Text(v2)));
    }

    #[test]
    fn put_leaves_receiver_untouched(state in arb_state(), key in arb_key(), value in arb_text()) {
        let before = state.clone();
        let _updated = state.put(&key, value);
        prop_assert_eq!(&state, &before);
        prop_assert_eq!(state.get(&key).ok(), before.get(&key).ok());
    }

    #[test]
    fn keys_are_case_and_marker_indifferent(
        state in arb_state(),
        key in arb_key(),
        value in arb_text()
    ) {
        let updated = state.put(&key, value.as_str());
        let marked = format!(":{}", key.to_ascii_uppercase());
        prop_assert_eq!(updated.get(&marked), updated.get(&key));
        prop_assert!(updated.contains(&marked));
    }
}

// ---------------------------------------------------------------------------
// Invariant 2: Structural equality
//
// Equal contents compare equal; an extra key always breaks equality, even
// when every shared key matches.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn equality_is_structural(state in arb_state(), key in arb_key(), value in arb_text()) {
        let a = state.put(&key, value.as_str());
        let b = state.put(&key, value.as_str());
        prop_assert_eq!(&a, &b);
        prop_assert_eq!(&b, &a);
        if !state.contains(&key) {
            prop_assert_ne!(&a, &state);
            prop_assert_ne!(&state, &a);
        }
    }
}

// ---------------------------------------------------------------------------
// Invariant 3: Predicate evaluation
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn evaluation_is_deterministic(p in arb_predicate(), state in arb_state()) {
        let registry = Registry::new();
        let first = evaluate(&p, &state, &registry);
        prop_assert!(first.is_ok());
        for _ in 0..3 {
            prop_assert_eq!(&evaluate(&p, &state, &registry), &first);
        }
    }

    #[test]
    fn combined_is_conjunction(
        ps in prop::collection::vec(arb_predicate(), 1..5),
        state in arb_state()
    ) {
        let registry = Registry::new();
        let expected = ps
            .iter()
            .all(|p| evaluate(p, &state, &registry).unwrap_or(false));
        prop_assert_eq!(evaluate(&Predicate::Combined(ps), &state, &registry), Ok(expected));
    }

    #[test]
    fn equality_matches_stored_text(state in arb_state(), expected in arb_text()) {
        let p = Predicate::Equality { varname: "colour".into(), expected_value: expected.clone() };
        let stored = state.get_text("colour").unwrap().to_owned();
        prop_assert_eq!(evaluate(&p, &state, &Registry::new()), Ok(stored == expected));
    }
}

// ---------------------------------------------------------------------------
// Invariant 4: Rule resolution
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn resolved_outcome_is_declared(rules in arb_rules(), state in arb_state()) {
        let declared: Vec<String> = rules
            .iter()
            .flat_map(RuleNode::outcomes)
            .map(str::to_owned)
            .collect();
        if let Ok(outcome) = next_node(rules, &state, "x") {
            prop_assert!(declared.contains(&outcome));
        }
    }

    #[test]
    fn leading_otherwise_always_wins(rules in arb_rules(), state in arb_state()) {
        let mut with_default = vec![RuleNode::rule(Predicate::Otherwise, "first")];
        with_default.extend(rules);
        prop_assert_eq!(next_node(with_default, &state, "x"), Ok("first".to_owned()));
    }

    #[test]
    fn trailing_otherwise_never_overrides(rules in arb_rules(), state in arb_state()) {
        let plain = next_node(rules.clone(), &state, "x");
        let mut with_default = rules;
        with_default.push(RuleNode::rule(Predicate::Otherwise, "fallback"));
        let defaulted = next_node(with_default, &state, "x");
        match plain {
            Ok(outcome) => prop_assert_eq!(defaulted, Ok(outcome)),
            // A committed nested rule with no matching child is never rescued
            // by a later sibling.
            Err(EngineError::IndeterminateNextNode { ref reason, .. })
                if reason.starts_with("no rule nested") =>
            {
                prop_assert!(defaulted.is_err());
            }
            Err(_) => prop_assert_eq!(defaulted, Ok("fallback".to_owned())),
        }
    }

    #[test]
    fn transition_extends_history(state in arb_state(), input in arb_text()) {
        let node = Node::new("question", vec![Element::StartButton("next".into())]);
        let registry = Registry::new();
        let next = Transition::new(&state, &node, &input, &registry).next_state().unwrap();
        prop_assert_eq!(next.path().unwrap().len(), state.path().unwrap().len() + 1);
        prop_assert_eq!(next.responses().unwrap().last(), Some(&input));
        prop_assert_eq!(next.current_node(), Ok("next"));
        prop_assert_eq!(next.get_text("question"), Ok(input.as_str()));
    }
}
