use std::sync::Arc;
use std::thread;

use flowdown::{compile, Engine, FlowInput, NodeSource, Registry};

fn main() {
    let input = FlowInput::new(NodeSource::new("cover", "# Age check\n\n[start: age]\n"))
        .question(NodeSource::new(
            "age",
            "[text: age]\n\n* age >= 18 => outcome_adult\n* otherwise => outcome_minor\n",
        ))
        .outcome(NodeSource::new("outcome_adult", "You may continue.\n"))
        .outcome(NodeSource::new("outcome_minor", "Ask a parent or guardian.\n"));

    let registry = Registry::new();
    let flow = compile(&input, &registry).expect("failed to compile flow");
    let engine = Arc::new(Engine::new(flow, registry));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                let age = (16 + i).to_string();
                let state = engine.process(["y", age.as_str()]);
                (age, state)
            })
        })
        .collect();

    for handle in handles {
        let (age, state) = handle.join().expect("thread panicked");
        match state.and_then(|s| s.current_node().map(str::to_owned)) {
            Ok(node) => println!("age {age}: {node}"),
            Err(err) => println!("age {age}: {err}"),
        }
    }
}
