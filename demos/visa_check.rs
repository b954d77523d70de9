use flowdown::{Element, Engine, Flow, Registry};

fn registry() -> Registry {
    Registry::new()
        .predicate("eea_passport?", |state| {
            state
                .get_text("what_passport_do_you_have")
                .is_ok_and(|p| matches!(p, "fr" | "gr" | "de"))
        })
        .country_table("visa_countries", || {
            [("cn", "China"), ("fr", "France"), ("gr", "Greece"), ("us", "United States")]
                .into_iter()
                .map(|(code, name)| (code.to_owned(), name.to_owned()))
                .collect()
        })
}

fn main() {
    let registry = registry();
    let flow = Flow::from_directory("demos/check-uk-visa", &registry)
        .expect("failed to load flow");
    println!("{flow}");

    // Answers may be given on the command line, e.g. `y us study longer_than_six_months`.
    let args: Vec<String> = std::env::args().skip(1).collect();
    let responses = if args.is_empty() {
        vec!["y".to_owned(), "us".to_owned(), "tourism".to_owned()]
    } else {
        args
    };

    let engine = Engine::new(flow, registry);
    let state = match engine.process(&responses) {
        Ok(state) => state,
        Err(err) => {
            eprintln!("session failed: {err}");
            std::process::exit(1);
        }
    };
    println!("{state}");

    let current = state.current_node().expect("current node is text");
    let node = engine.flow().node(current).expect("current node is in the flow");
    for element in &node.elements {
        match element {
            Element::MarkdownHeading(text) => println!("\n# {text}"),
            Element::MarkdownParagraph(text) | Element::NextSteps(text) => println!("\n{text}"),
            Element::Question(q) => println!("\n[{}: {}]", q.kind(), q.name()),
            _ => {}
        }
    }
}
