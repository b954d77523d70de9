use criterion::{black_box, criterion_group, criterion_main, Criterion};
use flowdown::{compile, Engine, FlowInput, NodeSource, Registry};

/// Build a flow of `n` chained questions. Each question has `n` rules whose
/// only match is the final `otherwise`, so every step scans the full list.
fn build_input(n: usize) -> FlowInput {
    let mut input = FlowInput::new(NodeSource::new("cover", "# Start\n\n[start: q0]\n"));
    for i in 0..n {
        let mut text = format!("# Question {i}\n\n[choice: q{i}]\n* yes: Yes\n* no: No\n\n");
        for j in 0..n {
            text.push_str(&format!("* q{i} is 'never{j}' => done\n"));
        }
        let next = if i + 1 == n {
            "done".to_owned()
        } else {
            format!("q{}", i + 1)
        };
        text.push_str(&format!("* otherwise => {next}\n"));
        input = input.question(NodeSource::new(&format!("q{i}"), &text));
    }
    input.outcome(NodeSource::new("done", "# Done\n"))
}

fn bench_transition(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_transition");

    for &n in &[5, 20, 50] {
        let flow = compile(&build_input(n), &Registry::new()).unwrap();
        let engine = Engine::new(flow, Registry::new());
        let state = engine.transition(&engine.start_state(), "y").unwrap();
        group.bench_function(&format!("{n}_rules"), |b| {
            b.iter(|| engine.transition(black_box(&state), black_box("yes")));
        });
    }

    group.finish();
}

fn bench_process(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_session");

    for &n in &[5, 20] {
        let flow = compile(&build_input(n), &Registry::new()).unwrap();
        let engine = Engine::new(flow, Registry::new());
        let responses: Vec<String> = std::iter::once("y".to_owned())
            .chain((0..n).map(|_| "yes".to_owned()))
            .collect();
        group.bench_function(&format!("{n}_questions"), |b| {
            b.iter(|| engine.process(black_box(&responses)));
        });
    }

    group.finish();
}

fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile");

    for &n in &[5, 20] {
        let input = build_input(n);
        group.bench_function(&format!("{n}_questions"), |b| {
            b.iter(|| compile(black_box(&input), &Registry::new()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_transition, bench_process, bench_compile);
criterion_main!(benches);
