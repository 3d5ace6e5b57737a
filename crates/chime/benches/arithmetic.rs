use chime::{Engine, NoPrint};
use criterion::{Criterion, criterion_group, criterion_main};

const ARITHMETIC_LOOP: &str = "\
var s = 0;
for (var i = 0; i < 200; i = i + 1) {
    s = s + i * 3 - 1;
}
s;
";

fn arithmetic(c: &mut Criterion) {
    let engine = Engine::new();
    c.bench_function("arithmetic_loop", |b| {
        b.iter(|| {
            engine
                .eval_string_as(ARITHMETIC_LOOP, "bench.chi", &mut NoPrint)
                .unwrap()
        });
    });
}

criterion_group!(benches, arithmetic);
criterion_main!(benches);
