//! Control system inference benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fuzzy_engine::{Antecedent, ControlSystem, FuzzyRule, LinguisticVariable, MembershipFunction, Universe};

fn severity(name: &str, universe: Universe) -> LinguisticVariable {
    LinguisticVariable::new(name, universe)
        .with_term("low", MembershipFunction::trapezoidal(0.0, 0.0, 1.5, 3.0))
        .with_term("mid", MembershipFunction::trapezoidal(2.5, 4.0, 7.0, 7.5))
        .with_term("high", MembershipFunction::trapezoidal(7.0, 9.0, 10.0, 10.0))
}

fn build_system() -> ControlSystem {
    let universe = Universe::new(0.0, 10.0, 0.5).expect("valid universe");
    let names = ["a", "b", "c", "d", "e", "f"];
    let output = LinguisticVariable::new("out", universe)
        .with_term("low", MembershipFunction::triangular(0.0, 0.0, 3.0))
        .with_term("mid", MembershipFunction::triangular(2.0, 5.0, 8.0))
        .with_term("high", MembershipFunction::triangular(7.0, 10.0, 10.0));

    let mut builder = ControlSystem::builder().output(output);
    for name in names {
        builder = builder.input(severity(name, universe));
    }
    for term in ["low", "mid", "high"] {
        let antecedent = Antecedent::all(names.iter().map(|n| Antecedent::is(*n, term))).expect("non-empty");
        builder = builder.rule(FuzzyRule::new(antecedent, term));
    }
    builder.build().expect("valid system")
}

fn bench_compute(c: &mut Criterion) {
    let inputs = [("a", 6.5), ("b", 5.0), ("c", 7.25), ("d", 4.0), ("e", 5.5), ("f", 6.0)];

    c.bench_function("build_and_compute", |b| {
        b.iter(|| build_system().compute(black_box(&inputs)))
    });

    let system = build_system();
    c.bench_function("compute", |b| b.iter(|| system.compute(black_box(&inputs))));
}

criterion_group!(benches, bench_compute);
criterion_main!(benches);
