use criterion::{Criterion, black_box, criterion_group, criterion_main};

use hymatch::prelude::*;
use hymatch::structural::{get_field, with_field};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

#[derive(Debug, Clone, PartialEq, Composite)]
struct Point {
    x: i32,
    y: i32,
}

#[derive(Debug, Clone, PartialEq, Composite)]
struct Rect {
    p1: Point,
    p2: Point,
}

#[derive(Debug, Clone, PartialEq, Composite)]
struct Carrier {
    #[hymatch(rename = "__index__")]
    index: i32,
    p1: Option<Point>,
    x: i32,
    y: i32,
}

fn carrier() -> Value {
    Value::from(Carrier {
        index: -1,
        p1: None,
        x: 0,
        y: 0,
    })
}

/// `case Rect(Point(var x, var y), _)`, then a few string guards, then default.
fn build_pattern() -> Pattern {
    let rect = Pattern::type_test(
        TypeRef::of::<Rect>(),
        Pattern::bind(
            [Binding::new("p1", "p1")],
            Pattern::redirect(
                "p1",
                Pattern::type_test(
                    TypeRef::of::<Point>(),
                    Pattern::bind(
                        [Binding::new("x", "x"), Binding::new("y", "y")],
                        Pattern::terminal(0),
                    ),
                ),
            ),
        ),
    );
    let mut cases = vec![rect];
    cases.extend((1..8).map(|i| Pattern::equal(format!("label{i}"), Pattern::terminal(i))));
    Pattern::or(None, cases, Some(Pattern::terminal(8)))
}

fn random_point(rng: &mut impl Rng) -> Point {
    Point {
        x: rng.random_range(-1000..1000),
        y: rng.random_range(-1000..1000),
    }
}

fn build_subjects(count: usize) -> Vec<Value> {
    // Seeded for determinism.
    let mut rng = ChaCha20Rng::seed_from_u64(0x42);
    (0..count)
        .map(|_| match rng.random_range(0..3) {
            0 => Value::from(Rect {
                p1: random_point(&mut rng),
                p2: random_point(&mut rng),
            }),
            1 => Value::from(format!("label{}", rng.random_range(1..10))),
            _ => Value::from(random_point(&mut rng)),
        })
        .collect()
}

fn bench_structural(c: &mut Criterion) {
    let rect = Value::from(Rect {
        p1: Point { x: 1, y: 2 },
        p2: Point { x: 3, y: 4 },
    });

    c.bench_function("get_field", |b| {
        b.iter(|| black_box(get_field(&rect, "p2").unwrap()));
    });

    c.bench_function("with_field", |b| {
        let replacement = Value::from(Point { x: 9, y: 9 });
        b.iter(|| black_box(with_field(&rect, "p1", replacement.clone()).unwrap()));
    });
}

fn bench_match(c: &mut Criterion) {
    let pattern = build_pattern();
    let subjects = build_subjects(256);
    let acc = carrier();

    c.bench_function("match_mixed_subjects", |b| {
        b.iter(|| {
            let mut hits = 0usize;
            for subject in &subjects {
                if let Some(result) = pattern.matches(&acc, subject).unwrap() {
                    hits += result.get::<Carrier>().map_or(0, |c| c.index as usize);
                }
            }
            black_box(hits);
        });
    });

    let limited = Matcher::new(MatchConfig::default().with_max_depth(64));
    c.bench_function("match_mixed_subjects_depth_limited", |b| {
        b.iter(|| {
            for subject in &subjects {
                black_box(limited.run(&pattern, &acc, subject).unwrap());
            }
        });
    });
}

criterion_group!(benches, bench_structural, bench_match);
criterion_main!(benches);
