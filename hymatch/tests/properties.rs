use hymatch::prelude::*;
use hymatch::structural::{get_field, with_field};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

#[derive(Debug, Clone, PartialEq, Composite)]
struct Triple {
    a: i64,
    b: String,
    c: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Composite)]
struct Carrier {
    #[hymatch(rename = "__index__")]
    index: i32,
    captured: Value,
    a: Option<i64>,
}

fn carrier() -> Carrier {
    Carrier {
        index: -1,
        captured: Value::NULL,
        a: None,
    }
}

fn random_triple(rng: &mut impl Rng) -> Triple {
    Triple {
        a: rng.random_range(-100..100),
        b: format!("s{}", rng.random_range(0..5)),
        c: if rng.random_bool(0.3) {
            None
        } else {
            Some(rng.random_range(-100..100))
        },
    }
}

fn random_field_value(rng: &mut impl Rng, field: &str) -> Value {
    match field {
        "a" => Value::from(rng.random_range(-1000i64..1000)),
        "b" => Value::from(format!("r{}", rng.random_range(0..1000))),
        _ if rng.random_bool(0.5) => Value::NULL,
        _ => Value::from(rng.random_range(-1000i64..1000)),
    }
}

#[test]
fn field_round_trip() {
    let mut rng = ChaCha20Rng::seed_from_u64(0x42);
    let fields = ["a", "b", "c"];

    for _ in 0..200 {
        let tuple = Value::from(random_triple(&mut rng));
        let name = fields[rng.random_range(0..fields.len())];
        let value = random_field_value(&mut rng, name);

        let updated = with_field(&tuple, name, value.clone()).unwrap();
        assert_eq!(get_field(&updated, name).unwrap(), value);
        for other in fields.iter().filter(|f| **f != name) {
            assert_eq!(
                get_field(&updated, other).unwrap(),
                get_field(&tuple, other).unwrap()
            );
        }
    }
}

fn guard_pattern() -> Pattern {
    Pattern::or(
        None,
        [
            Pattern::type_test(
                TypeRef::of::<Triple>(),
                Pattern::bind(
                    [Binding::new("a", "a")],
                    Pattern::redirect("a", Pattern::equal(0i64, Pattern::terminal(0))),
                ),
            ),
            Pattern::capture(
                TypeRef::of::<Triple>(),
                "captured",
                Pattern::bind([Binding::new("c", "a")], Pattern::terminal(1)),
            ),
        ],
        Some(Pattern::terminal(2)),
    )
}

#[test]
fn matching_is_pure() {
    let mut rng = ChaCha20Rng::seed_from_u64(7);
    let pattern = guard_pattern();
    let acc = Value::from(carrier());

    for _ in 0..100 {
        let subject = if rng.random_bool(0.1) {
            Value::from("other")
        } else {
            Value::from(random_triple(&mut rng))
        };
        let first = pattern.matches(&acc, &subject).unwrap();
        let second = pattern.matches(&acc, &subject).unwrap();
        assert_eq!(first, second);
        // The accumulator itself never changes.
        assert_eq!(acc, Value::from(carrier()));
    }
}

#[test]
fn first_match_wins() {
    let accept_all = |index| Pattern::type_test(TypeRef::of::<Triple>(), Pattern::terminal(index));
    let c1 = Pattern::capture(TypeRef::of::<Triple>(), "captured", Pattern::terminal(0));
    let c2 = accept_all(1);

    let subject = Value::from(Triple {
        a: 1,
        b: "x".into(),
        c: None,
    });
    let acc = Value::from(carrier());

    let alone = c1.matches(&acc, &subject).unwrap();
    let combined = Pattern::or(None, [c1, c2], None)
        .matches(&acc, &subject)
        .unwrap();
    assert!(alone.is_some());
    assert_eq!(combined, alone);
}

#[test]
fn reordering_disjoint_cases_does_not_change_the_winner() {
    let equal = |value: i64, index| Pattern::equal(value, Pattern::terminal(index));
    let forward = Pattern::or(None, [equal(1, 1), equal(2, 2), equal(3, 3)], Some(Pattern::terminal(0)));
    let backward = Pattern::or(None, [equal(3, 3), equal(2, 2), equal(1, 1)], Some(Pattern::terminal(0)));
    let acc = Value::from(carrier());

    for n in 0..5i64 {
        let subject = Value::from(n);
        assert_eq!(
            forward.matches(&acc, &subject).unwrap(),
            backward.matches(&acc, &subject).unwrap()
        );
    }
}

#[test]
fn redirect_ignores_the_current_subject() {
    let mut rng = ChaCha20Rng::seed_from_u64(11);
    let pattern = Pattern::redirect(
        "captured",
        Pattern::or(
            None,
            [Pattern::equal("target", Pattern::terminal(0))],
            Some(Pattern::terminal(1)),
        ),
    );

    for captured in [Value::from("target"), Value::from("elsewhere")] {
        let acc = Value::from(Carrier {
            captured: captured.clone(),
            ..carrier()
        });
        let reference = pattern.matches(&acc, &Value::NULL).unwrap();
        for _ in 0..20 {
            let subject = match rng.random_range(0..3) {
                0 => Value::from(random_triple(&mut rng)),
                1 => Value::from(rng.random_range(0i64..10)),
                _ => Value::NULL,
            };
            assert_eq!(pattern.matches(&acc, &subject).unwrap(), reference);
        }
    }
}

#[test]
fn capture_records_the_subject() {
    let subject = Value::from(Triple {
        a: 5,
        b: "y".into(),
        c: Some(9),
    });
    let result = guard_pattern()
        .match_into(&carrier(), &subject)
        .unwrap()
        .unwrap();
    assert_eq!(result.index, 1);
    assert_eq!(result.a, Some(9));
    assert!(result.captured.ptr_eq(&subject));
}
