use hymatch::prelude::*;

#[derive(Debug, Clone, PartialEq, Composite)]
struct Point {
    x: i32,
    y: i32,
}

#[derive(Debug, Clone, PartialEq, Composite)]
struct Circle {
    center: Option<Point>,
    radius: i32,
}

#[derive(Debug, Clone, PartialEq, Composite)]
struct Carrier {
    #[hymatch(rename = "__index__")]
    index: i32,
    center: Option<Point>,
    x: i32,
    radius: i32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // switch (shape) {
    //   case Circle(Point(var x, _) center, var radius) -> 0;
    //   case "unit" -> 1;
    //   case null -> 2;
    //   default -> 3;
    // }
    let pattern = Pattern::or(
        Some(Pattern::terminal(2)),
        [
            Pattern::type_test(
                TypeRef::of::<Circle>(),
                Pattern::bind(
                    [
                        Binding::new("center", "center"),
                        Binding::new("radius", "radius"),
                    ],
                    Pattern::redirect(
                        "center",
                        Pattern::type_test(
                            TypeRef::of::<Point>(),
                            Pattern::bind([Binding::new("x", "x")], Pattern::terminal(0)),
                        ),
                    ),
                ),
            ),
            Pattern::equal("unit", Pattern::terminal(1)),
        ],
        Some(Pattern::terminal(3)),
    );

    pattern.pretty_print()?;
    println!();

    let carrier = Carrier {
        index: -1,
        center: None,
        x: 0,
        radius: 0,
    };
    let shapes = [
        Value::from(Circle {
            center: Some(Point { x: 4, y: 2 }),
            radius: 7,
        }),
        Value::from(Circle {
            center: None,
            radius: 1,
        }),
        Value::from("unit"),
        Value::NULL,
        Value::from(42i32),
    ];

    for shape in &shapes {
        match pattern.match_into(&carrier, shape)? {
            Some(result) => println!("{shape:?} -> {result:?}"),
            None => println!("{shape:?} -> no match"),
        }
    }
    Ok(())
}
