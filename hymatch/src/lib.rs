//! Hymatch: structural, destructuring pattern matching over opaque values.
//!
//! A match is described by a [`pattern::Pattern`] tree (the evaluable form of a
//! `switch` with nested type tests, value guards and field bindings). The tree is built
//! once and evaluated against an accumulator and a subject; bindings accumulate into the
//! accumulator, which is an immutable composite value rebuilt at every step.
//!
//! Layers
//!  - [`value`]: the [`Object`] capability and the [`Value`] handle (or null).
//!  - [`structural`]: decomposition, field reads and field-updated copies of composites,
//!    backed by per-type metadata cached for the lifetime of the process.
//!  - [`pattern`]: the pattern algebra and its evaluator.
//!
//! Example
//! ```
//! use hymatch::prelude::*;
//!
//! #[derive(Debug, Clone, PartialEq, Composite)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! #[derive(Debug, Clone, PartialEq, Composite)]
//! struct Carrier {
//!     #[hymatch(rename = "__index__")]
//!     index: i32,
//!     my_x: i32,
//!     my_y: i32,
//! }
//!
//! // switch (p) { case Point(int my_x, int my_y) -> 0; }
//! let pattern = Pattern::or(
//!     None,
//!     [Pattern::type_test(
//!         TypeRef::of::<Point>(),
//!         Pattern::bind(
//!             [Binding::new("x", "my_x"), Binding::new("y", "my_y")],
//!             Pattern::terminal(0),
//!         ),
//!     )],
//!     None,
//! );
//!
//! let carrier = Carrier { index: -1, my_x: -1, my_y: -1 };
//! let result = pattern.match_into(&carrier, &Value::from(Point { x: 3, y: 4 })).unwrap();
//! assert_eq!(result, Some(Carrier { index: 0, my_x: 3, my_y: 4 }));
//! ```

// Lets the derive macros refer to `::hymatch` from inside this crate.
extern crate self as hymatch;

/// Error taxonomy: structural mismatches, null subjects and hook failures.
pub mod error;
/// Pattern algebra: the node variants, their evaluation and pretty-printing.
pub mod pattern;
/// Structural access layer: decompose, read and update composites by field name.
pub mod structural;
/// Opaque values and the capability traits they implement.
pub mod value;

pub use error::{HookError, MatchError, MatchResult, StructuralMismatch};
pub use value::{FieldValue, Object, Value};

#[cfg(feature = "derive")]
pub use hymatch_derive::{Composite, Object};

pub mod prelude {
    //! Convenient re-exports for end users.
    //!
    //! - Pattern nodes and constructors
    //! - Capability traits (and their derive macros with the `derive` feature)
    //! - Errors
    pub use crate::error::{HookError, MatchError, MatchResult, StructuralMismatch};
    pub use crate::pattern::{Binding, MatchConfig, Matcher, OrPattern, Pattern, TypeRef};
    pub use crate::structural::{Composite, Decomposable, Structure};
    pub use crate::value::{FieldValue, Object, Value};

    #[cfg(feature = "derive")]
    pub use hymatch_derive::{Composite, Object};
}
