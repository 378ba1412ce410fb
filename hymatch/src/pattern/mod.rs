//! Pattern algebra.
//!
//! A [`Pattern`] is an immutable tree evaluated against an `(accumulator, subject)` pair.
//! The accumulator is a composite [`Value`] that gains fields as matching proceeds; the
//! subject is the value currently under test.
//!
//! Failure modes
//! - [`Pattern::Equal`] and [`Pattern::TypeTest`] fail softly (`Ok(None)`), letting an
//!   enclosing [`Pattern::Or`] try its next case.
//! - Decomposition failures in [`Pattern::Bind`], missing fields in [`Pattern::Redirect`]
//!   and exhausted [`Pattern::Or`] nodes are errors and abort the whole match.
//!
//! Example
//! ```
//! use hymatch::prelude::*;
//!
//! // switch (x) { case "foo" -> 0; case "bar" -> 1; default -> 2; }
//! let pattern = Pattern::or(
//!     None,
//!     [
//!         Pattern::equal("foo", Pattern::terminal(0)),
//!         Pattern::equal("bar", Pattern::terminal(1)),
//!     ],
//!     Some(Pattern::terminal(2)),
//! );
//!
//! #[derive(Debug, Clone, PartialEq, Composite)]
//! struct Carrier {
//!     #[hymatch(rename = "__index__")]
//!     index: i32,
//! }
//!
//! let carrier = Carrier { index: -1 };
//! let hit = pattern.match_into(&carrier, &Value::from("bar")).unwrap();
//! assert_eq!(hit, Some(Carrier { index: 1 }));
//! ```
use std::{borrow::Cow, fmt, sync::Arc};

use smallvec::SmallVec;
use strum::{EnumIs, IntoStaticStr};

use crate::{
    error::{MatchError, MatchResult},
    value::{FieldValue, Object, Value},
};

pub mod eval;
pub mod pretty;

pub use eval::{MatchConfig, Matcher};

/// Name of the accumulator field written by [`Pattern::Terminal`].
pub const INDEX_FIELD: &str = "__index__";

/// Field name used in patterns.
pub type FieldName = Cow<'static, str>;

/// A runtime type test.
///
/// [`TypeRef::of`] tests for one concrete type. [`TypeRef::custom`] accepts any predicate,
/// which is how a family of types (e.g. every variant of a shape hierarchy) is tested.
#[derive(Clone, Copy)]
pub struct TypeRef {
    name: &'static str,
    test: fn(&dyn Object) -> bool,
}

fn is_instance<T: Object>(object: &dyn Object) -> bool {
    object.is::<T>()
}

/// Drop module paths from a type name, keeping generic arguments intact.
fn short_type_name(full: &'static str) -> &'static str {
    let head = full.split('<').next().unwrap_or(full);
    match head.rfind("::") {
        Some(index) => &full[index + 2..],
        None => full,
    }
}

impl TypeRef {
    pub fn of<T: Object>() -> Self {
        Self {
            name: short_type_name(std::any::type_name::<T>()),
            test: is_instance::<T>,
        }
    }

    pub fn custom(name: &'static str, test: fn(&dyn Object) -> bool) -> Self {
        Self { name, test }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns `true` if `value` satisfies this type. Null satisfies no type.
    pub fn test(&self, value: &Value) -> bool {
        value.object().is_some_and(|object| (self.test)(object))
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeRef({})", self.name)
    }
}

/// Copy the field `source` of the decomposed subject into the field `destination` of the
/// accumulator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub source: FieldName,
    pub destination: FieldName,
}

impl Binding {
    pub fn new(source: impl Into<FieldName>, destination: impl Into<FieldName>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }
}

/// Dispatch node: an optional null case, ordered cases and an optional default.
#[derive(Debug, Clone, Default)]
pub struct OrPattern {
    pub null_case: Option<Arc<Pattern>>,
    pub cases: Vec<Pattern>,
    pub default_case: Option<Arc<Pattern>>,
}

impl OrPattern {
    pub fn new(cases: impl IntoIterator<Item = Pattern>) -> Self {
        Self {
            null_case: None,
            cases: cases.into_iter().collect(),
            default_case: None,
        }
    }

    pub fn with_null(mut self, pattern: Pattern) -> Self {
        self.null_case = Some(Arc::new(pattern));
        self
    }

    pub fn with_default(mut self, pattern: Pattern) -> Self {
        self.default_case = Some(Arc::new(pattern));
        self
    }

    /// Returns `true` if a default case guarantees this node never runs out of cases.
    pub fn is_total(&self) -> bool {
        self.default_case.is_some()
    }
}

impl From<OrPattern> for Pattern {
    fn from(or: OrPattern) -> Self {
        Pattern::Or(or)
    }
}

/// A node of the pattern tree.
#[derive(Debug, Clone, IntoStaticStr, EnumIs)]
pub enum Pattern {
    /// Try cases in order, first success wins. Null subjects go to the null case, then to
    /// the default case; no match at all is a structural mismatch.
    Or(OrPattern),

    /// Continue with `next` if the subject equals `value`.
    Equal { value: Value, next: Arc<Pattern> },

    /// Continue with `next` if the subject satisfies `ty`. When `capture` is set the subject
    /// is first stored in that accumulator field.
    TypeTest {
        ty: TypeRef,
        capture: Option<FieldName>,
        next: Arc<Pattern>,
    },

    /// Decompose the subject and copy fields into the accumulator.
    Bind {
        bindings: SmallVec<[Binding; 4]>,
        next: Arc<Pattern>,
    },

    /// Continue with `next` on the value held by the accumulator field `name`.
    Redirect { name: FieldName, next: Arc<Pattern> },

    /// Record the case index in the accumulator and succeed.
    Terminal(i32),
}

impl Pattern {
    pub fn or(
        null_case: Option<Pattern>,
        cases: impl IntoIterator<Item = Pattern>,
        default_case: Option<Pattern>,
    ) -> Self {
        Pattern::Or(OrPattern {
            null_case: null_case.map(Arc::new),
            cases: cases.into_iter().collect(),
            default_case: default_case.map(Arc::new),
        })
    }

    pub fn equal(value: impl Into<Value>, next: Pattern) -> Self {
        Pattern::Equal {
            value: value.into(),
            next: Arc::new(next),
        }
    }

    pub fn type_test(ty: TypeRef, next: Pattern) -> Self {
        Pattern::TypeTest {
            ty,
            capture: None,
            next: Arc::new(next),
        }
    }

    /// Type test that also captures the subject under `name`.
    pub fn capture(ty: TypeRef, name: impl Into<FieldName>, next: Pattern) -> Self {
        Pattern::TypeTest {
            ty,
            capture: Some(name.into()),
            next: Arc::new(next),
        }
    }

    pub fn bind(bindings: impl IntoIterator<Item = Binding>, next: Pattern) -> Self {
        Pattern::Bind {
            bindings: bindings.into_iter().collect(),
            next: Arc::new(next),
        }
    }

    pub fn redirect(name: impl Into<FieldName>, next: Pattern) -> Self {
        Pattern::Redirect {
            name: name.into(),
            next: Arc::new(next),
        }
    }

    pub fn terminal(index: i32) -> Self {
        Pattern::Terminal(index)
    }

    /// Variant name, e.g. `"Bind"`.
    pub fn kind(&self) -> &'static str {
        self.into()
    }

    /// Longest chain of nested nodes, a terminal counting as one.
    pub fn depth(&self) -> usize {
        match self {
            Pattern::Terminal(_) => 1,
            Pattern::Equal { next, .. }
            | Pattern::TypeTest { next, .. }
            | Pattern::Bind { next, .. }
            | Pattern::Redirect { next, .. } => 1 + next.depth(),
            Pattern::Or(or) => {
                let cases = or.cases.iter().map(Pattern::depth);
                let extra = or.null_case.iter().chain(&or.default_case).map(|p| p.depth());
                1 + cases.chain(extra).max().unwrap_or(0)
            }
        }
    }

    /// Match `subject` against this pattern with the default [`MatchConfig`].
    ///
    /// Returns the grown accumulator, `None` for a soft non-match, or an error.
    pub fn matches(&self, accumulator: &Value, subject: &Value) -> MatchResult<Option<Value>> {
        Matcher::default().run(self, accumulator, subject)
    }

    /// Typed variant of [`Pattern::matches`] for a composite accumulator `C`.
    pub fn match_into<C: FieldValue>(&self, accumulator: &C, subject: &Value) -> MatchResult<Option<C>> {
        let result = self.matches(&accumulator.to_value(), subject)?;
        result
            .map(|value| {
                C::from_value(&value)
                    .map_err(|e| MatchError::from_hook("accumulator conversion", value.type_name(), e))
            })
            .transpose()
    }
}
