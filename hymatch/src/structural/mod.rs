//! Generic structural access layer.
//!
//! Role
//! - Decompose an opaque value into a composite ("tuple") view.
//! - Read a named field of a composite.
//! - Produce a copy of a composite with one field replaced.
//!
//! Field lookups go through [`meta::TypeMeta`], computed once per concrete type and cached
//! for the lifetime of the process.
use std::fmt;

use crate::{
    error::{HookError, MatchError, MatchResult, StructuralMismatch},
    value::{Object, Value},
};

pub mod meta;

pub use meta::{DescribeFn, FieldMeta, TypeMeta, meta_for, meta_of};

/// A record-like type with an ordered list of uniquely named fields.
///
/// Usually derived with `#[derive(Composite)]`. A hand-written implementation must keep
/// [`Composite::FIELDS`], [`Composite::read_field`] and [`Composite::build`] in the same
/// order, and its [`Object::structure`] must return [`Structure::composite`].
pub trait Composite: Object + Sized {
    /// Name used in diagnostics.
    const NAME: &'static str;

    /// Field names in declared order.
    const FIELDS: &'static [&'static str];

    /// Read the field at `position` (an index into [`Composite::FIELDS`]).
    fn read_field(&self, position: usize) -> Result<Value, HookError>;

    /// Canonical builder: one value per field, in declared order.
    fn build(values: Vec<Value>) -> Result<Self, HookError>;
}

/// A non-composite type that can expose a composite view of itself.
pub trait Decomposable: Object + Sized {
    type Tuple: Composite;

    fn deconstruct(&self) -> Result<Self::Tuple, HookError>;
}

/// Type-erased deconstruction hook.
pub type DeconstructFn = fn(&dyn Object) -> Result<Value, HookError>;

fn deconstruct_erased<D: Decomposable>(object: &dyn Object) -> Result<Value, HookError> {
    match object.downcast_ref::<D>() {
        Some(value) => value.deconstruct().map(Value::new),
        None => Err(HookError::Conversion {
            expected: std::any::type_name::<D>(),
            found: object.type_name(),
        }),
    }
}

/// What the structural layer can see inside a type.
#[derive(Clone, Copy)]
pub enum Structure {
    /// No fields, no deconstructor.
    Opaque,
    /// The type is itself a composite; the function computes its metadata.
    Composite(DescribeFn),
    /// The type exposes a composite view through a deconstructor.
    Decomposable(DeconstructFn),
}

impl Structure {
    pub fn composite<C: Composite>() -> Self {
        Structure::Composite(TypeMeta::of::<C>)
    }

    pub fn decomposable<D: Decomposable>() -> Self {
        Structure::Decomposable(deconstruct_erased::<D>)
    }
}

impl fmt::Debug for Structure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Structure::Opaque => f.write_str("Opaque"),
            Structure::Composite(_) => f.write_str("Composite"),
            Structure::Decomposable(_) => f.write_str("Decomposable"),
        }
    }
}

fn non_null<'a>(value: &'a Value, context: &'static str) -> MatchResult<&'a dyn Object> {
    value
        .object()
        .ok_or(MatchError::NullSubject { context })
}

/// Composite view of `value`.
///
/// A composite is returned as is (same allocation). Otherwise the deconstructor of the
/// type is invoked.
pub fn decompose(value: &Value) -> MatchResult<Value> {
    let object = non_null(value, "cannot decompose null")?;
    match object.structure() {
        Structure::Composite(_) => Ok(value.clone()),
        Structure::Decomposable(deconstruct) => deconstruct(object)
            .map_err(|e| MatchError::from_hook("deconstructor", object.type_name(), e)),
        Structure::Opaque => Err(StructuralMismatch::NoDeconstructor {
            type_name: object.type_name(),
        }
        .into()),
    }
}

/// Read the field `name` of the composite `tuple`.
pub fn get_field(tuple: &Value, name: &str) -> MatchResult<Value> {
    let object = non_null(tuple, "cannot read a field of null")?;
    meta_of(object)?.read(object, name)
}

/// Copy of the composite `tuple` where the field `name` holds `value`.
///
/// The input is left untouched; every other field keeps its value and position.
pub fn with_field(tuple: &Value, name: &str, value: Value) -> MatchResult<Value> {
    let object = non_null(tuple, "cannot update a field of null")?;
    meta_of(object)?.rebuild_with(object, name, value)
}
