//! Per-type structural metadata and its process-wide cache.
use std::{
    any::{Any, TypeId},
    collections::{BTreeMap, btree_map::Entry},
    fmt,
    sync::Arc,
};

use log::debug;
use parking_lot::{RwLock, const_rwlock};
use smallvec::SmallVec;

use crate::{
    error::{HookError, MatchError, MatchResult, StructuralMismatch},
    structural::{Composite, Structure},
    value::{Object, Value},
};

/// Type-erased field reader: `(object, position) -> value`.
pub type ReadFn = fn(&dyn Object, usize) -> Result<Value, HookError>;

/// Metadata constructor stored in [`Structure::Composite`].
pub type DescribeFn = fn() -> Result<TypeMeta, StructuralMismatch>;

/// Type-erased canonical builder taking field values in declared order.
pub type BuildFn = fn(Vec<Value>) -> Result<Value, HookError>;

/// A named field of a composite type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMeta {
    pub name: &'static str,
    pub position: usize,
}

/// Structural description of one composite type.
///
/// Built once per type by [`TypeMeta::of`] and shared through the cache. The field order is
/// the order of [`Composite::FIELDS`], which is also the argument order of the builder.
pub struct TypeMeta {
    type_id: TypeId,
    type_name: &'static str,
    fields: SmallVec<[FieldMeta; 8]>,
    by_name: BTreeMap<&'static str, usize>,
    read: ReadFn,
    build: BuildFn,
}

fn read_erased<C: Composite>(object: &dyn Object, position: usize) -> Result<Value, HookError> {
    match object.downcast_ref::<C>() {
        Some(composite) => composite.read_field(position),
        None => Err(HookError::Conversion {
            expected: C::NAME,
            found: object.type_name(),
        }),
    }
}

fn build_erased<C: Composite>(values: Vec<Value>) -> Result<Value, HookError> {
    C::build(values).map(Value::new)
}

impl TypeMeta {
    /// Compute the metadata of `C`. Prefer [`meta_of`], which caches the result.
    ///
    /// Fails with [`StructuralMismatch::DuplicateField`] if a field name is declared twice.
    pub fn of<C: Composite>() -> Result<Self, StructuralMismatch> {
        let fields: SmallVec<[FieldMeta; 8]> = C::FIELDS
            .iter()
            .enumerate()
            .map(|(position, name)| FieldMeta {
                name: *name,
                position,
            })
            .collect();

        let mut by_name = BTreeMap::new();
        for field in &fields {
            if by_name.insert(field.name, field.position).is_some() {
                return Err(StructuralMismatch::DuplicateField {
                    field: field.name,
                    type_name: C::NAME,
                });
            }
        }

        Ok(Self {
            type_id: TypeId::of::<C>(),
            type_name: C::NAME,
            fields,
            by_name,
            read: read_erased::<C>,
            build: build_erased::<C>,
        })
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Fields in declared order.
    pub fn fields(&self) -> &[FieldMeta] {
        &self.fields
    }

    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|field| field.name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    fn require(&self, name: &str) -> MatchResult<usize> {
        self.position(name).ok_or_else(|| {
            StructuralMismatch::UnknownField {
                field: name.to_owned(),
                type_name: self.type_name,
            }
            .into()
        })
    }

    /// Read the field at `position` of `object`.
    pub fn read_at(&self, object: &dyn Object, position: usize) -> MatchResult<Value> {
        (self.read)(object, position)
            .map_err(|e| MatchError::from_hook("accessor", self.type_name, e))
    }

    /// Read the field called `name` of `object`.
    pub fn read(&self, object: &dyn Object, name: &str) -> MatchResult<Value> {
        let position = self.require(name)?;
        self.read_at(object, position)
    }

    /// Build a copy of `object` where `name` holds `value`; every other field is read back
    /// from `object` and kept at its position.
    pub fn rebuild_with(&self, object: &dyn Object, name: &str, value: Value) -> MatchResult<Value> {
        let target = self.require(name)?;

        let mut values = Vec::with_capacity(self.fields.len());
        let mut replacement = Some(value);
        for field in &self.fields {
            if field.position == target {
                values.push(replacement.take().unwrap_or_default());
            } else {
                values.push(self.read_at(object, field.position)?);
            }
        }

        (self.build)(values).map_err(|e| MatchError::from_hook("canonical builder", self.type_name, e))
    }
}

impl fmt::Debug for TypeMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeMeta")
            .field("type_name", &self.type_name)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

/// Process-wide metadata cache. Entries are never evicted.
static METADATA: RwLock<BTreeMap<TypeId, Arc<TypeMeta>>> = const_rwlock(BTreeMap::new());

/// Fetch the metadata for `type_id`, computing it with `describe` on first use.
///
/// The computation runs outside of any lock. Two threads racing on the same type may both
/// compute it; the first insertion wins and every caller gets that entry. Ill-formed types
/// are never cached.
fn fetch_or_compute(type_id: TypeId, describe: DescribeFn) -> MatchResult<Arc<TypeMeta>> {
    if let Some(meta) = METADATA.read().get(&type_id) {
        return Ok(meta.clone());
    }

    let computed = Arc::new(describe()?);
    debug_assert_eq!(computed.type_id, type_id, "metadata describes another type");

    match METADATA.write().entry(type_id) {
        Entry::Occupied(entry) => {
            debug!(
                "Structural metadata for `{}` was cached concurrently, dropping duplicate.",
                computed.type_name
            );
            Ok(entry.get().clone())
        }
        Entry::Vacant(entry) => {
            debug!(
                "Cached structural metadata for `{}` with fields [{}].",
                computed.type_name,
                computed.field_names().collect::<Vec<_>>().join(", ")
            );
            Ok(entry.insert(computed).clone())
        }
    }
}

/// Cached metadata of the concrete type of `object`.
///
/// Fails with [`StructuralMismatch::NotComposite`] if the type is not a composite, or
/// [`StructuralMismatch::DuplicateField`] if its field names are not unique.
pub fn meta_of(object: &dyn Object) -> MatchResult<Arc<TypeMeta>> {
    match object.structure() {
        Structure::Composite(describe) => fetch_or_compute(Any::type_id(object.as_any()), describe),
        _ => Err(StructuralMismatch::NotComposite {
            type_name: object.type_name(),
        }
        .into()),
    }
}

/// Cached metadata of the composite `C`.
pub fn meta_for<C: Composite>() -> MatchResult<Arc<TypeMeta>> {
    fetch_or_compute(TypeId::of::<C>(), TypeMeta::of::<C>)
}
