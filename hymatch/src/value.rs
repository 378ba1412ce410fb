//! Opaque runtime values.
//!
//! Role
//! - [`Object`] is the capability every matchable type provides: dynamic equality, a
//!   printable type name and a description of its [`Structure`].
//! - [`Value`] is a cheap, shareable handle to an object, or the null marker.
//! - [`FieldValue`] converts typed composite fields to and from [`Value`].
use std::{any::type_name, fmt, sync::Arc};

use downcast_rs::{DowncastSync, impl_downcast};

use crate::{error::HookError, structural::Structure};

/// A value that can be the subject of a match or stored in a composite field.
///
/// Implement it with [`crate::opaque_object!`] for leaf types, or derive it together with
/// [`crate::structural::Composite`] for record-like types.
pub trait Object: DowncastSync + fmt::Debug {
    /// Deep equality. Objects of distinct concrete types are never equal.
    fn dyn_eq(&self, other: &dyn Object) -> bool;

    /// Name of the concrete type, used in diagnostics.
    fn type_name(&self) -> &'static str;

    /// How the structural layer may look inside values of this type.
    fn structure(&self) -> Structure {
        Structure::Opaque
    }
}
impl_downcast!(sync Object);

/// Shared handle to an [`Object`], or null.
///
/// Values are immutable; cloning only bumps a reference count.
#[derive(Clone, Default)]
pub struct Value(Option<Arc<dyn Object>>);

impl Value {
    /// The null marker.
    pub const NULL: Value = Value(None);

    pub fn new<T: Object>(object: T) -> Self {
        Value(Some(Arc::new(object)))
    }

    pub fn from_arc(object: Arc<dyn Object>) -> Self {
        Value(Some(object))
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        self.0.is_none()
    }

    /// Borrow the underlying object, `None` for null.
    #[inline]
    pub fn object(&self) -> Option<&dyn Object> {
        self.0.as_deref()
    }

    /// Returns `true` if the value holds a `T`. Null holds nothing.
    pub fn is<T: Object>(&self) -> bool {
        self.object().is_some_and(|object| object.is::<T>())
    }

    pub fn get<T: Object>(&self) -> Option<&T> {
        self.object().and_then(|object| object.downcast_ref::<T>())
    }

    /// Clone out the held `T`, reporting a conversion failure otherwise.
    pub fn extract<T: Object + Clone>(&self) -> Result<T, HookError> {
        self.get::<T>().cloned().ok_or_else(|| HookError::Conversion {
            expected: type_name::<T>(),
            found: self.type_name(),
        })
    }

    /// Name of the held type, `"null"` for null.
    pub fn type_name(&self) -> &'static str {
        match self.object() {
            Some(object) => object.type_name(),
            None => "null",
        }
    }

    /// Identity comparison of the underlying allocation.
    pub fn ptr_eq(&self, other: &Value) -> bool {
        match (&self.0, &other.0) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self.object(), other.object()) {
            (None, None) => true,
            (Some(a), Some(b)) => self.ptr_eq(other) || a.dyn_eq(b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.object() {
            Some(object) => object.fmt(f),
            None => f.write_str("null"),
        }
    }
}

impl From<Arc<dyn Object>> for Value {
    fn from(object: Arc<dyn Object>) -> Self {
        Value::from_arc(object)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::new(s.to_owned())
    }
}

impl<T> From<Option<T>> for Value
where
    Value: From<T>,
{
    fn from(value: Option<T>) -> Self {
        value.map(Value::from).unwrap_or(Value::NULL)
    }
}

/// Conversion between a typed composite field and [`Value`].
pub trait FieldValue: Sized {
    fn to_value(&self) -> Value;

    fn from_value(value: &Value) -> Result<Self, HookError>;
}

impl FieldValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }

    fn from_value(value: &Value) -> Result<Self, HookError> {
        Ok(value.clone())
    }
}

/// `None` maps to null and back.
impl<T: FieldValue> FieldValue for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(inner) => inner.to_value(),
            None => Value::NULL,
        }
    }

    fn from_value(value: &Value) -> Result<Self, HookError> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_value(value).map(Some)
        }
    }
}

/// Implement [`Object`], [`FieldValue`] and `From<T> for Value` for leaf types.
///
/// The types must be `Clone + PartialEq + Debug + Send + Sync + 'static`.
///
/// ```
/// #[derive(Debug, Clone, PartialEq)]
/// struct Celsius(f64);
/// hymatch::opaque_object!(Celsius);
///
/// let v = hymatch::value::Value::from(Celsius(21.5));
/// assert_eq!(v.get::<Celsius>(), Some(&Celsius(21.5)));
/// ```
#[macro_export]
macro_rules! opaque_object {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $crate::value::Object for $ty {
                fn dyn_eq(&self, other: &dyn $crate::value::Object) -> bool {
                    other.downcast_ref::<Self>().is_some_and(|other| self == other)
                }

                fn type_name(&self) -> &'static str {
                    stringify!($ty)
                }
            }

            impl $crate::value::FieldValue for $ty {
                fn to_value(&self) -> $crate::value::Value {
                    $crate::value::Value::new(::std::clone::Clone::clone(self))
                }

                fn from_value(
                    value: &$crate::value::Value,
                ) -> ::std::result::Result<Self, $crate::error::HookError> {
                    value.extract::<Self>()
                }
            }

            impl ::std::convert::From<$ty> for $crate::value::Value {
                fn from(value: $ty) -> Self {
                    $crate::value::Value::new(value)
                }
            }
        )*
    };
}

opaque_object!(
    (),
    bool,
    char,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    f32,
    f64,
    String,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_equality_is_reflexive_and_exclusive() {
        assert_eq!(Value::NULL, Value::NULL);
        assert_ne!(Value::NULL, Value::from(0i32));
        assert_ne!(Value::from(0i32), Value::NULL);
        assert_eq!(Value::NULL.type_name(), "null");
    }

    #[test]
    fn equality_is_deep_and_type_sensitive() {
        assert_eq!(Value::from("foo"), Value::from(String::from("foo")));
        assert_ne!(Value::from(1i32), Value::from(1i64));
        assert_ne!(Value::from("foo"), Value::from("bar"));
    }

    #[test]
    fn extract_reports_the_found_type() {
        let v = Value::from(3i32);
        assert_eq!(v.extract::<i32>().unwrap(), 3);
        match v.extract::<String>() {
            Err(HookError::Conversion { found, .. }) => assert_eq!(found, "i32"),
            other => panic!("expected a conversion failure, got {other:?}"),
        }
    }

    #[test]
    fn option_fields_round_trip_through_null() {
        let none: Option<i32> = None;
        assert!(none.to_value().is_null());
        assert_eq!(Option::<i32>::from_value(&Value::NULL).unwrap(), None);
        assert_eq!(Option::<i32>::from_value(&Value::from(7i32)).unwrap(), Some(7));
        assert_eq!(Value::from(Some(7i32)), Value::from(7i32));
    }

    #[test]
    fn clones_share_the_allocation() {
        let a = Value::from("shared");
        let b = a.clone();
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&Value::from("shared")));
    }
}
