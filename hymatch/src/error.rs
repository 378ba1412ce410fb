//! Error taxonomy of the matcher.
//!
//! A soft non-match is never an error: it is the `Ok(None)` returned by
//! [`crate::pattern::Pattern::matches`]. Everything in this module aborts the
//! whole match and is never retried by sibling cases.
use thiserror::Error;

/// Boxed error raised by user code (decomposition hooks, accessors).
pub type DomainError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure reported by a user hook (deconstructor, accessor or builder).
#[derive(Debug, Error)]
pub enum HookError {
    /// Failure belonging to the hook's own domain. Propagated to the caller unmodified.
    #[error(transparent)]
    Raised(DomainError),

    /// Failure the hook declares as part of its contract. Such failures are not allowed
    /// to escape the structural layer and are reported as a [`StructuralMismatch`].
    #[error("declared failure: {0}")]
    Declared(String),

    /// A field value could not be converted to the type expected by a builder.
    #[error("expected a value of type `{expected}`, found `{found}`")]
    Conversion {
        expected: &'static str,
        found: &'static str,
    },
}

impl HookError {
    /// Wrap any error as a domain failure.
    pub fn raised<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        HookError::Raised(Box::new(error))
    }

    /// Build a declared failure from a message.
    pub fn declared(message: impl Into<String>) -> Self {
        HookError::Declared(message.into())
    }
}

/// Schema-level failure: the pattern does not fit the shape of the data.
#[derive(Debug, Error)]
pub enum StructuralMismatch {
    #[error("no field `{field}` for composite `{type_name}`")]
    UnknownField {
        field: String,
        type_name: &'static str,
    },

    #[error("field `{field}` declared twice in composite `{type_name}`")]
    DuplicateField {
        field: &'static str,
        type_name: &'static str,
    },

    #[error("`{type_name}` is not a composite type")]
    NotComposite { type_name: &'static str },

    #[error("no deconstructor for `{type_name}`")]
    NoDeconstructor { type_name: &'static str },

    #[error("the {hook} of `{type_name}` failed: {source}")]
    HookFailed {
        hook: &'static str,
        type_name: &'static str,
        #[source]
        source: HookError,
    },

    #[error("no alternative matched a subject of type `{type_name}`")]
    NoAlternative { type_name: &'static str },
}

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("structural mismatch: {0}")]
    Mismatch(#[from] StructuralMismatch),

    #[error("null subject: {context}")]
    NullSubject { context: &'static str },

    #[error(transparent)]
    Domain(DomainError),

    #[error("pattern nesting exceeds the configured limit of {limit}")]
    DepthExceeded { limit: usize },
}

impl MatchError {
    /// Returns `true` if this is a [`StructuralMismatch`].
    pub fn is_mismatch(&self) -> bool {
        matches!(self, MatchError::Mismatch(_))
    }

    /// Returns `true` if this is the fatal null-subject failure.
    pub fn is_null_subject(&self) -> bool {
        matches!(self, MatchError::NullSubject { .. })
    }

    /// Returns the inner mismatch, if any.
    pub fn as_mismatch(&self) -> Option<&StructuralMismatch> {
        match self {
            MatchError::Mismatch(mismatch) => Some(mismatch),
            _ => None,
        }
    }

    /// Lift a hook failure raised while running `hook` on `type_name`.
    ///
    /// Domain failures pass through untouched, everything else becomes a
    /// [`StructuralMismatch::HookFailed`].
    pub(crate) fn from_hook(hook: &'static str, type_name: &'static str, error: HookError) -> Self {
        match error {
            HookError::Raised(inner) => MatchError::Domain(inner),
            source => StructuralMismatch::HookFailed {
                hook,
                type_name,
                source,
            }
            .into(),
        }
    }
}

pub type MatchResult<T> = Result<T, MatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("negative radius")]
    struct NegativeRadius;

    #[test]
    fn raised_hook_errors_pass_through() {
        let err = MatchError::from_hook("accessor", "Circle", HookError::raised(NegativeRadius));
        match err {
            MatchError::Domain(inner) => assert!(inner.downcast_ref::<NegativeRadius>().is_some()),
            other => panic!("expected a domain error, got {other:?}"),
        }
    }

    #[test]
    fn declared_hook_errors_become_mismatches() {
        let err = MatchError::from_hook("deconstructor", "Circle", HookError::declared("io"));
        assert!(err.is_mismatch());
        assert!(matches!(
            err.as_mismatch(),
            Some(StructuralMismatch::HookFailed {
                hook: "deconstructor",
                ..
            })
        ));
        assert_eq!(
            err.to_string(),
            "structural mismatch: the deconstructor of `Circle` failed: declared failure: io"
        );
    }
}
