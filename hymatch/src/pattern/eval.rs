//! Recursive evaluation of pattern trees.
use std::borrow::Cow;

use log::trace;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    error::{MatchError, MatchResult, StructuralMismatch},
    pattern::{Binding, INDEX_FIELD, OrPattern, Pattern},
    structural::{decompose, get_field, with_field},
    value::Value,
};

/// Evaluation settings.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MatchConfig {
    /// Accumulator field written by [`Pattern::Terminal`].
    pub index_field: Cow<'static, str>,

    /// Maximum nesting depth followed before giving up with
    /// [`MatchError::DepthExceeded`]. `None` means unbounded.
    pub max_depth: Option<usize>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            index_field: Cow::Borrowed(INDEX_FIELD),
            max_depth: None,
        }
    }
}

impl MatchConfig {
    pub fn with_index_field(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.index_field = name.into();
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }
}

/// Evaluates patterns under a [`MatchConfig`].
///
/// A matcher holds no state besides its configuration; one instance can serve any number of
/// concurrent matches.
#[derive(Debug, Clone, Default)]
pub struct Matcher {
    config: MatchConfig,
}

impl Matcher {
    pub fn new(config: MatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Match `subject` against `pattern`, starting from `accumulator`.
    pub fn run(
        &self,
        pattern: &Pattern,
        accumulator: &Value,
        subject: &Value,
    ) -> MatchResult<Option<Value>> {
        self.eval(pattern, accumulator.clone(), subject, 0)
    }

    fn eval(
        &self,
        pattern: &Pattern,
        accumulator: Value,
        subject: &Value,
        depth: usize,
    ) -> MatchResult<Option<Value>> {
        if let Some(limit) = self.config.max_depth {
            if depth >= limit {
                return Err(MatchError::DepthExceeded { limit });
            }
        }
        trace!(
            "Evaluating {} at depth {} on a subject of type `{}`.",
            pattern.kind(),
            depth,
            subject.type_name()
        );

        match pattern {
            Pattern::Terminal(index) => {
                with_field(&accumulator, &self.config.index_field, Value::new(*index)).map(Some)
            }
            Pattern::Equal { value, next } => {
                if subject == value {
                    self.eval(next, accumulator, subject, depth + 1)
                } else {
                    Ok(None)
                }
            }
            Pattern::TypeTest { ty, capture, next } => {
                // The capture is written before the test; on failure the updated
                // accumulator is simply dropped.
                let accumulator = match capture {
                    Some(name) => with_field(&accumulator, name, subject.clone())?,
                    None => accumulator,
                };
                if ty.test(subject) {
                    self.eval(next, accumulator, subject, depth + 1)
                } else {
                    Ok(None)
                }
            }
            Pattern::Bind { bindings, next } => {
                let accumulator = self.bind(bindings, accumulator, subject)?;
                self.eval(next, accumulator, subject, depth + 1)
            }
            Pattern::Redirect { name, next } => {
                let target = get_field(&accumulator, name)?;
                self.eval(next, accumulator, &target, depth + 1)
            }
            Pattern::Or(or) => self.eval_or(or, accumulator, subject, depth),
        }
    }

    fn bind(&self, bindings: &[Binding], accumulator: Value, subject: &Value) -> MatchResult<Value> {
        let tuple = decompose(subject)?;
        bindings.iter().try_fold(accumulator, |accumulator, binding| {
            let value = get_field(&tuple, &binding.source)?;
            with_field(&accumulator, &binding.destination, value)
        })
    }

    fn eval_or(
        &self,
        or: &OrPattern,
        accumulator: Value,
        subject: &Value,
        depth: usize,
    ) -> MatchResult<Option<Value>> {
        if subject.is_null() {
            return match or.null_case.as_ref().or(or.default_case.as_ref()) {
                Some(case) => self.eval(case, accumulator, &Value::NULL, depth + 1),
                None => Err(MatchError::NullSubject {
                    context: "no null or default case",
                }),
            };
        }

        for (position, case) in or.cases.iter().enumerate() {
            if let Some(result) = self.eval(case, accumulator.clone(), subject, depth + 1)? {
                trace!("Case {} matched a subject of type `{}`.", position, subject.type_name());
                return Ok(Some(result));
            }
        }

        match &or.default_case {
            Some(case) => self.eval(case, accumulator, subject, depth + 1),
            None => Err(StructuralMismatch::NoAlternative {
                type_name: subject.type_name(),
            }
            .into()),
        }
    }
}
