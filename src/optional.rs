//! A two-variant presence container used at the edges of a pipeline.
//!
//! Callers wrap stage functions that may fail so a missing element
//! yields [`Optional::Nothing`] instead of aborting a traversal. The
//! stream core itself never produces these; accessors like
//! `Row::get_opt` and `Stream::first_opt` do.

use anyhow::{anyhow, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Optional<T> {
    Some(T),
    Nothing,
}

impl<T> Optional<T> {
    pub fn is_some(&self) -> bool {
        matches!(self, Optional::Some(_))
    }

    pub fn is_nothing(&self) -> bool {
        matches!(self, Optional::Nothing)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Optional<U> {
        match self {
            Optional::Some(value) => Optional::Some(f(value)),
            Optional::Nothing => Optional::Nothing,
        }
    }

    pub fn then<U>(self, f: impl FnOnce(T) -> Optional<U>) -> Optional<U> {
        match self {
            Optional::Some(value) => f(value),
            Optional::Nothing => Optional::Nothing,
        }
    }

    pub fn value_or(self, default: T) -> T {
        match self {
            Optional::Some(value) => value,
            Optional::Nothing => default,
        }
    }

    /// Treat absence as an error, for callers that consider the value
    /// mandatory.
    pub fn required(self, what: &str) -> Result<T> {
        match self {
            Optional::Some(value) => Ok(value),
            Optional::Nothing => Err(anyhow!("missing {}", what)),
        }
    }

    pub fn into_option(self) -> Option<T> {
        self.into()
    }
}

impl<T> From<Option<T>> for Optional<T> {
    fn from(option: Option<T>) -> Self {
        match option {
            Some(value) => Optional::Some(value),
            None => Optional::Nothing,
        }
    }
}

impl<T> From<Optional<T>> for Option<T> {
    fn from(optional: Optional<T>) -> Self {
        match optional {
            Optional::Some(value) => Some(value),
            Optional::Nothing => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_map_and_then() {
        let some = Optional::Some(2);
        assert_eq!(some.map(|n| n * 2), Optional::Some(4));
        assert_eq!(
            some.then(|n| if n > 1 { Optional::Some(n) } else { Optional::Nothing }),
            Optional::Some(2)
        );

        let nothing: Optional<i64> = Optional::Nothing;
        assert_eq!(nothing.map(|n| n * 2), Optional::Nothing);
    }

    #[test]
    fn test_value_or_and_required() {
        assert_eq!(Optional::Some(1).value_or(9), 1);
        assert_eq!(Optional::<i64>::Nothing.value_or(9), 9);
        assert!(Optional::<i64>::Nothing.required("count").is_err());
    }

    #[test]
    fn test_option_round_trip() {
        assert_eq!(Optional::from(Some(1)), Optional::Some(1));
        assert_eq!(Optional::<i64>::from(None).into_option(), None);
    }
}
