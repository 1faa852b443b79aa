//! Values that may be fixed or computed on demand.
//!
//! A `Computable<T>` is read through [`Computable::get`], which evaluates a
//! deferred computation on every call. Nothing is cached between reads, so a
//! condition like "enabled once the player has 10 points" always reflects the
//! current state.

use std::fmt;
use std::rc::Rc;

pub enum Computable<T> {
    /// A plain value, cloned out on each read
    Value(T),
    /// A computation re-run on each read
    Deferred(Rc<dyn Fn() -> T>),
}

impl<T: Clone> Computable<T> {
    pub fn value(value: T) -> Self {
        Computable::Value(value)
    }

    pub fn deferred(f: impl Fn() -> T + 'static) -> Self {
        Computable::Deferred(Rc::new(f))
    }

    /// Current value of the field.
    pub fn get(&self) -> T {
        match self {
            Computable::Value(value) => value.clone(),
            Computable::Deferred(f) => f(),
        }
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, Computable::Deferred(_))
    }

    /// Use `field` when present, otherwise a literal `default`.
    pub fn default_if_absent(field: Option<Computable<T>>, default: T) -> Self {
        field.unwrap_or(Computable::Value(default))
    }
}

impl<T: Clone> Clone for Computable<T> {
    fn clone(&self) -> Self {
        match self {
            Computable::Value(value) => Computable::Value(value.clone()),
            Computable::Deferred(f) => Computable::Deferred(Rc::clone(f)),
        }
    }
}

impl<T> From<T> for Computable<T> {
    fn from(value: T) -> Self {
        Computable::Value(value)
    }
}

impl From<&str> for Computable<String> {
    fn from(value: &str) -> Self {
        Computable::Value(value.to_string())
    }
}

impl<T: fmt::Debug> fmt::Debug for Computable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Computable::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Computable::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}
