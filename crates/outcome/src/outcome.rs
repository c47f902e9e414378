//! The [`Outcome`] container and its chaining operators

use std::fmt;

use tracing::{debug, trace};

use crate::error::OutcomeError;
use crate::recover::{self, PanicError, Recovery};

const UNWRAP_FAILED: &str = "unwrapping failed result";

/// Success payload or failure error, never both
///
/// An `Outcome` is built in one step by [`Outcome::ok`], [`Outcome::failed`]
/// or one of the adapters, and never changes afterwards: every chaining
/// operator consumes it and hands back an outcome, either the same one or a
/// replacement.
///
/// [`accept`](Outcome::accept), [`then`](Outcome::then),
/// [`map`](Outcome::map) and [`and_then`](Outcome::and_then) run their
/// callback under a panic guard, so a panicking callback turns into a failed
/// outcome instead of unwinding through the caller.
/// [`success`](Outcome::success) and [`fail`](Outcome::fail) do not guard
/// their callback.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[must_use]
pub struct Outcome<T, E = OutcomeError> {
    repr: Repr<T, E>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Repr<T, E> {
    Success(T),
    Failure(E),
}

impl<T, E> Outcome<T, E> {
    /// Create a successful outcome
    #[inline]
    pub fn ok(value: T) -> Self {
        Self {
            repr: Repr::Success(value),
        }
    }

    /// Create a failed outcome
    #[inline]
    pub fn failed(error: E) -> Self {
        Self {
            repr: Repr::Failure(error),
        }
    }

    /// Check if this outcome holds a payload
    #[inline]
    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self.repr, Repr::Success(_))
    }

    /// Check if this outcome holds an error
    #[inline]
    #[must_use]
    pub fn is_failed(&self) -> bool {
        !self.is_ok()
    }

    /// Borrow the payload
    #[must_use]
    pub fn value(&self) -> Option<&T> {
        match &self.repr {
            Repr::Success(value) => Some(value),
            Repr::Failure(_) => None,
        }
    }

    /// Take the payload
    ///
    /// # Panics
    ///
    /// Panics with `"unwrapping failed result"` if the outcome failed. Only
    /// call this where success is already established.
    #[track_caller]
    pub fn unwrap(self) -> T {
        match self.repr {
            Repr::Success(value) => value,
            Repr::Failure(_) => panic!("{UNWRAP_FAILED}"),
        }
    }

    /// Take the payload, or `default` if the outcome failed
    pub fn unwrap_or(self, default: T) -> T {
        match self.repr {
            Repr::Success(value) => value,
            Repr::Failure(_) => default,
        }
    }

    /// Take the payload, or `T::default()` if the outcome failed
    pub fn unwrap_or_default(self) -> T
    where
        T: Default,
    {
        self.unwrap_or(T::default())
    }

    /// Take the payload
    ///
    /// # Panics
    ///
    /// Panics with exactly `msg` if the outcome failed.
    #[track_caller]
    pub fn unwrap_or_panic(self, msg: &str) -> T {
        match self.repr {
            Repr::Success(value) => value,
            Repr::Failure(_) => panic!("{msg}"),
        }
    }

    /// Split into a `(value, error)` pair with exactly one side set
    pub fn unwrap_classic(self) -> (Option<T>, Option<E>) {
        match self.repr {
            Repr::Success(value) => (Some(value), None),
            Repr::Failure(error) => (None, Some(error)),
        }
    }

    /// Borrow the error, `None` on success
    #[must_use]
    pub fn unwrap_error(&self) -> Option<&E> {
        match &self.repr {
            Repr::Success(_) => None,
            Repr::Failure(error) => Some(error),
        }
    }

    /// Take the error, `None` on success
    pub fn into_error(self) -> Option<E> {
        match self.repr {
            Repr::Success(_) => None,
            Repr::Failure(error) => Some(error),
        }
    }

    /// Convert into a standard `Result`
    pub fn into_result(self) -> Result<T, E> {
        match self.repr {
            Repr::Success(value) => Ok(value),
            Repr::Failure(error) => Err(error),
        }
    }

    /// Run `f` if the outcome succeeded, then return the outcome unchanged
    ///
    /// A panic in `f` is not captured and propagates to the caller.
    pub fn success(self, f: impl FnOnce()) -> Self {
        if self.is_ok() {
            f();
        }
        self
    }

    /// Run `f` with the error if the outcome failed, then return the outcome
    /// unchanged
    ///
    /// A panic in `f` is not captured and propagates to the caller.
    pub fn fail(self, f: impl FnOnce(&E)) -> Self {
        if let Repr::Failure(ref error) = self.repr {
            f(error);
        }
        self
    }
}

impl<E> Outcome<(), E> {
    /// Adapt a classic optional error: `None` succeeds, `Some` fails
    pub fn from_error(error: Option<E>) -> Self {
        match error {
            None => Self::ok(()),
            Some(error) => Self::failed(error),
        }
    }
}

impl<T, E> Outcome<T, E>
where
    E: From<PanicError>,
{
    /// Run `f`, turning a panic into a failed outcome
    pub fn capture(f: impl FnOnce() -> T) -> Self {
        match recover::global().catch(f) {
            Ok(value) => Self::ok(value),
            Err(panic) => Self::captured(panic),
        }
    }

    /// Inspect the payload with `f`
    ///
    /// Returns the outcome unchanged when `f` returns normally or when the
    /// outcome already failed. If `f` panics, the payload is dropped and a
    /// failed outcome carrying the panic is returned instead.
    pub fn accept(self, f: impl FnOnce(&T)) -> Self {
        self.accept_with(recover::global(), f)
    }

    /// [`accept`](Self::accept) with an explicit recovery facility
    pub fn accept_with(self, recovery: &Recovery, f: impl FnOnce(&T)) -> Self {
        let Repr::Success(ref value) = self.repr else {
            return self;
        };

        match recovery.catch(|| f(value)) {
            Ok(()) => self,
            Err(panic) => Self::captured(panic),
        }
    }

    /// Monadic bind
    ///
    /// On success `f` receives the payload: `Some(next)` replaces this
    /// outcome, `None` keeps it. A panic in `f` yields a failed outcome
    /// carrying the panic. A failed outcome passes through and `f` never
    /// runs.
    pub fn then(self, f: impl FnOnce(&T) -> Option<Self>) -> Self {
        self.then_with(recover::global(), f)
    }

    /// [`then`](Self::then) with an explicit recovery facility
    pub fn then_with(self, recovery: &Recovery, f: impl FnOnce(&T) -> Option<Self>) -> Self {
        let Repr::Success(ref value) = self.repr else {
            return self;
        };

        match recovery.catch(|| f(value)) {
            Ok(Some(next)) => next,
            Ok(None) => {
                trace!("continuation declined, keeping current outcome");
                self
            }
            Err(panic) => Self::captured(panic),
        }
    }

    /// Transform the payload, guarding `f` like [`then`](Self::then)
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U, E> {
        match self.repr {
            Repr::Success(value) => match recover::global().catch(|| f(value)) {
                Ok(mapped) => Outcome::ok(mapped),
                Err(panic) => Outcome::captured(panic),
            },
            Repr::Failure(error) => Outcome::failed(error),
        }
    }

    /// Type-changing bind, guarding `f` like [`then`](Self::then)
    pub fn and_then<U>(self, f: impl FnOnce(T) -> Outcome<U, E>) -> Outcome<U, E> {
        match self.repr {
            Repr::Success(value) => match recover::global().catch(|| f(value)) {
                Ok(next) => next,
                Err(panic) => Outcome::captured(panic),
            },
            Repr::Failure(error) => Outcome::failed(error),
        }
    }

    fn captured(panic: PanicError) -> Self {
        debug!(error = %panic, "folding captured panic into failed outcome");
        Self::failed(E::from(panic))
    }
}

impl<T, E> From<Result<T, E>> for Outcome<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::ok(value),
            Err(error) => Self::failed(error),
        }
    }
}

impl<T, E> From<Outcome<T, E>> for Result<T, E> {
    fn from(outcome: Outcome<T, E>) -> Self {
        outcome.into_result()
    }
}

/// Diagnostic rendering: payload type and success flag, never the payload itself
impl<T, E> fmt::Display for Outcome<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#outcome[{}]{{has: {}}}",
            std::any::type_name::<T>(),
            self.is_ok()
        )
    }
}
