//! # nebula-outcome
//!
//! A value-based success-or-error container for fallible pipelines.
//!
//! ## Quick Start
//!
//! ```rust
//! use nebula_outcome::prelude::*;
//!
//! let doubled = Outcome::<i32>::ok(5).then(|x| Some(Outcome::ok(x * 2)));
//! assert_eq!(doubled.unwrap(), 10);
//!
//! // A panicking step becomes an ordinary failure
//! let broken = Outcome::<i32>::ok(5).then(|_| panic!("boom"));
//! assert!(!broken.is_ok());
//! ```
//!
//! ## Chaining
//!
//! - [`accept`](Outcome::accept), [`then`](Outcome::then),
//!   [`map`](Outcome::map), [`and_then`](Outcome::and_then): run on success,
//!   panics in the callback are captured as failures
//! - [`success`](Outcome::success): run on success, panics propagate
//! - [`fail`](Outcome::fail): run on failure, panics propagate
//!
//! Failures short-circuit every success-side operator and still reach
//! [`fail`](Outcome::fail) handlers.
//!
//! ## Panic capture
//!
//! Guarded operators use the process-wide [`Recovery`] returned by
//! [`recover::global`]. Call [`recover::install`] at startup to change its
//! [`RecoveryConfig`], or pass an explicit facility to
//! [`accept_with`](Outcome::accept_with) / [`then_with`](Outcome::then_with).

pub mod error;
pub mod outcome;
pub mod prelude;
pub mod recover;

pub use error::{ConfigError, OutcomeError};
pub use outcome::Outcome;
pub use recover::{PanicError, PanicLocation, Recovery, RecoveryConfig};
