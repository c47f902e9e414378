//! Prelude module for convenient imports.
//!
//! ```rust
//! use nebula_outcome::prelude::*;
//!
//! let outcome: Outcome<u32> = Outcome::from(Ok::<_, OutcomeError>(1));
//! assert!(outcome.is_ok());
//! ```

pub use crate::error::{ConfigError, OutcomeError};
pub use crate::outcome::Outcome;
pub use crate::recover::{PanicError, PanicLocation, Recovery, RecoveryConfig};
