//! Guarded operators called from a destructor while the thread unwinds
//!
//! Kept in its own test binary: the first guard in this process must run
//! during the unwind, before any other test has installed the panic hook.

use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};

use nebula_outcome::prelude::*;

static CLEANUP_SUCCEEDED: AtomicBool = AtomicBool::new(false);

struct Cleanup;

impl Drop for Cleanup {
    fn drop(&mut self) {
        let outcome = Outcome::<i32>::capture(|| 1)
            .accept(|_| {})
            .then(|x| Some(Outcome::ok(x + 1)));
        CLEANUP_SUCCEEDED.store(outcome == Outcome::ok(2), Ordering::SeqCst);
    }
}

#[test]
fn first_guard_during_unwind_does_not_abort() {
    let result = panic::catch_unwind(|| {
        let _cleanup = Cleanup;
        panic!("outer")
    });

    assert!(result.is_err());
    assert!(CLEANUP_SUCCEEDED.load(Ordering::SeqCst));

    // Later guards still install the hook and record the panic site.
    let outcome = Outcome::<i32>::ok(1).then(|_| panic!("after"));
    let error = outcome.into_error().expect("panic captured");
    let panic = error.as_panic().expect("captured panic variant");
    assert_eq!(panic.message(), "after");
    assert!(panic.location().is_some());
}
