//! Integration tests for chained pipelines
//!
//! Exercises full operator chains the way calling code builds them:
//! - declared failures short-circuiting success-side steps
//! - panics folded into failures at the step that raised them
//! - `fail` handlers observing the final error

use std::cell::RefCell;

use nebula_outcome::prelude::*;
use pretty_assertions::assert_eq;

fn err(message: &str) -> OutcomeError {
    OutcomeError::message(message)
}

#[test]
fn doubling_pipeline() {
    let result = Outcome::<i32>::ok(5).then(|x| Some(Outcome::ok(x * 2))).unwrap();
    assert_eq!(result, 10);
}

#[test]
fn panicking_step_becomes_failure() {
    let outcome = Outcome::<i32>::ok(5).then(|_| panic!("boom"));

    assert!(!outcome.is_ok());
    let error = outcome.unwrap_error().expect("failed outcome carries an error");
    assert!(error.to_string().contains("boom"));
    assert_eq!(error.as_panic().map(PanicError::message), Some("boom"));
}

#[test]
fn declared_failure_skips_then() {
    let ran = RefCell::new(false);
    let outcome = Outcome::<i32>::failed(err("no")).then(|x| {
        *ran.borrow_mut() = true;
        Some(Outcome::ok(x * 2))
    });

    assert!(!*ran.borrow());
    assert_eq!(outcome.unwrap_error(), Some(&err("no")));
}

#[test]
fn failure_short_circuits_and_reaches_fail_handler() {
    let log = RefCell::new(Vec::new());

    let outcome = Outcome::<i32>::ok(1)
        .then(|x| Some(Outcome::ok(x + 1)))
        .accept(|x| log.borrow_mut().push(format!("accept {x}")))
        .then(|_| Some(Outcome::failed(err("quota exceeded"))))
        .accept(|_| log.borrow_mut().push("accept after failure".into()))
        .success(|| log.borrow_mut().push("success after failure".into()))
        .then(|x| Some(Outcome::ok(x * 100)))
        .fail(|e| log.borrow_mut().push(format!("fail {e}")));

    assert_eq!(
        log.into_inner(),
        vec!["accept 2".to_owned(), "fail quota exceeded".to_owned()]
    );
    assert_eq!(outcome.into_error(), Some(err("quota exceeded")));
}

#[test]
fn captured_panic_is_localized_to_its_step() {
    let log = RefCell::new(Vec::new());

    let outcome = Outcome::<Vec<u8>>::ok(vec![1, 2, 3])
        .accept(|bytes| {
            assert!(bytes.len() > 10, "payload too short");
        })
        .then(|_| {
            log.borrow_mut().push("then after panic");
            None
        })
        .fail(|e| {
            assert!(e.is_panic());
            log.borrow_mut().push("fail");
        });

    assert_eq!(log.into_inner(), vec!["fail"]);
    assert!(outcome.is_failed());
}

#[test]
fn declining_step_keeps_state() {
    let outcome = Outcome::<String>::ok("config".into())
        .then(|_| None)
        .then(|s| s.is_empty().then(|| Outcome::failed(err("empty"))));

    assert_eq!(outcome, Outcome::ok("config".to_owned()));
}

#[test]
fn classic_interop() {
    fn load(path: &str) -> Result<String, std::io::Error> {
        Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{path} not found"),
        ))
    }

    let outcome: Outcome<String> = load("nebula.toml").map_err(OutcomeError::external).into();
    let (value, error) = outcome.unwrap_classic();

    assert_eq!(value, None);
    assert_eq!(error.map(|e| e.to_string()), Some("nebula.toml not found".to_owned()));

    let write_error: Option<OutcomeError> = None;
    assert!(Outcome::from_error(write_error).is_ok());
}

#[test]
fn type_changing_pipeline() {
    let total = Outcome::<&str>::ok("3,4,5")
        .map(|csv| csv.split(',').map(str::to_owned).collect::<Vec<_>>())
        .and_then(|parts| {
            let sum = parts.iter().map(|p| p.parse::<u32>()).sum::<Result<u32, _>>();
            Outcome::from(sum.map_err(OutcomeError::external))
        })
        .unwrap_or(0);

    assert_eq!(total, 12);
}

#[test]
fn caller_observes_normal_return_after_capture() {
    let outcome = Outcome::<i32>::ok(1).accept(|_| panic!("inside accept"));
    assert!(outcome.is_failed());
}

#[test]
fn panic_on_spawned_thread_is_not_captured() {
    let mut worker_panicked = None;
    let outcome = Outcome::<i32>::ok(1).then(|_| {
        let handle = std::thread::spawn(|| panic!("worker"));
        worker_panicked = Some(handle.join().is_err());
        None
    });

    assert!(outcome.is_ok());
    assert_eq!(worker_panicked, Some(true));
}
