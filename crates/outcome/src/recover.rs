//! Panic capture for guarded callbacks
//!
//! A [`Recovery`] runs exactly one closure inside a scoped guard. If the
//! closure panics, the unwind stops at the guard and the panic is returned as
//! a [`PanicError`] carrying the payload message, the panic site and,
//! optionally, a backtrace.
//!
//! The panic site is only known inside the panic hook, so the first guard
//! installs a process-wide hook that records it into thread-local storage.
//! The hook only acts while the panicking thread is inside a guard; every
//! other panic is forwarded to the hook that was installed before.

use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Once, OnceLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::error::ConfigError;

const UNKNOWN_PANIC: &str = "unknown panic";

/// A panic captured by a [`Recovery`] guard
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("panicked: {message}{}", location_suffix(.location.as_ref()))]
pub struct PanicError {
    /// Panic payload rendered as text
    pub message: String,
    /// Where the panic was raised
    pub location: Option<PanicLocation>,
    /// Backtrace taken at the panic site, when enabled
    pub backtrace: Option<String>,
    /// Name of the panicking thread
    pub thread: Option<String>,
}

impl PanicError {
    /// Create a panic error with only a message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
            backtrace: None,
            thread: None,
        }
    }

    /// Get the panic message
    #[inline]
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the panic site
    #[inline]
    #[must_use]
    pub fn location(&self) -> Option<&PanicLocation> {
        self.location.as_ref()
    }

    /// Get the rendered backtrace
    #[inline]
    #[must_use]
    pub fn backtrace(&self) -> Option<&str> {
        self.backtrace.as_deref()
    }

    fn from_payload(payload: &(dyn Any + Send), site: Option<PanicSite>, max_len: usize) -> Self {
        // Re-raised captures keep the site of the first panic.
        if let Some(existing) = payload.downcast_ref::<Self>() {
            return existing.clone();
        }

        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_owned()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            UNKNOWN_PANIC.to_owned()
        };

        let (location, backtrace) = match site {
            Some(site) => (site.location, site.backtrace),
            None => (None, None),
        };

        Self {
            message: truncate(message, max_len),
            location,
            backtrace,
            thread: std::thread::current().name().map(str::to_owned),
        }
    }
}

fn location_suffix(location: Option<&PanicLocation>) -> String {
    location.map_or_else(String::new, |location| format!(" at {location}"))
}

/// Source location of a panic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanicLocation {
    /// Source file
    pub file: String,
    /// Line number
    pub line: u32,
    /// Column number
    pub column: u32,
}

impl From<&panic::Location<'_>> for PanicLocation {
    fn from(location: &panic::Location<'_>) -> Self {
        Self {
            file: location.file().to_owned(),
            line: location.line(),
            column: location.column(),
        }
    }
}

impl fmt::Display for PanicLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Recovery facility configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryConfig {
    /// Capture a backtrace at the panic site
    pub capture_backtrace: bool,

    /// Suppress the default panic report for captured panics
    pub silence_hook: bool,

    /// Emit a warning event for every captured panic
    pub log_captured: bool,

    /// Longest panic message kept, in bytes
    pub max_message_len: usize,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            capture_backtrace: false,
            silence_hook: true,
            log_captured: true,
            max_message_len: 4096,
        }
    }
}

impl RecoveryConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set backtrace capture
    pub fn with_backtrace(mut self, capture: bool) -> Self {
        self.capture_backtrace = capture;
        self
    }

    /// Set whether captured panics reach the previous panic hook
    pub fn with_silence_hook(mut self, silence: bool) -> Self {
        self.silence_hook = silence;
        self
    }

    /// Set warning events for captured panics
    pub fn with_logging(mut self, log: bool) -> Self {
        self.log_captured = log;
        self
    }

    /// Set the message length limit
    pub fn with_max_message_len(mut self, max_message_len: usize) -> Self {
        self.max_message_len = max_message_len;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_message_len == 0 {
            return Err(ConfigError::invalid(
                "max_message_len must be greater than 0",
            ));
        }
        Ok(())
    }

    fn hook_policy(&self) -> HookPolicy {
        HookPolicy {
            capture_backtrace: self.capture_backtrace,
            silence_hook: self.silence_hook,
        }
    }
}

/// Scoped panic guard
#[derive(Debug, Clone, Default)]
pub struct Recovery {
    config: RecoveryConfig,
}

impl Recovery {
    /// Create a recovery facility from a validated configuration
    pub fn new(config: RecoveryConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Get the configuration
    #[must_use]
    pub fn config(&self) -> &RecoveryConfig {
        &self.config
    }

    /// Run `f`, returning its panic as an error instead of unwinding
    ///
    /// The guard covers this single call only. Panics raised on other threads
    /// spawned by `f` are not captured.
    ///
    /// The panic hook cannot be replaced while the thread unwinds, so a first
    /// call made from a destructor during a panic captures the payload without
    /// its panic site.
    pub fn catch<R>(&self, f: impl FnOnce() -> R) -> Result<R, PanicError> {
        if !std::thread::panicking() {
            install_hook();
        }

        let scope = GuardScope::enter(self.config.hook_policy());
        let result = panic::catch_unwind(AssertUnwindSafe(f));
        drop(scope);

        result.map_err(|payload| {
            let site = CAPTURED.take();
            let error =
                PanicError::from_payload(payload.as_ref(), site, self.config.max_message_len);

            if self.config.log_captured {
                warn!(
                    panic_message = %error.message,
                    location = ?error.location.as_ref().map(ToString::to_string),
                    thread = ?error.thread,
                    "captured panic in guarded callback"
                );
            }

            error
        })
    }
}

static GLOBAL: OnceLock<Recovery> = OnceLock::new();

/// Install the process-wide recovery configuration
///
/// Must run before the first guarded operator uses [`global`]; afterwards
/// the process-wide facility is fixed.
pub fn install(config: RecoveryConfig) -> Result<(), ConfigError> {
    let recovery = Recovery::new(config)?;
    GLOBAL
        .set(recovery)
        .map_err(|_| ConfigError::AlreadyInstalled)
}

/// Process-wide recovery facility used by the chaining operators
pub fn global() -> &'static Recovery {
    GLOBAL.get_or_init(Recovery::default)
}

#[derive(Debug, Clone, Copy)]
struct HookPolicy {
    capture_backtrace: bool,
    silence_hook: bool,
}

struct PanicSite {
    location: Option<PanicLocation>,
    backtrace: Option<String>,
}

thread_local! {
    static ACTIVE: Cell<Option<HookPolicy>> = const { Cell::new(None) };
    static CAPTURED: RefCell<Option<PanicSite>> = const { RefCell::new(None) };
}

/// Marks the current thread as inside a guard until dropped
struct GuardScope {
    previous: Option<HookPolicy>,
}

impl GuardScope {
    fn enter(policy: HookPolicy) -> Self {
        CAPTURED.set(None);
        let previous = ACTIVE.replace(Some(policy));
        Self { previous }
    }
}

impl Drop for GuardScope {
    fn drop(&mut self) {
        ACTIVE.set(self.previous);
    }
}

fn install_hook() {
    static HOOK: Once = Once::new();

    HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let policy = ACTIVE.try_with(Cell::get).ok().flatten();
            let Some(policy) = policy else {
                previous(info);
                return;
            };

            let site = PanicSite {
                location: info.location().map(PanicLocation::from),
                backtrace: policy
                    .capture_backtrace
                    .then(|| Backtrace::force_capture().to_string()),
            };
            let _ = CAPTURED.try_with(|captured| {
                if let Ok(mut slot) = captured.try_borrow_mut() {
                    *slot = Some(site);
                }
            });

            if !policy.silence_hook {
                previous(info);
            }
        }));
    });
}

fn truncate(mut message: String, max_len: usize) -> String {
    if message.len() > max_len {
        let mut end = max_len;
        while !message.is_char_boundary(end) {
            end -= 1;
        }
        message.truncate(end);
    }
    message
}
