//! The library's single error type.
//!
//! Every fallible operation in `desflow-core` returns [`Result<T>`]. Each
//! variant of [`Error`] carries the numeric id from `spec.md` §6.6 so that a
//! CLI front end can map failures to process exit codes, and a short message
//! for humans. This mirrors the teacher's `cranelift-reader::ParseError`
//! (location + message) generalized to the handful of error shapes the two
//! algorithmic cores actually raise.

use core::fmt;

/// Numeric error id, matching `spec.md` §6.6's representative list.
pub type ErrorId = u32;

pub const E_IO_OPEN: ErrorId = 1;
pub const E_IO_WRITE: ErrorId = 2;
pub const E_TOKEN_MISMATCH: ErrorId = 50;
pub const E_INDEX_OUT_OF_RANGE: ErrorId = 62;
pub const E_ELEMENT_TYPE_MISMATCH: ErrorId = 63;
pub const E_UNKNOWN_STATE: ErrorId = 89;
pub const E_UNKNOWN_STATE_NAME: ErrorId = 90;
pub const E_INVALID_PRE_PARTITION: ErrorId = 100;
pub const E_CANCELLED: ErrorId = 110;
pub const E_PARSER_INPUT: ErrorId = 200;
pub const E_TAU_LOOP: ErrorId = 500;
pub const E_INDEX_OVERFLOW: ErrorId = 600;
pub const E_INVARIANT_VIOLATION: ErrorId = 1001;

/// A library error: a numeric id (stable across releases, for scripting)
/// plus a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    id: ErrorId,
    message: String,
}

impl Error {
    /// Build an error from an id and a message.
    pub fn new(id: ErrorId, message: impl Into<String>) -> Self {
        Self {
            id,
            message: message.into(),
        }
    }

    /// The numeric id, for mapping to an exit code or a scripted check.
    pub fn id(&self) -> ErrorId {
        self.id
    }

    /// Is this the cooperative-cancellation error?
    pub fn is_cancelled(&self) -> bool {
        self.id == E_CANCELLED
    }

    pub fn io_open(path: impl fmt::Display, cause: impl fmt::Display) -> Self {
        Self::new(E_IO_OPEN, format!("cannot open {path}: {cause}"))
    }

    pub fn io_write(path: impl fmt::Display, cause: impl fmt::Display) -> Self {
        Self::new(E_IO_WRITE, format!("cannot write {path}: {cause}"))
    }

    pub fn token_mismatch(expected: impl fmt::Display, found: impl fmt::Display) -> Self {
        Self::new(
            E_TOKEN_MISMATCH,
            format!("expected {expected}, found {found}"),
        )
    }

    pub fn unknown_state(what: impl fmt::Display) -> Self {
        Self::new(E_UNKNOWN_STATE, format!("unknown state: {what}"))
    }

    pub fn unknown_state_name(name: impl fmt::Display) -> Self {
        Self::new(E_UNKNOWN_STATE_NAME, format!("unknown state name: {name}"))
    }

    pub fn invalid_pre_partition(detail: impl fmt::Display) -> Self {
        Self::new(E_INVALID_PRE_PARTITION, format!("invalid pre-partition: {detail}"))
    }

    pub fn cancelled() -> Self {
        Self::new(E_CANCELLED, "operation cancelled")
    }

    pub fn tau_loop() -> Self {
        Self::new(E_TAU_LOOP, "silent-event cycle detected")
    }

    pub fn invariant(detail: impl fmt::Display) -> Self {
        Self::new(E_INVARIANT_VIOLATION, format!("invariant violated: {detail}"))
    }

    pub fn index_overflow(detail: impl fmt::Display) -> Self {
        Self::new(E_INDEX_OVERFLOW, format!("index overflow: {detail}"))
    }

    pub fn parser_input(detail: impl fmt::Display) -> Self {
        Self::new(E_PARSER_INPUT, format!("parser input error: {detail}"))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}] {}", self.id, self.message)
    }
}

impl std::error::Error for Error {}

/// Result alias used throughout the core crate.
pub type Result<T> = core::result::Result<T, Error>;
