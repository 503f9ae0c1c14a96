//! Capability-driven radio transceiver control.
//!
//! A [`Rig`] is a session on one rig model. The model's [`RigCaps`] descriptor, looked up once
//! in the [`registry`], declares what the rig can do and carries the constructor of the
//! backend that talks to the hardware. Every session operation dispatches through that
//! backend and records its outcome in the session's status channel.
//!
//! The [`locator`] module holds the stateless geodetic helpers (Maidenhead locators,
//! great-circle distance and bearing, sexagesimal conversion).
mod args;
pub use args::Args;

pub mod caps;
pub use caps::PortType;
pub use caps::RigCaps;
pub use caps::RigModel;
pub use caps::RigStatus;

pub mod conf;
pub use conf::ConfKey;
pub use conf::ConfValue;
pub use conf::Token;

pub mod impls;
pub mod locator;
pub mod misc;
pub mod morse;

mod port;
pub use port::PortSettings;

mod range;
pub use range::Range;
pub use range::RangeItem;

pub mod registry;

mod rig;
pub use rig::Rig;
pub use rig::RigBackend;
pub use rig::VfoState;

mod types;
pub use types::*;

use thiserror::Error;

/// Rigctl Error
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum Error {
    #[error("Unknown rig model")]
    UnknownModel,
    #[error("Feature not available")]
    NotSupported,
    #[error("Rig is not open")]
    NotOpen,
    #[error("Invalid parameter")]
    InvalidParameter,
    #[error("Parameter type mismatch")]
    TypeMismatch,
    #[error("Backend initialization failed")]
    BackendInitFailed,
    #[error("Argument out of domain of func")]
    OutOfRange,
    #[error("Invalid Maidenhead locator")]
    InvalidLocator,
    #[error("Invalid VFO")]
    InvalidVfo,
    #[error("Communication timed out")]
    Timeout,
    #[error("IO error")]
    Io,
}

/// Outcome of the most recent session call.
pub type Status = Result<(), Error>;

/// Status code reported for success.
pub const STATUS_OK: i32 = 0;

impl Error {
    const ALL: [Error; 11] = [
        Error::InvalidParameter,
        Error::TypeMismatch,
        Error::NotSupported,
        Error::Timeout,
        Error::Io,
        Error::BackendInitFailed,
        Error::NotOpen,
        Error::UnknownModel,
        Error::OutOfRange,
        Error::InvalidLocator,
        Error::InvalidVfo,
    ];

    /// Stable negative status code.
    pub fn code(&self) -> i32 {
        match self {
            Error::InvalidParameter => -1,
            Error::TypeMismatch => -2,
            Error::NotSupported => -4,
            Error::Timeout => -5,
            Error::Io => -6,
            Error::BackendInitFailed => -7,
            Error::NotOpen => -9,
            Error::UnknownModel => -12,
            Error::OutOfRange => -17,
            Error::InvalidLocator => -18,
            Error::InvalidVfo => -16,
        }
    }

    /// Inverse of [`Error::code`]. `None` for [`STATUS_OK`] and unknown codes.
    pub fn from_code(code: i32) -> Option<Error> {
        Self::ALL.into_iter().find(|e| e.code() == code)
    }
}

/// Status code of a [`Status`].
pub fn status_code(status: &Status) -> i32 {
    match status {
        Ok(()) => STATUS_OK,
        Err(e) => e.code(),
    }
}

/// Human-readable text for a status code.
pub fn status_to_string(code: i32) -> &'static str {
    if code == STATUS_OK {
        return "Command completed successfully";
    }
    match Error::from_code(code) {
        Some(Error::UnknownModel) => "Unknown rig model",
        Some(Error::NotSupported) => "Feature not available",
        Some(Error::NotOpen) => "Rig is not open",
        Some(Error::InvalidParameter) => "Invalid parameter",
        Some(Error::TypeMismatch) => "Parameter type mismatch",
        Some(Error::BackendInitFailed) => "Backend initialization failed",
        Some(Error::OutOfRange) => "Argument out of domain of func",
        Some(Error::InvalidLocator) => "Invalid Maidenhead locator",
        Some(Error::InvalidVfo) => "Invalid VFO",
        Some(Error::Timeout) => "Communication timed out",
        Some(Error::Io) => "IO error",
        None => "Unknown error code",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_unique_and_invertible() {
        for e in Error::ALL {
            assert!(e.code() < 0);
            assert_eq!(Error::from_code(e.code()), Some(e));
        }
        assert_eq!(Error::from_code(STATUS_OK), None);
        assert_eq!(Error::from_code(-1000), None);
    }

    #[test]
    fn status_strings() {
        assert_eq!(status_code(&Ok(())), 0);
        assert_eq!(status_to_string(0), "Command completed successfully");
        assert_eq!(
            status_to_string(Error::NotOpen.code()),
            Error::NotOpen.to_string()
        );
        assert_eq!(status_to_string(42), "Unknown error code");
    }
}
