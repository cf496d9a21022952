//! Crate-wide error type and the `err_at!` construction macro.

use std::{fmt, result};

/// Every fallible operation in this crate returns this.
pub type Result<T> = result::Result<T, Error>;

/// One location-tagged variant per failure kind this core can surface.
///
/// Each variant carries a single string: a `file:line` prefix glued to a
/// formatted message, produced by [`err_at`](crate::err_at) at the call
/// site that detected the failure. Constructing a variant by hand (rather
/// than through the macro) loses the location tag and should not happen
/// outside this module.
#[derive(Clone, Eq, PartialEq)]
pub enum Error {
    /// Low-level read/write failure, or EOF encountered mid-frame.
    ArchiveIO(String),
    /// Unknown type tag, version too new, missing sentinel, bad length.
    ArchiveFormat(String),
    /// Null or out-of-range record address.
    BadAddress(String),
    /// `create_entry` for a name that already exists. Recovered by callers
    /// as a no-op success; kept as a variant so the decision is explicit
    /// at the point it's made rather than silently swallowed.
    Duplicate(String),
    /// `delete_entry` of an Entry whose child array is non-empty.
    HasChildren(String),
    /// `delete_child_array` of an ArrayInfo whose entry list is non-null.
    NotEmpty(String),
    /// Record add whose size exceeds the per-block maximum.
    OutOfSpace(String),
    /// Signature comparison requested between incompatible hash types.
    SigMismatch(String),
    /// Raw I/O failure not yet classified into one of the archive kinds
    /// above (e.g. opening the backing file).
    IOError(String),
    /// Typed-serialization decode failure below the ArchiveFormat level
    /// (insufficient bytes, malformed length prefix).
    DecodeFail(String),
    /// Typed-serialization encode failure.
    EncodeFail(String),
    /// Caller-supplied argument is invalid (e.g. bad config value).
    InvalidInput(String),
    /// Invariant violation with no more specific home.
    Fatal(String),
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::ArchiveIO(s) => write!(f, "ArchiveIO: {}", s),
            Error::ArchiveFormat(s) => write!(f, "ArchiveFormat: {}", s),
            Error::BadAddress(s) => write!(f, "BadAddress: {}", s),
            Error::Duplicate(s) => write!(f, "Duplicate: {}", s),
            Error::HasChildren(s) => write!(f, "HasChildren: {}", s),
            Error::NotEmpty(s) => write!(f, "NotEmpty: {}", s),
            Error::OutOfSpace(s) => write!(f, "OutOfSpace: {}", s),
            Error::SigMismatch(s) => write!(f, "SigMismatch: {}", s),
            Error::IOError(s) => write!(f, "IOError: {}", s),
            Error::DecodeFail(s) => write!(f, "DecodeFail: {}", s),
            Error::EncodeFail(s) => write!(f, "EncodeFail: {}", s),
            Error::InvalidInput(s) => write!(f, "InvalidInput: {}", s),
            Error::Fatal(s) => write!(f, "Fatal: {}", s),
        }
    }
}

impl std::error::Error for Error {}

/// Build an [`Error`] at the call site, tagging it with `file:line`.
///
/// Three forms:
/// - `err_at!(Kind, msg: "fmt", args...)` — construct directly from a
///   formatted message, no underlying `Result` to unwrap.
/// - `err_at!(Kind, result_expr)` — map `Result<T, E>` to `Result<T, Error>`,
///   folding `E`'s `Display` into the message.
/// - `err_at!(Kind, result_expr, "fmt", args...)` — same, with an
///   additional caller-supplied message prepended.
#[macro_export]
macro_rules! err_at {
    ($v:ident, msg: $($arg:expr),+ $(,)?) => {{
        let p = format!("{}:{}", file!(), line!());
        let m = format!($($arg),+);
        Err($crate::Error::$v(format!("{} {}", p, m)))
    }};
    ($v:ident, $e:expr $(,)?) => {{
        match $e {
            Ok(val) => Ok(val),
            Err(err) => {
                let p = format!("{}:{}", file!(), line!());
                Err($crate::Error::$v(format!("{} {}", p, err)))
            }
        }
    }};
    ($v:ident, $e:expr, $($arg:expr),+ $(,)?) => {{
        match $e {
            Ok(val) => Ok(val),
            Err(err) => {
                let p = format!("{}:{}", file!(), line!());
                let m = format!($($arg),+);
                Err($crate::Error::$v(format!("{} {} : {}", p, m, err)))
            }
        }
    }};
}

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;
