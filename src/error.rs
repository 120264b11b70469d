//! Error types and `Result` alias for FabricDB's storage substrate.
//!
//! `ErrorCode` is a stable, copyable discriminant callers can match on
//! without downcasting, mirroring the integer status codes returned
//! throughout the C implementation this crate is modeled on. `FdbError`
//! wraps a code with an optional message and, for the I/O class, the
//! underlying `std::io::Error`.

use std::fmt;

/// Stable error classification, grouped the way the on-disk/OS layer
/// reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    /// Not an error; included for symmetry with the C status-code scheme.
    Ok = 0,
    /// A lock could not be acquired right now; not logged as a failure,
    /// callers are expected to retry with their own backoff.
    Busy,
    /// The page cache is at capacity and no page is evictable.
    CacheFull,

    // Misuse
    /// A caller passed a null/absent handle where one was required.
    MisuseNullPtr,
    /// A pragma was set or read in violation of its lifecycle rules.
    MisusePragma,

    // I/O (errno-derived)
    NotFound,
    PermissionDenied,
    AlreadyExists,
    IsADirectory,
    TooManySymlinks,
    TooManyOpenFiles,
    NameTooLong,
    FileTableOverflow,
    NoSpace,
    NotADirectory,
    Overflow,
    InvalidArgument,
    FileTooBig,
    BadFileDescriptor,
    NoBufferSpace,
    NoSuchDevice,
    ShortRead,
    ShortWrite,
    /// The file failed header/format validation; terminal for that open.
    InvalidFile,
    /// Catch-all for an I/O failure without a more specific mapping.
    IoError,

    // Memory
    OutOfMemory,

    // Internal
    CacheDuplicateEntry,
    IndexOutOfBounds,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// The crate-wide error type.
#[derive(Debug)]
pub struct FdbError {
    code: ErrorCode,
    message: Option<String>,
    source: Option<std::io::Error>,
}

impl FdbError {
    /// Construct an error with just a code.
    pub fn new(code: ErrorCode) -> Self {
        FdbError {
            code,
            message: None,
            source: None,
        }
    }

    /// Construct an error with a code and an explanatory message.
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        FdbError {
            code,
            message: Some(message.into()),
            source: None,
        }
    }

    /// Construct an I/O-class error carrying the originating OS error.
    pub fn from_io(code: ErrorCode, source: std::io::Error) -> Self {
        FdbError {
            code,
            message: None,
            source: Some(source),
        }
    }

    /// The stable error classification.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// True iff this is the non-fatal "try again" signal.
    pub fn is_busy(&self) -> bool {
        self.code == ErrorCode::Busy
    }
}

impl fmt::Display for FdbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.message, &self.source) {
            (Some(msg), _) => write!(f, "{}: {}", self.code, msg),
            (None, Some(src)) => write!(f, "{}: {}", self.code, src),
            (None, None) => write!(f, "{}", self.code),
        }
    }
}

impl std::error::Error for FdbError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result alias used throughout the crate in place of bare return codes.
pub type Result<T> = std::result::Result<T, FdbError>;

/// Translate a raw OS `errno` into an [`ErrorCode`], matching the table in
/// `original_source/src/os_unix.c`'s `fdb_ioerror_from_errno`.
pub fn code_from_errno(errno: i32) -> ErrorCode {
    match errno {
        libc::EACCES => ErrorCode::PermissionDenied,
        libc::EPERM => ErrorCode::PermissionDenied,
        libc::EEXIST => ErrorCode::AlreadyExists,
        libc::EISDIR => ErrorCode::IsADirectory,
        libc::ELOOP => ErrorCode::TooManySymlinks,
        libc::EMFILE => ErrorCode::TooManyOpenFiles,
        libc::ENAMETOOLONG => ErrorCode::NameTooLong,
        libc::ENFILE => ErrorCode::FileTableOverflow,
        libc::ENOENT => ErrorCode::NotFound,
        libc::ENOSPC => ErrorCode::NoSpace,
        libc::EDQUOT => ErrorCode::NoSpace,
        libc::ENOTDIR => ErrorCode::NotADirectory,
        libc::EOVERFLOW => ErrorCode::Overflow,
        libc::EINVAL => ErrorCode::InvalidArgument,
        libc::EFBIG => ErrorCode::FileTooBig,
        libc::EBADF => ErrorCode::BadFileDescriptor,
        libc::ENOBUFS => ErrorCode::NoBufferSpace,
        libc::ENXIO => ErrorCode::NoSuchDevice,
        libc::ENOMEM => ErrorCode::OutOfMemory,
        _ => ErrorCode::IoError,
    }
}

/// Build an [`FdbError`] from the current OS `errno`, matching the C
/// `fdb_ioerror_from_errno` translation exactly.
pub fn io_error_from_errno() -> FdbError {
    let io_err = std::io::Error::last_os_error();
    let code = io_err
        .raw_os_error()
        .map(code_from_errno)
        .unwrap_or(ErrorCode::IoError);
    FdbError::from_io(code, io_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_is_distinguishable_by_value() {
        let err = FdbError::new(ErrorCode::Busy);
        assert!(err.is_busy());
        assert_eq!(err.code(), ErrorCode::Busy);
    }

    #[test]
    fn display_includes_message() {
        let err = FdbError::with_message(ErrorCode::InvalidFile, "bad magic");
        assert_eq!(format!("{err}"), "InvalidFile: bad magic");
    }

    #[test]
    fn errno_table_matches_source() {
        assert_eq!(code_from_errno(libc::ENOENT), ErrorCode::NotFound);
        assert_eq!(code_from_errno(libc::EACCES), ErrorCode::PermissionDenied);
        assert_eq!(code_from_errno(libc::ENOSPC), ErrorCode::NoSpace);
        assert_eq!(code_from_errno(libc::EBUSY), ErrorCode::IoError);
    }
}
