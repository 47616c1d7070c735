//! Error taxonomy of the virtual file system.

use std::io;
use thiserror::Error;

/// Errors raised by the virtual file system.
///
/// Every error is a deterministic consequence of the arguments and of the
/// current store contents; nothing here is transient or worth retrying.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VfsError {
    /// Null-like, empty or malformed path or search pattern.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A directory (the target or one of its ancestors) is absent.
    #[error("could not find a part of the path: {0}")]
    DirectoryNotFound(String),

    /// The target file is absent.
    #[error("could not find file: {0}")]
    FileNotFound(String),

    /// The operation would clobber an existing entry, or a directory that
    /// still has content was removed non-recursively.
    #[error("{0}")]
    AlreadyExists(String),

    /// Source and destination of a move normalize to the same path.
    #[error("source and destination path must be different: {0}")]
    SamePath(String),

    /// Source and destination of a move live under different roots.
    #[error("source and destination path must have identical roots: {from} -> {to}")]
    CrossRoot { from: String, to: String },

    /// Destination of a directory move lies inside the source.
    #[error("cannot move a directory into itself: {from} -> {to}")]
    MoveIntoSelf { from: String, to: String },

    /// Write to a read-only or hidden entry, or a file operation on a directory.
    #[error("access to the path is denied: {0}")]
    UnauthorizedAccess(String),
}

impl VfsError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn directory_not_found(path: impl Into<String>) -> Self {
        Self::DirectoryNotFound(path.into())
    }

    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound(path.into())
    }

    pub fn already_exists(msg: impl Into<String>) -> Self {
        Self::AlreadyExists(msg.into())
    }

    pub fn unauthorized(path: impl Into<String>) -> Self {
        Self::UnauthorizedAccess(path.into())
    }

    /// True for the kinds a native file system reports as a generic I/O failure.
    pub fn is_io_error(&self) -> bool {
        matches!(
            self,
            Self::AlreadyExists(_)
                | Self::SamePath(_)
                | Self::CrossRoot { .. }
                | Self::MoveIntoSelf { .. }
        )
    }

    /// True for both flavors of "not found".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::DirectoryNotFound(_) | Self::FileNotFound(_))
    }
}

/// Convert VfsError to std::io::Error for code written against `io::Result`.
impl From<VfsError> for io::Error {
    fn from(e: VfsError) -> Self {
        let kind = match &e {
            VfsError::InvalidArgument(_) => io::ErrorKind::InvalidInput,
            VfsError::DirectoryNotFound(_) | VfsError::FileNotFound(_) => io::ErrorKind::NotFound,
            VfsError::AlreadyExists(_) => io::ErrorKind::AlreadyExists,
            VfsError::UnauthorizedAccess(_) => io::ErrorKind::PermissionDenied,
            VfsError::SamePath(_) | VfsError::CrossRoot { .. } | VfsError::MoveIntoSelf { .. } => {
                io::ErrorKind::Other
            }
        };
        io::Error::new(kind, e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_family() {
        assert!(VfsError::already_exists("x").is_io_error());
        assert!(VfsError::SamePath("x".into()).is_io_error());
        assert!(
            VfsError::CrossRoot {
                from: "C:\\a\\".into(),
                to: "D:\\a\\".into()
            }
            .is_io_error()
        );
        assert!(!VfsError::unauthorized("x").is_io_error());
        assert!(!VfsError::directory_not_found("x").is_io_error());
    }

    #[test]
    fn test_not_found_family() {
        assert!(VfsError::directory_not_found("x").is_not_found());
        assert!(VfsError::file_not_found("x").is_not_found());
        assert!(!VfsError::invalid_argument("x").is_not_found());
    }

    #[test]
    fn test_into_io_error_kind() {
        let err: io::Error = VfsError::file_not_found("C:\\a.txt").into();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(err.to_string().contains("C:\\a.txt"));

        let err: io::Error = VfsError::unauthorized("C:\\a.txt").into();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);

        let err: io::Error = VfsError::already_exists("taken").into();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
    }
}
