use std::fmt;
use std::io;

use thiserror::Error;

const ERROR_FILE_NOT_FOUND: i32 = 2;
const ERROR_PATH_NOT_FOUND: i32 = 3;
const ERROR_ACCESS_DENIED: i32 = 5;
const ERROR_SHARING_VIOLATION: i32 = 32;
const ERROR_LOCK_VIOLATION: i32 = 33;
const ERROR_KEY_DELETED: i32 = 1018;

/// Coarse classification of a registry failure, used to pick the remedy shown
/// to the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    PermissionDenied,
    KeyInUse,
    NotFound,
    Other,
}

impl FailureKind {
    pub fn of(err: &io::Error) -> Self {
        match err.raw_os_error() {
            Some(ERROR_ACCESS_DENIED) => FailureKind::PermissionDenied,
            Some(ERROR_FILE_NOT_FOUND | ERROR_PATH_NOT_FOUND) => FailureKind::NotFound,
            Some(ERROR_SHARING_VIOLATION | ERROR_LOCK_VIOLATION | ERROR_KEY_DELETED) => {
                FailureKind::KeyInUse
            }
            Some(_) => FailureKind::Other,
            None => match err.kind() {
                io::ErrorKind::NotFound => FailureKind::NotFound,
                io::ErrorKind::PermissionDenied => FailureKind::PermissionDenied,
                _ => FailureKind::Other,
            },
        }
    }

    pub fn remedy(self) -> &'static str {
        match self {
            FailureKind::PermissionDenied => "Please run this program as administrator.",
            FailureKind::KeyInUse => {
                "The key is in use by another process. Retry, or restart and try again."
            }
            FailureKind::NotFound => "The registry key no longer exists. Refresh the list.",
            FailureKind::Other => "Try running as administrator or restart and try again.",
        }
    }
}

pub fn is_not_found(err: &io::Error) -> bool {
    FailureKind::of(err) == FailureKind::NotFound
}

/// Registry step that failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegistryOp {
    CreateKey,
    SetDisplayName,
    CreateCommand,
    SetCommand,
    VerifyStaged,
    DeleteKey,
}

impl fmt::Display for RegistryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RegistryOp::CreateKey => "Creating the registry key",
            RegistryOp::SetDisplayName => "Setting the display name",
            RegistryOp::CreateCommand => "Creating the command subkey",
            RegistryOp::SetCommand => "Setting the command",
            RegistryOp::VerifyStaged => "Verifying the new key",
            RegistryOp::DeleteKey => "Deleting the registry key",
        })
    }
}

#[derive(Debug, Error)]
#[error("{op} failed for '{key}' (error code {})", code_text(.source))]
pub struct RegistryError {
    pub op: RegistryOp,
    pub key: String,
    #[source]
    pub source: io::Error,
}

impl RegistryError {
    pub fn new(op: RegistryOp, key: impl Into<String>, source: io::Error) -> Self {
        Self {
            op,
            key: key.into(),
            source,
        }
    }

    /// Raw OS error code, passed through unchanged.
    pub fn code(&self) -> Option<i32> {
        self.source.raw_os_error()
    }

    pub fn kind(&self) -> FailureKind {
        FailureKind::of(&self.source)
    }
}

fn code_text(err: &io::Error) -> String {
    match err.raw_os_error() {
        Some(code) => code.to_string(),
        None => err.to_string(),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Up => "up",
            Direction::Down => "down",
        })
    }
}

/// Rejected before any registry call is made.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please select an item first.")]
    NoSelection,
    #[error("The new name must not be empty.")]
    EmptyName,
    #[error("The name '{0}' contains characters not allowed in a registry key.")]
    InvalidName(String),
    #[error("'{0}' was not created by this program and cannot be changed here.")]
    NotManaged(String),
    #[error(
        "'{0}' was not created by this program and may belong to the system or another application. Confirm to delete it anyway."
    )]
    UnconfirmedUnmanaged(String),
    #[error("Moving {0} is not possible at this position.")]
    Boundary(Direction),
    #[error("{operation} is not available with {policy} ordering.")]
    WrongPolicy {
        operation: &'static str,
        policy: &'static str,
    },
    #[error("'{0}' does not name an executable file.")]
    NoFileName(String),
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl CatalogError {
    pub fn is_validation(&self) -> bool {
        matches!(self, CatalogError::Invalid(_))
    }
}
