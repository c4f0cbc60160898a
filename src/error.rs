//! Error types for pdfdoc library.

use std::fmt;
use std::io;
use thiserror::Error;

/// Result type alias for pdfdoc operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while opening and inspecting a PDF.
#[derive(Error, Debug)]
pub enum Error {
    /// The document is encrypted and the password was missing or wrong.
    #[error("Document is encrypted")]
    Encrypted,

    /// The document could not be loaded.
    #[error("Failed to load document (error {code}) '{locator}'")]
    Load {
        /// Failure class
        code: LoadErrorCode,
        /// Operating system error number, when the failure came from the OS
        os_code: Option<i32>,
        /// Where the document was loaded from
        locator: String,
    },

    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// 1-based page number past the end of the document.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(usize, usize),

    /// Invalid page range specification.
    #[error("Invalid page range: {0}")]
    InvalidPageRange(String),

    /// Writing the document failed.
    #[error("Failed to save document to '{path}': {reason}")]
    Save {
        /// Save target
        path: String,
        /// Underlying writer error
        reason: String,
    },

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Build a load error for `locator`.
    pub fn load(code: LoadErrorCode, locator: impl Into<String>) -> Self {
        Error::Load {
            code,
            os_code: None,
            locator: locator.into(),
        }
    }

    /// Build a load error from an I/O failure, keeping the OS error number.
    pub fn load_io(err: &io::Error, locator: impl Into<String>) -> Self {
        Error::Load {
            code: LoadErrorCode::OpenFile,
            os_code: err.raw_os_error(),
            locator: locator.into(),
        }
    }

    /// Map a parser failure during open.
    pub(crate) fn from_lopdf(err: lopdf::Error, locator: &str) -> Self {
        match err {
            lopdf::Error::Decryption(_) => Error::Encrypted,
            lopdf::Error::IO(e) => Error::Load {
                code: LoadErrorCode::FileIo,
                os_code: e.raw_os_error(),
                locator: locator.to_string(),
            },
            other => {
                log::debug!("lopdf rejected '{}': {}", locator, other);
                Error::load(LoadErrorCode::Damaged, locator)
            }
        }
    }
}

/// Failure classes reported by [`Error::Load`].
///
/// The numeric values follow the classic xpdf error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadErrorCode {
    /// Couldn't open the file
    OpenFile = 1,
    /// Couldn't read the page catalog
    BadCatalog = 2,
    /// PDF file was damaged and couldn't be repaired
    Damaged = 3,
    /// Read or write error
    FileIo = 10,
    /// Header names a version this library does not handle
    UnsupportedVersion = 11,
}

impl LoadErrorCode {
    /// Numeric error code.
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for LoadErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
