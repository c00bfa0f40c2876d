use thiserror::Error;

use crate::metadata::token::Token;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The error type covering everything this library can report.
///
/// Structural problems in the input surface as [`Error::Malformed`] at construction
/// time; truncated data surfaces as [`Error::OutOfBounds`] at the read site; object
/// model misuse (looking up tokens on hand-built modules, double-owning a member)
/// has dedicated variants so callers can distinguish the failure modes.
#[derive(Error, Debug)]
pub enum Error {
    /// The image is damaged and could not be parsed.
    ///
    /// Carries the source location where the malformation was detected, which
    /// together with the message pins down the offending structure and offset.
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// Description of what was malformed
        message: String,
        /// The source file in which this error was raised
        file: &'static str,
        /// The source line in which this error was raised
        line: u32,
    },

    /// A read would have crossed the end of the backing stream or a heap bound.
    #[error("Out of bound read would have occurred!")]
    OutOfBounds,

    /// A coded index carried a tag that selects no candidate table.
    #[error("Coded index tag selects no candidate table - 0x{value:08x}")]
    InvalidCodedIndex {
        /// The raw coded index value whose tag was out of range
        value: u32,
    },

    /// Token lookup was attempted on a module that was not loaded from an image.
    #[error("Member lookup requires a module loaded from an image")]
    NotSerialized,

    /// A token addressed a row that does not exist in its table.
    #[error("No member exists for token {0}")]
    MemberNotFound(Token),

    /// The member is already attached to an owner and must be removed first.
    #[error("Member {0} is already attached to an owner")]
    AlreadyOwned(Token),

    /// The owning graph of this member has been released.
    #[error("The owning graph of this member has been released")]
    Detached,

    /// This file type is not supported.
    #[error("This file type is not supported")]
    NotSupported,

    /// Provided input was empty.
    #[error("Provided input was empty")]
    Empty,

    /// File I/O error.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// Error from the goblin crate during PE parsing.
    #[error("{0}")]
    PeError(#[from] goblin::error::Error),

    /// Recursion limit reached while decoding a nested structure.
    #[error("Reached the maximum recursion level allowed - {0}")]
    RecursionLimit(usize),

    /// Failed to lock shared state.
    #[error("Failed to lock target")]
    LockError,
}
