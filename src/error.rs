//! Error taxonomy shared by the redirect and theme engines.
//!
//! None of these are fatal: callers log them and either skip navigation or
//! fall through to the next signal tier.

/// Errors reported by the library.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The source page URL is not an absolute URL, so no target can be built.
    #[error("cannot parse source URL {url:?}: {reason}")]
    UnparsableUrl {
        /// The rejected input.
        url: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// A color sample is not one of `rgb(...)`, `rgba(...)` or `#rrggbb`.
    #[error("unrecognized color encoding: {0:?}")]
    UnrecognizedColorEncoding(String),

    /// Neither color sample nor any hint was usable.
    #[error("no brightness signal available")]
    NoSignalAvailable,

    /// A redirect was requested from an entry point that needs a saved base URL.
    #[error("no base URL configured")]
    MissingBaseUrl,

    /// A base URL entered by the user was blank.
    #[error("Please enter a valid URL")]
    InvalidBaseUrl,

    /// A rewrite strategy name did not match any known strategy.
    #[error("unknown rewrite strategy: {0:?}")]
    UnknownStrategy(String),
}

/// Result alias for library operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
