//! Typed errors for conditions the caller is expected to branch on.
//!
//! Everything else in this crate propagates through `anyhow::Result`; this
//! enum exists only for the handful of startup-time failures that should
//! produce a specific, loggable message rather than an opaque chain.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid PORT value {0:?}: {1}")]
    InvalidPort(String, std::num::ParseIntError),

    #[error("failed to bind listener on {0}: {1}")]
    BindFailed(String, std::io::Error),

    #[error("static asset directory {0:?} is not readable: {1}")]
    StaticDirUnreadable(std::path::PathBuf, std::io::Error),
}
