/*!
 * error.rs — Error taxonomy for AWR report analysis
 *
 * Only two failure classes ever leave the library: a document with no
 * tabular markup at all, and I/O or config errors at the binary seam.
 * Cell-level, timestamp-level and missing-table failures are recovered
 * in place (skip / default / empty result) and never surface.
 *
 * License: GPLv3+
 */

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AwrError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The document could not be treated as an AWR report: the parsed
    /// markup contains no tables to scan.
    #[error("malformed AWR report: {reason}")]
    MalformedInput { reason: String },

    #[error("threshold config error: {0}")]
    Config(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, AwrError>;
