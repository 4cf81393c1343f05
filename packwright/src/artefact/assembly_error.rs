//! Error types for archive assembly.
//!
//! Covers I/O and zip failures while writing jars, and path collisions
//! between source-set outputs.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors arising while assembling an archive.
#[derive(Debug, Error)]
pub enum AssemblyError {
    /// Two producers supplied the same archive path.
    #[error("archive entry {path} is produced by both {first} and {second}")]
    EntryCollision {
        /// The colliding archive path.
        path: String,
        /// The producer registered first.
        first: String,
        /// The producer that collided.
        second: String,
    },

    /// Reading an input or writing the archive failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// The file or directory being accessed.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The zip writer rejected an operation.
    #[error("failed to write archive {path}: {source}")]
    Zip {
        /// The archive being written.
        path: Utf8PathBuf,
        /// The underlying zip error.
        #[source]
        source: zip::result::ZipError,
    },

    /// An input file name is not valid UTF-8.
    #[error("input path is not valid UTF-8: {path}")]
    NonUtf8Path {
        /// Lossy rendering of the offending path.
        path: String,
    },

    /// A file listed for `${version}` expansion is not UTF-8 text.
    #[error("cannot expand {path}: file is not UTF-8 text")]
    ExpandNotText {
        /// Archive path of the file.
        path: String,
    },

    /// A jar listed for nesting does not exist.
    #[error("included jar {path} does not exist")]
    MissingInclude {
        /// The configured jar path.
        path: Utf8PathBuf,
    },

    /// An archive would contain nothing but its manifest.
    #[error("archive {path} has no entries; check the configured source-set directories")]
    Empty {
        /// The archive that would have been written.
        path: Utf8PathBuf,
    },
}
