//! Errors produced while resolving and unpacking a release asset.

use thiserror::Error;

/// Failure kinds of the asset resolution and extraction engine.
///
/// Every variant is a deterministic function of its inputs, so none of them
/// are worth retrying.
#[derive(Error, Debug)]
pub enum Error {
    /// A platform string could not be mapped to a known operating system.
    #[error("could not detect an operating system in {0:?}")]
    PlatformUndetected(String),

    /// `wanted` is the requested platform or the user's asset pattern.
    #[error("no release asset matches {wanted}")]
    NoAssetMatched { wanted: String },

    #[error("multiple release assets match {wanted}: {}", .candidates.join(", "))]
    AmbiguousAsset {
        wanted: String,
        candidates: Vec<String>,
    },

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("{member:?} not found in archive {archive:?}")]
    MemberNotFound { archive: String, member: String },

    #[error("{0:?} does not look like an executable")]
    NotExecutable(String),

    #[error("failed to read {name:?}: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read zip archive {name:?}: {source}")]
    Zip {
        name: String,
        #[source]
        source: zip::result::ZipError,
    },
}

impl Error {
    pub(crate) fn no_match(wanted: impl ToString) -> Self {
        Error::NoAssetMatched {
            wanted: wanted.to_string(),
        }
    }

    pub(crate) fn ambiguous<'a>(
        wanted: impl ToString,
        names: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        Error::AmbiguousAsset {
            wanted: wanted.to_string(),
            candidates: names.into_iter().map(str::to_string).collect(),
        }
    }

    pub(crate) fn io(name: &str, source: std::io::Error) -> Self {
        Error::Io {
            name: name.to_string(),
            source,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
