//! Recovers the executable from a downloaded release asset.
//!
//! An asset moves through `Downloaded -> [Decompressed]* -> [Unarchived] ->
//! Verified-Executable`. Every step re-classifies the current file name,
//! since decompression changes it (`tool.tar.gz` -> `tool.tar`).

use log::{debug, info};

use crate::archive::{self, ArchiveFile, Compression};
use crate::error::{Error, Result};

/// Unpacks `downloaded` down to the executable named `target`.
///
/// `target` is only consulted when an archive is met; a bare or merely
/// compressed binary is returned under its own (decompressed) name, which
/// must still pass the executable-extension rule (`tool_1.2.0_linux.gz`
/// decompresses to a name with extension `.0_linux` and is rejected).
#[tracing::instrument(skip(downloaded), fields(asset = %downloaded.name))]
pub fn extract_executable(downloaded: ArchiveFile, target: &str) -> Result<ArchiveFile> {
    let mut current = downloaded;

    // Zip is compressed per member and goes straight to member extraction.
    while current.name.is_compressed() && !(current.name.is_archived() && !current.name.is_tarball())
    {
        let kind = Compression::for_name(&current.name)?;
        current = archive::decompress(&current, kind)?;
        debug!("Decompressed to {}", current.name);
    }

    if current.name.is_archived() {
        current = archive::extract_member(&current, target)?;
        debug!("Extracted {} from archive", current.name);
    }

    if !current.name.is_executable_candidate() {
        return Err(Error::NotExecutable(current.name.to_string()));
    }

    info!("Recovered executable {} ({} bytes)", current.name, current.content.len());
    Ok(current)
}
