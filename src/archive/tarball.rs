//! Member lookup in uncompressed tar archives.

use log::debug;
use tar::{Archive, EntryType};

use super::{FileName, base_name, read_member};
use crate::error::{Error, Result};

/// Returns the content of the first regular file named `target`.
///
/// Directories and pax global headers are skipped. Any other non-regular
/// entry (links, devices, sparse files) met before the match aborts the scan.
pub(super) fn find_member(
    archive_name: &FileName,
    bytes: &[u8],
    target: &str,
) -> Result<Option<Vec<u8>>> {
    let io_err = |e: std::io::Error| Error::io(archive_name.as_str(), e);
    let mut archive = Archive::new(bytes);

    for entry in archive.entries().map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let path = entry.path().map_err(io_err)?.to_string_lossy().into_owned();

        match entry.header().entry_type() {
            EntryType::Directory | EntryType::XGlobalHeader => {
                debug!("Skipping {:?}", path);
            }
            EntryType::Regular | EntryType::Continuous => {
                if base_name(&path) != target {
                    continue;
                }
                let declared = entry.size();
                return read_member(archive_name, entry, declared, bytes.len()).map(Some);
            }
            other => {
                return Err(Error::UnsupportedFormat(format!(
                    "entry {:?} in {:?} has unsupported type {:?}",
                    path,
                    archive_name.as_str(),
                    other
                )));
            }
        }
    }

    Ok(None)
}
