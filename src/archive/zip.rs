//! Member lookup in zip archives.

use log::debug;
use std::io::Cursor;
use zip::ZipArchive;

use super::{FileName, base_name, read_member};
use crate::error::{Error, Result};

/// Returns the content of the first file entry named `target`.
pub(super) fn find_member(
    archive_name: &FileName,
    bytes: &[u8],
    target: &str,
) -> Result<Option<Vec<u8>>> {
    let zip_err = |source| Error::Zip {
        name: archive_name.to_string(),
        source,
    };

    // ZipArchive needs Read + Seek
    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(zip_err)?;

    for i in 0..archive.len() {
        let entry = archive.by_index(i).map_err(zip_err)?;
        if entry.is_dir() {
            debug!("Skipping {:?}", entry.name());
            continue;
        }
        if base_name(entry.name()) != target {
            continue;
        }

        let declared = entry.size();
        return read_member(archive_name, entry, declared, bytes.len()).map(Some);
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::test_support;
    use std::io::Write;
    use zip::CompressionMethod;
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    fn name() -> FileName {
        FileName::new("tool.zip")
    }

    #[test]
    fn test_find_member_in_nested_directory() {
        let bytes = test_support::zip(&[("LICENSE", "MIT"), ("tool_v1/tool.exe", "MZ")]);
        assert_eq!(
            find_member(&name(), &bytes, "tool.exe").unwrap(),
            Some(b"MZ".to_vec())
        );
    }

    #[test]
    fn test_find_member_skips_directory_entries() {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        zip.add_directory("tool/", options).unwrap();
        zip.start_file("bin/tool", options).unwrap();
        zip.write_all(b"binary").unwrap();
        let bytes = zip.finish().unwrap().into_inner();

        assert_eq!(
            find_member(&name(), &bytes, "tool").unwrap(),
            Some(b"binary".to_vec())
        );
    }

    #[test]
    fn test_find_member_missing() {
        let bytes = test_support::zip(&[("README.md", "docs")]);
        assert_eq!(find_member(&name(), &bytes, "tool").unwrap(), None);
    }

    #[test]
    fn test_find_member_oversized_header() {
        let mut bytes = test_support::zip(&[("tool", "ok")]);
        let claimed = 0x7fff_ffffu32.to_le_bytes();
        // Uncompressed size in the local header and in the central directory
        bytes[22..26].copy_from_slice(&claimed);
        let central = bytes.windows(4).position(|w| w == b"PK\x01\x02").unwrap();
        bytes[central + 24..central + 28].copy_from_slice(&claimed);

        assert!(find_member(&name(), &bytes, "tool").is_err());
    }

    #[test]
    fn test_find_member_corrupted_archive() {
        assert!(matches!(
            find_member(&name(), b"corrupted data", "tool"),
            Err(Error::Zip { .. })
        ));
    }
}
