//! Format-aware decoding of release assets.
//!
//! Every operation peels exactly one layer: one compression stream or one
//! archive member. Which layer applies is decided from the file name alone,
//! after normalizing abbreviations such as `.tgz`.

mod compress;
mod tarball;
mod zip;

use log::debug;
use std::fmt;
use std::io::{self, Read};

use crate::error::{Error, Result};

/// Extensions that mark a file as a ready-to-run binary.
///
/// A few projects suffix raw binaries with their platform (`sops-v3.9.0.linux`).
const EXECUTABLE_EXTENSIONS: &[&str] = &[
    "",
    ".exe",
    ".linux",
    ".darwin",
    ".linux-amd64",
    ".darwin-amd64",
    ".amd64",
];

/// Composite-extension abbreviations and their long forms.
const ABBREVIATIONS: &[(&str, &str)] = &[(".tgz", ".tar.gz"), (".txz", ".tar.xz")];

/// Returns the last path component of `path`, accepting both separators.
pub(crate) fn base_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Reads an archive member whose header claims `declared` bytes.
///
/// Headers are untrusted: the buffer is never sized beyond `available`, and
/// a member shorter or longer than its header is a corrupt stream.
pub(crate) fn read_member(
    archive: &FileName,
    mut reader: impl Read,
    declared: u64,
    available: usize,
) -> Result<Vec<u8>> {
    let capacity = usize::try_from(declared).unwrap_or(usize::MAX).min(available);
    let mut content = Vec::with_capacity(capacity);
    reader
        .read_to_end(&mut content)
        .map_err(|e| Error::io(archive.as_str(), e))?;

    if content.len() as u64 != declared {
        let truncated = io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("member declares {} bytes but holds {}", declared, content.len()),
        );
        return Err(Error::io(archive.as_str(), truncated));
    }
    Ok(content)
}

/// A bare file name, without any directory component.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileName(String);

impl FileName {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(base_name(name.as_ref()).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Expands `.tgz` to `.tar.gz` and `.txz` to `.tar.xz`. Idempotent.
    pub fn normalize(&self) -> FileName {
        for (short, long) in ABBREVIATIONS {
            if ends_with_ignore_case(&self.0, short) {
                let stem = &self.0[..self.0.len() - short.len()];
                return FileName(format!("{}{}", stem, long));
            }
        }
        self.clone()
    }

    /// Lower-cased final extension of the normalized name, including the dot.
    ///
    /// A compressed tarball reports its compound extension (`.tar.gz`), not
    /// just the outer `.gz`.
    pub fn extension(&self) -> String {
        let normalized = self.normalize();
        let ext = final_extension(normalized.as_str());
        let stem = &normalized.0[..normalized.0.len() - ext.len()];

        if !ext.is_empty() && ends_with_ignore_case(stem, ".tar") {
            format!(".tar{}", ext.to_lowercase())
        } else {
            ext.to_lowercase()
        }
    }

    /// The normalized name with its final single extension removed
    /// (`tool.tar.gz` becomes `tool.tar`).
    pub fn strip_extension(&self) -> FileName {
        let normalized = self.normalize();
        let ext = final_extension(normalized.as_str());
        FileName(normalized.0[..normalized.0.len() - ext.len()].to_string())
    }

    pub fn format(&self) -> Option<Format> {
        Format::from_extension(&self.extension())
    }

    pub fn is_executable_candidate(&self) -> bool {
        EXECUTABLE_EXTENSIONS.contains(&self.extension().as_str())
    }

    pub fn is_compressed(&self) -> bool {
        self.format().is_some_and(Format::is_compressed)
    }

    pub fn is_archived(&self) -> bool {
        self.format().is_some_and(Format::is_archived)
    }

    pub fn is_tarball(&self) -> bool {
        self.format().is_some_and(Format::is_tarball)
    }
}

fn final_extension(name: &str) -> &str {
    name.rfind('.').map_or("", |i| &name[i..])
}

fn ends_with_ignore_case(s: &str, suffix: &str) -> bool {
    s.len()
        .checked_sub(suffix.len())
        .and_then(|start| s.get(start..))
        .is_some_and(|tail| tail.eq_ignore_ascii_case(suffix))
}

impl fmt::Display for FileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for FileName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FileName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for FileName {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

/// Container and compression formats recognized by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Gzip,
    Xz,
    Zip,
    Tar,
    TarGz,
    TarXz,
}

impl Format {
    /// Maps a normalized, lower-cased extension to its format.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            ".gz" => Some(Format::Gzip),
            ".xz" => Some(Format::Xz),
            ".zip" => Some(Format::Zip),
            ".tar" => Some(Format::Tar),
            ".tar.gz" => Some(Format::TarGz),
            ".tar.xz" => Some(Format::TarXz),
            _ => None,
        }
    }

    /// The stream compression wrapping this format, if any. Zip compresses
    /// per member and has none.
    pub fn compression(self) -> Option<Compression> {
        match self {
            Format::Gzip | Format::TarGz => Some(Compression::Gzip),
            Format::Xz | Format::TarXz => Some(Compression::Xz),
            Format::Zip | Format::Tar => None,
        }
    }

    pub fn is_compressed(self) -> bool {
        !matches!(self, Format::Tar)
    }

    pub fn is_archived(self) -> bool {
        !matches!(self, Format::Gzip | Format::Xz)
    }

    pub fn is_tarball(self) -> bool {
        matches!(self, Format::Tar | Format::TarGz | Format::TarXz)
    }
}

/// A single stream compression layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Gzip,
    Xz,
}

impl Compression {
    /// The decompressor for `name`, or `UnsupportedFormat`.
    pub fn for_name(name: &FileName) -> Result<Self> {
        name.format()
            .and_then(Format::compression)
            .ok_or_else(|| Error::UnsupportedFormat(format!("no decompressor for {:?}", name.0)))
    }
}

/// A named blob: the downloaded asset or any intermediate decoding stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveFile {
    pub name: FileName,
    pub content: Vec<u8>,
}

impl ArchiveFile {
    pub fn new(name: impl Into<FileName>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// Strips one compression layer; the result is named without that layer's
/// extension (`tool.tar.gz` becomes `tool.tar`, `tool.gz` becomes `tool`).
#[tracing::instrument(skip(file), fields(name = %file.name))]
pub fn decompress(file: &ArchiveFile, kind: Compression) -> Result<ArchiveFile> {
    if Compression::for_name(&file.name)? != kind {
        return Err(Error::UnsupportedFormat(format!(
            "{:?} is not {:?} compressed",
            file.name.as_str(),
            kind
        )));
    }

    let content = match kind {
        Compression::Gzip => compress::gunzip(&file.content),
        Compression::Xz => compress::unxz(&file.content),
    }
    .map_err(|e| Error::io(file.name.as_str(), e))?;

    let name = file.name.strip_extension();
    debug!(
        "Decompressed {} ({} bytes) into {} ({} bytes)",
        file.name,
        file.content.len(),
        name,
        content.len()
    );
    Ok(ArchiveFile { name, content })
}

/// Finds the member of a tar or zip archive whose base name equals `target`,
/// ignoring the directories it sits in.
#[tracing::instrument(skip(file), fields(name = %file.name))]
pub fn extract_member(file: &ArchiveFile, target: &str) -> Result<ArchiveFile> {
    let found = match file.name.format() {
        Some(Format::Tar) => tarball::find_member(&file.name, &file.content, target)?,
        Some(Format::Zip) => zip::find_member(&file.name, &file.content, target)?,
        _ => {
            return Err(Error::UnsupportedFormat(format!(
                "{:?} is not an uncompressed tar or zip archive",
                file.name.as_str()
            )));
        }
    };

    match found {
        Some(content) => {
            debug!("Found {:?} in {} ({} bytes)", target, file.name, content.len());
            Ok(ArchiveFile::new(target, content))
        }
        None => Err(Error::MemberNotFound {
            archive: file.name.to_string(),
            member: target.to_string(),
        }),
    }
}
