//! Asset selection module
//!
//! Decides which of a release's attachments is the binary for a platform,
//! or which one the user asked for by pattern.

mod picker;

use serde::Serialize;

use crate::archive::FileName;

pub use picker::{AssetPicker, PatternAssetPicker, PlatformAssetPicker, select};

/// One file attached to a release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetCandidate {
    pub name: FileName,
    pub download_url: String,
}

impl AssetCandidate {
    pub fn new(name: impl Into<FileName>, download_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            download_url: download_url.into(),
        }
    }
}

/// Serialized form used for `--json` listings.
#[derive(Debug, Serialize)]
pub struct AssetSummary {
    pub name: String,
    pub platform: String,
    pub selected: bool,
}
