use glob::{MatchOptions, Pattern};
use log::debug;

use super::AssetCandidate;
use crate::error::{Error, Result};
use crate::platform::{Detector, Platform};

/// Trait for selecting an asset from a list of available assets
pub trait AssetPicker: Send + Sync {
    /// Pick the single asset to install.
    ///
    /// Fails with `NoAssetMatched` or `AmbiguousAsset` unless exactly one
    /// asset survives.
    fn pick<'a>(&self, assets: &'a [AssetCandidate]) -> Result<&'a AssetCandidate>;
}

/// Picks the asset whose name encodes the requested platform.
pub struct PlatformAssetPicker {
    platform: Platform,
    detector: Detector,
}

impl PlatformAssetPicker {
    pub fn new(platform: Platform) -> Self {
        Self::with_detector(platform, Detector::default())
    }

    pub fn with_detector(platform: Platform, detector: Detector) -> Self {
        Self { platform, detector }
    }

    /// Binaries, archives and compressed files may carry a platform; checksums,
    /// signatures, OS packages and docs never do.
    fn is_plausible(asset: &AssetCandidate) -> bool {
        asset.name.is_executable_candidate() || is_packed(asset)
    }

    fn matches_platform(&self, asset: &AssetCandidate) -> bool {
        self.detector.detect(asset.name.as_str()) == self.platform
    }
}

fn is_packed(asset: &AssetCandidate) -> bool {
    asset.name.is_archived() || asset.name.is_compressed()
}

impl AssetPicker for PlatformAssetPicker {
    fn pick<'a>(&self, assets: &'a [AssetCandidate]) -> Result<&'a AssetCandidate> {
        let plausible: Vec<_> = assets.iter().filter(|a| Self::is_plausible(a)).collect();
        let matching: Vec<_> = plausible
            .into_iter()
            .filter(|a| self.matches_platform(a))
            .collect();

        debug!(
            "{} of {} assets match {}",
            matching.len(),
            assets.len(),
            self.platform
        );

        match matching.as_slice() {
            [] => Err(Error::no_match(&self.platform)),
            [only] => Ok(*only),
            // A raw binary published next to a packed copy of itself
            [a, b] if a.name.is_executable_candidate() && is_packed(b) => Ok(*a),
            [a, b] if b.name.is_executable_candidate() && is_packed(a) => Ok(*b),
            conflicting => Err(Error::ambiguous(
                &self.platform,
                conflicting.iter().map(|a| a.name.as_str()),
            )),
        }
    }
}

/// Selects the asset for `platform` with the built-in keyword tables.
pub fn select<'a>(assets: &'a [AssetCandidate], platform: &Platform) -> Result<&'a AssetCandidate> {
    PlatformAssetPicker::new(platform.clone()).pick(assets)
}

/// A picker that matches asset names against a user-supplied glob.
pub struct PatternAssetPicker {
    pattern: Pattern,
}

impl PatternAssetPicker {
    pub fn new(pattern: &str) -> Result<Self, glob::PatternError> {
        Ok(Self {
            pattern: Pattern::new(pattern)?,
        })
    }

    fn matches(&self, name: &str) -> bool {
        let options = MatchOptions {
            case_sensitive: false,
            ..MatchOptions::new()
        };
        self.pattern.matches_with(name, options)
    }
}

impl AssetPicker for PatternAssetPicker {
    fn pick<'a>(&self, assets: &'a [AssetCandidate]) -> Result<&'a AssetCandidate> {
        let matching: Vec<_> = assets
            .iter()
            .filter(|a| self.matches(a.name.as_str()))
            .collect();
        let wanted = format!("pattern {:?}", self.pattern.as_str());

        match matching.as_slice() {
            [] => Err(Error::no_match(wanted)),
            [only] => Ok(*only),
            conflicting => Err(Error::ambiguous(
                wanted,
                conflicting.iter().map(|a| a.name.as_str()),
            )),
        }
    }
}
