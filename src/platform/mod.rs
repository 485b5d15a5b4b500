//! Platform signatures and their detection from free-form names.
//!
//! Release assets encode their target platform in wildly inconsistent ways
//! (`trivy_0.53.0_Linux-64bit.tar.gz`, `argocd-linux-amd64`, `opa_linux_amd64`).
//! Detection scans the name for the longest known OS keyword and, separately,
//! the longest known architecture keyword.

mod keywords;

use log::debug;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

pub use keywords::{ARCH_KEYWORDS, KeywordTable, OS_KEYWORDS};

/// OS token used when no OS keyword is present.
pub const UNKNOWN_OS: &str = "unknown";

/// Architecture assumed when no architecture keyword is present.
pub const DEFAULT_ARCH: &str = "amd64";

/// An (OS, architecture) pair a binary is built for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Platform {
    pub os: String,
    pub arch: String,
}

impl Platform {
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// The platform this binary was compiled for, in canonical tokens.
    pub fn host() -> Self {
        Detector::default().detect(&format!(
            "{}-{}",
            std::env::consts::OS,
            std::env::consts::ARCH
        ))
    }

    /// False when detection found no OS keyword.
    pub fn is_known(&self) -> bool {
        self.os != UNKNOWN_OS
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}

/// Parses `os/arch` (e.g. `linux/arm64`, `macos/aarch64`), canonicalizing
/// both halves through the keyword tables. Without a `/`, the whole string is
/// run through detection and must at least name an OS.
impl FromStr for Platform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let undetected = || Error::PlatformUndetected(s.to_string());

        let Some((os, arch)) = s.split_once('/') else {
            let platform = detect(s);
            return if platform.is_known() {
                Ok(platform)
            } else {
                Err(undetected())
            };
        };

        let (os, _) = OS_KEYWORDS.longest_match(os).ok_or_else(undetected)?;
        let (arch, _) = ARCH_KEYWORDS.longest_match(arch).ok_or_else(undetected)?;
        Ok(Platform::new(os, arch))
    }
}

/// Maps file names to platform signatures using a pair of keyword tables.
#[derive(Debug, Clone, Copy)]
pub struct Detector {
    os: KeywordTable,
    arch: KeywordTable,
}

impl Default for Detector {
    fn default() -> Self {
        Self::new(OS_KEYWORDS, ARCH_KEYWORDS)
    }
}

impl Detector {
    pub const fn new(os: KeywordTable, arch: KeywordTable) -> Self {
        Self { os, arch }
    }

    /// Best-guess platform for `file_name`.
    ///
    /// Never fails: a missing OS keyword yields [`UNKNOWN_OS`] and a missing
    /// architecture keyword yields [`DEFAULT_ARCH`].
    pub fn detect(&self, file_name: &str) -> Platform {
        let os = match self.os.longest_match(file_name) {
            Some((token, keyword)) => {
                debug!("{:?}: os {} (matched {:?})", file_name, token, keyword);
                token
            }
            None => UNKNOWN_OS,
        };
        let arch = match self.arch.longest_match(file_name) {
            Some((token, keyword)) => {
                debug!("{:?}: arch {} (matched {:?})", file_name, token, keyword);
                token
            }
            None => DEFAULT_ARCH,
        };
        Platform::new(os, arch)
    }
}

/// Detects with the built-in keyword tables.
pub fn detect(file_name: &str) -> Platform {
    Detector::default().detect(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn platform(os: &str, arch: &str) -> Platform {
        Platform::new(os, arch)
    }

    #[test]
    fn test_detect_common_asset_names() {
        let cases = [
            ("trivy_0.53.0_Linux-64bit.tar.gz", platform("linux", "amd64")),
            ("trivy_0.53.0_Linux-ARM64.tar.gz", platform("linux", "arm64")),
            ("trivy_0.53.0_macOS-ARM64.tar.gz", platform("darwin", "arm64")),
            ("argocd-linux-amd64", platform("linux", "amd64")),
            ("argocd-darwin-arm64", platform("darwin", "arm64")),
            ("argocd-windows-amd64.exe", platform("windows", "amd64")),
            ("opa_linux_amd64", platform("linux", "amd64")),
            ("opa_linux_arm64_static", platform("linux", "arm64")),
            ("gh_2.52.0_linux_386.tar.gz", platform("linux", "386")),
            ("gh_2.52.0_windows_arm64.zip", platform("windows", "arm64")),
            (
                "ripgrep-14.1.0-x86_64-unknown-linux-musl.tar.gz",
                platform("linux", "amd64"),
            ),
            (
                "ripgrep-14.1.0-aarch64-apple-darwin.tar.gz",
                platform("darwin", "arm64"),
            ),
            ("k9s_Linux_armv7.tar.gz", platform("linux", "arm")),
            ("tool-freebsd-amd64.tar.gz", platform("freebsd", "amd64")),
            ("tool_linux_ppc64le.tar.gz", platform("linux", "ppc64le")),
        ];

        for (name, expected) in cases {
            assert_eq!(detect(name), expected, "detecting {}", name);
        }
    }

    #[test]
    fn test_detect_empty_name_uses_defaults() {
        assert_eq!(detect(""), platform(UNKNOWN_OS, DEFAULT_ARCH));
    }

    #[test]
    fn test_detect_unknown_os_regardless_of_arch() {
        let detected = detect("tool-arm64.tar.gz");
        assert_eq!(detected, platform("unknown", "arm64"));
        assert!(!detected.is_known());
    }

    #[test]
    fn test_detect_missing_arch_defaults_to_amd64() {
        assert_eq!(detect("sops-v3.9.0.linux"), platform("linux", "amd64"));
        assert_eq!(detect("sops-v3.9.0.darwin"), platform("darwin", "amd64"));
    }

    #[test]
    fn test_detect_arm64_outranks_arm() {
        assert_eq!(detect("tool-linux-arm64").arch, "arm64");
        assert_eq!(detect("tool-linux-arm").arch, "arm");
    }

    #[test]
    fn test_detect_exe_suffix_means_windows() {
        assert_eq!(detect("tool_x86_64.exe").os, "windows");
    }

    #[test]
    fn test_detect_darwin_outranks_win() {
        assert_eq!(detect("tool-darwin-amd64").os, "darwin");
    }

    #[test]
    fn test_detect_with_custom_tables() {
        const OS: KeywordTable = KeywordTable::new(&[("plan9", &["plan9"])]);
        const ARCH: KeywordTable = KeywordTable::new(&[("sparc", &["sparc"])]);
        let detector = Detector::new(OS, ARCH);

        assert_eq!(
            detector.detect("tool-plan9-sparc"),
            platform("plan9", "sparc")
        );
        assert_eq!(
            detector.detect("tool-linux-amd64"),
            platform("unknown", "amd64")
        );
    }

    #[test]
    fn test_host_platform_is_canonical() {
        let host = Platform::host();

        #[cfg(target_os = "linux")]
        assert_eq!(host.os, "linux");
        #[cfg(target_os = "macos")]
        assert_eq!(host.os, "darwin");
        #[cfg(target_os = "windows")]
        assert_eq!(host.os, "windows");

        #[cfg(target_arch = "x86_64")]
        assert_eq!(host.arch, "amd64");
        #[cfg(target_arch = "aarch64")]
        assert_eq!(host.arch, "arm64");
    }

    #[test]
    fn test_parse_os_arch_pair() {
        assert_eq!(
            "linux/arm64".parse::<Platform>().unwrap(),
            platform("linux", "arm64")
        );
        assert_eq!(
            "macos/aarch64".parse::<Platform>().unwrap(),
            platform("darwin", "arm64")
        );
        assert_eq!(
            "Windows/x86_64".parse::<Platform>().unwrap(),
            platform("windows", "amd64")
        );
    }

    #[test]
    fn test_parse_without_slash_detects() {
        assert_eq!(
            "linux".parse::<Platform>().unwrap(),
            platform("linux", "amd64")
        );
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!(matches!(
            "plan9/amd64".parse::<Platform>(),
            Err(Error::PlatformUndetected(_))
        ));
        assert!(matches!(
            "linux/sparc".parse::<Platform>(),
            Err(Error::PlatformUndetected(_))
        ));
        assert!("amd64".parse::<Platform>().is_err());
    }

    #[test]
    fn test_platform_display() {
        assert_eq!(platform("linux", "amd64").to_string(), "linux/amd64");
    }
}
