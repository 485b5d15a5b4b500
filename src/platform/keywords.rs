//! Keyword tables mapping canonical platform tokens to the spellings that
//! appear in release asset names.
//!
//! Tokens are listed in ascending order; when two tokens match with keywords
//! of the same length, the one listed first wins.

/// A static mapping from canonical token to the keywords that identify it.
#[derive(Debug, Clone, Copy)]
pub struct KeywordTable {
    entries: &'static [(&'static str, &'static [&'static str])],
}

impl KeywordTable {
    pub const fn new(entries: &'static [(&'static str, &'static [&'static str])]) -> Self {
        Self { entries }
    }

    /// Returns `(token, keyword)` for the longest keyword contained in `haystack`.
    ///
    /// The comparison is case-insensitive. The search spans the whole table, so
    /// a long keyword of one token beats a shorter keyword of another.
    pub fn longest_match(&self, haystack: &str) -> Option<(&'static str, &'static str)> {
        let haystack = haystack.to_lowercase();
        let mut best: Option<(&'static str, &'static str)> = None;

        for (token, keywords) in self.entries {
            for keyword in keywords.iter() {
                if keyword.is_empty() || !haystack.contains(&keyword.to_lowercase()) {
                    continue;
                }
                // Strictly longer only: equal lengths keep the earlier entry.
                if best.is_none_or(|(_, current)| keyword.len() > current.len()) {
                    best = Some((token, keyword));
                }
            }
        }

        best
    }
}

pub const OS_KEYWORDS: KeywordTable = KeywordTable::new(&[
    ("aix", &["aix"]),
    ("android", &["android"]),
    ("darwin", &["darwin", "macos", "mac", "osx", "apple"]),
    ("dragonfly", &["dragonfly"]),
    ("freebsd", &["freebsd"]),
    ("illumos", &["illumos"]),
    ("linux", &["linux"]),
    ("netbsd", &["netbsd"]),
    ("openbsd", &["openbsd"]),
    ("solaris", &["solaris", "sunos"]),
    ("windows", &["windows", "win", "win32", "win64", ".exe"]),
]);

pub const ARCH_KEYWORDS: KeywordTable = KeywordTable::new(&[
    ("386", &["386", "i386", "i686", "x86", "32bit", "32-bit"]),
    (
        "amd64",
        &["amd64", "x86_64", "x86-64", "x64", "64bit", "64-bit"],
    ),
    ("arm", &["arm", "armv6", "armv7", "armhf", "armel", "arm32"]),
    ("arm64", &["arm64", "aarch64", "aarch_64", "armv8"]),
    ("loong64", &["loong64", "loongarch64"]),
    ("mips", &["mips"]),
    ("mips64", &["mips64"]),
    ("mips64le", &["mips64le", "mips64el"]),
    ("mipsle", &["mipsle", "mipsel"]),
    ("ppc64", &["ppc64", "powerpc64"]),
    ("ppc64le", &["ppc64le", "powerpc64le"]),
    ("riscv64", &["riscv64"]),
    ("s390x", &["s390x"]),
]);
