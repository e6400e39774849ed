//! Typed value objects for chapters and versions.
//!
//! Directory names are parsed once at the boundary; everything downstream
//! works with `u32` chapter numbers and [`Version`] triples.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::ChapterError;

static CHAPTER_DIR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^chapter\s+(\d+)$").expect("chapter directory pattern is valid")
});

static VERSION_DIR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(v?)(\d+)\.(\d+)\.(\d+)$").expect("version directory pattern is valid")
});

/// Semantic version of one chapter snapshot. Ordering is lexicographic on
/// `(major, minor, patch)`. Serializes as its directory name (`"v1.2.3"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    pub const INITIAL: Version = Version::new(1, 0, 0);

    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse a version directory name (`v1.2.3` or `1.2.3`).
    ///
    /// Returns the version and whether the name used the canonical `v` prefix.
    pub fn parse_dir_name(name: &str) -> Option<(Version, bool)> {
        let caps = VERSION_DIR_RE.captures(name)?;
        let canonical = !caps[1].is_empty();
        let major = caps[2].parse().ok()?;
        let minor = caps[3].parse().ok()?;
        let patch = caps[4].parse().ok()?;
        Some((Version::new(major, minor, patch), canonical))
    }

    /// Next version for `kind`. Lower components reset to zero.
    pub fn bump(self, kind: BumpKind) -> Version {
        match kind {
            BumpKind::Major => Version::new(self.major.saturating_add(1), 0, 0),
            BumpKind::Minor => Version::new(self.major, self.minor.saturating_add(1), 0),
            BumpKind::Patch => Version::new(self.major, self.minor, self.patch.saturating_add(1)),
        }
    }

    /// Canonical directory name, identical to `Display`.
    pub fn dir_name(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Which component of a [`Version`] to increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BumpKind {
    Major,
    Minor,
    Patch,
}

impl FromStr for BumpKind {
    type Err = ChapterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "major" => Ok(Self::Major),
            "minor" => Ok(Self::Minor),
            "patch" => Ok(Self::Patch),
            other => Err(ChapterError::InvalidFormat(format!(
                "bump type '{other}' (use major, minor, or patch)"
            ))),
        }
    }
}

impl fmt::Display for BumpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Major => "major",
            Self::Minor => "minor",
            Self::Patch => "patch",
        };
        f.write_str(name)
    }
}

/// Parse a chapter directory name (`Chapter 7`, case-insensitive).
///
/// Chapter numbers are positive; `Chapter 0` does not parse.
pub fn parse_chapter_dir_name(name: &str) -> Option<u32> {
    let caps = CHAPTER_DIR_RE.captures(name)?;
    let num: u32 = caps[1].parse().ok()?;
    (num > 0).then_some(num)
}

/// Canonical directory name for chapter `num`.
pub fn chapter_dir_name(num: u32) -> String {
    format!("Chapter {num}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_prefixed_and_bare_versions() {
        assert_eq!(
            Version::parse_dir_name("v1.2.3"),
            Some((Version::new(1, 2, 3), true))
        );
        assert_eq!(
            Version::parse_dir_name("1.0.0"),
            Some((Version::new(1, 0, 0), false))
        );
    }

    #[test]
    fn rejects_partial_version_names() {
        assert_eq!(Version::parse_dir_name("v1.2"), None);
        assert_eq!(Version::parse_dir_name("v1.2.3-draft"), None);
        assert_eq!(Version::parse_dir_name("notes"), None);
        assert_eq!(Version::parse_dir_name("v99999999999.0.0"), None);
    }

    #[test]
    fn formats_with_v_prefix() {
        assert_eq!(Version::new(1, 2, 3).to_string(), "v1.2.3");
        assert_eq!(Version::INITIAL.dir_name(), "v1.0.0");
    }

    #[test]
    fn serializes_as_directory_name() {
        let json = serde_json::to_string(&Version::new(1, 1, 0)).expect("serialize");
        assert_eq!(json, "\"v1.1.0\"");
    }

    #[test]
    fn bump_resets_lower_components() {
        let v = Version::new(1, 4, 7);
        assert_eq!(v.bump(BumpKind::Patch), Version::new(1, 4, 8));
        assert_eq!(v.bump(BumpKind::Minor), Version::new(1, 5, 0));
        assert_eq!(v.bump(BumpKind::Major), Version::new(2, 0, 0));
    }

    #[test]
    fn ordering_is_numeric_not_lexical() {
        assert!(Version::new(1, 10, 0) > Version::new(1, 9, 9));
        assert!(Version::new(2, 0, 0) > Version::new(1, 99, 99));
    }

    #[test]
    fn bump_kind_parses_case_insensitively() {
        assert_eq!("Minor".parse::<BumpKind>().expect("parse"), BumpKind::Minor);
        let err = "huge".parse::<BumpKind>().expect_err("invalid kind");
        assert!(err.to_string().contains("huge"));
    }

    #[test]
    fn chapter_names_match_case_insensitively() {
        assert_eq!(parse_chapter_dir_name("Chapter 7"), Some(7));
        assert_eq!(parse_chapter_dir_name("chapter   12"), Some(12));
        assert_eq!(parse_chapter_dir_name("CHAPTER 3"), Some(3));
    }

    #[test]
    fn chapter_names_reject_noise() {
        assert_eq!(parse_chapter_dir_name("Chapter 0"), None);
        assert_eq!(parse_chapter_dir_name("Chapter"), None);
        assert_eq!(parse_chapter_dir_name("Chapter 3 (old)"), None);
        assert_eq!(parse_chapter_dir_name("__tmp_chapter_0__"), None);
        assert_eq!(parse_chapter_dir_name("Appendix 1"), None);
    }

    #[test]
    fn canonical_chapter_name() {
        assert_eq!(chapter_dir_name(4), "Chapter 4");
    }
}
