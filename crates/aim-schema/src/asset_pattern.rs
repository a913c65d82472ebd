//! Asset name classification for AppImage releases.
//! Projects label non-primary builds inconsistently: arm/armhf/arm64, aarch64, i386/i686, linux32.

use serde::{Deserialize, Serialize};

/// CPU architecture keyword found in an asset filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArchVariant {
    /// Intel/AMD 64-bit (`x86_64`, `amd64`, `x64`), the primary target.
    X86_64,
    /// ARM builds labelled `arm`, `armhf`, `armv7l`, `arm64`.
    Arm,
    /// ARM 64-bit builds labelled `aarch64`.
    Aarch64,
    /// 32-bit Intel builds (`i386`, `i686`, ..., `linux32`).
    X86_32,
}

impl ArchVariant {
    /// Whether assets of this architecture are skipped when picking a download.
    pub fn is_excluded(self) -> bool {
        !matches!(self, Self::X86_64)
    }
}

/// A parsed representation of an asset filename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetPattern {
    /// Detected architecture, if any keyword was found.
    pub arch: Option<ArchVariant>,
    /// The name ends in `.AppImage` (any case).
    pub appimage: bool,
}

impl AssetPattern {
    /// Try to parse semantic meaning from a filename.
    pub fn from_filename(filename: &str) -> Self {
        let f = filename.to_lowercase();

        let arch = if f.contains("aarch") {
            Some(ArchVariant::Aarch64)
        } else if f.contains("arm") {
            Some(ArchVariant::Arm)
        } else if f.contains("linux32") || contains_i_three_digits(&f) {
            Some(ArchVariant::X86_32)
        } else if f.contains("x86_64") || f.contains("amd64") || f.contains("x64") {
            Some(ArchVariant::X86_64)
        } else {
            None
        };

        Self {
            arch,
            appimage: is_appimage(&f),
        }
    }

    /// True for builds that are not the portable/primary architecture.
    ///
    /// Assets with no architecture keyword are assumed to be the primary build.
    pub fn is_excluded(&self) -> bool {
        self.arch.is_some_and(ArchVariant::is_excluded)
    }
}

/// Case-insensitive check for the `.AppImage` suffix.
pub fn is_appimage(filename: &str) -> bool {
    filename.to_lowercase().ends_with(".appimage")
}

/// Matches `i` followed by three ASCII digits anywhere (`i386`, `i686`).
fn contains_i_three_digits(s: &str) -> bool {
    s.as_bytes()
        .windows(4)
        .any(|w| w[0] == b'i' && w[1..].iter().all(u8::is_ascii_digit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_parsing() {
        let p1 = AssetPattern::from_filename("Tool-2.0-x86_64.AppImage");
        assert_eq!(p1.arch, Some(ArchVariant::X86_64));
        assert!(p1.appimage);
        assert!(!p1.is_excluded());

        let p2 = AssetPattern::from_filename("tool-2.0-aarch64.appimage");
        assert_eq!(p2.arch, Some(ArchVariant::Aarch64));
        assert!(p2.appimage);

        let p3 = AssetPattern::from_filename("tool-2.0.tar.gz");
        assert_eq!(p3.arch, None);
        assert!(!p3.appimage);
    }

    #[test]
    fn test_exclusions() {
        for name in [
            "tool-armhf.AppImage",
            "tool-arm64.AppImage",
            "Tool-ARMv7l.AppImage",
            "tool-aarch64.AppImage",
            "tool-i386.AppImage",
            "tool-i686.AppImage",
            "tool-linux32.AppImage",
        ] {
            assert!(AssetPattern::from_filename(name).is_excluded(), "{name}");
        }

        for name in ["tool.AppImage", "tool-x86_64.AppImage", "tool-linux64.AppImage"] {
            assert!(!AssetPattern::from_filename(name).is_excluded(), "{name}");
        }
    }

    #[test]
    fn test_i_digits_needs_three_digits() {
        assert!(contains_i_three_digits("build-i386"));
        assert!(!contains_i_three_digits("build-i38"));
        assert!(!contains_i_three_digits("v1.2.3"));
    }
}
