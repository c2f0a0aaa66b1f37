//! Version extraction from CLI banner output.
//!
//! Pulls a `major.minor.patch` version out of `--version` banner text such
//! as `stellar 21.4.1 (abcdef)`, ignoring date-like and path-like number
//! groups.

use std::sync::LazyLock;

use regex::Regex;

use preflight_core::Version;

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bv?(\d{1,4})\.(\d{1,4})(?:\.(\d{1,6}))?(?:[-+][A-Za-z0-9._-]+)?\b")
        .expect("version regex")
});

/// Extracts the first plausible version from banner text.
///
/// Only the first few lines are considered; banners put the version up top
/// and later lines tend to contain dates, paths, and dependency listings.
///
/// # Examples
///
/// ```
/// use preflight_checks::version::extract_version;
/// use preflight_core::Version;
///
/// assert_eq!(
///     extract_version("stellar 21.4.1 (build abc)"),
///     Some(Version::new(21, 4, 1)),
/// );
/// assert_eq!(extract_version("no numbers here"), None);
/// ```
pub fn extract_version(text: &str) -> Option<Version> {
    for line in text.lines().take(5) {
        for captures in VERSION_RE.captures_iter(line) {
            let full = captures.get(0).expect("whole match");

            // Path-like: preceded by a slash.
            let start = full.start();
            if start > 0 && matches!(line.as_bytes()[start - 1], b'/' | b'\\') {
                continue;
            }

            let major: u32 = captures[1].parse().ok()?;
            let minor: u32 = captures[2].parse().ok()?;
            let patch: u32 = captures
                .get(3)
                .map_or(Some(0), |m| m.as_str().parse().ok())?;

            // Date-like: year.month layouts (2024.01 and friends).
            if (2000..2100).contains(&major) && (1..=12).contains(&minor) {
                continue;
            }

            return Some(Version::new(major, minor, patch));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banner_with_suffix() {
        assert_eq!(
            extract_version("stellar 21.4.1-rc.2 (abcdef123)"),
            Some(Version::new(21, 4, 1))
        );
    }

    #[test]
    fn test_v_prefix() {
        assert_eq!(
            extract_version("mycli v2.0.3"),
            Some(Version::new(2, 0, 3))
        );
    }

    #[test]
    fn test_two_component_version() {
        assert_eq!(extract_version("tool 24.0"), Some(Version::new(24, 0, 0)));
    }

    #[test]
    fn test_rejects_date() {
        assert_eq!(extract_version("released 2024.01.15"), None);
    }

    #[test]
    fn test_rejects_path_component() {
        assert_eq!(extract_version("loaded from /opt/tool/1.2.3/bin"), None);
    }

    #[test]
    fn test_only_leading_lines_scanned() {
        let text = "banner line\nsecond\nthird\nfourth\nfifth\nversion 9.9.9 too late";
        assert_eq!(extract_version(text), None);
    }

    #[test]
    fn test_no_version() {
        assert_eq!(extract_version("usage: tool [options]"), None);
    }
}
