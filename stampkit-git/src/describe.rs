//! Parsing of `git describe --long` output and version tags.

use crate::error::ResolveError;
use semver::Version;

/// One line of `git describe --tags --long` output: `<tag>-<distance>-g<sha>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Describe {
    pub tag: String,
    /// Commits between the tag and `HEAD`.
    pub distance: u64,
    pub commit: String,
}

/// Parse a `--long` describe line. Tags may themselves contain dashes.
pub fn parse_describe(line: &str) -> Result<Describe, ResolveError> {
    let line = line.trim();
    let malformed = || ResolveError::MalformedDescribe {
        output: line.to_string(),
    };

    let mut parts = line.rsplitn(3, '-');
    let sha = parts.next().ok_or_else(malformed)?;
    let distance = parts.next().ok_or_else(malformed)?;
    let tag = parts.next().ok_or_else(malformed)?;

    let commit = sha.strip_prefix('g').ok_or_else(malformed)?;
    if tag.is_empty() || commit.is_empty() || !commit.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(malformed());
    }
    let distance = distance.parse::<u64>().map_err(|_| malformed())?;

    Ok(Describe {
        tag: tag.to_string(),
        distance,
        commit: commit.to_string(),
    })
}

/// Read a version out of a tag such as `v1.4` or `v1.4.2-rc.1`.
///
/// `prefix` is stripped when present. A two-component tag gets patch `0`.
pub fn version_from_tag(tag: &str, prefix: &str) -> Result<Version, ResolveError> {
    let bare = tag.strip_prefix(prefix).unwrap_or(tag);
    let invalid = || ResolveError::InvalidTag {
        tag: tag.to_string(),
    };

    if let Ok(v) = Version::parse(bare) {
        return Ok(v);
    }

    // MAJOR.MINOR
    let (major, minor) = bare.split_once('.').ok_or_else(invalid)?;
    let major = major.parse::<u64>().map_err(|_| invalid())?;
    let minor = minor.parse::<u64>().map_err(|_| invalid())?;
    Ok(Version::new(major, minor, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn parses_plain_describe() {
        let d = parse_describe("v1.2-5-g1a2b3c4\n").unwrap();
        assert_eq!(
            d,
            Describe {
                tag: "v1.2".to_string(),
                distance: 5,
                commit: "1a2b3c4".to_string(),
            }
        );
    }

    #[test]
    fn tag_may_contain_dashes() {
        let d = parse_describe("v2.0.0-rc-1-0-gdeadbeef").unwrap();
        assert_eq!(d.tag, "v2.0.0-rc-1");
        assert_eq!(d.distance, 0);
    }

    #[test]
    fn rejects_short_describe() {
        assert!(matches!(
            parse_describe("v1.2"),
            Err(ResolveError::MalformedDescribe { .. })
        ));
        assert!(parse_describe("v1.2-x-gabc").is_err());
        assert!(parse_describe("v1.2-3-abc").is_err());
        assert!(parse_describe("v1.2-3-gxyz").is_err());
    }

    #[test]
    fn two_component_tag_has_zero_patch() {
        assert_eq!(version_from_tag("v3.1", "v").unwrap(), Version::new(3, 1, 0));
    }

    #[test]
    fn full_semver_tag_keeps_prerelease() {
        let v = version_from_tag("v1.4.2-rc.1", "v").unwrap();
        assert_eq!(v.to_string(), "1.4.2-rc.1");
    }

    #[test]
    fn prefix_is_optional() {
        assert_eq!(version_from_tag("0.9.1", "v").unwrap(), Version::new(0, 9, 1));
        assert_eq!(
            version_from_tag("release-2.0", "release-").unwrap(),
            Version::new(2, 0, 0)
        );
    }

    #[test]
    fn rejects_non_numeric_tag() {
        assert!(matches!(
            version_from_tag("vnext", "v"),
            Err(ResolveError::InvalidTag { tag }) if tag == "vnext"
        ));
        assert!(version_from_tag("v1", "v").is_err());
        assert!(version_from_tag("v1.x", "v").is_err());
    }

    proptest! {
        #[test]
        fn describe_recovers_components(
            major in 0u64..100,
            minor in 0u64..100,
            distance in 0u64..10_000,
            sha in "[0-9a-f]{7,12}",
        ) {
            let line = format!("v{major}.{minor}-{distance}-g{sha}");
            let d = parse_describe(&line).unwrap();
            prop_assert_eq!(d.tag, format!("v{major}.{minor}"));
            prop_assert_eq!(d.distance, distance);
            prop_assert_eq!(d.commit, sha);
        }
    }
}
