use std::{ops::Deref, str::FromStr};

use semver::{BuildMetadata, Prerelease};
use snafu::{ResultExt as _, Snafu};

/// Oldest server line the default access types and endpoints are known to work with
pub const MIN_SUPPORTED_VERSION: semver::Version = semver::Version::new(1, 0, 0);

/// Represent an OpenMetadata server version as a Semver
///
/// Releases are proper semver (`1.3.1`), sometimes with a leading `v` or a suffix such as
/// `-SNAPSHOT`. Anything else is kept as a 0.0.0 pre-release so it still orders below
/// every real release.
#[derive(Debug, PartialOrd, PartialEq)]
pub struct CatalogVersion(semver::Version);

impl CatalogVersion {
    pub fn is_supported(&self) -> bool {
        self.0 >= MIN_SUPPORTED_VERSION
    }
}

impl Deref for CatalogVersion {
    type Target = semver::Version;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("unable to construct a 0.0.0 pre-release semver from {input:?}"))]
    ConstructSemver {
        source: semver::Error,
        input: String,
    },
}

impl FromStr for CatalogVersion {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim().trim_start_matches('v');
        let version = match semver::Version::parse(trimmed) {
            Ok(version) => version,
            Err(_) => semver::Version {
                major: 0,
                minor: 0,
                patch: 0,
                pre: Prerelease::new(&trimmed.replace(|c: char| !c.is_ascii_alphanumeric(), "-"))
                    .context(ConstructSemverSnafu { input })?,
                build: BuildMetadata::EMPTY,
            },
        };
        Ok(Self(version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1.3.1", 1, 3, 1, true)]
    #[case("v1.2.0", 1, 2, 0, true)]
    #[case("1.4.0-SNAPSHOT", 1, 4, 0, true)]
    #[case("0.13.2", 0, 13, 2, false)]
    #[case("0.13.2.5", 0, 0, 0, false)]
    fn test_catalog_version(
        #[case] input: &str,
        #[case] major: u64,
        #[case] minor: u64,
        #[case] patch: u64,
        #[case] supported: bool,
    ) {
        let version = CatalogVersion::from_str(input).unwrap();
        assert_eq!((version.major, version.minor, version.patch), (major, minor, patch));
        assert_eq!(version.is_supported(), supported);
    }

    #[test]
    fn test_snapshot_is_still_supported_pre_release() {
        let version = CatalogVersion::from_str("1.4.0-SNAPSHOT").unwrap();
        assert_eq!(version.pre.as_str(), "SNAPSHOT");
        assert!(version.is_supported());
        assert!(!CatalogVersion::from_str("1.0.0-rc1").unwrap().is_supported());
    }

    #[test]
    fn test_unrepresentable_version() {
        // numeric pre-release identifiers must not have leading zeros
        assert!(CatalogVersion::from_str("01").is_err());
    }
}
