use std::collections::HashSet;

use flokkr_utils::constants::LATEST_TAG;
use log::trace;
use serde::Serialize;

/// The tags a single version owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionTag {
    pub version: String,
    pub tags: Vec<String>,
}

/// The tags for every version of a descriptor.
///
/// Entries are kept in the order the versions were declared in
/// so that building and deploying always happen in the same order.
/// A tag is only ever owned by one version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct VersionTags(Vec<VersionTag>);

impl VersionTags {
    /// Resolves the tags for an ordered list of versions.
    ///
    /// The first version receives `latest`. Every version then claims
    /// its full version string followed by each shorter dot separated
    /// prefix, most specific first. Any tag already claimed by an
    /// earlier version is skipped.
    ///
    /// # Examples
    /// ```
    /// use flokkr_descriptor::VersionTags;
    ///
    /// let tags = VersionTags::resolve(["3.1.2", "3.2.0"]);
    /// assert_eq!(tags.get("3.1.2").unwrap(), ["latest", "3.1.2", "3.1", "3"]);
    /// assert_eq!(tags.get("3.2.0").unwrap(), ["3.2.0", "3.2"]);
    /// ```
    pub fn resolve<I, S>(versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut used_tags: HashSet<String> = HashSet::new();

        let entries = versions
            .into_iter()
            .enumerate()
            .map(|(index, version)| {
                let version = version.as_ref();
                let mut tags = Vec::new();

                if index == 0 && used_tags.insert(LATEST_TAG.into()) {
                    tags.push(LATEST_TAG.to_string());
                }

                let parts = version.split('.').collect::<Vec<_>>();
                for end in (1..=parts.len()).rev() {
                    let tag = parts[..end].join(".");

                    if used_tags.insert(tag.clone()) {
                        tags.push(tag);
                    } else {
                        trace!("Tag {tag} already claimed, skipping for {version}");
                    }
                }

                trace!("Resolved tags for {version}: {tags:?}");
                VersionTag {
                    version: version.to_string(),
                    tags,
                }
            })
            .collect();

        Self(entries)
    }

    /// The tags owned by `version`, if it was resolved.
    #[must_use]
    pub fn get(&self, version: &str) -> Option<&[String]> {
        self.0
            .iter()
            .find(|entry| entry.version == version)
            .map(|entry| entry.tags.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = &VersionTag> {
        self.0.iter()
    }

    /// Every tag of every version in declaration order.
    pub fn all_tags(&self) -> impl Iterator<Item = &str> {
        self.0
            .iter()
            .flat_map(|entry| entry.tags.iter().map(String::as_str))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a VersionTags {
    type Item = &'a VersionTag;
    type IntoIter = std::slice::Iter<'a, VersionTag>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashSet;

    use flokkr_utils::string_vec;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::VersionTags;

    #[rstest]
    #[case::ascending(
        &["3.1.2", "3.2.0", "3.2.1"],
        vec![
            string_vec!["latest", "3.1.2", "3.1", "3"],
            string_vec!["3.2.0", "3.2"],
            string_vec!["3.2.1"],
        ],
    )]
    #[case::descending(
        &["3.2.1", "3.2.0", "3.1.2"],
        vec![
            string_vec!["latest", "3.2.1", "3.2", "3"],
            string_vec!["3.2.0"],
            string_vec!["3.1.2", "3.1"],
        ],
    )]
    #[case::mixed_component_counts(
        &["2", "2.1", "1.0.0.1"],
        vec![
            string_vec!["latest", "2"],
            string_vec!["2.1"],
            string_vec!["1.0.0.1", "1.0.0", "1.0", "1"],
        ],
    )]
    #[case::duplicate_version(
        &["1.0", "1.0"],
        vec![string_vec!["latest", "1.0", "1"], vec![]],
    )]
    #[case::single_component(&["7"], vec![string_vec!["latest", "7"]])]
    #[case::latest_as_version(
        &["latest", "1.0"],
        vec![string_vec!["latest"], string_vec!["1.0", "1"]],
    )]
    fn resolve(#[case] versions: &[&str], #[case] expected: Vec<Vec<String>>) {
        let resolved = VersionTags::resolve(versions);

        let tags = resolved
            .iter()
            .map(|entry| entry.tags.clone())
            .collect::<Vec<_>>();
        let order = resolved
            .iter()
            .map(|entry| entry.version.as_str())
            .collect::<Vec<_>>();

        assert_eq!(order, versions);
        assert_eq!(tags, expected);
    }

    #[test]
    fn first_declared_claims_latest_and_shared_prefixes() {
        let resolved = VersionTags::resolve(["3.1.2", "3.2.0", "3.2.1"]);

        assert_eq!(
            resolved.get("3.1.2").unwrap(),
            string_vec!["latest", "3.1.2", "3.1", "3"]
        );
        assert_eq!(resolved.get("3.2.0").unwrap(), string_vec!["3.2.0", "3.2"]);
        assert_eq!(resolved.get("3.2.1").unwrap(), string_vec!["3.2.1"]);
        assert!(resolved.get("3.3.0").is_none());
    }

    #[rstest]
    #[case(&["3.1.2", "3.2.0", "3.2.1"])]
    #[case(&["1.10.0", "1.1.0", "1.1", "10", "1.0.10"])]
    #[case(&["0.9", "0.10.1", "0.10", "0", "0.9.0"])]
    fn tags_are_globally_unique(#[case] versions: &[&str]) {
        let resolved = VersionTags::resolve(versions);

        let mut seen = HashSet::new();
        for tag in resolved.all_tags() {
            assert!(seen.insert(tag), "tag {tag} assigned twice");
        }

        let latest_owners = resolved
            .iter()
            .filter(|entry| entry.tags.iter().any(|tag| tag == "latest"))
            .map(|entry| entry.version.as_str())
            .collect::<Vec<_>>();
        assert_eq!(latest_owners, [versions[0]]);
    }

    #[test]
    fn resolve_is_deterministic() {
        let versions = ["2.7.7", "3.0.0", "2.8.5", "3.0.1"];

        assert_eq!(VersionTags::resolve(versions), VersionTags::resolve(versions));
    }

    #[test]
    fn resolve_empty() {
        let resolved = VersionTags::resolve(Vec::<String>::new());

        assert!(resolved.is_empty());
        assert_eq!(resolved.all_tags().count(), 0);
    }
}
