use crate::CatalogError;
use regex::Regex;

/// Substrings that mark a tag as a pre-release. Any tag containing one of
/// these anywhere is excluded unconditionally — only finalized releases are
/// ever cataloged.
pub const PRE_RELEASE_MARKERS: [&str; 3] = ["alpha", "beta", "rc"];

/// Compiled tag matcher for one (image-type, distribution) combination.
///
/// The full pattern is the configurable base version pattern followed by the
/// regex-escaped `-{image-type}-{distribution}` suffix, anchored at both ends
/// so partial matches never slip through. The base pattern's first capture
/// group is the major version.
#[derive(Debug)]
pub struct TagPattern {
    suffix: String,
    regex: Regex,
}

impl TagPattern {
    pub fn new(base: &str, image_type: &str, distribution: &str) -> Result<Self, CatalogError> {
        let suffix = format!("-{image_type}-{distribution}");
        let anchored = format!("^{base}{}$", regex::escape(&suffix));
        let regex = Regex::new(&anchored).map_err(|source| CatalogError::Pattern {
            pattern: base.to_owned(),
            source,
        })?;
        // captures_len counts the implicit whole-match group.
        if regex.captures_len() < 2 {
            return Err(CatalogError::MissingMajorGroup(base.to_owned()));
        }
        Ok(Self { suffix, regex })
    }

    /// The `-{image-type}-{distribution}` suffix this pattern expects.
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn matches(&self, tag: &str) -> bool {
        self.regex.is_match(tag)
    }

    /// Extract the major version from a matching tag via the first capture
    /// group. `Ok(None)` for tags that do not match at all — absent format is
    /// expected, not an error.
    pub fn major_of(&self, tag: &str) -> Result<Option<u32>, CatalogError> {
        let Some(caps) = self.regex.captures(tag) else {
            return Ok(None);
        };
        let group = caps
            .get(1)
            .ok_or_else(|| CatalogError::MissingMajorGroup(self.regex.as_str().to_owned()))?;
        let major = group
            .as_str()
            .parse()
            .map_err(|_| CatalogError::InvalidMajor {
                tag: tag.to_owned(),
            })?;
        Ok(Some(major))
    }
}

/// True if the tag carries a pre-release marker anywhere in its text.
pub fn is_pre_release_tag(tag: &str) -> bool {
    PRE_RELEASE_MARKERS.iter().any(|marker| tag.contains(marker))
}

/// Keep only finalized tags matching the pattern for this combination.
/// Non-matching tags are dropped silently; the tag source is expected to
/// contain entries for other image families and formats.
pub fn filter_tags(tags: &[String], pattern: &TagPattern) -> Vec<String> {
    tags.iter()
        .filter(|tag| !is_pre_release_tag(tag))
        .filter(|tag| pattern.matches(tag))
        .cloned()
        .collect()
}
