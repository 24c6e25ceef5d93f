use crate::filter::TagPattern;
use crate::CatalogError;
use std::collections::BTreeMap;
use tagbook_version::ParsedVersion;
use tracing::debug;

/// Pick the newest tag per major version.
///
/// Majors below `min_major` are discarded entirely. The remaining tags are
/// normalized (a tag that matched the filter but fails normalization is a
/// pattern/normalizer mismatch and aborts the run), sorted newest-first, and
/// walked once keeping the first tag seen per major — the greedy walk after a
/// total-order sort always yields the true maximum per group.
pub fn select_newest_per_major(
    tags: &[String],
    pattern: &TagPattern,
    min_major: u32,
) -> Result<BTreeMap<u32, String>, CatalogError> {
    let mut candidates: Vec<(ParsedVersion, &String, u32)> = Vec::with_capacity(tags.len());

    for tag in tags {
        let Some(major) = pattern.major_of(tag)? else {
            continue;
        };
        if major < min_major {
            debug!("skipping '{tag}': major {major} below supported minimum {min_major}");
            continue;
        }
        let stripped = tag.strip_suffix(pattern.suffix()).unwrap_or(tag);
        let parsed = ParsedVersion::parse(stripped)?;
        candidates.push((parsed, tag, major));
    }

    // Newest first. Ties on the parsed value are broken by the raw tag string
    // so the selection never depends on input order.
    candidates.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| b.1.cmp(a.1)));

    let mut selected = BTreeMap::new();
    for (_, tag, major) in candidates {
        selected.entry(major).or_insert_with(|| tag.clone());
    }
    Ok(selected)
}
