//! Canonical orderings for collections whose order carries no meaning.
//!
//! Hashing feeds the digests of unordered collections (tags, environment
//! variables, container definitions, port mappings) in the order returned
//! here, so permuting the input never changes the final digest. Sorting only
//! ever happens on the digests computed for hashing; caller-visible fields
//! keep the order they were given in.
//!
//! Elements are ordered by their semantic key (tag key, variable name,
//! container name, port pair). Elements with equal keys are ordered by their
//! own digest, which makes the order total.

use crate::hash::DefinitionHasher;
use std::collections::HashMap;

/// Returns the digest of every item, ordered by `(key, digest)`.
pub fn ordered_digests<T, K, I>(
    items: I,
    key: impl Fn(&T) -> K,
    digest: impl Fn(&T) -> String,
) -> Vec<String>
where
    K: Ord,
    I: IntoIterator<Item = T>,
{
    let mut keyed: Vec<(K, String)> = items
        .into_iter()
        .map(|item| (key(&item), digest(&item)))
        .collect();
    keyed.sort();
    keyed.into_iter().map(|(_, d)| d).collect()
}

/// Returns the digest of every tag entry, ordered by key.
pub fn tag_digests(tags: &HashMap<String, String>) -> Vec<String> {
    ordered_digests(
        tags.iter(),
        |(k, _)| *k,
        |(k, v)| {
            let mut h = DefinitionHasher::new();
            h.add("key", k);
            h.add("value", v);
            h.finish()
        },
    )
}

/// Returns map entries sorted by key.
pub fn sorted_entries(map: &HashMap<String, String>) -> Vec<(&str, &str)> {
    let mut entries: Vec<(&str, &str)> = map
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    entries.sort_unstable();
    entries
}
