//! Prefix and delimiter grouping over a bucket's key namespace.
//!
//! Keys are fed in lexicographic byte order (the object store keeps them in a
//! `BTreeMap`), so both the direct results and the common prefixes come out
//! sorted. No pagination is computed here; callers always get the full set.

use std::collections::HashSet;

/// Output of [`prefix_query`].
#[derive(Debug, Clone)]
pub struct PrefixQuery<T> {
    /// Entries whose key has no delimiter after the prefix.
    pub keys: Vec<T>,
    /// Deduplicated "folder" prefixes, each ending with the delimiter.
    pub common_prefixes: Vec<String>,
}

impl<T> Default for PrefixQuery<T> {
    fn default() -> Self {
        Self {
            keys: Vec::new(),
            common_prefixes: Vec::new(),
        }
    }
}

/// Group `(key, entry)` pairs by `prefix` and `delimiter`.
///
/// Keys not starting with `prefix` are dropped. For the rest, the first
/// occurrence of `delimiter` after the prefix makes the key collapse into the
/// common prefix `prefix + ... + delimiter`; otherwise the entry is a direct
/// result. An empty delimiter behaves like no delimiter. Several entries may
/// share a key (version listings); each one is kept.
///
/// # Examples
///
/// ```
/// use s3emu_core::listing::prefix_query;
///
/// let keys = ["a/b", "a/c", "d"];
/// let result = prefix_query(keys.iter().map(|k| (*k, *k)), "", Some("/"));
/// assert_eq!(result.keys, vec!["d"]);
/// assert_eq!(result.common_prefixes, vec!["a/".to_owned()]);
/// ```
pub fn prefix_query<'a, T>(
    entries: impl IntoIterator<Item = (&'a str, T)>,
    prefix: &str,
    delimiter: Option<&str>,
) -> PrefixQuery<T> {
    let delimiter = delimiter.filter(|d| !d.is_empty());
    let mut result = PrefixQuery::default();
    let mut seen_prefixes = HashSet::new();

    for (key, entry) in entries {
        let Some(after_prefix) = key.strip_prefix(prefix) else {
            continue;
        };

        if let Some(delim) = delimiter {
            if let Some(pos) = after_prefix.find(delim) {
                let cp = format!("{}{}{}", prefix, &after_prefix[..pos], delim);
                if seen_prefixes.insert(cp.clone()) {
                    result.common_prefixes.push(cp);
                }
                continue;
            }
        }

        result.keys.push(entry);
    }

    result
}
