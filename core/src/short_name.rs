//! Collision-free short option names.
//!
//! Names are processed in lexicographic order so the result does not depend
//! on declaration order. Reserved names (`help`, and `version` when enabled)
//! are seeded first with fixed letters that no parameter can claim.

use std::collections::{BTreeMap, HashSet};

use crate::types::{HELP_ARGUMENT, VERSION_ARGUMENT};

/// Short name reserved for `--help`.
pub const HELP_SHORT: &str = "h";

/// Short name reserved for `--version`.
pub const VERSION_SHORT: &str = "V";

/// Picks the shortest free abbreviation of `name`.
///
/// For each prefix length, the lowercase prefix is tried, then its
/// uppercase form. The full name is the last resort; in the degenerate case
/// where even that is taken, a numeric suffix is appended.
///
/// # Examples
///
/// ```
/// use std::collections::HashSet;
/// use lazyarg_core::abbreviate;
///
/// let taken: HashSet<String> = ["l", "L", "lo"].iter().map(|s| s.to_string()).collect();
/// assert_eq!(abbreviate("lola", &taken), "LO");
/// assert_eq!(abbreviate("lola", &HashSet::new()), "l");
/// ```
pub fn abbreviate(name: &str, taken: &HashSet<String>) -> String {
    let chars: Vec<char> = name.chars().collect();
    for size in 1..=chars.len() {
        let prefix: String = chars[..size].iter().collect();
        for candidate in [prefix.to_lowercase(), prefix.to_uppercase()] {
            if !taken.contains(&candidate) {
                return candidate;
            }
        }
    }
    if !taken.contains(name) {
        return name.to_string();
    }
    (2..)
        .map(|n| format!("{name}{n}"))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| name.to_string())
}

/// Allocates a short name for every entry of `names`.
///
/// `help` is always seeded with `h`; `version` is seeded with `V` when
/// `with_version` is set. Both are included in the returned map.
///
/// # Examples
///
/// ```
/// use lazyarg_core::allocate_short_names;
///
/// let shorts = allocate_short_names(["hello", "x", "xylo"], false);
/// assert_eq!(shorts["help"], "h");
/// assert_eq!(shorts["hello"], "H");
/// assert_eq!(shorts["x"], "x");
/// assert_eq!(shorts["xylo"], "X");
/// ```
pub fn allocate_short_names<'a, I>(names: I, with_version: bool) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut shorts = BTreeMap::new();
    let mut taken = HashSet::new();

    shorts.insert(HELP_ARGUMENT.to_string(), HELP_SHORT.to_string());
    taken.insert(HELP_SHORT.to_string());
    if with_version {
        shorts.insert(VERSION_ARGUMENT.to_string(), VERSION_SHORT.to_string());
        taken.insert(VERSION_SHORT.to_string());
    }

    let mut sorted: Vec<&str> = names
        .into_iter()
        .filter(|name| *name != HELP_ARGUMENT && !(with_version && *name == VERSION_ARGUMENT))
        .collect();
    sorted.sort_unstable();
    sorted.dedup();

    for name in sorted {
        let short = abbreviate(name, &taken);
        taken.insert(short.clone());
        shorts.insert(name.to_string(), short);
    }

    shorts
}
