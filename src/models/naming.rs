//! Timestamp-based file names.
//!
//! `chap-0002` becomes `chap-<hex>`, `snip-0001.wt` becomes `snip-<hex>.wt`,
//! and a name without a dash keeps all of itself as the prefix.

use crate::clock::token_hex;

/// Extension carried over to the new name.
pub const WT_EXTENSION: &str = ".wt";

/// Everything before the first `-`, or the whole name.
pub fn stable_prefix(filename: &str) -> &str {
    filename
        .split_once('-')
        .map_or(filename, |(prefix, _)| prefix)
}

/// `.wt` if the name ends with it, otherwise empty.
pub fn preserved_suffix(filename: &str) -> &'static str {
    if filename.ends_with(WT_EXTENSION) {
        WT_EXTENSION
    } else {
        ""
    }
}

/// Build `<prefix>-<hex token><suffix>` for `filename`.
pub fn renamed(filename: &str, token: u128) -> String {
    format!(
        "{}-{}{}",
        stable_prefix(filename),
        token_hex(token),
        preserved_suffix(filename)
    )
}
