//! Listing formatter

use berth_core::Space;
use std::fmt::Write;

/// Render spaces one per line as `<name>: Full` or `<name>: Empty`
///
/// Every line ends in `\n`; no spaces yields an empty string.
pub fn format_listing<'a>(spaces: impl IntoIterator<Item = &'a Space>) -> String {
    let mut out = String::new();
    for space in spaces {
        // Writing to a String cannot fail
        let _ = writeln!(out, "{}: {}", space.name, space.occupancy_label());
    }
    out
}
