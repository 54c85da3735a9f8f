//! Listing snapshot

use crate::format::format_listing;
use berth_core::Space;
use std::fmt;

/// Finite snapshot of spaces taken by a single scan
///
/// Can be iterated any number of times; every iteration yields each space
/// exactly once in store enumeration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    spaces: Vec<Space>,
}

impl Listing {
    /// Wrap scanned spaces
    pub fn new(spaces: Vec<Space>) -> Self {
        Self { spaces }
    }

    /// Iterate the snapshot
    pub fn iter(&self) -> std::slice::Iter<'_, Space> {
        self.spaces.iter()
    }

    /// Number of spaces
    pub fn len(&self) -> usize {
        self.spaces.len()
    }

    /// Whether the snapshot is empty
    pub fn is_empty(&self) -> bool {
        self.spaces.is_empty()
    }
}

impl<'a> IntoIterator for &'a Listing {
    type Item = &'a Space;
    type IntoIter = std::slice::Iter<'a, Space>;

    fn into_iter(self) -> Self::IntoIter {
        self.spaces.iter()
    }
}

impl IntoIterator for Listing {
    type Item = Space;
    type IntoIter = std::vec::IntoIter<Space>;

    fn into_iter(self) -> Self::IntoIter {
        self.spaces.into_iter()
    }
}

impl fmt::Display for Listing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_listing(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use berth_core::{SpaceId, SpaceName};

    fn space(id: &str, name: &str, occupied: bool) -> Space {
        Space {
            id: SpaceId::new(id),
            name: SpaceName::new(name).unwrap(),
            occupied,
        }
    }

    #[test]
    fn test_listing_reiterable() {
        let listing = Listing::new(vec![space("1", "P1", false), space("2", "P2", true)]);

        let first: Vec<_> = listing.iter().map(|s| s.name.as_str()).collect();
        let second: Vec<_> = (&listing).into_iter().map(|s| s.name.as_str()).collect();
        assert_eq!(first, vec!["P1", "P2"]);
        assert_eq!(first, second);
        assert_eq!(listing.len(), 2);
    }

    #[test]
    fn test_listing_display() {
        let listing = Listing::new(vec![space("1", "P1", false), space("2", "P2", true)]);
        assert_eq!(listing.to_string(), "P1: Empty\nP2: Full\n");
        assert_eq!(Listing::default().to_string(), "");
    }
}
