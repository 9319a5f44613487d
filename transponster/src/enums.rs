// SPDX-License-Identifier: MIT OR Apache-2.0

//! Discriminant/tag tables backing enumerated leaf types.

/// An ordered relation between integer discriminants and wire tags.
///
/// Entries are matched in declaration order in both directions, so when two
/// entries share a tag or a discriminant, the earlier one wins. Dialects use
/// this deliberately: an alias tag can be parsed but is never generated.
#[derive(Debug)]
pub struct EnumTable {
    entries: Vec<(usize, &'static str)>,
}

impl EnumTable {
    pub fn new(entries: &[(usize, &'static str)]) -> Self {
        Self {
            entries: entries.to_vec(),
        }
    }

    /// Returns the discriminant of the first entry whose tag matches `text`
    /// exactly, or `None` when no entry does.
    pub fn parse(&self, text: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|(_, tag)| *tag == text)
            .map(|(d, _)| *d)
    }

    /// Returns the tag of the first entry with the given discriminant, or
    /// `None` when the discriminant is not in the table.
    pub fn generate(&self, discriminant: usize) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(d, _)| *d == discriminant)
            .map(|(_, tag)| *tag)
    }

    pub fn contains(&self, discriminant: usize) -> bool {
        self.entries.iter().any(|(d, _)| *d == discriminant)
    }

    pub fn entries(&self) -> &[(usize, &'static str)] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordered_lookup() {
        let t = EnumTable::new(&[(0, "no"), (1, "internal"), (2, "external")]);
        assert_eq!(t.parse("internal"), Some(1));
        assert_eq!(t.parse("anything"), None);
        assert_eq!(t.generate(2), Some("external"));
        assert_eq!(t.generate(7), None);
        assert!(t.contains(0));
        assert!(!t.contains(3));
    }

    #[test]
    fn alias_tags_parse_but_do_not_generate() {
        // "off" is an accepted alias for discriminant 0; "no" is canonical.
        let t = EnumTable::new(&[(0, "no"), (0, "off"), (1, "yes")]);
        assert_eq!(t.parse("off"), Some(0));
        assert_eq!(t.generate(0), Some("no"));
    }
}
