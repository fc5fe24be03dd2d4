//! Ignore-list filter
//!
//! Items the user excluded from valuation totals, keyed by resolved display
//! name. Two item ids sharing a display name are ignored and unignored
//! together. Affects display only; ignored items are still recorded.

use std::collections::BTreeSet;

/// Mutable set of ignored display names.
///
/// The signal-handling path reads this while a UI actor may write; callers
/// share it behind an `RwLock`. Serialization round-trips through a
/// deduplicated, sorted comma-separated list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreSet {
    names: BTreeSet<String>,
}

impl IgnoreSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a comma-separated list, trimming whitespace and dropping empty
    /// entries. Duplicates collapse naturally.
    pub fn from_csv(csv: &str) -> Self {
        let names = csv
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();
        Self { names }
    }

    /// Serialize as a sorted, deduplicated comma-separated list.
    pub fn to_csv(&self) -> String {
        self.names.iter().cloned().collect::<Vec<_>>().join(",")
    }

    pub fn is_ignored(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Add or remove a name. Returns whether the set changed.
    pub fn set_ignored(&mut self, name: &str, ignored: bool) -> bool {
        if ignored {
            self.names.insert(name.to_string())
        } else {
            self.names.remove(name)
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_roundtrip() {
        let mut set = IgnoreSet::new();

        assert!(set.set_ignored("Coins", true));
        assert!(set.is_ignored("Coins"));

        assert!(set.set_ignored("Coins", false));
        assert!(!set.is_ignored("Coins"));
    }

    #[test]
    fn test_toggle_reports_no_change() {
        let mut set = IgnoreSet::new();

        assert!(set.set_ignored("Bones", true));
        assert!(!set.set_ignored("Bones", true));
        assert!(set.set_ignored("Bones", false));
        assert!(!set.set_ignored("Bones", false));
    }

    #[test]
    fn test_csv_parsing_trims_and_dedupes() {
        let set = IgnoreSet::from_csv("Coins, Bones ,,Coins,  ");

        assert_eq!(set.len(), 2);
        assert!(set.is_ignored("Coins"));
        assert!(set.is_ignored("Bones"));
    }

    #[test]
    fn test_csv_serialization_is_sorted_and_deduplicated() {
        let mut set = IgnoreSet::from_csv("Vial,Ashes");
        set.set_ignored("Bones", true);
        set.set_ignored("Ashes", true);

        assert_eq!(set.to_csv(), "Ashes,Bones,Vial");
    }

    #[test]
    fn test_empty_csv() {
        let set = IgnoreSet::from_csv("");
        assert!(set.is_empty());
        assert_eq!(set.to_csv(), "");
    }
}
