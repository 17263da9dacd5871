//! # Collection Queries
//!
//! In-memory containers for the results of a repository walk, and the
//! queries the API and the catalog builder run over them.
//!
//! Collections are snapshots. They are produced fresh on every listing and
//! never cached, so a query always reflects the state of the repository at
//! the time of the walk that produced it.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::manifest::Manifest;
use crate::pkgsinfo::{CatalogEntry, PkgsInfo};
use crate::record::Record;

/// Name of the synthetic catalog that contains every package.
pub const ALL_CATALOG: &str = "all";

/// An ordered collection of records of one kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection<R> {
    items: Vec<R>,
}

/// Every manifest found by a walk.
pub type ManifestCollection = Collection<Manifest>;

/// Every pkgsinfo found by a walk.
pub type PkgsInfoCollection = Collection<PkgsInfo>;

impl<R> Default for Collection<R> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<R: Record> Collection<R> {
    /// Wrap a list of records, keeping their order.
    pub fn new(items: Vec<R>) -> Self {
        Self { items }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate the records in walk order.
    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.items.iter()
    }

    /// Borrow the records as a slice.
    pub fn as_slice(&self) -> &[R] {
        &self.items
    }

    /// Take ownership of the records.
    pub fn into_inner(self) -> Vec<R> {
        self.items
    }

    /// Find a record by identity.
    pub fn find(&self, filename: &str) -> Option<&R> {
        self.items.iter().find(|r| r.filename() == filename)
    }

    /// Build the `filename -> record` index for this snapshot.
    pub fn index(self) -> RecordIndex<R> {
        RecordIndex::from_records(self.items)
    }
}

impl<R: Record> FromIterator<R> for Collection<R> {
    fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<R> IntoIterator for Collection<R> {
    type Item = R;
    type IntoIter = std::vec::IntoIter<R>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, R> IntoIterator for &'a Collection<R> {
    type Item = &'a R;
    type IntoIter = std::slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl Collection<PkgsInfo> {
    /// Records that belong to any of `catalogs`.
    ///
    /// The result is deduplicated by filename and keeps the walk order, so a
    /// package listed in several requested catalogs appears once.
    pub fn by_catalog<S: AsRef<str>>(&self, catalogs: &[S]) -> Self {
        let mut seen = HashSet::new();
        self.items
            .iter()
            .filter(|info| catalogs.iter().any(|c| info.in_catalog(c.as_ref())))
            .filter(|&info| seen.insert(info.filename.as_str()))
            .cloned()
            .collect()
    }

    /// Records whose `name` equals `name` exactly.
    pub fn by_name(&self, name: &str) -> Self {
        self.items
            .iter()
            .filter(|info| info.name == name)
            .cloned()
            .collect()
    }

    /// The entries of one catalog. [`ALL_CATALOG`] selects every record.
    pub fn catalog(&self, name: &str) -> Vec<CatalogEntry> {
        if name == ALL_CATALOG {
            return self.items.iter().map(CatalogEntry::from).collect();
        }
        self.by_catalog(&[name])
            .into_iter()
            .map(CatalogEntry::from)
            .collect()
    }

    /// Every catalog name referenced by any record, sorted.
    pub fn catalog_names(&self) -> BTreeSet<String> {
        self.items
            .iter()
            .flat_map(|info| info.catalogs.iter().cloned())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Index
// ---------------------------------------------------------------------------

/// `filename -> record` lookup table for one walk.
#[derive(Debug, Clone)]
pub struct RecordIndex<R> {
    by_filename: HashMap<String, R>,
}

impl<R: Record> RecordIndex<R> {
    /// Index `records` by identity. A later duplicate replaces an earlier one.
    pub fn from_records(records: impl IntoIterator<Item = R>) -> Self {
        let by_filename = records
            .into_iter()
            .map(|r| (r.filename().to_string(), r))
            .collect();
        Self { by_filename }
    }

    /// Look up a record.
    pub fn get(&self, filename: &str) -> Option<&R> {
        self.by_filename.get(filename)
    }

    /// Remove and return a record.
    pub fn take(&mut self, filename: &str) -> Option<R> {
        self.by_filename.remove(filename)
    }

    /// Whether `filename` is present.
    pub fn contains(&self, filename: &str) -> bool {
        self.by_filename.contains_key(filename)
    }

    /// Number of indexed records.
    pub fn len(&self) -> usize {
        self.by_filename.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.by_filename.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pkg(filename: &str, name: &str, catalogs: &[&str]) -> PkgsInfo {
        PkgsInfo {
            filename: filename.to_string(),
            name: name.to_string(),
            catalogs: catalogs.iter().map(|c| c.to_string()).collect(),
            ..Default::default()
        }
    }

    fn sample() -> PkgsInfoCollection {
        Collection::new(vec![
            pkg("firefox-50.plist", "Firefox", &["testing", "production"]),
            pkg("chrome-55.plist", "Chrome", &["testing"]),
            pkg("firefox-51.plist", "Firefox", &["development"]),
            pkg("office.plist", "Office", &[]),
        ])
    }

    fn filenames(c: &PkgsInfoCollection) -> Vec<&str> {
        c.iter().map(|p| p.filename.as_str()).collect()
    }

    #[test]
    fn by_catalog_unions_without_duplicates() {
        let c = sample().by_catalog(&["testing", "production"]);
        assert_eq!(filenames(&c), vec!["firefox-50.plist", "chrome-55.plist"]);
    }

    #[test]
    fn by_catalog_with_no_names_is_empty() {
        let none: [&str; 0] = [];
        assert!(sample().by_catalog(&none).is_empty());
    }

    #[test]
    fn by_catalog_unknown_name_is_empty() {
        assert!(sample().by_catalog(&["nope"]).is_empty());
    }

    #[test]
    fn by_name_is_exact() {
        let c = sample().by_name("Firefox");
        assert_eq!(filenames(&c), vec!["firefox-50.plist", "firefox-51.plist"]);
        assert!(sample().by_name("firefox").is_empty());
    }

    #[test]
    fn all_catalog_contains_every_record() {
        assert_eq!(sample().catalog(ALL_CATALOG).len(), 4);
        assert_eq!(sample().catalog("testing").len(), 2);
    }

    #[test]
    fn catalog_entries_drop_filename() {
        for entry in sample().catalog(ALL_CATALOG) {
            assert!(entry.info().filename.is_empty());
        }
    }

    #[test]
    fn catalog_names_are_sorted_and_distinct() {
        let names: Vec<String> = sample().catalog_names().into_iter().collect();
        assert_eq!(names, vec!["development", "production", "testing"]);
    }

    #[test]
    fn index_looks_up_by_filename() {
        let mut idx = sample().index();
        assert_eq!(idx.len(), 4);
        assert!(idx.contains("office.plist"));
        assert_eq!(idx.get("chrome-55.plist").unwrap().name, "Chrome");
        assert!(idx.take("chrome-55.plist").is_some());
        assert!(idx.get("chrome-55.plist").is_none());
    }

    fn arb_collection() -> impl Strategy<Value = PkgsInfoCollection> {
        let catalog = prop::sample::select(vec!["a", "b", "c", "d"]);
        prop::collection::vec(prop::collection::vec(catalog, 0..4), 0..20).prop_map(|sets| {
            sets.into_iter()
                .enumerate()
                .map(|(i, cats)| pkg(&format!("pkg-{i}.plist"), "p", &cats))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn by_catalog_matches_membership(c in arb_collection(), wanted in prop::collection::vec(prop::sample::select(vec!["a", "b", "c", "d"]), 0..4)) {
            let result = c.by_catalog(&wanted);

            let mut seen = HashSet::new();
            for info in result.iter() {
                prop_assert!(seen.insert(info.filename.clone()));
                prop_assert!(wanted.iter().any(|w| info.in_catalog(w)));
            }
            let expected = c.iter().filter(|i| wanted.iter().any(|w| i.in_catalog(w))).count();
            prop_assert_eq!(result.len(), expected);
        }

        #[test]
        fn by_catalog_preserves_walk_order(c in arb_collection()) {
            let result = c.by_catalog(&["a", "b"]);
            let positions: Vec<usize> = result
                .iter()
                .map(|r| c.iter().position(|x| x.filename == r.filename).unwrap_or(usize::MAX))
                .collect();
            prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
        }

        #[test]
        fn every_named_catalog_is_a_subset_of_all(c in arb_collection()) {
            let all = c.catalog(ALL_CATALOG).len();
            for name in c.catalog_names() {
                prop_assert!(c.catalog(&name).len() <= all);
            }
            prop_assert_eq!(all, c.len());
        }
    }
}
