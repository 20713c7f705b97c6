//! Building one generation of the identifier index.

use crate::item::{Identifier, Item};
use crate::record_set::RecordSet;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

/// Identifier → record set mapping for a single generation.
///
/// Built wholesale by [`Index::build`] and never mutated afterwards; a
/// refresh replaces the whole value.
#[derive(Debug)]
pub(crate) struct Index<T> {
    sets: HashMap<Identifier, Arc<RecordSet<T>>>,
    generation: u64,
}

/// What happened while indexing, for logging and health.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct IndexReport {
    pub unique: usize,
    pub tags: usize,
    /// Identifiers claimed more than once; later claimants were dropped.
    pub duplicates: Vec<String>,
}

impl<T> Index<T> {
    pub(crate) fn empty() -> Self {
        Self {
            sets: HashMap::new(),
            generation: 0,
        }
    }

    /// Index `items` as generation `generation`.
    ///
    /// - Each unique identifier maps to a singleton set of its item, whose
    ///   identifiers are the aliases that item actually claimed. First
    ///   registration wins; an alias lost to an earlier item is left out so
    ///   every listed identifier resolves back to the set.
    /// - Each tag maps to every item carrying it, in order of appearance.
    ///   A tag never displaces a unique identifier of the same name.
    /// - [`Identifier::All`] maps to every item.
    pub(crate) fn build(items: Vec<Item<T>>, generation: u64) -> (Self, IndexReport) {
        let items: Vec<Arc<Item<T>>> = items.into_iter().map(Arc::new).collect();
        let mut sets: HashMap<Identifier, Arc<RecordSet<T>>> = HashMap::new();
        let mut report = IndexReport::default();
        // Vec of (tag, members) preserves first-seen tag order for logging.
        let mut tag_positions: HashMap<&str, usize> = HashMap::new();
        let mut tagged: Vec<(&str, Vec<Arc<Item<T>>>)> = Vec::new();

        for item in &items {
            let mut claimed: Vec<Identifier> = Vec::new();
            for id in item.unique_ids() {
                let identifier = Identifier::from(id.as_str());
                if claimed.contains(&identifier) {
                    continue;
                }
                if sets.contains_key(&identifier) {
                    tracing::warn!(id = %id, "Duplicate unique identifier ignored");
                    report.duplicates.push(id.clone());
                } else {
                    claimed.push(identifier);
                }
            }
            if !claimed.is_empty() {
                let set = Arc::new(RecordSet::from_shared(vec![Arc::clone(item)], claimed.clone(), generation));
                report.unique += claimed.len();
                for identifier in claimed {
                    sets.insert(identifier, Arc::clone(&set));
                }
            }
            for tag in item.tags() {
                let position = *tag_positions.entry(tag.as_str()).or_insert_with(|| {
                    tagged.push((tag.as_str(), Vec::new()));
                    tagged.len() - 1
                });
                tagged[position].1.push(Arc::clone(item));
            }
        }
        tracing::debug!(unique = report.unique, "Unique identifiers indexed");

        for (tag, members) in tagged {
            tracing::debug!(tag, members = members.len(), "Tagged collection");
            match sets.entry(Identifier::from(tag)) {
                Entry::Occupied(_) => {
                    tracing::warn!(tag, "Tag shadowed by a unique identifier; ignored");
                    report.duplicates.push(tag.to_string());
                },
                Entry::Vacant(slot) => {
                    slot.insert(Arc::new(RecordSet::from_shared(members, vec![Identifier::from(tag)], generation)));
                    report.tags += 1;
                },
            }
        }

        let all = RecordSet::from_shared(items.clone(), vec![Identifier::All], generation);
        sets.insert(Identifier::All, Arc::new(all));
        tracing::debug!(total = sets.len(), generation, "Index built");

        (Self { sets, generation }, report)
    }

    pub(crate) fn get(&self, identifier: &Identifier) -> Option<Arc<RecordSet<T>>> {
        self.sets.get(identifier).cloned()
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of identifiers, including [`Identifier::All`] once built.
    pub(crate) fn identifier_count(&self) -> usize {
        self.sets.len()
    }

    pub(crate) fn record_count(&self) -> usize {
        self.sets.get(&Identifier::All).map_or(0, |all| all.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    fn id(s: &str) -> Identifier {
        Identifier::from(s)
    }

    #[fixture]
    fn four() -> Vec<Item<&'static str>> {
        vec![
            Item::new("r1").with_id("a").with_id("a2").with_tag("odd").with_tag("three"),
            Item::new("r2").with_id("b").with_tag("even").with_tag("three"),
            Item::new("r3").with_id("c").with_id("c2").with_tag("odd").with_tag("three"),
            Item::new("r4").with_id("d"),
        ]
    }

    #[rstest]
    fn all_contains_every_record(four: Vec<Item<&'static str>>) {
        let (index, report) = Index::build(four, 1);
        let all = index.get(&Identifier::All).unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(all.identifiers(), [Identifier::All]);
        assert_eq!(index.record_count(), 4);
        assert!(report.duplicates.is_empty());
    }

    #[rstest]
    #[case("c", 1, 2)]
    #[case("c2", 1, 2)]
    #[case("b", 1, 1)]
    #[case("odd", 2, 1)]
    #[case("even", 1, 1)]
    #[case("three", 3, 1)]
    fn lookup_sizes(
        four: Vec<Item<&'static str>>,
        #[case] key: &str,
        #[case] records: usize,
        #[case] identifiers: usize,
    ) {
        let (index, _) = Index::build(four, 1);
        let set = index.get(&id(key)).unwrap();
        assert_eq!(set.len(), records);
        assert_eq!(set.identifiers().len(), identifiers);
    }

    #[rstest]
    fn unknown_identifier_is_absent(four: Vec<Item<&'static str>>) {
        let (index, _) = Index::build(four, 1);
        assert!(index.get(&id("nope")).is_none());
    }

    #[rstest]
    fn aliases_share_one_set(four: Vec<Item<&'static str>>) {
        let (index, _) = Index::build(four, 1);
        let a = index.get(&id("a")).unwrap();
        let a2 = index.get(&id("a2")).unwrap();
        assert!(Arc::ptr_eq(&a, &a2));
        assert_eq!(a.identifiers(), [id("a"), id("a2")]);
    }

    #[rstest]
    fn tag_groups_keep_first_seen_order(four: Vec<Item<&'static str>>) {
        let (index, report) = Index::build(four, 1);
        let three: Vec<&str> = index.get(&id("three")).unwrap().items().iter().map(|i| *i.payload()).collect();
        assert_eq!(three, ["r1", "r2", "r3"]);
        let odd: Vec<&str> = index.get(&id("odd")).unwrap().items().iter().map(|i| *i.payload()).collect();
        assert_eq!(odd, ["r1", "r3"]);
        assert_eq!(report.tags, 3);
        assert_eq!(report.unique, 6);
    }

    #[test]
    fn duplicate_unique_identifier_keeps_first() {
        let items = vec![
            Item::new("first").with_id("dup").with_id("first-only"),
            Item::new("second").with_id("dup").with_id("second-only"),
        ];
        let (index, report) = Index::build(items, 3);
        assert_eq!(report.duplicates, ["dup"]);
        assert_eq!(*index.get(&id("dup")).unwrap().items()[0].payload(), "first");
        assert_eq!(*index.get(&id("second-only")).unwrap().items()[0].payload(), "second");
        // Only the alias the second record won is listed.
        assert_eq!(index.get(&id("second-only")).unwrap().identifiers(), [id("second-only")]);
        assert_eq!(index.get(&id("dup")).unwrap().identifiers(), [id("dup"), id("first-only")]);
        assert_eq!(index.get(&Identifier::All).unwrap().len(), 2);
    }

    #[test]
    fn record_losing_every_alias_is_only_in_all() {
        let items = vec![Item::new("first").with_id("dup"), Item::new("second").with_id("dup").with_tag("t")];
        let (index, report) = Index::build(items, 1);
        assert_eq!(report.unique, 1);
        assert_eq!(*index.get(&id("dup")).unwrap().items()[0].payload(), "first");
        assert_eq!(*index.get(&id("t")).unwrap().items()[0].payload(), "second");
        assert_eq!(index.record_count(), 2);
    }

    #[test]
    fn repeated_alias_on_one_record_is_not_a_duplicate() {
        let (index, report) = Index::build(vec![Item::new(()).with_id("a").with_id("a")], 1);
        assert!(report.duplicates.is_empty());
        assert_eq!(index.get(&id("a")).unwrap().identifiers(), [id("a")]);
    }

    #[test]
    fn tag_does_not_displace_unique_identifier() {
        let items = vec![Item::new("x").with_id("shared"), Item::new("y").with_tag("shared")];
        let (index, report) = Index::build(items, 1);
        assert_eq!(*index.get(&id("shared")).unwrap().items()[0].payload(), "x");
        assert_eq!(report.duplicates, ["shared"]);
    }

    #[test]
    fn every_set_carries_the_generation() {
        let (index, _) = Index::build(vec![Item::new(()).with_id("a").with_tag("t")], 42);
        for key in [id("a"), id("t"), Identifier::All] {
            assert_eq!(index.get(&key).unwrap().generation(), 42);
        }
        assert_eq!(index.generation(), 42);
    }

    #[test]
    fn empty_source_still_publishes_all() {
        let (index, _) = Index::<()>::build(Vec::new(), 1);
        assert!(index.get(&Identifier::All).unwrap().is_empty());
        assert_eq!(index.identifier_count(), 1);
    }

    #[test]
    fn records_without_ids_are_only_in_all() {
        let (index, report) = Index::build(vec![Item::new("anon").with_tag("t"), Item::new("bare")], 1);
        assert_eq!(report.unique, 0);
        assert_eq!(index.get(&id("t")).unwrap().len(), 1);
        assert_eq!(index.record_count(), 2);
    }
}
