//! The partition protocol.
//!
//! Every evaluation works on two disjoint, ordered sets of object ids:
//! `matches` and `non_matches`. The [`SearchDomain`] names the set being
//! refined; objects are only ever moved out of it into the other set, so
//! objects already decided stay where they are and the combined size of the
//! two sets never changes.

use astrolabe_foundation::ObjectId;
use astrolabe_universe::{Universe, UniverseObject};
use tracing::debug;

/// An ordered collection of object ids.
pub type ObjectSet = Vec<ObjectId>;

/// Which of the two sets an evaluation refines.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SearchDomain {
    /// Remove objects that fail the condition from `matches`.
    Matches,
    /// Move objects that pass the condition out of `non_matches`.
    NonMatches,
}

impl SearchDomain {
    /// The other domain.
    #[must_use]
    pub const fn flip(self) -> Self {
        match self {
            Self::Matches => Self::NonMatches,
            Self::NonMatches => Self::Matches,
        }
    }
}

/// Moves objects out of the domain set according to a per-id predicate.
///
/// An object in the domain set moves when `pass(id)` disagrees with the
/// domain: failing objects leave `matches`, passing objects leave
/// `non_matches`. Relative order is preserved in both sets.
pub fn transfer_by(
    matches: &mut ObjectSet,
    non_matches: &mut ObjectSet,
    domain: SearchDomain,
    mut pass: impl FnMut(ObjectId) -> bool,
) {
    let keep_passing = domain == SearchDomain::Matches;
    let (from, to) = match domain {
        SearchDomain::Matches => (matches, non_matches),
        SearchDomain::NonMatches => (non_matches, matches),
    };
    from.retain(|&id| {
        if pass(id) == keep_passing {
            true
        } else {
            to.push(id);
            false
        }
    });
}

/// Moves every object in the domain set, or none, by one shared result.
pub fn transfer_all(
    matches: &mut ObjectSet,
    non_matches: &mut ObjectSet,
    domain: SearchDomain,
    pass: bool,
) {
    match (domain, pass) {
        (SearchDomain::Matches, false) => non_matches.append(matches),
        (SearchDomain::NonMatches, true) => matches.append(non_matches),
        _ => {}
    }
}

/// Like [`transfer_by`], but with the predicate applied to objects.
///
/// Ids missing from the universe never pass.
pub fn transfer_objects(
    universe: &Universe,
    matches: &mut ObjectSet,
    non_matches: &mut ObjectSet,
    domain: SearchDomain,
    mut pass: impl FnMut(&UniverseObject) -> bool,
) {
    transfer_by(matches, non_matches, domain, |id| match universe.get(id) {
        Some(object) => pass(object),
        None => {
            debug!(%id, "candidate missing from universe");
            false
        }
    });
}

/// Restores `items` to the relative order they had in `reference`.
///
/// Items absent from `reference` keep their relative order at the end.
pub(crate) fn restore_order(items: &mut ObjectSet, reference: &[ObjectId]) {
    let position: std::collections::HashMap<ObjectId, usize> = reference
        .iter()
        .enumerate()
        .map(|(index, &id)| (id, index))
        .collect();
    items.sort_by_key(|id| position.get(id).copied().unwrap_or(usize::MAX));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[i32]) -> ObjectSet {
        raw.iter().copied().map(ObjectId::new).collect()
    }

    #[test]
    fn matches_domain_removes_failures() {
        let mut matches = ids(&[1, 2, 3, 4]);
        let mut non_matches = ids(&[9]);
        transfer_by(&mut matches, &mut non_matches, SearchDomain::Matches, |id| {
            id.raw() % 2 == 0
        });
        assert_eq!(matches, ids(&[2, 4]));
        assert_eq!(non_matches, ids(&[9, 1, 3]));
    }

    #[test]
    fn non_matches_domain_promotes_passes() {
        let mut matches = ids(&[7]);
        let mut non_matches = ids(&[1, 2, 3, 4]);
        transfer_by(&mut matches, &mut non_matches, SearchDomain::NonMatches, |id| {
            id.raw() > 2
        });
        assert_eq!(matches, ids(&[7, 3, 4]));
        assert_eq!(non_matches, ids(&[1, 2]));
    }

    #[test]
    fn transfer_all_moves_whole_set() {
        let mut matches = ids(&[1, 2]);
        let mut non_matches = ids(&[3]);
        transfer_all(&mut matches, &mut non_matches, SearchDomain::Matches, true);
        assert_eq!(matches.len(), 2);
        transfer_all(&mut matches, &mut non_matches, SearchDomain::Matches, false);
        assert!(matches.is_empty());
        assert_eq!(non_matches, ids(&[3, 1, 2]));
        transfer_all(&mut matches, &mut non_matches, SearchDomain::NonMatches, true);
        assert_eq!(matches, ids(&[3, 1, 2]));
        assert!(non_matches.is_empty());
    }

    #[test]
    fn missing_objects_fail() {
        let universe = Universe::new();
        let mut matches = ids(&[5]);
        let mut non_matches = Vec::new();
        transfer_objects(&universe, &mut matches, &mut non_matches, SearchDomain::Matches, |_| true);
        assert!(matches.is_empty());
        assert_eq!(non_matches, ids(&[5]));
    }

    #[test]
    fn restore_order_follows_reference() {
        let mut items = ids(&[4, 1, 3]);
        restore_order(&mut items, &ids(&[1, 2, 3, 4]));
        assert_eq!(items, ids(&[1, 3, 4]));
    }

    #[test]
    fn flip_is_involution() {
        assert_eq!(SearchDomain::Matches.flip(), SearchDomain::NonMatches);
        assert_eq!(SearchDomain::Matches.flip().flip(), SearchDomain::Matches);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn transfer_conserves_objects(
            raw in prop::collection::btree_set(0..200_i32, 0..40),
            split in 0..40_usize,
            modulus in 1..7_i32,
            to_non_matches in any::<bool>(),
        ) {
            let all: ObjectSet = raw.into_iter().map(ObjectId::new).collect();
            let split = split.min(all.len());
            let mut matches = all[..split].to_vec();
            let mut non_matches = all[split..].to_vec();
            let domain = if to_non_matches { SearchDomain::NonMatches } else { SearchDomain::Matches };
            let before_other = match domain {
                SearchDomain::Matches => non_matches.clone(),
                SearchDomain::NonMatches => matches.clone(),
            };

            transfer_by(&mut matches, &mut non_matches, domain, |id| id.raw() % modulus == 0);

            let mut combined: Vec<_> = matches.iter().chain(&non_matches).copied().collect();
            combined.sort();
            prop_assert_eq!(combined, all);
            let other = match domain {
                SearchDomain::Matches => &non_matches,
                SearchDomain::NonMatches => &matches,
            };
            prop_assert_eq!(&other[..before_other.len()], &before_other[..]);
        }
    }
}
