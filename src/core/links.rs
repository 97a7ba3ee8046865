// links + the explicit "already linked" state
use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::core::types::{LinkStatus, LinkType, MatchReason, PropertyId, WellId};

/// A property-well relationship. At most one per `(property_id, well_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub property_id: PropertyId,
    pub well_id: WellId,
    pub match_reason: MatchReason,
    pub status: LinkStatus,
    pub link_type: LinkType,
}

impl Link {
    //links created by the synchronizer are always active + auto
    pub fn auto(property_id: PropertyId, well_id: WellId, match_reason: MatchReason) -> Self {
        Self {
            property_id,
            well_id,
            match_reason,
            status: LinkStatus::Active,
            link_type: LinkType::Auto,
        }
    }

    pub fn pair(&self) -> (PropertyId, WellId) {
        (self.property_id.clone(), self.well_id.clone())
    }
}

/// Row shape returned by `LinkStore::list_existing`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingLink {
    pub property_id: PropertyId,
    pub well_id: WellId,
    pub match_reason: Option<MatchReason>,
    pub status: LinkStatus,
}

impl From<&Link> for ExistingLink {
    fn from(link: &Link) -> Self {
        Self {
            property_id: link.property_id.clone(),
            well_id: link.well_id.clone(),
            match_reason: Some(link.match_reason),
            status: link.status,
        }
    }
}

/// Pairs that already have a link in any status. Rejected links count too: a rejected pair
/// must not be re-created by the next run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkedPairs {
    by_property: HashMap<PropertyId, HashSet<WellId>>,
    len: usize,
}

impl LinkedPairs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, property_id: PropertyId, well_id: WellId) -> bool {
        let added = self.by_property.entry(property_id).or_default().insert(well_id);
        if added {
            self.len += 1;
        }
        added
    }

    pub fn contains(&self, property_id: &PropertyId, well_id: &WellId) -> bool {
        self.by_property.get(property_id).is_some_and(|wells| wells.contains(well_id))
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl FromIterator<ExistingLink> for LinkedPairs {
    fn from_iter<I: IntoIterator<Item = ExistingLink>>(iter: I) -> Self {
        let mut pairs = Self::new();
        pairs.extend(iter);
        pairs
    }
}

impl Extend<ExistingLink> for LinkedPairs {
    fn extend<I: IntoIterator<Item = ExistingLink>>(&mut self, iter: I) {
        for link in iter {
            self.insert(link.property_id, link.well_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mk_existing(p: &str, w: &str, status: LinkStatus) -> ExistingLink {
        ExistingLink {
            property_id: p.into(),
            well_id: w.into(),
            match_reason: Some(MatchReason::BottomHole),
            status,
        }
    }

    #[test]
    fn linked_pairs_are_ordered_and_include_rejected() {
        let pairs: LinkedPairs = vec![
            mk_existing("p1", "w1", LinkStatus::Active),
            mk_existing("p2", "w2", LinkStatus::Rejected),
        ]
        .into_iter()
        .collect();

        assert!(pairs.contains(&"p1".into(), &"w1".into()));
        assert!(pairs.contains(&"p2".into(), &"w2".into()));
        assert!(!pairs.contains(&"w1".into(), &"p1".into()));
        assert_eq!(pairs.len(), 2);
    }

    #[test]
    fn insert_counts_each_pair_once() {
        let mut pairs = LinkedPairs::new();
        assert!(pairs.insert("p1".into(), "w1".into()));
        assert!(!pairs.insert("p1".into(), "w1".into()));
        assert!(pairs.insert("p1".into(), "w2".into()));
        assert_eq!(pairs.len(), 2);
    }

    #[test]
    fn auto_link_defaults() {
        let link = Link::auto("p".into(), "w".into(), MatchReason::LateralPath);
        assert_eq!(link.status, LinkStatus::Active);
        assert_eq!(link.link_type, LinkType::Auto);
        assert_eq!(ExistingLink::from(&link).match_reason, Some(MatchReason::LateralPath));
    }
}
