// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::{BTreeMap, BTreeSet};

use crate::path::TreePath;

/// Reverse map from a link target to the links pointing at it.
///
/// Keys are absolute target paths; values are the physical paths of the
/// links. A key never maps to an empty set.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LinkIndex {
    entries: BTreeMap<TreePath, BTreeSet<TreePath>>,
}

impl LinkIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, target: TreePath, link: TreePath) {
        _ = self.entries.entry(target).or_default().insert(link);
    }

    /// Drop one link from a target's set; true if it was present.
    pub fn remove(&mut self, target: &TreePath, link: &TreePath) -> bool {
        let Some(set) = self.entries.get_mut(target) else {
            return false;
        };
        let removed = set.remove(link);
        if set.is_empty() {
            _ = self.entries.remove(target);
        }
        removed
    }

    pub fn links_to(&self, target: &TreePath) -> Option<&BTreeSet<TreePath>> {
        self.entries.get(target)
    }

    #[must_use]
    pub fn contains(&self, target: &TreePath, link: &TreePath) -> bool {
        self.links_to(target).is_some_and(|s| s.contains(link))
    }

    /// Every `(target, link)` pair, ordered by target.
    pub fn iter(&self) -> impl Iterator<Item = (&TreePath, &TreePath)> {
        self.entries
            .iter()
            .flat_map(|(t, links)| links.iter().map(move |l| (t, l)))
    }

    /// Remove and return every pair for which `pred(target, link)` holds.
    pub fn drain_matching<F>(&mut self, mut pred: F) -> Vec<(TreePath, TreePath)>
    where
        F: FnMut(&TreePath, &TreePath) -> bool,
    {
        let drained: Vec<(TreePath, TreePath)> = self
            .iter()
            .filter(|(t, l)| pred(t, l))
            .map(|(t, l)| (t.clone(), l.clone()))
            .collect();
        for (t, l) in &drained {
            _ = self.remove(t, l);
        }
        drained
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeSet::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct targets.
    #[must_use]
    pub fn target_count(&self) -> usize {
        self.entries.len()
    }
}
