// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

mod scenarios;

use std::collections::BTreeSet;

use crate::engine::StorageEngine;
use crate::path::TreePath;

pub(crate) fn p(s: &str) -> TreePath {
    TreePath::new(s).unwrap()
}

/// The link index must hold exactly one entry per link in the tree.
pub(crate) fn assert_index_matches_tree<T>(engine: &StorageEngine<T>) {
    let indexed: BTreeSet<(TreePath, TreePath)> = engine
        .link_index()
        .iter()
        .map(|(target, link)| (target.clone(), link.clone()))
        .collect();
    let actual: BTreeSet<(TreePath, TreePath)> = engine
        .links_below(&TreePath::root())
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(indexed, actual);
}
