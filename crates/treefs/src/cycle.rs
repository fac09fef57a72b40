// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashSet;

use crate::path::TreePath;

/// Links already dereferenced in the current chain.
///
/// A chain is the run of link hops taken to resolve a single segment of a
/// requested path. Revisiting a link ends the chain at that link.
#[derive(Debug, Default)]
pub struct CycleDetector {
    visited: HashSet<TreePath>,
}

impl CycleDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `path`; true if it was already recorded in this chain.
    pub fn is_node_in_cycle(&mut self, path: &TreePath) -> bool {
        !self.visited.insert(path.clone())
    }

    pub fn clear(&mut self) {
        self.visited.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.visited.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.visited.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_repeat() {
        let a = TreePath::new("/a").unwrap();
        let b = TreePath::new("/b").unwrap();
        let mut detector = CycleDetector::new();
        assert!(!detector.is_node_in_cycle(&a));
        assert!(!detector.is_node_in_cycle(&b));
        assert!(detector.is_node_in_cycle(&a));
        assert_eq!(detector.len(), 2);

        detector.clear();
        assert!(detector.is_empty());
        assert!(!detector.is_node_in_cycle(&a));
    }
}
