// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::ops::{BitOr, BitOrAssign};

/// Kind of a node in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Container of named children
    Directory,
    /// Typed data item
    Item,
    /// Reference to another path
    SymbolicLink,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Directory => "directory",
            NodeKind::Item => "item",
            NodeKind::SymbolicLink => "symbolic_link",
        }
    }

    /// Parse a kind from its textual name.
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s {
            "directory" => Ok(NodeKind::Directory),
            "item" => Ok(NodeKind::Item),
            "symbolic_link" => Ok(NodeKind::SymbolicLink),
            other => Err(format!("Unknown node kind: {}", other)),
        }
    }

    /// Position of this kind when listings are grouped by kind.
    #[must_use]
    pub fn rank(&self) -> u8 {
        match self {
            NodeKind::Directory => 0,
            NodeKind::Item => 1,
            NodeKind::SymbolicLink => 2,
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for NodeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str(s)
    }
}

/// Set of node kinds selected by a query. Combine with `|`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KindFilter(u8);

impl KindFilter {
    pub const NONE: KindFilter = KindFilter(0);
    pub const DIRECTORY: KindFilter = KindFilter(0b001);
    pub const ITEM: KindFilter = KindFilter(0b010);
    pub const SYMBOLIC_LINK: KindFilter = KindFilter(0b100);
    pub const ALL: KindFilter = KindFilter(0b111);

    #[must_use]
    pub fn contains(self, kind: NodeKind) -> bool {
        self.0 & KindFilter::from(kind).0 != 0
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl Default for KindFilter {
    fn default() -> Self {
        KindFilter::ALL
    }
}

impl From<NodeKind> for KindFilter {
    fn from(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Directory => KindFilter::DIRECTORY,
            NodeKind::Item => KindFilter::ITEM,
            NodeKind::SymbolicLink => KindFilter::SYMBOLIC_LINK,
        }
    }
}

impl BitOr for KindFilter {
    type Output = KindFilter;

    fn bitor(self, rhs: KindFilter) -> KindFilter {
        KindFilter(self.0 | rhs.0)
    }
}

impl BitOrAssign for KindFilter {
    fn bitor_assign(&mut self, rhs: KindFilter) {
        self.0 |= rhs.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_kind_string_conversion() {
        assert_eq!(NodeKind::Directory.as_str(), "directory");
        assert_eq!(NodeKind::Item.as_str(), "item");
        assert_eq!(NodeKind::SymbolicLink.as_str(), "symbolic_link");
        assert_eq!(NodeKind::from_str("item").unwrap(), NodeKind::Item);
        assert!(NodeKind::from_str("file").is_err());
    }

    #[test]
    fn test_serde_names_match_display() {
        for kind in [NodeKind::Directory, NodeKind::Item, NodeKind::SymbolicLink] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind));
            let parsed: NodeKind = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn test_filter_combination() {
        let filter = KindFilter::DIRECTORY | KindFilter::SYMBOLIC_LINK;
        assert!(filter.contains(NodeKind::Directory));
        assert!(filter.contains(NodeKind::SymbolicLink));
        assert!(!filter.contains(NodeKind::Item));

        assert!(KindFilter::NONE.is_empty());
        assert!(!KindFilter::NONE.contains(NodeKind::Item));
        assert_eq!(
            KindFilter::DIRECTORY | KindFilter::ITEM | KindFilter::SYMBOLIC_LINK,
            KindFilter::ALL
        );
    }
}
