// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Per-engine configuration: listing order and wildcard strategy.
//!
//! Settings are handed to [`crate::StorageEngine::with_settings`]; nothing
//! here is process-global.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::wildcard::{GlobMatcher, RegexMatcher, WildcardMatcher};

/// Property used as a sort key in directory listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortProperty {
    Name,
    Created,
    Updated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub property: SortProperty,
    #[serde(default = "ascending")]
    pub ascending: bool,
}

fn ascending() -> bool {
    true
}

impl SortKey {
    #[must_use]
    pub fn ascending(property: SortProperty) -> Self {
        Self {
            property,
            ascending: true,
        }
    }

    #[must_use]
    pub fn descending(property: SortProperty) -> Self {
        Self {
            property,
            ascending: false,
        }
    }
}

/// Directory enumeration order.
///
/// With `group_by_kind` directories come first, then items, then links.
/// Within a group the keys apply in order. No grouping and no keys keeps
/// insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SortOrder {
    pub group_by_kind: bool,
    pub keys: Vec<SortKey>,
}

impl Default for SortOrder {
    fn default() -> Self {
        Self {
            group_by_kind: true,
            keys: vec![SortKey::ascending(SortProperty::Name)],
        }
    }
}

impl SortOrder {
    /// Plain insertion order.
    #[must_use]
    pub fn insertion() -> Self {
        Self {
            group_by_kind: false,
            keys: Vec::new(),
        }
    }
}

/// Which built-in wildcard strategy an engine starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WildcardKind {
    #[default]
    Glob,
    Regex,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub sort: SortOrder,
    pub wildcard: WildcardKind,
    /// Literal-escape prefix honored by the glob matcher
    pub escape_char: char,
    /// Applies to wildcard matching only; lookups are always exact
    pub case_sensitive: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sort: SortOrder::default(),
            wildcard: WildcardKind::default(),
            escape_char: '\\',
            case_sensitive: true,
        }
    }
}

impl Settings {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Ok(serde_yaml_ng::from_str(text)?)
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Build the matcher these settings select.
    #[must_use]
    pub fn matcher(&self) -> Box<dyn WildcardMatcher> {
        match self.wildcard {
            WildcardKind::Glob => Box::new(
                GlobMatcher::new()
                    .with_escape(self.escape_char)
                    .case_sensitive(self.case_sensitive),
            ),
            WildcardKind::Regex => {
                Box::new(RegexMatcher::new().case_sensitive(self.case_sensitive))
            }
        }
    }
}
