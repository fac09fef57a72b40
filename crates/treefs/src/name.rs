// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{Error, Result};
use crate::kind::NodeKind;
use crate::path::{CURRENT, PARENT, SEPARATOR};

static DIRECTORY_COUNTER: AtomicUsize = AtomicUsize::new(1);
static ITEM_COUNTER: AtomicUsize = AtomicUsize::new(1);
static LINK_COUNTER: AtomicUsize = AtomicUsize::new(1);

/// A validated single path segment naming a node.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeName(String);

impl NodeName {
    pub fn new<S: Into<String>>(name: S) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::invalid_argument(&name, "name is empty"));
        }
        if name == CURRENT || name == PARENT {
            return Err(Error::invalid_argument(&name, "name is reserved"));
        }
        if name.contains(SEPARATOR) {
            return Err(Error::invalid_argument(&name, "name contains a separator"));
        }
        if name.contains('\0') {
            return Err(Error::invalid_argument(&name, "name contains NUL"));
        }
        Ok(Self(name))
    }

    /// Next auto-generated name for `kind`: `dir1`, `item1`, `link1`, ...
    ///
    /// The counters are process-wide and only ever increase.
    #[must_use]
    pub fn generate(kind: NodeKind) -> Self {
        let (prefix, counter) = match kind {
            NodeKind::Directory => ("dir", &DIRECTORY_COUNTER),
            NodeKind::Item => ("item", &ITEM_COUNTER),
            NodeKind::SymbolicLink => ("link", &LINK_COUNTER),
        };
        Self(format!("{}{}", prefix, counter.fetch_add(1, Ordering::SeqCst)))
    }

    /// Name carried by an engine's root directory.
    pub(crate) fn root() -> Self {
        Self(SEPARATOR.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for NodeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl TryFrom<&str> for NodeName {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        NodeName::new(s)
    }
}

impl AsRef<str> for NodeName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<&str> for NodeName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
