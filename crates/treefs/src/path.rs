// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Slash-separated paths addressing nodes in the tree.
//!
//! A [`TreePath`] always holds its normalized text: repeated and trailing
//! separators are collapsed, `.` segments are dropped and `..` cancels the
//! preceding literal segment. Normalization is purely textual; no lookup is
//! involved. Two paths are equal exactly when their normalized text is equal.

use std::fmt;
use std::ops::Add;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::wildcard::WildcardMatcher;

pub const SEPARATOR: char = '/';
pub const CURRENT: &str = ".";
pub const PARENT: &str = "..";

/// An immutable, normalized path.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TreePath(String);

impl TreePath {
    /// Parse and normalize path text.
    pub fn new<S: AsRef<str>>(text: S) -> Result<Self> {
        let text = text.as_ref();
        if text.is_empty() {
            return Err(Error::invalid_argument(text, "path is empty"));
        }
        if text.contains('\0') {
            return Err(Error::invalid_argument(text, "path contains NUL"));
        }
        Ok(Self(normalize(text)))
    }

    /// The root path `/`.
    #[must_use]
    pub fn root() -> Self {
        Self(SEPARATOR.to_string())
    }

    /// The relative path `.`.
    #[must_use]
    pub fn current() -> Self {
        Self(CURRENT.to_string())
    }

    /// Build an absolute path from literal segments, e.g. a physical location.
    pub(crate) fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut text = String::new();
        for seg in segments {
            text.push(SEPARATOR);
            text.push_str(seg.as_ref());
        }
        if text.is_empty() {
            Self::root()
        } else {
            Self(text)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_absolute(&self) -> bool {
        self.0.starts_with(SEPARATOR)
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.len() == 1 && self.is_absolute()
    }

    /// Segments after the root, including leading `..` of a relative path.
    pub fn segments(&self) -> impl DoubleEndedIterator<Item = &str> {
        self.0
            .split(SEPARATOR)
            .filter(|s| !s.is_empty() && *s != CURRENT)
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// All but the last segment. The root is its own directory path.
    #[must_use]
    pub fn dir_path(&self) -> TreePath {
        if self.is_root() {
            return self.clone();
        }
        match self.0.rfind(SEPARATOR) {
            Some(0) => Self::root(),
            Some(pos) => Self(self.0[..pos].to_string()),
            None => Self::current(),
        }
    }

    /// The last segment, if it names a node.
    #[must_use]
    pub fn node_name(&self) -> Option<&str> {
        self.segments().next_back().filter(|s| *s != PARENT)
    }

    /// Append another path. An absolute `other` replaces `self`.
    #[must_use]
    pub fn combine(&self, other: &TreePath) -> TreePath {
        if other.is_absolute() {
            return other.clone();
        }
        Self(normalize(&format!("{}{}{}", self.0, SEPARATOR, other.0)))
    }

    /// Path of the entry `name` directly below this one.
    #[must_use]
    pub fn child<S: AsRef<str>>(&self, name: S) -> TreePath {
        Self(normalize(&format!("{}{}{}", self.0, SEPARATOR, name.as_ref())))
    }

    /// Append path text, validating it first.
    pub fn join<S: AsRef<str>>(&self, other: S) -> Result<TreePath> {
        Ok(self.combine(&TreePath::new(other)?))
    }

    /// Resolve a relative path against an absolute base.
    #[must_use]
    pub fn to_absolute(&self, base: &TreePath) -> TreePath {
        if self.is_absolute() {
            self.clone()
        } else {
            TreePath::root().combine(base).combine(self)
        }
    }

    /// True when `prefix` equals `self` or is one of its ancestors.
    #[must_use]
    pub fn starts_with(&self, prefix: &TreePath) -> bool {
        if self.is_absolute() != prefix.is_absolute() {
            return false;
        }
        let mut mine = self.segments();
        prefix.segments().all(|p| mine.next() == Some(p))
    }

    /// Replace the leading `from` portion with `to`.
    #[must_use]
    pub fn rebase(&self, from: &TreePath, to: &TreePath) -> Option<TreePath> {
        if !self.starts_with(from) {
            return None;
        }
        let rest: Vec<&str> = self.segments().skip(from.depth()).collect();
        if rest.is_empty() {
            return Some(to.clone());
        }
        Some(Self(normalize(&format!(
            "{}{}{}",
            to.0,
            SEPARATOR,
            rest.join("/")
        ))))
    }

    /// Whether any segment holds a metacharacter recognized by `matcher`.
    pub fn contains_wildcard(&self, matcher: &dyn WildcardMatcher) -> bool {
        self.segments().any(|s| matcher.contains_wildcard(s))
    }
}

/// Collapse separators, drop `.`, cancel `..` against the preceding segment.
fn normalize(text: &str) -> String {
    let absolute = text.starts_with(SEPARATOR);
    let mut stack: Vec<&str> = Vec::new();

    for seg in text.split(SEPARATOR) {
        match seg {
            "" | CURRENT => {}
            PARENT => match stack.last() {
                Some(&last) if last != PARENT => {
                    _ = stack.pop();
                }
                // `..` above the root stays at the root
                _ if absolute => {}
                _ => stack.push(PARENT),
            },
            _ => stack.push(seg),
        }
    }

    let joined = stack.join("/");
    if absolute {
        format!("{}{}", SEPARATOR, joined)
    } else if joined.is_empty() {
        CURRENT.to_string()
    } else {
        joined
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl FromStr for TreePath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        TreePath::new(s)
    }
}

impl TryFrom<&str> for TreePath {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        TreePath::new(s)
    }
}

impl TryFrom<String> for TreePath {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        TreePath::new(s)
    }
}

impl From<TreePath> for String {
    fn from(p: TreePath) -> String {
        p.0
    }
}

impl AsRef<str> for TreePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<&str> for TreePath {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl PartialEq<str> for TreePath {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl Add<&TreePath> for &TreePath {
    type Output = TreePath;

    fn add(self, rhs: &TreePath) -> TreePath {
        self.combine(rhs)
    }
}

impl Add<&TreePath> for TreePath {
    type Output = TreePath;

    fn add(self, rhs: &TreePath) -> TreePath {
        self.combine(rhs)
    }
}
