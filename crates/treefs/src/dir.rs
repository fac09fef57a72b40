// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::cmp::Ordering;

use crate::error::{Error, Result};
use crate::item::Item;
use crate::kind::{KindFilter, NodeKind};
use crate::node::Node;
use crate::settings::{SortOrder, SortProperty};
use crate::symlink::SymbolicLink;

/// Represents a directory containing uniquely named entries, kept in
/// insertion order.
pub struct Directory<T> {
    entries: Vec<Node<T>>,
    attached: bool,
}

impl<T> Default for Directory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Directory<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            attached: false,
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|n| n.name().as_str() == name)
    }

    /// Add a child. An occupied name is a conflict unless `overwrite` is set
    /// and the kinds are compatible; the replaced node is returned detached.
    pub fn add(&mut self, mut node: Node<T>, overwrite: bool) -> Result<Option<Node<T>>> {
        match self.position(node.name().as_str()) {
            None => {
                node.set_attached(self.attached);
                self.entries.push(node);
                Ok(None)
            }
            Some(_) if !overwrite => Err(Error::already_exists(node.name().as_str())),
            Some(pos) => {
                check_replaceable(&self.entries[pos], &node)?;
                node.set_attached(self.attached);
                let mut old = std::mem::replace(&mut self.entries[pos], node);
                old.set_attached(false);
                Ok(Some(old))
            }
        }
    }

    /// Detach and return the named child.
    pub fn remove(&mut self, name: &str) -> Result<Node<T>> {
        let mut node = self.take(name)?;
        node.set_attached(false);
        Ok(node)
    }

    /// Remove without touching the attached flag, for relocation.
    pub(crate) fn take(&mut self, name: &str) -> Result<Node<T>> {
        let pos = self.position(name).ok_or_else(|| Error::not_found(name))?;
        Ok(self.entries.remove(pos))
    }

    pub fn get(&self, name: &str) -> Result<&Node<T>> {
        self.find(name).ok_or_else(|| Error::not_found(name))
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Result<&mut Node<T>> {
        self.entries
            .iter_mut()
            .find(|n| n.name().as_str() == name)
            .ok_or_else(|| Error::not_found(name))
    }

    pub fn find(&self, name: &str) -> Option<&Node<T>> {
        self.entries.iter().find(|n| n.name().as_str() == name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn get_directory(&self, name: &str) -> Result<&Directory<T>> {
        self.get(name)?.as_dir()
    }

    pub fn get_item(&self, name: &str) -> Result<&Item<T>> {
        self.get(name)?.as_item()
    }

    pub fn get_symbolic_link(&self, name: &str) -> Result<&SymbolicLink> {
        self.get(name)?.as_symlink()
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn count_kind(&self, kind: NodeKind) -> usize {
        self.entries.iter().filter(|n| n.kind() == kind).count()
    }

    #[must_use]
    pub fn directory_count(&self) -> usize {
        self.count_kind(NodeKind::Directory)
    }

    #[must_use]
    pub fn item_count(&self) -> usize {
        self.count_kind(NodeKind::Item)
    }

    #[must_use]
    pub fn symbolic_link_count(&self) -> usize {
        self.count_kind(NodeKind::SymbolicLink)
    }

    /// Children in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Node<T>> {
        self.entries.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Node<T>> {
        self.entries.iter_mut()
    }

    /// Children of the selected kinds, in the given order.
    pub fn node_list(&self, filter: KindFilter, order: &SortOrder) -> Vec<&Node<T>> {
        let mut list: Vec<&Node<T>> = self
            .entries
            .iter()
            .filter(|n| filter.contains(n.kind()))
            .collect();
        list.sort_by(|a, b| compare(a, b, order));
        list
    }

    pub(crate) fn set_attached_flag(&mut self, attached: bool) {
        self.attached = attached;
    }
}

impl<T> Drop for Directory<T> {
    // Nested entries are released from a flat work list, not recursively.
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.entries);
        while let Some(mut node) = pending.pop() {
            if node.kind() == NodeKind::Directory
                && let Ok(dir) = node.as_dir_mut()
            {
                pending.append(&mut dir.entries);
            }
        }
    }
}

fn check_replaceable<T>(existing: &Node<T>, incoming: &Node<T>) -> Result<()> {
    let (old, new) = (existing.kind(), incoming.kind());
    if old == new || (old != NodeKind::Directory && new != NodeKind::Directory) {
        Ok(())
    } else {
        Err(Error::conflict(
            existing.name().as_str(),
            format!("cannot replace {} with {}", old, new),
        ))
    }
}

fn compare<T>(a: &Node<T>, b: &Node<T>, order: &SortOrder) -> Ordering {
    let grouped = if order.group_by_kind {
        a.kind().rank().cmp(&b.kind().rank())
    } else {
        Ordering::Equal
    };
    order.keys.iter().fold(grouped, |acc, key| {
        acc.then_with(|| {
            let ord = match key.property {
                SortProperty::Name => a.name().cmp(b.name()),
                SortProperty::Created => a.created_date().cmp(&b.created_date()),
                SortProperty::Updated => a.updated_date().cmp(&b.updated_date()),
            };
            if key.ascending { ord } else { ord.reverse() }
        })
    })
}
