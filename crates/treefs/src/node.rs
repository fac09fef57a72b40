// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Utc};

use crate::dir::Directory;
use crate::error::{Error, Result};
use crate::item::{DeepCloneable, Item};
use crate::kind::NodeKind;
use crate::name::NodeName;
use crate::path::TreePath;
use crate::symlink::SymbolicLink;

/// Diagnostic identity of a node; never reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeID(usize);

impl std::fmt::Display for NodeID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04X}", self.0)
    }
}

impl NodeID {
    /// Generate a new sequential NodeID
    pub fn new_sequential() -> Self {
        static COUNTER: AtomicUsize = AtomicUsize::new(1);
        Self(COUNTER.fetch_add(1, Ordering::SeqCst))
    }

    pub fn as_usize(&self) -> usize {
        self.0
    }
}

/// Per-kind content of a node.
pub enum NodeBody<T> {
    Directory(Directory<T>),
    Item(Item<T>),
    SymbolicLink(SymbolicLink),
}

/// A directory, item or symbolic link together with its metadata.
pub struct Node<T> {
    id: NodeID,
    name: NodeName,
    created: DateTime<Utc>,
    updated: DateTime<Utc>,
    attached: bool,
    body: NodeBody<T>,
}

impl<T> Node<T> {
    pub fn new(name: NodeName, body: NodeBody<T>) -> Self {
        let now = Utc::now();
        Self {
            id: NodeID::new_sequential(),
            name,
            created: now,
            updated: now,
            attached: false,
            body,
        }
    }

    pub fn directory(name: NodeName) -> Self {
        Self::new(name, NodeBody::Directory(Directory::new()))
    }

    pub fn item(name: NodeName, data: Option<T>) -> Self {
        Self::new(name, NodeBody::Item(Item::new(data)))
    }

    pub fn symbolic_link(name: NodeName, target: TreePath) -> Self {
        Self::new(name, NodeBody::SymbolicLink(SymbolicLink::new(target)))
    }

    pub(crate) fn root() -> Self {
        let mut root = Self::directory(NodeName::root());
        root.set_attached(true);
        root
    }

    /// A directory named `dirN`.
    pub fn auto_directory() -> Self {
        Self::directory(NodeName::generate(NodeKind::Directory))
    }

    /// An item named `itemN`.
    pub fn auto_item(data: Option<T>) -> Self {
        Self::item(NodeName::generate(NodeKind::Item), data)
    }

    /// A link named `linkN` pointing at `target`.
    pub fn link_to(target: TreePath) -> Self {
        Self::symbolic_link(NodeName::generate(NodeKind::SymbolicLink), target)
    }

    pub fn id(&self) -> NodeID {
        self.id
    }

    pub fn name(&self) -> &NodeName {
        &self.name
    }

    pub fn kind(&self) -> NodeKind {
        match &self.body {
            NodeBody::Directory(_) => NodeKind::Directory,
            NodeBody::Item(_) => NodeKind::Item,
            NodeBody::SymbolicLink(_) => NodeKind::SymbolicLink,
        }
    }

    pub fn created_date(&self) -> DateTime<Utc> {
        self.created
    }

    pub fn updated_date(&self) -> DateTime<Utc> {
        self.updated
    }

    /// True while the node is reachable from an engine's root.
    pub fn is_referenced_in_storage(&self) -> bool {
        self.attached
    }

    pub fn body(&self) -> &NodeBody<T> {
        &self.body
    }

    pub fn as_dir(&self) -> Result<&Directory<T>> {
        match &self.body {
            NodeBody::Directory(d) => Ok(d),
            _ => Err(Error::not_a_directory(self.name.as_str(), self.kind())),
        }
    }

    pub fn as_dir_mut(&mut self) -> Result<&mut Directory<T>> {
        let kind = self.kind();
        match &mut self.body {
            NodeBody::Directory(d) => Ok(d),
            _ => Err(Error::not_a_directory(self.name.as_str(), kind)),
        }
    }

    pub fn as_item(&self) -> Result<&Item<T>> {
        match &self.body {
            NodeBody::Item(i) => Ok(i),
            _ => Err(Error::type_mismatch(
                self.name.as_str(),
                NodeKind::Item,
                self.kind(),
            )),
        }
    }

    pub fn as_item_mut(&mut self) -> Result<&mut Item<T>> {
        let kind = self.kind();
        match &mut self.body {
            NodeBody::Item(i) => Ok(i),
            _ => Err(Error::type_mismatch(self.name.as_str(), NodeKind::Item, kind)),
        }
    }

    pub fn as_symlink(&self) -> Result<&SymbolicLink> {
        match &self.body {
            NodeBody::SymbolicLink(l) => Ok(l),
            _ => Err(Error::type_mismatch(
                self.name.as_str(),
                NodeKind::SymbolicLink,
                self.kind(),
            )),
        }
    }

    pub(crate) fn as_symlink_mut(&mut self) -> Option<&mut SymbolicLink> {
        match &mut self.body {
            NodeBody::SymbolicLink(l) => Some(l),
            _ => None,
        }
    }

    /// Add a child to this node, which must be a directory.
    pub fn add_child(&mut self, child: Node<T>, overwrite: bool) -> Result<Option<Node<T>>> {
        let replaced = self.as_dir_mut()?.add(child, overwrite)?;
        self.touch();
        Ok(replaced)
    }

    pub(crate) fn set_name(&mut self, name: NodeName) {
        self.name = name;
        self.touch();
    }

    /// Same node under another name; timestamps are left alone.
    pub(crate) fn with_name(mut self, name: NodeName) -> Self {
        self.name = name;
        self
    }

    pub(crate) fn touch(&mut self) {
        self.updated = Utc::now();
    }

    /// Set the attached flag on this node and everything below it.
    pub(crate) fn set_attached(&mut self, attached: bool) {
        let mut stack: Vec<&mut Node<T>> = vec![self];
        while let Some(node) = stack.pop() {
            node.attached = attached;
            if let NodeBody::Directory(dir) = &mut node.body {
                dir.set_attached_flag(attached);
                stack.extend(dir.iter_mut());
            }
        }
    }
}

impl<T: DeepCloneable> Node<T> {
    /// Detached copy with the same name and timestamps. A directory comes
    /// back empty; see [`Node::clone_subtree`] for a recursive copy.
    #[must_use]
    pub fn deep_clone(&self) -> Node<T> {
        let body = match &self.body {
            NodeBody::Directory(_) => NodeBody::Directory(Directory::new()),
            NodeBody::Item(i) => NodeBody::Item(i.deep_clone()),
            NodeBody::SymbolicLink(l) => NodeBody::SymbolicLink(l.clone()),
        };
        Node {
            id: NodeID::new_sequential(),
            name: self.name.clone(),
            created: self.created,
            updated: self.updated,
            attached: false,
            body,
        }
    }

    /// Detached copy of this node and all of its descendants.
    pub fn clone_subtree(&self) -> Result<Node<T>> {
        let mut copy = self.deep_clone();
        let mut stack: Vec<(&Node<T>, Vec<usize>)> = vec![(self, Vec::new())];

        while let Some((src, route)) = stack.pop() {
            let NodeBody::Directory(src_dir) = &src.body else {
                continue;
            };
            let mut dst = &mut copy;
            for &i in &route {
                dst = dst
                    .as_dir_mut()?
                    .iter_mut()
                    .nth(i)
                    .ok_or_else(|| Error::not_found(src.name.as_str()))?;
            }
            let dst_dir = dst.as_dir_mut()?;
            for (i, child) in src_dir.iter().enumerate() {
                _ = dst_dir.add(child.deep_clone(), false)?;
                if child.kind() == NodeKind::Directory {
                    let mut next = route.clone();
                    next.push(i);
                    stack.push((child, next));
                }
            }
        }
        Ok(copy)
    }
}

impl<T> std::fmt::Display for Node<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.body {
            NodeBody::Directory(_) if self.name.as_str() == "/" => f.write_str("/"),
            NodeBody::Directory(_) => write!(f, "{}/", self.name),
            NodeBody::Item(_) => write!(f, "{}", self.name),
            NodeBody::SymbolicLink(l) => write!(f, "{} -> {}", self.name, l.target()),
        }
    }
}

impl<T> std::fmt::Debug for Node<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Node({} {} {})", self.id, self.kind(), self.name)
    }
}
