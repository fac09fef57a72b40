// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! The storage engine: one root directory, a current-directory cursor and
//! the reverse link index, with every operation built on the path walker.
//!
//! Paths passed to the engine may be relative; they are resolved against
//! the cursor. Mutations resolve their targets completely before touching
//! the tree, so a failed call leaves everything as it was.

mod add;
mod glob;
mod relocate;
mod remove;

pub use add::AddOptions;
pub use relocate::CopyOptions;
pub use remove::RemoveOptions;

use std::any::Any;

use crate::dir::Directory;
use crate::error::{Error, Result};
use crate::item::Item;
use crate::kind::{KindFilter, NodeKind};
use crate::link_index::LinkIndex;
use crate::node::{Node, NodeBody};
use crate::path::TreePath;
use crate::settings::Settings;
use crate::symlink::SymbolicLink;
use crate::walker::{Lookup, VisitFn, WalkContext, WalkState, WalkTree, node_at, walk_to_target};
use crate::wildcard::WildcardMatcher;

/// In-memory tree of directories, items and symbolic links.
pub struct StorageEngine<T> {
    root: Node<T>,
    current: TreePath,
    links: LinkIndex,
    settings: Settings,
    matcher: Box<dyn WildcardMatcher>,
}

impl<T> Default for StorageEngine<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> StorageEngine<T> {
    /// An empty engine with default settings.
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    pub fn with_settings(settings: Settings) -> Self {
        let matcher = settings.matcher();
        Self {
            root: Node::root(),
            current: TreePath::root(),
            links: LinkIndex::new(),
            settings,
            matcher,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replace the wildcard strategy used by this engine.
    pub fn set_wildcard_matcher(&mut self, matcher: Box<dyn WildcardMatcher>) {
        self.matcher = matcher;
    }

    pub fn wildcard_matcher(&self) -> &dyn WildcardMatcher {
        self.matcher.as_ref()
    }

    pub fn root(&self) -> &Node<T> {
        &self.root
    }

    pub fn link_index(&self) -> &LinkIndex {
        &self.links
    }

    pub fn current_path(&self) -> &TreePath {
        &self.current
    }

    /// Move the cursor. The path must reach a directory, possibly through
    /// links, but the cursor keeps the path as written.
    pub fn change_directory<P: AsRef<str>>(&mut self, path: P) -> Result<()> {
        let path = self.absolute(path)?;
        let node = self.walk_to_target(path.as_str(), true)?.node;
        if node.kind() != NodeKind::Directory {
            return Err(Error::not_a_directory(path.as_str(), node.kind()));
        }
        self.current = path;
        Ok(())
    }

    /// Parse `path` and resolve it against the cursor.
    pub fn absolute<P: AsRef<str>>(&self, path: P) -> Result<TreePath> {
        Ok(TreePath::new(path)?.to_absolute(&self.current))
    }

    /// Resolve `path` to the node it names.
    pub fn walk_to_target<P: AsRef<str>>(&self, path: P, follow_links: bool) -> Result<WalkContext<'_, T>> {
        self.walk_to_target_with(path, follow_links, &mut |_, _, _| {})
    }

    /// Like [`StorageEngine::walk_to_target`], reporting every resolved
    /// segment by its absolute traversal path. The returned context keeps
    /// `path` as written.
    pub fn walk_to_target_with<P: AsRef<str>>(
        &self,
        path: P,
        follow_links: bool,
        on_visit: &mut VisitFn<'_, T>,
    ) -> Result<WalkContext<'_, T>> {
        let requested = TreePath::new(path)?;
        let absolute = requested.to_absolute(&self.current);
        let mut ctx = walk_to_target(&self.root, &absolute, follow_links, on_visit)?;
        ctx.traversal_path = requested;
        Ok(ctx)
    }

    /// Lazy walk of the subtree at `base`.
    pub fn walk_tree<P: AsRef<str>>(
        &self,
        base: P,
        filter: KindFilter,
        recursive: bool,
        follow_links: bool,
    ) -> Result<WalkTree<'_, T>> {
        let base = self.walk_to_target(base, follow_links)?;
        Ok(WalkTree::new(
            &self.root,
            base,
            &self.settings.sort,
            filter,
            recursive,
            follow_links,
        ))
    }

    pub fn get_node<P: AsRef<str>>(&self, path: P, follow_links: bool) -> Result<&Node<T>> {
        Ok(self.walk_to_target(path, follow_links)?.node)
    }

    /// The node at `path`, or `None` if it cannot be reached.
    pub fn try_get_node<P: AsRef<str>>(&self, path: P, follow_links: bool) -> Option<&Node<T>> {
        self.get_node(path, follow_links).ok()
    }

    pub fn get_directory<P: AsRef<str>>(&self, path: P, follow_links: bool) -> Result<&Directory<T>> {
        let ctx = self.walk_to_target(path, follow_links)?;
        match ctx.node.body() {
            NodeBody::Directory(d) => Ok(d),
            _ => Err(Error::not_a_directory(ctx.traversal_path.as_str(), ctx.node.kind())),
        }
    }

    pub fn get_item<P: AsRef<str>>(&self, path: P, follow_links: bool) -> Result<&Item<T>> {
        let ctx = self.walk_to_target(path, follow_links)?;
        match ctx.node.body() {
            NodeBody::Item(i) => Ok(i),
            _ => Err(Error::type_mismatch(
                ctx.traversal_path.as_str(),
                NodeKind::Item,
                ctx.node.kind(),
            )),
        }
    }

    /// The link itself at `path`; the final segment is never followed.
    pub fn get_symbolic_link<P: AsRef<str>>(&self, path: P) -> Result<&SymbolicLink> {
        let ctx = self.walk_to_target(path, false)?;
        match ctx.node.body() {
            NodeBody::SymbolicLink(l) => Ok(l),
            _ => Err(Error::type_mismatch(
                ctx.traversal_path.as_str(),
                NodeKind::SymbolicLink,
                ctx.node.kind(),
            )),
        }
    }

    /// Payload of the item at `path`, following links.
    pub fn get_item_data<P: AsRef<str>>(&self, path: P) -> Result<Option<&T>> {
        Ok(self.get_item(path, true)?.data())
    }

    /// Replace the payload of the item at `path`, following links.
    pub fn set_item_data<P: AsRef<str>>(&mut self, path: P, data: Option<T>) -> Result<()> {
        let physical = self.walk_to_target(path, true)?.resolved_path;
        let node = self.node_at_mut(&physical)?;
        node.as_item_mut()?.set_data(data);
        node.touch();
        diagnostics::debug!("set item data at {path}", path: physical.as_str());
        Ok(())
    }

    pub fn node_exists<P: AsRef<str>>(&self, path: P, follow_links: bool) -> bool {
        self.try_get_node(path, follow_links).is_some()
    }

    fn kind_exists<P: AsRef<str>>(&self, path: P, follow_links: bool, kind: NodeKind) -> bool {
        self.try_get_node(path, follow_links)
            .is_some_and(|n| n.kind() == kind)
    }

    pub fn directory_exists<P: AsRef<str>>(&self, path: P, follow_links: bool) -> bool {
        self.kind_exists(path, follow_links, NodeKind::Directory)
    }

    pub fn item_exists<P: AsRef<str>>(&self, path: P, follow_links: bool) -> bool {
        self.kind_exists(path, follow_links, NodeKind::Item)
    }

    pub fn symbolic_link_exists<P: AsRef<str>>(&self, path: P, follow_links: bool) -> bool {
        self.kind_exists(path, follow_links, NodeKind::SymbolicLink)
    }

    /// Fully dereference every link along `path`.
    ///
    /// Every hop must exist except the very last segment, so the result may
    /// name a location that currently holds nothing.
    pub fn resolve_link_target<P: AsRef<str>>(&self, path: P) -> Result<TreePath> {
        let path = self.absolute(path)?;
        let mut state = WalkState::new(&path, true);
        match state.run(&self.root, &mut |_, _, _| {})? {
            Lookup::Found => Ok(state.physical_path()),
            Lookup::NotFound(missing) if missing.last => Ok(missing.path()),
            Lookup::NotFound(missing) => Err(Error::not_found(missing.traversal.as_str())),
        }
    }

    /// Physical paths of the links whose target is `target`.
    pub fn links_to<P: AsRef<str>>(&self, target: P) -> Result<Vec<TreePath>> {
        let target = self.absolute(target)?;
        Ok(self
            .links
            .links_to(&target)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default())
    }

    /// Physical path of the node named by `path` without following its
    /// final segment; intermediate links are followed.
    pub(crate) fn locate_entry(&self, path: &TreePath) -> Result<TreePath> {
        if path.is_root() {
            return Ok(TreePath::root());
        }
        let name = path
            .node_name()
            .ok_or_else(|| Error::invalid_argument(path.as_str(), "path does not name a node"))?;
        let parent = self.walk_to_target(path.dir_path().as_str(), true)?;
        let dir = parent.node.as_dir().map_err(|_| {
            Error::not_a_directory(parent.traversal_path.as_str(), parent.node.kind())
        })?;
        if !dir.contains(name) {
            return Err(Error::not_found(path.as_str()));
        }
        Ok(parent.resolved_path.child(name))
    }

    /// Physical location of the cursor, if it still resolves.
    pub(crate) fn current_physical(&self) -> Option<TreePath> {
        self.walk_to_target(self.current.as_str(), true)
            .ok()
            .map(|ctx| ctx.resolved_path)
    }

    pub(crate) fn node_at(&self, physical: &TreePath) -> Result<&Node<T>> {
        let segments: Vec<&str> = physical.segments().collect();
        node_at(&self.root, &segments)
    }

    pub(crate) fn node_at_mut(&mut self, physical: &TreePath) -> Result<&mut Node<T>> {
        let mut node = &mut self.root;
        for seg in physical.segments() {
            node = node.as_dir_mut()?.get_mut(seg)?;
        }
        Ok(node)
    }

    /// Kind at `path` without following its last segment.
    fn kind_at(&self, path: &TreePath) -> Option<NodeKind> {
        let physical = self.locate_entry(path).ok()?;
        self.node_at(&physical).ok().map(Node::kind)
    }

    /// Every link at or below the physical path `base`, with its index key.
    pub(crate) fn links_below(&self, base: &TreePath) -> Result<Vec<(TreePath, TreePath)>> {
        let mut found = Vec::new();
        let walk = WalkTree::new(
            &self.root,
            WalkContext::locate(&self.root, base.clone(), base.clone())?,
            &self.settings.sort,
            KindFilter::ALL,
            true,
            false,
        );
        for ctx in walk {
            let ctx = ctx?;
            if let NodeBody::SymbolicLink(link) = ctx.node.body() {
                let key = link.target().to_absolute(&ctx.resolved_path.dir_path());
                found.push((key, ctx.resolved_path));
            }
        }
        Ok(found)
    }

    /// Enter every link at or below `base` into the index and compute
    /// their target kinds.
    pub(crate) fn register_links(&mut self, base: &TreePath) -> Result<()> {
        let found = self.links_below(base)?;
        for (key, link) in &found {
            self.links.insert(key.clone(), link.clone());
        }
        if !found.is_empty() {
            diagnostics::debug!("registered {count} links below {path}", count: found.len(), path: base.as_str());
        }
        self.refresh_target_kinds(|_, link| link.starts_with(base))
    }

    /// Drop index entries for links at or below `base`.
    pub(crate) fn unregister_links(&mut self, base: &TreePath) {
        let dropped = self.links.drain_matching(|_, link| link.starts_with(base));
        if !dropped.is_empty() {
            diagnostics::debug!("dropped {count} links below {path}", count: dropped.len(), path: base.as_str());
        }
    }

    /// Recompute the cached target kind of every indexed link selected by
    /// `pred(target, link)`.
    pub(crate) fn refresh_target_kinds<F>(&mut self, mut pred: F) -> Result<()>
    where
        F: FnMut(&TreePath, &TreePath) -> bool,
    {
        let updates: Vec<(TreePath, Option<NodeKind>)> = self
            .links
            .iter()
            .filter(|(target, link)| pred(target, link))
            .map(|(target, link)| (link.clone(), self.kind_at(target)))
            .collect();
        for (link, kind) in updates {
            if let Some(symlink) = self.node_at_mut(&link)?.as_symlink_mut() {
                symlink.set_target_kind(kind);
            }
        }
        Ok(())
    }

    /// Refresh links whose target is at or below `prefix`.
    pub(crate) fn refresh_links_into(&mut self, prefix: &TreePath) -> Result<()> {
        self.refresh_target_kinds(|target, _| target.starts_with(prefix))
    }
}

impl StorageEngine<Box<dyn Any>> {
    /// Payload of the item at `path` downcast to `U`.
    pub fn get_item_data_as<U: Any, P: AsRef<str>>(&self, path: P) -> Result<Option<&U>> {
        let ctx = self.walk_to_target(path, true)?;
        let item = ctx.node.as_item()?;
        match item.data() {
            None => Ok(None),
            Some(_) => item.data_as::<U>().map(Some).ok_or_else(|| {
                Error::type_mismatch(
                    ctx.traversal_path.as_str(),
                    std::any::type_name::<U>(),
                    "a different payload type",
                )
            }),
        }
    }
}
