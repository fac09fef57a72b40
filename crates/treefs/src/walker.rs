// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Segment-by-segment traversal over an engine's tree.
//!
//! [`WalkState`] resolves a single path. Following a link splices the
//! segments of its target in front of the remaining segments, so the walk
//! always proceeds from the root over physical (link-free) names. The state
//! borrows nothing between calls: when a segment is missing the walk stops
//! with [`Lookup::NotFound`], and a caller that creates the missing
//! directory may call [`WalkState::run`] again to resume.
//!
//! [`WalkTree`] is the lazy pre-order subtree walk built on the same
//! resolution rules.

use std::collections::VecDeque;

use crate::cycle::CycleDetector;
use crate::error::{Error, Result};
use crate::kind::{KindFilter, NodeKind};
use crate::node::{Node, NodeBody};
use crate::path::TreePath;
use crate::settings::SortOrder;

/// Observer of every resolved segment: `(path_so_far, node, is_final)`.
pub type VisitFn<'f, T> = dyn FnMut(&TreePath, &Node<T>, bool) + 'f;

/// A segment that could not be found.
#[derive(Debug, Clone, PartialEq)]
pub struct MissingSegment {
    /// Physical path of the directory that lacks the segment.
    pub parent: TreePath,
    pub name: String,
    /// Literal path requested up to and including the missing segment.
    pub traversal: TreePath,
    /// True when the segment came from a link target rather than the request.
    pub via_link: bool,
    /// True when nothing follows the segment.
    pub last: bool,
}

impl MissingSegment {
    pub fn path(&self) -> TreePath {
        self.parent.child(&self.name)
    }
}

/// Outcome of one [`WalkState::run`].
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Found,
    NotFound(MissingSegment),
}

#[derive(Debug)]
struct Segment {
    name: String,
    original: bool,
}

/// Resumable resolution of one absolute path.
#[derive(Debug)]
pub struct WalkState {
    queue: VecDeque<Segment>,
    physical: Vec<String>,
    traversal: Vec<String>,
    cycles: CycleDetector,
    follow_links: bool,
}

impl WalkState {
    pub fn new(path: &TreePath, follow_links: bool) -> Self {
        Self {
            queue: path
                .segments()
                .map(|s| Segment {
                    name: s.to_string(),
                    original: true,
                })
                .collect(),
            physical: Vec::new(),
            traversal: Vec::new(),
            cycles: CycleDetector::new(),
            follow_links,
        }
    }

    /// Physical path of the node reached so far.
    pub fn physical_path(&self) -> TreePath {
        TreePath::from_segments(&self.physical)
    }

    /// Literal path consumed so far.
    pub fn traversal_path(&self) -> TreePath {
        TreePath::from_segments(&self.traversal)
    }

    /// Advance until the path is resolved or a segment is missing.
    pub fn run<T>(&mut self, root: &Node<T>, on_visit: &mut VisitFn<'_, T>) -> Result<Lookup> {
        let mut current = node_at(root, &self.physical)?;

        while let Some(seg) = self.queue.pop_front() {
            if seg.original {
                self.cycles.clear();
            }
            let dir = match current.body() {
                NodeBody::Directory(d) => d,
                _ => {
                    return Err(Error::not_a_directory(
                        self.traversal_path().as_str(),
                        current.kind(),
                    ));
                }
            };
            if seg.original {
                self.traversal.push(seg.name.clone());
            }

            let Some(child) = dir.find(&seg.name) else {
                let missing = MissingSegment {
                    parent: self.physical_path(),
                    name: seg.name.clone(),
                    traversal: self.traversal_path(),
                    via_link: !seg.original,
                    last: self.queue.is_empty(),
                };
                if seg.original {
                    _ = self.traversal.pop();
                }
                self.queue.push_front(seg);
                return Ok(Lookup::NotFound(missing));
            };

            if self.follow_links
                && let NodeBody::SymbolicLink(link) = child.body()
            {
                let parent = self.physical_path();
                let link_path = parent.child(&seg.name);
                if !self.cycles.is_node_in_cycle(&link_path) {
                    let target = link.target().to_absolute(&parent);
                    for s in target.segments().rev() {
                        self.queue.push_front(Segment {
                            name: s.to_string(),
                            original: false,
                        });
                    }
                    self.physical.clear();
                    current = root;
                    if target.is_root() {
                        self.settle(current, on_visit);
                    }
                    continue;
                }
            }

            self.physical.push(seg.name);
            current = child;
            self.settle(current, on_visit);
        }
        Ok(Lookup::Found)
    }

    /// Report the node if it ends the chain for the current request segment.
    fn settle<T>(&self, node: &Node<T>, on_visit: &mut VisitFn<'_, T>) {
        match self.queue.front() {
            Some(next) if !next.original => {}
            next => on_visit(&self.traversal_path(), node, next.is_none()),
        }
    }
}

/// Node at a physical path; every segment must name a directory entry.
pub(crate) fn node_at<'a, T, S: AsRef<str>>(root: &'a Node<T>, segments: &[S]) -> Result<&'a Node<T>> {
    let mut node = root;
    for seg in segments {
        node = node.as_dir()?.get(seg.as_ref())?;
    }
    Ok(node)
}

/// A node reached by a walk, with where it was found.
pub struct WalkContext<'a, T> {
    pub node: &'a Node<T>,
    /// Path as requested, keeping link names.
    pub traversal_path: TreePath,
    /// Physical path after every link is dereferenced.
    pub resolved_path: TreePath,
    pub parent: Option<&'a Node<T>>,
    /// Position among the parent's children.
    pub index: usize,
    pub sibling_count: usize,
    /// Distance from the walk's starting node.
    pub depth: usize,
}

impl<'a, T> WalkContext<'a, T> {
    /// Context for the node at a physical path, indexed in insertion order.
    pub(crate) fn locate(
        root: &'a Node<T>,
        resolved: TreePath,
        traversal: TreePath,
    ) -> Result<Self> {
        let segments: Vec<&str> = resolved.segments().collect();
        let node = node_at(root, &segments)?;
        let (parent, index, sibling_count) = match segments.split_last() {
            None => (None, 0, 1),
            Some((name, rest)) => {
                let parent = node_at(root, rest)?;
                let dir = parent.as_dir()?;
                let index = dir
                    .iter()
                    .position(|n| n.name().as_str() == *name)
                    .unwrap_or_default();
                (Some(parent), index, dir.count())
            }
        };
        Ok(Self {
            node,
            traversal_path: traversal,
            resolved_path: resolved,
            parent,
            index,
            sibling_count,
            depth: 0,
        })
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.index + 1 >= self.sibling_count
    }
}

impl<T> Clone for WalkContext<'_, T> {
    fn clone(&self) -> Self {
        Self {
            node: self.node,
            traversal_path: self.traversal_path.clone(),
            resolved_path: self.resolved_path.clone(),
            parent: self.parent,
            index: self.index,
            sibling_count: self.sibling_count,
            depth: self.depth,
        }
    }
}

impl<T> std::fmt::Debug for WalkContext<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalkContext")
            .field("node", &self.node)
            .field("traversal_path", &self.traversal_path)
            .field("resolved_path", &self.resolved_path)
            .field("index", &self.index)
            .field("sibling_count", &self.sibling_count)
            .finish()
    }
}

/// Resolve the absolute `path` from `root` to a context. A missing segment
/// is `NotFound` naming the requested path up to that segment.
pub(crate) fn walk_to_target<'a, T>(
    root: &'a Node<T>,
    path: &TreePath,
    follow_links: bool,
    on_visit: &mut VisitFn<'_, T>,
) -> Result<WalkContext<'a, T>> {
    let mut state = WalkState::new(path, follow_links);
    match state.run(root, on_visit)? {
        Lookup::Found => WalkContext::locate(root, state.physical_path(), path.clone()),
        Lookup::NotFound(missing) => Err(Error::not_found(missing.traversal.as_str())),
    }
}

struct Frame<'a, T> {
    children: Vec<&'a Node<T>>,
    pos: usize,
    parent: &'a Node<T>,
    traversal: TreePath,
    resolved: TreePath,
    depth: usize,
}

/// Lazy pre-order walk below a base node.
///
/// The base is yielded first with traversal path `.`. Children follow in
/// the configured order. A directory reached again through a link while it
/// is still being descended is yielded but not entered.
pub struct WalkTree<'a, T> {
    root: &'a Node<T>,
    order: &'a SortOrder,
    filter: KindFilter,
    recursive: bool,
    follow_links: bool,
    base: Option<WalkContext<'a, T>>,
    stack: Vec<Frame<'a, T>>,
}

impl<'a, T> WalkTree<'a, T> {
    pub(crate) fn new(
        root: &'a Node<T>,
        base: WalkContext<'a, T>,
        order: &'a SortOrder,
        filter: KindFilter,
        recursive: bool,
        follow_links: bool,
    ) -> Self {
        let base = WalkContext {
            traversal_path: TreePath::current(),
            depth: 0,
            ..base
        };
        Self {
            root,
            order,
            filter,
            recursive,
            follow_links,
            base: if filter.is_empty() { None } else { Some(base) },
            stack: Vec::new(),
        }
    }

    fn push_frame(&mut self, node: &'a Node<T>, traversal: TreePath, resolved: TreePath, depth: usize) {
        if let NodeBody::Directory(dir) = node.body() {
            self.stack.push(Frame {
                children: dir.node_list(KindFilter::ALL, self.order),
                pos: 0,
                parent: node,
                traversal,
                resolved,
                depth,
            });
        }
    }

    fn on_stack(&self, resolved: &TreePath) -> bool {
        self.stack.iter().any(|f| &f.resolved == resolved)
    }

    fn next_child(&mut self) -> Option<Result<WalkContext<'a, T>>> {
        loop {
            let frame = self.stack.last_mut()?;
            let Some(&child) = frame.children.get(frame.pos) else {
                _ = self.stack.pop();
                continue;
            };
            let index = frame.pos;
            frame.pos += 1;

            let parent = frame.parent;
            let sibling_count = frame.children.len();
            let depth = frame.depth + 1;
            let traversal = frame.traversal.child(child.name());
            let container = frame.resolved.clone();
            let mut resolved = container.child(child.name());
            let mut node = child;

            if self.follow_links
                && let NodeBody::SymbolicLink(link) = child.body()
            {
                let target = link.target().to_absolute(&container);
                let mut state = WalkState::new(&target, true);
                let found = state
                    .run(self.root, &mut |_, _, _| {})
                    .and_then(|lookup| match lookup {
                        Lookup::Found => {
                            let physical = state.physical_path();
                            let segments: Vec<&str> = physical.segments().collect();
                            Ok((node_at(self.root, &segments)?, physical))
                        }
                        Lookup::NotFound(missing) => Err(Error::not_found(missing.traversal.as_str())),
                    });
                match found {
                    Ok((target_node, physical)) => {
                        node = target_node;
                        resolved = physical;
                    }
                    Err(err) => {
                        self.stack.clear();
                        return Some(Err(err));
                    }
                }
            }

            if self.recursive && node.kind() == NodeKind::Directory && !self.on_stack(&resolved) {
                self.push_frame(node, traversal.clone(), resolved.clone(), depth);
            }

            if self.filter.contains(node.kind()) {
                return Some(Ok(WalkContext {
                    node,
                    traversal_path: traversal,
                    resolved_path: resolved,
                    parent: Some(parent),
                    index,
                    sibling_count,
                    depth,
                }));
            }
        }
    }
}

impl<'a, T> Iterator for WalkTree<'a, T> {
    type Item = Result<WalkContext<'a, T>>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(base) = self.base.take() {
            let (node, resolved) = (base.node, base.resolved_path.clone());
            self.push_frame(node, TreePath::current(), resolved, 0);
            return Some(Ok(base));
        }
        self.next_child()
    }
}
