// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::error::{Error, Result};
use crate::name::NodeName;
use crate::node::Node;
use crate::path::TreePath;
use crate::walker::{Lookup, WalkState};

use super::StorageEngine;

/// How an add treats occupied names and missing parents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddOptions {
    /// Replace an existing entry of a compatible kind.
    pub overwrite: bool,
    /// Create missing parent directories.
    pub create_intermediate: bool,
}

impl AddOptions {
    #[must_use]
    pub fn overwrite() -> Self {
        Self {
            overwrite: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn intermediate() -> Self {
        Self {
            create_intermediate: true,
            ..Self::default()
        }
    }
}

impl<T> StorageEngine<T> {
    pub fn add_directory<P: AsRef<str>>(&mut self, path: P, options: AddOptions) -> Result<TreePath> {
        let (parent, name) = self.split_new_path(path)?;
        self.add_node(parent.as_str(), Node::directory(name), options)
    }

    pub fn add_item<P: AsRef<str>>(&mut self, path: P, data: Option<T>, options: AddOptions) -> Result<TreePath> {
        let (parent, name) = self.split_new_path(path)?;
        self.add_node(parent.as_str(), Node::item(name, data), options)
    }

    /// Add a link at `path` pointing at `target`. A relative target is
    /// interpreted from the directory holding the link.
    pub fn add_symbolic_link<P: AsRef<str>, Q: AsRef<str>>(
        &mut self,
        path: P,
        target: Q,
        options: AddOptions,
    ) -> Result<TreePath> {
        let target = TreePath::new(target)?;
        let (parent, name) = self.split_new_path(path)?;
        self.add_node(parent.as_str(), Node::symbolic_link(name, target), options)
    }

    /// Attach `node` (with any children it already has) inside the
    /// directory at `parent`. Returns the physical path of the new entry.
    pub fn add_node<P: AsRef<str>>(&mut self, parent: P, node: Node<T>, options: AddOptions) -> Result<TreePath> {
        let parent = self.absolute(parent)?;
        let container = self.resolve_container(&parent, options.create_intermediate)?;
        let path = container.child(node.name());
        let kind = node.kind();

        if let Some(current) = self.current_physical()
            && options.overwrite
            && current.starts_with(&path)
            && self.node_at(&path).is_ok()
        {
            return Err(Error::conflict(path.as_str(), "entry contains the current directory"));
        }

        let replaced = self.node_at_mut(&container)?.add_child(node, options.overwrite)?;
        if replaced.is_some() {
            self.unregister_links(&path);
        }
        self.register_links(&path)?;
        self.refresh_links_into(&path)?;

        diagnostics::debug!("added {kind} at {path}", kind: kind.as_str(), path: path.as_str());
        Ok(path)
    }

    /// Split a path naming a new entry into its parent and name.
    fn split_new_path<P: AsRef<str>>(&self, path: P) -> Result<(TreePath, NodeName)> {
        let path = self.absolute(path)?;
        if path.is_root() {
            return Err(Error::conflict(path.as_str(), "cannot add at the root"));
        }
        let name = path
            .node_name()
            .ok_or_else(|| Error::invalid_argument(path.as_str(), "path does not name a node"))?;
        Ok((path.dir_path(), NodeName::new(name)?))
    }

    /// Physical path of the directory at `path`, following links, and
    /// creating missing directories on the way when asked to.
    pub(crate) fn resolve_container(&mut self, path: &TreePath, create_intermediate: bool) -> Result<TreePath> {
        let mut state = WalkState::new(path, true);
        loop {
            match state.run(&self.root, &mut |_, _, _| {})? {
                Lookup::Found => break,
                Lookup::NotFound(missing) if create_intermediate && !missing.via_link => {
                    let dir = Node::directory(NodeName::new(missing.name.as_str())?);
                    _ = self.node_at_mut(&missing.parent)?.add_child(dir, false)?;
                    let created = missing.path();
                    self.refresh_links_into(&created)?;
                    diagnostics::debug!("created intermediate directory {path}", path: created.as_str());
                }
                Lookup::NotFound(missing) => {
                    return Err(Error::not_found(missing.traversal.as_str()));
                }
            }
        }

        let physical = state.physical_path();
        let node = self.node_at(&physical)?;
        if node.as_dir().is_err() {
            return Err(Error::not_a_directory(path.as_str(), node.kind()));
        }
        Ok(physical)
    }
}
